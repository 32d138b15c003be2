//! OpenStreetMap 周边 POI 查询
//!
//! 使用 Overpass API，无需 API Key。多个镜像服务器按优先级依次尝试。

use crate::config::OverpassConfig;
use crate::coords::Coordinate;
use crate::error::{Result, TripError};
use crate::fallback::first_success;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// 默认搜索半径 (米)
pub const DEFAULT_RADIUS_M: f64 = 800.0;

/// 非正数、NaN 或缺省时使用默认半径
fn effective_radius(radius: Option<f64>) -> f64 {
    match radius {
        Some(r) if r.is_finite() && r > 0.0 => r,
        _ => DEFAULT_RADIUS_M,
    }
}

/// 解析用户输入的半径，无法解析时使用默认值
pub fn parse_radius(input: &str) -> f64 {
    effective_radius(input.trim().parse::<f64>().ok())
}

/// 构建 Overpass QL 查询：半径内的餐厅、咖啡馆、神社和景点节点
pub fn build_overpass_query(center: Coordinate, radius: Option<f64>) -> String {
    let r = effective_radius(radius);
    let around = format!("around:{},{:.6},{:.6}", r, center.lat, center.lon);
    format!(
        r#"[out:json][timeout:25];
(
  node({around})["amenity"="restaurant"];
  node({around})["amenity"="cafe"];
  node({around})["amenity"="place_of_worship"]["religion"="shinto"];
  node({around})["tourism"="attraction"];
);
out body qt;
"#,
        around = around
    )
}

/// Overpass 客户端
pub struct OverpassClient {
    client: Client,
    endpoints: Vec<String>,
}

impl OverpassClient {
    /// Overpass API 镜像列表（按优先级排序）
    pub const DEFAULT_ENDPOINTS: [&'static str; 4] = [
        "https://overpass-api.de/api/interpreter",
        "https://overpass.kumi.systems/api/interpreter",
        "https://overpass.openstreetmap.ru/api/interpreter",
        "https://overpass.nchc.org.tw/api/interpreter",
    ];

    pub fn new(config: &OverpassConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TripError::Config(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            client,
            endpoints: config.endpoints.clone(),
        })
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// 依次请求各服务器，返回第一个成功响应的 elements
    pub async fn fetch(&self, query: &str) -> Result<Vec<Value>> {
        let elements = first_success(&self.endpoints, |endpoint| {
            self.fetch_from(endpoint, query)
        })
        .await?;

        log::info!("[Overpass] 找到 {} 个元素", elements.len());
        Ok(elements)
    }

    async fn fetch_from(&self, endpoint: &str, query: &str) -> Result<Vec<Value>> {
        log::info!("[Overpass] 请求服务器: {}", endpoint);

        let response = self
            .client
            .get(endpoint)
            .query(&[("data", query)])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| TripError::TransportFailure(format!("{}: {}", endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TripError::TransportFailure(format!(
                "{}: HTTP {}",
                endpoint,
                status.as_u16()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| TripError::MalformedResponse(format!("{}: {}", endpoint, e)))?;

        extract_elements(payload)
            .ok_or_else(|| TripError::MalformedResponse(format!("{}: invalid payload", endpoint)))
    }
}

/// 响应中必须包含 elements 数组
fn extract_elements(payload: Value) -> Option<Vec<Value>> {
    match payload {
        Value::Object(mut map) => match map.remove("elements") {
            Some(Value::Array(elements)) => Some(elements),
            _ => None,
        },
        _ => None,
    }
}
