//! OSRM 路线估算
//!
//! 出发地 + 已选择的访问项（保持列表顺序，不做路径优化）组成途经点，
//! 请求一次路线服务；失败时退化为直线连接，距离和时间记为 0。

use crate::config::RoutingConfig;
use crate::coords::Coordinate;
use crate::error::{Result, TripError};
use crate::visit_list::VisitItem;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 出行方式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TravelProfile {
    #[default]
    Walking,
    Cycling,
    Driving,
}

impl TravelProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelProfile::Walking => "walking",
            TravelProfile::Cycling => "cycling",
            TravelProfile::Driving => "driving",
        }
    }
}

impl fmt::Display for TravelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// 路线服务返回的实际路线
    Routed,
    /// 路线服务失败，按途经点直线连接
    StraightLine,
    /// 没有选择任何访问项
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub geometry: Vec<Coordinate>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub kind: RouteKind,
}

impl RouteSummary {
    fn unrouted(waypoints: Vec<Coordinate>, kind: RouteKind) -> Self {
        Self {
            geometry: waypoints,
            distance_meters: 0.0,
            duration_seconds: 0.0,
            kind,
        }
    }

    /// 例如 "12.3 km"，距离为 0 时显示 "0 km"
    pub fn distance_text(&self) -> String {
        if self.distance_meters > 0.0 {
            format!("{:.1} km", self.distance_meters / 1000.0)
        } else {
            "0 km".to_string()
        }
    }

    pub fn duration_minutes(&self) -> u64 {
        if self.duration_seconds > 0.0 {
            (self.duration_seconds / 60.0).round() as u64
        } else {
            0
        }
    }

    pub fn duration_text(&self) -> String {
        format!("{}분", self.duration_minutes())
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// [lon, lat]
    coordinates: Vec<[f64; 2]>,
}

/// 出发地在前，之后按列表顺序排列
pub fn route_waypoints(origin: Coordinate, items: &[VisitItem]) -> Vec<Coordinate> {
    std::iter::once(origin)
        .chain(items.iter().map(VisitItem::coordinate))
        .collect()
}

/// 构建 OSRM 路线请求 URL，坐标按 lon,lat 排列
pub fn build_route_url(base_url: &str, waypoints: &[Coordinate], profile: TravelProfile) -> String {
    let coords = waypoints
        .iter()
        .map(|p| format!("{},{}", p.lon, p.lat))
        .collect::<Vec<_>>()
        .join(";");
    format!(
        "{}/route/v1/{}/{}?overview=full&geometries=geojson&steps=false",
        base_url.trim_end_matches('/'),
        profile,
        coords
    )
}

pub struct RouteSummarizer {
    client: Client,
    base_url: String,
}

impl RouteSummarizer {
    pub const DEFAULT_BASE_URL: &'static str = "https://router.project-osrm.org";

    pub fn new(config: &RoutingConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TripError::Config(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// 估算路线，任何失败都不会返回错误
    pub async fn summarize(
        &self,
        origin: Coordinate,
        items: &[VisitItem],
        profile: TravelProfile,
    ) -> RouteSummary {
        let waypoints = route_waypoints(origin, items);
        if waypoints.len() < 2 {
            return RouteSummary::unrouted(waypoints, RouteKind::Empty);
        }

        match self.fetch_route(&self.base_url, &waypoints, profile).await {
            Ok(summary) => summary,
            Err(e) => {
                log::warn!("[OSRM] 路线获取失败，改用直线连接: {}", e);
                RouteSummary::unrouted(waypoints, RouteKind::StraightLine)
            }
        }
    }

    async fn fetch_route(
        &self,
        base_url: &str,
        waypoints: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<RouteSummary> {
        let url = build_route_url(base_url, waypoints, profile);
        log::info!("[OSRM] 请求路线: {} 个途经点, {}", waypoints.len(), profile);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TripError::TransportFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TripError::TransportFailure(format!("OSRM HTTP {}", status.as_u16())));
        }

        let data: OsrmResponse = response
            .json()
            .await
            .map_err(|e| TripError::MalformedResponse(format!("解析 OSRM 响应失败: {}", e)))?;

        let route = data
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| TripError::MalformedResponse("响应中没有路线".to_string()))?;

        Ok(RouteSummary {
            geometry: route
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| Coordinate { lat, lon })
                .collect(),
            distance_meters: route.distance,
            duration_seconds: route.duration,
            kind: RouteKind::Routed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::Category;
    use crate::visit_list::ItemId;

    const KIX: Coordinate = Coordinate {
        lat: 34.435,
        lon: 135.244,
    };

    fn item(id: &str, lat: f64, lon: f64) -> VisitItem {
        VisitItem {
            id: ItemId::from(id),
            name: id.to_string(),
            category: Category::Attraction,
            lat,
            lon,
            website: None,
        }
    }

    #[test]
    fn test_build_route_url() {
        let waypoints = [KIX, Coordinate { lat: 34.6873, lon: 135.5262 }];
        assert_eq!(
            build_route_url("https://router.project-osrm.org/", &waypoints, TravelProfile::Walking),
            "https://router.project-osrm.org/route/v1/walking/135.244,34.435;135.5262,34.6873?overview=full&geometries=geojson&steps=false"
        );
        assert!(build_route_url("http://x", &waypoints, TravelProfile::Driving)
            .starts_with("http://x/route/v1/driving/"));
    }

    #[test]
    fn test_waypoints_keep_list_order() {
        // 顺序不优化：远的点在前也保持原样
        let items = [item("far", 35.0116, 135.7681), item("near", 34.6687, 135.5013)];
        let w = route_waypoints(KIX, &items);
        assert_eq!(w.len(), 3);
        assert_eq!(w[0], KIX);
        assert_eq!(w[1].lat, 35.0116);
        assert_eq!(w[2].lat, 34.6687);
    }

    #[test]
    fn test_summary_text() {
        let s = RouteSummary {
            geometry: vec![],
            distance_meters: 12_345.0,
            duration_seconds: 5_430.0,
            kind: RouteKind::Routed,
        };
        assert_eq!(s.distance_text(), "12.3 km");
        assert_eq!(s.duration_minutes(), 91);
        assert_eq!(s.duration_text(), "91분");

        let zero = RouteSummary::unrouted(vec![KIX], RouteKind::Empty);
        assert_eq!(zero.distance_text(), "0 km");
        assert_eq!(zero.duration_text(), "0분");
    }

    #[test]
    fn test_profile_serde() {
        assert_eq!(serde_json::to_string(&TravelProfile::Cycling).unwrap(), "\"cycling\"");
        let p: TravelProfile = serde_json::from_str("\"driving\"").unwrap();
        assert_eq!(p, TravelProfile::Driving);
        assert_eq!(TravelProfile::default(), TravelProfile::Walking);
    }
}
