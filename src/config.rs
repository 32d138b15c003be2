use crate::collectors::{OverpassClient, DEFAULT_RADIUS_M};
use crate::coords::Coordinate;
use crate::error::{Result, TripError};
use crate::routing::{RouteSummarizer, TravelProfile};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 出发地（到达机场）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginPreset {
    pub name: String,
    pub coordinate: Coordinate,
}

pub const DEFAULT_ORIGIN: &str = "kix";

pub static PRESET_ORIGINS: Lazy<HashMap<String, OriginPreset>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("kix".to_string(), OriginPreset {
        name: "간사이 국제공항 (KIX)".to_string(),
        coordinate: Coordinate { lat: 34.435, lon: 135.244 },
    });

    m.insert("itm".to_string(), OriginPreset {
        name: "오사카 국제공항 (ITM)".to_string(),
        coordinate: Coordinate { lat: 34.7855, lon: 135.4382 },
    });

    m.insert("ukb".to_string(), OriginPreset {
        name: "고베 공항 (UKB)".to_string(),
        coordinate: Coordinate { lat: 34.6328, lon: 135.2239 },
    });

    m.insert("nrt".to_string(), OriginPreset {
        name: "나리타 국제공항 (NRT)".to_string(),
        coordinate: Coordinate { lat: 35.7720, lon: 140.3929 },
    });

    m.insert("hnd".to_string(), OriginPreset {
        name: "하네다 공항 (HND)".to_string(),
        coordinate: Coordinate { lat: 35.5494, lon: 139.7798 },
    });

    m
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverpassConfig {
    /// 按优先级排列的镜像服务器
    pub endpoints: Vec<String>,
    pub default_radius: f64,
    /// 请求超时 (秒)，不设置则使用默认传输超时
    pub timeout_secs: Option<u64>,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoints: OverpassClient::DEFAULT_ENDPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_radius: DEFAULT_RADIUS_M,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    pub default_profile: TravelProfile,
    pub timeout_secs: Option<u64>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: RouteSummarizer::DEFAULT_BASE_URL.to_string(),
            default_profile: TravelProfile::default(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
    pub visit_list_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("trip_planner.db"),
            visit_list_key: "visitList".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub overpass: OverpassConfig,
    pub routing: RoutingConfig,
    pub storage: StorageConfig,
    /// 出发地预设 ID，见 PRESET_ORIGINS
    pub origin: Option<String>,
    /// 景点数据文件，不设置则使用内置数据
    pub catalog_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn origin(&self) -> Result<OriginPreset> {
        let id = self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN);
        origin_preset(id)
    }
}

pub fn origin_preset(id: &str) -> Result<OriginPreset> {
    PRESET_ORIGINS
        .get(&id.to_lowercase())
        .cloned()
        .ok_or_else(|| TripError::Config(format!("未知出发地: {}", id)))
}

pub fn config_path() -> PathBuf {
    PathBuf::from("trip_planner.json")
}

/// 读取配置文件，文件不存在时返回默认配置
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| TripError::Config(format!("{}: {}", path.display(), e)))
    } else {
        Ok(AppConfig::default())
    }
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| TripError::Config(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}
