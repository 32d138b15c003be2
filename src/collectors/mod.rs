//! 周边 POI 采集：Overpass 查询、多服务器获取、标签归一化

pub mod normalize;
pub mod osm;

pub use normalize::{classify_category, parse_overpass_elements, UNNAMED_POI};
pub use osm::{build_overpass_query, parse_radius, OverpassClient, DEFAULT_RADIUS_M};

use crate::coords::Coordinate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// POI 类别，未知类别统一归为 Other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Restaurant,
    Cafe,
    Shrine,
    Attraction,
    #[default]
    Other,
}

/// 未知字符串、null 以及非字符串值都读作 Other
impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Category::from).unwrap_or_default())
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Restaurant => "restaurant",
            Category::Cafe => "cafe",
            Category::Shrine => "shrine",
            Category::Attraction => "attraction",
            Category::Other => "other",
        }
    }

    /// 预估花费 (日元)
    pub fn estimated_cost_jpy(&self) -> u32 {
        match self {
            Category::Restaurant => 2000,
            Category::Cafe => 800,
            Category::Attraction => 600,
            Category::Shrine | Category::Other => 0,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "restaurant" => Category::Restaurant,
            "cafe" => Category::Cafe,
            "shrine" => Category::Shrine,
            "attraction" => Category::Attraction,
            _ => Category::Other,
        }
    }
}

/// 归一化后的 POI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: i64,
    pub name: String,
    #[serde(rename = "nameKo")]
    pub name_ko: Option<String>,
    pub category: Category,
    pub cuisine: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// 到中心点的距离 (米)，计算后才有值
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance: Option<f64>,
}

impl Poi {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty() && self.name != UNNAMED_POI
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Category::Shrine).unwrap(), "\"shrine\"");
        let c: Category = serde_json::from_str("\"cafe\"").unwrap();
        assert_eq!(c, Category::Cafe);
    }

    #[test]
    fn test_unknown_category_degrades_to_other() {
        let c: Category = serde_json::from_str("\"museum\"").unwrap();
        assert_eq!(c, Category::Other);
        assert_eq!(Category::from("Museum"), Category::Other);
        assert_eq!(Category::from("RESTAURANT"), Category::Restaurant);
        assert_eq!(Category::Other.estimated_cost_jpy(), 0);
    }

    #[test]
    fn test_non_string_category_degrades_to_other() {
        for raw in ["null", "3", "true", "{\"kind\":\"cafe\"}", "[\"cafe\"]"] {
            let c: Category = serde_json::from_str(raw).unwrap();
            assert_eq!(c, Category::Other, "{}", raw);
        }
    }
}
