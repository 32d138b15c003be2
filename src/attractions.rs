//! 景点目录
//!
//! 默认使用内置 JSON 数据，也可以从文件加载。目录只读。

use crate::collectors::{Category, Poi};
use crate::coords::Coordinate;
use crate::error::{Result, TripError};
use crate::visit_list::{ItemId, VisitItem};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 景点加入访问列表时的 ID 前缀
pub const ATTRACTION_ID_PREFIX: &str = "attraction:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub lat: f64,
    pub lon: f64,
}

impl Attraction {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }

    pub fn to_visit_item(&self) -> VisitItem {
        VisitItem {
            id: ItemId::from(format!("{}{}", ATTRACTION_ID_PREFIX, self.id)),
            name: self.name.clone(),
            category: Category::Attraction,
            lat: self.lat,
            lon: self.lon,
            website: None,
        }
    }
}

impl Poi {
    pub fn to_visit_item(&self) -> VisitItem {
        VisitItem {
            id: ItemId::from(self.id),
            name: self.name.clone(),
            category: self.category,
            lat: self.lat,
            lon: self.lon,
            website: self.website.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    attractions: Vec<Attraction>,
}

impl Catalog {
    /// 内置景点数据
    pub fn builtin() -> Result<Self> {
        Self::parse(include_str!("../resources/attractions.json"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| TripError::CatalogUnavailable(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn parse(json: &str) -> Result<Self> {
        let attractions: Vec<Attraction> =
            serde_json::from_str(json).map_err(|e| TripError::CatalogUnavailable(e.to_string()))?;

        if let Some(bad) = attractions.iter().find(|a| !a.coordinate().is_valid()) {
            return Err(TripError::CatalogUnavailable(format!(
                "景点 {} 坐标无效: {}, {}",
                bad.id, bad.lat, bad.lon
            )));
        }

        log::debug!("加载 {} 个景点", attractions.len());
        Ok(Self { attractions })
    }

    pub fn all(&self) -> &[Attraction] {
        &self.attractions
    }

    pub fn find(&self, id: &str) -> Option<&Attraction> {
        self.attractions.iter().find(|a| a.id == id)
    }

    /// 找不到时退回第一个景点，目录为空时返回 None
    pub fn find_or_first(&self, id: Option<&str>) -> Option<&Attraction> {
        id.and_then(|id| self.find(id))
            .or_else(|| self.attractions.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.all().is_empty());
        let castle = catalog.find("osaka-castle").unwrap();
        assert_eq!(castle.lat, 34.6873);
        assert!(catalog.find("nope").is_none());
    }

    #[test]
    fn test_find_or_first() {
        let catalog = Catalog::builtin().unwrap();
        let first = &catalog.all()[0];
        assert_eq!(catalog.find_or_first(Some("missing")), Some(first));
        assert_eq!(catalog.find_or_first(None), Some(first));
        assert_eq!(
            catalog.find_or_first(Some("dotonbori")).map(|a| a.id.as_str()),
            Some("dotonbori")
        );

        let empty = Catalog::parse("[]").unwrap();
        assert!(empty.find_or_first(Some("x")).is_none());
    }

    #[test]
    fn test_load_failures_are_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Catalog::load(&dir.path().join("attractions.json"));
        assert!(matches!(missing, Err(TripError::CatalogUnavailable(_))));

        assert!(matches!(
            Catalog::parse("{\"broken\""),
            Err(TripError::CatalogUnavailable(_))
        ));

        let bad_coord = r#"[{"id":"x","name":"x","description":"","image":"","lat":120,"lon":0}]"#;
        assert!(Catalog::parse(bad_coord).is_err());
    }

    #[test]
    fn test_attraction_visit_item() {
        let catalog = Catalog::builtin().unwrap();
        let item = catalog.find("fushimi-inari").unwrap().to_visit_item();
        assert_eq!(item.id.as_str(), "attraction:fushimi-inari");
        assert_eq!(item.category, Category::Attraction);
        assert_eq!(item.website, None);
    }

    #[test]
    fn test_poi_visit_item_keeps_numeric_id() {
        let poi = Poi {
            id: 987,
            name: "Cafe".to_string(),
            name_ko: None,
            category: Category::Cafe,
            cuisine: None,
            website: Some("https://cafe.example".to_string()),
            opening_hours: None,
            phone: None,
            address: None,
            lat: 1.0,
            lon: 2.0,
            distance: Some(10.0),
        };
        let item = poi.to_visit_item();
        assert_eq!(item.id, ItemId::from(987));
        assert_eq!(item.website.as_deref(), Some("https://cafe.example"));
    }
}
