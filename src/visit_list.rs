//! 访问列表
//!
//! 整个列表以 JSON 形式保存在键值存储的一个键下，按加入顺序排列，
//! ID 以字符串形式比较，不允许重复。

use crate::collectors::Category;
use crate::coords::Coordinate;
use crate::database::Database;
use crate::error::{Result, TripError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// 每天安排的访问数量
const STOPS_PER_DAY: usize = 4;

/// 访问项 ID
///
/// POI 的 ID 是数字，景点的 ID 形如 `attraction:<id>`，统一按字符串比较。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawItemId", into = "String")]
pub struct ItemId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawItemId {
    Number(i64),
    Text(String),
}

impl From<RawItemId> for ItemId {
    fn from(raw: RawItemId) -> Self {
        match raw {
            RawItemId::Number(n) => ItemId(n.to_string()),
            RawItemId::Text(s) => ItemId(s),
        }
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId(n.to_string())
    }
}

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub category: Category,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub website: Option<String>,
}

impl VisitItem {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TripDuration {
    pub nights: u32,
    pub days: u32,
}

pub struct VisitListStore {
    db: Database,
    key: String,
}

impl VisitListStore {
    pub fn new(db: Database, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }

    /// 读取列表；整体不是 JSON 数组时返回 MalformedState，
    /// 单个无法识别的条目只跳过，其余条目保留
    pub fn try_get(&self) -> Result<Vec<VisitItem>> {
        let raw = match self.db.get_item(&self.key)? {
            None => return Ok(Vec::new()),
            Some(raw) => raw,
        };
        let entries: Vec<Value> = serde_json::from_str(&raw)
            .map_err(|e| TripError::MalformedState(format!("{}: {}", self.key, e)))?;

        Ok(entries
            .into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| match serde_json::from_value::<VisitItem>(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    log::warn!("[VisitList] 跳过第 {} 项: {}", idx, e);
                    None
                }
            })
            .collect())
    }

    /// 读取列表；不存在或损坏时视为空列表
    pub fn get(&self) -> Vec<VisitItem> {
        self.try_get().unwrap_or_else(|e| {
            log::warn!("[VisitList] 读取失败，按空列表处理: {}", e);
            Vec::new()
        })
    }

    pub fn set(&self, list: &[VisitItem]) -> Result<()> {
        let raw = serde_json::to_string(list)
            .map_err(|e| TripError::MalformedState(e.to_string()))?;
        self.db.set_item(&self.key, &raw)?;
        Ok(())
    }

    /// ID 已存在时不重复加入，列表总会重新写入
    pub fn add(&self, item: VisitItem) -> Result<Vec<VisitItem>> {
        let mut list = self.get();
        if list.iter().any(|x| x.id == item.id) {
            log::debug!("[VisitList] 已存在: {}", item.id);
        } else {
            log::info!("[VisitList] 加入: {} ({})", item.name, item.id);
            list.push(item);
        }
        self.set(&list)?;
        Ok(list)
    }

    pub fn remove(&self, id: &ItemId) -> Result<Vec<VisitItem>> {
        let list: Vec<VisitItem> = self.get().into_iter().filter(|x| &x.id != id).collect();
        self.set(&list)?;
        Ok(list)
    }

    pub fn clear(&self) -> Result<()> {
        self.set(&[])
    }
}

/// 按类别估算花费 (日元)
pub fn estimate_cost(list: &[VisitItem]) -> u32 {
    list.iter().map(|item| item.category.estimated_cost_jpy()).sum()
}

/// 每天 4 个地点，向上取整；至少 1 天
pub fn estimate_trip_duration(list: &[VisitItem]) -> TripDuration {
    let days = list.len().div_ceil(STOPS_PER_DAY).max(1) as u32;
    TripDuration {
        nights: days.saturating_sub(1),
        days,
    }
}
