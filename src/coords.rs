//! 坐标与距离工具
//! 球面距离 (haversine)、距离格式化、包围盒

use crate::error::{Result, TripError};
use serde::{Deserialize, Serialize};

/// 地球平均半径 (米)
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// 超过该距离时以公里显示
const KM_THRESHOLD_M: f64 = 1000.0;

/// WGS84 坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// 创建坐标并检查范围
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        let coord = Self { lat, lon };
        if !coord.is_valid() {
            return Err(TripError::InvalidCoordinate { lat, lon });
        }
        Ok(coord)
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// 两点之间的球面距离 (米)
pub fn calculate_distance(from: Coordinate, to: Coordinate) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// 1000 米以下显示整数米，否则显示保留一位小数的公里
pub fn format_distance(meters: f64) -> String {
    if meters < KM_THRESHOLD_M {
        format!("{} m", meters.round())
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// 经纬度包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// 包含所有点的最小范围，空集合返回 None
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = Bounds {
            min_lon: first.lon,
            max_lon: first.lon,
            min_lat: first.lat,
            max_lat: first.lat,
        };
        Some(iter.fold(init, |b, p| Bounds {
            min_lon: b.min_lon.min(p.lon),
            max_lon: b.max_lon.max(p.lon),
            min_lat: b.min_lat.min(p.lat),
            max_lat: b.max_lat.max(p.lat),
        }))
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }
}
