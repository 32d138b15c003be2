//! 对外操作：周边搜索、访问列表、路线估算，以及展示用的辅助函数

use crate::attractions::{Attraction, Catalog};
use crate::collectors::{build_overpass_query, parse_overpass_elements, Category, OverpassClient, Poi};
use crate::config::AppConfig;
use crate::coords::{calculate_distance, Bounds, Coordinate};
use crate::database::Database;
use crate::error::{Result, TripError};
use crate::routing::{RouteKind, RouteSummarizer, RouteSummary};
use crate::session::PlannerSession;
use crate::visit_list::{estimate_cost, estimate_trip_duration, VisitItem, VisitListStore};
use serde::Serialize;
use url::Url;

/// 地图上最多显示的周边 POI 数量
pub const MAX_MAP_MARKERS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct VisitSummary {
    pub total_cost_jpy: u32,
    pub nights: u32,
    pub days: u32,
}

impl VisitSummary {
    pub fn cost_text(&self) -> String {
        format!("{} JPY", group_thousands(self.total_cost_jpy))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub coordinate: Coordinate,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolylineStyle {
    Routed,
    /// 虚线，表示路线服务不可用时的直线连接
    Straight,
}

#[derive(Debug, Clone, Serialize)]
pub struct Polyline {
    pub coordinates: Vec<Coordinate>,
    pub style: PolylineStyle,
}

/// 交给地图组件渲染的数据：标记、视野范围和路线
#[derive(Debug, Clone, Serialize)]
pub struct MapOverlay {
    pub markers: Vec<Marker>,
    pub bounds: Option<Bounds>,
    pub polyline: Option<Polyline>,
}

pub fn category_label(category: Category) -> &'static str {
    match category {
        Category::Restaurant => "레스토랑",
        Category::Cafe => "카페",
        Category::Shrine => "신사",
        Category::Attraction => "관광지",
        Category::Other => "기타",
    }
}

/// 有不同的韩文名时显示为 "韩文名 (原名)"
pub fn display_name(poi: &Poi) -> String {
    match poi.name_ko.as_deref() {
        Some(ko) if ko != poi.name => format!("{} ({})", ko, poi.name),
        _ => poi.name.clone(),
    }
}

/// Google 地图搜索链接，用于查看评价
pub fn google_maps_url(name: &str, coord: Coordinate) -> Result<String> {
    let mut url = Url::parse("https://www.google.com/maps/search/")
        .map_err(|e| TripError::Config(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| TripError::Config("无效的地图链接".to_string()))?
        .pop_if_empty()
        .push(name)
        .push(&format!("@{},{},17z", coord.lat, coord.lon));
    Ok(url.to_string())
}

fn group_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn visit_summary(list: &[VisitItem]) -> VisitSummary {
    let duration = estimate_trip_duration(list);
    VisitSummary {
        total_cost_jpy: estimate_cost(list),
        nights: duration.nights,
        days: duration.days,
    }
}

/// 去掉无名 POI，计算距离并按距离升序排列
pub fn rank_by_distance(center: Coordinate, pois: Vec<Poi>) -> Vec<Poi> {
    let mut ranked: Vec<Poi> = pois
        .into_iter()
        .filter(Poi::is_named)
        .map(|mut poi| {
            poi.distance = Some(calculate_distance(center, poi.coordinate()));
            poi
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.distance
            .unwrap_or(f64::INFINITY)
            .total_cmp(&b.distance.unwrap_or(f64::INFINITY))
    });
    ranked
}

pub async fn search_nearby(
    client: &OverpassClient,
    center: Coordinate,
    radius: Option<f64>,
) -> Result<Vec<Poi>> {
    let query = build_overpass_query(center, radius);
    let elements = client.fetch(&query).await?;
    Ok(rank_by_distance(center, parse_overpass_elements(&elements)))
}

pub fn nearby_overlay(center: &Attraction, pois: &[Poi]) -> MapOverlay {
    let markers: Vec<Marker> = std::iter::once(Marker {
        coordinate: center.coordinate(),
        label: center.name.clone(),
    })
    .chain(pois.iter().take(MAX_MAP_MARKERS).map(|poi| Marker {
        coordinate: poi.coordinate(),
        label: format!("{} · {}", poi.name, category_label(poi.category)),
    }))
    .collect();

    MapOverlay {
        bounds: Bounds::from_points(markers.iter().map(|m| m.coordinate)),
        markers,
        polyline: None,
    }
}

pub fn route_overlay(
    origin: Coordinate,
    origin_label: &str,
    items: &[VisitItem],
    route: &RouteSummary,
) -> MapOverlay {
    let markers: Vec<Marker> = std::iter::once(Marker {
        coordinate: origin,
        label: origin_label.to_string(),
    })
    .chain(items.iter().map(|item| Marker {
        coordinate: item.coordinate(),
        label: item.name.clone(),
    }))
    .collect();

    let polyline = match route.kind {
        RouteKind::Routed => Some(PolylineStyle::Routed),
        RouteKind::StraightLine => Some(PolylineStyle::Straight),
        RouteKind::Empty => None,
    }
    .map(|style| Polyline {
        coordinates: route.geometry.clone(),
        style,
    });

    MapOverlay {
        bounds: Bounds::from_points(markers.iter().map(|m| m.coordinate)),
        markers,
        polyline,
    }
}

/// 应用上下文，取代全局状态
pub struct Planner {
    pub config: AppConfig,
    pub catalog: Catalog,
    pub store: VisitListStore,
    overpass: OverpassClient,
    router: RouteSummarizer,
}

impl Planner {
    pub fn new(config: AppConfig) -> Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin()?,
        };
        let db = Database::new(&config.storage.db_path)?;
        Self::with_parts(config, catalog, db)
    }

    pub fn with_parts(config: AppConfig, catalog: Catalog, db: Database) -> Result<Self> {
        let store = VisitListStore::new(db, config.storage.visit_list_key.clone());
        let overpass = OverpassClient::new(&config.overpass)?;
        let router = RouteSummarizer::new(&config.routing)?;
        Ok(Self {
            config,
            catalog,
            store,
            overpass,
            router,
        })
    }

    pub fn session(&self) -> Result<PlannerSession> {
        let origin = self.config.origin()?;
        Ok(self.session_at(origin.coordinate))
    }

    /// 指定出发地的会话，不读取配置中的出发地
    pub fn session_at(&self, origin: Coordinate) -> PlannerSession {
        PlannerSession::new(origin, self.config.routing.default_profile)
    }

    pub fn attraction(&self, id: &str) -> Result<&Attraction> {
        self.catalog
            .find(id)
            .ok_or_else(|| TripError::NotFound(format!("景点 {}", id)))
    }

    pub async fn nearby(&self, attraction_id: &str, radius: Option<f64>) -> Result<Vec<Poi>> {
        let attraction = self.attraction(attraction_id)?;
        let radius = radius.or(Some(self.config.overpass.default_radius));
        search_nearby(&self.overpass, attraction.coordinate(), radius).await
    }

    pub fn add_attraction(&self, attraction_id: &str) -> Result<Vec<VisitItem>> {
        let item = self.attraction(attraction_id)?.to_visit_item();
        self.store.add(item)
    }

    /// 在景点周边搜索结果中找到 POI 并加入访问列表
    pub async fn add_nearby_poi(
        &self,
        attraction_id: &str,
        poi_id: i64,
        radius: Option<f64>,
    ) -> Result<Vec<VisitItem>> {
        let pois = self.nearby(attraction_id, radius).await?;
        let poi = pois
            .iter()
            .find(|p| p.id == poi_id)
            .ok_or_else(|| TripError::NotFound(format!("POI {}", poi_id)))?;
        self.store.add(poi.to_visit_item())
    }

    pub async fn route(&self, session: &PlannerSession) -> (Vec<VisitItem>, RouteSummary) {
        let selected = session.selected_items(&self.store.get());
        let summary = self
            .router
            .summarize(session.origin, &selected, session.profile)
            .await;
        (selected, summary)
    }
}
