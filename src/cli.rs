//! 命令行入口

use crate::collectors::{parse_radius, Category};
use crate::commands::{
    category_label, display_name, google_maps_url, nearby_overlay, route_overlay, visit_summary,
    Planner,
};
use crate::config::{
    config_path, load_config, origin_preset, save_config, AppConfig, OriginPreset,
};
use crate::coords::{format_distance, Coordinate};
use crate::error::{Result, TripError};
use crate::routing::{RouteKind, TravelProfile};
use crate::visit_list::{ItemId, VisitItem};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "trip-planner")]
#[command(version)]
#[command(about = "일본 여행 플래너: 주변 장소 검색, 방문 목록, 이동 경로", long_about = None)]
pub struct Cli {
    /// 설정 파일 경로
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 데이터베이스 경로 (설정 파일보다 우선)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 명소 목록
    Attractions,
    /// 명소 주변의 레스토랑, 카페, 신사, 관광지 검색
    Nearby {
        attraction_id: String,
        /// 검색 반경 (미터)
        #[arg(long)]
        radius: Option<String>,
        /// 검색 결과의 장소를 방문 목록에 추가
        #[arg(long)]
        add: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// 방문 목록
    Visit {
        #[command(subcommand)]
        action: VisitAction,
    },
    /// 출발지에서 선택한 방문지를 잇는 경로 계산
    Route {
        #[arg(long, value_enum)]
        profile: Option<TravelProfile>,
        /// 출발지: kix, itm, ukb, nrt, hnd
        #[arg(long)]
        origin: Option<String>,
        /// 경로에서 제외할 방문 항목 ID
        #[arg(long)]
        exclude: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// 기본 설정 파일 생성
    InitConfig,
}

#[derive(Debug, Subcommand)]
pub enum VisitAction {
    List,
    AddAttraction {
        attraction_id: String,
    },
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "other")]
        category: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        website: Option<String>,
    },
    Remove {
        id: String,
    },
    Clear,
    Summary,
}

fn build_config(cli: &Cli) -> Result<AppConfig> {
    let path = cli.config.clone().unwrap_or_else(config_path);
    let mut config = load_config(&path)?;
    if let Some(db) = &cli.db {
        config.storage.db_path = db.clone();
    }
    Ok(config)
}

pub async fn execute(cli: Cli) -> Result<()> {
    if let Command::InitConfig = cli.command {
        let path = cli.config.clone().unwrap_or_else(config_path);
        save_config(&path, &build_config(&cli)?)?;
        println!("설정 파일 생성: {}", path.display());
        return Ok(());
    }

    let config = build_config(&cli)?;
    let planner = match Planner::new(config) {
        Ok(planner) => planner,
        Err(e @ TripError::CatalogUnavailable(_)) => {
            println!("명소 데이터를 불러오지 못했습니다.");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    match cli.command {
        Command::Attractions => print_attractions(&planner),
        Command::Nearby {
            attraction_id,
            radius,
            add,
            json,
        } => {
            let radius = radius.as_deref().map(parse_radius);
            nearby(&planner, &attraction_id, radius, add, json).await?;
        }
        Command::Visit { action } => visit(&planner, action)?,
        Command::Route {
            profile,
            origin,
            exclude,
            json,
        } => route(&planner, profile, origin, exclude, json).await?,
        Command::InitConfig => {}
    }
    Ok(())
}

fn print_attractions(planner: &Planner) {
    for a in planner.catalog.all() {
        println!("{:<24} {}", a.id, a.name);
        println!("{:<24} {}", "", a.description);
    }
}

async fn nearby(
    planner: &Planner,
    attraction_id: &str,
    radius: Option<f64>,
    add: Option<i64>,
    as_json: bool,
) -> Result<()> {
    let attraction = planner.attraction(attraction_id)?;

    if let Some(poi_id) = add {
        match planner.add_nearby_poi(attraction_id, poi_id, radius).await {
            Ok(list) => println!("방문 목록에 추가 완료 ({}개)", list.len()),
            Err(e @ TripError::ServiceUnavailable(_)) => {
                log::error!("周边搜索失败: {}", e);
                println!("주변 장소 불러오기 실패");
            }
            Err(e) => return Err(e),
        }
        return Ok(());
    }

    let pois = match planner.nearby(attraction_id, radius).await {
        Ok(pois) => pois,
        Err(e) => {
            // 搜索失败只在结果区域提示，不中断程序
            log::error!("周边搜索失败: {}", e);
            println!("주변 장소 불러오기 실패");
            return Ok(());
        }
    };

    if as_json {
        let overlay = nearby_overlay(attraction, &pois);
        let out = json!({ "attraction": attraction, "pois": pois, "map": overlay });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        return Ok(());
    }

    println!("{} 주변 ({}곳)", attraction.name, pois.len());
    if pois.is_empty() {
        println!("주변 장소가 없습니다.");
    }
    for poi in &pois {
        let distance = poi.distance.map(format_distance).unwrap_or_default();
        println!();
        println!("[{}] {}  {}", category_label(poi.category), display_name(poi), distance);
        if let Some(cuisine) = &poi.cuisine {
            println!("  요리: {}", cuisine);
        }
        if let Some(hours) = &poi.opening_hours {
            println!("  영업시간: {}", hours);
        }
        if let Some(phone) = &poi.phone {
            println!("  전화: {}", phone);
        }
        if let Some(address) = &poi.address {
            println!("  주소: {}", address);
        }
        if let Some(website) = &poi.website {
            println!("  웹사이트: {}", website);
        }
        println!("  리뷰: {}", google_maps_url(&poi.name, poi.coordinate())?);
        println!("  추가: --add {}", poi.id);
    }
    Ok(())
}

fn visit(planner: &Planner, action: VisitAction) -> Result<()> {
    let store = &planner.store;
    match action {
        VisitAction::List => print_visit_list(&store.get())?,
        VisitAction::AddAttraction { attraction_id } => {
            let list = planner.add_attraction(&attraction_id)?;
            println!("추가 완료 ({}개)", list.len());
        }
        VisitAction::Add {
            id,
            name,
            category,
            lat,
            lon,
            website,
        } => {
            let coord = Coordinate::new(lat, lon)?;
            let list = store.add(VisitItem {
                id: ItemId::from(id),
                name,
                category: Category::from(category.as_str()),
                lat: coord.lat,
                lon: coord.lon,
                website,
            })?;
            println!("추가 완료 ({}개)", list.len());
        }
        VisitAction::Remove { id } => {
            let list = store.remove(&ItemId::from(id))?;
            print_visit_list(&list)?;
        }
        VisitAction::Clear => {
            store.clear()?;
            println!("방문 목록을 비웠습니다.");
        }
        VisitAction::Summary => {
            let summary = visit_summary(&store.get());
            println!("예상 비용: {}", summary.cost_text());
            println!("일정: {}박 {}일", summary.nights, summary.days);
        }
    }
    Ok(())
}

fn print_visit_list(list: &[VisitItem]) -> Result<()> {
    if list.is_empty() {
        println!("방문 목록이 비어 있습니다.");
    }
    for item in list {
        println!(
            "{:<28} [{}] {}",
            item.id,
            category_label(item.category),
            item.name
        );
        println!("{:<28} {}", "", google_maps_url(&item.name, item.coordinate())?);
    }
    let summary = visit_summary(list);
    println!(
        "합계 {} / {}박 {}일",
        summary.cost_text(),
        summary.nights,
        summary.days
    );
    Ok(())
}

/// 命令行指定的出发地优先于配置文件
fn resolve_origin(config: &AppConfig, origin: Option<&str>) -> Result<OriginPreset> {
    match origin {
        Some(id) => origin_preset(id),
        None => config.origin(),
    }
}

async fn route(
    planner: &Planner,
    profile: Option<TravelProfile>,
    origin: Option<String>,
    exclude: Vec<String>,
    as_json: bool,
) -> Result<()> {
    let origin = resolve_origin(&planner.config, origin.as_deref())?;
    let mut session = planner.session_at(origin.coordinate);
    if let Some(profile) = profile {
        session.set_profile(profile);
    }
    for id in exclude {
        session.set_selected(&ItemId::from(id), false);
    }

    let (selected, summary) = planner.route(&session).await;

    if as_json {
        let overlay = route_overlay(session.origin, &origin.name, &selected, &summary);
        let out = json!({ "route": summary, "map": overlay });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        return Ok(());
    }

    println!("출발: {}", origin.name);
    for (idx, item) in selected.iter().enumerate() {
        println!("  {}. {}", idx + 1, item.name);
    }
    if summary.kind == RouteKind::StraightLine {
        println!("경로 서비스를 사용할 수 없어 직선으로 연결했습니다.");
    }
    println!(
        "이동 ({}): {} / {}",
        session.profile,
        summary.distance_text(),
        summary.duration_text()
    );
    Ok(())
}
