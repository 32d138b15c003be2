//! Overpass 元素 → 统一 POI 结构

use super::{Category, Poi};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// 没有名称时的占位名，调用方通常会过滤掉
pub const UNNAMED_POI: &str = "이름 없음";

const WEBSITE_KEYS: [&str; 3] = ["website", "contact:website", "url"];
const PHONE_KEYS: [&str; 2] = ["phone", "contact:phone"];

/// 组合地址时的字段顺序，门牌号单独与街道拼接
const ADDRESS_KEYS: [&str; 5] = [
    "addr:postcode",
    "addr:state",
    "addr:city",
    "addr:district",
    "addr:suburb",
];

type Tags = HashMap<String, String>;

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    element_type: String,
    id: Option<i64>,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: Tags,
}

/// 只保留 node，其余类型（way/relation 等）直接丢弃
pub fn parse_overpass_elements(elements: &[Value]) -> Vec<Poi> {
    elements.iter().filter_map(parse_element).collect()
}

fn parse_element(raw: &Value) -> Option<Poi> {
    let element = OverpassElement::deserialize(raw).ok()?;
    if element.element_type != "node" {
        return None;
    }

    let (id, lat, lon) = match (element.id, element.lat, element.lon) {
        (Some(id), Some(lat), Some(lon)) => (id, lat, lon),
        _ => {
            log::debug!("[Overpass] 跳过缺少 id 或坐标的节点: {}", raw);
            return None;
        }
    };

    let tags = &element.tags;
    Some(Poi {
        id,
        name: tag(tags, "name").unwrap_or(UNNAMED_POI).to_string(),
        name_ko: owned_tag(tags, "name:ko"),
        category: classify_category(tags),
        cuisine: owned_tag(tags, "cuisine"),
        website: first_tag(tags, &WEBSITE_KEYS),
        opening_hours: owned_tag(tags, "opening_hours"),
        phone: first_tag(tags, &PHONE_KEYS),
        address: owned_tag(tags, "addr:full").or_else(|| compose_address(tags)),
        lat,
        lon,
        distance: None,
    })
}

/// 按固定优先级分类，只有第一条匹配的规则生效
pub fn classify_category(tags: &Tags) -> Category {
    let amenity = tag(tags, "amenity");
    if amenity == Some("restaurant") {
        return Category::Restaurant;
    }
    if amenity == Some("cafe") {
        return Category::Cafe;
    }
    if amenity == Some("place_of_worship") && tag(tags, "religion") == Some("shinto") {
        return Category::Shrine;
    }
    if tag(tags, "tourism") == Some("attraction") {
        return Category::Attraction;
    }
    Category::Other
}

/// 空字符串视同不存在
fn tag<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn owned_tag(tags: &Tags, key: &str) -> Option<String> {
    tag(tags, key).map(str::to_string)
}

fn first_tag(tags: &Tags, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| owned_tag(tags, key))
}

fn compose_address(tags: &Tags) -> Option<String> {
    let street = [tag(tags, "addr:street"), tag(tags, "addr:housenumber")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let parts: Vec<&str> = ADDRESS_KEYS
        .iter()
        .filter_map(|key| tag(tags, key))
        .chain(Some(street.as_str()).filter(|s| !s.is_empty()))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_classification_priority() {
        let cases: Vec<(Vec<(&str, &str)>, Category)> = vec![
            (vec![("amenity", "restaurant")], Category::Restaurant),
            (vec![("amenity", "restaurant"), ("tourism", "attraction")], Category::Restaurant),
            (vec![("amenity", "cafe"), ("religion", "shinto")], Category::Cafe),
            (vec![("amenity", "place_of_worship"), ("religion", "shinto")], Category::Shrine),
            (
                vec![("amenity", "place_of_worship"), ("religion", "shinto"), ("tourism", "attraction")],
                Category::Shrine,
            ),
            (vec![("amenity", "place_of_worship"), ("religion", "buddhist")], Category::Other),
            (
                vec![("amenity", "place_of_worship"), ("religion", "buddhist"), ("tourism", "attraction")],
                Category::Attraction,
            ),
            (vec![("religion", "shinto")], Category::Other),
            (vec![("tourism", "attraction")], Category::Attraction),
            (vec![("tourism", "museum")], Category::Other),
            (vec![], Category::Other),
        ];

        for (pairs, expected) in cases {
            assert_eq!(classify_category(&tags(&pairs)), expected, "{:?}", pairs);
        }
    }

    #[test]
    fn test_classification_is_total() {
        let amenity = [None, Some("restaurant"), Some("cafe"), Some("place_of_worship"), Some("bar")];
        let religion = [None, Some("shinto"), Some("buddhist")];
        let tourism = [None, Some("attraction"), Some("hotel")];

        for a in amenity {
            for r in religion {
                for t in tourism {
                    let mut pairs = Vec::new();
                    if let Some(a) = a {
                        pairs.push(("amenity", a));
                    }
                    if let Some(r) = r {
                        pairs.push(("religion", r));
                    }
                    if let Some(t) = t {
                        pairs.push(("tourism", t));
                    }
                    let expected = match (a, r, t) {
                        (Some("restaurant"), _, _) => Category::Restaurant,
                        (Some("cafe"), _, _) => Category::Cafe,
                        (Some("place_of_worship"), Some("shinto"), _) => Category::Shrine,
                        (_, _, Some("attraction")) => Category::Attraction,
                        _ => Category::Other,
                    };
                    assert_eq!(classify_category(&tags(&pairs)), expected);
                }
            }
        }
    }

    #[test]
    fn test_non_nodes_discarded() {
        let elements = vec![
            json!({"type": "way", "id": 1, "tags": {"name": "Way"}}),
            json!({"type": "relation", "id": 2}),
            json!(null),
            json!("garbage"),
            json!({"type": "node", "id": 3, "lat": 34.0, "lon": 135.0, "tags": {"name": "Node"}}),
            json!({"type": "node", "id": 4, "tags": {"name": "No coords"}}),
        ];
        let pois = parse_overpass_elements(&elements);
        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].id, 3);
        assert_eq!(pois[0].name, "Node");
        assert_eq!(pois[0].distance, None);
    }

    #[test]
    fn test_full_node_normalization() {
        let el = json!({
            "type": "node",
            "id": 123456,
            "lat": 34.6687,
            "lon": 135.5013,
            "tags": {
                "name": "一蘭 道頓堀店",
                "name:ko": "이치란 도톤보리점",
                "amenity": "restaurant",
                "cuisine": "ramen",
                "contact:website": "https://ichiran.com",
                "url": "https://example.com",
                "contact:phone": "+81 6-1234-5678",
                "opening_hours": "24/7",
                "addr:full": "大阪府大阪市中央区道頓堀1-4-16"
            }
        });
        let poi = parse_overpass_elements(&[el]).remove(0);
        assert_eq!(poi.id, 123456);
        assert_eq!(poi.category, Category::Restaurant);
        assert_eq!(poi.name_ko.as_deref(), Some("이치란 도톤보리점"));
        assert_eq!(poi.cuisine.as_deref(), Some("ramen"));
        assert_eq!(poi.website.as_deref(), Some("https://ichiran.com"));
        assert_eq!(poi.phone.as_deref(), Some("+81 6-1234-5678"));
        assert_eq!(poi.opening_hours.as_deref(), Some("24/7"));
        assert_eq!(poi.address.as_deref(), Some("大阪府大阪市中央区道頓堀1-4-16"));
        assert_eq!(poi.lat, 34.6687);
        assert_eq!(poi.lon, 135.5013);
    }

    #[test]
    fn test_missing_name_uses_placeholder() {
        let el = json!({"type": "node", "id": 7, "lat": 1.0, "lon": 2.0});
        let poi = parse_overpass_elements(&[el]).remove(0);
        assert_eq!(poi.name, UNNAMED_POI);
        assert!(!poi.is_named());
        assert_eq!(poi.category, Category::Other);
        assert_eq!(poi.address, None);
        assert_eq!(poi.website, None);
    }

    #[test]
    fn test_contact_fallback_skips_empty() {
        let t = tags(&[("website", ""), ("contact:website", ""), ("url", "https://u.example")]);
        assert_eq!(first_tag(&t, &WEBSITE_KEYS).as_deref(), Some("https://u.example"));

        let t = tags(&[("phone", "06-1111"), ("contact:phone", "06-2222")]);
        assert_eq!(first_tag(&t, &PHONE_KEYS).as_deref(), Some("06-1111"));
    }

    #[test]
    fn test_compose_address() {
        let t = tags(&[
            ("addr:postcode", "542-0071"),
            ("addr:state", "大阪府"),
            ("addr:city", "大阪市"),
            ("addr:suburb", "中央区"),
            ("addr:street", "道頓堀"),
            ("addr:housenumber", "1-4-16"),
        ]);
        assert_eq!(
            compose_address(&t).as_deref(),
            Some("542-0071 大阪府 大阪市 中央区 道頓堀 1-4-16")
        );

        let t = tags(&[("addr:city", "京都市"), ("addr:housenumber", "5")]);
        assert_eq!(compose_address(&t).as_deref(), Some("京都市 5"));

        assert_eq!(compose_address(&tags(&[("addr:district", "")])), None);
    }

    #[test]
    fn test_full_address_preferred_over_parts() {
        let el = json!({
            "type": "node", "id": 9, "lat": 1.0, "lon": 2.0,
            "tags": {"addr:full": "full", "addr:city": "city"}
        });
        assert_eq!(parse_overpass_elements(&[el])[0].address.as_deref(), Some("full"));

        let el = json!({
            "type": "node", "id": 9, "lat": 1.0, "lon": 2.0,
            "tags": {"addr:full": "", "addr:city": "city"}
        });
        assert_eq!(parse_overpass_elements(&[el])[0].address.as_deref(), Some("city"));
    }
}
