//! Overpass `out geom` JSON schema.

use std::collections::HashMap;

use serde::Deserialize;

use super::model::{EntityId, EntityKind, Member, RawEntity};
use crate::coord::{GeoBounds, LatLon};
use crate::error::FetchError;

/// Top-level response body.
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ElementPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ElementBounds {
    pub minlat: f64,
    pub minlon: f64,
    pub maxlat: f64,
    pub maxlon: f64,
}

/// One element of the response.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node {
        id: u64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    Way {
        id: u64,
        #[serde(default)]
        bounds: Option<ElementBounds>,
        // Nodes outside the queried area come back as null
        #[serde(default)]
        geometry: Vec<Option<ElementPoint>>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    Relation {
        id: u64,
        #[serde(default)]
        bounds: Option<ElementBounds>,
        #[serde(default)]
        members: Vec<ElementMember>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
}

/// A relation member; only geometry is kept.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementMember {
    Node {
        lat: Option<f64>,
        lon: Option<f64>,
    },
    Way {
        #[serde(default)]
        geometry: Vec<Option<ElementPoint>>,
    },
    Relation {},
}

impl From<ElementPoint> for LatLon {
    fn from(p: ElementPoint) -> Self {
        LatLon::new(p.lat, p.lon)
    }
}

impl From<ElementBounds> for GeoBounds {
    fn from(b: ElementBounds) -> Self {
        GeoBounds::new(b.minlat, b.maxlat, b.minlon, b.maxlon)
    }
}

fn collect_geometry(points: Vec<Option<ElementPoint>>) -> Vec<LatLon> {
    points.into_iter().flatten().map(LatLon::from).collect()
}

impl ElementMember {
    fn into_member(self) -> Option<Member> {
        match self {
            ElementMember::Node {
                lat: Some(lat),
                lon: Some(lon),
            } => Some(Member::Point(LatLon::new(lat, lon))),
            // A node member without a position contributes nothing
            ElementMember::Node { .. } => None,
            ElementMember::Way { geometry } => Some(Member::Way(collect_geometry(geometry))),
            ElementMember::Relation {} => Some(Member::Relation),
        }
    }
}

impl From<Element> for RawEntity {
    fn from(element: Element) -> Self {
        match element {
            Element::Node { id, lat, lon, tags } => RawEntity {
                id: EntityId::new("node", id),
                tags,
                kind: EntityKind::Point(LatLon::new(lat, lon)),
            },
            Element::Way {
                id,
                bounds,
                geometry,
                tags,
            } => RawEntity {
                id: EntityId::new("way", id),
                tags,
                kind: EntityKind::Way {
                    geometry: collect_geometry(geometry),
                    bounds: bounds.map(GeoBounds::from),
                },
            },
            Element::Relation {
                id,
                bounds,
                members,
                tags,
            } => RawEntity {
                id: EntityId::new("relation", id),
                tags,
                kind: EntityKind::Relation {
                    members: members
                        .into_iter()
                        .filter_map(ElementMember::into_member)
                        .collect(),
                    bounds: bounds.map(GeoBounds::from),
                },
            },
        }
    }
}

/// Parse an Overpass JSON body into raw entities.
pub fn parse_entities(body: &[u8]) -> Result<Vec<RawEntity>, FetchError> {
    let response: OverpassResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    Ok(response
        .elements
        .into_iter()
        .map(RawEntity::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type": "node", "id": 1, "lat": 53.07, "lon": 8.80,
             "tags": {"amenity": "school", "name": "Grundschule"}},
            {"type": "way", "id": 2,
             "bounds": {"minlat": 53.0, "minlon": 8.7, "maxlat": 53.1, "maxlon": 8.9},
             "nodes": [10, 11, 12],
             "geometry": [{"lat": 53.0, "lon": 8.7}, null, {"lat": 53.1, "lon": 8.9}],
             "tags": {"sport": "soccer"}},
            {"type": "relation", "id": 3,
             "members": [
                {"type": "way", "ref": 4, "role": "outer",
                 "geometry": [{"lat": 1.0, "lon": 2.0}]},
                {"type": "node", "ref": 5, "role": "", "lat": 3.0, "lon": 4.0},
                {"type": "node", "ref": 6, "role": ""},
                {"type": "relation", "ref": 7, "role": "subarea"}
             ],
             "tags": {"leisure": "pitch"}}
        ]
    }"#;

    #[test]
    fn test_parse_all_element_types() {
        let entities = parse_entities(SAMPLE.as_bytes()).unwrap();
        assert_eq!(entities.len(), 3);

        assert_eq!(entities[0].id.as_str(), "node/1");
        assert_eq!(entities[0].tag("amenity"), Some("school"));
        assert_eq!(
            entities[0].kind,
            EntityKind::Point(LatLon::new(53.07, 8.80))
        );

        match &entities[1].kind {
            EntityKind::Way { geometry, bounds } => {
                // The null vertex is dropped
                assert_eq!(geometry.len(), 2);
                assert_eq!(bounds.unwrap().max_lon, 8.9);
            }
            other => panic!("expected way, got {:?}", other),
        }

        match &entities[2].kind {
            EntityKind::Relation { members, bounds } => {
                assert!(bounds.is_none());
                assert_eq!(
                    members,
                    &vec![
                        Member::Way(vec![LatLon::new(1.0, 2.0)]),
                        Member::Point(LatLon::new(3.0, 4.0)),
                        Member::Relation,
                    ]
                );
            }
            other => panic!("expected relation, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_tags_default_empty() {
        let body = r#"{"elements": [{"type": "node", "id": 9, "lat": 0.0, "lon": 0.0}]}"#;
        let entities = parse_entities(body.as_bytes()).unwrap();
        assert!(entities[0].tags.is_empty());
    }

    #[test]
    fn test_missing_elements_is_empty() {
        let entities = parse_entities(br#"{"remark": "runtime error"}"#).unwrap();
        assert!(entities.is_empty());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = parse_entities(b"<html>rate limited</html>");
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }
}
