//! Raw map entities as delivered by the upstream source.

use std::collections::HashMap;
use std::fmt;

use crate::coord::{GeoBounds, LatLon};

/// Tag mapping of an entity (`key -> value`).
pub type Tags = HashMap<String, String>;

/// Stable identity of an entity across refreshes.
///
/// Overpass numbers nodes, ways and relations independently, so the key
/// carries the element type: `node/42`, `way/42` and `relation/42` are
/// three different entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    /// Build an id from an element type and its numeric id.
    pub fn new(element_type: &str, id: u64) -> Self {
        Self(format!("{}/{}", element_type, id))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A member of a relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// A node member.
    Point(LatLon),
    /// A way member with its vertex geometry.
    Way(Vec<LatLon>),
    /// A nested relation. Never expanded.
    Relation,
}

/// Geometry variant of a raw entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Point(LatLon),
    Way {
        geometry: Vec<LatLon>,
        bounds: Option<GeoBounds>,
    },
    Relation {
        members: Vec<Member>,
        bounds: Option<GeoBounds>,
    },
}

impl EntityKind {
    /// Overpass element type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            EntityKind::Point(_) => "node",
            EntityKind::Way { .. } => "way",
            EntityKind::Relation { .. } => "relation",
        }
    }
}

/// A raw point, way or relation record.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntity {
    pub id: EntityId,
    pub tags: Tags,
    pub kind: EntityKind,
}

impl RawEntity {
    /// A node entity.
    pub fn point(id: u64, position: LatLon, tags: Tags) -> Self {
        Self {
            id: EntityId::new("node", id),
            tags,
            kind: EntityKind::Point(position),
        }
    }

    /// A way entity; bounds are derived from the geometry.
    pub fn way(id: u64, geometry: Vec<LatLon>, tags: Tags) -> Self {
        let bounds = GeoBounds::enclosing(geometry.iter().copied());
        Self {
            id: EntityId::new("way", id),
            tags,
            kind: EntityKind::Way { geometry, bounds },
        }
    }

    /// A relation entity.
    pub fn relation(id: u64, members: Vec<Member>, tags: Tags) -> Self {
        let bounds = GeoBounds::enclosing(members.iter().flat_map(|m| match m {
            Member::Point(p) => vec![*p],
            Member::Way(g) => g.clone(),
            Member::Relation => Vec::new(),
        }));
        Self {
            id: EntityId::new("relation", id),
            tags,
            kind: EntityKind::Relation { members, bounds },
        }
    }

    /// Value of a tag, if present.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Build a tag map from `(key, value)` pairs.
pub fn tags<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Tags {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
