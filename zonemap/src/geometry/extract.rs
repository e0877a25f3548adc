//! Geometry extraction from raw entities.

use crate::coord::LatLon;
use crate::error::GeometryError;
use crate::overpass::{EntityId, EntityKind, Member, RawEntity};

/// Default display radius of point markers in meters.
pub const DEFAULT_MARKER_RADIUS_M: f64 = 10.0;

/// Ways need more than this many vertices to render as a polygon.
pub const POLYGON_MIN_EXCLUSIVE_VERTICES: usize = 3;

/// A renderable marker shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A small circle around a point.
    Circle { center: LatLon, radius_m: f64 },
    /// A filled polygon through the given vertices.
    Polygon(Vec<LatLon>),
}

/// Geometry the buffer engine measures distance from.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferSource {
    Point(LatLon),
    Polygon(Vec<LatLon>),
}

/// One renderable sub-geometry of an entity and its buffer source.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPart {
    pub shape: Shape,
    pub source: BufferSource,
}

/// All sub-geometries of an entity.
///
/// Points and ways have one part; relations have one per usable member.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub parts: Vec<ExtractedPart>,
}

impl Extraction {
    /// Renderable shapes in member order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.parts.iter().map(|p| &p.shape)
    }

    /// Buffer sources in member order.
    pub fn sources(&self) -> impl Iterator<Item = &BufferSource> {
        self.parts.iter().map(|p| &p.source)
    }
}

/// Converts raw entities into shapes and buffer sources.
#[derive(Debug, Clone)]
pub struct GeometryExtractor {
    marker_radius_m: f64,
}

impl Default for GeometryExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_RADIUS_M)
    }
}

impl GeometryExtractor {
    /// Create an extractor drawing point markers with `marker_radius_m`.
    pub fn new(marker_radius_m: f64) -> Self {
        Self { marker_radius_m }
    }

    /// Extract every sub-geometry of `entity`.
    ///
    /// Fails when a way has no vertices, a coordinate is invalid, or a
    /// relation has no way or node members.
    pub fn extract(&self, entity: &RawEntity) -> Result<Extraction, GeometryError> {
        let parts = match &entity.kind {
            EntityKind::Point(point) => vec![self.point_part(&entity.id, *point)?],
            EntityKind::Way { geometry, .. } => vec![self.way_part(&entity.id, geometry)?],
            EntityKind::Relation { members, .. } => {
                let mut parts = Vec::with_capacity(members.len());
                for member in members {
                    match member {
                        Member::Point(point) => parts.push(self.point_part(&entity.id, *point)?),
                        Member::Way(geometry) => parts.push(self.way_part(&entity.id, geometry)?),
                        Member::Relation => continue,
                    }
                }
                if parts.is_empty() {
                    return Err(GeometryError::NoMembers {
                        entity: entity.id.clone(),
                    });
                }
                parts
            }
        };

        Ok(Extraction { parts })
    }

    fn point_part(&self, id: &EntityId, point: LatLon) -> Result<ExtractedPart, GeometryError> {
        check_coordinate(id, point)?;
        Ok(ExtractedPart {
            shape: Shape::Circle {
                center: point,
                radius_m: self.marker_radius_m,
            },
            source: BufferSource::Point(point),
        })
    }

    fn way_part(&self, id: &EntityId, vertices: &[LatLon]) -> Result<ExtractedPart, GeometryError> {
        let first = *vertices.first().ok_or_else(|| GeometryError::EmptyGeometry {
            entity: id.clone(),
        })?;
        for vertex in vertices {
            check_coordinate(id, *vertex)?;
        }

        if vertices.len() > POLYGON_MIN_EXCLUSIVE_VERTICES {
            Ok(ExtractedPart {
                shape: Shape::Polygon(vertices.to_vec()),
                source: BufferSource::Polygon(vertices.to_vec()),
            })
        } else {
            self.point_part(id, first)
        }
    }
}

fn check_coordinate(id: &EntityId, point: LatLon) -> Result<(), GeometryError> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(GeometryError::InvalidCoordinate {
            entity: id.clone(),
            lat: point.lat,
            lon: point.lon,
        })
    }
}
