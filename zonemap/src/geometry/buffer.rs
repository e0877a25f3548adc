//! Fixed-radius buffer polygons.
//!
//! Buffers are computed in Web Mercator meters. The ground radius is scaled by
//! the Mercator scale factor at the geometry's latitude, which is accurate to
//! well under a meter at city scale for radii of a few hundred meters.

use std::f64::consts::PI;

use geo::{Area, ConvexHull, Coord, LineString, MapCoords, MultiPoint, MultiPolygon, Point, Polygon};
use tracing::warn;

use super::extract::BufferSource;
use super::precision::{reduce_precision, DEFAULT_PRECISION};
use super::union::try_cascade_union;
use crate::coord::{from_mercator, mercator_scale, to_mercator, LatLon};
use crate::error::BufferError;

/// Default buffer radius in meters.
pub const DEFAULT_BUFFER_RADIUS_M: f64 = 100.0;

/// Default number of segments approximating a full circle.
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 32;

/// Computes buffer polygons around extracted geometries.
#[derive(Debug, Clone)]
pub struct BufferEngine {
    radius_m: f64,
    segments: usize,
    precision: u32,
}

impl Default for BufferEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_RADIUS_M)
    }
}

impl BufferEngine {
    /// Create an engine with the given radius and default resolution.
    pub fn new(radius_m: f64) -> Self {
        Self {
            radius_m,
            segments: DEFAULT_CIRCLE_SEGMENTS,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Set the number of circle segments (minimum 8).
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments.max(8);
        self
    }

    /// Set the decimals kept in output coordinates.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Buffer radius in meters.
    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Polygon covering every point within the radius of `source`.
    ///
    /// Output coordinates are `x = lon, y = lat`, rounded to the configured
    /// precision.
    pub fn buffer(&self, source: &BufferSource) -> Result<Polygon<f64>, BufferError> {
        if !self.radius_m.is_finite() || self.radius_m <= 0.0 {
            return Err(BufferError::InvalidRadius(self.radius_m));
        }

        let projected = match source {
            BufferSource::Point(point) => {
                let center = project(*point)?;
                circle(center, self.radius_m * mercator_scale(point.lat), self.segments)
            }
            BufferSource::Polygon(vertices) => self.buffer_polygon(vertices)?,
        };

        let geographic = projected.map_coords(|c| from_mercator(c).to_coord());
        Ok(reduce_precision(&geographic, self.precision))
    }

    fn buffer_polygon(&self, vertices: &[LatLon]) -> Result<Polygon<f64>, BufferError> {
        let (capsules, fill) = self.polygon_parts(vertices)?;

        let mut parts = capsules.clone();
        parts.push(fill);
        let merged = match try_cascade_union(parts) {
            Ok(merged) => merged,
            Err(message) => {
                // A self-intersecting ring cannot be filled; buffer its outline
                warn!(error = %message, "Polygon fill union failed, buffering outline only");
                try_cascade_union(capsules).map_err(BufferError::Union)?
            }
        };

        merged
            .0
            .into_iter()
            .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
            .ok_or_else(|| BufferError::Degenerate("empty union".to_string()))
    }

    /// Projected union operands of a polygon buffer: one capsule per ring
    /// edge, then the ring itself as a fill polygon.
    pub(crate) fn polygon_parts(
        &self,
        vertices: &[LatLon],
    ) -> Result<(Vec<MultiPolygon<f64>>, MultiPolygon<f64>), BufferError> {
        let mut ring: Vec<Coord<f64>> = Vec::with_capacity(vertices.len());
        for vertex in vertices {
            let c = project(*vertex)?;
            if ring.last() != Some(&c) {
                ring.push(c);
            }
        }
        // Closed ways repeat their first vertex
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(BufferError::Degenerate(format!(
                "{} distinct vertices",
                ring.len()
            )));
        }

        let mean_lat = vertices.iter().map(|v| v.lat).sum::<f64>() / vertices.len() as f64;
        let radius = self.radius_m * mercator_scale(mean_lat);

        let capsules = (0..ring.len())
            .map(|i| {
                let b = ring[(i + 1) % ring.len()];
                MultiPolygon::new(vec![capsule(ring[i], b, radius, self.segments)])
            })
            .collect();
        let fill = MultiPolygon::new(vec![Polygon::new(LineString::from(ring), Vec::new())]);
        Ok((capsules, fill))
    }
}

fn project(point: LatLon) -> Result<Coord<f64>, BufferError> {
    to_mercator(point).map_err(|_| BufferError::OutOfProjection(point.lat))
}

fn circle_points(center: Coord<f64>, radius: f64, segments: usize) -> Vec<Coord<f64>> {
    (0..segments)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / segments as f64;
            Coord {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect()
}

fn circle(center: Coord<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    Polygon::new(
        LineString::from(circle_points(center, radius, segments)),
        Vec::new(),
    )
}

fn capsule(a: Coord<f64>, b: Coord<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let points: Vec<Point<f64>> = circle_points(a, radius, segments)
        .into_iter()
        .chain(circle_points(b, radius, segments))
        .map(Point::from)
        .collect();
    MultiPoint::new(points).convex_hull()
}

/// Shared test geometry.
#[cfg(test)]
pub(crate) mod fixtures {
    use crate::coord::LatLon;

    /// An S-shaped street about 110 m long. Read as a closed ring, its
    /// closing edge crosses the middle segments.
    pub(crate) fn s_street() -> Vec<LatLon> {
        vec![
            LatLon::new(53.0700, 8.8000),
            LatLon::new(53.0700, 8.8010),
            LatLon::new(53.0705, 8.8010),
            LatLon::new(53.0705, 8.8000),
            LatLon::new(53.0710, 8.8000),
            LatLon::new(53.0710, 8.8010),
        ]
    }
}
