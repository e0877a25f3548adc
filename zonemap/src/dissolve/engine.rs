//! Synchronous dissolve of a polygon batch.

use geo::{CoordsIter, MultiPolygon, Polygon};

use crate::error::DissolveError;
use crate::geometry::try_cascade_union;

/// Union a batch of polygons into a multipolygon.
///
/// Overlapping and touching inputs merge; disjoint inputs stay separate
/// members. An empty batch returns an empty multipolygon without running
/// the union.
pub fn dissolve(polygons: Vec<Polygon<f64>>) -> Result<MultiPolygon<f64>, DissolveError> {
    if polygons.is_empty() {
        return Ok(MultiPolygon::new(Vec::new()));
    }
    validate(&polygons)?;

    let parts = polygons
        .into_iter()
        .map(|p| MultiPolygon::new(vec![p]))
        .collect();
    try_cascade_union(parts).map_err(DissolveError::UnionFailed)
}

/// Reject polygons with non-finite coordinates.
pub fn validate(polygons: &[Polygon<f64>]) -> Result<(), DissolveError> {
    match polygons
        .iter()
        .position(|p| p.coords_iter().any(|c| !c.x.is_finite() || !c.y.is_finite()))
    {
        Some(index) => Err(DissolveError::InvalidInput { index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{fixtures, BufferEngine};
    use geo::{polygon, Area};

    fn square(x: f64, y: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
        ]
    }

    #[test]
    fn test_empty_input() {
        assert!(dissolve(Vec::new()).unwrap().0.is_empty());
    }

    #[test]
    fn test_disjoint_stay_separate() {
        let result = dissolve(vec![square(0.0, 0.0), square(5.0, 5.0)]).unwrap();
        assert_eq!(result.0.len(), 2);
    }

    #[test]
    fn test_overlapping_merge() {
        let a = square(0.0, 0.0);
        let b = square(0.5, 0.5);
        let sum = a.unsigned_area() + b.unsigned_area();

        let result = dissolve(vec![a, b]).unwrap();
        assert_eq!(result.0.len(), 1);
        assert!(result.unsigned_area() < sum);
        assert!((result.unsigned_area() - 1.75).abs() < 1e-9);
    }

    #[test]
    fn test_self_intersecting_input_is_union_failure() {
        // Edge capsules of an S-shaped street plus the street read as a
        // closed ring, which crosses itself
        let engine = BufferEngine::new(100.0);
        let (capsules, fill) = engine.polygon_parts(&fixtures::s_street()).unwrap();
        let polygons: Vec<Polygon<f64>> = capsules
            .into_iter()
            .chain(std::iter::once(fill))
            .flat_map(|mp| mp.0)
            .collect();

        assert!(matches!(
            dissolve(polygons),
            Err(DissolveError::UnionFailed(_))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let bad = polygon![
            (x: 0.0, y: 0.0),
            (x: f64::NAN, y: 0.0),
            (x: 1.0, y: 1.0),
        ];
        assert_eq!(
            dissolve(vec![square(0.0, 0.0), bad]),
            Err(DissolveError::InvalidInput { index: 1 })
        );
    }
}
