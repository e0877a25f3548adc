//! Coordinate precision reduction.
//!
//! Buffers are rounded to a fixed number of decimals before they reach the
//! union. Fewer distinct vertices keep the union numerically stable and fast.

use geo::{Coord, MapCoords, Polygon, RemoveRepeatedPoints};

/// Default decimals kept in degree coordinates (~0.1 m).
pub const DEFAULT_PRECISION: u32 = 6;

/// Round `value` to `decimals` decimal places.
#[inline]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10.0_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Round every vertex of `polygon` and drop vertices that collapse together.
pub fn reduce_precision(polygon: &Polygon<f64>, decimals: u32) -> Polygon<f64> {
    polygon
        .map_coords(|c| Coord {
            x: round_to(c.x, decimals),
            y: round_to(c.y, decimals),
        })
        .remove_repeated_points()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(8.123_456_789, 6), 8.123_457);
        assert_eq!(round_to(-53.000_000_4, 6), -53.0);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn test_reduce_precision_merges_close_vertices() {
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 0.000_000_1, y: 0.000_000_1),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
        ];
        let reduced = reduce_precision(&poly, 6);
        // Closed ring: 4 distinct vertices + closing point
        assert_eq!(reduced.exterior().0.len(), 4);
        assert_eq!(reduced.exterior().0[0], Coord { x: 0.0, y: 0.0 });
    }
}
