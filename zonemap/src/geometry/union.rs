//! Cascaded polygon union shared by the buffer and dissolve engines.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::{BooleanOps, MultiPolygon};
use rayon::prelude::*;

/// Union all inputs by merging pairs level by level.
///
/// Each level halves the number of operands, so no single union grows much
/// larger than its inputs. Pairs of a level are independent and run on the
/// rayon pool. A single input is returned unchanged.
pub fn cascade_union(mut parts: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    while parts.len() > 1 {
        parts = parts
            .par_chunks(2)
            .map(|pair| match pair {
                [a, b] => a.union(b),
                [a] => a.clone(),
                _ => MultiPolygon::new(Vec::new()),
            })
            .collect();
    }
    parts.pop().unwrap_or_else(|| MultiPolygon::new(Vec::new()))
}

/// [`cascade_union`] with panics from the boolean-ops sweep caught.
///
/// Malformed rings (self-intersections, spikes) can make the sweep line
/// panic; the message is returned as the error instead.
pub fn try_cascade_union(parts: Vec<MultiPolygon<f64>>) -> Result<MultiPolygon<f64>, String> {
    catch_unwind(AssertUnwindSafe(|| cascade_union(parts))).map_err(panic_message)
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ]])
    }

    #[test]
    fn test_empty_union() {
        assert!(cascade_union(Vec::new()).0.is_empty());
    }

    #[test]
    fn test_single_input_unchanged() {
        let result = cascade_union(vec![square(0.0, 0.0, 1.0)]);
        assert_eq!(result, square(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_odd_count_chain_merges() {
        // Three overlapping squares in a row merge into one polygon
        let result = cascade_union(vec![
            square(0.0, 0.0, 2.0),
            square(1.0, 0.0, 2.0),
            square(2.0, 0.0, 2.0),
        ]);
        assert_eq!(result.0.len(), 1);
        assert!((result.unsigned_area() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_panic_becomes_error() {
        let engine = crate::geometry::BufferEngine::new(100.0);
        let (mut parts, fill) = engine
            .polygon_parts(&crate::geometry::fixtures::s_street())
            .unwrap();
        parts.push(fill);

        let message = try_cascade_union(parts).unwrap_err();
        assert!(!message.is_empty());
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("bang".to_string())), "bang");
        assert_eq!(panic_message(Box::new(42)), "unknown panic");
    }
}
