//! Geometry pipeline: extraction, buffering and polygon union.
//!
//! Raw entities are turned into renderable [`Shape`]s and [`BufferSource`]s by
//! the [`GeometryExtractor`]. The [`BufferEngine`] grows each source by a fixed
//! ground radius, and [`cascade_union`] merges polygon sets.
//!
//! All polygon output uses `x = longitude, y = latitude`.
//!
//! # Example
//!
//! ```ignore
//! use zonemap::geometry::{BufferEngine, GeometryExtractor};
//!
//! let extraction = GeometryExtractor::default().extract(&entity)?;
//! let engine = BufferEngine::new(100.0);
//! for source in extraction.sources() {
//!     let polygon = engine.buffer(source)?;
//! }
//! ```

mod buffer;
mod extract;
mod precision;
mod union;

#[cfg(test)]
pub(crate) use buffer::fixtures;
pub use buffer::{BufferEngine, DEFAULT_BUFFER_RADIUS_M, DEFAULT_CIRCLE_SEGMENTS};
pub use extract::{
    BufferSource, ExtractedPart, Extraction, GeometryExtractor, Shape, DEFAULT_MARKER_RADIUS_M,
    POLYGON_MIN_EXCLUSIVE_VERTICES,
};
pub use precision::{reduce_precision, round_to, DEFAULT_PRECISION};
pub use union::{cascade_union, panic_message, try_cascade_union};
