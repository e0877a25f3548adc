//! Error taxonomy for the classification and zone pipeline.
//!
//! Every failure is scoped to the smallest unit it affects:
//!
//! - [`GeometryError`] - one entity could not be turned into shapes; the entity is skipped
//! - [`BufferError`] - one sub-geometry could not be buffered; its marker is still shown
//! - [`DissolveError`] - a whole union batch failed; the previous zone stays published
//! - [`FetchError`] - the data source failed; this refresh shows no new data
//!
//! None of these abort a refresh or the session.

use thiserror::Error;

use crate::overpass::EntityId;

/// An entity whose geometry cannot be extracted.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeometryError {
    /// A way (or way member) without any vertices.
    #[error("entity {entity} has a way with no vertices")]
    EmptyGeometry { entity: EntityId },

    /// A coordinate that is not finite or outside WGS84 range.
    #[error("entity {entity} has an invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { entity: EntityId, lat: f64, lon: f64 },

    /// A relation whose members are all nested relations (or absent).
    #[error("relation {entity} has no way or node members")]
    NoMembers { entity: EntityId },
}

/// Buffer computation failed for a single sub-geometry.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BufferError {
    /// Radius must be positive and finite.
    #[error("invalid buffer radius: {0}")]
    InvalidRadius(f64),

    /// The geometry lies outside the Web Mercator latitude range.
    #[error("latitude {0} is outside the projectable range")]
    OutOfProjection(f64),

    /// Input polygon collapses to fewer than three distinct vertices.
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    /// The polygon union inside the buffer failed.
    #[error("buffer union failed: {0}")]
    Union(String),
}

/// Union of a whole batch of buffers failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DissolveError {
    /// A polygon in the batch contains a non-finite coordinate.
    #[error("polygon {index} in dissolve batch has non-finite coordinates")]
    InvalidInput { index: usize },

    /// The union algorithm panicked or the blocking task was lost.
    #[error("union failed: {0}")]
    UnionFailed(String),

    /// The dissolve worker is no longer accepting requests.
    #[error("dissolve worker is unavailable")]
    WorkerUnavailable,
}

/// The upstream entity source failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body was not the expected JSON schema.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Reading a local source file failed.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_error_names_entity() {
        let err = GeometryError::EmptyGeometry {
            entity: EntityId::new("way", 7),
        };
        assert!(err.to_string().contains("way/7"));
    }

    #[test]
    fn test_fetch_status_display() {
        let err = FetchError::Status {
            status: 504,
            url: "https://overpass.example/api".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 504 from https://overpass.example/api");
    }
}
