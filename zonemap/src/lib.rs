//! Zonemap - consumption-ban exclusion zones from OpenStreetMap data
//!
//! This library fetches schools, playgrounds, sports facilities and pedestrian
//! zones for a map viewport, classifies them into ban categories, grows each
//! one by a fixed ground radius and dissolves the visible buffers into a single
//! exclusion zone.
//!
//! # Pipeline
//!
//! ```text
//! EntitySource ──► reconcile ──► MarkerBuilder ──► CategoryLayers
//!  (Overpass)      (by id)       classify+extract    (visibility)
//!                                +buffer                  │
//!                                                         ▼
//!              watch::Receiver ◄── MapSession ◄── DissolveWorker
//!              (ExclusionZone)     (event loop)    (cascaded union)
//! ```

pub mod classify;
pub mod config;
pub mod coord;
pub mod dissolve;
pub mod error;
pub mod export;
pub mod geometry;
pub mod layers;
pub mod logging;
pub mod marker;
pub mod overpass;
pub mod reconcile;
pub mod session;

pub use classify::{classify, Category};
pub use error::{BufferError, DissolveError, FetchError, GeometryError};
pub use marker::{ClassifiedMarker, MarkerBuilder};
pub use session::{ExclusionZone, MapSession, SessionCommand, SessionConfig, Viewport};
