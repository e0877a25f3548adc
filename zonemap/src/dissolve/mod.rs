//! Union of visible buffers into the exclusion zone.
//!
//! [`dissolve`] is the synchronous cascaded union. [`DissolveWorker`] runs it
//! off the event loop behind a request/response channel pair and counts its
//! work in [`DissolveMetrics`].

mod engine;
mod metrics;
mod worker;

pub use engine::{dissolve, validate};
pub use metrics::{DissolveMetrics, DissolveSnapshot};
pub use worker::{
    DissolveRequest, DissolveResponse, DissolveWorker, DEFAULT_WORKER_CHANNEL_CAPACITY,
};
