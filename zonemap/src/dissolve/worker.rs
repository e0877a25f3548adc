//! Background dissolve worker.
//!
//! The worker owns the request side of a channel pair. Each request carries a
//! generation number; when several requests are queued only the newest one is
//! computed and the rest are counted as superseded. Unions run on the blocking
//! pool so the caller's event loop keeps turning.
//!
//! # Example
//!
//! ```ignore
//! use zonemap::dissolve::{DissolveRequest, DissolveWorker};
//!
//! let (worker, request_tx, mut response_rx) = DissolveWorker::new(16);
//! let shutdown = CancellationToken::new();
//! tokio::spawn(worker.run(shutdown.clone()));
//!
//! request_tx.send(DissolveRequest::new(1, buffers)).await?;
//! let response = response_rx.recv().await;
//! ```

use std::sync::Arc;

use geo::{MultiPolygon, Polygon};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::engine::dissolve;
use super::metrics::DissolveMetrics;
use crate::error::DissolveError;

/// Default capacity of the request and response channels.
pub const DEFAULT_WORKER_CHANNEL_CAPACITY: usize = 16;

/// A batch of polygons to union.
#[derive(Debug, Clone)]
pub struct DissolveRequest {
    pub generation: u64,
    pub polygons: Vec<Polygon<f64>>,
}

impl DissolveRequest {
    pub fn new(generation: u64, polygons: Vec<Polygon<f64>>) -> Self {
        Self {
            generation,
            polygons,
        }
    }
}

/// The union of a batch, tagged with the request's generation.
#[derive(Debug, Clone)]
pub struct DissolveResponse {
    pub generation: u64,
    pub result: Result<MultiPolygon<f64>, DissolveError>,
}

/// Long-running union task.
pub struct DissolveWorker {
    request_rx: mpsc::Receiver<DissolveRequest>,
    response_tx: mpsc::Sender<DissolveResponse>,
    metrics: Arc<DissolveMetrics>,
}

impl DissolveWorker {
    /// Create a worker with its request sender and response receiver.
    pub fn new(
        capacity: usize,
    ) -> (
        Self,
        mpsc::Sender<DissolveRequest>,
        mpsc::Receiver<DissolveResponse>,
    ) {
        let (request_tx, request_rx) = mpsc::channel(capacity);
        let (response_tx, response_rx) = mpsc::channel(capacity);
        let worker = Self {
            request_rx,
            response_tx,
            metrics: Arc::new(DissolveMetrics::new()),
        };
        (worker, request_tx, response_rx)
    }

    /// Shared handle to the worker's counters.
    pub fn metrics(&self) -> Arc<DissolveMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Serve requests until shutdown, or until either channel closes.
    pub async fn run(self, shutdown: CancellationToken) {
        debug!("Dissolve worker starting");

        let Self {
            mut request_rx,
            response_tx,
            metrics,
        } = self;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    debug!("Dissolve worker shutting down");
                    break;
                }

                request = request_rx.recv() => {
                    let Some(mut request) = request else {
                        debug!("Dissolve request channel closed");
                        break;
                    };

                    // Only the newest queued batch matters
                    let mut superseded = 0u64;
                    while let Ok(newer) = request_rx.try_recv() {
                        request = newer;
                        superseded += 1;
                    }
                    if superseded > 0 {
                        metrics.requests_superseded(superseded);
                        debug!(
                            generation = request.generation,
                            superseded,
                            "Dropped superseded dissolve requests"
                        );
                    }

                    let response = Self::process(request, &metrics).await;
                    if response_tx.send(response).await.is_err() {
                        debug!("Dissolve response channel closed");
                        break;
                    }
                }
            }
        }

        let snapshot = metrics.snapshot();
        info!(
            unions = snapshot.unions_run,
            empty = snapshot.empty_short_circuits,
            superseded = snapshot.superseded,
            failures = snapshot.failures,
            "Dissolve worker stopped"
        );
    }

    async fn process(request: DissolveRequest, metrics: &DissolveMetrics) -> DissolveResponse {
        let DissolveRequest {
            generation,
            polygons,
        } = request;

        if polygons.is_empty() {
            metrics.empty_short_circuit();
            return DissolveResponse {
                generation,
                result: Ok(MultiPolygon::new(Vec::new())),
            };
        }

        let count = polygons.len();
        let result = match tokio::task::spawn_blocking(move || dissolve(polygons)).await {
            Ok(result) => result,
            Err(e) => Err(DissolveError::UnionFailed(e.to_string())),
        };

        match &result {
            Ok(zone) => {
                metrics.union_run();
                debug!(
                    generation,
                    inputs = count,
                    polygons = zone.0.len(),
                    "Dissolve completed"
                );
            }
            Err(e) => {
                metrics.failure();
                warn!(generation, inputs = count, error = %e, "Dissolve failed");
            }
        }

        DissolveResponse { generation, result }
    }
}
