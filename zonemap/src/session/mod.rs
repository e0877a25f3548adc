//! Map session: the event loop tying fetches, layers and the zone together.
//!
//! A [`MapSession`] owns the category layers, the current viewport and a
//! [`DissolveWorker`]. It reacts to four kinds of events:
//!
//! - user commands (move, show/hide category, refresh)
//! - fetch completions from spawned fetch tasks
//! - dissolve responses from the worker
//! - the debounce deadline for a scheduled dissolve
//!
//! Everything runs on one cooperative loop, so layers need no locking. Each
//! dissolve gets a new generation number and responses older than the latest
//! generation are dropped. Published zones go out through a `watch` channel.
//!
//! # Example
//!
//! ```ignore
//! use zonemap::session::{MapSession, SessionCommand, SessionConfig, Viewport};
//!
//! let mut session = MapSession::new(source, MarkerBuilder::default(), SessionConfig::default());
//! let mut zones = session.subscribe();
//!
//! session.move_to(Viewport::from_hash("#@53.07,8.80,14", 1280, 800)?);
//! session.settle().await;
//! println!("{} polygons", zones.borrow().polygons.0.len());
//! ```

mod viewport;

pub use viewport::{
    ViewHash, Viewport, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, VIEW_HASH_DECIMALS,
};

use std::sync::Arc;
use std::time::Duration;

use geo::{ChamberlainDuquetteArea, MultiPolygon};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::classify::Category;
use crate::dissolve::{
    DissolveMetrics, DissolveRequest, DissolveResponse, DissolveWorker,
    DEFAULT_WORKER_CHANNEL_CAPACITY,
};
use crate::error::{DissolveError, FetchError};
use crate::layers::CategoryLayers;
use crate::marker::MarkerBuilder;
use crate::overpass::{EntitySource, RawEntity};
use crate::reconcile::reconcile;

// =============================================================================
// Configuration
// =============================================================================

/// Default minimum zoom at which fetches are issued.
pub const DEFAULT_MIN_ZOOM: u8 = 12;

/// Default debounce window for dissolve scheduling.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Session tuning.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fetches below this zoom are skipped.
    pub min_zoom: u8,
    /// Scheduled dissolves within this window coalesce.
    pub debounce: Duration,
    /// Screen size used to derive viewport bounds.
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// When false the raw buffers are published without a union.
    pub dissolve_enabled: bool,
    /// Capacity of the dissolve worker channels.
    pub worker_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            debounce: DEFAULT_DEBOUNCE,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            dissolve_enabled: true,
            worker_capacity: DEFAULT_WORKER_CHANNEL_CAPACITY,
        }
    }
}

// =============================================================================
// Events and outputs
// =============================================================================

/// User input to a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    MoveTo(Viewport),
    SetVisible(Category, bool),
    Refresh,
}

/// What a fetch request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    /// No viewport has been set yet.
    NoViewport,
    /// The viewport zoom is below the minimum.
    BelowMinZoom,
    /// A fetch is already running; this request was dropped.
    InFlight,
    /// A fetch task was spawned.
    Started,
}

/// The dissolved union of buffers over visible categories.
#[derive(Debug, Clone, PartialEq)]
pub struct ExclusionZone {
    /// Dissolve generation that produced this zone (0 before the first).
    pub generation: u64,
    /// Zone polygons, `x = lon, y = lat`.
    pub polygons: MultiPolygon<f64>,
    /// Categories whose buffers are included.
    pub categories: Vec<Category>,
}

impl ExclusionZone {
    /// The zone published before any dissolve completes.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            polygons: MultiPolygon::new(Vec::new()),
            categories: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.0.is_empty()
    }

    /// Approximate ground area in square meters.
    pub fn area_m2(&self) -> f64 {
        self.polygons.chamberlain_duquette_unsigned_area()
    }
}

// =============================================================================
// Session
// =============================================================================

/// Interactive map state and its event loop.
pub struct MapSession {
    config: SessionConfig,
    source: Arc<dyn EntitySource>,
    builder: Arc<MarkerBuilder>,
    layers: CategoryLayers,
    viewport: Option<Viewport>,

    fetch_in_flight: bool,
    fetch_tx: mpsc::UnboundedSender<Result<Vec<RawEntity>, FetchError>>,
    fetch_rx: mpsc::UnboundedReceiver<Result<Vec<RawEntity>, FetchError>>,

    dissolve_tx: mpsc::Sender<DissolveRequest>,
    dissolve_rx: mpsc::Receiver<DissolveResponse>,
    dissolve_metrics: Arc<DissolveMetrics>,
    worker_shutdown: CancellationToken,

    /// Armed by the first schedule request of a burst.
    dissolve_deadline: Option<Instant>,
    /// Latest allocated dissolve generation.
    generation: u64,
    /// Generation posted to the worker and not yet answered.
    awaiting: Option<u64>,
    /// Categories included in the latest posted generation.
    posted_categories: Vec<Category>,

    zone_tx: watch::Sender<ExclusionZone>,
}

impl MapSession {
    /// Create a session and spawn its dissolve worker.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(
        source: Arc<dyn EntitySource>,
        builder: MarkerBuilder,
        config: SessionConfig,
    ) -> Self {
        let (worker, dissolve_tx, dissolve_rx) = DissolveWorker::new(config.worker_capacity);
        let dissolve_metrics = worker.metrics();
        let worker_shutdown = CancellationToken::new();
        tokio::spawn(worker.run(worker_shutdown.clone()));

        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let (zone_tx, _) = watch::channel(ExclusionZone::empty());

        Self {
            config,
            source,
            builder: Arc::new(builder),
            layers: CategoryLayers::new(),
            viewport: None,
            fetch_in_flight: false,
            fetch_tx,
            fetch_rx,
            dissolve_tx,
            dissolve_rx,
            dissolve_metrics,
            worker_shutdown,
            dissolve_deadline: None,
            generation: 0,
            awaiting: None,
            posted_categories: Vec::new(),
            zone_tx,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn layers(&self) -> &CategoryLayers {
        &self.layers
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// Whether a dissolve is scheduled but not yet posted.
    pub fn is_dissolve_scheduled(&self) -> bool {
        self.dissolve_deadline.is_some()
    }

    /// Latest allocated dissolve generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn dissolve_metrics(&self) -> Arc<DissolveMetrics> {
        Arc::clone(&self.dissolve_metrics)
    }

    /// Receiver notified on every published zone.
    pub fn subscribe(&self) -> watch::Receiver<ExclusionZone> {
        self.zone_tx.subscribe()
    }

    /// The currently published zone.
    pub fn zone(&self) -> ExclusionZone {
        self.zone_tx.borrow().clone()
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Record a new viewport, request a fetch and return its view hash.
    pub fn move_to(&mut self, viewport: Viewport) -> String {
        let hash = viewport.hash();
        self.viewport = Some(viewport);
        let decision = self.request_fetch();
        debug!(view = %hash, decision = ?decision, "Viewport moved");
        hash
    }

    /// Start a fetch for the current viewport if allowed.
    pub fn request_fetch(&mut self) -> FetchDecision {
        let Some(viewport) = self.viewport else {
            return FetchDecision::NoViewport;
        };
        if viewport.zoom < self.config.min_zoom {
            debug!(
                zoom = viewport.zoom,
                min_zoom = self.config.min_zoom,
                "Zoom below minimum, not fetching"
            );
            return FetchDecision::BelowMinZoom;
        }
        if self.fetch_in_flight {
            debug!("Fetch already in flight, dropping request");
            return FetchDecision::InFlight;
        }

        self.fetch_in_flight = true;
        let source = Arc::clone(&self.source);
        let tx = self.fetch_tx.clone();
        let bounds = viewport.bounds;
        debug!(bounds = %bounds, "Starting fetch");
        tokio::spawn(async move {
            let result = source.fetch(bounds).await;
            // Receiver only goes away with the session
            let _ = tx.send(result);
        });
        FetchDecision::Started
    }

    /// Apply a completed fetch.
    ///
    /// A failed fetch leaves every marker in place. A successful one is
    /// reconciled against the loaded markers and schedules a dissolve. New
    /// markers are built on the blocking pool.
    pub async fn apply_fetch(&mut self, result: Result<Vec<RawEntity>, FetchError>) {
        self.fetch_in_flight = false;

        let entities = match result {
            Ok(entities) => entities,
            Err(e) => {
                warn!(error = %e, "Fetch failed, keeping current markers");
                return;
            }
        };

        let fetched = entities.len();
        let reconciliation = reconcile(&self.layers.snapshot(), entities);
        let kept = reconciliation.keep.len();
        let removed = reconciliation.remove.len();

        for marker in &reconciliation.remove {
            self.layers.remove_marker(marker.id());
        }
        let builder = Arc::clone(&self.builder);
        let create = reconciliation.create;
        let created = match tokio::task::spawn_blocking(move || builder.build_all(create)).await {
            Ok(markers) => markers,
            Err(e) => {
                warn!(error = %e, "Marker build task failed");
                Vec::new()
            }
        };
        let added = created.len();
        for marker in created {
            self.layers.add_marker(Arc::new(marker));
        }

        info!(fetched, kept, removed, added, "Applied fetch");
        self.schedule_dissolve();
    }

    /// Show or hide a category. Returns whether visibility changed.
    pub fn set_visible(&mut self, category: Category, visible: bool) -> bool {
        let changed = self.layers.set_visible(category, visible);
        if changed {
            debug!(category = %category, visible, "Visibility changed");
            self.schedule_dissolve();
        }
        changed
    }

    /// Dispatch a user command.
    pub fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::MoveTo(viewport) => {
                self.move_to(viewport);
            }
            SessionCommand::SetVisible(category, visible) => {
                self.set_visible(category, visible);
            }
            SessionCommand::Refresh => {
                let decision = self.request_fetch();
                debug!(decision = ?decision, "Refresh requested");
            }
        }
    }

    /// Arm the debounce deadline unless one is already armed.
    pub fn schedule_dissolve(&mut self) {
        if self.dissolve_deadline.is_none() {
            self.dissolve_deadline = Some(Instant::now() + self.config.debounce);
        }
    }

    /// Post the visible buffers under a new generation.
    ///
    /// With the dissolve stage disabled the raw buffers are published
    /// immediately instead.
    pub fn fire_dissolve(&mut self) {
        self.dissolve_deadline = None;
        self.generation += 1;
        let generation = self.generation;
        let polygons = self.layers.visible_buffers();
        let categories = self.layers.visible_categories();

        if !self.config.dissolve_enabled {
            debug!(generation, buffers = polygons.len(), "Publishing raw buffers");
            self.publish(ExclusionZone {
                generation,
                polygons: MultiPolygon::new(polygons),
                categories,
            });
            return;
        }

        let count = polygons.len();
        match self
            .dissolve_tx
            .try_send(DissolveRequest::new(generation, polygons))
        {
            Ok(()) => {
                debug!(generation, buffers = count, "Posted dissolve request");
                self.awaiting = Some(generation);
                self.posted_categories = categories;
            }
            Err(TrySendError::Full(_)) => {
                debug!(generation, "Dissolve worker busy, rescheduling");
                self.schedule_dissolve();
            }
            Err(TrySendError::Closed(_)) => {
                warn!(generation, error = %DissolveError::WorkerUnavailable, "Dissolve not posted");
            }
        }
    }

    /// Apply a worker response. Returns whether a zone was published.
    pub fn apply_dissolve(&mut self, response: DissolveResponse) -> bool {
        if response.generation < self.generation {
            debug!(
                generation = response.generation,
                latest = self.generation,
                "Discarding stale dissolve result"
            );
            return false;
        }
        if self.awaiting == Some(response.generation) {
            self.awaiting = None;
        }

        match response.result {
            Ok(polygons) => {
                self.publish(ExclusionZone {
                    generation: response.generation,
                    polygons,
                    categories: self.posted_categories.clone(),
                });
                true
            }
            Err(e) => {
                warn!(
                    generation = response.generation,
                    error = %e,
                    "Dissolve failed, keeping previous zone"
                );
                false
            }
        }
    }

    fn publish(&mut self, zone: ExclusionZone) {
        info!(
            generation = zone.generation,
            polygons = zone.polygons.0.len(),
            area_m2 = zone.area_m2().round(),
            "Published exclusion zone"
        );
        self.zone_tx.send_replace(zone);
    }

    /// Whether a fetch, scheduled dissolve or awaited response remains.
    pub fn has_pending(&self) -> bool {
        self.fetch_in_flight || self.dissolve_deadline.is_some() || self.awaiting.is_some()
    }

    // -------------------------------------------------------------------------
    // Event loop
    // -------------------------------------------------------------------------

    /// Drive internal events until nothing is pending.
    pub async fn settle(&mut self) {
        while self.has_pending() {
            let deadline = self.dissolve_deadline;
            tokio::select! {
                Some(result) = self.fetch_rx.recv(), if self.fetch_in_flight => {
                    self.apply_fetch(result).await;
                }
                Some(response) = self.dissolve_rx.recv(), if self.awaiting.is_some() => {
                    self.apply_dissolve(response);
                }
                _ = wait_until(deadline), if deadline.is_some() => {
                    self.fire_dissolve();
                }
                else => {
                    warn!("Dissolve worker gone, abandoning pending work");
                    self.awaiting = None;
                    break;
                }
            }
        }
    }

    /// Run the session until `shutdown` fires.
    ///
    /// When the command channel closes, pending work is settled and the
    /// loop returns.
    pub async fn run(
        &mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        shutdown: CancellationToken,
    ) {
        info!("Map session started");

        loop {
            let deadline = self.dissolve_deadline;
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Map session shutting down");
                    break;
                }

                Some(result) = self.fetch_rx.recv() => {
                    self.apply_fetch(result).await;
                }

                Some(response) = self.dissolve_rx.recv() => {
                    self.apply_dissolve(response);
                }

                _ = wait_until(deadline), if deadline.is_some() => {
                    self.fire_dissolve();
                }

                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        debug!("Command channel closed, settling");
                        self.settle().await;
                        break;
                    }
                },
            }
        }
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        self.worker_shutdown.cancel();
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
