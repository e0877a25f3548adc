//! Entity sources consumed by the map session.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::http::HttpClient;
use super::model::RawEntity;
use super::query::build_query;
use super::response::parse_entities;
use crate::coord::GeoBounds;
use crate::error::FetchError;

/// Default public Overpass endpoint.
pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Upstream provider of raw entities for a bounding box.
pub trait EntitySource: Send + Sync {
    /// Fetch every ban-relevant entity inside `bounds`.
    fn fetch(&self, bounds: GeoBounds) -> BoxFuture<'_, Result<Vec<RawEntity>, FetchError>>;
}

/// Queries an Overpass API endpoint.
pub struct OverpassSource<C: HttpClient> {
    client: C,
    endpoint: String,
    timeout_secs: u64,
}

impl<C: HttpClient> OverpassSource<C> {
    /// Create a source for `endpoint`; `timeout_secs` is sent as the query timeout.
    pub fn new(client: C, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout_secs,
        }
    }

    /// The endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<C: HttpClient> EntitySource for OverpassSource<C> {
    fn fetch(&self, bounds: GeoBounds) -> BoxFuture<'_, Result<Vec<RawEntity>, FetchError>> {
        Box::pin(async move {
            let query = build_query(&bounds, self.timeout_secs);
            debug!(endpoint = %self.endpoint, bbox = %bounds, "Querying Overpass");

            let body = self
                .client
                .post_form(&self.endpoint, vec![("data".to_string(), query)])
                .await
                .inspect_err(|e| warn!(error = %e, "Overpass request failed"))?;

            let entities = parse_entities(&body)?;
            debug!(count = entities.len(), "Overpass returned entities");
            Ok(entities)
        })
    }
}

/// In-memory source returning a fixed entity list.
///
/// Used for offline runs from a saved Overpass response and in tests. The
/// bounds of each call are ignored; the number of calls is recorded.
#[derive(Default)]
pub struct StaticSource {
    entities: Mutex<Vec<RawEntity>>,
    failure: Mutex<Option<FetchError>>,
    calls: AtomicUsize,
}

impl StaticSource {
    /// Create a source returning `entities`.
    pub fn new(entities: Vec<RawEntity>) -> Self {
        Self {
            entities: Mutex::new(entities),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Load a saved Overpass JSON response.
    pub fn from_file(path: &Path) -> Result<Self, FetchError> {
        let body = std::fs::read(path).map_err(|e| FetchError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(parse_entities(&body)?))
    }

    /// Replace the entities returned by later fetches.
    pub fn set_entities(&self, entities: Vec<RawEntity>) {
        *self.entities.lock() = entities;
    }

    /// Make later fetches fail with `error` (`None` to succeed again).
    pub fn set_failure(&self, error: Option<FetchError>) {
        *self.failure.lock() = error;
    }

    /// Number of fetches performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EntitySource for StaticSource {
    fn fetch(&self, _bounds: GeoBounds) -> BoxFuture<'_, Result<Vec<RawEntity>, FetchError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(self.entities.lock().clone()),
        };
        Box::pin(async move { result })
    }
}

impl<S: EntitySource + ?Sized> EntitySource for Arc<S> {
    fn fetch(&self, bounds: GeoBounds) -> BoxFuture<'_, Result<Vec<RawEntity>, FetchError>> {
        (**self).fetch(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;
    use crate::overpass::http::tests::MockHttpClient;
    use crate::overpass::model::tags;

    fn bremen() -> GeoBounds {
        GeoBounds::new(53.05, 53.09, 8.78, 8.84)
    }

    #[tokio::test]
    async fn test_overpass_source_posts_query() {
        let body = br#"{"elements": [{"type": "node", "id": 1, "lat": 53.07, "lon": 8.8}]}"#;
        let source = OverpassSource::new(
            MockHttpClient::new(Ok(body.to_vec())),
            DEFAULT_OVERPASS_ENDPOINT,
            25,
        );

        let entities = source.fetch(bremen()).await.unwrap();
        assert_eq!(entities.len(), 1);

        let requests = source.client.requests.lock();
        assert_eq!(requests.len(), 1);
        let (url, form) = &requests[0];
        assert_eq!(url, DEFAULT_OVERPASS_ENDPOINT);
        assert_eq!(form[0].0, "data");
        assert!(form[0].1.contains("[bbox:53.05,8.78,53.09,8.84]"));
    }

    #[tokio::test]
    async fn test_overpass_source_propagates_http_error() {
        let source = OverpassSource::new(
            MockHttpClient::new(Err(FetchError::Status {
                status: 429,
                url: "x".to_string(),
            })),
            "x",
            25,
        );
        let result = source.fetch(bremen()).await;
        assert!(matches!(result, Err(FetchError::Status { status: 429, .. })));
    }

    #[tokio::test]
    async fn test_static_source_counts_calls_and_fails_on_demand() {
        let source = StaticSource::new(vec![RawEntity::point(
            1,
            LatLon::new(53.07, 8.80),
            tags([("amenity", "school")]),
        )]);

        assert_eq!(source.fetch(bremen()).await.unwrap().len(), 1);
        source.set_failure(Some(FetchError::Http("down".to_string())));
        assert!(source.fetch(bremen()).await.is_err());
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn test_static_source_from_missing_file() {
        let result = StaticSource::from_file(Path::new("/nonexistent/overpass.json"));
        assert!(matches!(result, Err(FetchError::Io { .. })));
    }
}
