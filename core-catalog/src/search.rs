//! # Search Service
//!
//! Owns the lifecycle of the feed request and the resulting
//! [`SearchStatus`]/results pair.
//!
//! ## Request lifecycle
//!
//! ```text
//! fetch() ──> cancel previous ──> Searching ──> GET feed ──┬─> ResultsFound
//!                                                          ├─> NoResultsFound
//!                                                          └─> Error
//! ```
//!
//! At most one request is outstanding. Issuing a new fetch cancels the
//! previous one, and a superseded request never touches the state nor calls
//! its completion. Each fetch is tagged with a generation number and a
//! [`CancellationToken`]; the token stops the network call early and the
//! generation check catches anything that slips past it.

use crate::error::SearchError;
use crate::models::{SearchStatus, Track, TrackId};
use crate::parser::FeedParser;
use bridge_traits::http::{CachePolicy, HttpClient, HttpRequest, HttpResponse};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, SearchEvent};
use core_runtime::NetworkActivity;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Outcome handed to the presenter once a fetch settles.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCompletion {
    /// True when the feed was fetched and decoded, whatever its length.
    pub success: bool,
    /// The service's results after the fetch. Unchanged on failure.
    pub results: Vec<Track>,
    pub error: Option<SearchError>,
}

/// Fetches the ranked feed and exposes the current status and results.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SearchService {
    inner: Arc<Inner>,
}

struct Inner {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    request_timeout: Duration,
    events: EventBus,
    activity: NetworkActivity,
    state: Mutex<SearchState>,
}

#[derive(Default)]
struct SearchState {
    status: SearchStatus,
    /// Status left by the last fetch that ran to completion.
    settled: SearchStatus,
    results: Vec<Track>,
    last_error: Option<SearchError>,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl SearchService {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        endpoint: impl Into<String>,
        request_timeout: Duration,
        events: EventBus,
        activity: NetworkActivity,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http_client,
                endpoint: endpoint.into(),
                request_timeout,
                events,
                activity,
                state: Mutex::new(SearchState::default()),
            }),
        }
    }

    /// Build a service for the feed and HTTP client described by `config`.
    pub fn from_config(config: &CoreConfig, events: EventBus, activity: NetworkActivity) -> Self {
        Self::new(
            Arc::clone(&config.http_client),
            config.feed.endpoint(),
            config.request_timeout,
            events,
            activity,
        )
    }

    /// Start a fetch and deliver its outcome to `completion`.
    ///
    /// The status becomes [`SearchStatus::Searching`] before this returns.
    /// `completion` runs on the spawned task and is dropped uncalled if the
    /// fetch is superseded. Must be called from within a tokio runtime.
    pub fn fetch<F>(&self, use_cache: bool, completion: F) -> JoinHandle<()>
    where
        F: FnOnce(SearchCompletion) + Send + 'static,
    {
        let (generation, token) = self.begin(use_cache);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            if let Some(outcome) = inner.run(generation, token, use_cache).await {
                completion(outcome);
            }
        })
    }

    /// Fetch and wait for the outcome.
    ///
    /// Returns `None` when a newer fetch superseded this one.
    pub async fn search(&self, use_cache: bool) -> Option<SearchCompletion> {
        let (generation, token) = self.begin(use_cache);
        self.inner.run(generation, token, use_cache).await
    }

    /// Cancel the outstanding fetch, if any, without starting a new one.
    ///
    /// The status returns to what the last completed fetch left, and the
    /// cancelled fetch's completion is never called. Returns whether a fetch
    /// was outstanding.
    pub fn cancel(&self) -> bool {
        {
            let mut state = self.inner.state.lock();
            let Some(token) = state.in_flight.take() else {
                return false;
            };
            state.generation += 1;
            state.status = state.settled;
            token.cancel();
            debug!(
                generation = state.generation,
                status = ?state.status,
                "Cancelled in-flight search"
            );
        }

        let _ = self
            .inner
            .events
            .emit(CoreEvent::Search(SearchEvent::Cancelled));
        true
    }

    pub fn status(&self) -> SearchStatus {
        self.inner.state.lock().status
    }

    pub fn results(&self) -> Vec<Track> {
        self.inner.state.lock().results.clone()
    }

    pub fn result_count(&self) -> usize {
        self.inner.state.lock().results.len()
    }

    pub fn last_error(&self) -> Option<SearchError> {
        self.inner.state.lock().last_error.clone()
    }

    pub fn track(&self, id: &TrackId) -> Option<Track> {
        self.inner
            .state
            .lock()
            .results
            .iter()
            .find(|track| &track.id == id)
            .cloned()
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    fn begin(&self, use_cache: bool) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let generation = {
            let mut state = self.inner.state.lock();
            if let Some(previous) = state.in_flight.replace(token.clone()) {
                previous.cancel();
                debug!(generation = state.generation, "Superseded in-flight search");
            }
            state.generation += 1;
            state.status = SearchStatus::Searching;
            state.generation
        };

        let _ = self
            .inner
            .events
            .emit(CoreEvent::Search(SearchEvent::Started { use_cache }));

        (generation, token)
    }
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("endpoint", &self.inner.endpoint)
            .field("status", &self.status())
            .finish()
    }
}

impl Inner {
    #[instrument(skip(self, token), fields(endpoint = %self.endpoint))]
    async fn run(
        &self,
        generation: u64,
        token: CancellationToken,
        use_cache: bool,
    ) -> Option<SearchCompletion> {
        let _busy = self.activity.begin();

        let request = HttpRequest::get(&self.endpoint)
            .header("Accept", "application/json")
            .timeout(self.request_timeout)
            .cache_policy(CachePolicy::from_cache_enabled(use_cache));

        let response = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(generation, "Search cancelled before completion");
                return None;
            }
            response = self.http_client.execute(request) => response,
        };

        let outcome = response
            .map_err(SearchError::from)
            .and_then(Self::interpret);

        self.commit(generation, outcome)
    }

    fn interpret(response: HttpResponse) -> Result<Vec<Track>, SearchError> {
        if !response.is_ok() {
            return Err(SearchError::HttpStatus {
                status: response.status,
            });
        }

        FeedParser::parse(&response.body)
    }

    fn commit(
        &self,
        generation: u64,
        outcome: Result<Vec<Track>, SearchError>,
    ) -> Option<SearchCompletion> {
        let (completion, event) = {
            let mut state = self.state.lock();
            if state.generation != generation {
                debug!(
                    generation,
                    current = state.generation,
                    "Discarding stale search result"
                );
                return None;
            }
            state.in_flight = None;

            let committed = match outcome {
                Ok(tracks) => {
                    state.status = if tracks.is_empty() {
                        SearchStatus::NoResultsFound
                    } else {
                        SearchStatus::ResultsFound
                    };
                    state.results = tracks;
                    state.last_error = None;

                    info!(
                        result_count = state.results.len(),
                        status = ?state.status,
                        "Feed search completed"
                    );

                    let event = SearchEvent::Completed {
                        result_count: state.results.len(),
                    };
                    let completion = SearchCompletion {
                        success: true,
                        results: state.results.clone(),
                        error: None,
                    };
                    (completion, event)
                }
                Err(error) => {
                    warn!(error = %error, "Feed search failed");

                    state.status = SearchStatus::Error;
                    state.last_error = Some(error.clone());

                    let event = SearchEvent::Failed {
                        message: error.to_string(),
                    };
                    let completion = SearchCompletion {
                        success: false,
                        results: state.results.clone(),
                        error: Some(error),
                    };
                    (completion, event)
                }
            };
            state.settled = state.status;
            committed
        };

        let _ = self.events.emit(CoreEvent::Search(event));
        Some(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use core_runtime::config::DEFAULT_REQUEST_TIMEOUT;
    use mockall::mock;

    mock! {
        HttpClient {}

        #[async_trait::async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    const ENDPOINT: &str = "https://itunes.apple.com/us/rss/topsongs/limit=10/json";

    const TWO_ENTRIES: &str = r#"{"feed": {"entry": [
        {"im:name": {"label": "One"}, "id": {"attributes": {"im:id": "1"}}},
        {"im:name": {"label": "Two"}, "id": {"attributes": {"im:id": "2"}}}
    ]}}"#;

    fn service(mock: MockHttpClient) -> (SearchService, EventBus) {
        let events = EventBus::new(32);
        let activity = NetworkActivity::new(events.clone());
        let service = SearchService::new(
            Arc::new(mock),
            ENDPOINT,
            DEFAULT_REQUEST_TIMEOUT,
            events.clone(),
            activity,
        );
        (service, events)
    }

    #[tokio::test]
    async fn test_success_sets_results_found() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, TWO_ENTRIES)));

        let (service, _events) = service(mock);
        let completion = service.search(true).await.unwrap();

        assert!(completion.success);
        assert!(completion.error.is_none());
        assert_eq!(completion.results.len(), 2);
        assert_eq!(service.status(), SearchStatus::ResultsFound);
        assert_eq!(
            service.track(&TrackId::new("2")).and_then(|t| t.name),
            Some("Two".to_string())
        );
    }

    #[tokio::test]
    async fn test_request_targets_endpoint_with_cache_policy() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|request: &HttpRequest| {
                request.url == ENDPOINT
                    && request.cache_policy == CachePolicy::ReloadIgnoringCache
                    && request.headers.get("Cache-Control").map(String::as_str) == Some("no-cache")
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, TWO_ENTRIES)));

        let (service, _events) = service(mock);
        assert!(service.search(false).await.unwrap().success);
    }

    #[tokio::test]
    async fn test_zero_entries_is_no_results_found() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Ok(HttpResponse::new(200, r#"{"feed": {"entry": []}}"#)));

        let (service, _events) = service(mock);
        let completion = service.search(true).await.unwrap();

        assert!(completion.success);
        assert!(completion.results.is_empty());
        assert_eq!(service.status(), SearchStatus::NoResultsFound);
    }

    #[tokio::test]
    async fn test_missing_entry_is_no_results_found() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Ok(HttpResponse::new(200, r#"{"feed": {}}"#)));

        let (service, _events) = service(mock);
        assert!(service.search(true).await.unwrap().success);
        assert_eq!(service.status(), SearchStatus::NoResultsFound);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_error() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Ok(HttpResponse::new(200, "<html>maintenance</html>")));

        let (service, _events) = service(mock);
        let completion = service.search(true).await.unwrap();

        assert!(!completion.success);
        assert!(matches!(completion.error, Some(SearchError::Decode(_))));
        assert_eq!(service.status(), SearchStatus::Error);
    }

    #[tokio::test]
    async fn test_non_200_is_error_with_status() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Ok(HttpResponse::new(404, "Not Found")));

        let (service, _events) = service(mock);
        let completion = service.search(true).await.unwrap();

        assert!(!completion.success);
        assert_eq!(
            completion.error,
            Some(SearchError::HttpStatus { status: 404 })
        );
        assert_eq!(service.status(), SearchStatus::Error);
        assert_eq!(service.last_error(), completion.error);
    }

    #[tokio::test]
    async fn test_transport_error_keeps_previous_results() {
        let mut mock = MockHttpClient::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(HttpResponse::new(200, TWO_ENTRIES)));
        mock.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(BridgeError::Connection("offline".to_string())));

        let (service, _events) = service(mock);
        service.search(true).await.unwrap();

        let completion = service.search(false).await.unwrap();
        assert!(!completion.success);
        assert!(matches!(completion.error, Some(SearchError::Transport(_))));
        assert_eq!(completion.results.len(), 2);
        assert_eq!(service.result_count(), 2);
        assert_eq!(service.status(), SearchStatus::Error);
    }

    #[tokio::test]
    async fn test_fetch_sets_searching_synchronously() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Ok(HttpResponse::new(200, TWO_ENTRIES)));

        let (service, _events) = service(mock);
        let (tx, rx) = tokio::sync::oneshot::channel();

        let handle = service.fetch(true, move |completion| {
            let _ = tx.send(completion);
        });
        assert_eq!(service.status(), SearchStatus::Searching);

        handle.await.unwrap();
        let completion = rx.await.unwrap();
        assert!(completion.success);
        assert_eq!(service.status(), SearchStatus::ResultsFound);
    }

    #[tokio::test]
    async fn test_events_published_for_fetch() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Ok(HttpResponse::new(200, TWO_ENTRIES)));

        let (service, events) = service(mock);
        let mut stream = core_runtime::events::EventStream::new(events.subscribe())
            .filter(|event| matches!(event, CoreEvent::Search(_)));

        service.search(true).await.unwrap();

        assert_eq!(
            stream.try_recv().unwrap().unwrap(),
            CoreEvent::Search(SearchEvent::Started { use_cache: true })
        );
        assert_eq!(
            stream.try_recv().unwrap().unwrap(),
            CoreEvent::Search(SearchEvent::Completed { result_count: 2 })
        );
    }

    #[tokio::test]
    async fn test_stale_commit_is_discarded() {
        let mock = MockHttpClient::new();
        let (service, _events) = service(mock);

        let (stale_generation, _token) = service.begin(true);
        let (current_generation, _token) = service.begin(true);
        assert!(current_generation > stale_generation);

        let stale = service
            .inner
            .commit(stale_generation, Ok(vec![Track::new(TrackId::new("x"), 1)]));
        assert!(stale.is_none());
        assert_eq!(service.status(), SearchStatus::Searching);
        assert_eq!(service.result_count(), 0);
    }
}
