//! # Core Configuration Module
//!
//! Configuration for the TopTunes core.
//!
//! ## Overview
//!
//! [`CoreConfig`] holds the bridge implementations and the few knobs the core
//! exposes: which feed to fetch, how long a request may take and how many
//! events the bus buffers. It is built through [`CoreConfigBuilder`], which
//! fails fast when a required bridge is missing.
//!
//! ## Required Dependencies
//!
//! - `MediaPlayer` - the host's shared preview player
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - desktop default: reqwest (`desktop-shims` feature)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, FeedConfig};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .feed(FeedConfig::new("gb", 25))
//!     .media_player(Arc::new(MyPlayer::default()))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{HttpClient, MediaPlayer};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Catalog host serving the ranked feeds.
pub const DEFAULT_FEED_HOST: &str = "https://itunes.apple.com";

/// Storefront used when none is configured.
pub const DEFAULT_COUNTRY: &str = "us";

/// Number of ranked entries requested by default.
pub const DEFAULT_FEED_LIMIT: u32 = 10;

/// Largest page the catalog will serve.
pub const MAX_FEED_LIMIT: u32 = 200;

/// Default timeout for feed requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Which ranked feed to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Two-letter storefront code
    pub country: String,
    /// Number of entries to request
    pub limit: u32,
    /// Full endpoint override; takes precedence over `country`/`limit`
    pub url_override: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY, DEFAULT_FEED_LIMIT)
    }
}

impl FeedConfig {
    pub fn new(country: impl Into<String>, limit: u32) -> Self {
        Self {
            country: country.into(),
            limit,
            url_override: None,
        }
    }

    /// Point the feed at an explicit URL (staging mirrors, fixtures).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url_override = Some(url.into());
        self
    }

    /// The endpoint the search service requests.
    pub fn endpoint(&self) -> String {
        match &self.url_override {
            Some(url) => url.clone(),
            None => format!(
                "{}/{}/rss/topsongs/limit={}/json",
                DEFAULT_FEED_HOST,
                self.country.to_lowercase(),
                self.limit
            ),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url_override.is_none() {
            if self.country.len() != 2 || !self.country.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(Error::Config(format!(
                    "Feed country must be a two-letter storefront code, got '{}'",
                    self.country
                )));
            }

            if self.limit == 0 || self.limit > MAX_FEED_LIMIT {
                return Err(Error::Config(format!(
                    "Feed limit must be between 1 and {}, got {}",
                    MAX_FEED_LIMIT, self.limit
                )));
            }
        }

        let endpoint = self.endpoint();
        let url = Url::parse(&endpoint)
            .map_err(|e| Error::Config(format!("Invalid feed URL '{}': {}", endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Feed URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(())
    }
}

/// Core configuration for the TopTunes core.
#[derive(Clone)]
pub struct CoreConfig {
    /// Feed selection
    pub feed: FeedConfig,

    /// Deadline applied to each feed request
    pub request_timeout: Duration,

    /// Per-subscriber buffer of the event bus
    pub event_buffer_size: usize,

    /// HTTP client used for feed requests
    pub http_client: Arc<dyn HttpClient>,

    /// The host's shared preview player
    pub media_player: Arc<dyn MediaPlayer>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("feed", &self.feed)
            .field("request_timeout", &self.request_timeout)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("http_client", &"HttpClient { ... }")
            .field("media_player", &"MediaPlayer { ... }")
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.feed.validate()?;

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(Error::Config(format!(
                "Request timeout exceeds maximum of {} seconds",
                MAX_REQUEST_TIMEOUT.as_secs()
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn media_player_missing_error() -> Error {
    Error::capability_missing(
        "MediaPlayer",
        "A MediaPlayer implementation is required for preview playback. \
         iOS: wrap AVPlayer. Android: wrap ExoPlayer. \
         Desktop: inject the host application's audio backend.",
    )
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_timeout(timeout)?);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(Error::capability_missing(
        "HttpClient",
        "No HTTP client implementation provided. \
         Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
         Mobile: inject the platform-native adapter.",
    ))
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    feed: Option<FeedConfig>,
    request_timeout: Option<Duration>,
    event_buffer_size: Option<usize>,
    http_client: Option<Arc<dyn HttpClient>>,
    media_player: Option<Arc<dyn MediaPlayer>>,
}

impl CoreConfigBuilder {
    pub fn feed(mut self, feed: FeedConfig) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Shorthand for a feed with an explicit endpoint.
    pub fn feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed = Some(self.feed.take().unwrap_or_default().with_url(url));
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn media_player(mut self, player: Arc<dyn MediaPlayer>) -> Self {
        self.media_player = Some(player);
        self
    }

    /// Builds the final configuration.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` when no `MediaPlayer` was supplied, or when no
    ///   `HttpClient` was supplied and no platform default is compiled in.
    /// - `Config` when validation fails.
    pub fn build(self) -> Result<CoreConfig> {
        let media_player = self.media_player.ok_or_else(media_player_missing_error)?;
        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let config = CoreConfig {
            feed: self.feed.unwrap_or_default(),
            request_timeout,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            http_client,
            media_player,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        HttpRequest, HttpResponse, MediaNotificationSender, PlaybackRequest, PlaybackSessionId,
    };

    struct NullHttp;

    #[async_trait]
    impl HttpClient for NullHttp {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse::new(200, "{}"))
        }
    }

    struct NullPlayer;

    #[async_trait]
    impl MediaPlayer for NullPlayer {
        async fn load(
            &self,
            _request: PlaybackRequest,
            _notifications: MediaNotificationSender,
        ) -> BridgeResult<PlaybackSessionId> {
            Ok(PlaybackSessionId::new())
        }
        async fn play(&self, _session: PlaybackSessionId) -> BridgeResult<()> {
            Ok(())
        }
        async fn pause(&self, _session: PlaybackSessionId) -> BridgeResult<()> {
            Ok(())
        }
        async fn seek(&self, _session: PlaybackSessionId, _position: Duration) -> BridgeResult<()> {
            Ok(())
        }
        async fn unload(&self, _session: PlaybackSessionId) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn base_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .http_client(Arc::new(NullHttp))
            .media_player(Arc::new(NullPlayer))
    }

    #[test]
    fn test_default_endpoint() {
        let feed = FeedConfig::default();
        assert_eq!(
            feed.endpoint(),
            "https://itunes.apple.com/us/rss/topsongs/limit=10/json"
        );
    }

    #[test]
    fn test_endpoint_lowercases_country() {
        let feed = FeedConfig::new("GB", 25);
        assert_eq!(
            feed.endpoint(),
            "https://itunes.apple.com/gb/rss/topsongs/limit=25/json"
        );
    }

    #[test]
    fn test_url_override_wins() {
        let feed = FeedConfig::default().with_url("http://localhost:8080/feed.json");
        assert_eq!(feed.endpoint(), "http://localhost:8080/feed.json");
        assert!(feed.validate().is_ok());
    }

    #[test]
    fn test_builder_with_defaults() {
        let config = base_builder().build().unwrap();
        assert_eq!(config.feed, FeedConfig::default());
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_requires_media_player() {
        let result = CoreConfig::builder().http_client(Arc::new(NullHttp)).build();
        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "MediaPlayer")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_http_client_without_shims() {
        let result = CoreConfig::builder().media_player(Arc::new(NullPlayer)).build();
        assert!(matches!(result, Err(Error::CapabilityMissing { .. })));
    }

    #[test]
    fn test_feed_url_shorthand() {
        let config = base_builder()
            .feed_url("https://mirror.example.com/top.json")
            .build()
            .unwrap();
        assert_eq!(config.feed.endpoint(), "https://mirror.example.com/top.json");
    }

    #[test]
    fn test_validate_rejects_bad_country() {
        let result = base_builder().feed(FeedConfig::new("usa", 10)).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_limit_out_of_range() {
        assert!(base_builder().feed(FeedConfig::new("us", 0)).build().is_err());
        assert!(base_builder()
            .feed(FeedConfig::new("us", MAX_FEED_LIMIT + 1))
            .build()
            .is_err());
        assert!(base_builder()
            .feed(FeedConfig::new("us", MAX_FEED_LIMIT))
            .build()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let result = base_builder().feed_url("not a url").build();
        assert!(matches!(result, Err(Error::Config(_))));

        let result = base_builder().feed_url("ftp://example.com/feed").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let result = base_builder().request_timeout(Duration::ZERO).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_excessive_timeout() {
        let result = base_builder()
            .request_timeout(Duration::from_secs(301))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let result = base_builder().event_buffer_size(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_debug_hides_bridges() {
        let config = base_builder().build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("HttpClient { ... }"));
        assert!(rendered.contains("limit: 10"));
    }
}
