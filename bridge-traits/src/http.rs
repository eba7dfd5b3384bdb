//! HTTP Client Abstraction
//!
//! The catalog feed is fetched through this trait so hosts can plug in their
//! own networking stack (URLSession, OkHttp, reqwest) and tests can stub the
//! transport entirely.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;

/// HTTP method types. The feed is only ever read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

/// How the transport may use a shared response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Let the transport (or any intermediate cache) serve a stored response.
    #[default]
    UseProtocolCachePolicy,
    /// Force a fresh response from the origin.
    ReloadIgnoringCache,
}

impl CachePolicy {
    /// Map the "cache enabled" flag used by feed fetches to a policy.
    pub fn from_cache_enabled(cache_enabled: bool) -> Self {
        if cache_enabled {
            Self::UseProtocolCachePolicy
        } else {
            Self::ReloadIgnoringCache
        }
    }

    /// Request headers that express this policy on the wire.
    pub fn request_headers(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::UseProtocolCachePolicy => &[],
            Self::ReloadIgnoringCache => &[("Cache-Control", "no-cache"), ("Pragma", "no-cache")],
        }
    }
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
    pub cache_policy: CachePolicy,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
            cache_policy: CachePolicy::default(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the cache policy and add the matching request headers.
    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        for (key, value) in policy.request_headers() {
            self.headers.insert((*key).to_string(), (*value).to_string());
        }
        self
    }
}

/// HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// The feed contract only accepts a plain 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Async HTTP client trait
///
/// Implementations should map transport failures onto
/// [`BridgeError`](crate::error::BridgeError):
/// connection problems to `Connection`, deadline overruns to `Timeout`.
/// Non-2xx responses are *not* errors at this layer; callers inspect
/// [`HttpResponse::status`].
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{CachePolicy, HttpClient, HttpRequest};
///
/// async fn fetch_feed(client: &dyn HttpClient, url: &str) -> Result<Bytes> {
///     let request = HttpRequest::get(url).cache_policy(CachePolicy::ReloadIgnoringCache);
///     let response = client.execute(request).await?;
///     Ok(response.body)
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network connection fails
    /// - TLS validation fails
    /// - Request times out
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}
