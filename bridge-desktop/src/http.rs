//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("toptunes-core/", env!("CARGO_PKG_VERSION"));

/// Reqwest-based HTTP client implementation
///
/// One attempt per request: the feed is refreshed by the user, so failures
/// are reported straight back instead of being retried here.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new HTTP client with a default per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client (shared pools, proxies).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
        }
    }

    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn convert_error(error: reqwest::Error) -> BridgeError {
        if error.is_timeout() {
            BridgeError::Timeout
        } else if error.is_connect() {
            BridgeError::Connection(error.to_string())
        } else {
            BridgeError::OperationFailed(error.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(
            url = %request.url,
            cache_policy = ?request.cache_policy,
            "Executing HTTP request"
        );

        let response = self.build_request(request).send().await.map_err(|e| {
            warn!(error = %e, "HTTP request failed");
            Self::convert_error(e)
        })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response.bytes().await.map_err(Self::convert_error)?;

        debug!(status, bytes = body.len(), "HTTP response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
