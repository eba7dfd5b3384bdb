//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! - `HttpClient` using `reqwest`
//!
//! Desktop builds have no system media framework the core can assume, so the
//! `MediaPlayer` bridge is always injected by the host.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! ```

mod http;

pub use http::ReqwestHttpClient;
