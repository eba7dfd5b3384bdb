//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host must implement for the TopTunes
//! core.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Fetches the catalog feed
//! - [`MediaPlayer`](playback::MediaPlayer) - The single shared preview player
//! - [`LoggerSink`](logging::LoggerSink) - Mirrors structured logs to the host
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Provides |
//! |----------|---------------------|----------|
//! | Desktop  | `bridge-desktop`    | `HttpClient` |
//! | iOS      | host app            | `HttpClient`, `MediaPlayer` |
//!
//! The core fails fast with
//! [`CapabilityMissing`](../core_runtime/enum.Error.html) when a required
//! bridge is not supplied.
//!
//! ## Error Handling
//!
//! All bridge traits report failures through [`BridgeError`](error::BridgeError).
//! Implementations should convert platform errors into the closest variant
//! (`Connection`, `Timeout`, `NotPlayable`) and keep the original message.
//!
//! ## Thread Safety
//!
//! On native targets every bridge trait requires `Send + Sync` so adapters can
//! be shared between tokio tasks behind an `Arc`.

pub mod error;
pub mod http;
pub mod logging;
pub mod platform;
pub mod playback;

pub use error::BridgeError;

pub use http::{CachePolicy, HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{
    notification_channel, MediaNotification, MediaNotificationReceiver, MediaNotificationSender,
    MediaPlayer, PlaybackMetadata, PlaybackRequest, PlaybackSessionId,
};
