//! # Logging & Tracing Infrastructure
//!
//! Configures `tracing-subscriber` for the TopTunes core:
//! - Pretty, JSON and compact output formats
//! - Crate-level filtering with `EnvFilter`
//! - Forwarding to the host's logging pipeline via `LoggerSink`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::{ConsoleLogger, LogLevel};
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use std::sync::Arc;
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Pretty)
//!     .with_level(LogLevel::Debug)
//!     .with_logger_sink(Arc::new(ConsoleLogger::default()));
//!
//! init_logging(config)?;
//! tracing::info!("Feed loaded");
//! ```
//!
//! ## LoggerSink integration
//!
//! When a sink is configured every event that survives filtering is mirrored
//! to it as a [`LogEntry`] carrying the message, the event's fields and the
//! name of the innermost span. Inside a tokio runtime the sink is called on a
//! spawned task; otherwise the call completes on the emitting thread.

use crate::error::{Error, Result};
use bridge_traits::{LogEntry, LogLevel, LoggerSink};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::format::FmtSpan,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer,
};

/// Crates whose events follow the configured level.
const CORE_TARGETS: &[&str] = &[
    "toptunes_workspace",
    "core_runtime",
    "core_catalog",
    "core_playback",
    "core_service",
    "bridge_desktop",
];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Minimum level for the core crates
    pub level: LogLevel,
    /// Custom filter string (e.g., "core_catalog=debug,core_playback=trace")
    pub filter: Option<String>,
    /// Optional sink mirroring events to the host
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    /// Emit span enter/exit records
    pub enable_spans: bool,
    pub display_target: bool,
    pub display_thread_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            logger_sink: None,
            enable_spans: true,
            display_target: true,
            display_thread_info: false,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("filter", &self.filter)
            .field("has_logger_sink", &self.logger_sink.is_some())
            .field("enable_spans", &self.enable_spans)
            .finish()
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn with_spans(mut self, enable: bool) -> Self {
        self.enable_spans = enable;
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    pub fn with_thread_info(mut self, display: bool) -> Self {
        self.display_thread_info = display;
        self
    }
}

/// Initialize the global subscriber.
///
/// Call once during application startup.
///
/// # Errors
///
/// `Error::Config` when the filter is invalid or a global subscriber is
/// already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;
    let sink_layer = LoggerSinkLayer::new(config.logger_sink.clone());
    let registry = tracing_subscriber::registry().with(filter).with(sink_layer);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_thread_names(config.display_thread_info)
                    .with_span_events(if config.enable_spans {
                        FmtSpan::ACTIVE
                    } else {
                        FmtSpan::NONE
                    })
                    .with_writer(io::stdout),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(config.enable_spans)
                    .with_span_list(config.enable_spans)
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_thread_names(config.display_thread_info)
                    .with_writer(io::stdout),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_thread_names(config.display_thread_info)
                    .with_writer(io::stdout),
            )
            .try_init(),
    };

    result.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let filter_string = match &config.filter {
        Some(custom) => custom.clone(),
        None => default_filter_directives(config.level),
    };

    EnvFilter::try_new(filter_string)
        .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
}

/// Core crates at `level`, HTTP plumbing at warn.
fn default_filter_directives(level: LogLevel) -> String {
    let level = level.as_directive();
    let mut directives: Vec<String> = CORE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect();
    directives.extend(["h2=warn", "hyper=warn", "reqwest=warn", "rustls=warn"].map(String::from));
    directives.join(",")
}

/// Layer that forwards events to a `LoggerSink` implementation.
struct LoggerSinkLayer {
    sink: Option<Arc<dyn LoggerSink>>,
}

impl LoggerSinkLayer {
    fn new(sink: Option<Arc<dyn LoggerSink>>) -> Self {
        Self { sink }
    }
}

impl<S> Layer<S> for LoggerSinkLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };

        let metadata = event.metadata();
        let level = tracing_level_to_log_level(*metadata.level());
        if level < sink.min_level() {
            return;
        }

        let mut visitor = SinkVisitor::default();
        event.record(&mut visitor);

        let message = visitor
            .message
            .unwrap_or_else(|| metadata.name().to_string());

        let mut entry = LogEntry::new(level, metadata.target(), message);
        entry.fields = visitor.fields;

        if let Some(span) = ctx.lookup_current() {
            entry = entry.with_span(span.name());
        }

        let sink = Arc::clone(sink);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(err) = sink.log(entry).await {
                    eprintln!("LoggerSink error: {}", err);
                }
            });
            return;
        }

        if let Err(err) = futures::executor::block_on(sink.log(entry)) {
            eprintln!("LoggerSink error: {}", err);
        }
    }
}

#[derive(Default)]
struct SinkVisitor {
    message: Option<String>,
    fields: BTreeMap<String, String>,
}

impl SinkVisitor {
    fn record_value(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for SinkVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record_value(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, format!("{:?}", value));
    }
}

fn tracing_level_to_log_level(level: tracing::Level) -> LogLevel {
    match level {
        tracing::Level::TRACE => LogLevel::Trace,
        tracing::Level::DEBUG => LogLevel::Debug,
        tracing::Level::INFO => LogLevel::Info,
        tracing::Level::WARN => LogLevel::Warn,
        tracing::Level::ERROR => LogLevel::Error,
    }
}
