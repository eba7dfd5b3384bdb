//! Host logging abstractions
//!
//! Lets the core mirror its `tracing` events into the host's logging pipeline
//! (OSLog, Logcat, the browser console).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{error::Result, platform::PlatformSendSync};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive form understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_directive().to_uppercase())
    }
}

/// Structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Target module/component
    pub target: String,
    pub message: String,
    /// Structured fields, ordered by key
    pub fields: BTreeMap<String, String>,
    /// Name of the innermost active span
    pub span: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
            span: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_span(mut self, span: impl Into<String>) -> Self {
        self.span = Some(span.into());
        self
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level,
            self.target,
            self.message
        )?;
        for (key, value) in &self.fields {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Logger sink trait
///
/// Implementations must not block; the forwarding layer calls `log` from
/// whatever thread emitted the event.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LoggerSink: PlatformSendSync {
    /// Forward a log entry to the host logging system
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Flush any buffered logs
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Entries below this level are dropped before reaching the sink.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Sink that prints entries to stderr. Handy during development.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    pub min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl LoggerSink for ConsoleLogger {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level >= self.min_level {
            eprintln!("{}", entry);
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_builder() {
        let entry = LogEntry::new(LogLevel::Info, "core_catalog", "Feed fetched")
            .with_field("results", "10")
            .with_span("fetch");

        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.target, "core_catalog");
        assert_eq!(entry.message, "Feed fetched");
        assert_eq!(entry.fields.get("results"), Some(&"10".to_string()));
        assert_eq!(entry.span, Some("fetch".to_string()));
    }

    #[test]
    fn test_log_entry_display_includes_fields() {
        let entry = LogEntry::new(LogLevel::Warn, "core_playback", "Playback stalled")
            .with_field("track_id", "42");
        let rendered = entry.to_string();

        assert!(rendered.contains("WARN core_playback: Playback stalled"));
        assert!(rendered.ends_with("track_id=42"));
    }

    #[test]
    fn test_level_ordering_and_directive() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert_eq!(LogLevel::Debug.as_directive(), "debug");
    }

    #[tokio::test]
    async fn test_console_logger() {
        let logger = ConsoleLogger::default();
        let entry = LogEntry::new(LogLevel::Info, "test", "Test log");

        logger.log(entry).await.unwrap();
        assert_eq!(logger.min_level(), LogLevel::Info);
    }
}
