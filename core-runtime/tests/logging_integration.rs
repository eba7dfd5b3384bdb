//! Integration tests for logging initialization

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for RecordingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

// Global subscriber state is per process, so initialization is exercised in a
// single test.
#[test]
fn test_init_logging_once_and_forward_to_sink() {
    let sink = Arc::new(RecordingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(sink.clone());

    init_logging(config).expect("first initialization succeeds");

    tracing::info!(target: "core_catalog", result_count = 3u64, "Feed fetched");
    tracing::debug!(target: "core_catalog", "below sink level");
    tracing::info!(target: "unrelated_crate", "filtered out by default directives");

    {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Feed fetched");
        assert_eq!(entries[0].level, LogLevel::Info);
    }

    let second = init_logging(LoggingConfig::default());
    assert!(matches!(second, Err(Error::Config(_))));
}
