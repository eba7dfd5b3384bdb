//! Fetch the live top-songs feed and print it.
//!
//! ```bash
//! cargo run -p core-catalog --example top_tracks
//! cargo run -p core-catalog --example top_tracks -- gb 25
//! ```

use bridge_desktop::ReqwestHttpClient;
use bridge_traits::LogLevel;
use core_catalog::SearchService;
use core_runtime::config::{FeedConfig, DEFAULT_REQUEST_TIMEOUT};
use core_runtime::events::EventBus;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::NetworkActivity;
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let args: Vec<String> = env::args().collect();
    let country = args.get(1).cloned().unwrap_or_else(|| "us".to_string());
    let limit = args.get(2).and_then(|raw| raw.parse().ok()).unwrap_or(10);
    let feed = FeedConfig::new(country, limit);
    feed.validate()?;

    let events = EventBus::default();
    let activity = NetworkActivity::new(events.clone());
    let search = SearchService::new(
        Arc::new(ReqwestHttpClient::with_timeout(DEFAULT_REQUEST_TIMEOUT)?),
        feed.endpoint(),
        DEFAULT_REQUEST_TIMEOUT,
        events,
        activity,
    );

    let Some(outcome) = search.search(true).await else {
        return Ok(());
    };

    if let Some(error) = &outcome.error {
        eprintln!("{}", error.user_message());
        return Err(error.clone().into());
    }

    for track in &outcome.results {
        println!(
            "{:>3}. {} - {}{}",
            track.rank,
            track.name.as_deref().unwrap_or("?"),
            track.artist_display_name(),
            if track.has_preview() { "" } else { " (no preview)" }
        );
    }
    println!("status: {:?}", search.status());

    Ok(())
}
