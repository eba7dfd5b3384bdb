//! Core service façade.
//!
//! Wires a [`CoreConfig`] into the feed search and preview playback
//! components and exposes the operations a track list presenter needs:
//! load, pull-to-refresh, per-row play/stop, and the rows to render.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use bridge_traits::MediaPlayer;
//! # async fn example(player: Arc<dyn MediaPlayer>) -> core_service::Result<()> {
//! use core_service::TopTunesService;
//!
//! let service = TopTunesService::with_media_player(player)?;
//! service.load().await;
//! for row in service.rows() {
//!     println!("{:?}", row);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod list;

pub use error::{CoreError, Result};
pub use list::{build_rows, ListRow, TrackRow};

use bridge_traits::MediaPlayer;
use core_catalog::{SearchCompletion, SearchService, TrackId};
use core_playback::{PlaybackController, PlaybackState};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use core_runtime::NetworkActivity;
use std::sync::Arc;
use tracing::{info, warn};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct TopTunesService {
    events: EventBus,
    activity: NetworkActivity,
    search: SearchService,
    playback: PlaybackController,
}

impl TopTunesService {
    /// Create a service from a validated configuration.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let events = EventBus::new(config.event_buffer_size);
        let activity = NetworkActivity::new(events.clone());
        let search = SearchService::from_config(&config, events.clone(), activity.clone());
        let playback = PlaybackController::from_config(&config, events.clone(), activity.clone());

        info!(endpoint = search.endpoint(), "TopTunes core ready");
        Ok(Self {
            events,
            activity,
            search,
            playback,
        })
    }

    /// Default configuration around the host's media player.
    ///
    /// Without the `desktop-shims` feature no HTTP client is available by
    /// default and this fails with a missing capability.
    pub fn with_media_player(player: Arc<dyn MediaPlayer>) -> Result<Self> {
        let config = CoreConfig::builder().media_player(player).build()?;
        Self::new(config)
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to every core event.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    pub fn is_network_busy(&self) -> bool {
        self.activity.is_busy()
    }

    /// Initial load; cached responses are acceptable.
    ///
    /// Returns `None` if a newer load or refresh superseded this one.
    pub async fn load(&self) -> Option<SearchCompletion> {
        self.search.search(true).await
    }

    /// Pull-to-refresh: stop the current preview, then fetch bypassing caches.
    pub async fn refresh(&self) -> Option<SearchCompletion> {
        match self.playback.stop_current().await {
            Ok(Some(track_id)) => info!(%track_id, "Stopped preview for refresh"),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Failed to stop preview before refresh"),
        }
        self.search.search(false).await
    }

    /// Play the preview of a track from the current results.
    pub async fn play(&self, track_id: &TrackId) -> Result<()> {
        let track = self
            .search
            .track(track_id)
            .ok_or_else(|| CoreError::UnknownTrack(track_id.clone()))?;
        self.playback.request_play(&track).await?;
        Ok(())
    }

    /// Returns whether anything was stopped.
    pub async fn stop(&self, track_id: &TrackId) -> Result<bool> {
        Ok(self.playback.stop(track_id).await?)
    }

    /// The preview button: play when stopped, stop when playing.
    pub async fn toggle(&self, track_id: &TrackId) -> Result<PlaybackState> {
        let track = self
            .search
            .track(track_id)
            .ok_or_else(|| CoreError::UnknownTrack(track_id.clone()))?;
        Ok(self.playback.toggle(&track).await?)
    }

    pub fn state_of(&self, track_id: &TrackId) -> PlaybackState {
        self.playback.state_of(track_id)
    }

    /// Rows for the current search status and playback state.
    pub fn rows(&self) -> Vec<ListRow> {
        let playing = self.playback.currently_playing();
        build_rows(
            self.search.status(),
            &self.search.results(),
            playing.as_ref(),
        )
    }

    /// Whether tapping rows does anything.
    pub fn allows_selection(&self) -> bool {
        self.rows().iter().any(ListRow::is_selectable)
    }
}
