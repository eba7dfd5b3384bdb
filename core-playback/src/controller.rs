//! # Playback Controller
//!
//! Drives the host's single shared [`MediaPlayer`] so that at most one
//! preview is audible at a time.
//!
//! ## Request lifecycle
//!
//! ```text
//! request_play(track) ──> stop current ──> Loading ──> load asset ──┬─> play ──> Playing
//!                                                                   └─> AssetNotPlayable
//!
//! Playing ──┬─ stop(track) ─────────────> pause + unload ──> Stopped
//!           ├─ DidPlayToEnd ────────────> seek(0) + unload ──> Stopped
//!           ├─ FailedToPlayToEnd ───────> seek(0) + unload ──> Stopped (logged)
//!           └─ PlaybackStalled ─────────> logged, still Playing
//! ```
//!
//! Every request is tagged with a generation number. A load that resolves
//! after a newer play or stop request is unloaded and reported as
//! [`PlaybackError::Superseded`], so a track is only ever marked playing
//! once its own asset is playable.

use crate::error::{PlaybackError, Result};
use bridge_traits::playback::{
    notification_channel, MediaNotification, MediaNotificationReceiver, MediaPlayer,
    PlaybackMetadata, PlaybackRequest, PlaybackSessionId,
};
use core_catalog::{Track, TrackId};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use core_runtime::NetworkActivity;
use futures::StreamExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Per-track playback state as seen by the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

/// Why an active session is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Teardown {
    Stopped,
    Completed,
    Failed,
}

struct PendingLoad {
    track_id: TrackId,
    generation: u64,
}

struct ActiveSession {
    track_id: TrackId,
    session: PlaybackSessionId,
    listener: JoinHandle<()>,
}

#[derive(Default)]
struct ControllerState {
    generation: u64,
    pending: Option<PendingLoad>,
    current: Option<ActiveSession>,
}

impl ControllerState {
    fn is_pending(&self, generation: u64) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.generation == generation)
    }

    fn clear_pending(&mut self, generation: u64) {
        if self.is_pending(generation) {
            self.pending = None;
        }
    }
}

struct Inner {
    player: Arc<dyn MediaPlayer>,
    events: EventBus,
    activity: NetworkActivity,
    state: Mutex<ControllerState>,
}

/// Coordinates preview playback over one shared media player.
///
/// Cheap to clone; clones share the same player and state.
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Inner>,
}

impl PlaybackController {
    pub fn new(player: Arc<dyn MediaPlayer>, events: EventBus, activity: NetworkActivity) -> Self {
        Self {
            inner: Arc::new(Inner {
                player,
                events,
                activity,
                state: Mutex::new(ControllerState::default()),
            }),
        }
    }

    pub fn from_config(config: &CoreConfig, events: EventBus, activity: NetworkActivity) -> Self {
        Self::new(Arc::clone(&config.media_player), events, activity)
    }

    /// Stop whatever is playing, then load and play the track's preview.
    ///
    /// Resolves once the preview is audible. The network activity indicator
    /// is busy while the asset loads.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::NoPreview`] if the track has no preview link; the
    ///   player is not touched
    /// - [`PlaybackError::AssetNotPlayable`] if the asset fails to load
    /// - [`PlaybackError::Superseded`] if a newer request arrived meanwhile
    /// - [`PlaybackError::Player`] if the player refuses to start
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn request_play(&self, track: &Track) -> Result<()> {
        let preview_url = track
            .preview_url
            .clone()
            .ok_or_else(|| PlaybackError::NoPreview(track.id.clone()))?;

        let (generation, previous) = {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            let generation = state.generation;
            state.pending = Some(PendingLoad {
                track_id: track.id.clone(),
                generation,
            });
            (generation, state.current.take())
        };

        if let Some(previous) = previous {
            if let Err(err) = self.inner.release(previous, Teardown::Stopped).await {
                warn!(error = %err, "Failed to stop previous preview");
            }
        }

        self.inner.emit(PlaybackEvent::Loading {
            track_id: track.id.to_string(),
        });

        let (sender, receiver) = notification_channel();
        let loaded = {
            let _busy = self.inner.activity.begin();
            self.inner.player.load(build_request(track, &preview_url), sender).await
        };

        let session = match loaded {
            Ok(session) => session,
            Err(err) => {
                let superseded = {
                    let mut state = self.inner.state.lock();
                    let superseded = !state.is_pending(generation);
                    state.clear_pending(generation);
                    superseded
                };
                if superseded {
                    debug!("Superseded preview failed to load");
                    return Err(PlaybackError::Superseded);
                }

                let message = err.to_string();
                warn!(error = %message, "Preview asset is not playable");
                self.inner.emit(PlaybackEvent::Error {
                    track_id: Some(track.id.to_string()),
                    message: message.clone(),
                    recoverable: true,
                });
                return Err(PlaybackError::AssetNotPlayable {
                    track_id: track.id.clone(),
                    message,
                });
            }
        };

        let still_pending = self.inner.state.lock().is_pending(generation);
        if !still_pending {
            self.inner.discard(session).await;
            return Err(PlaybackError::Superseded);
        }

        if let Err(err) = self.inner.player.play(session).await {
            self.inner.state.lock().clear_pending(generation);
            self.inner.discard(session).await;
            self.inner.emit(PlaybackEvent::Error {
                track_id: Some(track.id.to_string()),
                message: err.to_string(),
                recoverable: true,
            });
            return Err(err.into());
        }

        let committed = {
            let mut state = self.inner.state.lock();
            if state.is_pending(generation) {
                state.pending = None;
                let listener = tokio::spawn(listen(
                    Arc::downgrade(&self.inner),
                    receiver,
                    track.id.clone(),
                    session,
                ));
                state.current = Some(ActiveSession {
                    track_id: track.id.clone(),
                    session,
                    listener,
                });
                true
            } else {
                false
            }
        };
        if !committed {
            self.inner.discard(session).await;
            return Err(PlaybackError::Superseded);
        }

        info!(%session, "Preview playing");
        self.inner.emit(PlaybackEvent::Started {
            track_id: track.id.to_string(),
            title: track.name.clone().unwrap_or_default(),
        });
        Ok(())
    }

    /// Stop the track if it is playing or loading.
    ///
    /// Returns `false` when the track was neither, leaving the player alone.
    #[instrument(skip(self))]
    pub async fn stop(&self, track_id: &TrackId) -> Result<bool> {
        let (cancelled_load, active) = {
            let mut state = self.inner.state.lock();
            let cancelled_load = state
                .pending
                .as_ref()
                .is_some_and(|pending| &pending.track_id == track_id);
            if cancelled_load {
                state.pending = None;
            }
            let is_current = state
                .current
                .as_ref()
                .is_some_and(|current| &current.track_id == track_id);
            let active = if is_current { state.current.take() } else { None };
            (cancelled_load, active)
        };

        if cancelled_load {
            debug!("Cancelled pending preview load");
        }

        match active {
            Some(active) => {
                self.inner.release(active, Teardown::Stopped).await?;
                Ok(true)
            }
            None => Ok(cancelled_load),
        }
    }

    /// Stop whatever is playing or loading, returning the affected track.
    pub async fn stop_current(&self) -> Result<Option<TrackId>> {
        let (pending, active) = {
            let mut state = self.inner.state.lock();
            (state.pending.take(), state.current.take())
        };

        match active {
            Some(active) => {
                let track_id = active.track_id.clone();
                self.inner.release(active, Teardown::Stopped).await?;
                Ok(Some(track_id))
            }
            None => Ok(pending.map(|pending| pending.track_id)),
        }
    }

    /// Play the track if it is stopped, stop it if it is playing or loading.
    pub async fn toggle(&self, track: &Track) -> Result<PlaybackState> {
        if self.state_of(&track.id).is_playing() || self.is_loading(&track.id) {
            self.stop(&track.id).await?;
            Ok(PlaybackState::Stopped)
        } else {
            self.request_play(track).await?;
            Ok(PlaybackState::Playing)
        }
    }

    pub fn state_of(&self, track_id: &TrackId) -> PlaybackState {
        match &self.inner.state.lock().current {
            Some(current) if &current.track_id == track_id => PlaybackState::Playing,
            _ => PlaybackState::Stopped,
        }
    }

    /// The track whose preview is audible, if any.
    pub fn currently_playing(&self) -> Option<TrackId> {
        self.inner
            .state
            .lock()
            .current
            .as_ref()
            .map(|current| current.track_id.clone())
    }

    pub fn is_loading(&self, track_id: &TrackId) -> bool {
        self.inner
            .state
            .lock()
            .pending
            .as_ref()
            .is_some_and(|pending| &pending.track_id == track_id)
    }
}

impl Inner {
    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine.
        let _ = self.events.emit(CoreEvent::Playback(event));
    }

    /// Tear down a session already taken out of the state.
    async fn release(&self, active: ActiveSession, reason: Teardown) -> Result<()> {
        if reason == Teardown::Stopped {
            active.listener.abort();
        }

        let paused = match reason {
            Teardown::Stopped => self.player.pause(active.session).await,
            Teardown::Completed | Teardown::Failed => {
                self.player.seek(active.session, Duration::ZERO).await
            }
        };
        if let Err(err) = self.player.unload(active.session).await {
            debug!(error = %err, session = %active.session, "Failed to unload session");
        }

        let track_id = active.track_id.to_string();
        self.emit(match reason {
            Teardown::Completed => PlaybackEvent::Completed { track_id },
            Teardown::Stopped | Teardown::Failed => PlaybackEvent::Stopped { track_id },
        });

        paused.map_err(PlaybackError::from)
    }

    /// Drop a session nobody is waiting for anymore.
    async fn discard(&self, session: PlaybackSessionId) {
        debug!(%session, "Discarding superseded session");
        if let Err(err) = self.player.unload(session).await {
            debug!(error = %err, %session, "Failed to unload superseded session");
        }
    }

    /// Handle a terminal notification for `session` if it is still current.
    async fn finish(&self, session: PlaybackSessionId, reason: Teardown) {
        let active = {
            let mut state = self.state.lock();
            let is_current = state
                .current
                .as_ref()
                .is_some_and(|current| current.session == session);
            if is_current {
                state.current.take()
            } else {
                None
            }
        };

        if let Some(active) = active {
            if let Err(err) = self.release(active, reason).await {
                debug!(error = %err, %session, "Failed to rewind finished session");
            }
        }
    }
}

async fn listen(
    inner: Weak<Inner>,
    mut notifications: MediaNotificationReceiver,
    track_id: TrackId,
    session: PlaybackSessionId,
) {
    while let Some(notification) = notifications.next().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };

        match notification {
            MediaNotification::DidPlayToEnd => {
                debug!(%track_id, %session, "Preview played to end");
                inner.finish(session, Teardown::Completed).await;
                break;
            }
            MediaNotification::FailedToPlayToEnd { message } => {
                warn!(%track_id, %session, error = %message, "Preview failed to play to end");
                inner.finish(session, Teardown::Failed).await;
                break;
            }
            MediaNotification::PlaybackStalled => {
                info!(%track_id, %session, "Preview playback stalled");
            }
        }
    }
}

fn build_request(track: &Track, preview_url: &url::Url) -> PlaybackRequest {
    let mut metadata = PlaybackMetadata {
        track_id: Some(track.id.to_string()),
        title: track.name.clone(),
        artist: Some(track.artist_display_name().to_string()),
        ..Default::default()
    };
    if let Some(artwork) = &track.artwork_url_large {
        metadata
            .extra
            .insert("artwork".to_string(), artwork.to_string());
    }

    let request = PlaybackRequest::new(preview_url.as_str()).with_metadata(metadata);
    match &track.preview_media_type {
        Some(media_type) => request.with_media_type(media_type.as_str()),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::playback::MediaNotificationSender;
    use bridge_traits::BridgeError;
    use mockall::mock;

    mock! {
        Player {}

        #[async_trait::async_trait]
        impl MediaPlayer for Player {
            async fn load(
                &self,
                request: PlaybackRequest,
                notifications: MediaNotificationSender,
            ) -> BridgeResult<PlaybackSessionId>;
            async fn play(&self, session: PlaybackSessionId) -> BridgeResult<()>;
            async fn pause(&self, session: PlaybackSessionId) -> BridgeResult<()>;
            async fn seek(&self, session: PlaybackSessionId, position: Duration) -> BridgeResult<()>;
            async fn unload(&self, session: PlaybackSessionId) -> BridgeResult<()>;
        }
    }

    fn controller(player: MockPlayer) -> PlaybackController {
        let events = EventBus::new(32);
        let activity = NetworkActivity::new(events.clone());
        PlaybackController::new(Arc::new(player), events, activity)
    }

    fn track(id: &str) -> Track {
        let mut track = Track::new(TrackId::new(id), 1);
        track.name = Some("7 Years".to_string());
        track.preview_url = url::Url::parse("https://audio.example.com/clip.m4a").ok();
        track.preview_media_type = Some("audio/x-m4a".to_string());
        track
    }

    #[tokio::test]
    async fn track_without_preview_never_reaches_player() {
        let controller = controller(MockPlayer::new());
        let mut silent = track("1");
        silent.preview_url = None;

        let err = controller.request_play(&silent).await.unwrap_err();
        assert!(matches!(err, PlaybackError::NoPreview(_)));
        assert_eq!(controller.state_of(&silent.id), PlaybackState::Stopped);
    }

    #[tokio::test]
    async fn load_failure_leaves_track_stopped() {
        let mut player = MockPlayer::new();
        player
            .expect_load()
            .times(1)
            .returning(|_, _| Err(BridgeError::NotPlayable("unsupported URL".to_string())));
        player.expect_play().never();

        let controller = controller(player);
        let track = track("1");
        let err = controller.request_play(&track).await.unwrap_err();

        assert!(matches!(err, PlaybackError::AssetNotPlayable { .. }));
        assert!(err.user_message().contains("unsupported URL"));
        assert_eq!(controller.state_of(&track.id), PlaybackState::Stopped);
        assert!(!controller.is_loading(&track.id));
    }

    #[tokio::test]
    async fn request_carries_preview_details() {
        let mut player = MockPlayer::new();
        player
            .expect_load()
            .withf(|request, _| {
                request.url == "https://audio.example.com/clip.m4a"
                    && request.media_type.as_deref() == Some("audio/x-m4a")
                    && request.metadata.title.as_deref() == Some("7 Years")
            })
            .returning(|_, _| Ok(PlaybackSessionId::new()));
        player.expect_play().times(1).returning(|_| Ok(()));

        let controller = controller(player);
        let track = track("1");
        controller.request_play(&track).await.unwrap();

        assert_eq!(controller.state_of(&track.id), PlaybackState::Playing);
        assert_eq!(controller.currently_playing(), Some(track.id));
    }

    #[tokio::test]
    async fn stop_of_unknown_track_is_noop() {
        let controller = controller(MockPlayer::new());
        assert!(!controller.stop(&TrackId::new("9")).await.unwrap());
        assert_eq!(controller.stop_current().await.unwrap(), None);
    }
}
