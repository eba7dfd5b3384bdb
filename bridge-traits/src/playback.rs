//! Media player bridge trait and supporting types.
//!
//! Preview playback is delegated to the host's media framework (AVFoundation,
//! ExoPlayer, an HTML audio element, ...). The core only needs to load a
//! remote asset, start and pause it, rewind it, and hear back when the asset
//! finishes, fails or stalls. Those notifications travel over a channel that
//! belongs to a single playback session, so dropping the receiver is all it
//! takes to unsubscribe.

use crate::{error::Result, platform::PlatformSendSync};
use futures::channel::mpsc;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for playback sessions managed by a host adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackSessionId(Uuid);

impl PlaybackSessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlaybackSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlaybackSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Notifications a media framework raises for an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaNotification {
    /// The asset played through to its end.
    DidPlayToEnd,
    /// Playback stopped before the end because of an error.
    FailedToPlayToEnd { message: String },
    /// Playback is waiting on data; transient.
    PlaybackStalled,
}

/// Sending half of a session's notification channel, handed to the adapter.
pub type MediaNotificationSender = mpsc::UnboundedSender<MediaNotification>;

/// Receiving half of a session's notification channel, kept by the core.
pub type MediaNotificationReceiver = mpsc::UnboundedReceiver<MediaNotification>;

/// Create the notification channel for one playback session.
pub fn notification_channel() -> (MediaNotificationSender, MediaNotificationReceiver) {
    mpsc::unbounded()
}

/// Metadata associated with a playback request. Hosts may surface it in
/// now-playing widgets.
#[derive(Debug, Clone, Default)]
pub struct PlaybackMetadata {
    /// Opaque track identifier.
    pub track_id: Option<String>,
    /// Display title for the track.
    pub title: Option<String>,
    /// Display artist string.
    pub artist: Option<String>,
    /// Arbitrary extra fields (e.g., artwork URI).
    pub extra: HashMap<String, String>,
}

/// Remote preview asset the host should load.
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    /// URL of the preview asset.
    pub url: String,
    /// MIME-like type advertised by the catalog, when known.
    pub media_type: Option<String>,
    /// Optional metadata surfaced to the host.
    pub metadata: PlaybackMetadata,
}

impl PlaybackRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            media_type: None,
            metadata: PlaybackMetadata::default(),
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_metadata(mut self, metadata: PlaybackMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Trait for the host's single shared media player.
///
/// `load` must resolve only once the asset is known to be playable; a
/// failure to become playable is reported as an error from `load` itself.
/// Adapters keep the [`MediaNotificationSender`] for the lifetime of the
/// session and drop it on `unload`.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaPlayer: PlatformSendSync {
    /// Load the asset asynchronously and attach it to the shared player.
    async fn load(
        &self,
        request: PlaybackRequest,
        notifications: MediaNotificationSender,
    ) -> Result<PlaybackSessionId>;

    /// Start rendering audio (rate 1.0).
    async fn play(&self, session: PlaybackSessionId) -> Result<()>;

    /// Pause rendering (rate 0.0) without releasing the session.
    async fn pause(&self, session: PlaybackSessionId) -> Result<()>;

    /// Seek to an absolute position within the asset.
    async fn seek(&self, session: PlaybackSessionId, position: Duration) -> Result<()>;

    /// Release the session and stop delivering its notifications.
    async fn unload(&self, session: PlaybackSessionId) -> Result<()>;
}
