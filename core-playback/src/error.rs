//! # Playback Error Types

use bridge_traits::BridgeError;
use core_catalog::TrackId;
use thiserror::Error;

/// Errors surfaced by [`PlaybackController`](crate::PlaybackController).
///
/// Failures reported by the media framework after playback has started are
/// not errors here; they reset the track and are only logged.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The track has no playable preview link.
    #[error("Track {0} has no preview")]
    NoPreview(TrackId),

    /// The preview asset never became playable.
    #[error("Preview for track {track_id} is not playable: {message}")]
    AssetNotPlayable { track_id: TrackId, message: String },

    /// A newer play or stop request replaced this one before it finished.
    #[error("Playback request was superseded")]
    Superseded,

    /// The media player rejected a command.
    #[error("Media player error: {0}")]
    Player(#[from] BridgeError),
}

impl PlaybackError {
    /// Text for the presenter's alert.
    pub fn user_message(&self) -> String {
        match self {
            PlaybackError::NoPreview(_) => "No preview is available for this track".to_string(),
            PlaybackError::AssetNotPlayable { message, .. } => message.clone(),
            PlaybackError::Superseded => String::new(),
            PlaybackError::Player(err) => err.to_string(),
        }
    }

    /// Superseded requests need no alert.
    pub fn is_superseded(&self) -> bool {
        matches!(self, PlaybackError::Superseded)
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
