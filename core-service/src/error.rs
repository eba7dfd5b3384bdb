use core_catalog::{SearchError, TrackId};
use core_playback::PlaybackError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(#[from] core_runtime::Error),

    #[error("Track {0} is not in the current results")]
    UnknownTrack(TrackId),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),
}

impl CoreError {
    /// Text for the presenter's alert.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Search(err) => err.user_message().to_string(),
            CoreError::Playback(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
