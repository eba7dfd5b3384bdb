use thiserror::Error;

/// Message shown to the user whenever the feed cannot be loaded.
pub const SEARCH_FAILED_MESSAGE: &str =
    "There was an error connecting to iTunes. Please check your internet connection and try again";

/// Why a feed fetch failed.
///
/// An empty feed is not an error; it surfaces as
/// [`SearchStatus::NoResultsFound`](crate::SearchStatus::NoResultsFound).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("Failed to decode feed: {0}")]
    Decode(String),
}

impl SearchError {
    /// Alert text for the presenter. Every search failure reads the same to
    /// the user.
    pub fn user_message(&self) -> &'static str {
        SEARCH_FAILED_MESSAGE
    }
}

impl From<bridge_traits::BridgeError> for SearchError {
    fn from(err: bridge_traits::BridgeError) -> Self {
        SearchError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
