//! Catalog entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Placeholder shown when a track carries no artist.
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// Stable identifier of a feed entry.
///
/// Taken from the catalog's own id when the feed carries one so that the
/// identity of a row survives refreshes and reordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier for an entry that carries no catalog id.
    pub fn from_position(position: usize) -> Self {
        Self(format!("position-{}", position))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One parsed feed entry. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    /// 1-based position in the feed
    pub rank: usize,
    pub name: Option<String>,
    pub artist_name: Option<String>,
    pub preview_url: Option<Url>,
    pub preview_media_type: Option<String>,
    /// 60px artwork
    pub artwork_url_small: Option<Url>,
    /// 170px artwork
    pub artwork_url_large: Option<Url>,
    pub store_url: Option<Url>,
    pub kind: Option<String>,
    pub price: Option<f64>,
}

impl Track {
    /// A track with only identity set; the parser fills in the rest.
    pub fn new(id: TrackId, rank: usize) -> Self {
        Self {
            id,
            rank,
            name: None,
            artist_name: None,
            preview_url: None,
            preview_media_type: None,
            artwork_url_small: None,
            artwork_url_large: None,
            store_url: None,
            kind: None,
            price: None,
        }
    }

    /// Artist for display, falling back to [`UNKNOWN_ARTIST`].
    pub fn artist_display_name(&self) -> &str {
        match self.artist_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNKNOWN_ARTIST,
        }
    }

    pub fn has_preview(&self) -> bool {
        self.preview_url.is_some()
    }
}

/// Lifecycle of the feed search. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SearchStatus {
    #[default]
    NotSearched,
    Searching,
    NoResultsFound,
    ResultsFound,
    Error,
}

impl SearchStatus {
    pub fn is_searching(&self) -> bool {
        matches!(self, SearchStatus::Searching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artist_display_name_falls_back_to_unknown() {
        let mut track = Track::new(TrackId::new("1"), 1);
        assert_eq!(track.artist_display_name(), UNKNOWN_ARTIST);

        track.artist_name = Some("   ".to_string());
        assert_eq!(track.artist_display_name(), UNKNOWN_ARTIST);

        track.artist_name = Some("Lukas Graham".to_string());
        assert_eq!(track.artist_display_name(), "Lukas Graham");
    }

    #[test]
    fn positional_ids_are_distinct() {
        assert_eq!(TrackId::from_position(3).as_str(), "position-3");
        assert_ne!(TrackId::from_position(1), TrackId::from_position(2));
    }

    #[test]
    fn status_defaults_to_not_searched() {
        assert_eq!(SearchStatus::default(), SearchStatus::NotSearched);
        assert!(SearchStatus::Searching.is_searching());
    }
}
