//! Headless list model.
//!
//! Maps the search status and playback state to the rows a track list
//! presenter renders. A status other than `ResultsFound` collapses to a single
//! placeholder row.

use core_catalog::{SearchStatus, Track, TrackId};
use serde::{Deserialize, Serialize};
use url::Url;

/// One rendered track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRow {
    pub id: TrackId,
    pub rank: usize,
    pub title: String,
    /// Artist name, or `"Unknown"`.
    pub artist: String,
    pub artwork_url: Option<Url>,
    pub has_preview: bool,
    pub playing: bool,
}

impl TrackRow {
    pub fn new(track: &Track, playing: bool) -> Self {
        Self {
            id: track.id.clone(),
            rank: track.rank,
            title: track.name.clone().unwrap_or_default(),
            artist: track.artist_display_name().to_string(),
            artwork_url: track.artwork_url_small.clone(),
            has_preview: track.has_preview(),
            playing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ListRow {
    NotSearched,
    Searching,
    NoResults,
    Error,
    Track(TrackRow),
}

impl ListRow {
    /// Only track rows react to taps.
    pub fn is_selectable(&self) -> bool {
        matches!(self, ListRow::Track(_))
    }

    /// Not-searched and error share the same placeholder.
    pub fn shows_error(&self) -> bool {
        matches!(self, ListRow::NotSearched | ListRow::Error)
    }
}

/// Build the rows for a status, results and the currently playing track.
pub fn build_rows(status: SearchStatus, results: &[Track], playing: Option<&TrackId>) -> Vec<ListRow> {
    match status {
        SearchStatus::NotSearched => vec![ListRow::NotSearched],
        SearchStatus::Searching => vec![ListRow::Searching],
        SearchStatus::NoResultsFound => vec![ListRow::NoResults],
        SearchStatus::Error => vec![ListRow::Error],
        SearchStatus::ResultsFound => results
            .iter()
            .map(|track| ListRow::Track(TrackRow::new(track, playing == Some(&track.id))))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks() -> Vec<Track> {
        (1..=3)
            .map(|rank| {
                let mut track = Track::new(TrackId::new(rank.to_string()), rank);
                track.name = Some(format!("Song {}", rank));
                track
            })
            .collect()
    }

    #[test]
    fn placeholder_statuses_yield_single_row() {
        let tracks = tracks();
        for (status, row) in [
            (SearchStatus::NotSearched, ListRow::NotSearched),
            (SearchStatus::Searching, ListRow::Searching),
            (SearchStatus::NoResultsFound, ListRow::NoResults),
            (SearchStatus::Error, ListRow::Error),
        ] {
            let rows = build_rows(status, &tracks, None);
            assert_eq!(rows, vec![row]);
            assert!(!rows[0].is_selectable());
        }
        assert!(ListRow::NotSearched.shows_error());
        assert!(!ListRow::Searching.shows_error());
    }

    #[test]
    fn results_map_to_ranked_rows_with_playing_flag() {
        let tracks = tracks();
        let playing = TrackId::new("2");
        let rows = build_rows(SearchStatus::ResultsFound, &tracks, Some(&playing));

        assert_eq!(rows.len(), 3);
        let ListRow::Track(second) = &rows[1] else {
            panic!("expected a track row");
        };
        assert_eq!(second.rank, 2);
        assert_eq!(second.title, "Song 2");
        assert_eq!(second.artist, "Unknown");
        assert!(second.playing);
        assert!(!second.has_preview);
        assert!(rows[1].is_selectable());

        let playing_rows = rows
            .iter()
            .filter(|row| matches!(row, ListRow::Track(row) if row.playing))
            .count();
        assert_eq!(playing_rows, 1);
    }
}
