//! Parsing the recorded top-songs feed.

use core_catalog::{FeedParser, SearchError, TrackId, PREVIEW_MEDIA_TYPE};

const FIXTURE: &[u8] = include_bytes!("fixtures/itunes-topsongs.json");

#[test]
fn test_fixture_yields_ten_tracks_in_rank_order() {
    let tracks = FeedParser::parse(FIXTURE).expect("fixture decodes");

    assert_eq!(tracks.len(), 10);
    for (index, track) in tracks.iter().enumerate() {
        assert_eq!(track.rank, index + 1);
    }
}

#[test]
fn test_second_entry_matches_recorded_values() {
    let tracks = FeedParser::parse(FIXTURE).unwrap();
    let second = &tracks[1];

    assert_eq!(second.id, TrackId::new("1051394215"));
    assert_eq!(second.artist_name.as_deref(), Some("Lukas Graham"));
    assert_eq!(second.name.as_deref(), Some("7 Years"));
    assert_eq!(
        second.preview_url.as_ref().map(|url| url.as_str()),
        Some("http://a200.phobos.apple.com/us/r1000/137/Music69/v4/ab/01/99/ab01995b-4c87-fc07-8c85-7d461b2cdfc6/mzaf_9166296509688222028.plus.aac.p.m4a")
    );
    assert_eq!(
        second.artwork_url_small.as_ref().map(|url| url.as_str()),
        Some("http://is5.mzstatic.com/image/thumb/Music69/v4/1f/57/08/1f57082e-ee7e-dcb7-a73e-ba1f3468211d/093624920496.jpg/60x60bb-85.jpg")
    );
    assert_eq!(second.preview_media_type.as_deref(), Some(PREVIEW_MEDIA_TYPE));
    assert_eq!(second.kind.as_deref(), Some("Track"));
    assert_eq!(second.price, Some(1.29));
}

#[test]
fn test_every_fixture_track_is_fully_populated() {
    for track in FeedParser::parse(FIXTURE).unwrap() {
        assert!(!track.name.as_deref().unwrap_or_default().is_empty());
        assert!(!track.artist_name.as_deref().unwrap_or_default().is_empty());
        assert!(track.preview_url.is_some(), "{} has no preview", track.id);
        assert!(track.artwork_url_small.is_some());
        assert!(track.artwork_url_large.is_some());
        assert!(track.store_url.is_some());
    }
}

#[test]
fn test_track_ids_are_unique() {
    let tracks = FeedParser::parse(FIXTURE).unwrap();
    let mut ids: Vec<_> = tracks.iter().map(|t| t.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), tracks.len());
}

#[test]
fn test_truncated_body_is_decode_error() {
    let truncated = &FIXTURE[..FIXTURE.len() / 2];
    assert!(matches!(
        FeedParser::parse(truncated),
        Err(SearchError::Decode(_))
    ));
}
