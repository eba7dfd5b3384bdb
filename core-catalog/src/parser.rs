//! Feed document parsing.
//!
//! The catalog answers with a document shaped as
//! `{ "feed": { "entry": [ {...}, ... ] } }`. Each field of a [`Track`] is
//! pulled out by its own extractor; a missing or oddly typed sub-path leaves
//! that field unset and never fails the entry.
//!
//! Decoding and shape are kept apart on purpose: a body that is not JSON is a
//! [`SearchError::Decode`], while a JSON document without `feed.entry` simply
//! yields no tracks.

use crate::error::{Result, SearchError};
use crate::models::{Track, TrackId};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, trace};
use url::Url;

/// MIME type of the preview clips the player can handle.
pub const PREVIEW_MEDIA_TYPE: &str = "audio/x-m4a";

const PREVIEW_ASSET_TYPE: &str = "preview";
const STORE_PAGE_TYPE: &str = "text/html";
const SMALL_ARTWORK_HEIGHT: &str = "60";
const LARGE_ARTWORK_HEIGHT: &str = "170";

/// Stateless converter from feed bodies to [`Track`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedParser;

impl FeedParser {
    /// Decode a raw body into a JSON object.
    ///
    /// Fails with [`SearchError::Decode`] when the body is not JSON or its top
    /// level is not an object.
    pub fn decode(body: &[u8]) -> Result<Value> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| SearchError::Decode(format!("Invalid JSON: {}", e)))?;

        if !value.is_object() {
            return Err(SearchError::Decode(
                "Top-level feed document is not an object".to_string(),
            ));
        }

        Ok(value)
    }

    /// Convert a decoded document into tracks, in feed order.
    ///
    /// A missing or malformed `feed.entry` yields an empty vector. Elements of
    /// `feed.entry` that are not objects are skipped. Ids are unique within the
    /// result: an entry repeating an earlier id gets a positional one.
    pub fn parse_document(document: &Value) -> Vec<Track> {
        let Some(entries) = document["feed"]["entry"].as_array() else {
            debug!("Feed document has no entry array");
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let tracks: Vec<Track> = entries
            .iter()
            .filter(|entry| entry.is_object())
            .enumerate()
            .map(|(index, entry)| {
                let mut track = parse_entry(entry, index + 1);
                if !seen.insert(track.id.clone()) {
                    let replacement = unique_fallback(&seen, track.rank);
                    debug!(
                        id = %track.id,
                        rank = track.rank,
                        replacement = %replacement,
                        "Duplicate track id in feed"
                    );
                    track.id = replacement;
                    seen.insert(track.id.clone());
                }
                track
            })
            .collect();

        debug!(
            entries = entries.len(),
            tracks = tracks.len(),
            "Parsed feed document"
        );
        tracks
    }

    /// Decode then parse a raw body.
    pub fn parse(body: &[u8]) -> Result<Vec<Track>> {
        let document = Self::decode(body)?;
        Ok(Self::parse_document(&document))
    }
}

fn parse_entry(entry: &Value, rank: usize) -> Track {
    let id = extract_id(entry).unwrap_or_else(|| TrackId::from_position(rank));
    let mut track = Track::new(id, rank);

    track.name = label(&entry["im:name"]);
    track.artist_name = label(&entry["im:artist"]);
    track.kind = extract_kind(entry);
    track.price = extract_price(entry);

    apply_links(entry, &mut track);
    apply_images(entry, &mut track);

    trace!(id = %track.id, rank, name = ?track.name, "Parsed feed entry");
    track
}

fn unique_fallback(seen: &HashSet<TrackId>, rank: usize) -> TrackId {
    let mut candidate = TrackId::from_position(rank);
    while seen.contains(&candidate) {
        candidate = TrackId::new(format!("{}-{}", candidate, rank));
    }
    candidate
}

fn label(node: &Value) -> Option<String> {
    node["label"].as_str().map(str::to_string)
}

fn parse_url(raw: &str) -> Option<Url> {
    Url::parse(raw).ok()
}

fn extract_id(entry: &Value) -> Option<TrackId> {
    let id = &entry["id"];
    id["attributes"]["im:id"]
        .as_str()
        .or_else(|| id["label"].as_str())
        .filter(|raw| !raw.is_empty())
        .map(TrackId::new)
}

fn extract_kind(entry: &Value) -> Option<String> {
    let content_type = &entry["im:contentType"];
    content_type["im:contentType"]["attributes"]["label"]
        .as_str()
        .or_else(|| content_type["attributes"]["label"].as_str())
        .map(str::to_string)
}

fn extract_price(entry: &Value) -> Option<f64> {
    entry["im:price"]["attributes"]["amount"]
        .as_str()
        .and_then(|amount| amount.trim().parse::<f64>().ok())
}

/// Every matching link overwrites the field, so the last match wins.
fn apply_links(entry: &Value, track: &mut Track) {
    let Some(links) = entry["link"].as_array() else {
        return;
    };

    for link in links {
        let attributes = &link["attributes"];
        let (Some(link_type), Some(href)) = (attributes["type"].as_str(), attributes["href"].as_str())
        else {
            continue;
        };

        // Links tagged with an asset type are only ever preview candidates.
        if let Some(asset_type) = attributes["im:assetType"].as_str() {
            if asset_type == PREVIEW_ASSET_TYPE && link_type == PREVIEW_MEDIA_TYPE {
                track.preview_media_type = Some(link_type.to_string());
                track.preview_url = parse_url(href);
            }
        } else if link_type == STORE_PAGE_TYPE {
            track.store_url = parse_url(href);
        }
    }
}

fn apply_images(entry: &Value, track: &mut Track) {
    let Some(images) = entry["im:image"].as_array() else {
        return;
    };

    for image in images {
        let (Some(height), Some(location)) =
            (image["attributes"]["height"].as_str(), image["label"].as_str())
        else {
            continue;
        };

        match height {
            SMALL_ARTWORK_HEIGHT => track.artwork_url_small = parse_url(location),
            LARGE_ARTWORK_HEIGHT => track.artwork_url_large = parse_url(location),
            _ => {}
        }
    }
}
