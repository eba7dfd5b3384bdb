//! Workspace umbrella crate.
//!
//! Host applications can depend on `toptunes-workspace` and pick up the
//! service façade plus the catalog and playback crates through a single
//! dependency. The `desktop-shims` feature wires the reqwest-backed HTTP
//! client as the default transport.

#[cfg(feature = "desktop-shims")]
pub use core_catalog::{SearchCompletion, SearchError, SearchService, SearchStatus, Track, TrackId};
#[cfg(feature = "desktop-shims")]
pub use core_playback::{PlaybackController, PlaybackError, PlaybackState};
#[cfg(feature = "desktop-shims")]
pub use core_service::{CoreError, ListRow, TopTunesService, TrackRow};
