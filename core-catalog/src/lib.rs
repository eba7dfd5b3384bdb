//! # Catalog Module
//!
//! Fetches the ranked "top songs" feed and turns it into [`Track`]s.
//!
//! - [`FeedParser`] - pure conversion from a feed body to tracks
//! - [`SearchService`] - request lifecycle, status and results
//!
//! ```ignore
//! use core_catalog::{SearchService, SearchStatus};
//!
//! let search = SearchService::from_config(&config, events, activity);
//! if let Some(outcome) = search.search(true).await {
//!     assert_eq!(search.status(), SearchStatus::ResultsFound);
//!     println!("{} tracks", outcome.results.len());
//! }
//! ```

pub mod error;
pub mod models;
pub mod parser;
pub mod search;

pub use error::{Result, SearchError, SEARCH_FAILED_MESSAGE};
pub use models::{SearchStatus, Track, TrackId, UNKNOWN_ARTIST};
pub use parser::{FeedParser, PREVIEW_MEDIA_TYPE};
pub use search::{SearchCompletion, SearchService};
