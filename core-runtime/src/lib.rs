//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the catalog, playback and
//! service crates:
//! - Logging and tracing setup
//! - Configuration (`CoreConfig`)
//! - Event bus for presenter updates
//! - The network activity indicator

pub mod activity;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use activity::{ActivityGuard, NetworkActivity};
pub use error::{Error, Result};
