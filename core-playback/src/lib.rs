//! # Preview Playback Module
//!
//! Plays 30-second track previews through the host's shared media player.
//!
//! ## Overview
//!
//! This module handles:
//! - Loading a preview asset and starting it once it is playable
//! - Keeping at most one preview audible at a time
//! - Resetting a track when its preview ends or fails mid-way
//!
//! Progress is published on the core [`EventBus`](core_runtime::events::EventBus)
//! as [`PlaybackEvent`](core_runtime::events::PlaybackEvent)s.

pub mod controller;
pub mod error;

pub use controller::{PlaybackController, PlaybackState};
pub use error::{PlaybackError, Result};
