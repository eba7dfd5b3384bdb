//! # Event Bus System
//!
//! Broadcasts typed events from the catalog, playback and activity layers to
//! any number of observers using `tokio::sync::broadcast`.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   emit    ┌───────────┐
//! │ SearchService  ├──────────>│           │   subscribe   ┌────────────┐
//! └────────────────┘           │ EventBus  ├──────────────>│ UI binding │
//! ┌────────────────┐   emit    │ (broadcast│               └────────────┘
//! │ Playback ctrl  ├──────────>│  channel) │   subscribe   ┌────────────┐
//! └────────────────┘           │           ├──────────────>│  Logging   │
//! ┌────────────────┐   emit    │           │               └────────────┘
//! │ NetworkActivity├──────────>│           │
//! └────────────────┘           └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, SearchEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CoreEvent::Search(SearchEvent::Started { use_cache: true })).ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Search started");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events and may keep
//!   receiving.
//! - **`RecvError::Closed`**: every sender is gone; treat as shutdown.
//!
//! Emitting with no subscribers returns an error that publishers ignore.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the [`EventBus`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Feed search lifecycle
    Search(SearchEvent),
    /// Preview playback lifecycle
    Playback(PlaybackEvent),
    /// Network activity indicator changes
    Activity(ActivityEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Search(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Activity(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Search(SearchEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { recoverable: false, .. }) => {
                EventSeverity::Error
            }
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Warning,
            CoreEvent::Search(SearchEvent::Completed { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Started { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Search Events
// ============================================================================

/// Events raised while fetching the ranked feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SearchEvent {
    /// A fetch was issued; any earlier one was cancelled.
    Started {
        /// Whether the protocol cache may answer the request.
        use_cache: bool,
    },
    /// The feed was fetched and decoded.
    Completed {
        /// Number of tracks in the new result set.
        result_count: usize,
    },
    /// The fetch failed; earlier results are kept.
    Failed {
        /// Technical description of the failure.
        message: String,
    },
    /// The fetch was abandoned without a replacement; the status is back to
    /// what it was before the fetch.
    Cancelled,
}

impl SearchEvent {
    fn description(&self) -> &str {
        match self {
            SearchEvent::Started { .. } => "Search started",
            SearchEvent::Completed { .. } => "Search completed",
            SearchEvent::Failed { .. } => "Search failed",
            SearchEvent::Cancelled => "Search cancelled",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events related to preview playback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// The preview asset is loading.
    Loading {
        track_id: String,
    },
    /// The asset became playable and playback began.
    Started {
        track_id: String,
        title: String,
    },
    /// Playback was stopped by a request or a playback failure.
    Stopped {
        track_id: String,
    },
    /// The preview played through to the end.
    Completed {
        track_id: String,
    },
    /// Playback could not start or continue.
    Error {
        track_id: Option<String>,
        message: String,
        /// Whether asking again may succeed.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Loading { .. } => "Loading preview",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Stopped { .. } => "Playback stopped",
            PlaybackEvent::Completed { .. } => "Preview completed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Activity Events
// ============================================================================

/// Transitions of the process-wide network activity indicator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ActivityEvent {
    /// The first request went out.
    Busy,
    /// The last outstanding request finished.
    Idle,
}

impl ActivityEvent {
    fn description(&self) -> &str {
        match self {
            ActivityEvent::Busy => "Network activity started",
            ActivityEvent::Idle => "Network activity finished",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus yields another publisher on the same channel. Each call to
/// [`subscribe`](EventBus::subscribe) creates an independent receiver that
/// sees only events emitted after it was created.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when nobody is listening.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let playback_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Playback(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv`/`try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` when the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without waiting.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
