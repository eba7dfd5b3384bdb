//! Process-wide network activity indicator.
//!
//! Hosts show a spinner while any request is outstanding. Every request takes
//! an [`ActivityGuard`]; the indicator flips to busy when the first guard is
//! taken and back to idle when the last one is dropped, whichever way the
//! request ends.

use crate::events::{ActivityEvent, CoreEvent, EventBus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Counts outstanding requests and publishes busy/idle transitions.
#[derive(Debug, Clone)]
pub struct NetworkActivity {
    outstanding: Arc<AtomicUsize>,
    events: EventBus,
}

impl NetworkActivity {
    pub fn new(events: EventBus) -> Self {
        Self {
            outstanding: Arc::new(AtomicUsize::new(0)),
            events,
        }
    }

    /// Marks a request as in flight until the returned guard is dropped.
    pub fn begin(&self) -> ActivityGuard {
        let previous = self.outstanding.fetch_add(1, Ordering::SeqCst);
        trace!(outstanding = previous + 1, "Network activity begin");
        if previous == 0 {
            let _ = self.events.emit(CoreEvent::Activity(ActivityEvent::Busy));
        }

        ActivityGuard {
            activity: self.clone(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.outstanding() > 0
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    fn end(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        trace!(outstanding = previous - 1, "Network activity end");
        if previous == 1 {
            let _ = self.events.emit(CoreEvent::Activity(ActivityEvent::Idle));
        }
    }
}

/// Keeps the indicator busy for as long as it is alive.
#[must_use = "dropping the guard immediately ends the activity"]
#[derive(Debug)]
pub struct ActivityGuard {
    activity: NetworkActivity,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.activity.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventStream;

    #[tokio::test]
    async fn busy_and_idle_follow_first_and_last_guard() {
        let bus = EventBus::new(16);
        let mut stream = EventStream::new(bus.subscribe());
        let activity = NetworkActivity::new(bus);

        assert!(!activity.is_busy());

        let first = activity.begin();
        let second = activity.begin();
        assert_eq!(activity.outstanding(), 2);

        drop(first);
        assert!(activity.is_busy());
        drop(second);
        assert!(!activity.is_busy());

        assert_eq!(
            stream.try_recv().unwrap().unwrap(),
            CoreEvent::Activity(ActivityEvent::Busy)
        );
        assert_eq!(
            stream.try_recv().unwrap().unwrap(),
            CoreEvent::Activity(ActivityEvent::Idle)
        );
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn clones_share_the_counter() {
        let activity = NetworkActivity::new(EventBus::new(4));
        let other = activity.clone();

        let _guard = other.begin();
        assert!(activity.is_busy());
    }
}
