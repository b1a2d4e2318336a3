//! Statistics and metrics for the notification hub

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by the registry and the broadcaster
#[derive(Debug, Default)]
pub struct Counters {
    sessions_opened: AtomicU64,
    sessions_closed: AtomicU64,
    sessions_retired: AtomicU64,
    events_published: AtomicU64,
    deliveries: AtomicU64,
    dropped_deliveries: AtomicU64,
}

impl Counters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn session_closed(&self) {
        self.sessions_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn session_retired(&self) {
        self.sessions_retired.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn event_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn delivered(&self, n: u64) {
        self.deliveries.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn dropped(&self, n: u64) {
        self.dropped_deliveries.fetch_add(n, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot
    pub fn snapshot(&self) -> HubStats {
        let opened = self.sessions_opened.load(Ordering::Relaxed);
        let closed = self.sessions_closed.load(Ordering::Relaxed);

        HubStats {
            total_sessions: opened,
            active_sessions: opened.saturating_sub(closed),
            sessions_retired: self.sessions_retired.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            dropped_deliveries: self.dropped_deliveries.load(Ordering::Relaxed),
        }
    }
}

/// Hub-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Sessions ever registered
    pub total_sessions: u64,
    /// Sessions currently registered
    pub active_sessions: u64,
    /// Sessions removed because their sink closed
    pub sessions_retired: u64,
    /// Calls to publish that passed validation
    pub events_published: u64,
    /// Successful pushes to sinks
    pub deliveries: u64,
    /// Pushes dropped because a sink was full
    pub dropped_deliveries: u64,
}

impl HubStats {
    /// Fraction of attempted pushes that were dropped
    pub fn drop_rate(&self) -> f64 {
        let attempts = self.deliveries + self.dropped_deliveries;
        if attempts > 0 {
            self.dropped_deliveries as f64 / attempts as f64
        } else {
            0.0
        }
    }
}
