//! Per-session heartbeat timers

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::source::{AlertSource, AlertSourceError};
use crate::broadcaster::Broadcaster;
use crate::error::{Error, Result};
use crate::event::{Alert, Event, Scope, SessionId};

type Timers = Arc<Mutex<HashMap<SessionId, JoinHandle<()>>>>;

/// Runs one cancellable timer per session
///
/// Every tick polls the alert source for the session's user, publishes any
/// alert to that user, then publishes a heartbeat to the session itself.
/// A timer whose session has been unregistered ends on its next tick.
pub struct HeartbeatScheduler {
    broadcaster: Arc<Broadcaster>,
    source: Arc<dyn AlertSource>,
    poll_timeout: Duration,
    timers: Timers,
}

impl HeartbeatScheduler {
    /// Create a scheduler publishing through `broadcaster`
    pub fn new(
        broadcaster: Arc<Broadcaster>,
        source: Arc<dyn AlertSource>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            broadcaster,
            source,
            poll_timeout,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start the timer for a live session
    ///
    /// Replaces a timer already running for the same session. Fails if the
    /// session is not registered or the interval is zero.
    pub async fn start(&self, session_id: &SessionId, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(Error::validation("interval", "must be greater than zero"));
        }
        let info = self.broadcaster.registry().info(session_id).await?;

        let mut timers = self.timers.lock().await;

        let ticker = Ticker {
            broadcaster: Arc::clone(&self.broadcaster),
            source: Arc::clone(&self.source),
            poll_timeout: self.poll_timeout,
            session_id: session_id.clone(),
            user_id: info.user_id,
        };
        let own_timers = Arc::clone(&self.timers);
        let handle = tokio::spawn(async move {
            ticker.run(interval).await;
            // Lock is held by `start` until the handle is stored
            own_timers.lock().await.remove(&ticker.session_id);
        });

        if let Some(previous) = timers.insert(session_id.clone(), handle) {
            previous.abort();
        }

        tracing::debug!(
            session_id = %session_id,
            interval_ms = interval.as_millis() as u64,
            "Heartbeat started"
        );
        Ok(())
    }

    /// Cancel a session's timer
    ///
    /// Safe to call repeatedly and after the session is gone. Returns whether
    /// a timer was running.
    pub async fn stop(&self, session_id: &SessionId) -> bool {
        match self.timers.lock().await.remove(session_id) {
            Some(handle) => {
                handle.abort();
                tracing::debug!(session_id = %session_id, "Heartbeat stopped");
                true
            }
            None => false,
        }
    }

    /// Cancel every timer
    pub async fn stop_all(&self) -> usize {
        let mut timers = self.timers.lock().await;
        let count = timers.len();
        for (_, handle) in timers.drain() {
            handle.abort();
        }
        count
    }

    /// Whether a session's timer is running
    pub async fn is_running(&self, session_id: &SessionId) -> bool {
        self.timers.lock().await.contains_key(session_id)
    }

    /// Number of running timers
    pub async fn running(&self) -> usize {
        self.timers.lock().await.len()
    }
}

struct Ticker {
    broadcaster: Arc<Broadcaster>,
    source: Arc<dyn AlertSource>,
    poll_timeout: Duration,
    session_id: SessionId,
    user_id: String,
}

impl Ticker {
    async fn run(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // first tick completes immediately

        loop {
            ticker.tick().await;

            if !self.broadcaster.registry().contains(&self.session_id).await {
                tracing::debug!(session_id = %self.session_id, "Session gone, heartbeat ending");
                return;
            }

            self.tick().await;
        }
    }

    async fn tick(&self) {
        tracing::trace!(session_id = %self.session_id, "Heartbeat tick");

        match self.poll().await {
            Ok(Some(alert)) => {
                let scope = Scope::user(self.user_id.clone());
                if let Err(e) = self.broadcaster.publish(&scope, Event::alert(alert)).await {
                    tracing::warn!(
                        session_id = %self.session_id,
                        error = %e,
                        "Discarding malformed alert"
                    );
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    user_id = %self.user_id,
                    error = %e,
                    "Alert poll failed"
                );
            }
        }

        let scope = Scope::session(self.session_id.clone());
        if let Err(e) = self.broadcaster.publish(&scope, Event::heartbeat()).await {
            tracing::warn!(session_id = %self.session_id, error = %e, "Heartbeat publish failed");
        }
    }

    async fn poll(&self) -> std::result::Result<Option<Alert>, AlertSourceError> {
        tokio::time::timeout(self.poll_timeout, self.source.next_alert_for(&self.user_id))
            .await
            .unwrap_or(Err(AlertSourceError::Timeout(self.poll_timeout)))
    }
}
