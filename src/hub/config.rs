//! Hub configuration

use std::time::Duration;

use crate::error::{Error, Result};

/// Default heartbeat interval
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Default per-subscription channel depth
pub const DEFAULT_SINK_CAPACITY: usize = 256;

/// Default limit on message content, in characters
pub const DEFAULT_MAX_CONTENT_LEN: usize = 4096;

/// Notification hub configuration options
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Time between heartbeats (and alert polls) per session
    pub heartbeat_interval: Duration,

    /// Events buffered per subscription before new ones are dropped
    pub sink_capacity: usize,

    /// Replay logged messages and alerts to new subscriptions
    ///
    /// The replay is capped at `sink_capacity - 1` events (the newest ones),
    /// so it fits the subscription buffer behind `connected`.
    pub backfill_on_connect: bool,

    /// Longest an alert poll may take before it counts as failed
    pub alert_poll_timeout: Duration,

    /// Maximum message content length in characters
    pub max_content_len: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            sink_capacity: DEFAULT_SINK_CAPACITY,
            backfill_on_connect: false,
            alert_poll_timeout: Duration::from_secs(5),
            max_content_len: DEFAULT_MAX_CONTENT_LEN,
        }
    }
}

impl HubConfig {
    /// Set the heartbeat interval
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Set the per-subscription channel depth
    pub fn sink_capacity(mut self, capacity: usize) -> Self {
        self.sink_capacity = capacity;
        self
    }

    /// Enable history replay on connect
    pub fn backfill_on_connect(mut self, enabled: bool) -> Self {
        self.backfill_on_connect = enabled;
        self
    }

    /// Set the alert poll timeout
    pub fn alert_poll_timeout(mut self, timeout: Duration) -> Self {
        self.alert_poll_timeout = timeout;
        self
    }

    /// Set the message content limit
    pub fn max_content_len(mut self, len: usize) -> Self {
        self.max_content_len = len;
        self
    }

    /// Most logged events replayed to a new subscription; 0 when disabled
    pub fn backfill_limit(&self) -> usize {
        if self.backfill_on_connect {
            self.sink_capacity.saturating_sub(1)
        } else {
            0
        }
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        if self.heartbeat_interval.is_zero() {
            return Err(Error::validation("heartbeat_interval", "must be greater than zero"));
        }
        if self.sink_capacity == 0 {
            return Err(Error::validation("sink_capacity", "must be at least 1"));
        }
        if self.alert_poll_timeout.is_zero() {
            return Err(Error::validation("alert_poll_timeout", "must be greater than zero"));
        }
        if self.max_content_len == 0 {
            return Err(Error::validation("max_content_len", "must be at least 1"));
        }
        Ok(())
    }
}
