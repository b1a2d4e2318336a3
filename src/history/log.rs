//! Append-only log for a single scope
//!
//! Entries are numbered from 1 in append order and never removed, so a
//! sequence number handed to a subscriber stays valid for the life of the log.

use chrono::{DateTime, Utc};

use crate::event::Event;

/// A logged event with its position in the scope
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Position in the scope, starting at 1
    pub seq: u64,
    /// The logged event
    pub event: Event,
}

/// Ordered events of one scope
#[derive(Debug, Default)]
pub struct ScopeLog {
    entries: Vec<LogEntry>,
}

impl ScopeLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number
    pub fn append(&mut self, event: Event) -> u64 {
        let seq = self.last_seq() + 1;
        self.entries.push(LogEntry { seq, event });
        seq
    }

    /// All entries in append order
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries appended after `seq`
    pub fn since(&self, seq: u64) -> &[LogEntry] {
        // seq n lives at index n - 1
        let start = usize::try_from(seq).unwrap_or(usize::MAX).min(self.entries.len());
        &self.entries[start..]
    }

    /// The newest `n` entries, in append order
    pub fn latest(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Sequence number of the newest entry, 0 when empty
    pub fn last_seq(&self) -> u64 {
        self.entries.last().map(|e| e.seq).unwrap_or(0)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamps of the oldest and newest entry
    pub fn timestamp_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.entries.first()?.event.timestamp();
        let last = self.entries.last()?.event.timestamp();
        Some((first, last))
    }
}
