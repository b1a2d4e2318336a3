//! Event log for late joiners
//!
//! Messages and alerts are appended per scope as they are published.
//! Heartbeats and connection events are never logged. Nothing is evicted;
//! retention belongs to whatever persists the log.

pub mod log;
pub mod store;

pub use log::{LogEntry, ScopeLog};
pub use store::EventLog;
