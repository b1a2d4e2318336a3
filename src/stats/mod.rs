//! Hub statistics

pub mod metrics;

pub use metrics::{Counters, HubStats};
