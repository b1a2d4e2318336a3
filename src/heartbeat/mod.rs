//! Heartbeats and alert polling
//!
//! Each session gets its own timer. A tick asks the external
//! [`AlertSource`] for at most one alert for the session's user and then
//! always sends a heartbeat, so liveness is signalled even when nothing else
//! happens. Source failures are logged and never stop the timer.

pub mod scheduler;
pub mod source;

pub use scheduler::HeartbeatScheduler;
pub use source::{AlertSource, AlertSourceError, NoAlerts, RandomAlertSource};
