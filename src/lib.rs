//! In-process push notification hub
//!
//! Keeps long-lived subscriber sessions, each attached to a user and a
//! project (or the global scope), and pushes typed events to them:
//!
//! - `connected` once, when a session opens
//! - `heartbeat` periodically, per session
//! - `message` to every session in the message's project scope
//! - `alert` to every session of the target user
//!
//! Messages and alerts are appended to a per-scope event log. Read state
//! is tracked per user.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use notify_rs::{HubConfig, NotificationHub, NewMessage, ProjectScope};
//! use notify_rs::heartbeat::NoAlerts;
//!
//! # async fn run() -> notify_rs::Result<()> {
//! let hub = NotificationHub::new(HubConfig::default(), Arc::new(NoAlerts))?;
//!
//! let mut sub = hub.open_subscription("u1", Some("p1")).await?;
//! hub.submit_message(NewMessage::new(
//!     ProjectScope::from_option(Some("p1")),
//!     "u2",
//!     "Bob",
//!     "student",
//!     "hi",
//! ))
//! .await?;
//!
//! while let Some(event) = sub.next_event().await {
//!     println!("{:?}", event?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod broadcaster;
pub mod error;
pub mod event;
pub mod heartbeat;
pub mod history;
pub mod hub;
pub mod read_state;
pub mod registry;
pub mod stats;

pub use broadcaster::{Broadcaster, Delivery};
pub use error::{Error, Result};
pub use event::{
    Alert, AlertCategory, Event, EventKind, Message, MessageKind, NewMessage, ProjectScope,
    Scope, SessionId, Severity,
};
pub use hub::{HubConfig, NotificationHub, Subscription};
pub use read_state::ReadStateTracker;
pub use stats::HubStats;
