//! Notification hub: the surface a transport talks to
//!
//! ```text
//!   transport ──open_subscription──►  NotificationHub ──► Broadcaster ──► SessionRegistry
//!       ▲                                │      │               │
//!       │                                │      └─► HeartbeatScheduler (per session)
//!       └────── Subscription::recv ◄─────┘                      │
//!                                                               ▼
//!                                                         AlertSource (external)
//! ```

pub mod config;
pub mod service;
pub mod subscription;

pub use config::HubConfig;
pub use service::NotificationHub;
pub use subscription::Subscription;
