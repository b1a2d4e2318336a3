//! Session registry for pub/sub routing
//!
//! The registry owns every live subscriber session and decides which of them
//! a published event reaches.
//!
//! # Architecture
//!
//! ```text
//!                         Arc<SessionRegistry>
//!                     ┌─────────────────────────┐
//!                     │ sessions: HashMap<Id,   │
//!                     │   Session {             │
//!                     │     user_id, project,   │
//!                     │     sink: Arc<dyn Sink>,│
//!                     │   }                     │
//!                     │ >                       │
//!                     └───────────┬─────────────┘
//!                                 │ snapshot of matching sessions
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!    [Broadcaster]           [Session A]             [Session B]
//!    publish(scope)          sink.send()             sink.send()  ──► transport
//! ```
//!
//! Pushes happen on the snapshot, outside the registry lock. A push that
//! finds its sink closed marks the session for removal.

pub mod error;
pub mod session;
pub mod sink;
pub mod store;

pub use error::{RegistryError, SinkError};
pub use session::{Session, SessionInfo};
pub use sink::{ChannelSink, Sink};
pub use store::{SessionRegistry, Visit};
