//! Events pushed to subscribers
//!
//! An [`Event`] is encoded once per publish into a [`Bytes`] buffer; every
//! matching sink receives a reference-counted clone of the same buffer.
//!
//! Wire shape (JSON, tagged by `type`):
//!
//! ```text
//! {"type":"connected","sessionId":"sess_..","timestamp":".."}
//! {"type":"heartbeat","timestamp":".."}
//! {"type":"message","timestamp":"..","message":{..}}
//! {"type":"alert","timestamp":"..","alert":{..}}
//! ```

pub mod alert;
pub mod message;
pub mod scope;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use alert::{Alert, AlertCategory, Severity};
pub use message::{Message, MessageKind, NewMessage};
pub use scope::{ProjectScope, Scope, SessionId, GLOBAL_SCOPE};

/// Tag of an [`Event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Connected,
    Heartbeat,
    Message,
    Alert,
}

impl EventKind {
    /// Whether events of this kind are appended to the event log
    pub fn is_logged(&self) -> bool {
        matches!(self, EventKind::Message | EventKind::Alert)
    }

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connected => "connected",
            EventKind::Heartbeat => "heartbeat",
            EventKind::Message => "message",
            EventKind::Alert => "alert",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single pushed event. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Event {
    /// First event on every subscription
    Connected {
        session_id: SessionId,
        timestamp: DateTime<Utc>,
    },
    /// Keep-alive
    Heartbeat { timestamp: DateTime<Utc> },
    /// A project message
    Message {
        timestamp: DateTime<Utc>,
        message: Message,
    },
    /// A user alert
    Alert {
        timestamp: DateTime<Utc>,
        alert: Alert,
    },
}

impl Event {
    /// Create a connected event
    pub fn connected(session_id: SessionId) -> Self {
        Event::Connected {
            session_id,
            timestamp: Utc::now(),
        }
    }

    /// Create a heartbeat event
    pub fn heartbeat() -> Self {
        Event::Heartbeat {
            timestamp: Utc::now(),
        }
    }

    /// Wrap a message, stamped with its creation time
    pub fn message(message: Message) -> Self {
        Event::Message {
            timestamp: message.created_at,
            message,
        }
    }

    /// Wrap an alert, stamped with its creation time
    pub fn alert(alert: Alert) -> Self {
        Event::Alert {
            timestamp: alert.created_at,
            alert,
        }
    }

    /// Get the event tag
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Connected { .. } => EventKind::Connected,
            Event::Heartbeat { .. } => EventKind::Heartbeat,
            Event::Message { .. } => EventKind::Message,
            Event::Alert { .. } => EventKind::Alert,
        }
    }

    /// Get the event timestamp
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Event::Connected { timestamp, .. }
            | Event::Heartbeat { timestamp }
            | Event::Message { timestamp, .. }
            | Event::Alert { timestamp, .. } => *timestamp,
        }
    }

    /// Encode as JSON
    pub fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    /// Decode from JSON
    pub fn decode(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}
