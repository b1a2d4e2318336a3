//! Registry error types
//!
//! Error types for session registry operations and subscriber sinks.

use thiserror::Error;

use crate::event::SessionId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No live session has this id
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
}

/// Failure to push a frame into a subscriber's sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The receiving side is gone; the session is dead
    #[error("sink closed")]
    Closed,
    /// The subscriber is not keeping up; this frame was dropped
    #[error("sink full")]
    Full,
}

impl SinkError {
    /// Whether the session behind this sink should be retired
    pub fn is_fatal(&self) -> bool {
        matches!(self, SinkError::Closed)
    }
}
