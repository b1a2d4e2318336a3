//! Subscriber sinks
//!
//! A sink is the only thing the core knows about a transport: somewhere to
//! push one encoded event. SSE, WebSocket or test harnesses all implement
//! [`Sink`].

use bytes::Bytes;
use tokio::sync::mpsc;

use super::error::SinkError;

/// Capability to deliver an encoded event to one subscriber
///
/// `send` must not block; it is called while fanning out to every matching
/// session.
pub trait Sink: Send + Sync {
    /// Push one encoded event
    fn send(&self, frame: Bytes) -> Result<(), SinkError>;
}

/// Sink backed by a bounded tokio channel
///
/// The transport drains the paired receiver. Dropping the receiver closes
/// the sink.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    /// Create a sink and the receiver the transport reads from
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Whether the receiver has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Sink for ChannelSink {
    fn send(&self, frame: Bytes) -> Result<(), SinkError> {
        self.tx.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}
