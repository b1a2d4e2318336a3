//! Subscription handle returned to the transport

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::event::{Event, SessionId};

/// Receiving end of one session
///
/// Yields encoded events in delivery order. Dropping the handle closes the
/// session's sink; the hub retires the session on its next push.
#[derive(Debug)]
pub struct Subscription {
    session_id: SessionId,
    rx: mpsc::Receiver<Bytes>,
}

impl Subscription {
    pub(crate) fn new(session_id: SessionId, rx: mpsc::Receiver<Bytes>) -> Self {
        Self { session_id, rx }
    }

    /// Id of the session this handle reads from
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Wait for the next encoded event; `None` once the session is closed
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Wait for the next event and decode it
    pub async fn next_event(&mut self) -> Option<Result<Event>> {
        let frame = self.rx.recv().await?;
        Some(Event::decode(&frame))
    }

    /// Take an already-delivered event without waiting
    pub fn try_next_event(&mut self) -> Option<Result<Event>> {
        let frame = self.rx.try_recv().ok()?;
        Some(Event::decode(&frame))
    }

    /// Split into the session id and the raw receiver
    pub fn into_parts(self) -> (SessionId, mpsc::Receiver<Bytes>) {
        (self.session_id, self.rx)
    }
}
