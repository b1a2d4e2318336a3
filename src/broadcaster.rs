//! Fan-out of published events
//!
//! [`Broadcaster::publish`] logs an event (messages and alerts only), encodes
//! it once and pushes the same buffer to every session matching the scope.
//! A session whose sink has closed is unregistered on the spot; delivery to
//! the others carries on and the caller never sees the failure.
//!
//! Publishes are serialised by an ordering gate, so every session sees the
//! events of a scope in the order `publish` was called. The gate is separate
//! from the registry lock; the registry is only locked to take a snapshot
//! and to remove dead sessions.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::event::{Event, ProjectScope, Scope, SessionId};
use crate::history::EventLog;
use crate::registry::{SessionRegistry, Sink, SinkError, Visit};

/// Outcome of one publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Sessions matching the scope when the publish started
    pub matched: usize,
    /// Sessions the event was pushed to
    pub delivered: usize,
    /// Sessions that were full and missed this event
    pub dropped: usize,
    /// Sessions removed because their sink closed
    pub retired: usize,
    /// Position in the scope's log, if the event was logged
    pub seq: Option<u64>,
}

/// Routes events from producers to live sessions
pub struct Broadcaster {
    registry: Arc<SessionRegistry>,
    log: Arc<EventLog>,
    gate: Mutex<()>,
}

impl Broadcaster {
    /// Create a broadcaster over a registry and an event log
    pub fn new(registry: Arc<SessionRegistry>, log: Arc<EventLog>) -> Self {
        Self {
            registry,
            log,
            gate: Mutex::new(()),
        }
    }

    /// Registry this broadcaster delivers through
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Event log this broadcaster appends to
    pub fn log(&self) -> &Arc<EventLog> {
        &self.log
    }

    /// Publish an event to every session matching `scope`
    ///
    /// Fails only when the scope or event is malformed. Sink failures are
    /// handled per session and reported in the returned [`Delivery`].
    pub async fn publish(&self, scope: &Scope, event: Event) -> Result<Delivery> {
        scope.validate()?;
        check_addressing(scope, &event)?;
        let frame = event.encode()?;
        let kind = event.kind();

        let _order = self.gate.lock().await;

        let seq = if kind.is_logged() && !matches!(scope, Scope::Session(_)) {
            Some(self.log.append(scope, event).await)
        } else {
            None
        };

        let mut delivery = self.fan_out(scope, &frame).await;
        delivery.seq = seq;
        self.registry.counters().event_published();

        tracing::debug!(
            scope = %scope,
            kind = %kind,
            matched = delivery.matched,
            delivered = delivery.delivered,
            retired = delivery.retired,
            "Event published"
        );

        Ok(delivery)
    }

    /// Register a session and bring it up to date
    ///
    /// Runs under the ordering gate: the session receives `connected`, then
    /// up to `backfill` logged events, and only then any live event. The
    /// replay is the project scope's log followed by the user's alert log,
    /// cut to its newest `backfill` events; `0` replays nothing. Callers size
    /// `backfill` so the replay fits the sink next to `connected`.
    pub async fn subscribe(
        &self,
        user_id: &str,
        project: ProjectScope,
        sink: Arc<dyn Sink>,
        backfill: usize,
    ) -> Result<SessionId> {
        let _order = self.gate.lock().await;

        let project_scope = Scope::from(&project);
        let user_scope = Scope::user(user_id);
        let replay = if backfill > 0 {
            project_scope.validate()?;
            user_scope.validate()?;
            self.replay(&project_scope, &user_scope, backfill).await?
        } else {
            Vec::new()
        };

        let id = self.registry.register(user_id, project, Arc::clone(&sink)).await?;
        let connected = match Event::connected(id.clone()).encode() {
            Ok(frame) => frame,
            Err(e) => {
                self.registry.unregister(&id).await;
                return Err(e);
            }
        };

        let catchup_len = replay.len();
        for frame in std::iter::once(connected).chain(replay) {
            match sink.send(frame) {
                Ok(()) => self.registry.counters().delivered(1),
                Err(SinkError::Full) => self.registry.counters().dropped(1),
                Err(SinkError::Closed) => {
                    tracing::info!(session_id = %id, "Sink closed during subscribe");
                    self.registry.counters().session_retired();
                    self.registry.unregister(&id).await;
                    break;
                }
            }
        }

        tracing::debug!(
            session_id = %id,
            catchup_events = catchup_len,
            "Subscriber attached"
        );

        Ok(id)
    }

    /// Encoded catch-up frames: the tail of `project ++ user`, at most `limit`
    async fn replay(&self, project: &Scope, user: &Scope, limit: usize) -> Result<Vec<Bytes>> {
        let alerts = self.log.latest(user, limit).await;
        let messages = self.log.latest(project, limit - alerts.len()).await;

        let replayed = messages.len() + alerts.len();
        let logged = self.log.len(project).await + self.log.len(user).await;
        let skipped = logged.saturating_sub(replayed);
        if skipped > 0 {
            tracing::warn!(
                project = %project,
                user = %user,
                replayed = replayed,
                skipped = skipped,
                "Backfill truncated to newest events"
            );
        }

        messages.iter().chain(&alerts).map(Event::encode).collect()
    }

    async fn fan_out(&self, scope: &Scope, frame: &Bytes) -> Delivery {
        let mut delivered = 0;
        let mut dropped = 0;
        let mut retired = 0;

        let matched = self
            .registry
            .for_each_matching(scope, |session| match session.push(frame.clone()) {
                Ok(()) => {
                    delivered += 1;
                    Visit::Keep
                }
                Err(SinkError::Full) => {
                    dropped += 1;
                    tracing::warn!(
                        session_id = %session.id,
                        scope = %scope,
                        "Sink full, dropping event"
                    );
                    Visit::Keep
                }
                Err(SinkError::Closed) => {
                    retired += 1;
                    tracing::info!(
                        session_id = %session.id,
                        user_id = %session.user_id,
                        "Sink closed, retiring session"
                    );
                    Visit::Remove
                }
            })
            .await;

        let counters = self.registry.counters();
        counters.delivered(delivered as u64);
        counters.dropped(dropped as u64);
        for _ in 0..retired {
            counters.session_retired();
        }

        Delivery {
            matched,
            delivered,
            dropped,
            retired,
            seq: None,
        }
    }
}

/// Messages go to their own project scope, alerts to their target user
fn check_addressing(scope: &Scope, event: &Event) -> Result<()> {
    if matches!(scope, Scope::Session(_)) {
        return Ok(());
    }

    let expected = match event {
        Event::Message { message, .. } => Scope::from(&message.scope),
        Event::Alert { alert, .. } => Scope::user(alert.target_user_id.clone()),
        _ => return Ok(()),
    };

    if expected != *scope {
        return Err(Error::validation(
            "scope",
            format!("{} event for {} published to {}", event.kind(), expected, scope),
        ));
    }
    Ok(())
}
