//! Notification hub
//!
//! Owns the registry, event log, broadcaster, heartbeat timers and read
//! state, and exposes the operations a transport needs.

use std::sync::Arc;

use super::config::HubConfig;
use super::subscription::Subscription;
use crate::broadcaster::{Broadcaster, Delivery};
use crate::error::Result;
use crate::event::{Alert, Event, Message, NewMessage, ProjectScope, Scope, SessionId};
use crate::heartbeat::{AlertSource, HeartbeatScheduler};
use crate::history::EventLog;
use crate::read_state::ReadStateTracker;
use crate::registry::{ChannelSink, SessionInfo, SessionRegistry, Sink};
use crate::stats::{Counters, HubStats};

/// In-process notification hub
///
/// Each instance is independent; nothing is shared through globals.
pub struct NotificationHub {
    config: HubConfig,
    broadcaster: Arc<Broadcaster>,
    heartbeat: HeartbeatScheduler,
    read_state: ReadStateTracker,
    counters: Arc<Counters>,
}

impl NotificationHub {
    /// Create a hub polling `alerts` on every heartbeat
    pub fn new(config: HubConfig, alerts: Arc<dyn AlertSource>) -> Result<Self> {
        config.validate()?;

        let counters = Arc::new(Counters::new());
        let registry = Arc::new(SessionRegistry::with_counters(Arc::clone(&counters)));
        let broadcaster = Arc::new(Broadcaster::new(registry, Arc::new(EventLog::new())));
        let heartbeat = HeartbeatScheduler::new(
            Arc::clone(&broadcaster),
            alerts,
            config.alert_poll_timeout,
        );

        Ok(Self {
            config,
            broadcaster,
            heartbeat,
            read_state: ReadStateTracker::new(),
            counters,
        })
    }

    /// Get the hub configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Get the session registry
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.broadcaster.registry()
    }

    /// Get the broadcaster
    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Get the read-state tracker
    pub fn read_state(&self) -> &ReadStateTracker {
        &self.read_state
    }

    /// Open a subscription backed by an in-process channel
    ///
    /// `project_id` of `None` (or `"global"`) subscribes to the global scope.
    pub async fn open_subscription(
        &self,
        user_id: &str,
        project_id: Option<&str>,
    ) -> Result<Subscription> {
        let (sink, rx) = ChannelSink::channel(self.config.sink_capacity);
        let session_id = self.open_with_sink(user_id, project_id, Arc::new(sink)).await?;
        Ok(Subscription::new(session_id, rx))
    }

    /// Open a subscription delivering into a transport-provided sink
    ///
    /// Backfill is capped as for channel subscriptions, from `sink_capacity`.
    pub async fn open_with_sink(
        &self,
        user_id: &str,
        project_id: Option<&str>,
        sink: Arc<dyn Sink>,
    ) -> Result<SessionId> {
        let project = ProjectScope::from_option(project_id);
        let session_id = self
            .broadcaster
            .subscribe(user_id, project, sink, self.config.backfill_limit())
            .await?;

        if let Err(e) = self
            .heartbeat
            .start(&session_id, self.config.heartbeat_interval)
            .await
        {
            self.registry().unregister(&session_id).await;
            return Err(e);
        }

        Ok(session_id)
    }

    /// Close a subscription
    ///
    /// Stops the heartbeat and unregisters the session. Safe to call for a
    /// session that is already gone; returns whether it was still live.
    pub async fn close_subscription(&self, session_id: &SessionId) -> bool {
        self.heartbeat.stop(session_id).await;
        self.registry().unregister(session_id).await
    }

    /// Routing metadata of a live session
    pub async fn session_info(&self, session_id: &SessionId) -> Result<SessionInfo> {
        Ok(self.registry().info(session_id).await?)
    }

    /// Validate, stamp and publish a message to its project scope
    pub async fn submit_message(&self, message: NewMessage) -> Result<Message> {
        message.validate(self.config.max_content_len)?;
        let message = message.into_message();
        let scope = Scope::from(&message.scope);

        let delivery = self
            .broadcaster
            .publish(&scope, Event::message(message.clone()))
            .await?;

        tracing::info!(
            message_id = %message.id,
            scope = %scope,
            sender_id = %message.sender_id,
            delivered = delivery.delivered,
            "Message submitted"
        );
        Ok(message)
    }

    /// Publish an alert produced outside the heartbeat cycle
    pub async fn publish_alert(&self, alert: Alert) -> Result<Delivery> {
        let scope = Scope::user(alert.target_user_id.clone());
        self.broadcaster.publish(&scope, Event::alert(alert)).await
    }

    /// Mark one message or notification read
    pub async fn mark_read(&self, user_id: &str, item_id: &str) -> Result<bool> {
        self.read_state.mark_read(user_id, item_id).await
    }

    /// Mark a batch of messages or notifications read
    pub async fn mark_all_read<S: AsRef<str>>(
        &self,
        user_id: &str,
        item_ids: &[S],
    ) -> Result<usize> {
        self.read_state.mark_all_read(user_id, item_ids).await
    }

    /// Whether the user has read the item
    pub async fn is_read(&self, user_id: &str, item_id: &str) -> Result<bool> {
        self.read_state.is_read(user_id, item_id).await
    }

    /// How many of `item_ids` the user has not read
    pub async fn unread_count<S: AsRef<str>>(
        &self,
        user_id: &str,
        item_ids: &[S],
    ) -> Result<usize> {
        self.read_state.unread_count(user_id, item_ids).await
    }

    /// Logged events of a scope, oldest first
    pub async fn history(&self, scope: &Scope) -> Result<Vec<Event>> {
        scope.validate()?;
        Ok(self.broadcaster.log().events(scope).await)
    }

    /// Current statistics
    pub fn stats(&self) -> HubStats {
        self.counters.snapshot()
    }

    /// Stop every heartbeat and drop every session
    pub async fn shutdown(&self) {
        let timers = self.heartbeat.stop_all().await;
        let sessions = self.registry().drain().await;
        tracing::info!(
            timers = timers,
            sessions = sessions.len(),
            "Notification hub shut down"
        );
    }
}
