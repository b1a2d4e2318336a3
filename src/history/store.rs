//! Event log across all scopes

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::log::{LogEntry, ScopeLog};
use crate::event::{Event, Scope};

/// Per-scope append-only event history
///
/// Shared read-only by late joiners; written by the broadcaster.
#[derive(Debug, Default)]
pub struct EventLog {
    scopes: RwLock<HashMap<Scope, ScopeLog>>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to a scope, returning its sequence number
    pub async fn append(&self, scope: &Scope, event: Event) -> u64 {
        let mut scopes = self.scopes.write().await;
        scopes.entry(scope.clone()).or_default().append(event)
    }

    /// All logged events of a scope, oldest first
    pub async fn events(&self, scope: &Scope) -> Vec<Event> {
        let scopes = self.scopes.read().await;
        scopes
            .get(scope)
            .map(|log| log.entries().iter().map(|e| e.event.clone()).collect())
            .unwrap_or_default()
    }

    /// Entries of a scope appended after `seq`
    pub async fn since(&self, scope: &Scope, seq: u64) -> Vec<LogEntry> {
        let scopes = self.scopes.read().await;
        scopes
            .get(scope)
            .map(|log| log.since(seq).to_vec())
            .unwrap_or_default()
    }

    /// The newest `n` events of a scope, oldest first
    pub async fn latest(&self, scope: &Scope, n: usize) -> Vec<Event> {
        let scopes = self.scopes.read().await;
        scopes
            .get(scope)
            .map(|log| log.latest(n).iter().map(|e| e.event.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of events logged for a scope
    pub async fn len(&self, scope: &Scope) -> usize {
        let scopes = self.scopes.read().await;
        scopes.get(scope).map(ScopeLog::len).unwrap_or(0)
    }

    /// Number of scopes with at least one event
    pub async fn scope_count(&self) -> usize {
        self.scopes.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{NewMessage, ProjectScope};

    fn message_event(project: &str, content: &str) -> Event {
        Event::message(
            NewMessage::new(
                ProjectScope::Project(project.into()),
                "u2",
                "Bob",
                "student",
                content,
            )
            .into_message(),
        )
    }

    #[tokio::test]
    async fn test_scopes_are_independent() {
        let log = EventLog::new();
        let p1 = Scope::project("p1");
        let p2 = Scope::project("p2");

        assert_eq!(log.append(&p1, message_event("p1", "one")).await, 1);
        assert_eq!(log.append(&p1, message_event("p1", "two")).await, 2);
        assert_eq!(log.append(&p2, message_event("p2", "other")).await, 1);

        assert_eq!(log.len(&p1).await, 2);
        assert_eq!(log.len(&p2).await, 1);
        assert_eq!(log.scope_count().await, 2);
        assert!(log.events(&Scope::user("u1")).await.is_empty());
    }

    #[tokio::test]
    async fn test_events_in_append_order() {
        let log = EventLog::new();
        let scope = Scope::project("p1");
        log.append(&scope, message_event("p1", "first")).await;
        log.append(&scope, message_event("p1", "second")).await;

        let contents: Vec<String> = log
            .events(&scope)
            .await
            .into_iter()
            .filter_map(|e| match e {
                Event::Message { message, .. } => Some(message.content),
                _ => None,
            })
            .collect();
        assert_eq!(contents, vec!["first", "second"]);

        let tail = log.since(&scope, 1).await;
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].seq, 2);
    }

    #[tokio::test]
    async fn test_latest_keeps_newest() {
        let log = EventLog::new();
        let scope = Scope::project("p1");
        for i in 0..5 {
            log.append(&scope, message_event("p1", &i.to_string())).await;
        }

        let newest = log.latest(&scope, 2).await;
        assert_eq!(newest, log.events(&scope).await[3..].to_vec());
        assert_eq!(log.latest(&scope, 10).await.len(), 5);
        assert!(log.latest(&scope, 0).await.is_empty());
        assert!(log.latest(&Scope::project("p2"), 3).await.is_empty());
    }
}
