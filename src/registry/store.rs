//! Session registry implementation
//!
//! The central registry that tracks every open subscriber connection and
//! answers "which sessions does this scope reach".

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::error::RegistryError;
use super::session::{Session, SessionInfo};
use super::sink::Sink;
use crate::error::{require_id, Result};
use crate::event::{ProjectScope, Scope, SessionId};
use crate::stats::Counters;

/// What a visitor wants done with the session it was handed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Leave the session registered
    Keep,
    /// Unregister the session once the iteration finishes
    Remove,
}

/// Registry of all live sessions
///
/// A single `RwLock` guards the map. Iteration works on a snapshot taken
/// under the read lock, so visitors run without any registry lock held and
/// may ask for the current session to be removed.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    counters: Arc<Counters>,
}

impl SessionRegistry {
    /// Create an empty registry with its own counters
    pub fn new() -> Self {
        Self::with_counters(Arc::new(Counters::new()))
    }

    /// Create an empty registry reporting into shared counters
    pub fn with_counters(counters: Arc<Counters>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            counters,
        }
    }

    /// Counters this registry reports into
    pub fn counters(&self) -> &Arc<Counters> {
        &self.counters
    }

    /// Register a new session and return its id
    pub async fn register(
        &self,
        user_id: &str,
        project: ProjectScope,
        sink: Arc<dyn Sink>,
    ) -> Result<SessionId> {
        require_id("user_id", user_id)?;
        project.validate()?;

        let mut sessions = self.sessions.write().await;

        let mut id = SessionId::new();
        while sessions.contains_key(&id) {
            id = SessionId::new();
        }

        let session = Session::new(id.clone(), user_id.to_string(), project, sink);
        tracing::info!(
            session_id = %id,
            user_id = %session.user_id,
            project = %session.project,
            "Session registered"
        );
        sessions.insert(id.clone(), Arc::new(session));
        self.counters.session_opened();

        Ok(id)
    }

    /// Remove a session
    ///
    /// Returns whether it was present. Removing an unknown id is a no-op.
    pub async fn unregister(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(id);

        match removed {
            Some(session) => {
                self.counters.session_closed();
                tracing::info!(
                    session_id = %id,
                    user_id = %session.user_id,
                    "Session unregistered"
                );
                true
            }
            None => false,
        }
    }

    /// Look up a session
    pub async fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Check whether a session is live
    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Routing metadata of a live session
    pub async fn info(&self, id: &SessionId) -> std::result::Result<SessionInfo, RegistryError> {
        self.get(id)
            .await
            .map(|s| s.info())
            .ok_or_else(|| RegistryError::SessionNotFound(id.clone()))
    }

    /// Sessions currently matching a scope
    pub async fn matching(&self, scope: &Scope) -> Vec<Arc<Session>> {
        let sessions = self.sessions.read().await;

        if let Scope::Session(id) = scope {
            return sessions.get(id).cloned().into_iter().collect();
        }

        sessions
            .values()
            .filter(|s| s.matches(scope))
            .cloned()
            .collect()
    }

    /// Visit every session matching `scope`
    ///
    /// The visited set is exactly the sessions live when the call starts,
    /// each visited once. Sessions the visitor marks [`Visit::Remove`] are
    /// unregistered after the last visit. Returns the number visited.
    pub async fn for_each_matching<F>(&self, scope: &Scope, mut visitor: F) -> usize
    where
        F: FnMut(&Session) -> Visit,
    {
        let snapshot = self.matching(scope).await;

        let mut doomed = Vec::new();
        for session in &snapshot {
            if visitor(session) == Visit::Remove {
                doomed.push(session.id.clone());
            }
        }

        for id in &doomed {
            self.unregister(id).await;
        }

        snapshot.len()
    }

    /// Number of live sessions
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Number of live sessions matching a scope
    pub async fn count_matching(&self, scope: &Scope) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.matches(scope))
            .count()
    }

    /// Remove every session, returning their ids
    pub async fn drain(&self) -> Vec<SessionId> {
        let drained: Vec<SessionId> = self
            .sessions
            .write()
            .await
            .drain()
            .map(|(id, _)| id)
            .collect();
        for _ in &drained {
            self.counters.session_closed();
        }
        drained
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::registry::ChannelSink;

    struct NullSink;

    impl Sink for NullSink {
        fn send(&self, _frame: Bytes) -> std::result::Result<(), crate::registry::SinkError> {
            Ok(())
        }
    }

    fn project(id: &str) -> ProjectScope {
        ProjectScope::from_option(Some(id))
    }

    fn sink() -> Arc<dyn Sink> {
        Arc::new(NullSink)
    }

    #[tokio::test]
    async fn test_register_and_unregister() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.count().await, 0);

        let id1 = registry.register("u1", project("p1"), sink()).await.unwrap();
        let id2 = registry.register("u2", ProjectScope::Global, sink()).await.unwrap();
        assert_ne!(id1, id2);
        assert_eq!(registry.count().await, 2);

        assert!(registry.unregister(&id1).await);
        assert_eq!(registry.count().await, 1);
        assert!(!registry.contains(&id1).await);

        assert!(registry.unregister(&id2).await);
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = SessionRegistry::new();
        let id = registry.register("u1", ProjectScope::Global, sink()).await.unwrap();

        assert!(registry.unregister(&id).await);
        assert!(!registry.unregister(&id).await);
        assert!(!registry.unregister(&SessionId::new()).await);

        let stats = registry.counters().snapshot();
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.active_sessions, 0);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let registry = SessionRegistry::new();

        let result = registry.register("", ProjectScope::Global, sink()).await;
        assert!(result.unwrap_err().is_validation());

        let result = registry
            .register("u1", ProjectScope::Project(" ".into()), sink())
            .await;
        assert!(result.unwrap_err().is_validation());

        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_info() {
        let registry = SessionRegistry::new();
        let id = registry.register("u1", project("p1"), sink()).await.unwrap();

        let info = registry.info(&id).await.unwrap();
        assert_eq!(info.user_id, "u1");
        assert_eq!(info.project, ProjectScope::Project("p1".into()));

        registry.unregister(&id).await;
        assert_eq!(
            registry.info(&id).await,
            Err(RegistryError::SessionNotFound(id))
        );
    }

    #[tokio::test]
    async fn test_for_each_matching_visits_scope_only() {
        let registry = SessionRegistry::new();
        let a = registry.register("u1", project("p1"), sink()).await.unwrap();
        let b = registry.register("u2", project("p1"), sink()).await.unwrap();
        let _c = registry.register("u3", project("p2"), sink()).await.unwrap();

        let mut seen = Vec::new();
        let visited = registry
            .for_each_matching(&Scope::project("p1"), |s| {
                seen.push(s.id.clone());
                Visit::Keep
            })
            .await;

        assert_eq!(visited, 2);
        seen.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_for_each_matching_user_scope_spans_projects() {
        let registry = SessionRegistry::new();
        registry.register("u1", project("p1"), sink()).await.unwrap();
        registry.register("u1", ProjectScope::Global, sink()).await.unwrap();
        registry.register("u2", project("p1"), sink()).await.unwrap();

        let visited = registry
            .for_each_matching(&Scope::user("u1"), |_| Visit::Keep)
            .await;
        assert_eq!(visited, 2);
    }

    #[tokio::test]
    async fn test_removal_mid_iteration_visits_everyone_once() {
        let registry = SessionRegistry::new();
        let mut ids = Vec::new();
        for user in ["u1", "u2", "u3", "u4", "u5"] {
            ids.push(
                registry
                    .register(user, project("p1"), sink())
                    .await
                    .unwrap(),
            );
        }

        // Remove every other session as it is visited
        let mut seen = Vec::new();
        let mut toggle = false;
        registry
            .for_each_matching(&Scope::project("p1"), |s| {
                seen.push(s.id.clone());
                toggle = !toggle;
                if toggle {
                    Visit::Remove
                } else {
                    Visit::Keep
                }
            })
            .await;

        seen.sort();
        ids.sort();
        assert_eq!(seen, ids);
        assert_eq!(registry.count().await, 2);

        // A second pass only sees the survivors
        let visited = registry
            .for_each_matching(&Scope::project("p1"), |_| Visit::Keep)
            .await;
        assert_eq!(visited, 2);
    }

    #[tokio::test]
    async fn test_unregistered_session_not_visited() {
        let registry = SessionRegistry::new();
        let a = registry.register("u1", project("p1"), sink()).await.unwrap();
        let b = registry.register("u2", project("p1"), sink()).await.unwrap();
        registry.unregister(&a).await;

        let mut seen = Vec::new();
        registry
            .for_each_matching(&Scope::project("p1"), |s| {
                seen.push(s.id.clone());
                Visit::Keep
            })
            .await;
        assert_eq!(seen, vec![b]);
    }

    #[tokio::test]
    async fn test_concurrent_register_and_iterate() {
        let registry = Arc::new(SessionRegistry::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let id = registry
                    .register(&format!("u{}", i), project("p1"), sink())
                    .await
                    .unwrap();
                registry
                    .for_each_matching(&Scope::project("p1"), |_| Visit::Keep)
                    .await;
                if i % 2 == 0 {
                    registry.unregister(&id).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.count().await, 16);
        assert_eq!(registry.count_matching(&Scope::project("p1")).await, 16);
    }

    #[tokio::test]
    async fn test_session_scope_lookup() {
        let registry = SessionRegistry::new();
        let (tx_sink, mut rx) = ChannelSink::channel(4);
        let id = registry
            .register("u1", ProjectScope::Global, Arc::new(tx_sink))
            .await
            .unwrap();
        registry.register("u1", ProjectScope::Global, sink()).await.unwrap();

        let matched = registry.matching(&Scope::session(id.clone())).await;
        assert_eq!(matched.len(), 1);
        matched[0].push(Bytes::from_static(b"ping")).unwrap();
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"ping"));
    }

    #[tokio::test]
    async fn test_drain() {
        let registry = SessionRegistry::new();
        registry.register("u1", ProjectScope::Global, sink()).await.unwrap();
        registry.register("u2", ProjectScope::Global, sink()).await.unwrap();

        assert_eq!(registry.drain().await.len(), 2);
        assert_eq!(registry.count().await, 0);
        assert_eq!(registry.counters().snapshot().active_sessions, 0);
    }
}
