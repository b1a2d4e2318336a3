//! Session record stored in the registry

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::error::SinkError;
use super::sink::Sink;
use crate::event::{ProjectScope, Scope, SessionId};

/// One live subscriber connection and its routing metadata
pub struct Session {
    /// Unique session ID
    pub id: SessionId,

    /// Subscribing user
    pub user_id: String,

    /// Project the session follows
    pub project: ProjectScope,

    /// When the session was registered
    pub created_at: DateTime<Utc>,

    sink: Arc<dyn Sink>,
}

impl Session {
    pub(super) fn new(
        id: SessionId,
        user_id: String,
        project: ProjectScope,
        sink: Arc<dyn Sink>,
    ) -> Self {
        Self {
            id,
            user_id,
            project,
            created_at: Utc::now(),
            sink,
        }
    }

    /// Whether an event addressed to `scope` should reach this session
    pub fn matches(&self, scope: &Scope) -> bool {
        match scope {
            Scope::Global => self.project == ProjectScope::Global,
            Scope::Project(id) => self.project.project_id() == Some(id.as_str()),
            Scope::User(id) => self.user_id == *id,
            Scope::Session(id) => self.id == *id,
        }
    }

    /// Push an encoded event to the subscriber
    pub fn push(&self, frame: Bytes) -> Result<(), SinkError> {
        self.sink.send(frame)
    }

    /// Snapshot of the routing metadata
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            project: self.project.clone(),
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("project", &self.project)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Routing metadata of a session, without its sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub user_id: String,
    pub project: ProjectScope,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ChannelSink;

    fn session(user: &str, project: Option<&str>) -> Session {
        let (sink, _rx) = ChannelSink::channel(1);
        Session::new(
            SessionId::new(),
            user.into(),
            ProjectScope::from_option(project),
            Arc::new(sink),
        )
    }

    #[test]
    fn test_matches_project() {
        let s = session("u1", Some("p1"));
        assert!(s.matches(&Scope::project("p1")));
        assert!(!s.matches(&Scope::project("p2")));
        assert!(!s.matches(&Scope::Global));
    }

    #[test]
    fn test_matches_global() {
        let s = session("u1", None);
        assert!(s.matches(&Scope::Global));
        assert!(!s.matches(&Scope::project("p1")));
    }

    #[test]
    fn test_matches_user_across_projects() {
        let s = session("u1", Some("p1"));
        assert!(s.matches(&Scope::user("u1")));
        assert!(!s.matches(&Scope::user("u2")));
    }

    #[test]
    fn test_matches_session() {
        let s = session("u1", Some("p1"));
        assert!(s.matches(&Scope::session(s.id.clone())));
        assert!(!s.matches(&Scope::session(SessionId::new())));
    }
}
