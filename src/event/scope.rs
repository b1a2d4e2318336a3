//! Addressing types
//!
//! A [`Scope`] decides which sessions receive an event. Sessions subscribe
//! with a user id and a [`ProjectScope`]; the registry matches one against the
//! other.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{require_id, Error, Result};

/// Wire name of the project-less scope
pub const GLOBAL_SCOPE: &str = "global";

/// Unique identifier for a live session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Allocate a fresh session id
    pub fn new() -> Self {
        Self(format!("sess_{}", Uuid::new_v4().simple()))
    }

    /// Borrow the id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Project a session (or a message) belongs to
///
/// Serialized as the bare project id, or `"global"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ProjectScope {
    /// Not tied to any project
    Global,
    /// A single project
    Project(String),
}

impl ProjectScope {
    /// Build from an optional project id; `None` and `"global"` mean [`ProjectScope::Global`]
    pub fn from_option(project_id: Option<&str>) -> Self {
        match project_id {
            None => ProjectScope::Global,
            Some(id) if id == GLOBAL_SCOPE => ProjectScope::Global,
            Some(id) => ProjectScope::Project(id.to_string()),
        }
    }

    /// Project id, if any
    pub fn project_id(&self) -> Option<&str> {
        match self {
            ProjectScope::Global => None,
            ProjectScope::Project(id) => Some(id),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            ProjectScope::Global => Ok(()),
            ProjectScope::Project(id) => validate_project_id(id),
        }
    }
}

impl From<String> for ProjectScope {
    fn from(value: String) -> Self {
        if value == GLOBAL_SCOPE {
            ProjectScope::Global
        } else {
            ProjectScope::Project(value)
        }
    }
}

impl From<ProjectScope> for String {
    fn from(value: ProjectScope) -> Self {
        match value {
            ProjectScope::Global => GLOBAL_SCOPE.to_string(),
            ProjectScope::Project(id) => id,
        }
    }
}

impl std::fmt::Display for ProjectScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectScope::Global => f.write_str(GLOBAL_SCOPE),
            ProjectScope::Project(id) => f.write_str(id),
        }
    }
}

/// Addressing key for a published event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Sessions subscribed without a project
    Global,
    /// Sessions subscribed to one project
    Project(String),
    /// Every session of one user, whatever its project
    User(String),
    /// Exactly one session
    Session(SessionId),
}

impl Scope {
    /// Address one project; `"global"` addresses [`Scope::Global`]
    pub fn project(id: impl Into<String>) -> Self {
        let id = id.into();
        if id == GLOBAL_SCOPE {
            Scope::Global
        } else {
            Scope::Project(id)
        }
    }

    /// Address one user
    pub fn user(id: impl Into<String>) -> Self {
        Scope::User(id.into())
    }

    /// Address one session
    pub fn session(id: SessionId) -> Self {
        Scope::Session(id)
    }

    /// Reject scopes whose id is empty
    pub fn validate(&self) -> Result<()> {
        match self {
            Scope::Global => Ok(()),
            Scope::Project(id) => validate_project_id(id),
            Scope::User(id) => require_id("user_id", id),
            Scope::Session(id) => require_id("session_id", id.as_str()),
        }
    }
}

/// `"global"` is reserved for the project-less scope
fn validate_project_id(id: &str) -> Result<()> {
    require_id("project_id", id)?;
    if id == GLOBAL_SCOPE {
        return Err(Error::validation(
            "project_id",
            format!("'{}' names the global scope, not a project", GLOBAL_SCOPE),
        ));
    }
    Ok(())
}

impl From<&ProjectScope> for Scope {
    fn from(value: &ProjectScope) -> Self {
        match value {
            ProjectScope::Global => Scope::Global,
            ProjectScope::Project(id) => Scope::Project(id.clone()),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Global => f.write_str(GLOBAL_SCOPE),
            Scope::Project(id) => write!(f, "project:{}", id),
            Scope::User(id) => write!(f, "user:{}", id),
            Scope::Session(id) => write!(f, "session:{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("sess_"));
    }

    #[test]
    fn test_project_scope_from_option() {
        assert_eq!(ProjectScope::from_option(None), ProjectScope::Global);
        assert_eq!(ProjectScope::from_option(Some("global")), ProjectScope::Global);
        assert_eq!(
            ProjectScope::from_option(Some("p1")),
            ProjectScope::Project("p1".into())
        );
    }

    #[test]
    fn test_project_scope_serde() {
        let json = serde_json::to_string(&ProjectScope::Project("p1".into())).unwrap();
        assert_eq!(json, "\"p1\"");

        let global: ProjectScope = serde_json::from_str("\"global\"").unwrap();
        assert_eq!(global, ProjectScope::Global);
    }

    #[test]
    fn test_scope_validate() {
        assert!(Scope::Global.validate().is_ok());
        assert!(Scope::project("p1").validate().is_ok());
        assert!(Scope::project("").validate().is_err());
        assert!(Scope::user(" ").validate().is_err());
    }

    #[test]
    fn test_project_named_global_is_not_a_project() {
        assert_eq!(Scope::project(GLOBAL_SCOPE), Scope::Global);

        let raw = ProjectScope::Project(GLOBAL_SCOPE.into());
        assert!(raw.validate().unwrap_err().is_validation());
        assert!(Scope::from(&raw).validate().unwrap_err().is_validation());
        assert!(Scope::Project(GLOBAL_SCOPE.into()).validate().is_err());
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::project("p1").to_string(), "project:p1");
        assert_eq!(Scope::user("u1").to_string(), "user:u1");
        assert_eq!(Scope::Global.to_string(), "global");
    }
}
