//! Chat-style messages scoped to a project

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scope::ProjectScope;
use crate::error::{require_id, Error, Result};

/// Kind of message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Ordinary chat message
    Message,
    /// Posted by staff to everyone in the scope
    Announcement,
    /// Generated by the platform itself
    System,
}

impl MessageKind {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Message => "message",
            MessageKind::Announcement => "announcement",
            MessageKind::System => "system",
        }
    }
}

impl FromStr for MessageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "message" => Ok(MessageKind::Message),
            "announcement" => Ok(MessageKind::Announcement),
            "system" => Ok(MessageKind::System),
            other => Err(Error::validation(
                "kind",
                format!("unknown message kind '{}'", other),
            )),
        }
    }
}

/// A message as delivered to subscribers
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub scope: ProjectScope,
    pub sender_id: String,
    pub sender_display_name: String,
    pub sender_role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub kind: MessageKind,
}

/// Input to message submission, before an id and timestamp are assigned
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub scope: ProjectScope,
    pub sender_id: String,
    pub sender_display_name: String,
    pub sender_role: String,
    pub content: String,
    pub kind: MessageKind,
}

impl NewMessage {
    /// Create a plain chat message
    pub fn new(
        scope: ProjectScope,
        sender_id: impl Into<String>,
        sender_display_name: impl Into<String>,
        sender_role: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            scope,
            sender_id: sender_id.into(),
            sender_display_name: sender_display_name.into(),
            sender_role: sender_role.into(),
            content: content.into(),
            kind: MessageKind::Message,
        }
    }

    /// Set the message kind
    pub fn kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check every field; `max_content_len` is counted in characters
    pub fn validate(&self, max_content_len: usize) -> Result<()> {
        self.scope.validate()?;
        require_id("sender_id", &self.sender_id)?;
        require_id("sender_display_name", &self.sender_display_name)?;
        require_id("sender_role", &self.sender_role)?;

        if self.content.trim().is_empty() {
            return Err(Error::validation("content", "must not be empty"));
        }
        let len = self.content.chars().count();
        if len > max_content_len {
            return Err(Error::validation(
                "content",
                format!("{} characters exceeds limit of {}", len, max_content_len),
            ));
        }

        Ok(())
    }

    /// Assign an id and creation time
    pub fn into_message(self) -> Message {
        Message {
            id: format!("msg_{}", Uuid::new_v4().simple()),
            scope: self.scope,
            sender_id: self.sender_id,
            sender_display_name: self.sender_display_name,
            sender_role: self.sender_role,
            content: self.content,
            created_at: Utc::now(),
            kind: self.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::GLOBAL_SCOPE;

    fn hello() -> NewMessage {
        NewMessage::new(ProjectScope::Project("p1".into()), "u2", "Bob", "student", "hi")
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("message".parse::<MessageKind>().unwrap(), MessageKind::Message);
        assert_eq!(
            "announcement".parse::<MessageKind>().unwrap(),
            MessageKind::Announcement
        );
        assert!("shout".parse::<MessageKind>().is_err());
    }

    #[test]
    fn test_validate_ok() {
        assert!(hello().validate(4096).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut msg = hello();
        msg.sender_id = String::new();
        assert!(msg.validate(4096).is_err());

        let mut msg = hello();
        msg.content = "  ".into();
        assert!(msg.validate(4096).is_err());

        let msg = NewMessage::new(
            ProjectScope::Project(String::new()),
            "u2",
            "Bob",
            "student",
            "hi",
        );
        assert!(msg.validate(4096).is_err());
    }

    #[test]
    fn test_validate_rejects_project_named_global() {
        let msg = NewMessage::new(
            ProjectScope::Project(GLOBAL_SCOPE.into()),
            "u2",
            "Bob",
            "student",
            "hi",
        );
        assert!(msg.validate(4096).unwrap_err().is_validation());
    }

    #[test]
    fn test_validate_content_limit() {
        let mut msg = hello();
        msg.content = "é".repeat(10);
        assert!(msg.validate(10).is_ok());
        assert!(msg.validate(9).is_err());
    }

    #[test]
    fn test_into_message() {
        let msg = hello().kind(MessageKind::Announcement).into_message();
        assert!(msg.id.starts_with("msg_"));
        assert_eq!(msg.content, "hi");
        assert_eq!(msg.kind, MessageKind::Announcement);
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(hello().into_message()).unwrap();
        assert_eq!(json["senderDisplayName"], "Bob");
        assert_eq!(json["scope"], "p1");
        assert_eq!(json["kind"], "message");
    }
}
