//! Alerts targeted at a single user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the alert is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    /// A grade changed or fell below a threshold
    Grade,
    /// An assignment is due or overdue
    Assignment,
    /// Attendance dropped
    Attendance,
}

/// How urgent the alert is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// An alert as delivered to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub category: AlertCategory,
    pub severity: Severity,
    pub target_user_id: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    /// Suggested next steps, in display order
    pub suggestions: Vec<String>,
}

impl Alert {
    /// Create an alert with a fresh id and no suggestions
    pub fn new(
        category: AlertCategory,
        severity: Severity,
        target_user_id: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("alert_{}", Uuid::new_v4().simple()),
            category,
            severity,
            target_user_id: target_user_id.into(),
            summary: summary.into(),
            created_at: Utc::now(),
            suggestions: Vec::new(),
        }
    }

    /// Append a suggestion
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}
