//! External alert sources
//!
//! The heartbeat polls an [`AlertSource`] once per tick for the session's
//! user. Real deployments plug in grade monitoring; [`RandomAlertSource`] is
//! a stand-in that fires at random.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::event::{Alert, AlertCategory, Severity};

/// Failure of an alert source poll
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertSourceError {
    /// The source could not be queried
    #[error("alert source unavailable: {0}")]
    Unavailable(String),
    /// The source did not answer within the poll timeout
    #[error("alert poll timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Query for the next alert targeted at a user
///
/// Returns at most one alert per call and should have no side effects
/// beyond consuming that alert. May be slow; may fail.
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Next pending alert for `user_id`, if any
    async fn next_alert_for(&self, user_id: &str) -> Result<Option<Alert>, AlertSourceError>;
}

/// Source that never has anything to say
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAlerts;

#[async_trait]
impl AlertSource for NoAlerts {
    async fn next_alert_for(&self, _user_id: &str) -> Result<Option<Alert>, AlertSourceError> {
        Ok(None)
    }
}

struct Template {
    category: AlertCategory,
    severity: Severity,
    summary: &'static str,
    suggestions: &'static [&'static str],
}

const TEMPLATES: &[Template] = &[
    Template {
        category: AlertCategory::Grade,
        severity: Severity::Warning,
        summary: "Your grade in a course dropped below 70%",
        suggestions: &[
            "Review the feedback on your latest submission",
            "Book a slot in office hours",
            "Form a study group with classmates",
        ],
    },
    Template {
        category: AlertCategory::Grade,
        severity: Severity::Critical,
        summary: "Your grade in a course is at risk of failing",
        suggestions: &[
            "Contact your instructor this week",
            "Ask about extra credit or resubmission options",
        ],
    },
    Template {
        category: AlertCategory::Assignment,
        severity: Severity::Info,
        summary: "An assignment is due within 48 hours",
        suggestions: &["Check the rubric before submitting"],
    },
    Template {
        category: AlertCategory::Attendance,
        severity: Severity::Warning,
        summary: "You missed two sessions in a row",
        suggestions: &["Catch up on the recorded lectures", "Let your instructor know"],
    },
];

/// Placeholder grade-alert generator
///
/// Each poll fires with probability `probability` and picks one of a fixed
/// set of templates.
#[derive(Debug, Clone)]
pub struct RandomAlertSource {
    probability: f64,
}

impl RandomAlertSource {
    /// Create a source firing with the given probability per poll (clamped to 0..=1)
    pub fn new(probability: f64) -> Self {
        Self {
            probability: if probability.is_nan() {
                0.0
            } else {
                probability.clamp(0.0, 1.0)
            },
        }
    }

    /// Probability of an alert per poll
    pub fn probability(&self) -> f64 {
        self.probability
    }

    fn roll(&self, user_id: &str) -> Option<Alert> {
        let mut rng = rand::thread_rng();
        if !rng.gen_bool(self.probability) {
            return None;
        }

        let template = TEMPLATES.choose(&mut rng)?;
        let alert = template.suggestions.iter().fold(
            Alert::new(template.category, template.severity, user_id, template.summary),
            |alert, s| alert.suggest(*s),
        );
        Some(alert)
    }
}

impl Default for RandomAlertSource {
    fn default() -> Self {
        Self::new(0.05)
    }
}

#[async_trait]
impl AlertSource for RandomAlertSource {
    async fn next_alert_for(&self, user_id: &str) -> Result<Option<Alert>, AlertSourceError> {
        Ok(self.roll(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_alerts() {
        assert_eq!(NoAlerts.next_alert_for("u1").await, Ok(None));
    }

    #[tokio::test]
    async fn test_random_never() {
        let source = RandomAlertSource::new(0.0);
        for _ in 0..50 {
            assert_eq!(source.next_alert_for("u1").await, Ok(None));
        }
    }

    #[tokio::test]
    async fn test_random_always() {
        let source = RandomAlertSource::new(1.0);
        let alert = source.next_alert_for("u1").await.unwrap().unwrap();

        assert_eq!(alert.target_user_id, "u1");
        assert!(!alert.summary.is_empty());
        assert!(!alert.suggestions.is_empty());
    }

    #[test]
    fn test_probability_clamped() {
        assert_eq!(RandomAlertSource::new(2.0).probability(), 1.0);
        assert_eq!(RandomAlertSource::new(-1.0).probability(), 0.0);
        assert_eq!(RandomAlertSource::new(f64::NAN).probability(), 0.0);
    }
}
