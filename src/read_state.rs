//! Per-user read state
//!
//! Tracks which message and notification ids each user has acknowledged.
//! Marking is idempotent and ids are not checked against any store: an id is
//! recorded as read whether or not it was ever published.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use crate::error::{require_id, Result};

/// Read-state tracker
#[derive(Debug, Default)]
pub struct ReadStateTracker {
    users: RwLock<HashMap<String, HashSet<String>>>,
}

impl ReadStateTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one item read
    ///
    /// Returns whether the item was unread before.
    pub async fn mark_read(&self, user_id: &str, item_id: &str) -> Result<bool> {
        require_id("user_id", user_id)?;
        require_id("item_id", item_id)?;

        let mut users = self.users.write().await;
        let newly = users
            .entry(user_id.to_string())
            .or_default()
            .insert(item_id.to_string());

        tracing::trace!(user_id, item_id, newly, "Marked read");
        Ok(newly)
    }

    /// Mark a batch of items read
    ///
    /// The whole batch is validated before anything is recorded. Returns the
    /// number of items that were unread before.
    pub async fn mark_all_read<S: AsRef<str>>(
        &self,
        user_id: &str,
        item_ids: &[S],
    ) -> Result<usize> {
        require_id("user_id", user_id)?;
        for id in item_ids {
            require_id("item_ids", id.as_ref())?;
        }

        let mut users = self.users.write().await;
        let read = users.entry(user_id.to_string()).or_default();
        let newly = item_ids
            .iter()
            .filter(|id| read.insert(id.as_ref().to_string()))
            .count();

        tracing::debug!(user_id, items = item_ids.len(), newly, "Marked all read");
        Ok(newly)
    }

    /// Whether the user has read the item
    pub async fn is_read(&self, user_id: &str, item_id: &str) -> Result<bool> {
        require_id("user_id", user_id)?;
        require_id("item_id", item_id)?;

        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .map(|read| read.contains(item_id))
            .unwrap_or(false))
    }

    /// How many of `item_ids` the user has not read
    pub async fn unread_count<S: AsRef<str>>(
        &self,
        user_id: &str,
        item_ids: &[S],
    ) -> Result<usize> {
        require_id("user_id", user_id)?;

        let users = self.users.read().await;
        let read = users.get(user_id);
        Ok(item_ids
            .iter()
            .filter(|id| !read.is_some_and(|r| r.contains(id.as_ref())))
            .count())
    }

    /// Snapshot of everything the user has read, sorted
    pub async fn read_items(&self, user_id: &str) -> Result<Vec<String>> {
        require_id("user_id", user_id)?;

        let users = self.users.read().await;
        let mut items: Vec<String> = users
            .get(user_id)
            .map(|read| read.iter().cloned().collect())
            .unwrap_or_default();
        items.sort();
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_read_idempotent() {
        let tracker = ReadStateTracker::new();

        assert!(tracker.mark_read("u1", "m1").await.unwrap());
        let after_one = tracker.read_items("u1").await.unwrap();

        assert!(!tracker.mark_read("u1", "m1").await.unwrap());
        assert_eq!(tracker.read_items("u1").await.unwrap(), after_one);

        assert!(tracker.is_read("u1", "m1").await.unwrap());
        assert!(!tracker.is_read("u1", "m2").await.unwrap());
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let tracker = ReadStateTracker::new();
        tracker.mark_read("u1", "m1").await.unwrap();

        assert!(!tracker.is_read("u2", "m1").await.unwrap());
        assert!(tracker.read_items("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_all_read_any_order() {
        for order in [["a", "b", "c"], ["c", "a", "b"], ["b", "c", "a"]] {
            let tracker = ReadStateTracker::new();
            assert_eq!(tracker.mark_all_read("u1", &order).await.unwrap(), 3);

            for id in ["a", "b", "c"] {
                assert!(tracker.is_read("u1", id).await.unwrap());
            }
        }
    }

    #[tokio::test]
    async fn test_mark_all_read_counts_new_only() {
        let tracker = ReadStateTracker::new();
        tracker.mark_read("u1", "a").await.unwrap();

        let ids = vec!["a".to_string(), "b".to_string(), "b".to_string()];
        assert_eq!(tracker.mark_all_read("u1", &ids).await.unwrap(), 1);
        assert_eq!(tracker.read_items("u1").await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_invalid_input_leaves_state_unchanged() {
        let tracker = ReadStateTracker::new();

        assert!(tracker.mark_read("", "m1").await.unwrap_err().is_validation());
        assert!(tracker.mark_read("u1", " ").await.unwrap_err().is_validation());
        assert!(tracker.is_read("", "m1").await.is_err());

        let err = tracker.mark_all_read("u1", &["a", "", "c"]).await.unwrap_err();
        assert!(err.is_validation());
        assert!(!tracker.is_read("u1", "a").await.unwrap());
        assert!(tracker.read_items("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unread_count() {
        let tracker = ReadStateTracker::new();
        tracker.mark_all_read("u1", &["a", "b"]).await.unwrap();

        assert_eq!(tracker.unread_count("u1", &["a", "b", "c"]).await.unwrap(), 1);
        assert_eq!(tracker.unread_count("u2", &["a", "b", "c"]).await.unwrap(), 3);
        let none: [&str; 0] = [];
        assert_eq!(tracker.unread_count("u1", &none).await.unwrap(), 0);
    }
}
