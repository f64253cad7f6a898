//! Task data structure and related functionality.
//!
//! A `Task` is the atomic unit of work on the board. It carries no behaviour of
//! its own; placement and mutation go through [`crate::board::Board`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::fields::Priority;

/// Owner assigned to tasks that nobody has picked up yet.
pub const DEFAULT_OWNER: &str = "Unassigned";

/// Globally unique task identifier, stored as UUID text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        TaskId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, used for compact display.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl Default for TaskId {
    fn default() -> Self {
        TaskId::new()
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A card on the board.
///
/// `state` always names the column that currently holds the task; only the
/// board changes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default = "default_owner", deserialize_with = "null_as_default_owner")]
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

fn default_owner() -> String {
    DEFAULT_OWNER.to_string()
}

/// `null` reads like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn null_as_default_owner<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|owner| owner.unwrap_or_else(default_owner))
}

impl Task {
    /// Create a task destined for the column `state`, stamped with the current time.
    pub fn new(title: impl Into<String>, state: impl Into<String>) -> Self {
        Task {
            id: TaskId::new(),
            title: title.into(),
            description: String::new(),
            state: state.into(),
            priority: Priority::default(),
            owner: default_owner(),
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Case-insensitive substring match on title or description.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Field deltas produced by edit dialogs and `tb edit`.
///
/// `None` leaves the field untouched. Identity, state and creation time are
/// not editable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub owner: Option<String>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.owner.is_none()
    }

    /// Apply the deltas. Returns true if any field actually changed.
    pub fn apply(self, task: &mut Task) -> bool {
        let mut changed = false;
        if let Some(title) = self.title {
            changed |= task.title != title;
            task.title = title;
        }
        if let Some(description) = self.description {
            changed |= task.description != description;
            task.description = description;
        }
        if let Some(priority) = self.priority {
            changed |= task.priority != priority;
            task.priority = priority;
        }
        if let Some(owner) = self.owner {
            changed |= task.owner != owner;
            task.owner = owner;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let t = Task::new("Write docs", "Pending");
        assert_eq!(t.state, "Pending");
        assert_eq!(t.owner, "Unassigned");
        assert_eq!(t.priority, Priority::Medium);
        assert!(t.description.is_empty());
        assert_ne!(t.id, Task::new("Write docs", "Pending").id);
    }

    #[test]
    fn test_matches_title_or_description() {
        let t = Task::new("Fix login", "Pending").with_description("Crash on BUG report");
        assert!(t.matches("login"));
        assert!(t.matches("bug"));
        assert!(t.matches(""));
        assert!(!t.matches("deploy"));
    }

    #[test]
    fn test_edit_apply_reports_changes() {
        let mut t = Task::new("a", "Pending");
        let edit = TaskEdit { title: Some("a".into()), ..Default::default() };
        assert!(!edit.apply(&mut t));

        let edit = TaskEdit { priority: Some(Priority::High), owner: Some("ana".into()), ..Default::default() };
        assert!(edit.apply(&mut t));
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.owner, "ana");
        assert_eq!(t.state, "Pending");
    }

    #[test]
    fn test_missing_optional_fields_are_defaulted() {
        let json = r#"{"id":"abc","title":"t","state":"Done","createdAt":"2024-03-01T10:00:00Z"}"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.owner, "Unassigned");
        assert_eq!(t.priority, Priority::Medium);
        assert_eq!(t.id.as_str(), "abc");
    }

    #[test]
    fn test_short_id() {
        let id = TaskId::from("0123456789abcdef");
        assert_eq!(id.short(), "01234567");
        assert_eq!(TaskId::from("abc").short(), "abc");
    }
}
