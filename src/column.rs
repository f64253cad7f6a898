//! Columns: named, ordered buckets of tasks.

use crate::task::{Task, TaskId};

/// Column backgrounds handed out round-robin as columns are created
/// (6-char hex without `#`).
pub const PALETTE: &[&str] = &[
    "fff0f0", // red
    "fffbe6", // yellow
    "e6ffed", // green
    "e3f2fd", // blue
    "f3e5f5", // lilac
    "e0f2f1", // teal
    "fff3e0", // orange
];

/// A workflow state on the board and the tasks currently in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    color: usize,
    tasks: Vec<Task>,
}

impl Column {
    pub(crate) fn new(name: impl Into<String>, color: usize) -> Self {
        Column {
            name: name.into(),
            color: color % PALETTE.len(),
            tasks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Palette slot assigned at creation.
    pub fn color_slot(&self) -> usize {
        self.color
    }

    /// Palette hex for this column.
    pub fn color_hex(&self) -> &'static str {
        PALETTE[self.color]
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    pub(crate) fn push(&mut self, mut task: Task) {
        task.state.clone_from(&self.name);
        self.tasks.push(task);
    }

    pub(crate) fn take(&mut self, idx: usize) -> Task {
        self.tasks.remove(idx)
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut Task> {
        self.tasks.get_mut(idx)
    }

    pub(crate) fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_sets_state() {
        let mut col = Column::new("Review", 0);
        col.push(Task::new("t", "Elsewhere"));
        assert_eq!(col.tasks()[0].state, "Review");
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn test_color_wraps_palette() {
        let col = Column::new("x", PALETTE.len() + 2);
        assert_eq!(col.color_slot(), 2);
        assert_eq!(col.color_hex(), PALETTE[2]);
    }
}
