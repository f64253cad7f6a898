//! Task form used by the "new task" and "edit task" dialogs.
//!
//! The form collects title, description and priority. It hands its result
//! back as a [`NewTask`] or a [`TaskEdit`]; the board applies it.

use crate::fields::Priority;
use crate::service::NewTask;
use crate::task::{Task, TaskEdit};
use crate::tui::input::InputField;

pub const TITLE_FIELD: usize = 0;
pub const DESCRIPTION_FIELD: usize = 1;
pub const PRIORITY_FIELD: usize = 2;
const FIELD_COUNT: usize = 3;

pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub priority: usize,
    pub current_field: usize,
}

impl TaskForm {
    /// Empty form, priority Medium.
    pub fn new() -> Self {
        let mut form = TaskForm {
            title: InputField::new(),
            description: InputField::new(),
            priority: index_of(Priority::default()),
            current_field: TITLE_FIELD,
        };
        form.update_active_field();
        form
    }

    /// Form pre-filled from an existing task.
    pub fn from_task(task: &Task) -> Self {
        let mut form = TaskForm {
            title: InputField::with_value(&task.title),
            description: InputField::with_value(&task.description),
            priority: index_of(task.priority),
            current_field: TITLE_FIELD,
        };
        form.update_active_field();
        form
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.priority % Priority::ALL.len()]
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
        self.update_active_field();
    }

    fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_FIELD;
        self.description.active = self.current_field == DESCRIPTION_FIELD;
    }

    fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_FIELD => Some(&mut self.title),
            DESCRIPTION_FIELD => Some(&mut self.description),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.active_input() {
            field.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.active_input() {
            field.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(field) = self.active_input() {
            field.handle_delete();
        }
    }

    /// Cursor movement in text fields, cycling on the priority selector.
    pub fn handle_left_right(&mut self, right: bool) {
        if self.current_field == PRIORITY_FIELD {
            let n = Priority::ALL.len();
            self.priority = if right { (self.priority + 1) % n } else { (self.priority + n - 1) % n };
        } else if let Some(field) = self.active_input() {
            if right {
                field.move_cursor_right();
            } else {
                field.move_cursor_left();
            }
        }
    }

    /// A form with a blank title is not submitted.
    pub fn is_submittable(&self) -> bool {
        !self.title.value.trim().is_empty()
    }

    pub fn to_new_task(&self) -> NewTask {
        NewTask {
            title: self.title.value.trim().to_string(),
            description: self.description.value.trim().to_string(),
            priority: self.selected_priority(),
            ..NewTask::default()
        }
    }

    pub fn to_edit(&self) -> TaskEdit {
        TaskEdit {
            title: Some(self.title.value.trim().to_string()),
            description: Some(self.description.value.trim().to_string()),
            priority: Some(self.selected_priority()),
            owner: None,
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

fn index_of(p: Priority) -> usize {
    Priority::ALL.iter().position(|&q| q == p).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_form_defaults_to_medium() {
        let form = TaskForm::new();
        assert_eq!(form.selected_priority(), Priority::Medium);
        assert!(form.title.active);
        assert!(!form.is_submittable());
    }

    #[test]
    fn test_typing_and_priority_cycle() {
        let mut form = TaskForm::new();
        for c in "Ship it".chars() {
            form.handle_char(c);
        }
        form.next_field();
        form.handle_char('x');
        form.next_field();
        form.handle_left_right(true);
        assert_eq!(form.selected_priority(), Priority::High);
        form.handle_left_right(true);
        assert_eq!(form.selected_priority(), Priority::Low);
        form.handle_char('z');

        let new = form.to_new_task();
        assert_eq!(new.title, "Ship it");
        assert_eq!(new.description, "x");
        assert_eq!(new.priority, Priority::Low);
        assert!(new.column.is_none());
    }

    #[test]
    fn test_edit_from_task_keeps_values() {
        let task = Task::new("Old", "Done").with_description("d").with_priority(Priority::High);
        let mut form = TaskForm::from_task(&task);
        form.prev_field();
        assert_eq!(form.current_field, PRIORITY_FIELD);
        let edit = form.to_edit();
        assert_eq!(edit.title.as_deref(), Some("Old"));
        assert_eq!(edit.priority, Some(Priority::High));
        assert!(edit.owner.is_none());
    }
}
