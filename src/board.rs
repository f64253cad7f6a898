//! The board aggregate.
//!
//! `Board` owns every column and, through them, every task. Callers refer to
//! tasks by [`TaskId`] and mutate them only through the operations here, which
//! keep `task.state` and column membership in lockstep.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::column::Column;
use crate::error::LookupError;
use crate::notify::ChangeNotifier;
use crate::task::{Task, TaskEdit, TaskId};

/// Columns every new board starts with, in display order.
pub const DEFAULT_COLUMNS: [&str; 3] = ["Pending", "InProgress", "Done"];

/// Column whose tasks count as completed.
pub const DONE_COLUMN: &str = "Done";

/// Totals consumed by the progress dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountSummary {
    pub total: usize,
    pub completed: usize,
}

impl CountSummary {
    /// Completed fraction in `0.0..=1.0`; zero for an empty board.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn percent(&self) -> f64 {
        self.ratio() * 100.0
    }
}

#[derive(Debug)]
pub struct Board {
    columns: IndexMap<String, Column>,
    next_color: usize,
    done_column: String,
    filter: String,
    notifier: ChangeNotifier,
}

impl Default for Board {
    fn default() -> Self {
        Board::with_columns(DEFAULT_COLUMNS, DONE_COLUMN)
    }
}

impl Board {
    /// A board with the `Pending`, `InProgress` and `Done` columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// A board bootstrapped with the given columns.
    ///
    /// `done_column` names the column counted as completed; it does not need to
    /// be among `columns`.
    pub fn with_columns<I, S>(columns: I, done_column: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut board = Board {
            columns: IndexMap::new(),
            next_color: 0,
            done_column: done_column.into(),
            filter: String::new(),
            notifier: ChangeNotifier::new(),
        };
        for name in columns {
            board.create_column(name.as_ref());
        }
        board
    }

    // ----- column management -----

    /// Append an empty column. Returns false, changing nothing, if the name is taken.
    pub fn create_column(&mut self, name: &str) -> bool {
        if self.columns.contains_key(name) {
            return false;
        }
        let column = Column::new(name, self.next_color);
        self.next_color += 1;
        self.columns.insert(name.to_string(), column);
        debug!(column = name, "created column");
        true
    }

    /// Columns in creation order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn column_at(&self, idx: usize) -> Option<&Column> {
        self.columns.get_index(idx).map(|(_, c)| c)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Where new tasks land by default.
    pub fn first_column(&self) -> Option<&str> {
        self.columns.keys().next().map(String::as_str)
    }

    pub fn done_column(&self) -> &str {
        &self.done_column
    }

    // ----- task placement -----

    /// Append `task` to the column named by its state, creating that column if needed.
    ///
    /// A task whose id is already on the board gets a fresh id. Returns the id
    /// the task ends up with.
    pub fn add_task(&mut self, mut task: Task) -> TaskId {
        if self.locate(&task.id).is_some() {
            let fresh = TaskId::new();
            warn!(old = %task.id, new = %fresh, "duplicate task id, issuing a new one");
            task.id = fresh;
        }
        if !self.columns.contains_key(&task.state) {
            let name = task.state.clone();
            self.create_column(&name);
        }
        let id = task.id.clone();
        if let Some(column) = self.columns.get_mut(&task.state) {
            debug!(task = %id, column = column.name(), "added task");
            column.push(task);
        }
        self.notifier.notify();
        id
    }

    /// Take a task off the board. `None` if it is not placed.
    pub fn remove_task(&mut self, id: &TaskId) -> Option<Task> {
        let (col, pos) = self.locate(id)?;
        let (_, column) = self.columns.get_index_mut(col)?;
        let task = column.take(pos);
        debug!(task = %id, column = column.name(), "removed task");
        self.notifier.notify();
        Some(task)
    }

    /// Move a task to the end of `target` and update its state.
    ///
    /// An unplaced task or an unknown target is a cancelled move: nothing
    /// changes and no notification is sent.
    pub fn move_task(&mut self, id: &TaskId, target: &str) -> bool {
        if !self.columns.contains_key(target) {
            debug!(task = %id, target, "move cancelled: no such column");
            return false;
        }
        let Some((col, pos)) = self.locate(id) else {
            debug!(task = %id, target, "move cancelled: task not on board");
            return false;
        };
        let Some((_, source)) = self.columns.get_index_mut(col) else {
            return false;
        };
        let task = source.take(pos);
        if let Some(dest) = self.columns.get_mut(target) {
            dest.push(task);
        }
        debug!(task = %id, target, "moved task");
        self.notifier.notify();
        true
    }

    /// Apply field deltas to a task in place. Notifies only when something changed.
    pub fn edit_task(&mut self, id: &TaskId, edit: TaskEdit) -> bool {
        let Some((col, pos)) = self.locate(id) else {
            return false;
        };
        let changed = self
            .columns
            .get_index_mut(col)
            .and_then(|(_, c)| c.get_mut(pos))
            .map(|task| edit.apply(task))
            .unwrap_or(false);
        if changed {
            debug!(task = %id, "edited task");
            self.notifier.notify();
        }
        changed
    }

    /// Empty every column but keep the columns themselves.
    pub fn clear_all_tasks(&mut self) {
        for column in self.columns.values_mut() {
            column.clear();
        }
    }

    // ----- queries -----

    /// (column index, position in column) of a task.
    pub fn locate(&self, id: &TaskId) -> Option<(usize, usize)> {
        self.columns
            .values()
            .enumerate()
            .find_map(|(ci, c)| c.position(id).map(|pi| (ci, pi)))
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        let (col, pos) = self.locate(id)?;
        self.column_at(col)?.tasks().get(pos)
    }

    /// Every task, columns in order, tasks in stored order.
    pub fn all_tasks(&self) -> Vec<&Task> {
        self.columns.values().flat_map(|c| c.tasks()).collect()
    }

    /// Owned copy of [`Board::all_tasks`], handed to persistence and reports.
    pub fn snapshot(&self) -> Vec<Task> {
        self.all_tasks().into_iter().cloned().collect()
    }

    pub fn task_count(&self) -> usize {
        self.columns.values().map(Column::len).sum()
    }

    pub fn count_summary(&self) -> CountSummary {
        CountSummary {
            total: self.task_count(),
            completed: self.columns.get(&self.done_column).map_or(0, Column::len),
        }
    }

    /// Resolve a full id, a unique id prefix, or a unique title (case-insensitive).
    pub fn resolve(&self, identifier: &str) -> Result<TaskId, LookupError> {
        let needle = identifier.trim();
        let tasks = self.all_tasks();

        if let Some(t) = tasks.iter().find(|t| t.id.as_str() == needle) {
            return Ok(t.id.clone());
        }

        let by_prefix: Vec<&&Task> = tasks.iter().filter(|t| t.id.as_str().starts_with(needle)).collect();
        if needle.len() >= 4 && by_prefix.len() == 1 {
            return Ok(by_prefix[0].id.clone());
        }

        let lower = needle.to_lowercase();
        let by_title: Vec<&&Task> = tasks.iter().filter(|t| t.title.to_lowercase() == lower).collect();
        match by_title.len() {
            1 => Ok(by_title[0].id.clone()),
            0 if by_prefix.len() > 1 => Err(ambiguous(needle, &by_prefix)),
            0 => Err(LookupError::NotFound(needle.to_string())),
            _ => Err(ambiguous(needle, &by_title)),
        }
    }

    // ----- view filter -----

    /// Set the text filter. Only visibility changes; stored data is untouched.
    ///
    /// The query is lowercased but otherwise matched as typed, spaces included.
    pub fn filter(&mut self, query: &str) {
        self.filter = query.to_lowercase();
    }

    pub fn filter_query(&self) -> &str {
        &self.filter
    }

    pub fn is_visible(&self, task: &Task) -> bool {
        task.matches(&self.filter)
    }

    /// Tasks of a column that pass the current filter.
    pub fn visible_tasks(&self, column: &str) -> Vec<&Task> {
        self.columns
            .get(column)
            .map(|c| c.tasks().iter().filter(|t| self.is_visible(t)).collect())
            .unwrap_or_default()
    }

    // ----- change notification -----

    /// Run `listener` after every membership or field change.
    pub fn on_change(&mut self, listener: impl FnMut() + 'static) {
        self.notifier.subscribe(listener);
    }

    pub fn revision(&self) -> u64 {
        self.notifier.revision()
    }
}

fn ambiguous(identifier: &str, candidates: &[&&Task]) -> LookupError {
    LookupError::Ambiguous {
        identifier: identifier.to_string(),
        candidates: candidates
            .iter()
            .map(|t| format!("{}  {} [{}]", t.id.short(), t.title, t.state))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter(board: &mut Board) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        board.on_change(move || h.set(h.get() + 1));
        hits
    }

    fn assert_placement_invariant(board: &Board) {
        for task in board.all_tasks() {
            let column = board.column(&task.state).expect("state names a column");
            let copies = column.tasks().iter().filter(|t| t.id == task.id).count();
            assert_eq!(copies, 1, "task {} placed once", task.id);
        }
        let ids: std::collections::HashSet<_> = board.all_tasks().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids.len(), board.task_count());
    }

    #[test]
    fn test_default_columns_in_order() {
        let board = Board::new();
        assert_eq!(board.column_names(), vec!["Pending", "InProgress", "Done"]);
        assert_eq!(board.first_column(), Some("Pending"));
    }

    #[test]
    fn test_create_column_is_idempotent() {
        let mut board = Board::new();
        let id = board.add_task(Task::new("t", "Pending"));
        assert!(board.create_column("Review"));
        let color = board.column("Review").unwrap().color_slot();

        assert!(!board.create_column("Review"));
        assert_eq!(board.column_names(), vec!["Pending", "InProgress", "Done", "Review"]);
        assert_eq!(board.column("Review").unwrap().color_slot(), color);
        assert_eq!(board.task(&id).unwrap().state, "Pending");
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let mut board = Board::new();
        assert!(board.create_column("done"));
        assert_eq!(board.column_count(), 4);
    }

    #[test]
    fn test_colors_assigned_round_robin() {
        let mut board = Board::new();
        for name in ["a", "b", "c", "d", "e"] {
            board.create_column(name);
        }
        let slots: Vec<usize> = board.columns().map(|c| c.color_slot()).collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 4, 5, 6, 0]);
    }

    #[test]
    fn test_add_task_appends_and_notifies() {
        let mut board = Board::new();
        let hits = counter(&mut board);
        let a = board.add_task(Task::new("a", "Pending"));
        let b = board.add_task(Task::new("b", "Pending"));

        let order: Vec<&TaskId> = board.column("Pending").unwrap().tasks().iter().map(|t| &t.id).collect();
        assert_eq!(order, vec![&a, &b]);
        assert_eq!(hits.get(), 2);
        assert_placement_invariant(&board);
    }

    #[test]
    fn test_add_task_creates_missing_column() {
        let mut board = Board::new();
        let id = board.add_task(Task::new("stuck", "Blocked"));

        assert_eq!(board.column_names().last(), Some(&"Blocked"));
        assert_eq!(board.column("Blocked").unwrap().len(), 1);
        assert_eq!(board.task(&id).unwrap().state, "Blocked");

        assert!(!board.create_column("Blocked"));
        assert_eq!(board.column("Blocked").unwrap().len(), 1);
        assert_placement_invariant(&board);
    }

    #[test]
    fn test_add_task_with_duplicate_id_gets_fresh_id() {
        let mut board = Board::new();
        let t = Task::new("a", "Pending");
        let first = board.add_task(t.clone());
        let second = board.add_task(t);

        assert_ne!(first, second);
        assert_eq!(board.task_count(), 2);
        assert_placement_invariant(&board);
    }

    #[test]
    fn test_move_task_updates_state_and_appends() {
        let mut board = Board::new();
        let a = board.add_task(Task::new("a", "Pending"));
        let b = board.add_task(Task::new("b", "Done"));
        let hits = counter(&mut board);

        assert!(board.move_task(&a, "Done"));
        let done: Vec<&TaskId> = board.column("Done").unwrap().tasks().iter().map(|t| &t.id).collect();
        assert_eq!(done, vec![&b, &a]);
        assert_eq!(board.task(&a).unwrap().state, "Done");
        assert!(board.column("Pending").unwrap().is_empty());
        assert_eq!(hits.get(), 1);
        assert_placement_invariant(&board);
    }

    #[test]
    fn test_move_to_unknown_column_is_noop() {
        let mut board = Board::new();
        let a = board.add_task(Task::new("a", "Pending"));
        let hits = counter(&mut board);
        let revision = board.revision();

        assert!(!board.move_task(&a, "NoSuchColumn"));
        assert_eq!(board.task(&a).unwrap().state, "Pending");
        assert_eq!(board.column("Pending").unwrap().len(), 1);
        assert!(!board.contains_column("NoSuchColumn"));
        assert_eq!(hits.get(), 0);
        assert_eq!(board.revision(), revision);
    }

    #[test]
    fn test_move_unplaced_task_is_noop() {
        let mut board = Board::new();
        let hits = counter(&mut board);
        assert!(!board.move_task(&TaskId::new(), "Done"));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_move_within_same_column_goes_to_end() {
        let mut board = Board::new();
        let a = board.add_task(Task::new("a", "Pending"));
        let b = board.add_task(Task::new("b", "Pending"));
        assert!(board.move_task(&a, "Pending"));
        let order: Vec<&TaskId> = board.column("Pending").unwrap().tasks().iter().map(|t| &t.id).collect();
        assert_eq!(order, vec![&b, &a]);
    }

    #[test]
    fn test_remove_task() {
        let mut board = Board::new();
        let a = board.add_task(Task::new("a", "InProgress"));
        let hits = counter(&mut board);

        let removed = board.remove_task(&a).unwrap();
        assert_eq!(removed.title, "a");
        assert_eq!(board.task_count(), 0);
        assert_eq!(hits.get(), 1);

        assert!(board.remove_task(&a).is_none());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_edit_task_in_place() {
        let mut board = Board::new();
        let a = board.add_task(Task::new("a", "Pending"));
        let hits = counter(&mut board);

        let edit = TaskEdit { title: Some("renamed".into()), priority: Some(Priority::High), ..Default::default() };
        assert!(board.edit_task(&a, edit));
        let t = board.task(&a).unwrap();
        assert_eq!(t.title, "renamed");
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.state, "Pending");
        assert_eq!(hits.get(), 1);

        assert!(!board.edit_task(&a, TaskEdit { title: Some("renamed".into()), ..Default::default() }));
        assert!(!board.edit_task(&TaskId::new(), TaskEdit::default()));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_clear_keeps_columns() {
        let mut board = Board::new();
        board.add_task(Task::new("a", "Blocked"));
        board.clear_all_tasks();
        assert_eq!(board.task_count(), 0);
        assert_eq!(board.column_count(), 4);
    }

    #[test]
    fn test_all_tasks_order() {
        let mut board = Board::new();
        let d = board.add_task(Task::new("d", "Done"));
        let p = board.add_task(Task::new("p", "Pending"));
        let i = board.add_task(Task::new("i", "InProgress"));
        let ids: Vec<TaskId> = board.all_tasks().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![p, i, d]);
    }

    #[test]
    fn test_count_summary() {
        let mut board = Board::new();
        board.add_task(Task::new("t1", "Pending"));
        board.add_task(Task::new("t2", "Pending"));
        board.add_task(Task::new("t3", "Done"));

        let s = board.count_summary();
        assert_eq!((s.total, s.completed), (3, 1));
        assert!((s.ratio() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_count_summary_empty_board() {
        let s = Board::new().count_summary();
        assert_eq!((s.total, s.completed), (0, 0));
        assert_eq!(s.ratio(), 0.0);
    }

    #[test]
    fn test_custom_done_column() {
        let mut board = Board::with_columns(["Todo", "Completed"], "Completed");
        board.add_task(Task::new("a", "Completed"));
        board.add_task(Task::new("b", "Todo"));
        assert_eq!(board.count_summary().completed, 1);
    }

    #[test]
    fn test_filter_is_pure() {
        let mut board = Board::new();
        board.add_task(Task::new("Fix bug in parser", "Pending"));
        board.add_task(Task::new("Write docs", "Pending").with_description("mention the BUG tracker"));
        board.add_task(Task::new("Release", "Done"));
        let before = board.snapshot();
        let summary = board.count_summary();
        let hits = counter(&mut board);

        board.filter("bug");
        let visible: Vec<&str> = board.all_tasks().iter().filter(|t| board.is_visible(t)).map(|t| t.title.as_str()).collect();
        assert_eq!(visible, vec!["Fix bug in parser", "Write docs"]);
        assert_eq!(board.visible_tasks("Done").len(), 0);
        assert_eq!(board.snapshot(), before);
        assert_eq!(board.count_summary(), summary);

        board.filter("");
        assert!(board.all_tasks().iter().all(|t| board.is_visible(t)));
        assert_eq!(board.snapshot(), before);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_filter_keeps_whitespace() {
        let mut board = Board::new();
        board.add_task(Task::new("bugfix release", "Pending"));
        board.add_task(Task::new("a bug report", "Pending"));

        board.filter("BUG ");
        let visible: Vec<&str> = board.all_tasks().iter().filter(|t| board.is_visible(t)).map(|t| t.title.as_str()).collect();
        assert_eq!(visible, vec!["a bug report"]);

        board.filter("   ");
        assert_eq!(board.filter_query(), "   ");
        assert!(board.all_tasks().iter().all(|t| !board.is_visible(t)));
    }

    #[test]
    fn test_resolve_identifier() {
        let mut board = Board::new();
        let a = board.add_task(Task::new("Deploy", "Pending"));
        board.add_task(Task::new("Twin", "Pending"));
        board.add_task(Task::new("twin", "Done"));

        assert_eq!(board.resolve(a.as_str()).unwrap(), a);
        assert_eq!(board.resolve(&a.as_str()[..8]).unwrap(), a);
        assert_eq!(board.resolve("deploy").unwrap(), a);
        assert!(matches!(board.resolve("missing"), Err(LookupError::NotFound(_))));
        match board.resolve("TWIN") {
            Err(LookupError::Ambiguous { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }
}
