//! The operation surface used by the CLI, the board view and reports.
//!
//! `BoardService` pairs a [`Board`] with the [`Store`] it was loaded from and
//! tracks whether the board has changed since the last save.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::board::{Board, CountSummary, DEFAULT_COLUMNS};
use crate::config::Config;
use crate::error::{LookupError, StoreError};
use crate::fields::Priority;
use crate::store::{self, Store};
use crate::task::{Task, TaskEdit, TaskId};

/// Input collected by the "new task" flows.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub owner: Option<String>,
    /// Target column; the board's first column when `None`.
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct BoardService {
    board: Board,
    store: Store,
    default_owner: String,
    autosave: bool,
    saved_revision: u64,
    load_issue: Option<StoreError>,
}

impl BoardService {
    /// Load the configured document into a board built from the configured columns.
    pub fn open(config: &Config) -> Self {
        let board = Board::with_columns(&config.columns, config.done_column.clone());
        let mut service = Self::with_store(board, Store::new(&config.data_file), config.default_owner.clone());
        service.autosave = config.autosave;
        service
    }

    /// Load `store` into `board`, replacing any tasks it already holds.
    pub fn with_store(mut board: Board, mut store: Store, default_owner: String) -> Self {
        let loaded = store.load();
        store::restore(&mut board, loaded.tasks);
        let saved_revision = board.revision();
        BoardService {
            board,
            store,
            default_owner,
            autosave: false,
            saved_revision,
            load_issue: loaded.issue,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn data_file(&self) -> &Path {
        self.store.path()
    }

    /// The load failure, if the document existed but could not be used.
    /// Returned once.
    pub fn take_load_issue(&mut self) -> Option<StoreError> {
        self.load_issue.take()
    }

    pub fn new_task(&mut self, new: NewTask) -> TaskId {
        let column = new
            .column
            .or_else(|| self.board.first_column().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_COLUMNS[0].to_string());
        let task = Task::new(new.title, column)
            .with_description(new.description)
            .with_priority(new.priority)
            .with_owner(new.owner.unwrap_or_else(|| self.default_owner.clone()));
        self.board.add_task(task)
    }

    pub fn edit_task(&mut self, id: &TaskId, edit: TaskEdit) -> bool {
        self.board.edit_task(id, edit)
    }

    pub fn move_task(&mut self, id: &TaskId, target: &str) -> bool {
        self.board.move_task(id, target)
    }

    pub fn remove_task(&mut self, id: &TaskId) -> Option<Task> {
        self.board.remove_task(id)
    }

    /// Create a user-named column. Blank names are ignored.
    pub fn create_column(&mut self, name: &str) -> bool {
        let name = name.trim();
        !name.is_empty() && self.board.create_column(name)
    }

    pub fn filter(&mut self, query: &str) {
        self.board.filter(query);
    }

    pub fn summary(&self) -> CountSummary {
        self.board.count_summary()
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.board.snapshot()
    }

    pub fn resolve(&self, identifier: &str) -> Result<TaskId, LookupError> {
        self.board.resolve(identifier)
    }

    pub fn on_change(&mut self, listener: impl FnMut() + 'static) {
        self.board.on_change(listener);
    }

    /// Changed since the last successful save (or since loading).
    pub fn is_dirty(&self) -> bool {
        self.board.revision() != self.saved_revision
    }

    pub fn autosave_enabled(&self) -> bool {
        self.autosave
    }

    pub fn save(&mut self) -> Result<(), StoreError> {
        self.store.save(&self.board.all_tasks())?;
        self.saved_revision = self.board.revision();
        Ok(())
    }

    /// Save if auto-save is on and there is something to write.
    pub fn autosave(&mut self) -> Option<Result<(), StoreError>> {
        (self.autosave && self.is_dirty()).then(|| self.save())
    }

    pub fn backup(&self) -> Result<PathBuf, StoreError> {
        let path = self.store.backup()?;
        info!(backup = %path.display(), "backed up board");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn service_in(dir: &TempDir) -> BoardService {
        let config = Config {
            data_file: dir.path().join("board.json"),
            ..Config::default()
        };
        BoardService::open(&config)
    }

    #[test]
    fn test_new_task_lands_in_first_column_with_defaults() {
        let dir = TempDir::new().unwrap();
        let mut svc = service_in(&dir);
        let id = svc.new_task(NewTask { title: "Draft".into(), ..Default::default() });

        let t = svc.board().task(&id).unwrap();
        assert_eq!(t.state, "Pending");
        assert_eq!(t.owner, "Unassigned");
        assert_eq!(t.priority, Priority::Medium);
        assert!(svc.is_dirty());
    }

    #[test]
    fn test_new_task_in_named_column() {
        let dir = TempDir::new().unwrap();
        let mut svc = service_in(&dir);
        let id = svc.new_task(NewTask {
            title: "QA".into(),
            column: Some("Review".into()),
            owner: Some("li".into()),
            ..Default::default()
        });
        assert_eq!(svc.board().task(&id).unwrap().state, "Review");
        assert!(svc.board().contains_column("Review"));
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = TempDir::new().unwrap();
        let mut svc = service_in(&dir);
        let id = svc.new_task(NewTask { title: "a".into(), ..Default::default() });
        svc.new_task(NewTask { title: "b".into(), column: Some("Blocked".into()), ..Default::default() });
        assert!(svc.move_task(&id, "Done"));
        svc.save().unwrap();
        assert!(!svc.is_dirty());

        let reopened = service_in(&dir);
        assert_eq!(reopened.snapshot(), svc.snapshot());
        assert_eq!(reopened.summary(), CountSummary { total: 2, completed: 1 });
        assert!(!reopened.is_dirty());
    }

    #[test]
    fn test_change_listener_sees_updated_counts() {
        let dir = TempDir::new().unwrap();
        let mut svc = service_in(&dir);
        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        svc.on_change(move || f.set(f.get() + 1));

        let id = svc.new_task(NewTask { title: "a".into(), ..Default::default() });
        svc.move_task(&id, "Nowhere");
        svc.filter("a");
        svc.create_column("Pending");
        assert_eq!(fired.get(), 1);

        svc.remove_task(&id);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_blank_column_name_ignored() {
        let dir = TempDir::new().unwrap();
        let mut svc = service_in(&dir);
        assert!(!svc.create_column("   "));
        assert!(svc.create_column(" QA "));
        assert!(svc.board().contains_column("QA"));
    }

    #[test]
    fn test_corrupt_document_opens_empty_and_reports_once() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("board.json"), "{{{").unwrap();
        let mut svc = service_in(&dir);

        assert_eq!(svc.board().task_count(), 0);
        assert!(svc.take_load_issue().is_some());
        assert!(svc.take_load_issue().is_none());
    }

    #[test]
    fn test_autosave_only_when_enabled_and_dirty() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_file: dir.path().join("board.json"),
            autosave: true,
            ..Config::default()
        };
        let mut svc = BoardService::open(&config);
        assert!(svc.autosave().is_none());

        svc.new_task(NewTask { title: "a".into(), ..Default::default() });
        assert!(matches!(svc.autosave(), Some(Ok(()))));
        assert!(dir.path().join("board.json").exists());
        assert!(svc.autosave().is_none());
    }
}
