//! Persistence of the board as a flat JSON array of task records.
//!
//! Loading is best-effort: a missing, unreadable or malformed document yields
//! an empty task list so the board always opens. The reason is kept on
//! [`Loaded::issue`] for the caller to surface. Saving is atomic (temp file +
//! rename) and reports its errors instead of leaving a half-written file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::board::Board;
use crate::error::StoreError;
use crate::task::Task;

/// Result of a best-effort load.
#[derive(Debug, Default)]
pub struct Loaded {
    pub tasks: Vec<Task>,
    /// Why the document could not be used, if it existed but was unusable.
    pub issue: Option<StoreError>,
}

/// A board document on disk.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    unreadable: bool,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store {
            path: path.into(),
            unreadable: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. Never fails; see [`Loaded`].
    pub fn load(&mut self) -> Loaded {
        self.unreadable = false;
        if !self.path.exists() {
            info!(path = %self.path.display(), "no board document yet, starting empty");
            return Loaded::default();
        }
        let result = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))
            .and_then(|text| decode(&text));
        match result {
            Ok(tasks) => {
                info!(path = %self.path.display(), tasks = tasks.len(), "loaded board");
                Loaded { tasks, issue: None }
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not load board, starting empty");
                self.unreadable = true;
                Loaded {
                    tasks: Vec::new(),
                    issue: Some(e),
                }
            }
        }
    }

    /// Write the tasks atomically.
    ///
    /// If the last load found the existing document unusable, it is copied into
    /// `backup/` before being replaced.
    pub fn save<T: Serialize>(&mut self, tasks: &[T]) -> Result<(), StoreError> {
        let data = encode(tasks)?;

        if self.unreadable && self.path.exists() {
            let kept = self.copy_to_backup("unreadable_")?;
            warn!(backup = %kept.display(), "kept a copy of the unreadable board document");
        }
        self.unreadable = false;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let written = File::create(&tmp).and_then(|mut f| {
            f.write_all(data.as_bytes())?;
            f.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(&self.path, e));
        }
        info!(path = %self.path.display(), tasks = tasks.len(), "saved board");
        Ok(())
    }

    /// Copy the current document to a timestamped file in `backup/`.
    pub fn backup(&self) -> Result<PathBuf, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::Missing(self.path.clone()));
        }
        self.copy_to_backup("")
    }

    fn copy_to_backup(&self, tag: &str) -> Result<PathBuf, StoreError> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        let backup_dir = parent.join("backup");
        fs::create_dir_all(&backup_dir).map_err(|e| StoreError::io(&backup_dir, e))?;

        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("board.json");
        let backup_path = backup_dir.join(format!("{timestamp}_{tag}{file_name}"));

        fs::copy(&self.path, &backup_path).map_err(|e| StoreError::io(&backup_path, e))?;
        Ok(backup_path)
    }
}

/// Serialize tasks, in order, as a pretty-printed JSON array.
pub fn encode<T: Serialize>(tasks: &[T]) -> Result<String, StoreError> {
    serde_json::to_string_pretty(tasks).map_err(StoreError::Encode)
}

/// Parse a document. Blank text is an empty board.
pub fn decode(text: &str) -> Result<Vec<Task>, StoreError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(StoreError::Decode)
}

/// Rebuild the board's contents from loaded tasks.
///
/// Columns named by a task's state but missing from the board are created on
/// the way.
pub fn restore(board: &mut Board, tasks: Vec<Task>) {
    board.clear_all_tasks();
    for task in tasks {
        board.add_task(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use tempfile::TempDir;

    fn sample_board() -> Board {
        let mut board = Board::new();
        board.add_task(Task::new("t1", "Pending").with_description("first").with_priority(Priority::High));
        board.add_task(Task::new("t2", "Blocked").with_owner("ana"));
        board.add_task(Task::new("t3", "Done").with_priority(Priority::Low));
        board
    }

    #[test]
    fn test_round_trip_preserves_content_and_order() {
        let board = sample_board();
        let text = encode(&board.all_tasks()).unwrap();
        let back = decode(&text).unwrap();
        assert_eq!(back, board.snapshot());
    }

    #[test]
    fn test_document_field_names() {
        let board = sample_board();
        let value: serde_json::Value = serde_json::from_str(&encode(&board.snapshot()).unwrap()).unwrap();
        let first = &value[0];
        for key in ["id", "title", "description", "state", "priority", "owner", "createdAt"] {
            assert!(first.get(key).is_some(), "missing {key}");
        }
        assert_eq!(first["priority"], "High");
    }

    #[test]
    fn test_decode_malformed_is_error_and_blank_is_empty() {
        assert!(matches!(decode("{not json"), Err(StoreError::Decode(_))));
        assert!(decode("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_null_optional_fields_use_defaults() {
        let text = r#"[
            {"id": "a1", "title": "kept", "description": "d", "state": "Pending",
             "priority": "High", "owner": "ana", "createdAt": "2024-05-01T10:00:00Z"},
            {"id": "b2", "title": "nulls", "description": null, "state": "Done",
             "priority": null, "owner": null, "createdAt": "2024-05-01T11:00:00Z"}
        ]"#;
        let tasks = decode(text).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].owner, "ana");
        assert_eq!(tasks[1].description, "");
        assert_eq!(tasks[1].priority, Priority::Medium);
        assert_eq!(tasks[1].owner, crate::task::DEFAULT_OWNER);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::new(dir.path().join("nope.json"));
        let loaded = store.load();
        assert!(loaded.tasks.is_empty());
        assert!(loaded.issue.is_none());
    }

    #[test]
    fn test_load_corrupt_file_is_empty_with_issue() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, "[{\"id\": 3").unwrap();

        let mut store = Store::new(&path);
        let loaded = store.load();
        assert!(loaded.tasks.is_empty());
        assert!(matches!(loaded.issue, Some(StoreError::Decode(_))));
    }

    #[test]
    fn test_save_then_load_restores_board() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("board.json");
        let board = sample_board();

        let mut store = Store::new(&path);
        store.save(&board.all_tasks()).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = store.load();
        let mut fresh = Board::new();
        restore(&mut fresh, loaded.tasks);
        assert_eq!(fresh.snapshot(), board.snapshot());
        assert_eq!(fresh.column_names(), vec!["Pending", "InProgress", "Done", "Blocked"]);
    }

    #[test]
    fn test_save_keeps_copy_of_unreadable_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, "garbage").unwrap();

        let mut store = Store::new(&path);
        let loaded = store.load();
        assert!(loaded.issue.is_some());
        store.save::<Task>(&[]).unwrap();

        let backups: Vec<_> = fs::read_dir(dir.path().join("backup")).unwrap().collect();
        assert_eq!(backups.len(), 1);
        let kept = backups[0].as_ref().unwrap().path();
        assert_eq!(fs::read_to_string(kept).unwrap(), "garbage");
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_failed_save_leaves_prior_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, "[]").unwrap();
        // The temp file path is a directory, so the write fails.
        fs::create_dir(path.with_extension("json.tmp")).unwrap();

        let mut store = Store::new(&path);
        let err = store.save(&sample_board().snapshot());
        assert!(matches!(err, Err(StoreError::Io { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_backup_requires_document() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("board.json"));
        assert!(matches!(store.backup(), Err(StoreError::Missing(_))));
    }

    #[test]
    fn test_restore_clears_previous_tasks() {
        let mut board = sample_board();
        restore(&mut board, vec![Task::new("only", "Done")]);
        assert_eq!(board.task_count(), 1);
        assert_eq!(board.column_count(), 4);
    }
}
