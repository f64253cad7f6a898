//! Board reports: completion statistics, per-state counts and CSV export.
//!
//! Reports work on a snapshot of the board and never touch the board itself.

use std::path::Path;

use chrono::{Local, NaiveDate};

use crate::board::CountSummary;
use crate::error::StoreError;
use crate::fields::Priority;
use crate::task::Task;

/// A priority-filtered view over a task snapshot.
#[derive(Debug, Clone)]
pub struct Report {
    tasks: Vec<Task>,
    priority: Option<Priority>,
    done_column: String,
}

impl Report {
    /// `priority` of `None` keeps every task.
    pub fn new(snapshot: Vec<Task>, priority: Option<Priority>, done_column: impl Into<String>) -> Self {
        let tasks = match priority {
            Some(p) => snapshot.into_iter().filter(|t| t.priority == p).collect(),
            None => snapshot,
        };
        Report {
            tasks,
            priority,
            done_column: done_column.into(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn summary(&self) -> CountSummary {
        CountSummary {
            total: self.tasks.len(),
            completed: self.tasks.iter().filter(|t| t.state == self.done_column).count(),
        }
    }

    /// Task count per state, in the order states first appear.
    pub fn by_state(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for task in &self.tasks {
            match counts.iter_mut().find(|(state, _)| *state == task.state) {
                Some((_, n)) => *n += 1,
                None => counts.push((task.state.clone(), 1)),
            }
        }
        counts
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::from("Title,State,Priority,Owner,Created\n");
        for t in &self.tasks {
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                escape_csv(&t.title.replace(',', " ")),
                escape_csv(&t.state),
                t.priority,
                escape_csv(&t.owner),
                t.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            ));
        }
        csv
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), StoreError> {
        std::fs::write(path, self.to_csv()).map_err(|e| StoreError::io(path, e))
    }
}

/// Default export file name for the given day.
pub fn export_file_name(day: NaiveDate) -> String {
    format!("kanban_report_{}.csv", day.format("%Y%m%d"))
}

/// All -> Low -> Medium -> High -> All.
pub fn next_priority_filter(current: Option<Priority>) -> Option<Priority> {
    match current {
        None => Some(Priority::Low),
        Some(Priority::Low) => Some(Priority::Medium),
        Some(Priority::Medium) => Some(Priority::High),
        Some(Priority::High) => None,
    }
}

pub fn priority_filter_label(filter: Option<Priority>) -> &'static str {
    filter.map_or("All", Priority::label)
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn snapshot() -> Vec<Task> {
        let mut board = Board::new();
        board.add_task(Task::new("a, with comma", "Pending").with_priority(Priority::High));
        board.add_task(Task::new("b", "Pending"));
        board.add_task(Task::new("c", "Done").with_priority(Priority::High));
        board.add_task(Task::new("d", "Needs, review"));
        board.snapshot()
    }

    #[test]
    fn test_summary_and_grouping() {
        let report = Report::new(snapshot(), None, "Done");
        assert_eq!(report.summary(), CountSummary { total: 4, completed: 1 });
        assert_eq!(
            report.by_state(),
            vec![("Pending".to_string(), 2), ("Done".to_string(), 1), ("Needs, review".to_string(), 1)]
        );
    }

    #[test]
    fn test_priority_filter() {
        let report = Report::new(snapshot(), Some(Priority::High), "Done");
        assert_eq!(report.tasks().len(), 2);
        assert_eq!(report.summary().completed, 1);
        assert!((report.summary().percent() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_csv_rows() {
        let csv = Report::new(snapshot(), None, "Done").to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Title,State,Priority,Owner,Created");
        assert!(lines[1].starts_with("a  with comma,Pending,High,Unassigned,"));
        assert!(lines[4].starts_with("d,\"Needs, review\",Medium,"));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_csv_title_quotes_and_newlines_stay_in_one_field() {
        let tasks = vec![Task::new("say \"hi\", then\nleave", "Pending")];
        let csv = Report::new(tasks, None, "Done").to_csv();
        let row = csv.strip_prefix("Title,State,Priority,Owner,Created\n").unwrap();
        assert!(row.starts_with("\"say \"\"hi\"\"  then\nleave\",Pending,Medium,Unassigned,"));
    }

    #[test]
    fn test_priority_filter_cycle() {
        let mut f = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            f = next_priority_filter(f);
            seen.push(priority_filter_label(f));
        }
        assert_eq!(seen, vec!["Low", "Medium", "High", "All"]);
    }

    #[test]
    fn test_export_file_name() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(day), "kanban_report_20240309.csv");
    }
}
