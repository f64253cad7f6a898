//! Command implementations for the CLI interface.
//!
//! Each handler works on an opened [`BoardService`]. Handlers that change the
//! board save it before returning; failures are reported on stderr and end the
//! process with status 1.

use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::board::CountSummary;
use crate::config::Config;
use crate::fields::Priority;
use crate::report::{self, Report};
use crate::service::{BoardService, NewTask};
use crate::task::{Task, TaskEdit, TaskId};
use crate::tui::run::run_board_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive board (default).
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Owner label (defaults to the configured owner).
        #[arg(long)]
        owner: Option<String>,
        /// Column to place the task in; created if it does not exist.
        #[arg(long)]
        column: Option<String>,
    },

    /// List tasks grouped by column.
    List {
        /// Only show this column.
        #[arg(long)]
        column: Option<String>,
        /// Only show tasks whose title or description contains this text.
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show a single task by ID, ID prefix or title.
    Show {
        id: String,
    },

    /// Move a task to another column.
    Move {
        /// Task ID, ID prefix or title.
        id: String,
        /// Target column name (case-sensitive).
        column: String,
    },

    /// Update fields on a task.
    Edit {
        /// Task ID, ID prefix or title.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        owner: Option<String>,
    },

    /// Delete a task.
    Remove {
        /// Task ID, ID prefix or title.
        id: String,
    },

    /// List columns with task counts.
    Columns,

    /// Show completion progress.
    Summary,

    /// Print a report: completion, tasks per column and a task table.
    Report {
        /// Only include tasks with this priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },

    /// Export tasks to CSV.
    Export {
        /// Output file (default: kanban_report_YYYYMMDD.csv).
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Only include tasks with this priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },

    /// Create a timestamped backup of the board document.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the board view.
pub fn cmd_ui(service: BoardService, config: &Config) {
    if let Err(e) = run_board_tui(service, config.poll_timeout) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Add a new task to the board.
pub fn cmd_add(
    service: &mut BoardService,
    title: String,
    desc: Option<String>,
    priority: Priority,
    owner: Option<String>,
    column: Option<String>,
) {
    let column = column.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
    let id = service.new_task(NewTask {
        title,
        description: desc.unwrap_or_default(),
        priority,
        owner,
        column,
    });
    save_or_exit(service);
    let state = service.board().task(&id).map(|t| t.state.as_str()).unwrap_or("-");
    println!("Added task {} to {}", id.short(), state);
}

/// List tasks, grouped by column, honouring the text filter.
pub fn cmd_list(service: &mut BoardService, column: Option<String>, filter: Option<String>) {
    if let Some(ref name) = column {
        if !service.board().contains_column(name) {
            eprintln!("No column named '{name}'. Columns: {}", service.board().column_names().join(", "));
            std::process::exit(1);
        }
    }
    service.filter(filter.as_deref().unwrap_or(""));

    let board = service.board();
    let mut shown = 0;
    for col in board.columns() {
        if column.as_deref().is_some_and(|c| c != col.name()) {
            continue;
        }
        let tasks = board.visible_tasks(col.name());
        println!("== {} ({}) ==", col.name(), col.len());
        if !tasks.is_empty() {
            print_table(&tasks);
            shown += tasks.len();
        }
        println!();
    }
    if !board.filter_query().is_empty() {
        println!("{} task(s) match '{}'", shown, board.filter_query());
    }
}

/// Show one task in full.
pub fn cmd_show(service: &BoardService, id: String) {
    let task_id = resolve_or_exit(service, &id);
    let Some(t) = service.board().task(&task_id) else {
        return;
    };
    println!("ID:          {}", t.id);
    println!("Title:       {}", t.title);
    println!("State:       {}", t.state);
    println!("Priority:    {}", t.priority);
    println!("Owner:       {}", t.owner);
    println!("Created:     {}", t.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    println!("Description:");
    if t.description.is_empty() {
        println!("  -");
    } else {
        for line in t.description.lines() {
            println!("  {line}");
        }
    }
}

/// Move a task. An unknown column leaves the task where it is.
pub fn cmd_move(service: &mut BoardService, id: String, column: String) {
    let task_id = resolve_or_exit(service, &id);
    if service.move_task(&task_id, &column) {
        save_or_exit(service);
        println!("Moved task {} to {}", task_id.short(), column);
    } else {
        let current = service.board().task(&task_id).map(|t| t.state.clone()).unwrap_or_default();
        println!(
            "No column named '{}'; task {} stays in {}. Columns: {}",
            column,
            task_id.short(),
            current,
            service.board().column_names().join(", ")
        );
    }
}

/// Apply field edits to a task.
pub fn cmd_edit(
    service: &mut BoardService,
    id: String,
    title: Option<String>,
    desc: Option<String>,
    priority: Option<Priority>,
    owner: Option<String>,
) {
    let task_id = resolve_or_exit(service, &id);
    let edit = TaskEdit { title, description: desc, priority, owner };
    if edit.is_empty() {
        eprintln!("Nothing to change. Pass --title, --desc, --priority or --owner.");
        std::process::exit(1);
    }
    if service.edit_task(&task_id, edit) {
        save_or_exit(service);
        println!("Updated task {}", task_id.short());
    } else {
        println!("Task {} already has those values", task_id.short());
    }
}

/// Delete a task.
pub fn cmd_remove(service: &mut BoardService, id: String) {
    let task_id = resolve_or_exit(service, &id);
    if let Some(task) = service.remove_task(&task_id) {
        save_or_exit(service);
        println!("Deleted task {} ({})", task_id.short(), task.title);
    }
}

/// List columns in board order.
pub fn cmd_columns(service: &BoardService) {
    let board = service.board();
    println!("{:<24} {}", "Column", "Tasks");
    for col in board.columns() {
        let marker = if col.name() == board.done_column() { " (done)" } else { "" };
        println!("{:<24} {}{}", truncate(col.name(), 24), col.len(), marker);
    }
}

/// Print completion progress.
pub fn cmd_summary(service: &BoardService) {
    let summary = service.summary();
    println!("{}/{} Tasks  {}  {:.1}%", summary.completed, summary.total, progress_bar(summary, 30), summary.percent());
}

/// Print the report for an optional priority.
pub fn cmd_report(service: &BoardService, priority: Option<Priority>) {
    let report = Report::new(service.snapshot(), priority, service.board().done_column());
    let summary = report.summary();
    println!("Kanban report  (priority: {})", report::priority_filter_label(priority));
    println!("Generated {}", Local::now().format("%d/%m/%Y %H:%M"));
    println!();
    println!("Total tasks:  {}", summary.total);
    println!("Completed:    {}", summary.completed);
    println!("Progress:     {:.1}%", summary.percent());
    println!();

    let by_state = report.by_state();
    let widest = by_state.iter().map(|(_, n)| *n).max().unwrap_or(0);
    for (state, n) in &by_state {
        let bar = if widest == 0 { 0 } else { n * 30 / widest };
        println!("{:<16} {:>4} {}", truncate(state, 16), n, "█".repeat(bar.max(1)));
    }
    if !report.tasks().is_empty() {
        println!();
        let rows: Vec<&Task> = report.tasks().iter().collect();
        print_table(&rows);
    }
}

/// Write the (optionally priority-filtered) tasks as CSV.
pub fn cmd_export(service: &BoardService, output: Option<PathBuf>, priority: Option<Priority>) {
    let report = Report::new(service.snapshot(), priority, service.board().done_column());
    if report.tasks().is_empty() {
        println!("No tasks to export.");
        return;
    }
    let path = output.unwrap_or_else(|| PathBuf::from(report::export_file_name(Local::now().date_naive())));
    match report.write_csv(&path) {
        Ok(()) => println!("Exported {} task(s) to {}", report.tasks().len(), path.display()),
        Err(e) => {
            eprintln!("Failed to write CSV file: {e}");
            std::process::exit(1);
        }
    }
}

/// Copy the board document into `backup/`.
pub fn cmd_backup(service: &BoardService) {
    match service.backup() {
        Ok(path) => println!("Backup created: {}", path.display()),
        Err(e) => {
            eprintln!("Failed to create backup: {e}");
            std::process::exit(1);
        }
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

fn resolve_or_exit(service: &BoardService, identifier: &str) -> TaskId {
    match service.resolve(identifier) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Error resolving task: {e}");
            std::process::exit(1);
        }
    }
}

fn save_or_exit(service: &mut BoardService) {
    if let Err(e) = service.save() {
        eprintln!("Failed to save board: {e}");
        std::process::exit(1);
    }
}

/// Print tasks as a fixed-width table.
fn print_table(tasks: &[&Task]) {
    println!(
        "{:<9} {:<7} {:<14} {:<12} {:<11} {}",
        "ID", "Pri", "Owner", "State", "Created", "Title"
    );
    for t in tasks {
        println!(
            "{:<9} {:<7} {:<14} {:<12} {:<11} {}",
            t.id.short(),
            t.priority,
            truncate(&t.owner, 14),
            truncate(&t.state, 12),
            t.created_at.with_timezone(&Local).format("%d/%m %H:%M"),
            t.title
        );
    }
}

fn progress_bar(summary: CountSummary, width: usize) -> String {
    let filled = (summary.ratio() * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled.min(width)))
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("much longer text", 6), "much …");
    }

    #[test]
    fn test_progress_bar() {
        let bar = progress_bar(CountSummary { total: 4, completed: 1 }, 8);
        assert_eq!(bar, "[##------]");
        let empty = progress_bar(CountSummary::default(), 4);
        assert_eq!(empty, "[----]");
    }
}
