//! # tb - Kanban board for the terminal
//!
//! A single-user kanban board kept in one local JSON document. Tasks live in
//! ordered columns (`Pending`, `InProgress`, `Done` by default) and move
//! between them from the command line or from the interactive board view.
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the board view
//! tb
//!
//! # Add a task via CLI
//! tb add "Write release notes" --priority high --desc "Cover the new export"
//!
//! # Move it along
//! tb move "Write release notes" InProgress
//!
//! # Completion at a glance
//! tb summary
//! ```
//!
//! ## Board View
//!
//! Arrow keys select columns and cards, Ctrl+Left/Right moves the selected
//! card, and cards can be dragged onto another column with the mouse. `n`,
//! `e` and `x` create, edit and delete tasks; `c` adds a column; `/` filters
//! by title or description; `r` opens the report. Changes are saved on exit,
//! or after every change with `--autosave`.
//!
//! ## Storage
//!
//! The board is stored in `~/.taskboard/board.json` unless `--db` or the
//! config file says otherwise. Settings are read from
//! `<config dir>/taskboard/config.toml`; logs go to a file because the board
//! view owns the terminal.

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

pub mod board;
pub mod cli;
pub mod cmd;
pub mod column;
pub mod config;
pub mod error;
pub mod fields;
pub mod notify;
pub mod report;
pub mod service;
pub mod store;
pub mod task;
pub mod tui {
    pub mod board_view;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod report;
    pub mod run;
    pub mod task_form;
}

use cli::Cli;
use cmd::*;
use config::Config;
use service::BoardService;

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Completions don't need a board
    if let Some(Commands::Completions { shell }) = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let _guard = init_logging(&config.log_level, &config.log_file);
    info!(data_file = %config.data_file.display(), "starting taskboard");

    let mut service = BoardService::open(&config);

    let command = cli.command.unwrap_or(Commands::Ui);
    if !matches!(command, Commands::Ui) {
        // The board view shows this in its status bar instead.
        if let Some(issue) = service.take_load_issue() {
            eprintln!("Warning: could not read board, starting empty: {issue}");
        }
    }

    match command {
        Commands::Ui => cmd_ui(service, &config),

        Commands::Add { title, desc, priority, owner, column } =>
            cmd_add(&mut service, title, desc, priority, owner, column),

        Commands::List { column, filter } => cmd_list(&mut service, column, filter),

        Commands::Show { id } => cmd_show(&service, id),

        Commands::Move { id, column } => cmd_move(&mut service, id, column),

        Commands::Edit { id, title, desc, priority, owner } =>
            cmd_edit(&mut service, id, title, desc, priority, owner),

        Commands::Remove { id } => cmd_remove(&mut service, id),

        Commands::Columns => cmd_columns(&service),

        Commands::Summary => cmd_summary(&service),

        Commands::Report { priority } => cmd_report(&service, priority),

        Commands::Export { output, priority } => cmd_export(&service, output, priority),

        Commands::Backup => cmd_backup(&service),

        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}

/// Initialise file-based logging.
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// must live until exit so buffered lines are flushed.
fn init_logging(level: &str, log_path: &Path) -> Option<WorkerGuard> {
    let log_dir = match log_path.parent()? {
        dir if dir.as_os_str().is_empty() => Path::new("."),
        dir => dir,
    };
    let file_name = log_path.file_name()?.to_str()?;
    std::fs::create_dir_all(log_dir).ok()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
