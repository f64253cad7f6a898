use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed kanban board.
/// Storage defaults to ~/.taskboard/board.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "tb", version, about = "Kanban board for the terminal")]
pub struct Cli {
    /// Path to the JSON board document.
    #[arg(long, global = true, env = "TASKBOARD_DB")]
    pub db: Option<PathBuf>,

    /// Path to a TOML config file.
    #[arg(long, global = true, env = "TASKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "taskboard=trace".
    #[arg(long, global = true, env = "TASKBOARD_LOG")]
    pub log_level: Option<String>,

    /// Write logs to this file instead of the temp directory.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Save after every change in the board view.
    #[arg(long, global = true)]
    pub autosave: bool,

    /// Defaults to opening the board view.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
