//! Configuration for the `tb` binary.
//!
//! Layered with the following priority (highest first):
//! 1. CLI arguments (and their environment fallbacks)
//! 2. TOML config file (`<config dir>/taskboard/config.toml`)
//! 3. Compiled defaults
//!
//! A missing default config file is not an error. An explicit `--config` path
//! that cannot be read is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::board::{DEFAULT_COLUMNS, DONE_COLUMN};
use crate::cli::Cli;
use crate::task::DEFAULT_OWNER;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    board: BoardFileConfig,
    ui: UiFileConfig,
    log: LogFileConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    data_file: Option<PathBuf>,
    autosave: Option<bool>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BoardFileConfig {
    columns: Option<Vec<String>>,
    done_column: Option<String>,
    default_owner: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LogFileConfig {
    level: Option<String>,
    file: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Board document location.
    pub data_file: PathBuf,
    /// Save after every change instead of only on exit.
    pub autosave: bool,
    /// Columns created when a board is opened, in order.
    pub columns: Vec<String>,
    /// Column counted as completed.
    pub done_column: String,
    /// Owner given to new tasks.
    pub default_owner: String,
    /// Event poll interval of the board view.
    pub poll_timeout: Duration,
    /// `tracing` filter directive.
    pub log_level: String,
    /// Log destination; the TUI owns stdout.
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            autosave: false,
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            done_column: DONE_COLUMN.to_string(),
            default_owner: DEFAULT_OWNER.to_string(),
            poll_timeout: Duration::from_millis(50),
            log_level: "info".to_string(),
            log_file: std::env::temp_dir().join("taskboard.log"),
        }
    }
}

impl Config {
    /// Merge CLI arguments with the config file and defaults.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, file))
    }

    fn resolve(cli: &Cli, file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            data_file: cli
                .db
                .clone()
                .or(file.storage.data_file.map(|p| expand_home(&p)))
                .unwrap_or(defaults.data_file),
            autosave: cli.autosave || file.storage.autosave.unwrap_or(defaults.autosave),
            columns: file
                .board
                .columns
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.columns),
            done_column: file.board.done_column.unwrap_or(defaults.done_column),
            default_owner: file.board.default_owner.unwrap_or(defaults.default_owner),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            log_level: cli
                .log_level
                .clone()
                .or(file.log.level)
                .unwrap_or(defaults.log_level),
            log_file: cli
                .log_file
                .clone()
                .or(file.log.file.map(|p| expand_home(&p)))
                .unwrap_or(defaults.log_file),
        }
    }
}

/// `~/.taskboard/board.json`, or `./board.json` without a home directory.
fn default_data_file() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".taskboard"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("board.json")
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("taskboard").join("config.toml"))
}

fn load_config_file(explicit: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(ConfigFile::default()),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(toml::from_str(&text)?),
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(source) => Err(ConfigError::ReadFile { path, source }),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
