//! Board TUI entry point and terminal setup.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::{error, info};

use crate::service::BoardService;
use crate::tui::board_view::BoardApp;

/// Initialise and run the board view, saving pending changes on exit.
/// A failed exit save is reported on stderr once the terminal is restored.
pub fn run_board_tui(service: BoardService, poll_timeout: Duration) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = BoardApp::new(service, poll_timeout);
    let result = app.run(&mut terminal);
    let restored = restore_terminal(&mut terminal);

    shut_down(&mut app, result, restored)
}

/// Every step runs even if an earlier one fails; the first error is kept.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture);
    let cursor = terminal.show_cursor();
    raw.and(screen).and(cursor)
}

/// Save pending changes whatever happened to the event loop or the terminal,
/// then hand back the first of those errors.
fn shut_down(app: &mut BoardApp, result: io::Result<()>, restored: io::Result<()>) -> io::Result<()> {
    match app.save_on_exit() {
        Ok(()) => info!("board view closed"),
        Err(e) => {
            error!(error = %e, "save on exit failed");
            eprintln!("Failed to save board: {e}");
        }
    }
    result.and(restored)
}
