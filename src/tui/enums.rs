//! Enumerations for TUI state management.

/// What the board view is currently doing with keyboard input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Board,
    Filter,
    Detail,
    NewTask,
    EditTask,
    NewColumn,
    ConfirmDelete,
    Report,
    Help,
}

impl Mode {
    /// Modes drawn as a popup over the board.
    pub fn is_popup(self) -> bool {
        matches!(
            self,
            Mode::Detail | Mode::NewTask | Mode::EditTask | Mode::NewColumn | Mode::ConfirmDelete | Mode::Help
        )
    }

    pub fn title(self) -> &'static str {
        match self {
            Mode::Board => "Board",
            Mode::Filter => "Filter",
            Mode::Detail => "Task Details",
            Mode::NewTask => "New Task",
            Mode::EditTask => "Edit Task",
            Mode::NewColumn => "New Column",
            Mode::ConfirmDelete => "Confirm Delete",
            Mode::Report => "Report",
            Mode::Help => "Help",
        }
    }
}
