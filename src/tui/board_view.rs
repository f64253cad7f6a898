//! Kanban board interface.
//!
//! One column per board column, cards for the visible tasks, and dialogs for
//! creating, editing and deleting tasks and for naming new columns. Cards move
//! with Ctrl+Left/Right or by dragging them with the mouse onto another
//! column; releasing outside every column cancels the drag.

use std::cell::Cell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::board::CountSummary;
use crate::error::StoreError;
use crate::fields::Priority;
use crate::report::{self, Report};
use crate::service::BoardService;
use crate::task::{Task, TaskId};
use crate::tui::colors::{self, ACCENT, SLATE};
use crate::tui::enums::Mode;
use crate::tui::input::InputField;
use crate::tui::report::render_report;
use crate::tui::task_form::{TaskForm, DESCRIPTION_FIELD, PRIORITY_FIELD, TITLE_FIELD};

/// Rows taken by one card, borders included.
const CARD_HEIGHT: usize = 5;

/// A card picked up with the mouse.
#[derive(Debug, Clone)]
struct Drag {
    task: TaskId,
    from_column: usize,
    hover: Option<usize>,
}

pub struct BoardApp {
    service: BoardService,
    poll_timeout: Duration,
    mode: Mode,
    selected_column: usize,
    selected_card: usize, // index into the selected column's visible tasks
    scroll_offsets: Vec<usize>,
    status_message: String,
    filter_input: InputField,
    column_input: InputField,
    form: TaskForm,
    editing: Option<TaskId>,
    pending_delete: Option<TaskId>,
    report_priority: Option<Priority>,
    summary: CountSummary,
    changed: Rc<Cell<bool>>,
    drag: Option<Drag>,
    column_areas: Vec<Rect>,
    card_areas: Vec<(Rect, TaskId)>,
}

impl BoardApp {
    pub fn new(mut service: BoardService, poll_timeout: Duration) -> Self {
        let changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&changed);
        service.on_change(move || flag.set(true));

        let status_message = match service.take_load_issue() {
            Some(issue) => format!("Could not read board, started empty: {issue}"),
            None => String::new(),
        };
        let summary = service.summary();

        let mut app = BoardApp {
            service,
            poll_timeout,
            mode: Mode::Board,
            selected_column: 0,
            selected_card: 0,
            scroll_offsets: Vec::new(),
            status_message,
            filter_input: InputField::new(),
            column_input: InputField::new(),
            form: TaskForm::new(),
            editing: None,
            pending_delete: None,
            report_priority: None,
            summary,
            changed,
            drag: None,
            column_areas: Vec::new(),
            card_areas: Vec::new(),
        };
        app.clamp_selection();
        app
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn service(&self) -> &BoardService {
        &self.service
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Dashboard totals as of the last change notification.
    pub fn summary(&self) -> CountSummary {
        self.summary
    }

    // ----- selection -----

    fn visible_ids(&self, column: usize) -> Vec<TaskId> {
        let board = self.service.board();
        board
            .column_at(column)
            .map(|c| board.visible_tasks(c.name()).into_iter().map(|t| t.id.clone()).collect())
            .unwrap_or_default()
    }

    fn selected_task_id(&self) -> Option<TaskId> {
        self.visible_ids(self.selected_column).get(self.selected_card).cloned()
    }

    fn clamp_selection(&mut self) {
        let columns = self.service.board().column_count();
        self.scroll_offsets.resize(columns, 0);
        if self.selected_column >= columns {
            self.selected_column = columns.saturating_sub(1);
        }
        let len = self.visible_ids(self.selected_column).len();
        if len == 0 {
            self.selected_card = 0;
        } else if self.selected_card >= len {
            self.selected_card = len - 1;
        }
    }

    fn select_task(&mut self, id: &TaskId) {
        if let Some((col, _)) = self.service.board().locate(id) {
            self.selected_column = col;
            if let Some(pos) = self.visible_ids(col).iter().position(|v| v == id) {
                self.selected_card = pos;
            }
        }
        self.clamp_selection();
    }

    fn visible_count(&self) -> usize {
        let board = self.service.board();
        board.all_tasks().iter().filter(|t| board.is_visible(t)).count()
    }

    // ----- change handling -----

    /// Re-read the dashboard after a change notification; auto-save if enabled.
    fn sync_after_change(&mut self) {
        if !self.changed.replace(false) {
            return;
        }
        self.summary = self.service.summary();
        self.clamp_selection();
        if let Some(Err(e)) = self.service.autosave() {
            self.set_status_message(format!("Error saving: {e}"));
        }
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn save_now(&mut self) {
        match self.service.save() {
            Ok(()) => {
                let path = self.service.data_file().display().to_string();
                self.set_status_message(format!("Saved to {path}"));
            }
            Err(e) => self.set_status_message(format!("Error saving: {e}")),
        }
    }

    /// Write pending changes; called once the terminal has been restored.
    pub fn save_on_exit(&mut self) -> Result<(), StoreError> {
        if self.service.is_dirty() {
            self.service.save()
        } else {
            Ok(())
        }
    }

    // ----- board operations -----

    fn move_selected_card(&mut self, right: bool) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        let target_idx = if right {
            self.selected_column + 1
        } else {
            match self.selected_column.checked_sub(1) {
                Some(i) => i,
                None => return,
            }
        };
        let Some(target) = self.service.board().column_at(target_idx).map(|c| c.name().to_string()) else {
            return;
        };
        self.move_task_to(&id, &target);
    }

    fn move_task_to(&mut self, id: &TaskId, target: &str) {
        if self.service.move_task(id, target) {
            self.set_status_message(format!("Moved task to {target}"));
            self.sync_after_change();
            self.select_task(id);
        } else {
            self.set_status_message("Move cancelled".to_string());
        }
    }

    fn apply_filter(&mut self) {
        let query = self.filter_input.value.clone();
        self.service.filter(&query);
        self.clamp_selection();
    }

    fn submit_form(&mut self) {
        if !self.form.is_submittable() {
            self.set_status_message("Title is required".to_string());
            return;
        }
        match self.mode {
            Mode::NewTask => {
                let id = self.service.new_task(self.form.to_new_task());
                self.set_status_message("Task created".to_string());
                self.sync_after_change();
                self.select_task(&id);
            }
            Mode::EditTask => {
                if let Some(id) = self.editing.take() {
                    if self.service.edit_task(&id, self.form.to_edit()) {
                        self.set_status_message("Task updated".to_string());
                        self.sync_after_change();
                    } else {
                        self.set_status_message("No changes".to_string());
                    }
                }
            }
            _ => {}
        }
        self.mode = Mode::Board;
    }

    fn submit_column(&mut self) {
        let name = self.column_input.value.trim().to_string();
        self.mode = Mode::Board;
        if name.is_empty() {
            self.clear_status_message();
            return;
        }
        if self.service.create_column(&name) {
            self.clamp_selection();
            self.selected_column = self.service.board().column_count() - 1;
            self.selected_card = 0;
            self.set_status_message(format!("Added column {name}"));
        } else {
            self.set_status_message(format!("Column '{name}' already exists"));
        }
    }

    fn confirm_delete(&mut self) {
        if let Some(id) = self.pending_delete.take() {
            if let Some(task) = self.service.remove_task(&id) {
                self.set_status_message(format!("Deleted '{}'", task.title));
                self.sync_after_change();
            }
        }
        self.mode = Mode::Board;
    }

    fn open_edit(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        if let Some(task) = self.service.board().task(&id) {
            self.form = TaskForm::from_task(task);
            self.editing = Some(id);
            self.mode = Mode::EditTask;
        }
    }

    fn current_report(&self) -> Report {
        Report::new(
            self.service.snapshot(),
            self.report_priority,
            self.service.board().done_column(),
        )
    }

    fn export_report(&mut self) {
        let report = self.current_report();
        if report.tasks().is_empty() {
            self.set_status_message("No tasks to export".to_string());
            return;
        }
        let path = PathBuf::from(report::export_file_name(Local::now().date_naive()));
        match report.write_csv(&path) {
            Ok(()) => self.set_status_message(format!("Exported {} task(s) to {}", report.tasks().len(), path.display())),
            Err(e) => self.set_status_message(format!("Error exporting: {e}")),
        }
    }

    // ----- input -----

    fn handle_input(&mut self) -> io::Result<bool> {
        if !event::poll(self.poll_timeout)? {
            return Ok(false);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(self.handle_key(key)),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    /// Returns true when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        match self.mode {
            Mode::Board => return self.handle_board_key(key),
            Mode::Filter => self.handle_filter_key(key),
            Mode::NewTask | Mode::EditTask => self.handle_form_key(key),
            Mode::NewColumn => self.handle_column_key(key),
            Mode::ConfirmDelete => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.pending_delete = None;
                    self.mode = Mode::Board;
                    self.set_status_message("Delete cancelled".to_string());
                }
                _ => {}
            },
            Mode::Report => match key.code {
                KeyCode::Char('p') => self.report_priority = report::next_priority_filter(self.report_priority),
                KeyCode::Char('x') => self.export_report(),
                KeyCode::Esc | KeyCode::Char('r') | KeyCode::Char('q') => {
                    self.mode = Mode::Board;
                    self.clear_status_message();
                }
                _ => {}
            },
            Mode::Detail => match key.code {
                KeyCode::Char('e') => self.open_edit(),
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.mode = Mode::Board,
                _ => {}
            },
            Mode::Help => self.mode = Mode::Board,
        }
        false
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> bool {
        self.clear_status_message();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.service.board().filter_query().is_empty() {
                    return true;
                }
                self.filter_input.clear();
                self.apply_filter();
                self.set_status_message("Filter cleared".to_string());
            }

            // Card movement between columns (check first, before regular navigation)
            KeyCode::Left if ctrl => self.move_selected_card(false),
            KeyCode::Right if ctrl => self.move_selected_card(true),

            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right => {
                if self.selected_column + 1 < self.service.board().column_count() {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => self.selected_card = self.selected_card.saturating_sub(1),
            KeyCode::Down => {
                let len = self.visible_ids(self.selected_column).len();
                if self.selected_card + 1 < len {
                    self.selected_card += 1;
                }
            }

            KeyCode::Enter => {
                if self.selected_task_id().is_some() {
                    self.mode = Mode::Detail;
                }
            }
            KeyCode::Char('n') => {
                self.form = TaskForm::new();
                self.mode = Mode::NewTask;
            }
            KeyCode::Char('e') => self.open_edit(),
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(id) = self.selected_task_id() {
                    self.pending_delete = Some(id);
                    self.mode = Mode::ConfirmDelete;
                }
            }
            KeyCode::Char('c') => {
                self.column_input.clear();
                self.column_input.active = true;
                self.mode = Mode::NewColumn;
            }
            KeyCode::Char('/') => {
                self.filter_input.active = true;
                self.mode = Mode::Filter;
            }
            KeyCode::Char('r') => self.mode = Mode::Report,
            KeyCode::Char('s') => self.save_now(),
            KeyCode::Char('h') | KeyCode::Char('?') => self.mode = Mode::Help,
            _ => {}
        }
        false
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter_input.clear();
                self.apply_filter();
                self.mode = Mode::Board;
                self.clear_status_message();
            }
            KeyCode::Enter => {
                self.mode = Mode::Board;
                if self.filter_input.value.is_empty() {
                    self.set_status_message("Filter cleared".to_string());
                } else {
                    let shown = self.visible_count();
                    self.set_status_message(format!("Filter: '{}' ({} tasks shown)", self.filter_input.value, shown));
                }
            }
            KeyCode::Backspace => {
                self.filter_input.handle_backspace();
                self.apply_filter();
            }
            KeyCode::Left => self.filter_input.move_cursor_left(),
            KeyCode::Right => self.filter_input.move_cursor_right(),
            KeyCode::Home => self.filter_input.move_home(),
            KeyCode::End => self.filter_input.move_end(),
            KeyCode::Char(c) => {
                self.filter_input.handle_char(c);
                self.apply_filter();
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.editing = None;
                self.mode = Mode::Board;
                self.set_status_message("Cancelled".to_string());
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Left => self.form.handle_left_right(false),
            KeyCode::Right => self.form.handle_left_right(true),
            KeyCode::Backspace => self.form.handle_backspace(),
            KeyCode::Delete => self.form.handle_delete(),
            KeyCode::Char(c) => self.form.handle_char(c),
            _ => {}
        }
    }

    fn handle_column_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Board;
                self.clear_status_message();
            }
            KeyCode::Enter => self.submit_column(),
            KeyCode::Backspace => self.column_input.handle_backspace(),
            KeyCode::Left => self.column_input.move_cursor_left(),
            KeyCode::Right => self.column_input.move_cursor_right(),
            KeyCode::Home => self.column_input.move_home(),
            KeyCode::End => self.column_input.move_end(),
            KeyCode::Char(c) => self.column_input.handle_char(c),
            _ => {}
        }
    }

    fn column_under(&self, pos: Position) -> Option<usize> {
        self.column_areas.iter().position(|r| r.contains(pos))
    }

    /// Mouse drag-and-drop. Only active on the plain board.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != Mode::Board {
            return;
        }
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let hit = self.card_areas.iter().find(|(r, _)| r.contains(pos)).cloned();
                if let Some((_, id)) = hit {
                    self.select_task(&id);
                    self.drag = Some(Drag {
                        task: id,
                        from_column: self.selected_column,
                        hover: Some(self.selected_column),
                    });
                } else if let Some(col) = self.column_under(pos) {
                    self.selected_column = col;
                    self.clamp_selection();
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let hover = self.column_under(pos);
                if let Some(drag) = self.drag.as_mut() {
                    drag.hover = hover;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(drag) = self.drag.take() else {
                    return;
                };
                match self.column_under(pos) {
                    Some(col) if col == drag.from_column => {}
                    Some(col) => {
                        let target = self.service.board().column_at(col).map(|c| c.name().to_string());
                        if let Some(target) = target {
                            self.move_task_to(&drag.task, &target);
                        }
                    }
                    None => self.set_status_message("Dropped outside a column, move cancelled".to_string()),
                }
            }
            MouseEventKind::ScrollDown => {
                let len = self.visible_ids(self.selected_column).len();
                if self.selected_card + 1 < len {
                    self.selected_card += 1;
                }
            }
            MouseEventKind::ScrollUp => self.selected_card = self.selected_card.saturating_sub(1),
            _ => {}
        }
    }

    // ----- rendering -----

    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board or report
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        if self.mode == Mode::Report {
            render_report(f, chunks[1], &self.current_report());
        } else {
            self.render_board(f, chunks[1]);
        }
        self.render_status_bar(f, chunks[2]);

        if !self.mode.is_popup() {
            return;
        }
        match self.mode {
            Mode::Detail => self.render_task_detail_popup(f),
            Mode::NewTask | Mode::EditTask => self.render_form_popup(f),
            Mode::NewColumn => self.render_column_popup(f),
            Mode::ConfirmDelete => self.render_confirm_popup(f),
            _ => render_help_popup(f),
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let parts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let unsaved = if self.service.is_dirty() { " [modified]" } else { "" };
        let header = Paragraph::new(Line::from(vec![
            Span::styled("KANBAN BOARD", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{}{}", self.service.data_file().display(), unsaved),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(header, parts[0]);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(colors::PRIORITY_LOW))
            .ratio(self.summary.ratio().clamp(0.0, 1.0))
            .label(format!("{}/{} Tasks", self.summary.completed, self.summary.total));
        f.render_widget(gauge, parts[1]);
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        self.column_areas.clear();
        self.card_areas.clear();
        let count = self.service.board().column_count();
        self.scroll_offsets.resize(count, 0);
        if count == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count as u32)).collect();
        let columns_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (i, &column_area) in columns_layout.iter().enumerate() {
            self.column_areas.push(column_area);
            self.render_column(f, column_area, i);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, index: usize) {
        let board = self.service.board();
        let Some(column) = board.column_at(index) else {
            return;
        };
        let tasks = board.visible_tasks(column.name());
        let is_selected = index == self.selected_column;
        let is_drop_target = self
            .drag
            .as_ref()
            .is_some_and(|d| d.hover == Some(index) && d.from_column != index);

        let fill = colors::column_color(column);
        let border_style = if is_drop_target {
            Style::default().fg(colors::darken(fill)).add_modifier(Modifier::BOLD)
        } else if is_selected {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let count = if board.filter_query().is_empty() {
            column.len().to_string()
        } else {
            format!("{}/{}", tasks.len(), column.len())
        };
        let title = Line::from(vec![
            Span::styled(" ● ", Style::default().fg(colors::darken(fill)).bg(fill)),
            Span::styled(
                format!("{} ({}) ", column.name().to_uppercase(), count),
                Style::default().fg(SLATE).bg(fill).add_modifier(Modifier::BOLD),
            ),
        ]);

        let block = Block::default().borders(Borders::ALL).title(title).border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);

        if tasks.is_empty() {
            return;
        }

        let available_height = inner.height as usize;
        let visible_cards = (available_height / CARD_HEIGHT).max(1);
        let mut offset = self.scroll_offsets.get(index).copied().unwrap_or(0);
        if is_selected {
            if self.selected_card < offset {
                offset = self.selected_card;
            } else if self.selected_card >= offset + visible_cards {
                offset = self.selected_card + 1 - visible_cards;
            }
        }
        offset = offset.min(tasks.len() - 1);
        if let Some(slot) = self.scroll_offsets.get_mut(index) {
            *slot = offset;
        }

        let mut current_y = 0;
        let mut rendered_cards = 0;
        for (card_index, task) in tasks.iter().enumerate().skip(offset) {
            if current_y + CARD_HEIGHT > available_height {
                break;
            }
            let card_area = Rect {
                x: inner.x,
                y: inner.y + current_y as u16,
                width: inner.width,
                height: CARD_HEIGHT as u16,
            };
            let selected = is_selected && card_index == self.selected_card;
            let dragging = self.drag.as_ref().is_some_and(|d| d.task == task.id);
            render_card(f, card_area, task, selected, dragging);
            self.card_areas.push((card_area, task.id.clone()));
            current_y += CARD_HEIGHT;
            rendered_cards += 1;
        }

        if offset > 0 {
            let indicator = Paragraph::new(format!("▲ +{offset} above")).style(Style::default().fg(Color::Cyan));
            f.render_widget(indicator, Rect { height: 1, ..inner });
        }
        let remaining = tasks.len() - offset - rendered_cards;
        if remaining > 0 && inner.height > 0 {
            let indicator = Paragraph::new(format!("▼ +{remaining} below")).style(Style::default().fg(Color::Cyan));
            f.render_widget(indicator, Rect { y: inner.y + inner.height - 1, height: 1, ..inner });
        }
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if self.mode == Mode::Filter {
            format!("Filter: {} | Enter to keep, Esc to clear", self.filter_input.display_with_cursor())
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.mode == Mode::Report {
            "p: Priority filter | x: Export CSV | Esc: Back to board".to_string()
        } else {
            let query = self.service.board().filter_query();
            let filter = if query.is_empty() { String::new() } else { format!(" [Filter: {query}]") };
            format!(
                "Tasks: {}{} | n: New | e: Edit | x: Delete | c: Column | /: Filter | r: Report | h: Help",
                self.summary.total, filter
            )
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(ACCENT).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render_task_detail_popup(&self, f: &mut Frame) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        let Some(task) = self.service.board().task(&id) else {
            return;
        };
        let area = centered_rect(70, 60, f.area());
        f.render_widget(Clear, area);

        let mut lines = vec![
            Line::from(Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(format!("ID:        {}", task.id)),
            Line::from(format!("State:     {}", task.state)),
            Line::from(vec![
                Span::raw("Priority:  "),
                Span::styled(task.priority.label(), Style::default().fg(colors::priority_color(task.priority))),
            ]),
            Line::from(format!("Owner:     {}", task.owner)),
            Line::from(format!("Created:   {}", task.created_at.with_timezone(&Local).format("%d/%m/%Y %H:%M"))),
            Line::from(""),
            Line::from("Description:"),
        ];
        if task.description.is_empty() {
            lines.push(Line::from("-"));
        } else {
            lines.extend(task.description.lines().map(|l| Line::from(l.to_string())));
        }

        let popup = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Task Details (Enter to close, e to edit)")
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            )
            .wrap(Wrap { trim: false })
            .style(Style::default().bg(Color::Black));
        f.render_widget(popup, area);
    }

    fn render_form_popup(&self, f: &mut Frame) {
        let area = centered_rect(60, 50, f.area());
        f.render_widget(Clear, area);

        let label = |field: usize, text: &'static str| {
            let style = if self.form.current_field == field {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Line::from(Span::styled(text, style))
        };
        let priority = self.form.selected_priority();
        let lines = vec![
            label(TITLE_FIELD, "Title"),
            Line::from(self.form.title.display_with_cursor()),
            Line::from(""),
            label(DESCRIPTION_FIELD, "Description"),
            Line::from(self.form.description.display_with_cursor()),
            Line::from(""),
            label(PRIORITY_FIELD, "Priority"),
            Line::from(vec![
                Span::raw("◀ "),
                Span::styled(priority.label(), Style::default().fg(colors::priority_color(priority)).add_modifier(Modifier::BOLD)),
                Span::raw(" ▶"),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Tab: Next field | ←/→: Change priority | Enter: Save | Esc: Cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let popup = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.mode.title())
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(ACCENT)),
            )
            .wrap(Wrap { trim: false })
            .style(Style::default().bg(Color::Black));
        f.render_widget(popup, area);
    }

    fn render_column_popup(&self, f: &mut Frame) {
        let area = centered_rect(40, 20, f.area());
        f.render_widget(Clear, area);
        let popup = Paragraph::new(vec![
            Line::from("Column name:"),
            Line::from(self.column_input.display_with_cursor()),
            Line::from(""),
            Line::from(Span::styled("Enter: Create | Esc: Cancel", Style::default().fg(Color::DarkGray))),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Mode::NewColumn.title())
                .border_style(Style::default().fg(ACCENT)),
        )
        .style(Style::default().bg(Color::Black));
        f.render_widget(popup, area);
    }

    fn render_confirm_popup(&self, f: &mut Frame) {
        let title = self
            .pending_delete
            .as_ref()
            .and_then(|id| self.service.board().task(id))
            .map(|t| t.title.clone())
            .unwrap_or_default();
        let area = centered_rect(50, 20, f.area());
        f.render_widget(Clear, area);
        let popup = Paragraph::new(vec![
            Line::from(format!("Delete '{title}'?")),
            Line::from(""),
            Line::from(Span::styled("y: Yes | n: No", Style::default().add_modifier(Modifier::BOLD))),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Mode::ConfirmDelete.title())
                .border_style(Style::default().fg(colors::PRIORITY_HIGH)),
        )
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(Color::Black));
        f.render_widget(popup, area);
    }

    /// Main event loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
            self.sync_after_change();
        }
        Ok(())
    }
}

fn render_card(f: &mut Frame, area: Rect, task: &Task, selected: bool, dragging: bool) {
    let strip = colors::priority_color(task.priority);
    let style = if selected {
        Style::default().bg(ACCENT).fg(Color::White).add_modifier(Modifier::BOLD)
    } else if dragging {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::DIM)
    } else {
        Style::default().bg(Color::DarkGray)
    };
    let width = area.width.saturating_sub(3) as usize;
    let description = task.description.lines().next().unwrap_or("");

    let lines = vec![
        Line::from(vec![Span::styled("▌", Style::default().fg(strip)), Span::raw(clip(&task.title, width))]),
        Line::from(Span::styled(
            format!(" {}", clip(description, width)),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(format!(
            " {} · {}",
            clip(&task.owner, width.saturating_sub(14)),
            task.created_at.with_timezone(&Local).format("%d/%m %H:%M")
        )),
    ];

    let card = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(strip)))
        .style(style);
    f.render_widget(card, area);
}

fn render_help_popup(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);
    let rows = [
        ("←/→ ↑/↓", "Select column / card"),
        ("Ctrl+←/→", "Move card to the neighbouring column"),
        ("Mouse drag", "Drop a card on another column"),
        ("Enter", "Task details"),
        ("n", "New task"),
        ("e", "Edit task"),
        ("x / Del", "Delete task"),
        ("c", "New column"),
        ("/", "Filter by title or description"),
        ("r", "Report"),
        ("s", "Save now"),
        ("q / Esc", "Quit (saves changes)"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:<12}"), Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
                Span::raw(*what),
            ])
        })
        .collect();
    let popup = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help (any key to close)"))
        .style(Style::default().bg(Color::Black));
    f.render_widget(popup, area);
}

/// A rectangle of the given percentage size centred in `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = percent_of(area.width, percent_x);
    let height = percent_of(area.height, percent_y).max(5).min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// `percent` (at most 100) of `len`, computed wide.
fn percent_of(len: u16, percent: u16) -> u16 {
    let scaled = u32::from(len) * u32::from(percent.min(100)) / 100;
    u16::try_from(scaled).unwrap_or(len)
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
