//! Report screen: completion statistics, a bar chart of tasks per state and
//! the filtered task table.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::report::{priority_filter_label, Report};
use crate::tui::colors::{self, ACCENT};

pub fn render_report(f: &mut Frame, area: Rect, report: &Report) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Stats
            Constraint::Percentage(40), // Chart
            Constraint::Min(0),         // Table
        ])
        .split(area);

    render_stats(f, chunks[0], report);
    render_chart(f, chunks[1], report);
    render_table(f, chunks[2], report);
}

fn render_stats(f: &mut Frame, area: Rect, report: &Report) {
    let summary = report.summary();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let stats = [
        ("Total", summary.total.to_string()),
        ("Completed", summary.completed.to_string()),
        ("Progress", format!("{:.0}%", summary.percent())),
        ("Priority", priority_filter_label(report.priority()).to_string()),
    ];
    for ((label, value), &cell) in stats.into_iter().zip(cells.iter()) {
        let widget = Paragraph::new(Line::from(vec![
            Span::raw(format!("{label}: ")),
            Span::styled(value, Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(widget, cell);
    }
}

fn render_chart(f: &mut Frame, area: Rect, report: &Report) {
    let counts = report.by_state();
    let bars: Vec<Bar> = counts
        .iter()
        .map(|(state, n)| {
            Bar::default()
                .value(*n as u64)
                .label(Line::from(state.clone()))
                .text_value(n.to_string())
                .style(Style::default().fg(ACCENT))
        })
        .collect();

    let slots = counts.len().max(1) as u16;
    let bar_width = (area.width.saturating_sub(2) / slots).saturating_sub(2).clamp(3, 20);
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Tasks per state"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(2)
        .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
    f.render_widget(chart, area);
}

fn render_table(f: &mut Frame, area: Rect, report: &Report) {
    let header = Row::new(vec!["Title", "State", "Priority", "Owner", "Created"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = report
        .tasks()
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.title.clone()),
                Cell::from(t.state.clone()),
                Cell::from(Span::styled(
                    t.priority.label(),
                    Style::default().fg(colors::priority_color(t.priority)),
                )),
                Cell::from(t.owner.clone()),
                Cell::from(t.created_at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(40),
        Constraint::Length(14),
        Constraint::Length(9),
        Constraint::Length(16),
        Constraint::Length(17),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Tasks ({})", report.tasks().len())),
        );
    f.render_widget(table, area);
}
