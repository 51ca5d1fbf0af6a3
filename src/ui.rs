use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use crate::timer::Phase;
use crate::util::{format_solve, format_stat, format_time_ms};
use crate::{App, AppState, NamePurpose};

const SOLVE_ROWS: usize = 8;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(2)
            .constraints([
                Constraint::Length(1),  // header
                Constraint::Length(2),  // scramble
                Constraint::Min(5),     // timer / overlays
                Constraint::Length(12), // stats + solve list
                Constraint::Length(2),  // help / message
            ])
            .split(area);

        render_header(self, chunks[0], buf);
        render_scramble(self, chunks[1], buf);

        match &self.state {
            AppState::Timing => render_timer(self, chunks[2], buf),
            AppState::ConfirmClear => render_confirm_clear(self, chunks[2], buf),
            AppState::NameEntry { purpose, buffer } => {
                render_name_entry(*purpose, buffer, chunks[2], buf)
            }
        }

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[3]);
        render_stats(self, bottom[0], buf);
        render_solves(self, bottom[1], buf);

        render_help(self, chunks[4], buf);
    }
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let inspection = if app.config.use_inspection {
        "inspection on"
    } else {
        "inspection off"
    };
    let line = Line::from(vec![
        Span::styled(
            app.config.puzzle.label(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(&app.store.active().name, Style::default().fg(Color::Magenta)),
        Span::raw("  |  "),
        Span::styled(inspection, Style::default().add_modifier(Modifier::DIM)),
    ]);
    Paragraph::new(line).alignment(Alignment::Center).render(area, buf);
}

fn render_scramble(app: &App, area: Rect, buf: &mut Buffer) {
    Paragraph::new(app.scramble.as_str())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_timer(app: &App, area: Rect, buf: &mut Buffer) {
    let now = app.last_now;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let (text, style) = match app.timer.phase() {
        Phase::Running { .. } => (
            format_time_ms(app.timer.display_ms(now) as f64),
            bold.fg(Color::Green),
        ),
        Phase::ArmedHold => ("0.00".to_string(), bold.fg(Color::Cyan)),
        Phase::Inspecting { .. } => {
            let left = app.timer.inspection_secs_left(now).unwrap_or(0);
            let text = if app.timer.pending_plus_two() {
                "+2".to_string()
            } else {
                left.max(0).to_string()
            };
            // The 8 s / 12 s warning flashes yellow for half a second.
            let style = if app.timer.warning_active(now) {
                bold.fg(Color::Yellow)
            } else {
                bold.fg(Color::LightBlue)
            };
            (text, style)
        }
        Phase::Idle => {
            if app.timer.refresh_pending() {
                ("DNF".to_string(), bold.fg(Color::Red))
            } else {
                ("0.00".to_string(), bold.add_modifier(Modifier::DIM))
            }
        }
    };

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(1),
            Constraint::Percentage(40),
        ])
        .split(area);

    Paragraph::new(Span::styled(text, style))
        .alignment(Alignment::Center)
        .render(vertical[1], buf);
}

fn render_confirm_clear(app: &App, area: Rect, buf: &mut Buffer) {
    let count = app.store.active().count_of(app.config.puzzle);
    let text = format!(
        "Delete all {} {} solves in \"{}\"? (y/n)",
        count,
        app.config.puzzle.label(),
        app.store.active().name
    );
    Paragraph::new(Span::styled(
        text,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}

fn render_name_entry(purpose: NamePurpose, buffer: &str, area: Rect, buf: &mut Buffer) {
    let title = match purpose {
        NamePurpose::NewSession => "New session name",
        NamePurpose::RenameSession => "Rename session",
    };
    let text = format!("{title}: {buffer}_");
    Paragraph::new(Span::styled(
        text,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}

fn render_stats(app: &App, area: Rect, buf: &mut Buffer) {
    let stats = &app.stats;
    let rows = vec![
        ("best", format_stat(stats.simple.best)),
        ("worst", format_stat(stats.simple.worst)),
        ("mean", format_stat(stats.simple.mean)),
        ("ao5", format_stat(stats.ao5)),
        ("ao12", format_stat(stats.ao12)),
        ("best ao5", format_stat(stats.ao5_extremes.best)),
        ("worst ao5", format_stat(stats.ao5_extremes.worst)),
        ("best ao12", format_stat(stats.ao12_extremes.best)),
        ("worst ao12", format_stat(stats.ao12_extremes.worst)),
    ];

    let table_rows: Vec<Row> = rows
        .into_iter()
        .map(|(label, value)| {
            Row::new(vec![
                Cell::from(label),
                Cell::from(Span::styled(
                    value,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
            ])
        })
        .collect();

    Table::new(table_rows, &[Constraint::Length(10), Constraint::Min(8)])
        .block(Block::default().borders(Borders::ALL).title("Stats"))
        .render(area, buf);
}

fn render_solves(app: &App, area: Rect, buf: &mut Buffer) {
    let solves = app.current_solves();
    let total = solves.len();

    let rows: Vec<Row> = solves
        .iter()
        .take(SOLVE_ROWS)
        .enumerate()
        .map(|(idx, solve)| {
            let time = format_solve(solve);
            let style = if solve.is_dnf {
                Style::default().fg(Color::Red)
            } else if solve.penalty_units > 0 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("{}", total - idx)),
                Cell::from(Span::styled(time, style.add_modifier(Modifier::BOLD))),
            ])
        })
        .collect();

    let title = format!("Solves ({total})");
    Table::new(rows, &[Constraint::Length(5), Constraint::Min(8)])
        .block(Block::default().borders(Borders::ALL).title(title))
        .render(area, buf);
}

fn render_help(app: &App, area: Rect, buf: &mut Buffer) {
    let line = if let Some(message) = &app.message {
        Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            "space hold/release time | 2/3/4/5/p puzzle | i inspection | =/f/d +2/dnf/delete last | q clear | tab/n/r/w sessions | esc quit",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
    };
    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, buf);
}
