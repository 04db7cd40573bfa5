mod app;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use app::{
    default_master_path, format_opt, format_sales, format_stamp, truncate, AppState, FileStatus,
    MasterRow,
};

const POLL_INTERVAL: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> io::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(Into::into)
        .unwrap_or_else(|| default_master_path(|k| std::env::var(k).ok()));

    let mut app = AppState::new(path);
    app.reload();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut table_state = TableState::default();
    table_state.select((!app.rows.is_empty()).then_some(0));

    let result = run_loop(&mut terminal, &mut app, &mut table_state);

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    state: &mut TableState,
) -> io::Result<()> {
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| render(f, app, state))?;

        let timeout = POLL_INTERVAL
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            app.reload();
                            clamp_selection(app, state);
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            let max = app.rows.len().saturating_sub(1);
                            let next = state.selected().map_or(0, |i| (i + 1).min(max));
                            state.select(Some(next));
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            let prev = state.selected().map_or(0, |i| i.saturating_sub(1));
                            state.select(Some(prev));
                        }
                        KeyCode::Home | KeyCode::Char('g') => state.select(Some(0)),
                        KeyCode::End | KeyCode::Char('G') => {
                            state.select(Some(app.rows.len().saturating_sub(1)));
                        }
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= POLL_INTERVAL {
            if app.reload_if_changed() {
                clamp_selection(app, state);
            }
            last_tick = std::time::Instant::now();
        }
    }
}

fn clamp_selection(app: &AppState, state: &mut TableState) {
    if app.rows.is_empty() {
        state.select(None);
    } else {
        let max = app.rows.len() - 1;
        state.select(Some(state.selected().map_or(0, |i| i.min(max))));
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, state: &mut TableState) {
    let area = f.area();

    // Outer vertical split: header | body | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);

    // Horizontal split: ranking (65%) | detail (35%)
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    render_table(f, app, state, halves[0]);
    render_detail(f, app.selected_row(state.selected()), halves[1]);
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        FileStatus::Loaded => ("● loaded".to_string(), Color::Green),
        FileStatus::Missing => ("◌ no master file yet".to_string(), Color::Yellow),
        FileStatus::Error(e) => (format!("✗ {}", truncate(e, 50)), Color::Red),
    };

    let spans = vec![
        Span::styled(
            " Skin Momentum  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(format!("{} items", app.rows.len()), Style::default().fg(Color::White)),
        Span::raw("  │  "),
        Span::styled(
            format!("updated {}", app.newest_update().map_or("—".to_string(), format_stamp)),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::styled(
            truncate(&app.path.display().to_string(), 60),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let header_cells = ["#", "Item", "Price", "Sales7d", "24h/7d", "7d/30d", "Score"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(&r.name, 40)),
                Cell::from(format!("{} {}", r.price, r.currency)),
                Cell::from(format_sales(r.sales_this_week)).style(Style::default().fg(Color::Cyan)),
                Cell::from(format_opt(r.growth_short, 2)).style(Style::default().fg(growth_color(r.growth_short))),
                Cell::from(format_opt(r.growth_medium, 2)).style(Style::default().fg(growth_color(r.growth_medium))),
                Cell::from(format!("{:.3}", r.bullish_score)).style(Style::default().add_modifier(Modifier::BOLD)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(16),
            Constraint::Length(13),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " RANKING ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    f.render_stateful_widget(table, area, state);
}

fn render_detail(f: &mut Frame, row: Option<&MasterRow>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " DETAIL ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let Some(r) = row else {
        let empty = Paragraph::new(Span::styled("nothing selected", Style::default().fg(Color::DarkGray)))
            .block(block);
        f.render_widget(empty, area);
        return;
    };

    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<12}"), Style::default().fg(Color::Yellow)),
            Span::raw(value),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(r.name.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::raw(""),
        field("Price", format!("{} {}", r.price, r.currency)),
        field("Sales 7d", format_sales(r.sales_this_week)),
        field("24h avg", format_opt(r.avg_24h, 2)),
        field("7d avg", format_opt(r.avg_7d, 2)),
        field("30d avg", format_opt(r.avg_30d, 2)),
        field("24h/7d", format_opt(r.growth_short, 3)),
        field("7d/30d", format_opt(r.growth_medium, 3)),
        field("Score", format!("{:.3}", r.bullish_score)),
        field("Updated", format_stamp(&r.last_updated)),
        Line::raw(""),
        field("Skinport", r.skinport_url.clone()),
        field("Steam", r.steam_url.clone()),
    ];

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("reload  "),
        Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
        Span::raw("select  "),
        Span::styled("auto-reload on file change", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line).style(Style::default().fg(Color::White)), area);
}

fn growth_color(v: Option<f64>) -> Color {
    match v {
        Some(g) if g > 1.0 => Color::Green,
        Some(g) if g < 1.0 => Color::Red,
        Some(_) => Color::White,
        None => Color::DarkGray,
    }
}
