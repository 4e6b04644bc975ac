use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Row, Table, TableState,
};
use rusqlite::Connection;

use football_hub::config::Config;
use football_hub::export;
use football_hub::persist;
use football_hub::sections::{self, TOP_FEES, format_avg, format_money};
use football_hub::state::{AppState, Section, section_label};
use football_hub::store;
use football_hub::telemetry;

const HOME_WIN_COLOR: Color = Color::Rgb(0x6d, 0xaa, 0x2c);
const AWAY_WIN_COLOR: Color = Color::Rgb(0xff, 0x4e, 0x42);
const DRAW_COLOR: Color = Color::Rgb(0x33, 0x66, 0xcc);

struct App {
    state: AppState,
    conn: Connection,
    should_quit: bool,
}

impl App {
    fn new(conn: Connection, top_limit: usize) -> Self {
        let mut state = AppState::new();
        state.top_limit = top_limit;
        persist::load_into_state(&mut state);
        state.push_log(format!("[INFO] {} ready", section_label(state.section)));
        Self {
            state,
            conn,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(ch @ '1'..='6') => {
                let idx = (ch as u8 - b'1') as usize;
                if let Some(section) = Section::from_index(idx) {
                    self.state.set_section(section);
                }
            }
            KeyCode::Tab => self.state.next_section(),
            KeyCode::BackTab => self.state.prev_section(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.state.needs_reload = true;
                self.state.push_log("[INFO] Reload requested");
            }
            KeyCode::Char('x') | KeyCode::Char('X') => self.export_current(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ if self.state.section == Section::Players => self.on_players_key(key),
            _ => {}
        }
    }

    fn on_players_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('f') => self.state.cycle_filter_column(),
            KeyCode::Char('h') | KeyCode::Left => self.state.filter_cursor_prev(),
            KeyCode::Char('l') | KeyCode::Right => self.state.filter_cursor_next(),
            KeyCode::Char(' ') => self.state.toggle_filter_value(),
            KeyCode::Char('c') => self.state.clear_filters(),
            _ => {}
        }
    }

    fn reload_if_needed(&mut self) {
        if !self.state.needs_reload {
            return;
        }
        let started = Instant::now();
        match self.state.refresh_section(&self.conn) {
            Ok(()) => {
                tracing::info!(
                    section = section_label(self.state.section),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "section loaded"
                );
            }
            Err(err) => {
                tracing::error!(section = section_label(self.state.section), "load failed: {err:#}");
                self.state.push_log(format!("[WARN] Load failed: {err:#}"));
            }
        }
    }

    fn export_current(&mut self) {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let slug = section_label(self.state.section)
            .to_ascii_lowercase()
            .replace(' ', "_");
        let path = PathBuf::from(format!("football_hub_{slug}_{stamp}.xlsx"));
        match export::export_section(&path, &self.state) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} rows to {}",
                report.rows,
                path.display()
            )),
            Err(err) => {
                tracing::error!("export failed: {err:#}");
                self.state.push_log(format!("[WARN] Export failed: {err:#}"));
            }
        }
    }
}

fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init_file_subscriber(&config.log_filter, config.log_file.as_deref())?;

    let conn = store::open_existing(&config.db_path)?;
    store::check_connection(&conn).with_context(|| {
        format!("failed to connect to database {}", config.db_path.display())
    })?;
    tracing::info!(db = %config.db_path.display(), "dashboard starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(conn, config.top_limit);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    persist::save_from_state(&app.state);
    if let Err(err) = &res {
        tracing::error!("dashboard exited with error: {err}");
    }
    res.context("dashboard loop failed")
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        app.reload_if_needed();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(1)])
        .split(chunks[1]);

    render_sidebar(frame, body[0], &app.state);
    match app.state.section {
        Section::Players => render_players(frame, body[1], &app.state),
        Section::TopScorers => render_top_scorers(frame, body[1], &app.state),
        Section::Injuries => render_injuries(frame, body[1], &app.state),
        Section::Transfers => render_transfers(frame, body[1], &app.state),
        Section::ClubAnalysis => render_club_analysis(frame, body[1], &app.state),
        Section::MatchStats => render_match_stats(frame, body[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> String {
    let line1 = format!(
        "  (o)  FOOTBALL ANALYTICS HUB | {}",
        section_label(state.section)
    );
    let line2 = " /   \\".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    match state.section {
        Section::Players => {
            "1-6 Section | Tab Next | j/k Move | f Filter column | h/l Option | Space Toggle | c Clear | x Export | ? Help | q Quit".to_string()
        }
        Section::ClubAnalysis => {
            "1-6 Section | Tab Next | j/k Club | r Reload | x Export | ? Help | q Quit".to_string()
        }
        _ => "1-6 Section | Tab Next | j/k Move | r Reload | x Export | ? Help | q Quit".to_string(),
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<Line> = Section::ALL
        .iter()
        .enumerate()
        .map(|(idx, section)| {
            let text = format!("{} {}", idx + 1, section_label(*section));
            if *section == state.section {
                Line::styled(
                    format!("> {text}"),
                    Style::default().fg(Color::White).bg(Color::DarkGray),
                )
            } else {
                Line::raw(format!("  {text}"))
            }
        })
        .collect();
    let nav = Paragraph::new(lines).block(Block::default().title("Navigation").borders(Borders::ALL));
    frame.render_widget(nav, area);
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let options = state.filter_options();
    let selected_set = state.player_filters.set(state.filter_column);
    let mut spans = vec![Span::styled(
        format!("{}: ", state.filter_column.label()),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if options.is_empty() {
        spans.push(Span::styled("(no values)", Style::default().fg(Color::DarkGray)));
    }
    for (idx, value) in options.iter().enumerate() {
        let mark = if selected_set.contains(value) { "[x]" } else { "[ ]" };
        let mut style = Style::default();
        if idx == state.filter_cursor {
            style = style.fg(Color::Black).bg(Color::Yellow);
        }
        spans.push(Span::styled(format!("{mark} {value}"), style));
        spans.push(Span::raw("  "));
    }
    let filters = Paragraph::new(Line::from(spans))
        .block(Block::default().title("Player Filters").borders(Borders::ALL));
    frame.render_widget(filters, parts[0]);

    let visible = state.visible_players();
    let total = Paragraph::new(format!("Total Players: {}", visible.len()))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(total, parts[1]);

    let rows = visible.iter().map(|p| {
        Row::new(vec![
            p.name.clone(),
            p.club.clone().unwrap_or_else(|| "-".to_string()),
            p.nationality.clone().unwrap_or_else(|| "-".to_string()),
            p.position.clone().unwrap_or_else(|| "-".to_string()),
            format_money(p.market_value),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Min(18),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(16),
        ],
    )
    .header(header_row(&[
        "Player Name",
        "Club",
        "Nationality",
        "Position",
        "Market Value (€)",
    ]))
    .block(Block::default().title("All Players").borders(Borders::ALL))
    .highlight_style(selected_style());
    render_table(frame, parts[2], table, state.selected, visible.len());
}

fn render_top_scorers(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let rows = state
        .scorers
        .iter()
        .map(|s| Row::new(vec![s.player.clone(), s.goals.to_string()]));
    let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(6)])
        .header(header_row(&["Player", "Goals"]))
        .block(Block::default().title("Top Goal Scorers").borders(Borders::ALL))
        .highlight_style(selected_style());
    render_table(frame, cols[0], table, state.selected, state.scorers.len());

    let bars: Vec<(String, u64, String)> = state
        .scorers
        .iter()
        .map(|s| (s.player.clone(), s.goals.max(0) as u64, s.goals.to_string()))
        .collect();
    let title = format!("Top {} Goal Scorers", state.top_limit);
    render_hbar_chart(frame, cols[1], &title, &bars, Color::Green);
}

fn render_injuries(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let rows = state
        .injuries
        .iter()
        .map(|i| Row::new(vec![i.player.clone(), i.injuries.to_string()]));
    let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(9)])
        .header(header_row(&["Player", "Injuries"]))
        .block(Block::default().title("Most Injured Players").borders(Borders::ALL))
        .highlight_style(selected_style());
    render_table(frame, cols[0], table, state.selected, state.injuries.len());

    let bars: Vec<(String, u64, String)> = state
        .injuries
        .iter()
        .map(|i| (i.player.clone(), i.injuries.max(0) as u64, i.injuries.to_string()))
        .collect();
    let title = format!("Top {} Most Injury-Prone Players", state.top_limit);
    render_hbar_chart(frame, cols[1], &title, &bars, Color::LightRed);
}

fn render_transfers(frame: &mut Frame, area: Rect, state: &AppState) {
    let top = sections::top_fees(&state.transfers, TOP_FEES);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(top.len() as u16 + 2),
        ])
        .split(area);

    let total = Paragraph::new(format!("Total Transfers: {}", state.transfers.len()))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(total, parts[0]);

    let rows = state.transfers.iter().map(|t| {
        Row::new(vec![
            t.player.clone(),
            t.from_club.clone(),
            t.to_club.clone(),
            format_money(t.fee),
            t.date.clone(),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Min(18),
            Constraint::Min(18),
            Constraint::Length(16),
            Constraint::Length(12),
        ],
    )
    .header(header_row(&["Player", "From Club", "To Club", "Fee (€)", "Date"]))
    .block(Block::default().title("Transfer History").borders(Borders::ALL))
    .highlight_style(selected_style());
    render_table(frame, parts[1], table, state.selected, state.transfers.len());

    let bars: Vec<(String, u64, String)> = top
        .iter()
        .map(|t| {
            let fee = t.fee.unwrap_or_default();
            (t.player.clone(), fee.max(0) as u64, format_money(t.fee))
        })
        .collect();
    render_hbar_chart(frame, parts[2], "Top 5 Largest Transfers", &bars, Color::Blue);
}

fn render_club_analysis(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(30)])
        .split(area);

    let lines: Vec<Line> = state
        .clubs
        .iter()
        .enumerate()
        .map(|(idx, club)| {
            if idx == state.club_selected {
                Line::styled(format!("> {}", club.club_name), selected_style())
            } else {
                Line::raw(format!("  {}", club.club_name))
            }
        })
        .collect();
    let offset = state.club_selected.saturating_sub(cols[0].height.saturating_sub(3) as usize);
    let list = Paragraph::new(lines)
        .scroll((offset as u16, 0))
        .block(Block::default().title("Select Club").borders(Borders::ALL));
    frame.render_widget(list, cols[0]);

    let Some(analysis) = state.club_analysis.as_ref() else {
        let empty = Paragraph::new("No clubs in the database")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Club Analysis").borders(Borders::ALL));
        frame.render_widget(empty, cols[1]);
        return;
    };

    if !analysis.has_matches() {
        let empty = Paragraph::new("No match data available for this club.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title(analysis.club_name.clone()).borders(Borders::ALL));
        frame.render_widget(empty, cols[1]);
        return;
    }

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(5)])
        .split(cols[1]);

    let r = &analysis.record;
    let metrics = [
        format!(
            "Matches Played: {:<6} Wins: {:<6} Draws: {}",
            r.played, r.wins, r.draws
        ),
        format!(
            "Losses: {:<14} Goals Scored: {:<4} Goals Conceded: {}",
            r.losses, r.goals_for, r.goals_against
        ),
        format!(
            "Avg Goals per Match: {}   Goal Difference: {:+}",
            format_avg(r.avg_goals_for),
            r.goal_difference()
        ),
    ]
    .join("\n");
    let panel = Paragraph::new(metrics)
        .block(Block::default().title(analysis.club_name.clone()).borders(Borders::ALL));
    frame.render_widget(panel, right[0]);

    let colors = [HOME_WIN_COLOR, DRAW_COLOR, AWAY_WIN_COLOR];
    let bars: Vec<(String, u64, Color)> = r
        .outcome_slices()
        .iter()
        .zip(colors)
        .map(|((label, n), color)| (label.to_string(), *n, color))
        .collect();
    let title = format!("{} - Win/Draw/Loss", analysis.club_name);
    render_outcome_chart(frame, right[1], &title, &bars, r.played);
}

fn render_match_stats(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(league) = state.league.as_ref() else {
        let empty = Paragraph::new("Loading match statistics...")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5)])
        .split(area);

    let metrics = [
        format!(
            "Total Matches: {:<8} Total Goals: {:<8} Avg Goals/Match: {}",
            league.total_matches,
            league.total_goals,
            format_avg(league.avg_goals_per_match)
        ),
        format!(
            "Home Wins: {:<12} Away Wins: {:<10} Draws: {}",
            league.home_wins, league.away_wins, league.draws
        ),
    ]
    .join("\n");
    let panel = Paragraph::new(metrics)
        .block(Block::default().title("Match Statistics Overview").borders(Borders::ALL));
    frame.render_widget(panel, rows[0]);

    let colors = [HOME_WIN_COLOR, AWAY_WIN_COLOR, DRAW_COLOR];
    let bars: Vec<(String, u64, Color)> = league
        .outcome_bars()
        .iter()
        .zip(colors)
        .map(|((label, n), color)| (label.to_string(), *n, color))
        .collect();
    render_outcome_chart(
        frame,
        rows[1],
        "Match Outcomes Distribution",
        &bars,
        league.total_matches,
    );
}

fn header_row(cols: &[&str]) -> Row<'static> {
    Row::new(cols.iter().map(|c| c.to_string()).collect::<Vec<_>>())
        .style(Style::default().add_modifier(Modifier::BOLD))
}

fn selected_style() -> Style {
    Style::default().fg(Color::White).bg(Color::DarkGray)
}

fn render_table(frame: &mut Frame, area: Rect, table: Table, selected: usize, total: usize) {
    let mut table_state = TableState::default();
    if total > 0 {
        table_state.select(Some(selected.min(total - 1)));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_hbar_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: &[(String, u64, String)],
    color: Color,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if items.is_empty() {
        let empty = Paragraph::new("No data")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let bars: Vec<Bar> = items
        .iter()
        .map(|(label, value, text)| {
            Bar::default()
                .label(Line::from(label.clone()))
                .value(*value)
                .text_value(text.clone())
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0);
    frame.render_widget(chart, area);
}

fn render_outcome_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: &[(String, u64, Color)],
    total: u64,
) {
    let bars: Vec<Bar> = items
        .iter()
        .map(|(label, value, color)| {
            let share = if total > 0 {
                *value as f64 * 100.0 / total as f64
            } else {
                0.0
            };
            Bar::default()
                .label(Line::from(label.clone()))
                .value(*value)
                .text_value(format!("{value} ({share:.0}%)"))
                .style(Style::default().fg(*color))
                .value_style(Style::default().fg(Color::Black).bg(*color))
        })
        .collect();

    let bar_width = (area.width.saturating_sub(2) / 3).saturating_sub(2).clamp(3, 24);
    let chart = BarChart::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(2);
    frame.render_widget(chart, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Football Analytics Hub - Help",
        "",
        "Global:",
        "  1-6          Jump to section",
        "  Tab / S-Tab  Next / previous section",
        "  j/k or ↑/↓   Move selection",
        "  r            Reload section",
        "  x            Export section to .xlsx",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Players:",
        "  f            Cycle filter column",
        "  h/l or ←/→   Move filter cursor",
        "  Space        Toggle highlighted value",
        "  c            Clear filters",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
