use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Row, Table};

use league_terminal::config::LeagueConfig;
use league_terminal::logging::{self, LeagueLogger};
use league_terminal::service::LeagueService;
use league_terminal::state::{
    AppState, Delta, FormField, LeagueCommand, Screen, apply_delta, status_label,
};
use league_terminal::team::MAX_TEAMS;
use league_terminal::worker;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<LeagueCommand>,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<LeagueCommand>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.form.active {
            self.on_form_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => {
                self.state.help_overlay = false;
                self.state.screen = Screen::Dashboard;
            }
            KeyCode::Char('1') => self.state.screen = Screen::Dashboard,
            KeyCode::Char('2') => self.state.screen = Screen::Fixtures,
            KeyCode::Tab => {
                self.state.screen = match self.state.screen {
                    Screen::Dashboard => Screen::Fixtures,
                    Screen::Fixtures => Screen::Dashboard,
                }
            }
            KeyCode::Char('a') => self.state.open_form(),
            KeyCode::Char('f') => {
                if self.state.can_generate() {
                    self.send(LeagueCommand::GenerateFixtures);
                } else {
                    self.state.push_log("[INFO] Add at least 2 teams before generating fixtures");
                }
            }
            KeyCode::Char('w') | KeyCode::Char('n') => {
                if self.state.can_simulate_week() {
                    let week = self.state.current_week;
                    self.send(LeagueCommand::SimulateWeek { week });
                } else if self.state.season_over() {
                    self.state.push_log("[INFO] Season is over");
                } else {
                    self.state.push_log("[INFO] Generate fixtures first");
                }
            }
            KeyCode::Char('s') => {
                if self.state.fixtures.is_empty() {
                    self.state.push_log("[INFO] Generate fixtures first");
                } else {
                    self.send(LeagueCommand::SimulateAll);
                }
            }
            KeyCode::Char('p') => self.send(LeagueCommand::RefreshStandings),
            KeyCode::Char('r') => self.send(LeagueCommand::Reset),
            KeyCode::Char('j') | KeyCode::Down => {
                let max = fixture_line_count(&self.state).saturating_sub(1) as u16;
                self.state.scroll_fixtures_down(max);
            }
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_fixtures_up(),
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.close_form(),
            KeyCode::Enter => {
                if let Some(req) = self.state.take_form_request() {
                    self.send(LeagueCommand::AddTeam(req));
                }
            }
            KeyCode::Tab | KeyCode::BackTab => self.state.form.toggle_field(),
            KeyCode::Backspace => self.state.form.backspace(),
            KeyCode::Up if self.state.form.field == FormField::Power => {
                self.state.form.nudge_power(1)
            }
            KeyCode::Down if self.state.form.field == FormField::Power => {
                self.state.form.nudge_power(-1)
            }
            KeyCode::Char(c) => self.state.form.push_char(c),
            _ => {}
        }
    }

    fn send(&mut self, cmd: LeagueCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            self.state.push_log("[WARN] League worker is not running");
        } else {
            self.state.pending += 1;
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = LeagueConfig::from_env();

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let logger_ready = logging::install(LeagueLogger::console(tx.clone(), config.log_level)).is_ok();
    let service = Arc::new(LeagueService::from_config(&config));
    worker::spawn_league_worker(service, tx, cmd_rx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(cmd_tx);
    if !logger_ready {
        app.state.push_log("[WARN] Engine log unavailable");
    }
    app.state.push_log(format!(
        "[INFO] {} playouts per title prediction{}",
        config.prediction_runs,
        config
            .seed
            .map(|s| format!(", seed {s}"))
            .unwrap_or_default()
    ));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
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
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state),
        Screen::Fixtures => render_fixtures(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let week = if state.fixtures.is_empty() {
        "-".to_string()
    } else if state.season_over() {
        format!("{}/{} done", state.fixtures.len(), state.fixtures.len())
    } else {
        format!("{}/{}", state.current_week, state.fixtures.len())
    };
    let busy = if state.busy() { " | working..." } else { "" };
    let line1 = format!(
        "  .-.  LEAGUE TERMINAL | {} | Teams {}/{} | Week {}{}",
        status_label(state.status),
        state.teams.len(),
        MAX_TEAMS,
        week,
        busy
    );
    let line2 = " (   )".to_string();
    let line3 = "  '-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    if state.form.active {
        return "Type name | Tab Switch field | ↑/↓ Power | Enter Add | Esc Cancel".to_string();
    }
    match state.screen {
        Screen::Dashboard => {
            "a Add team | f Fixtures | w Week | s All | r Reset | j/k Scroll | Tab View | ? Help | q Quit"
                .to_string()
        }
        Screen::Fixtures => "1/Esc Dashboard | j/k/↑/↓ Scroll | w Week | s All | ? Help | q Quit".to_string(),
    }
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(3)])
        .split(columns[0]);
    render_teams(frame, left[0], state);
    render_fixtures(frame, left[1], state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Min(3),
        ])
        .split(columns[1]);
    render_standings(frame, right[0], state);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(right[1]);
    render_week_results(frame, middle[0], state);
    render_predictions(frame, middle[1], state);

    render_console(frame, right[2], state);
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::styled(
        format!("Max {MAX_TEAMS} teams, power 0-100"),
        dim,
    )];

    if state.teams.is_empty() {
        lines.push(Line::styled("No teams yet (a to add)", dim));
    }
    for (i, team) in state.teams.iter().enumerate() {
        lines.push(Line::from(format!("{}. {} ({})", i + 1, team.name, team.power)));
    }

    if state.form.active {
        let active = Style::default().fg(Color::Black).bg(Color::Cyan);
        let (name_style, power_style) = match state.form.field {
            FormField::Name => (active, Style::default()),
            FormField::Power => (Style::default(), active),
        };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw("Name:  "),
            Span::styled(format!("{}_", state.form.name), name_style),
        ]));
        lines.push(Line::from(vec![
            Span::raw("Power: "),
            Span::styled(state.form.power.clone(), power_style),
        ]));
    }

    let panel = Paragraph::new(lines).block(Block::default().title("Teams").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn fixture_lines(state: &AppState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for week in &state.fixtures {
        let mut title_style = Style::default().add_modifier(Modifier::BOLD);
        if week.week == state.current_week {
            title_style = title_style.fg(Color::Yellow);
        }
        lines.push(Line::styled(format!("Week {}", week.week), title_style));
        for m in &week.matches {
            let line = match (m.home_goals, m.away_goals) {
                (Some(h), Some(a)) if m.played => {
                    format!("  {} {h} - {a} {}", m.home.name, m.away.name)
                }
                _ => format!("  {} vs {}", m.home.name, m.away.name),
            };
            lines.push(Line::from(line));
        }
    }
    lines
}

fn fixture_line_count(state: &AppState) -> usize {
    state
        .fixtures
        .iter()
        .map(|w| 1 + w.matches.len())
        .sum()
}

fn render_fixtures(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Fixtures").borders(Borders::ALL);
    if state.fixtures.is_empty() {
        let empty = Paragraph::new("No fixtures (f to generate)")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }
    let panel = Paragraph::new(fixture_lines(state))
        .scroll((state.fixtures_scroll, 0))
        .block(block);
    frame.render_widget(panel, area);
}

fn render_standings(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Standings").borders(Borders::ALL);
    if state.standings.is_empty() {
        let empty = Paragraph::new("Table appears once fixtures exist")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = state
        .standings
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Row::new(vec![
                (i + 1).to_string(),
                s.name.clone(),
                s.played.to_string(),
                s.won.to_string(),
                s.drawn.to_string(),
                s.lost.to_string(),
                s.goals_for.to_string(),
                s.goals_against.to_string(),
                format!("{:+}", s.goal_difference),
                s.points.to_string(),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(2),
        Constraint::Min(10),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Length(4),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_week_results(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = match state.results_week {
        Some(week) => format!("Week {week} results"),
        None => "Week results".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    if state.week_results.is_empty() {
        let empty = Paragraph::new("No results yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }
    let lines: Vec<Line> = state
        .week_results
        .iter()
        .map(|m| {
            Line::from(format!(
                "{} {} - {} {}",
                m.home.name,
                m.home_goals.unwrap_or(0),
                m.away_goals.unwrap_or(0),
                m.away.name
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_predictions(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Title odds").borders(Borders::ALL);
    if state.predictions.is_empty() {
        let empty = Paragraph::new("No prediction yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let bars: Vec<Bar> = state
        .standings
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let p = state.prediction_for(i).unwrap_or(0);
            Bar::default()
                .label(Line::from(row.name.clone()))
                .value(u64::from(p))
                .text_value(format!("{p}%"))
                .style(Style::default().fg(odds_color(p)))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(0)
        .max(100);
    frame.render_widget(chart, area);
}

fn odds_color(p: u8) -> Color {
    match p {
        50..=100 => Color::Green,
        20..=49 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = state.logs.len().saturating_sub(visible);
    let lines: Vec<Line> = state
        .logs
        .iter()
        .skip(skip)
        .map(|l| {
            let style = if l.contains("[WARN]") {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::styled(l.clone(), style)
        })
        .collect();
    let panel = Paragraph::new(lines).block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "League Terminal - Help",
        "",
        "League:",
        "  a            Add team (name, power 0-100)",
        "  f            Generate fixtures (new season)",
        "  w / n        Simulate next week",
        "  s            Simulate all remaining weeks",
        "  p            Refresh standings and title odds",
        "  r            Reset league",
        "",
        "View:",
        "  Tab / 1 / 2  Dashboard / fixtures",
        "  j/k or ↑/↓   Scroll fixtures",
        "  ?            Toggle help",
        "  q            Quit",
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
