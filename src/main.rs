use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use xg_terminal::chart::{chart_view, chart_widget, phase_note};
use xg_terminal::competitions::CompetitionMap;
use xg_terminal::event_store::EventStore;
use xg_terminal::match_fetch::{analyze_match, EventSource};
use xg_terminal::state::{AppState, MatchAnalysis, Screen};

struct App {
    state: AppState,
    source: EventSource,
    store: EventStore,
    should_quit: bool,
}

impl App {
    fn new(source: EventSource, competitions: CompetitionMap) -> Self {
        Self {
            state: AppState::new(competitions),
            source,
            store: EventStore::new(),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter | KeyCode::Char('d') => match self.state.screen {
                Screen::Competitions => self.state.enter_matches(),
                Screen::Matches => self.run_analysis(),
                Screen::Chart => {}
            },
            KeyCode::Char('r') => {
                if self.state.screen == Screen::Chart {
                    self.run_analysis();
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.back(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    /// The whole analysis request runs inline: the blocking load is the only
    /// suspension point, and the chart screen always ends up in an explicit
    /// success or failure state.
    fn run_analysis(&mut self) {
        let Some(match_id) = self.state.selected_match_id() else {
            self.state.push_log("[INFO] No match selected");
            return;
        };

        self.state
            .push_log(format!("[INFO] Loading events for match {match_id}"));
        match analyze_match(&self.source, &self.store, &match_id) {
            Ok(analysis) => {
                for warning in &analysis.series.warnings {
                    self.state.push_log(warning.clone());
                }
                self.state.push_log(format!(
                    "[INFO] Series built for {} ({} teams, through minute {})",
                    match_id,
                    analysis.series.teams.len(),
                    analysis.series.max_minute
                ));
                self.state.analysis = Some(analysis);
                self.state.analysis_error = None;
                self.state.screen = Screen::Chart;
            }
            Err(err) => {
                self.state
                    .push_log(format!("[WARN] Match analysis failed: {err}"));
                self.state.analysis = None;
                self.state.analysis_error = Some(err.to_string());
                self.state.screen = Screen::Chart;
            }
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let source = EventSource::from_env();
    let (competitions, warnings) = CompetitionMap::load(source.data_dir());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(source, competitions);
    for warning in warnings {
        app.state.push_log(warning);
    }
    let res = run_app(&mut terminal, &mut app);

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

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
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
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Competitions => render_competitions(frame, chunks[1], &app.state),
        Screen::Matches => render_matches(frame, chunks[1], &app.state),
        Screen::Chart => render_chart_screen(frame, chunks[1], &app.state),
    }

    render_console(frame, chunks[2], &app.state);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    match state.screen {
        Screen::Competitions => "XG TERMINAL | Competitions".to_string(),
        Screen::Matches => format!(
            "XG TERMINAL | Matches | Competition {}",
            state.selected_competition_id().unwrap_or_default()
        ),
        Screen::Chart => {
            let label = state
                .analysis
                .as_ref()
                .map(|analysis| state.competitions.match_label(&analysis.match_id))
                .unwrap_or_else(|| "no match".to_string());
            format!("XG TERMINAL | Chart | {label}")
        }
    }
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Competitions => {
            "Enter/d Matches | j/k/↑/↓ Move | ? Help | q Quit".to_string()
        }
        Screen::Matches => {
            "Enter/d Chart | b/Esc Back | j/k/↑/↓ Move | ? Help | q Quit".to_string()
        }
        Screen::Chart => "r Reload | b/Esc Back | ? Help | q Quit".to_string(),
    }
}

fn render_competitions(frame: &mut Frame, area: Rect, state: &AppState) {
    let competitions = state.competitions.competitions();
    if competitions.is_empty() {
        let empty = Paragraph::new("No competitions mapped; check the data directory")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let lines = list_lines(
        area,
        state.selected_competition,
        competitions.len(),
        |index| {
            let (id, matches) = &competitions[index];
            format!("Competition {id}  ({} matches)", matches.len())
        },
    );
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_matches(frame: &mut Frame, area: Rect, state: &AppState) {
    let matches = state.current_match_ids();
    if matches.is_empty() {
        let empty = Paragraph::new("No matches mapped for this competition")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let lines = list_lines(area, state.selected_match, matches.len(), |index| {
        let match_id = &matches[index];
        format!("{}  [{match_id}]", state.competitions.match_label(match_id))
    });
    frame.render_widget(Paragraph::new(lines), area);
}

fn list_lines(
    area: Rect,
    selected: usize,
    total: usize,
    label: impl Fn(usize) -> String,
) -> Vec<Line<'static>> {
    let visible = area.height as usize;
    let (start, end) = visible_range(selected, total, visible.max(1));

    (start..end)
        .map(|index| {
            let style = if index == selected {
                Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::styled(format!(" {}", label(index)), style)
        })
        .collect()
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total <= visible {
        return (0, total);
    }
    let start = selected
        .saturating_sub(visible / 2)
        .min(total - visible);
    (start, start + visible)
}

fn render_chart_screen(frame: &mut Frame, area: Rect, state: &AppState) {
    if let Some(error) = &state.analysis_error {
        let message = Paragraph::new(format!("Analysis failed: {error}"))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title("Chart"));
        frame.render_widget(message, area);
        return;
    }
    let Some(analysis) = &state.analysis else {
        let empty = Paragraph::new("No analysis loaded; pick a match first")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let view = chart_view(&analysis.series);
    let title = match phase_note(view.max_period) {
        Some(note) => format!("Goals and xG over time ({note})"),
        None => "Goals and xG over time".to_string(),
    };
    frame.render_widget(chart_widget(&view, &title), columns[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[1]);

    render_stats(frame, side[0], analysis);
    render_goals(frame, side[1], analysis);
}

fn render_stats(frame: &mut Frame, area: Rect, analysis: &MatchAnalysis) {
    let home = analysis.series.teams.first().cloned().unwrap_or_default();
    let away = analysis.series.teams.get(1).cloned().unwrap_or_default();

    let mut lines = vec![Line::styled(
        format!("{:<18} {:>7} {:>7}", "", truncate(&home, 7), truncate(&away, 7)),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for row in &analysis.stats {
        lines.push(Line::raw(format!(
            "{:<18} {:>7} {:>7}",
            row.name, row.home, row.away
        )));
    }

    let stats = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Match stats"));
    frame.render_widget(stats, area);
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        name.chars().take(max).collect()
    }
}

fn render_goals(frame: &mut Frame, area: Rect, analysis: &MatchAnalysis) {
    let lines: Vec<Line> = if analysis.goals.is_empty() {
        vec![Line::styled(
            "No goals",
            Style::default().fg(Color::DarkGray),
        )]
    } else {
        analysis
            .goals
            .iter()
            .map(|goal| Line::raw(format!("{}' {} ({})", goal.minute, goal.player, goal.team)))
            .collect()
    };

    let goals = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Goals"));
    frame.render_widget(goals, area);
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible.max(1))
        .rev()
        .map(|msg| {
            let style = if msg.starts_with("[WARN]") {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::styled(msg.clone(), style)
        })
        .collect();

    let console = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Console"));
    frame.render_widget(console, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = area.width.min(52);
    let height = area.height.min(12);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let text = "Navigate competitions and matches with j/k or the arrow\n\
        keys. Enter opens the selected competition or builds the\n\
        goals/xG chart for the selected match. The chart carries\n\
        each team's line to at least the 90-minute mark; extra\n\
        time and penalties extend the axis. r reloads, b goes\n\
        back, q quits.";
    let help = Paragraph::new(text)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Help"));

    frame.render_widget(Clear, popup);
    frame.render_widget(help, popup);
}
