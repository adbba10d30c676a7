//! Watch command implementation - Interactive TUI viewer.

// Glyph-to-index conversions stay well inside u32
#![allow(clippy::cast_possible_truncation)]

use super::output::describe_event;
use super::{CliError, load_config};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mayhem::Simulation;
use mayhem::game::{LifeState, PowerUpKind};
use mayhem::render::{EMPTY, FOOD, OBSTACLE, board_rows, head_glyph};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::collections::VecDeque;
use std::io::stdout;
use std::path::Path;
use std::time::{Duration, Instant};

/// Events kept in the side panel.
const EVENT_HISTORY: usize = 12;

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the config is invalid or the TUI fails.
pub(crate) fn execute(
    seed: Option<u64>,
    speed: Option<u8>,
    fps: u32,
    config: Option<&Path>,
) -> Result<(), CliError> {
    let (config, seed) = load_config(config, seed, speed)?;
    let sim = Simulation::new(seed, &config)?;
    run_tui(App::new(sim, fps.max(1)))
}

/// App state for the TUI.
struct App {
    sim: Simulation,
    paused: bool,
    frame_delay: Duration,
    last_frame: Instant,
    recent: VecDeque<String>,
}

impl App {
    fn new(sim: Simulation, fps: u32) -> Self {
        Self {
            sim,
            paused: false,
            frame_delay: Duration::from_secs(1) / fps,
            last_frame: Instant::now(),
            recent: VecDeque::with_capacity(EVENT_HISTORY),
        }
    }

    fn step(&mut self) {
        let events = self.sim.frame();
        let frame = self.sim.frame_count();
        for event in &events {
            if self.recent.len() == EVENT_HISTORY {
                self.recent.pop_back();
            }
            self.recent
                .push_front(format!("{frame:>5} {}", describe_event(event)));
        }
        self.last_frame = Instant::now();
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn faster(&mut self) {
        self.sim.set_speed(self.sim.speed().faster());
    }

    fn slower(&mut self) {
        self.sim.set_speed(self.sim.speed().slower());
    }

    fn should_auto_step(&self) -> bool {
        !self.paused && self.last_frame.elapsed() >= self.frame_delay
    }
}

fn run_tui(mut app: App) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<(), CliError> {
    loop {
        terminal
            .draw(|f| ui(f, app))
            .map_err(|e| CliError::new(e.to_string()))?;

        if app.should_auto_step() {
            app.step();
        }

        // Handle input with timeout
        if event::poll(Duration::from_millis(10)).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Right | KeyCode::Char('l') => {
                    app.paused = true;
                    app.step();
                }
                KeyCode::Char('+' | '=') => app.faster(),
                KeyCode::Char('-') => app.slower(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(54), Constraint::Min(30)])
        .split(chunks[1]);

    render_board(f, main_chunks[0], app);

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(20), Constraint::Min(5)])
        .split(main_chunks[1]);

    render_scores(f, side_chunks[0], app);
    render_events(f, side_chunks[1], app);

    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let status = if app.paused { "PAUSED" } else { "RUNNING" };
    let title = format!(
        " Mayhem | Seed {} | Frame {} | Tick {} | {} | Speed: x{} ",
        app.sim.seed(),
        app.sim.frame_count(),
        app.sim.tick_count(),
        status,
        app.sim.speed().get()
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_board(f: &mut Frame, area: Rect, app: &App) {
    let world = app.sim.world();
    let flashing: Vec<bool> = world.agents.iter().map(|a| a.flash > 0).collect();

    let lines: Vec<Line> = board_rows(world)
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|ch| Span::styled(ch.to_string(), glyph_style(ch, &flashing)))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let board = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Arena "));

    f.render_widget(board, area);
}

fn glyph_style(ch: char, flashing: &[bool]) -> Style {
    match ch {
        EMPTY => Style::default().fg(Color::DarkGray),
        OBSTACLE => Style::default().fg(Color::Gray),
        FOOD => Style::default().fg(Color::LightGreen),
        _ if ch == PowerUpKind::Aggressive.symbol() => Style::default().fg(Color::LightRed),
        _ if ch == PowerUpKind::Shield.symbol() => Style::default().fg(Color::LightBlue),
        _ if ch == PowerUpKind::Multiplier.symbol() => Style::default().fg(Color::LightYellow),
        '1'..='9' => {
            let id = ch.to_digit(10).map_or(0, |d| d as usize - 1);
            let style = Style::default().fg(agent_color(id)).add_modifier(Modifier::BOLD);
            if flashing.get(id).copied().unwrap_or(false) {
                style.add_modifier(Modifier::SLOW_BLINK)
            } else {
                style
            }
        }
        'a'..='z' => Style::default().fg(agent_color((u32::from(ch) - u32::from('a')) as usize)),
        _ => Style::default(),
    }
}

fn agent_color(id: usize) -> Color {
    match id {
        0 => Color::Red,
        1 => Color::Blue,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Magenta,
        5 => Color::Cyan,
        _ => Color::White,
    }
}

fn render_scores(f: &mut Frame, area: Rect, app: &App) {
    let world = app.sim.world();
    let mut lines = Vec::new();

    for (agent, stats) in world.agents.iter().zip(app.sim.scoreboard().agents()) {
        let status = match agent.life {
            LifeState::Alive => String::new(),
            LifeState::Respawning { countdown } => format!(" [respawn {countdown}]"),
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("Agent {} ", head_glyph(agent.id)),
                Style::default()
                    .fg(agent_color(agent.id))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("{} pts, len {}{status}", agent.score, agent.length())),
        ]));

        let t = agent.timers;
        lines.push(Line::from(format!(
            "  A:{} S:{} M:{}  deaths {} kills {}",
            t.aggressive, t.shielded, t.multiplier, stats.deaths, stats.kills
        )));
    }

    let scores = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Agents "))
        .wrap(Wrap { trim: false });

    f.render_widget(scores, area);
}

fn render_events(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app.recent.iter().map(|s| Line::from(s.as_str())).collect();

    let events = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Events "))
        .wrap(Wrap { trim: true });

    f.render_widget(events, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.paused {
        " [q] Quit  [Space] Resume  [→] Step  [+/-] Speed "
    } else {
        " [q] Quit  [Space] Pause  [→] Step  [+/-] Speed "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
