//! Output formatting utilities for CLI.

use mayhem::game::{EventKind, LifeState, TickEvent};
use mayhem::render::head_glyph;
use mayhem::sim::AgentStats;
use mayhem::{BatchStats, Simulation, render_ascii};
use serde::Serialize;
use std::fmt::Write;

/// An event tagged with the frame it happened in.
#[derive(Debug, Clone, Copy, Serialize)]
pub(super) struct FrameEvent {
    /// Frame number (1-based).
    pub(super) frame: u64,
    /// The event itself.
    #[serde(flatten)]
    pub(super) event: TickEvent,
}

/// JSON-serializable run result.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunResult {
    /// Random seed used.
    seed: u64,
    /// Frames simulated.
    frames: u64,
    /// Ticks resolved.
    ticks: u64,
    /// Leading agent (1-based), null on an empty board.
    leader: Option<usize>,
    /// Per-agent results.
    agents: Vec<JsonAgentResult>,
    /// Events, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<FrameEvent>>,
}

/// JSON-serializable agent result.
#[derive(Debug, Serialize)]
pub(super) struct JsonAgentResult {
    /// Agent number (1-based).
    id: usize,
    /// Final score.
    score: u32,
    /// Final body length (0 while respawning).
    length: usize,
    /// Whether the agent is on the board.
    alive: bool,
    /// Totals for the run.
    #[serde(flatten)]
    stats: AgentStats,
}

impl JsonRunResult {
    /// Create from a finished simulation.
    pub(super) fn from_simulation(sim: &Simulation, events: Option<Vec<FrameEvent>>) -> Self {
        let world = sim.world();
        Self {
            seed: sim.seed(),
            frames: sim.frame_count(),
            ticks: sim.tick_count(),
            leader: world.leader().map(|(id, _)| id + 1),
            agents: world
                .agents
                .iter()
                .zip(sim.scoreboard().agents())
                .map(|(agent, &stats)| JsonAgentResult {
                    id: agent.id + 1,
                    score: agent.score,
                    length: agent.length(),
                    alive: agent.life == LifeState::Alive,
                    stats,
                })
                .collect(),
            events,
        }
    }
}

/// Describe an event in one line.
pub(super) fn describe_event(event: &TickEvent) -> String {
    let who = format!("Agent {}", head_glyph(event.agent));
    let at = format!("({}, {})", event.pos.x, event.pos.y);
    match event.kind {
        EventKind::AteFood => format!("{who} ate food at {at}"),
        EventKind::AteMultiplierFood => format!("{who} ate food at {at} (x2)"),
        EventKind::PickedUpPowerUp(kind) => format!("{who} picked up {kind:?} at {at}"),
        EventKind::Died(cause) => format!("{who} died at {at} ({cause:?})"),
        EventKind::Respawned => format!("{who} respawned at {at}"),
        EventKind::TailCut => format!("{who} cut its tail at {at}"),
        EventKind::AttackLanded => format!("{who} won a collision at {at}"),
        EventKind::ShieldBroken => format!("{who} lost its shield at {at}"),
    }
}

/// Format a finished run as human-readable text.
pub(super) fn format_text(sim: &Simulation) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Run Result (seed: {}, frames: {}, ticks: {})\n",
        sim.seed(),
        sim.frame_count(),
        sim.tick_count()
    );
    output.push_str(&render_ascii(sim.world()));
    output.push('\n');

    output.push_str("Totals:\n");
    for (i, stats) in sim.scoreboard().agents().iter().enumerate() {
        let _ = writeln!(
            output,
            "  Agent {}: food {}  power-ups {}  deaths {}  kills {}  tail cuts {}  best length {}",
            head_glyph(i),
            stats.food_eaten,
            stats.powerups,
            stats.deaths,
            stats.kills,
            stats.tail_cuts,
            stats.best_length
        );
    }
    if let Some((id, score)) = sim.world().leader() {
        let _ = writeln!(output, "\nLeader: Agent {} ({score} points)", head_glyph(id));
    }

    output
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    /// Total runs.
    runs: u64,
    /// Runs with a shared top score.
    draws: u64,
    /// Deaths across every agent and run.
    total_deaths: u64,
    /// Per-agent statistics.
    agents: Vec<JsonBatchAgent>,
}

/// JSON-serializable per-agent batch stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchAgent {
    /// Agent number (1-based).
    agent: usize,
    /// Outright wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Mean final score.
    mean_score: f64,
    /// Score standard deviation.
    score_std_dev: f64,
    /// Total deaths.
    deaths: u64,
    /// Total kills.
    kills: u64,
    /// Total food eaten.
    food: u64,
}

impl JsonBatchResult {
    /// Create from aggregated stats.
    pub(super) fn from_stats(stats: &BatchStats) -> Self {
        let agents = (0..stats.agent_count())
            .map(|i| JsonBatchAgent {
                agent: i + 1,
                wins: stats.wins[i],
                win_rate: stats.win_rate(i),
                mean_score: stats.mean_score(i),
                score_std_dev: stats.score_std_dev(i),
                deaths: stats.deaths[i],
                kills: stats.kills[i],
                food: stats.food[i],
            })
            .collect();

        Self {
            runs: stats.runs,
            draws: stats.draws,
            total_deaths: stats.total_deaths(),
            agents,
        }
    }
}

/// Format batch stats as human-readable text.
#[allow(clippy::cast_precision_loss)]
pub(super) fn format_batch_text(stats: &BatchStats) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Batch Results ({} runs)", stats.runs);
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for i in 0..stats.agent_count() {
        let _ = writeln!(
            output,
            "  Agent {}: {:.1}% ({} wins)",
            head_glyph(i),
            stats.win_rate(i) * 100.0,
            stats.wins[i]
        );
    }
    let draw_rate = if stats.runs == 0 {
        0.0
    } else {
        stats.draws as f64 / stats.runs as f64 * 100.0
    };
    let _ = writeln!(output, "  Draws: {} ({draw_rate:.1}%)\n", stats.draws);

    output.push_str("Scores:\n");
    for i in 0..stats.agent_count() {
        let _ = writeln!(
            output,
            "  Agent {}: {:.1} (+/- {:.1})  deaths {}  kills {}  food {}",
            head_glyph(i),
            stats.mean_score(i),
            stats.score_std_dev(i),
            stats.deaths[i],
            stats.kills[i],
            stats.food[i]
        );
    }

    let _ = writeln!(output, "\nTotal Deaths: {}", stats.total_deaths());

    output
}

/// Format batch stats as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats) -> String {
    let mut output = String::new();

    output.push_str("agent,wins,win_rate,mean_score,score_std_dev,deaths,kills,food\n");

    for i in 0..stats.agent_count() {
        let _ = writeln!(
            output,
            "{},{},{:.4},{:.2},{:.2},{},{},{}",
            i + 1,
            stats.wins[i],
            stats.win_rate(i),
            stats.mean_score(i),
            stats.score_std_dev(i),
            stats.deaths[i],
            stats.kills[i],
            stats.food[i]
        );
    }

    output
}
