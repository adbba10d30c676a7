//! Frame-driven simulation host.
//!
//! A [`Simulation`] owns the world, a seeded RNG and the speed setting.
//! Each frame runs entity upkeep once and then as many ticks as the speed
//! multiplier asks for. Two simulations built from the same seed and
//! config produce identical runs.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::trace;

use crate::config::{SimConfig, Speed};
use crate::error::ConfigResult;
use crate::game::{
    AgentId, DeathCause, EventKind, TickEvent, World, advance_tick, assert_invariants,
    maintain_entities,
};

/// Running totals for one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgentStats {
    /// Food pieces eaten.
    pub food_eaten: u32,
    /// Power-ups collected.
    pub powerups: u32,
    /// Times the agent died.
    pub deaths: u32,
    /// Rivals killed by landing on their head.
    pub kills: u32,
    /// Times the agent cut its own tail.
    pub tail_cuts: u32,
    /// Longest body reached.
    pub best_length: usize,
}

/// Per-agent statistics collected from tick events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    stats: Vec<AgentStats>,
}

impl Scoreboard {
    /// Empty scoreboard for `agents` agents.
    #[must_use]
    pub fn new(agents: usize) -> Self {
        Self {
            stats: vec![AgentStats::default(); agents],
        }
    }

    /// Stats for one agent.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&AgentStats> {
        self.stats.get(id)
    }

    /// Stats for all agents, by index.
    #[must_use]
    pub fn agents(&self) -> &[AgentStats] {
        &self.stats
    }

    /// Fold one tick's events into the totals.
    pub fn record(&mut self, events: &[TickEvent]) {
        for (i, event) in events.iter().enumerate() {
            let Some(stats) = self.stats.get_mut(event.agent) else {
                continue;
            };
            match event.kind {
                EventKind::AteFood | EventKind::AteMultiplierFood => stats.food_eaten += 1,
                EventKind::PickedUpPowerUp(_) => stats.powerups += 1,
                EventKind::TailCut => stats.tail_cuts += 1,
                EventKind::Died(cause) => {
                    stats.deaths += 1;
                    if let Some(killer) = killer_of(events, i, cause)
                        && let Some(killer_stats) = self.stats.get_mut(killer)
                    {
                        killer_stats.kills += 1;
                    }
                }
                EventKind::Respawned | EventKind::AttackLanded | EventKind::ShieldBroken => {}
            }
        }
    }

    /// Update best lengths from the current bodies.
    pub fn observe(&mut self, world: &World) {
        for (stats, agent) in self.stats.iter_mut().zip(&world.agents) {
            stats.best_length = stats.best_length.max(agent.length());
        }
    }
}

/// Attacker that caused the death at `index`.
///
/// The resolver reports an attack as `Died` followed by the attacker's
/// `AttackLanded` on the same cell. Other causes have no killer.
fn killer_of(events: &[TickEvent], index: usize, cause: DeathCause) -> Option<AgentId> {
    if cause != DeathCause::Attacked {
        return None;
    }
    let death = events.get(index)?;
    let next = events.get(index + 1)?;
    (next.kind == EventKind::AttackLanded && next.pos == death.pos).then_some(next.agent)
}

/// A running match.
#[derive(Debug, Clone)]
pub struct Simulation {
    world: World,
    rng: ChaCha8Rng,
    seed: u64,
    speed: Speed,
    frames: u64,
    ticks: u64,
    scoreboard: Scoreboard,
}

impl Simulation {
    /// Build the standard arena from `seed` and `config`.
    ///
    /// The config's own seed is ignored; callers resolve it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation.
    pub fn new(seed: u64, config: &SimConfig) -> ConfigResult<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let world = World::new(config.rates(), &mut rng);
        Ok(Self::from_parts(world, rng, seed, config.speed))
    }

    /// Wrap an existing world. Used for hand-built scenarios.
    #[must_use]
    pub fn from_world(world: World, seed: u64, speed: Speed) -> Self {
        Self::from_parts(world, ChaCha8Rng::seed_from_u64(seed), seed, speed)
    }

    fn from_parts(world: World, rng: ChaCha8Rng, seed: u64, speed: Speed) -> Self {
        let mut scoreboard = Scoreboard::new(world.agents.len());
        scoreboard.observe(&world);
        Self {
            world,
            rng,
            seed,
            speed,
            frames: 0,
            ticks: 0,
            scoreboard,
        }
    }

    /// Run one frame: entity upkeep, then `speed` ticks.
    ///
    /// Returns every event of the frame in order.
    pub fn frame(&mut self) -> Vec<TickEvent> {
        let upkeep = maintain_entities(&mut self.world, &mut self.rng);
        let mut events = Vec::new();
        for _ in 0..self.speed.get() {
            let tick_events = advance_tick(&mut self.world, &mut self.rng);
            self.scoreboard.record(&tick_events);
            self.scoreboard.observe(&self.world);
            events.extend(tick_events);
            self.ticks += 1;
        }
        self.frames += 1;
        assert_invariants(&self.world);
        trace!(
            frame = self.frames,
            events = events.len(),
            food_added = upkeep.food_added,
            "frame complete"
        );
        events
    }

    /// Run `frames` frames, discarding events.
    pub fn run(&mut self, frames: u64) {
        for _ in 0..frames {
            self.frame();
        }
    }

    /// Change the tick multiplier. Takes effect on the next frame.
    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    /// Current tick multiplier.
    #[must_use]
    pub const fn speed(&self) -> Speed {
        self.speed
    }

    /// Current world state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Seed the run was started with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Frames run so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Ticks resolved so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Per-agent statistics.
    #[must_use]
    pub const fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{AGENT_COUNT, Agent, Coord, Direction, Grid, Obstacle, SpawnRates};

    #[test]
    fn test_same_seed_same_run() {
        let config = SimConfig::default();
        let mut a = Simulation::new(7, &config).unwrap();
        let mut b = Simulation::new(7, &config).unwrap();
        for _ in 0..100 {
            assert_eq!(a.frame(), b.frame());
        }
        let scores_a: Vec<u32> = a.world().agents.iter().map(|x| x.score).collect();
        let scores_b: Vec<u32> = b.world().agents.iter().map(|x| x.score).collect();
        assert_eq!(scores_a, scores_b);
        assert_eq!(a.scoreboard(), b.scoreboard());
    }

    #[test]
    fn test_speed_multiplies_ticks() {
        let config = SimConfig {
            speed: Speed::new(3).unwrap(),
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(1, &config).unwrap();
        sim.run(4);
        assert_eq!(sim.frame_count(), 4);
        assert_eq!(sim.tick_count(), 12);

        sim.set_speed(Speed::MIN);
        sim.frame();
        assert_eq!(sim.tick_count(), 13);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimConfig {
            obstacle_spawn_chance: 3.0,
            ..SimConfig::default()
        };
        assert!(Simulation::new(1, &config).is_err());
    }

    #[test]
    fn test_scoreboard_tracks_food() {
        let mut world = World::with_grid(
            Grid::new(10, 10).unwrap(),
            vec![Agent::new(0, Coord::new(2, 2), Direction::Right)],
            SpawnRates::NONE,
        );
        world.food.insert(Coord::new(3, 2));
        let mut sim = Simulation::from_world(world, 0, Speed::MIN);

        sim.frame();
        let stats = sim.scoreboard().get(0).unwrap();
        assert_eq!(stats.food_eaten, 1);
        assert_eq!(stats.best_length, 2);
    }

    #[test]
    fn test_scoreboard_credits_kill() {
        // Agent 1 (length 5) takes the head agent 0 (length 3) just moved to.
        let small = Agent::with_body(
            0,
            [Coord::new(5, 5), Coord::new(4, 5), Coord::new(3, 5)],
            Direction::Right,
        );
        let big = Agent::with_body(
            1,
            [
                Coord::new(7, 5),
                Coord::new(7, 6),
                Coord::new(7, 7),
                Coord::new(7, 8),
                Coord::new(7, 9),
            ],
            Direction::Up,
        );
        let trapped = Agent::with_body(2, [Coord::new(0, 0), Coord::new(0, 1)], Direction::Up);
        let mut world = World::with_grid(
            Grid::new(20, 20).unwrap(),
            vec![small, big, trapped],
            SpawnRates::NONE,
        );
        world.food.insert(Coord::new(10, 5));
        world.obstacles.insert(Obstacle { pos: Coord::new(1, 0), remaining: 99 });

        let events = advance_tick(&mut world, &mut ChaCha8Rng::seed_from_u64(9));
        let causes: Vec<DeathCause> = events
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::Died(cause) => Some(cause),
                _ => None,
            })
            .collect();
        assert_eq!(causes, vec![DeathCause::Attacked, DeathCause::Trapped]);

        let mut board = Scoreboard::new(3);
        board.record(&events);

        let kills: Vec<u32> = board.agents().iter().map(|s| s.kills).collect();
        let deaths: Vec<u32> = board.agents().iter().map(|s| s.deaths).collect();
        assert_eq!(kills, vec![0, 1, 0]);
        assert_eq!(deaths, vec![1, 0, 1]);
    }

    #[test]
    fn test_long_run_keeps_counts() {
        let mut sim = Simulation::new(2024, &SimConfig::default()).unwrap();
        sim.run(300);
        assert_eq!(sim.world().agents.len(), AGENT_COUNT);
        assert_eq!(sim.scoreboard().agents().len(), AGENT_COUNT);
    }
}
