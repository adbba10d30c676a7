//! The world: board, agents and entity registries.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::game::{
    Agent, AgentId, Coord, Direction, FOOD_TARGET, FoodSupply, Grid, MAX_OBSTACLES, MAX_POWERUPS,
    Obstacle, PowerUp, Registry,
};

/// Number of agents in every match.
pub const AGENT_COUNT: usize = 6;

/// Per-frame spawn chances for obstacles and power-ups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRates {
    /// Chance per frame that an obstacle appears (if below the cap).
    pub obstacle: f64,
    /// Chance per frame that a power-up appears (if below the cap).
    pub powerup: f64,
}

impl SpawnRates {
    /// No spawning at all.
    pub const NONE: SpawnRates = SpawnRates {
        obstacle: 0.0,
        powerup: 0.0,
    };
}

impl Default for SpawnRates {
    fn default() -> Self {
        Self {
            obstacle: 0.02,
            powerup: 0.01,
        }
    }
}

/// What [`maintain_entities`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Upkeep {
    /// Obstacles that timed out.
    pub obstacles_expired: usize,
    /// Power-ups that timed out.
    pub powerups_expired: usize,
    /// Whether a new obstacle appeared.
    pub obstacle_spawned: bool,
    /// Whether a new power-up appeared.
    pub powerup_spawned: bool,
    /// Food pieces added to reach the target.
    pub food_added: usize,
}

/// Complete simulation state.
#[derive(Debug, Clone)]
pub struct World {
    /// The board.
    pub grid: Grid,
    /// All agents, in resolution order.
    pub agents: Vec<Agent>,
    /// Food on the board.
    pub food: FoodSupply,
    /// Obstacles on the board.
    pub obstacles: Registry<Obstacle>,
    /// Power-ups on the board.
    pub powerups: Registry<PowerUp>,
    /// Spawn chances used by [`maintain_entities`].
    pub rates: SpawnRates,
}

impl World {
    /// Build the standard arena: a 50x50 board, six agents scattered over
    /// the upper-left third, and a full food supply.
    #[must_use]
    pub fn new<R: Rng>(rates: SpawnRates, rng: &mut R) -> Self {
        let grid = Grid::standard();
        let region_w = grid.width() / 3;
        let region_h = grid.height() / 3;

        let mut taken = HashSet::new();
        let mut agents = Vec::with_capacity(AGENT_COUNT);
        for id in 0..AGENT_COUNT {
            let region: Vec<Coord> = (0..=region_w)
                .flat_map(|x| (0..=region_h).map(move |y| Coord::new(x, y)))
                .filter(|c| !taken.contains(c))
                .collect();
            let start = region.choose(rng).copied().unwrap_or_else(|| {
                Coord::new(rng.random_range(0..=region_w), rng.random_range(0..=region_h))
            });
            taken.insert(start);
            agents.push(Agent::new(id, start, random_direction(rng)));
        }

        let mut world = Self::with_grid(grid, agents, rates);
        let mut occupied = world.occupied();
        world.food.top_up(&world.grid, &mut occupied, rng);
        world
    }

    /// Build a world from explicit parts with empty entity registries.
    #[must_use]
    pub fn with_grid(grid: Grid, agents: Vec<Agent>, rates: SpawnRates) -> Self {
        Self {
            grid,
            agents,
            food: FoodSupply::new(FOOD_TARGET),
            obstacles: Registry::new(MAX_OBSTACLES),
            powerups: Registry::new(MAX_POWERUPS),
            rates,
        }
    }

    /// Live agents other than `id`, with their indices.
    pub fn rivals(&self, id: AgentId) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.agents
            .iter()
            .enumerate()
            .filter(move |(i, a)| *i != id && a.is_alive())
    }

    /// Every cell held by an agent body or an entity.
    #[must_use]
    pub fn occupied(&self) -> HashSet<Coord> {
        let mut cells: HashSet<Coord> = self
            .agents
            .iter()
            .flat_map(|a| a.body.iter().copied())
            .collect();
        cells.extend(self.food.cells().iter().copied());
        cells.extend(self.obstacles.positions());
        cells.extend(self.powerups.positions());
        cells
    }

    /// A uniformly random unoccupied cell, or any cell if the board is full.
    pub fn random_free_cell<R: Rng>(&self, rng: &mut R) -> Coord {
        let free = self.grid.free_cells(&self.occupied());
        match free.choose(rng) {
            Some(&cell) => cell,
            None => Coord::new(
                rng.random_range(0..self.grid.width()),
                rng.random_range(0..self.grid.height()),
            ),
        }
    }

    /// Highest score on the board, with the first agent holding it.
    #[must_use]
    pub fn leader(&self) -> Option<(AgentId, u32)> {
        self.agents
            .iter()
            .map(|a| (a.id, a.score))
            .reduce(|best, cur| if cur.1 > best.1 { cur } else { best })
    }
}

/// A uniformly random direction.
pub fn random_direction<R: Rng>(rng: &mut R) -> Direction {
    Direction::ALL.choose(rng).copied().unwrap_or(Direction::Right)
}

/// Per-frame upkeep: age and spawn obstacles, then power-ups, then refill
/// food to its target.
///
/// Each step recomputes occupancy, so nothing is placed on a cell another
/// registry just claimed.
pub fn maintain_entities<R: Rng>(world: &mut World, rng: &mut R) -> Upkeep {
    let mut upkeep = Upkeep {
        obstacles_expired: world.obstacles.tick(),
        ..Upkeep::default()
    };
    let occupied = world.occupied();
    upkeep.obstacle_spawned = world
        .obstacles
        .try_spawn(&world.grid, &occupied, world.rates.obstacle, rng)
        .is_some();

    upkeep.powerups_expired = world.powerups.tick();
    let occupied = world.occupied();
    upkeep.powerup_spawned = world
        .powerups
        .try_spawn(&world.grid, &occupied, world.rates.powerup, rng)
        .is_some();

    let mut occupied = world.occupied();
    upkeep.food_added = world.food.top_up(&world.grid, &mut occupied, rng);

    trace!(?upkeep, "entities maintained");
    upkeep
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::PowerUpKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_new_world_layout() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let world = World::new(SpawnRates::default(), &mut rng);

        assert_eq!(world.agents.len(), AGENT_COUNT);
        assert_eq!(world.food.len(), FOOD_TARGET);
        assert!(world.obstacles.is_empty());
        assert!(world.powerups.is_empty());

        let mut heads = HashSet::new();
        for (i, agent) in world.agents.iter().enumerate() {
            assert_eq!(agent.id, i);
            let head = agent.head().unwrap();
            assert!(head.x <= 16 && head.y <= 16);
            assert!(heads.insert(head), "agents share a start cell");
            assert!(!world.food.contains(head));
        }
    }

    #[test]
    fn test_new_world_is_seeded() {
        let a = World::new(SpawnRates::default(), &mut ChaCha8Rng::seed_from_u64(99));
        let b = World::new(SpawnRates::default(), &mut ChaCha8Rng::seed_from_u64(99));
        let heads_a: Vec<_> = a.agents.iter().map(Agent::head).collect();
        let heads_b: Vec<_> = b.agents.iter().map(Agent::head).collect();
        assert_eq!(heads_a, heads_b);
        assert_eq!(a.food.cells(), b.food.cells());
    }

    #[test]
    fn test_rivals_skip_self_and_dead() {
        let mut world = World::with_grid(
            Grid::new(10, 10).unwrap(),
            vec![
                Agent::new(0, Coord::new(0, 0), Direction::Right),
                Agent::new(1, Coord::new(5, 5), Direction::Right),
                Agent::new(2, Coord::new(9, 9), Direction::Right),
            ],
            SpawnRates::NONE,
        );
        world.agents[2].die();
        let ids: Vec<AgentId> = world.rivals(0).map(|(i, _)| i).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_random_free_cell_falls_back_when_full() {
        let mut world = World::with_grid(
            Grid::new(1, 2).unwrap(),
            vec![Agent::with_body(0, [Coord::new(0, 0), Coord::new(0, 1)], Direction::Up)],
            SpawnRates::NONE,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cell = world.random_free_cell(&mut rng);
        assert!(world.grid.in_bounds(cell));

        world.agents[0].body.pop_back();
        assert_eq!(world.random_free_cell(&mut rng), Coord::new(0, 1));
    }

    #[test]
    fn test_maintain_with_zero_rates_keeps_counts() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut world = World::new(SpawnRates::NONE, &mut rng);
        world.powerups.insert(PowerUp {
            pos: Coord::new(40, 40),
            remaining: 500,
            kind: PowerUpKind::Aggressive,
        });
        world.obstacles.insert(Obstacle {
            pos: Coord::new(41, 41),
            remaining: 500,
        });

        for _ in 0..200 {
            let upkeep = maintain_entities(&mut world, &mut rng);
            assert!(!upkeep.obstacle_spawned);
            assert!(!upkeep.powerup_spawned);
            assert_eq!(world.obstacles.len(), 1);
            assert_eq!(world.powerups.len(), 1);
        }
    }

    #[test]
    fn test_maintain_refills_food() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut world = World::new(SpawnRates::NONE, &mut rng);
        let eaten = world.food.cells()[0];
        world.food.remove(eaten);
        assert_eq!(world.food.len(), FOOD_TARGET - 1);

        let upkeep = maintain_entities(&mut world, &mut rng);
        assert_eq!(upkeep.food_added, 1);
        assert_eq!(world.food.len(), FOOD_TARGET);
    }

    #[test]
    fn test_maintain_caps_hold_at_full_rates() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut world = World::new(
            SpawnRates {
                obstacle: 1.0,
                powerup: 1.0,
            },
            &mut rng,
        );
        for _ in 0..100 {
            maintain_entities(&mut world, &mut rng);
            assert!(world.obstacles.len() <= MAX_OBSTACLES);
            assert!(world.powerups.len() <= MAX_POWERUPS);
        }
        // Nothing spawned in the first frame has expired yet.
        assert_eq!(world.powerups.len(), MAX_POWERUPS);
    }

    #[test]
    fn test_leader() {
        let mut world = World::with_grid(
            Grid::new(10, 10).unwrap(),
            vec![
                Agent::new(0, Coord::new(0, 0), Direction::Right),
                Agent::new(1, Coord::new(5, 5), Direction::Right),
            ],
            SpawnRates::NONE,
        );
        assert_eq!(world.leader(), Some((0, 0)));
        world.agents[1].score = 4;
        assert_eq!(world.leader(), Some((1, 4)));
    }
}
