//! Simulation core.
//!
//! Implements the arena rules:
//! - Grid with bounds checks and free-cell enumeration
//! - Food, obstacle and power-up registries with lifetimes
//! - Agents with bodies, scores, life states and status timers
//! - Greedy move heuristic
//! - Tick resolution (move, fight, eat, trim, pick up, decay, respawn)

mod agent;
mod entities;
mod grid;
mod heuristic;
mod invariants;
mod resolver;
mod world;

pub use agent::{
    Agent, AgentId, EFFECT_DURATION, LifeState, RESPAWN_DELAY, RESPAWN_FLASH, StatusTimers,
};
pub use entities::{
    FOOD_TARGET, FoodSupply, MAX_OBSTACLES, MAX_POWERUPS, Obstacle, PowerUp, PowerUpKind,
    Registry, Timed,
};
pub use grid::{Coord, Direction, GRID_HEIGHT, GRID_WIDTH, Grid};
pub use heuristic::{
    ATTACK_BONUS, BLOCK_BONUS, Candidate, NO_FOOD_COST, POWERUP_WEIGHT, SELF_PENALTY, candidates,
    decide,
};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use resolver::{
    ATTACK_POINTS, DeathCause, EventKind, FOOD_POINTS, MULTIPLIED_FOOD_POINTS, TickEvent,
    advance_tick,
};
pub use world::{AGENT_COUNT, SpawnRates, Upkeep, World, maintain_entities, random_direction};
