//! World invariants - sanity checks that detect resolver bugs.
//!
//! These should never trigger in a correctly implemented simulation. They
//! are run after every frame in debug builds and by the property tests.

use std::collections::{HashMap, HashSet};

use crate::game::{Coord, LifeState, World};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all world invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(world: &World) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let grid = world.grid;

    for agent in &world.agents {
        match agent.life {
            LifeState::Alive if agent.body.is_empty() => {
                violations.push(violation(format!("Live agent {} has no body", agent.id)));
            }
            LifeState::Respawning { .. } if !agent.body.is_empty() => {
                violations.push(violation(format!(
                    "Respawning agent {} still has {} body cells",
                    agent.id,
                    agent.length()
                )));
            }
            _ => {}
        }

        let mut seen = HashSet::with_capacity(agent.length());
        for &cell in &agent.body {
            if !grid.in_bounds(cell) {
                violations.push(violation(format!(
                    "Agent {} body cell {:?} is out of bounds",
                    agent.id, cell
                )));
            }
            if !seen.insert(cell) {
                violations.push(violation(format!(
                    "Agent {} body repeats cell {:?}",
                    agent.id, cell
                )));
            }
        }
    }

    let mut entity_cells: HashMap<Coord, &'static str> = HashMap::new();
    let entities = world
        .food
        .cells()
        .iter()
        .map(|&c| (c, "food"))
        .chain(world.obstacles.positions().map(|c| (c, "obstacle")))
        .chain(world.powerups.positions().map(|c| (c, "power-up")));
    for (cell, kind) in entities {
        if !grid.in_bounds(cell) {
            violations.push(violation(format!("{kind} at {cell:?} is out of bounds")));
        }
        if let Some(previous) = entity_cells.insert(cell, kind) {
            violations.push(violation(format!(
                "{kind} at {cell:?} shares its cell with {previous}"
            )));
        }
    }

    if world.food.len() > world.food.target() {
        violations.push(violation(format!(
            "Food count {} exceeds target {}",
            world.food.len(),
            world.food.target()
        )));
    }
    if world.obstacles.len() > world.obstacles.cap() {
        violations.push(violation(format!(
            "Obstacle count {} exceeds cap {}",
            world.obstacles.len(),
            world.obstacles.cap()
        )));
    }
    if world.powerups.len() > world.powerups.cap() {
        violations.push(violation(format!(
            "Power-up count {} exceeds cap {}",
            world.powerups.len(),
            world.powerups.cap()
        )));
    }

    violations
}

/// Assert all world invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(world: &World) {
    let violations = check_invariants(world);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("World invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_world: &World) {}
