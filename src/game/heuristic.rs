//! Greedy one-step move selection.
//!
//! Every legal move is scored by how close it brings the agent to the
//! nearest target, with adjustments for cutting off rivals, re-entering its
//! own body and attacking a weaker head. The cheapest move wins; ties go to
//! the earliest entry of [`Direction::ALL`].
//!
//! Costs are `f64` because power-up distance is scaled by 0.7. The weights
//! below are applied in a fixed order so the same world always ranks moves
//! the same way.

use std::collections::HashSet;

use crate::game::{AgentId, Coord, Direction, World};

/// Cost used for food distance when no food is on the board.
pub const NO_FOOD_COST: f64 = 1000.0;

/// Scale applied to power-up distance when the agent has no active effect.
pub const POWERUP_WEIGHT: f64 = 0.7;

/// Subtracted per rival whose head is adjacent to the move and who is
/// closer to the first food piece than our current target cost.
pub const BLOCK_BONUS: f64 = 5.0;

/// Added when the move re-enters the agent's own body.
pub const SELF_PENALTY: f64 = 10.0;

/// Subtracted when the move lands on a head the agent would beat.
pub const ATTACK_BONUS: f64 = 20.0;

/// A move that survived filtering, with its cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Direction of the move.
    pub dir: Direction,
    /// Lower is better.
    pub cost: f64,
}

/// Score every legal move for agent `id`, in [`Direction::ALL`] order.
///
/// Returns an empty list if the agent is not alive or has no legal move.
#[must_use]
pub fn candidates(world: &World, id: AgentId) -> Vec<Candidate> {
    let Some(agent) = world.agents.get(id).filter(|a| a.is_alive()) else {
        return Vec::new();
    };
    let Some(head) = agent.head() else {
        return Vec::new();
    };

    let obstacles: HashSet<Coord> = world.obstacles.positions().collect();
    let neck = if agent.length() > 1 {
        agent.body.get(1).copied()
    } else {
        None
    };

    let mut result = Vec::with_capacity(Direction::ALL.len());

    for dir in Direction::ALL {
        let Some(cell) = head.step(dir) else {
            continue;
        };
        if Some(cell) == neck {
            continue;
        }
        if !world.grid.in_bounds(cell) || obstacles.contains(&cell) {
            continue;
        }

        let mut attack_bonus = 0.0;
        let mut fatal = false;
        for (_, other) in world.rivals(id) {
            if other.head() == Some(cell) {
                if agent.overpowers(other) {
                    attack_bonus = ATTACK_BONUS;
                } else {
                    fatal = true;
                    break;
                }
            } else if other.occupies(cell) {
                fatal = true;
                break;
            }
        }
        if fatal {
            continue;
        }

        let food_cost = world
            .food
            .cells()
            .iter()
            .map(|&f| cell.manhattan(f))
            .min()
            .map_or(NO_FOOD_COST, f64::from);

        let mut target_cost = match world.powerups.positions().map(|p| cell.manhattan(p)).min() {
            Some(powerup_dist) if !agent.timers.any_active() => {
                food_cost.min(f64::from(powerup_dist) * POWERUP_WEIGHT)
            }
            _ => food_cost,
        };

        // Rivals are measured against the first food piece only, not their
        // own nearest one.
        if let Some(&first_food) = world.food.cells().first() {
            for (_, other) in world.rivals(id) {
                let Some(other_head) = other.head() else {
                    continue;
                };
                let rival_to_food = f64::from(other_head.manhattan(first_food));
                if rival_to_food < target_cost && cell.manhattan(other_head) == 1 {
                    target_cost -= BLOCK_BONUS;
                }
            }
        }

        if agent.occupies(cell) {
            target_cost += SELF_PENALTY;
        }

        result.push(Candidate {
            dir,
            cost: target_cost - attack_bonus,
        });
    }

    result
}

/// Pick the cheapest move for agent `id`, or `None` if it is trapped.
///
/// Pure: calling it twice on the same world gives the same answer.
#[must_use]
pub fn decide(world: &World, id: AgentId) -> Option<Direction> {
    candidates(world, id)
        .into_iter()
        .fold(None, |best: Option<Candidate>, c| match best {
            Some(b) if b.cost <= c.cost => Some(b),
            _ => Some(c),
        })
        .map(|c| c.dir)
}
