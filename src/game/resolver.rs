//! Per-tick resolution.
//!
//! Agents are resolved strictly in index order. Each live agent decides,
//! moves, fights, eats, trims, picks up and decays before the next agent
//! is looked at, so an earlier agent's move is visible to later ones within
//! the same tick. Respawning agents only count down.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::game::{
    AgentId, Coord, EFFECT_DURATION, PowerUpKind, World, decide, random_direction,
};

/// Points for eating one food piece.
pub const FOOD_POINTS: u32 = 1;

/// Points for eating while the multiplier is active.
pub const MULTIPLIED_FOOD_POINTS: u32 = 2;

/// Points for winning a head-on collision.
pub const ATTACK_POINTS: u32 = 2;

/// Why an agent died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeathCause {
    /// No legal move was left.
    Trapped,
    /// Moved off the board.
    OutOfBounds,
    /// Moved onto an obstacle.
    Obstacle,
    /// Moved onto a head it could not beat.
    HeadOn,
    /// A stronger agent moved onto its head.
    Attacked,
}

/// What happened to an agent during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    /// Ate food for normal points.
    AteFood,
    /// Ate food with the multiplier active.
    AteMultiplierFood,
    /// Collected a power-up.
    PickedUpPowerUp(PowerUpKind),
    /// Left the board.
    Died(DeathCause),
    /// Came back after the respawn delay.
    Respawned,
    /// Ran into its own body and lost the part behind the crossing.
    TailCut,
    /// Won a head-on collision.
    AttackLanded,
    /// Lost a head-on collision but survived on its shield.
    ShieldBroken,
}

/// One occurrence in a tick, tagged with the agent and the cell it
/// happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickEvent {
    /// Agent the event belongs to.
    pub agent: AgentId,
    /// Board cell where it happened.
    pub pos: Coord,
    /// What happened.
    pub kind: EventKind,
}

impl TickEvent {
    /// Create a new event.
    #[must_use]
    pub const fn new(agent: AgentId, pos: Coord, kind: EventKind) -> Self {
        Self { agent, pos, kind }
    }
}

/// Advance the world by one tick.
///
/// Returns every event of the tick in the order it happened.
pub fn advance_tick<R: Rng>(world: &mut World, rng: &mut R) -> Vec<TickEvent> {
    let mut events = Vec::new();
    for id in 0..world.agents.len() {
        if world.agents[id].is_alive() {
            step_alive(world, id, &mut events);
        } else {
            step_respawning(world, id, rng, &mut events);
        }
    }
    events
}

/// Remove agent `id` from the board and record the death.
fn kill(world: &mut World, id: AgentId, cause: DeathCause, events: &mut Vec<TickEvent>) {
    if let Some(pos) = world.agents[id].die() {
        debug!(agent = id, ?cause, x = pos.x, y = pos.y, "agent died");
        events.push(TickEvent::new(id, pos, EventKind::Died(cause)));
    }
}

fn step_alive(world: &mut World, id: AgentId, events: &mut Vec<TickEvent>) {
    let Some(head) = world.agents[id].head() else {
        return;
    };

    let Some(dir) = decide(world, id) else {
        kill(world, id, DeathCause::Trapped, events);
        return;
    };
    let Some(new_head) = world.grid.neighbor(head, dir) else {
        kill(world, id, DeathCause::OutOfBounds, events);
        return;
    };
    if world.obstacles.contains(new_head) {
        kill(world, id, DeathCause::Obstacle, events);
        return;
    }

    // Head-on meetings, checked pairwise against each rival in index order.
    for other in 0..world.agents.len() {
        if other == id || world.agents[other].head() != Some(new_head) {
            continue;
        }
        if world.agents[id].overpowers(&world.agents[other]) {
            if world.agents[other].absorb_hit() {
                debug!(agent = other, attacker = id, "shield absorbed attack");
                events.push(TickEvent::new(other, new_head, EventKind::ShieldBroken));
            } else {
                kill(world, other, DeathCause::Attacked, events);
            }
            world.agents[id].score += ATTACK_POINTS;
            events.push(TickEvent::new(id, new_head, EventKind::AttackLanded));
        } else {
            world.agents[other].score += ATTACK_POINTS;
            events.push(TickEvent::new(other, new_head, EventKind::AttackLanded));
            if world.agents[id].absorb_hit() {
                debug!(agent = id, winner = other, "shield absorbed head-on loss");
                events.push(TickEvent::new(id, new_head, EventKind::ShieldBroken));
                break;
            }
            kill(world, id, DeathCause::HeadOn, events);
            return;
        }
    }

    let agent = &mut world.agents[id];
    agent.facing = dir;
    agent.body.push_front(new_head);

    if world.food.remove(new_head) {
        let (points, kind) = if agent.timers.multiplier > 0 {
            (MULTIPLIED_FOOD_POINTS, EventKind::AteMultiplierFood)
        } else {
            (FOOD_POINTS, EventKind::AteFood)
        };
        agent.score += points;
        events.push(TickEvent::new(id, new_head, kind));
    } else {
        agent.body.pop_back();
    }

    if let Some(cut_at) = agent.body.iter().skip(1).position(|&c| c == new_head) {
        agent.body.truncate(cut_at + 1);
        events.push(TickEvent::new(id, new_head, EventKind::TailCut));
    }

    if let Some(powerup) = world.powerups.remove(new_head) {
        agent.timers.grant(powerup.kind, EFFECT_DURATION);
        events.push(TickEvent::new(
            id,
            new_head,
            EventKind::PickedUpPowerUp(powerup.kind),
        ));
    }

    agent.timers.decay();
    agent.flash = agent.flash.saturating_sub(1);
}

fn step_respawning<R: Rng>(
    world: &mut World,
    id: AgentId,
    rng: &mut R,
    events: &mut Vec<TickEvent>,
) {
    if !world.agents[id].tick_respawn() {
        return;
    }
    let cell = world.random_free_cell(rng);
    let facing = random_direction(rng);
    world.agents[id].respawn(cell, facing);
    debug!(agent = id, x = cell.x, y = cell.y, "agent respawned");
    events.push(TickEvent::new(id, cell, EventKind::Respawned));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        Agent, Direction, Grid, LifeState, Obstacle, PowerUp, RESPAWN_DELAY, SpawnRates,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world_with(agents: Vec<Agent>) -> World {
        World::with_grid(Grid::new(20, 20).unwrap(), agents, SpawnRates::NONE)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_moves_and_keeps_length() {
        let mut world = world_with(vec![Agent::with_body(
            0,
            [Coord::new(5, 5), Coord::new(4, 5), Coord::new(3, 5)],
            Direction::Right,
        )]);
        world.food.insert(Coord::new(10, 5));

        let events = advance_tick(&mut world, &mut rng());
        assert!(events.is_empty());
        let body: Vec<Coord> = world.agents[0].body.iter().copied().collect();
        assert_eq!(body, vec![Coord::new(6, 5), Coord::new(5, 5), Coord::new(4, 5)]);
        assert_eq!(world.agents[0].facing, Direction::Right);
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut world = world_with(vec![Agent::new(0, Coord::new(5, 5), Direction::Right)]);
        world.food.insert(Coord::new(6, 5));

        let events = advance_tick(&mut world, &mut rng());
        assert_eq!(events, vec![TickEvent::new(0, Coord::new(6, 5), EventKind::AteFood)]);
        assert_eq!(world.agents[0].length(), 2);
        assert_eq!(world.agents[0].score, FOOD_POINTS);
        assert!(world.food.is_empty());
    }

    #[test]
    fn test_multiplier_doubles_food() {
        let mut world = world_with(vec![Agent::new(0, Coord::new(5, 5), Direction::Right)]);
        world.agents[0].timers.multiplier = 10;
        world.food.insert(Coord::new(6, 5));

        let events = advance_tick(&mut world, &mut rng());
        assert_eq!(events[0].kind, EventKind::AteMultiplierFood);
        assert_eq!(world.agents[0].score, MULTIPLIED_FOOD_POINTS);
        assert_eq!(world.agents[0].timers.multiplier, 9);
    }

    #[test]
    fn test_powerup_pickup_sets_timer() {
        let mut world = world_with(vec![Agent::new(0, Coord::new(5, 5), Direction::Right)]);
        world.powerups.insert(PowerUp {
            pos: Coord::new(6, 5),
            remaining: 100,
            kind: PowerUpKind::Aggressive,
        });

        let events = advance_tick(&mut world, &mut rng());
        assert_eq!(
            events,
            vec![TickEvent::new(
                0,
                Coord::new(6, 5),
                EventKind::PickedUpPowerUp(PowerUpKind::Aggressive)
            )]
        );
        // Granted, then decayed once at the end of the same tick.
        assert_eq!(world.agents[0].timers.aggressive, EFFECT_DURATION - 1);
        assert!(world.powerups.is_empty());
    }

    #[test]
    fn test_trapped_agent_dies() {
        let mut world = world_with(vec![Agent::with_body(
            0,
            [Coord::new(0, 0), Coord::new(0, 1)],
            Direction::Up,
        )]);
        world.obstacles.insert(Obstacle { pos: Coord::new(1, 0), remaining: 10 });

        let events = advance_tick(&mut world, &mut rng());
        assert_eq!(
            events,
            vec![TickEvent::new(0, Coord::new(0, 0), EventKind::Died(DeathCause::Trapped))]
        );
        assert_eq!(world.agents[0].life, LifeState::Respawning { countdown: RESPAWN_DELAY });
        assert!(world.agents[0].body.is_empty());
    }

    #[test]
    fn test_respawn_after_delay() {
        let mut world = world_with(vec![Agent::new(0, Coord::new(3, 3), Direction::Right)]);
        world.agents[0].score = 9;
        world.agents[0].die();
        let mut rng = rng();

        for _ in 1..RESPAWN_DELAY {
            assert!(advance_tick(&mut world, &mut rng).is_empty());
            assert!(!world.agents[0].is_alive());
        }
        let events = advance_tick(&mut world, &mut rng);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Respawned);
        let agent = &world.agents[0];
        assert!(agent.is_alive());
        assert_eq!(agent.length(), 1);
        assert_eq!(agent.head(), Some(events[0].pos));
        assert_eq!(agent.score, 9);
        assert!(agent.flash > 0);
    }

    #[test]
    fn test_attacker_kills_weaker_head() {
        // Agent 0 is aggressive and moves Right onto agent 1's head.
        let mut attacker = Agent::with_body(0, [Coord::new(5, 5), Coord::new(4, 5)], Direction::Right);
        attacker.timers.aggressive = 10;
        let victim = Agent::with_body(
            1,
            [Coord::new(6, 5), Coord::new(6, 6), Coord::new(6, 7)],
            Direction::Up,
        );
        let mut world = world_with(vec![attacker, victim]);
        world.food.insert(Coord::new(6, 0));

        let events = advance_tick(&mut world, &mut rng());
        assert_eq!(events[0], TickEvent::new(1, Coord::new(6, 5), EventKind::Died(DeathCause::Attacked)));
        assert_eq!(events[1], TickEvent::new(0, Coord::new(6, 5), EventKind::AttackLanded));
        assert_eq!(world.agents[0].score, ATTACK_POINTS);
        assert_eq!(world.agents[0].head(), Some(Coord::new(6, 5)));
        assert!(!world.agents[1].is_alive());
    }

    #[test]
    fn test_shielded_victim_survives_attack() {
        let mut attacker = Agent::with_body(0, [Coord::new(5, 5), Coord::new(4, 5)], Direction::Right);
        attacker.timers.aggressive = 10;
        let mut victim = Agent::with_body(
            1,
            [Coord::new(6, 5), Coord::new(6, 6), Coord::new(6, 7)],
            Direction::Up,
        );
        victim.timers.shielded = 20;
        let mut world = world_with(vec![attacker, victim]);
        world.food.insert(Coord::new(6, 0));

        let events = advance_tick(&mut world, &mut rng());
        assert!(events.iter().all(|e| !matches!(e.kind, EventKind::Died(_))));
        assert!(events.contains(&TickEvent::new(1, Coord::new(6, 5), EventKind::ShieldBroken)));
        assert_eq!(world.agents[1].timers.shielded, 0);
        assert!(world.agents[1].is_alive());
        assert_eq!(world.agents[0].score, ATTACK_POINTS);
    }

    #[test]
    fn test_self_trim_cuts_at_repeat() {
        // A 2x2 loop where the head re-enters the tail cell.
        let body = [
            Coord::new(5, 5),
            Coord::new(6, 5),
            Coord::new(6, 4),
            Coord::new(5, 4),
            Coord::new(4, 4),
        ];
        let mut world = world_with(vec![Agent::with_body(0, body, Direction::Left)]);
        // Everything but Up is blocked so the agent must re-enter its body.
        world.obstacles.insert(Obstacle { pos: Coord::new(4, 5), remaining: 10 });
        world.obstacles.insert(Obstacle { pos: Coord::new(5, 6), remaining: 10 });

        let events = advance_tick(&mut world, &mut rng());
        assert_eq!(events, vec![TickEvent::new(0, Coord::new(5, 4), EventKind::TailCut)]);
        let body: Vec<Coord> = world.agents[0].body.iter().copied().collect();
        assert_eq!(body, vec![Coord::new(5, 4), Coord::new(5, 5), Coord::new(6, 5), Coord::new(6, 4)]);
    }
}
