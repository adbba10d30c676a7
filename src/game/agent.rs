//! Agent state: body, score, life cycle and status effects.

use std::collections::VecDeque;

use serde::Serialize;

use crate::game::{Coord, Direction, PowerUpKind};

/// Index of an agent in the world's agent list. Iteration order is agent
/// order.
pub type AgentId = usize;

/// Ticks an agent waits between dying and reappearing.
pub const RESPAWN_DELAY: u32 = 50;

/// Ticks a power-up effect lasts after pickup.
pub const EFFECT_DURATION: u32 = 50;

/// Ticks the "just respawned" indicator stays lit.
pub const RESPAWN_FLASH: u32 = 30;

/// Countdowns for the three power-up effects. Non-zero means active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusTimers {
    /// Wins every head-on collision while active.
    pub aggressive: u32,
    /// Absorbs one lost head-on collision.
    pub shielded: u32,
    /// Doubles food score while active.
    pub multiplier: u32,
}

impl StatusTimers {
    /// True if any effect is running.
    #[must_use]
    pub const fn any_active(&self) -> bool {
        self.aggressive > 0 || self.shielded > 0 || self.multiplier > 0
    }

    /// Start (or restart) the effect granted by `kind`.
    pub fn grant(&mut self, kind: PowerUpKind, ticks: u32) {
        match kind {
            PowerUpKind::Aggressive => self.aggressive = ticks,
            PowerUpKind::Shield => self.shielded = ticks,
            PowerUpKind::Multiplier => self.multiplier = ticks,
        }
    }

    /// Count every effect down by one tick, floored at zero.
    pub fn decay(&mut self) {
        self.aggressive = self.aggressive.saturating_sub(1);
        self.shielded = self.shielded.saturating_sub(1);
        self.multiplier = self.multiplier.saturating_sub(1);
    }
}

/// Where an agent is in its life cycle.
///
/// Dying is not a resting state: [`Agent::die`] moves an agent straight from
/// `Alive` to `Respawning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifeState {
    /// On the board and moving.
    Alive,
    /// Off the board, waiting `countdown` more ticks.
    Respawning {
        /// Ticks until the agent reappears.
        countdown: u32,
    },
}

/// A single snake.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Position in the world's agent list.
    pub id: AgentId,
    /// Occupied cells, head first. Empty while respawning.
    pub body: VecDeque<Coord>,
    /// Last direction moved.
    pub facing: Direction,
    /// Points earned. Never decreases and survives death.
    pub score: u32,
    /// Alive or waiting to respawn.
    pub life: LifeState,
    /// Power-up effect countdowns.
    pub timers: StatusTimers,
    /// Non-zero shortly after a respawn.
    pub flash: u32,
}

impl Agent {
    /// Create a live one-cell agent.
    #[must_use]
    pub fn new(id: AgentId, start: Coord, facing: Direction) -> Self {
        Self {
            id,
            body: VecDeque::from([start]),
            facing,
            score: 0,
            life: LifeState::Alive,
            timers: StatusTimers::default(),
            flash: 0,
        }
    }

    /// Create a live agent with an explicit body, head first.
    #[must_use]
    pub fn with_body(id: AgentId, body: impl IntoIterator<Item = Coord>, facing: Direction) -> Self {
        Self {
            body: body.into_iter().collect(),
            ..Self::new(id, Coord::new(0, 0), facing)
        }
    }

    /// Head cell, or `None` while respawning.
    #[must_use]
    #[inline]
    pub fn head(&self) -> Option<Coord> {
        self.body.front().copied()
    }

    /// Number of body cells.
    #[must_use]
    #[inline]
    pub fn length(&self) -> usize {
        self.body.len()
    }

    /// True while on the board.
    #[must_use]
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    /// True if `cell` is part of this agent's body.
    #[must_use]
    pub fn occupies(&self, cell: Coord) -> bool {
        self.body.contains(&cell)
    }

    /// Whether this agent wins a head-on meeting with `other`: it is
    /// aggressive or strictly longer.
    #[must_use]
    pub fn overpowers(&self, other: &Agent) -> bool {
        self.timers.aggressive > 0 || self.length() > other.length()
    }

    /// Spend the shield if one is up. Returns `true` if it absorbed the hit.
    pub fn absorb_hit(&mut self) -> bool {
        if self.timers.shielded > 0 {
            self.timers.shielded = 0;
            true
        } else {
            false
        }
    }

    /// Remove the agent from the board and start the respawn countdown.
    ///
    /// Returns the head cell it died on.
    pub fn die(&mut self) -> Option<Coord> {
        let head = self.head();
        self.body.clear();
        self.life = LifeState::Respawning {
            countdown: RESPAWN_DELAY,
        };
        head
    }

    /// Count the respawn timer down. Returns `true` once it has run out.
    pub fn tick_respawn(&mut self) -> bool {
        match &mut self.life {
            LifeState::Alive => false,
            LifeState::Respawning { countdown } => {
                *countdown = countdown.saturating_sub(1);
                *countdown == 0
            }
        }
    }

    /// Put the agent back on the board as a single cell.
    pub fn respawn(&mut self, cell: Coord, facing: Direction) {
        self.body.clear();
        self.body.push_back(cell);
        self.facing = facing;
        self.life = LifeState::Alive;
        self.flash = RESPAWN_FLASH;
    }
}
