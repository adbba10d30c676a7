//! Plain-text board rendering.

use std::fmt::Write;

use crate::game::{Agent, LifeState, World};

/// Board character for an empty cell.
pub const EMPTY: char = '.';
/// Board character for an obstacle.
pub const OBSTACLE: char = '#';
/// Board character for food.
pub const FOOD: char = '*';

/// Head glyph for agent `id` (`1`-`9`).
#[must_use]
pub fn head_glyph(id: usize) -> char {
    u32::try_from(id % 9 + 1)
        .ok()
        .and_then(|d| char::from_digit(d, 10))
        .unwrap_or('?')
}

/// Body glyph for agent `id` (`a`-`z`).
#[must_use]
pub fn body_glyph(id: usize) -> char {
    u8::try_from(id % 26).map_or('?', |offset| char::from(b'a' + offset))
}

/// Board rows as characters, top row first.
///
/// Later layers overwrite earlier ones: food, power-ups, obstacles,
/// bodies, then heads.
#[must_use]
pub fn board_rows(world: &World) -> Vec<Vec<char>> {
    let width = usize::from(world.grid.width());
    let height = usize::from(world.grid.height());
    let mut rows = vec![vec![EMPTY; width]; height];

    let mut put = |x: u16, y: u16, ch: char| {
        if let Some(cell) = rows
            .get_mut(usize::from(y))
            .and_then(|row| row.get_mut(usize::from(x)))
        {
            *cell = ch;
        }
    };

    for &food in world.food.cells() {
        put(food.x, food.y, FOOD);
    }
    for powerup in world.powerups.iter() {
        put(powerup.pos.x, powerup.pos.y, powerup.kind.symbol());
    }
    for pos in world.obstacles.positions() {
        put(pos.x, pos.y, OBSTACLE);
    }
    for agent in &world.agents {
        for cell in agent.body.iter().skip(1) {
            put(cell.x, cell.y, body_glyph(agent.id));
        }
    }
    for agent in &world.agents {
        if let Some(head) = agent.head() {
            put(head.x, head.y, head_glyph(agent.id));
        }
    }

    rows
}

/// One scoreboard line for an agent.
#[must_use]
pub fn agent_summary(agent: &Agent) -> String {
    let state = match agent.life {
        LifeState::Alive if agent.flash > 0 => "alive (respawned)".to_string(),
        LifeState::Alive => "alive".to_string(),
        LifeState::Respawning { countdown } => format!("respawning in {countdown}"),
    };
    let t = agent.timers;
    format!(
        "Agent {}: score {:>3}  len {:>3}  A:{} S:{} M:{}  {state}",
        head_glyph(agent.id),
        agent.score,
        agent.length(),
        t.aggressive,
        t.shielded,
        t.multiplier,
    )
}

/// Render the board followed by a scoreboard.
#[must_use]
pub fn render_ascii(world: &World) -> String {
    let mut out = String::new();
    for row in board_rows(world) {
        out.extend(row);
        out.push('\n');
    }
    out.push('\n');
    for agent in &world.agents {
        let _ = writeln!(out, "{}", agent_summary(agent));
    }
    out
}
