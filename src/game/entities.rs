//! Transient board entities: food, obstacles and power-ups.
//!
//! Each kind lives in its own registry. Spawning always samples from the
//! cells that are free at that moment, so callers pass in the current
//! occupancy and registries are filled one after another.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::trace;

use crate::game::{Coord, Grid};

/// Food pieces kept on the board at all times (while space allows).
pub const FOOD_TARGET: usize = 5;

/// Most obstacles on the board at once.
pub const MAX_OBSTACLES: usize = 10;

/// Most power-ups on the board at once.
pub const MAX_POWERUPS: usize = 5;

/// Effect granted by a power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PowerUpKind {
    /// Win head-on collisions regardless of length.
    Aggressive,
    /// Survive one lost head-on collision.
    Shield,
    /// Double points per food.
    Multiplier,
}

impl PowerUpKind {
    /// Every kind, in draw order.
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Aggressive,
        PowerUpKind::Shield,
        PowerUpKind::Multiplier,
    ];

    /// Single-letter tag used in text output.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            PowerUpKind::Aggressive => 'A',
            PowerUpKind::Shield => 'S',
            PowerUpKind::Multiplier => 'M',
        }
    }
}

/// An entity that sits on one cell and disappears after a number of ticks.
pub trait Timed: Sized {
    /// Range the initial lifetime is drawn from.
    const LIFETIME: RangeInclusive<u32>;

    /// Draw a fresh entity at `pos`.
    fn spawn<R: Rng>(pos: Coord, rng: &mut R) -> Self;

    /// Cell the entity occupies.
    fn position(&self) -> Coord;

    /// Mutable access to the remaining lifetime.
    fn remaining_mut(&mut self) -> &mut u32;
}

/// Impassable block. Entering it kills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Obstacle {
    /// Occupied cell.
    pub pos: Coord,
    /// Ticks until it crumbles.
    pub remaining: u32,
}

impl Timed for Obstacle {
    const LIFETIME: RangeInclusive<u32> = 50..=150;

    fn spawn<R: Rng>(pos: Coord, rng: &mut R) -> Self {
        Self {
            pos,
            remaining: rng.random_range(Self::LIFETIME),
        }
    }

    fn position(&self) -> Coord {
        self.pos
    }

    fn remaining_mut(&mut self) -> &mut u32 {
        &mut self.remaining
    }
}

/// Collectible that starts a timed effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PowerUp {
    /// Occupied cell.
    pub pos: Coord,
    /// Ticks until it vanishes uncollected.
    pub remaining: u32,
    /// Effect granted on pickup.
    pub kind: PowerUpKind,
}

impl Timed for PowerUp {
    const LIFETIME: RangeInclusive<u32> = 100..=200;

    fn spawn<R: Rng>(pos: Coord, rng: &mut R) -> Self {
        let remaining = rng.random_range(Self::LIFETIME);
        let kind = PowerUpKind::ALL
            .choose(rng)
            .copied()
            .unwrap_or(PowerUpKind::Aggressive);
        Self {
            pos,
            remaining,
            kind,
        }
    }

    fn position(&self) -> Coord {
        self.pos
    }

    fn remaining_mut(&mut self) -> &mut u32 {
        &mut self.remaining
    }
}

/// Capped list of timed entities.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: Vec<T>,
    cap: usize,
}

impl<T: Timed> Registry<T> {
    /// Create an empty registry holding at most `cap` entries.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            items: Vec::with_capacity(cap),
            cap,
        }
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Current number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate entries in spawn order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterate occupied cells.
    pub fn positions(&self) -> impl Iterator<Item = Coord> + '_ {
        self.items.iter().map(Timed::position)
    }

    /// True if an entry sits on `cell`.
    #[must_use]
    pub fn contains(&self, cell: Coord) -> bool {
        self.positions().any(|p| p == cell)
    }

    /// Count every lifetime down by one and drop the expired entries.
    ///
    /// Returns how many expired.
    pub fn tick(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain_mut(|item| {
            let remaining = item.remaining_mut();
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
        before - self.items.len()
    }

    /// With chance `probability`, add one entry on a random free cell.
    ///
    /// Nothing happens (and no randomness is drawn) when the registry is
    /// full. A roll that succeeds on a full board is a silent no-op.
    pub fn try_spawn<R: Rng>(
        &mut self,
        grid: &Grid,
        occupied: &HashSet<Coord>,
        probability: f64,
        rng: &mut R,
    ) -> Option<Coord> {
        if self.items.len() >= self.cap {
            return None;
        }
        if rng.random::<f64>() >= probability {
            return None;
        }
        let free = grid.free_cells(occupied);
        let pos = *free.choose(rng)?;
        self.items.push(T::spawn(pos, rng));
        trace!(x = pos.x, y = pos.y, "entity spawned");
        Some(pos)
    }

    /// Insert an entry directly, ignoring the spawn roll.
    ///
    /// Returns `false` if the registry is full.
    pub fn insert(&mut self, item: T) -> bool {
        if self.items.len() >= self.cap {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove and return the entry on `cell`, if any.
    pub fn remove(&mut self, cell: Coord) -> Option<T> {
        let idx = self.items.iter().position(|item| item.position() == cell)?;
        Some(self.items.remove(idx))
    }
}

/// Food on the board. Food never expires; it is only eaten.
#[derive(Debug, Clone)]
pub struct FoodSupply {
    cells: Vec<Coord>,
    target: usize,
}

impl FoodSupply {
    /// Create an empty supply that tops up to `target` pieces.
    #[must_use]
    pub fn new(target: usize) -> Self {
        Self {
            cells: Vec::with_capacity(target),
            target,
        }
    }

    /// Number of pieces the supply is kept at.
    #[must_use]
    pub const fn target(&self) -> usize {
        self.target
    }

    /// Current food cells, oldest first.
    #[must_use]
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Current number of pieces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if no food is on the board.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True if a piece sits on `cell`.
    #[must_use]
    pub fn contains(&self, cell: Coord) -> bool {
        self.cells.contains(&cell)
    }

    /// Remove the piece on `cell`. Returns `true` if there was one.
    pub fn remove(&mut self, cell: Coord) -> bool {
        match self.cells.iter().position(|&c| c == cell) {
            Some(idx) => {
                self.cells.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Place a piece directly. Returns `false` if the supply is full or the
    /// cell already holds food.
    pub fn insert(&mut self, cell: Coord) -> bool {
        if self.cells.len() >= self.target || self.contains(cell) {
            return false;
        }
        self.cells.push(cell);
        true
    }

    /// Add pieces on random free cells until the target is reached or the
    /// board runs out of space. Each new piece is added to `occupied`.
    ///
    /// Returns how many were placed.
    pub fn top_up<R: Rng>(&mut self, grid: &Grid, occupied: &mut HashSet<Coord>, rng: &mut R) -> usize {
        let mut placed = 0;
        while self.cells.len() < self.target {
            let free = grid.free_cells(occupied);
            let Some(&pos) = free.choose(rng) else {
                break;
            };
            occupied.insert(pos);
            self.cells.push(pos);
            placed += 1;
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_obstacle_lifetime_range() {
        let mut rng = rng();
        for _ in 0..200 {
            let obstacle = Obstacle::spawn(Coord::new(1, 1), &mut rng);
            assert!(Obstacle::LIFETIME.contains(&obstacle.remaining));
        }
    }

    #[test]
    fn test_tick_evicts_expired() {
        let mut reg = Registry::new(MAX_OBSTACLES);
        reg.insert(Obstacle { pos: Coord::new(0, 0), remaining: 1 });
        reg.insert(Obstacle { pos: Coord::new(1, 0), remaining: 3 });

        assert_eq!(reg.tick(), 1);
        assert_eq!(reg.len(), 1);
        assert!(reg.contains(Coord::new(1, 0)));
        assert_eq!(reg.iter().next().map(|o| o.remaining), Some(2));
    }

    #[test]
    fn test_try_spawn_respects_cap() {
        let grid = Grid::new(10, 10).unwrap();
        let mut reg: Registry<PowerUp> = Registry::new(2);
        let mut rng = rng();
        let occupied = HashSet::new();

        for _ in 0..10 {
            reg.try_spawn(&grid, &occupied, 1.0, &mut rng);
        }
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_try_spawn_zero_probability() {
        let grid = Grid::new(10, 10).unwrap();
        let mut reg: Registry<Obstacle> = Registry::new(MAX_OBSTACLES);
        let mut rng = rng();
        for _ in 0..1000 {
            assert_eq!(reg.try_spawn(&grid, &HashSet::new(), 0.0, &mut rng), None);
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn test_try_spawn_avoids_occupied() {
        let grid = Grid::new(2, 2).unwrap();
        let occupied: HashSet<Coord> =
            [Coord::new(0, 0), Coord::new(0, 1), Coord::new(1, 0)].into_iter().collect();
        let mut reg: Registry<Obstacle> = Registry::new(MAX_OBSTACLES);
        let pos = reg.try_spawn(&grid, &occupied, 1.0, &mut rng());
        assert_eq!(pos, Some(Coord::new(1, 1)));
    }

    #[test]
    fn test_try_spawn_full_board_is_noop() {
        let grid = Grid::new(2, 2).unwrap();
        let occupied: HashSet<Coord> = grid.cells().collect();
        let mut reg: Registry<PowerUp> = Registry::new(MAX_POWERUPS);
        assert_eq!(reg.try_spawn(&grid, &occupied, 1.0, &mut rng()), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_by_position() {
        let mut reg = Registry::new(MAX_POWERUPS);
        reg.insert(PowerUp {
            pos: Coord::new(4, 4),
            remaining: 100,
            kind: PowerUpKind::Shield,
        });
        assert_eq!(reg.remove(Coord::new(5, 5)), None);
        assert_eq!(reg.remove(Coord::new(4, 4)).map(|p| p.kind), Some(PowerUpKind::Shield));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_food_top_up() {
        let grid = Grid::new(10, 10).unwrap();
        let mut food = FoodSupply::new(FOOD_TARGET);
        let mut occupied = HashSet::new();
        assert_eq!(food.top_up(&grid, &mut occupied, &mut rng()), FOOD_TARGET);
        assert_eq!(food.len(), FOOD_TARGET);

        let unique: HashSet<Coord> = food.cells().iter().copied().collect();
        assert_eq!(unique.len(), FOOD_TARGET);

        assert_eq!(food.top_up(&grid, &mut occupied, &mut rng()), 0);
    }

    #[test]
    fn test_food_top_up_limited_by_space() {
        let grid = Grid::new(2, 1).unwrap();
        let mut food = FoodSupply::new(FOOD_TARGET);
        let mut occupied = HashSet::new();
        assert_eq!(food.top_up(&grid, &mut occupied, &mut rng()), 2);
        assert_eq!(food.len(), 2);
    }

    #[test]
    fn test_food_remove() {
        let mut food = FoodSupply::new(FOOD_TARGET);
        assert!(food.insert(Coord::new(1, 2)));
        assert!(!food.insert(Coord::new(1, 2)));
        assert!(food.remove(Coord::new(1, 2)));
        assert!(!food.remove(Coord::new(1, 2)));
    }
}
