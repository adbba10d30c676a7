//! Board coordinates, directions and the grid.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{ConfigError, ConfigResult};

/// Board width in cells.
pub const GRID_WIDTH: u16 = 50;

/// Board height in cells.
pub const GRID_HEIGHT: u16 = 50;

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row, growing downwards).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `dir`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant;
    /// the upper bound is the grid's business.
    #[must_use]
    #[inline]
    pub fn step(self, dir: Direction) -> Option<Coord> {
        let (dx, dy) = dir.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Coord::new(x, y))
    }

    /// Manhattan distance to `other`.
    #[must_use]
    #[inline]
    pub fn manhattan(self, other: Coord) -> u32 {
        u32::from(self.x.abs_diff(other.x)) + u32::from(self.y.abs_diff(other.y))
    }
}

/// One of the four unit moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// +x
    Right,
    /// -x
    Left,
    /// +y
    Down,
    /// -y
    Up,
}

impl Direction {
    /// All directions in evaluation order. Heuristic ties resolve to the
    /// earliest entry.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    /// Unit offset for this direction.
    #[must_use]
    pub const fn delta(self) -> (i16, i16) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Up => (0, -1),
        }
    }
}

/// Fixed rectangular board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
}

impl Grid {
    /// Create a grid of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyGrid`] if either dimension is zero.
    pub fn new(width: u16, height: u16) -> ConfigResult<Self> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        Ok(Self { width, height })
    }

    /// The standard 50x50 arena.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
        }
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Check if a coordinate is on the board.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// One step from `from` in `dir`, if it stays on the board.
    #[must_use]
    #[inline]
    pub fn neighbor(&self, from: Coord, dir: Direction) -> Option<Coord> {
        from.step(dir).filter(|&c| self.in_bounds(c))
    }

    /// Iterate every cell, column by column.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let height = self.height;
        (0..self.width).flat_map(move |x| (0..height).map(move |y| Coord::new(x, y)))
    }

    /// All cells not in `occupied`, in column-major order.
    #[must_use]
    pub fn free_cells(&self, occupied: &HashSet<Coord>) -> Vec<Coord> {
        self.cells().filter(|c| !occupied.contains(c)).collect()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_and_bounds() {
        let grid = Grid::new(10, 10).unwrap();
        let origin = Coord::new(0, 0);
        assert_eq!(origin.step(Direction::Left), None);
        assert_eq!(origin.step(Direction::Up), None);
        assert_eq!(grid.neighbor(origin, Direction::Right), Some(Coord::new(1, 0)));
        assert_eq!(grid.neighbor(origin, Direction::Down), Some(Coord::new(0, 1)));

        let corner = Coord::new(9, 9);
        assert_eq!(grid.neighbor(corner, Direction::Right), None);
        assert_eq!(grid.neighbor(corner, Direction::Down), None);
    }

    #[test]
    fn test_grid_zero_size() {
        assert!(Grid::new(0, 10).is_err());
        assert!(Grid::new(10, 0).is_err());
    }

    #[test]
    fn test_in_bounds() {
        let grid = Grid::standard();
        assert!(grid.in_bounds(Coord::new(0, 0)));
        assert!(grid.in_bounds(Coord::new(49, 49)));
        assert!(!grid.in_bounds(Coord::new(50, 0)));
        assert!(!grid.in_bounds(Coord::new(0, 50)));
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(Coord::new(1, 1).manhattan(Coord::new(4, 5)), 7);
        assert_eq!(Coord::new(4, 5).manhattan(Coord::new(1, 1)), 7);
        assert_eq!(Coord::new(3, 3).manhattan(Coord::new(3, 3)), 0);
    }

    #[test]
    fn test_free_cells_excludes_occupied() {
        let grid = Grid::new(3, 2).unwrap();
        let occupied: HashSet<Coord> = [Coord::new(0, 0), Coord::new(2, 1)].into_iter().collect();
        let free = grid.free_cells(&occupied);
        assert_eq!(free.len(), 4);
        assert!(!free.contains(&Coord::new(0, 0)));
        assert!(!free.contains(&Coord::new(2, 1)));
        assert_eq!(free[0], Coord::new(0, 1));
    }

    #[test]
    fn test_free_cells_full_board() {
        let grid = Grid::new(2, 2).unwrap();
        let occupied: HashSet<Coord> = grid.cells().collect();
        assert!(grid.free_cells(&occupied).is_empty());
    }
}
