//! Discrete grid the snake lives on
//!
//! Cells are addressed by integer `Point`s in `[0, size)`. Pixel placement
//! (cell edge `step`, vertical `offset` for the UI strip) is only used when
//! turning cells into screen positions.

use std::fmt;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::{FoodPlacement, SnakeSettings};

/// Snake state, doubling as a movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    Stopped,
    Dead,
    Up,
    Down,
    Right,
    Left,
}

impl Direction {
    /// Cell offset applied by one step in this direction
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Stopped | Direction::Dead => (0, 0),
        }
    }

    /// The direction that would reverse into the neck
    pub fn opposite(self) -> Option<Direction> {
        match self {
            Direction::Up => Some(Direction::Down),
            Direction::Down => Some(Direction::Up),
            Direction::Right => Some(Direction::Left),
            Direction::Left => Some(Direction::Right),
            Direction::Stopped | Direction::Dead => None,
        }
    }

    #[inline]
    pub fn is_motion(self) -> bool {
        self.opposite().is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Stopped => "S",
            Direction::Dead => "X",
            Direction::Up => "U",
            Direction::Down => "D",
            Direction::Right => "R",
            Direction::Left => "L",
        }
    }
}

/// A cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent cell in `dir` (the same cell for non-motion states)
    pub fn neighbor(self, dir: Direction) -> Point {
        let (dx, dy) = dir.offset();
        Point::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The snake track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Cells per axis
    pub size: (i32, i32),
    /// Cell edge in px
    pub step: i32,
    /// Vertical pixel offset of the whole grid
    pub offset: i32,
}

impl Grid {
    pub fn new(size: (i32, i32), step: i32, offset: i32) -> Self {
        Self { size, step, offset }
    }

    pub fn from_settings(settings: &SnakeSettings) -> Self {
        Self::new(settings.grid_size, settings.grid_step, settings.ui_height)
    }

    /// Pixel resolution (size × step)
    pub fn resolution(&self) -> (i32, i32) {
        (self.size.0 * self.step, self.size.1 * self.step)
    }

    pub fn cell_count(&self) -> usize {
        (self.size.0.max(0) * self.size.1.max(0)) as usize
    }

    /// Whether the cell lies fully inside the grid
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        (0..self.size.0).contains(&p.x) && (0..self.size.1).contains(&p.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.size.0 / 2, self.size.1 / 2)
    }

    /// Top-left corner of a cell in screen coordinates
    pub fn render_pos(&self, p: Point) -> Vec2 {
        Vec2::new(
            (p.x * self.step) as f32,
            (p.y * self.step + self.offset) as f32,
        )
    }

    pub fn cell_size(&self) -> Vec2 {
        Vec2::splat(self.step as f32)
    }

    pub fn random_point<R: Rng>(&self, rng: &mut R) -> Point {
        Point::new(
            rng.random_range(0..self.size.0),
            rng.random_range(0..self.size.1),
        )
    }

    /// All cells, row-major
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.size.1).flat_map(move |y| (0..self.size.0).map(move |x| Point::new(x, y)))
    }
}

/// The food target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apple {
    pub p: Point,
}

impl Apple {
    pub fn new(p: Point) -> Self {
        Self { p }
    }

    /// Move the apple to a new random cell
    ///
    /// `occupied` is only consulted for `FoodPlacement::AvoidSnake`; with no
    /// free cell left the apple lands anywhere.
    pub fn respawn<R, F>(
        &mut self,
        grid: &Grid,
        rng: &mut R,
        placement: FoodPlacement,
        occupied: F,
    ) where
        R: Rng,
        F: Fn(Point) -> bool,
    {
        self.p = match placement {
            FoodPlacement::Anywhere => grid.random_point(rng),
            FoodPlacement::AvoidSnake => {
                let free: Vec<Point> = grid.cells().filter(|p| !occupied(*p)).collect();
                if free.is_empty() {
                    grid.random_point(rng)
                } else {
                    free[rng.random_range(0..free.len())]
                }
            }
        };
    }
}

impl fmt::Display for Apple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Apple: p={}", self.p)
    }
}
