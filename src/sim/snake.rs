//! Snake state machine
//!
//! The body is a deque with the head at the front. Every moving tick pushes a
//! new head one cell in the current direction, then either keeps the tail
//! (apple eaten, the snake grows) or pops it (length unchanged). Turning is
//! buffered: input only sets `next_state`, which becomes current at the next
//! tick boundary.

use std::collections::VecDeque;
use std::fmt;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::{Apple, Direction, Grid, Point};
use crate::settings::{FoodPlacement, SnakeSettings};

/// One body cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub p: Point,
}

/// Why the snake died
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Head ran into the body
    SelfCollision,
    /// Head left the grid
    OutOfBounds,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Stopped, nothing moved
    Idle,
    Moved,
    /// Moved onto the apple and grew by one segment
    Ate,
    /// Died on this tick
    Died(DeathCause),
    /// Already dead, tick ignored
    Dead,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    /// Head first, tail last, never empty
    body: VecDeque<Segment>,
    state: Direction,
    /// State after handling input, applied on the next tick
    next_state: Direction,
}

impl Snake {
    pub fn new(start: Point) -> Self {
        Self {
            body: VecDeque::from([Segment { p: start }]),
            state: Direction::Stopped,
            next_state: Direction::Stopped,
        }
    }

    pub fn head(&self) -> Point {
        self.body[0].p
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Never true, the body always keeps its head
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.body.iter()
    }

    pub fn state(&self) -> Direction {
        self.state
    }

    pub fn next_state(&self) -> Direction {
        self.next_state
    }

    pub fn is_dead(&self) -> bool {
        self.state == Direction::Dead
    }

    pub fn occupies(&self, p: Point) -> bool {
        self.body.iter().any(|s| s.p == p)
    }

    /// Buffer a turn for the next tick
    ///
    /// Rejected when it would reverse into the neck, when it is not a motion
    /// direction, or once the snake is dead. Returns whether it was accepted.
    pub fn steer(&mut self, dir: Direction) -> bool {
        if self.is_dead() || !dir.is_motion() {
            return false;
        }
        if self.state.opposite() == Some(dir) {
            return false;
        }
        self.next_state = dir;
        true
    }

    /// Advance one tick against the grid and the current food cell
    ///
    /// On death the body keeps its last valid cells; `Dead` is sticky.
    pub fn step(&mut self, grid: &Grid, food: Point) -> StepOutcome {
        if self.is_dead() {
            return StepOutcome::Dead;
        }

        self.state = self.next_state;
        if !self.state.is_motion() {
            return StepOutcome::Idle;
        }

        let new_head = self.head().neighbor(self.state);
        if let Some(cause) = self.collision(grid, new_head) {
            self.state = Direction::Dead;
            self.next_state = Direction::Dead;
            return StepOutcome::Died(cause);
        }

        self.body.push_front(Segment { p: new_head });
        if new_head == food {
            // Keep the tail, we grow
            return StepOutcome::Ate;
        }

        self.body.pop_back();
        StepOutcome::Moved
    }

    /// Self collision is checked before bounds
    fn collision(&self, grid: &Grid, new_head: Point) -> Option<DeathCause> {
        if self.occupies(new_head) {
            Some(DeathCause::SelfCollision)
        } else if !grid.contains(new_head) {
            Some(DeathCause::OutOfBounds)
        } else {
            None
        }
    }
}

impl fmt::Display for Snake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.head();
        write!(f, "Snake: x={} y={} B={}", head.x, head.y, self.len())
    }
}

/// Grid, snake and apple, advanced together
#[derive(Debug, Clone)]
pub struct SnakeWorld {
    pub grid: Grid,
    pub snake: Snake,
    pub apple: Apple,
    placement: FoodPlacement,
    rng: Pcg32,
    /// Ticks simulated so far
    pub ticks: u64,
    pub apples_eaten: u32,
}

impl SnakeWorld {
    pub fn new(settings: &SnakeSettings, seed: u64) -> Self {
        let grid = Grid::from_settings(settings);
        let start = settings
            .start
            .map(|(x, y)| Point::new(x, y))
            .filter(|p| grid.contains(*p))
            .unwrap_or_else(|| grid.center());
        let snake = Snake::new(start);

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut apple = Apple::new(start);
        apple.respawn(&grid, &mut rng, settings.food_placement, |p| snake.occupies(p));

        Self {
            grid,
            snake,
            apple,
            placement: settings.food_placement,
            rng,
            ticks: 0,
            apples_eaten: 0,
        }
    }

    /// Forward a direction request to the snake
    pub fn steer(&mut self, dir: Direction) -> bool {
        self.snake.steer(dir)
    }

    /// Advance the whole world by one tick
    pub fn tick(&mut self) -> StepOutcome {
        self.ticks += 1;
        let outcome = self.snake.step(&self.grid, self.apple.p);
        match outcome {
            StepOutcome::Ate => {
                self.apples_eaten += 1;
                let snake = &self.snake;
                self.apple
                    .respawn(&self.grid, &mut self.rng, self.placement, |p| snake.occupies(p));
                log::info!("Apple eaten, length {} ({})", self.snake.len(), self.apple);
            }
            StepOutcome::Died(cause) => {
                log::info!(
                    "Snake died ({:?}) at {} with length {}",
                    cause,
                    self.snake.head(),
                    self.snake.len()
                );
            }
            _ => {}
        }
        outcome
    }
}
