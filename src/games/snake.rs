//! Grid snake

use glam::Vec2;

use crate::app::{FrameInfo, Game};
use crate::platform::{InputEvent, Key, KeyState};
use crate::renderer::{Drawable, Frame, colors};
use crate::settings::SnakeSettings;
use crate::sim::{Direction, SnakeWorld, StepOutcome};

/// Arrow keys steer, everything else is ignored
pub fn direction_for(key: Key) -> Option<Direction> {
    match key {
        Key::Up => Some(Direction::Up),
        Key::Down => Some(Direction::Down),
        Key::Left => Some(Direction::Left),
        Key::Right => Some(Direction::Right),
        Key::Space | Key::Q => None,
    }
}

pub struct SnakeGame {
    world: SnakeWorld,
    tick_step_ms: f64,
    debug: bool,
    last_outcome: StepOutcome,
}

impl SnakeGame {
    pub fn new(settings: &SnakeSettings, seed: u64, debug: bool) -> Self {
        let world = SnakeWorld::new(settings, seed);
        log::info!(
            "Snake on a {}x{} grid, seed {}, food {}",
            world.grid.size.0,
            world.grid.size.1,
            seed,
            settings.food_placement.as_str()
        );
        Self {
            world,
            tick_step_ms: settings.tick_step_ms,
            debug,
            last_outcome: StepOutcome::Idle,
        }
    }

    pub fn world(&self) -> &SnakeWorld {
        &self.world
    }

    pub fn last_outcome(&self) -> StepOutcome {
        self.last_outcome
    }
}

impl Game for SnakeGame {
    fn name(&self) -> &'static str {
        "snake"
    }

    fn tick_step_ms(&self) -> f64 {
        self.tick_step_ms
    }

    fn viewport(&self) -> Vec2 {
        let (w, h) = self.world.grid.resolution();
        Vec2::new(w as f32, (h + self.world.grid.offset) as f32)
    }

    fn handle_event(&mut self, event: &InputEvent) {
        if let InputEvent::KeyDown(key) = *event {
            if let Some(dir) = direction_for(key) {
                if !self.world.steer(dir) {
                    log::trace!("Turn {} rejected", dir.as_str());
                }
            }
        }
    }

    fn update(&mut self, _now_ms: f64, _keys: &KeyState) {
        self.last_outcome = self.world.tick();
    }

    fn draw(&self, info: &FrameInfo, frame: &mut Frame) {
        let grid = &self.world.grid;
        let width = grid.resolution().0 as f32;
        frame.rect(Vec2::ZERO, Vec2::new(width, grid.offset as f32), colors::UI_STRIP);

        let status = if self.world.snake.is_dead() {
            format!("GAME OVER  length {}", self.world.snake.len())
        } else {
            format!("Length {}", self.world.snake.len())
        };
        frame.text(Vec2::new(4.0, 4.0), status, colors::TEXT);

        if self.debug {
            let mut line = format!("{}  {}", self.world.snake, self.world.apple);
            if let Some(fps) = info.fps {
                line.push_str(&format!("  {fps} fps"));
            }
            frame.text(Vec2::new(4.0, 20.0), line, colors::DEBUG_TEXT);
        }

        self.world.apple.draw(grid, frame);
        self.world.snake.draw(grid, frame);
    }
}
