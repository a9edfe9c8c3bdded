//! Drawable representations of the simulation entities

use glam::Vec2;

use super::{Color, Frame, colors};
use crate::sim::{Apple, Blueprint, Grid, Projectile, Segment, Snake, Turret};

/// Anything that can add itself to a frame
///
/// `Context` carries whatever the entity needs to find its place on screen
/// (the grid for cell entities, the interpolation factor for moving ones).
pub trait Drawable {
    type Context;

    fn draw(&self, ctx: &Self::Context, frame: &mut Frame);
}

impl Drawable for Segment {
    /// The segment colour depends on the whole snake
    type Context = (Grid, Color);

    fn draw(&self, (grid, color): &(Grid, Color), frame: &mut Frame) {
        frame.rect(grid.render_pos(self.p), grid.cell_size(), *color);
    }
}

impl Drawable for Snake {
    type Context = Grid;

    fn draw(&self, grid: &Grid, frame: &mut Frame) {
        let color = if self.is_dead() {
            colors::SNAKE_DEAD
        } else {
            colors::SNAKE
        };
        let style = (*grid, color);
        for segment in self.segments() {
            segment.draw(&style, frame);
        }
    }
}

impl Drawable for Apple {
    type Context = Grid;

    fn draw(&self, grid: &Grid, frame: &mut Frame) {
        frame.rect(grid.render_pos(self.p), grid.cell_size(), colors::APPLE);
    }
}

impl Drawable for Projectile {
    /// Interpolation factor in [0, 1]
    type Context = f32;

    fn draw(&self, interpolation: &f32, frame: &mut Frame) {
        frame.circle(
            self.render_position(*interpolation),
            self.radius,
            colors::PROJECTILE,
        );
    }
}

impl Drawable for Turret {
    type Context = ();

    fn draw(&self, _: &(), frame: &mut Frame) {
        frame.circle(self.center(), self.radius(), colors::TURRET);
        frame.line(self.center(), self.muzzle(), self.aim_width(), colors::TURRET);
    }
}

impl Drawable for Blueprint {
    type Context = ();

    fn draw(&self, _: &(), frame: &mut Frame) {
        for wall in self.walls() {
            frame.rect(wall.min, wall.size(), colors::WALL);
        }
    }
}

/// One line per block edge across the whole blueprint
pub fn grid_overlay(blueprint: &Blueprint, frame: &mut Frame) {
    let size = blueprint.rect().size();
    let block = blueprint.block_size();
    for col in 0..=blueprint.width() {
        let x = col as f32 * block.x;
        frame.line(Vec2::new(x, 0.0), Vec2::new(x, size.y), 1.0, colors::GRID_LINE);
    }
    for row in 0..=blueprint.height() {
        let y = row as f32 * block.y;
        frame.line(Vec2::new(0.0, y), Vec2::new(size.x, y), 1.0, colors::GRID_LINE);
    }
}
