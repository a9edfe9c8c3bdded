//! Backend-agnostic rendering
//!
//! Games build a [`Frame`]: a flat list of shapes in screen pixels, drawn in
//! order. The platform decides how to put it on a display.

pub mod shapes;

use glam::Vec2;

pub use shapes::{Drawable, grid_overlay};

/// RGBA, components in 0..=1
pub type Color = [f32; 4];

/// Color palette
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.0, 0.0, 0.0, 1.0];
    pub const UI_STRIP: Color = [0.1, 0.1, 0.1, 1.0];
    pub const TEXT: Color = [1.0, 1.0, 1.0, 1.0];
    pub const DEBUG_TEXT: Color = [0.8, 0.8, 0.3, 1.0];
    pub const SNAKE: Color = [0.2, 0.8, 0.4, 1.0];
    pub const SNAKE_DEAD: Color = [0.5, 0.5, 0.5, 1.0];
    pub const APPLE: Color = [1.0, 0.0, 0.0, 1.0];
    pub const WALL: Color = [0.3, 0.3, 0.4, 1.0];
    pub const GRID_LINE: Color = [0.2, 0.2, 0.25, 1.0];
    pub const TURRET: Color = [0.4, 0.7, 1.0, 1.0];
    pub const PROJECTILE: Color = [1.0, 1.0, 1.0, 1.0];
}

/// One primitive, screen coordinates in px
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect { min: Vec2, size: Vec2, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    Line { from: Vec2, to: Vec2, width: f32, color: Color },
    /// Single line of text, `pos` is the top-left corner
    Text { pos: Vec2, text: String, color: Color },
}

/// Everything shown for one render call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Logical resolution in px
    pub size: Vec2,
    pub background: Color,
    pub shapes: Vec<Shape>,
}

impl Frame {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            background: colors::BACKGROUND,
            shapes: Vec::new(),
        }
    }

    /// Drop all shapes, keep size and background
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.push(Shape::Rect { min, size, color });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(Shape::Circle {
            center,
            radius,
            color,
        });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.push(Shape::Line {
            from,
            to,
            width,
            color,
        });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, color: Color) {
        self.push(Shape::Text {
            pos,
            text: text.into(),
            color,
        });
    }

    /// All text shapes in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}
