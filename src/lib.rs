//! Arcade Lab - fixed-step arcade prototypes
//!
//! Core modules:
//! - `app`: Fixed-step scheduler with interpolated rendering
//! - `sim`: Deterministic simulation (snake grid, projectile physics, turret)
//! - `games`: Snake and artillery applications driven by the scheduler
//! - `renderer`: Backend-agnostic draw lists
//! - `platform`: Clock, input and display collaborator
//! - `settings`: Immutable configuration values

pub mod app;
pub mod games;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use app::{FixedStep, Game, run};
pub use settings::Settings;

use glam::Vec2;

/// Default tuning constants
pub mod consts {
    /// Max simulation steps run per rendered frame
    pub const MAX_FRAMESKIP: u32 = 10;

    /// Snake tick (ms per grid cell)
    pub const SNAKE_TICK_STEP: f64 = 250.0;
    /// Cells per axis
    pub const GRID_SIZE: (i32, i32) = (20, 20);
    /// Cell edge in px
    pub const GRID_STEP: i32 = 30;
    /// Height of the UI strip above the grid
    pub const UI_HEIGHT: i32 = 40;

    /// Projectile tick (ms)
    pub const PROJECTILE_TICK_STEP: f64 = 10.0;
    /// Size of a pixel in meters
    pub const PIXEL_SIZE: f32 = 50.0;
    /// Earth's gravity (m/s²)
    pub const GRAVITY: f32 = 9.78;
    /// Drag constant (negative, proportional to velocity)
    pub const DRAG: f32 = -0.4;
    /// Coefficient of restitution for wall bounces
    pub const RESTITUTION: f32 = 0.45;
    /// Below this speed (px/tick) a projectile is considered at rest
    pub const REST_SPEED: f32 = 0.05;
    pub const PROJECTILE_RADIUS: f32 = 3.0;

    /// Turret defaults
    pub const TURRET_INITIAL_ANGLE: f32 = -45.0;
    pub const TURRET_AIM_SENSITIVITY: f32 = 3.0; // degrees per tick
    pub const TURRET_MIN_FIRE_INTERVAL: f64 = 100.0; // ms
    pub const TURRET_AIM_RATE: f32 = 1.0 / 3.4;
    pub const TURRET_CIRCLE_RATE: f32 = 1.0 / 6.0;
    pub const TURRET_AIM_WIDTH_RATE: f32 = 1.0 / 10.0;
}

/// Rotate a vector by `degrees` (positive is clockwise on screen, y points down)
#[inline]
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Build a vector from a magnitude and an angle in degrees
#[inline]
pub fn from_polar_deg(length: f32, degrees: f32) -> Vec2 {
    let theta = degrees.to_radians();
    Vec2::new(length * theta.cos(), length * theta.sin())
}
