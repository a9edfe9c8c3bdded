//! Game settings
//!
//! Every tunable lives here as a plain value handed to constructors. Files are
//! JSON; missing sections and fields fall back to the defaults in `consts`.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Failure to read a settings file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Rejects zero, negative and NaN
fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

/// Where a respawned apple may land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FoodPlacement {
    /// Any cell, including cells under the snake
    #[default]
    Anywhere,
    /// Only cells not occupied by the snake (any cell once the board is full)
    AvoidSnake,
}

impl FoodPlacement {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodPlacement::Anywhere => "anywhere",
            FoodPlacement::AvoidSnake => "avoid_snake",
        }
    }
}

/// What happens when a projectile touches a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WallResponse {
    /// The projectile explodes on contact
    Explode,
    /// The projectile bounces, damped by the restitution coefficient
    #[default]
    Reflect,
}

/// Scheduler settings shared by both games
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopSettings {
    /// Upper bound on catch-up steps per rendered frame
    pub max_frameskip: u32,
    /// Render rate cap in frames per second (None = uncapped)
    pub frame_cap: Option<u32>,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            max_frameskip: MAX_FRAMESKIP,
            frame_cap: Some(60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeSettings {
    /// Milliseconds per simulation step (how long it takes to move one cell)
    pub tick_step_ms: f64,
    /// Number of cells per axis
    pub grid_size: (i32, i32),
    /// Cell edge length in px
    pub grid_step: i32,
    /// Vertical offset of the grid (UI strip height)
    pub ui_height: i32,
    /// Initial head cell (None = grid centre)
    pub start: Option<(i32, i32)>,
    pub food_placement: FoodPlacement,
    /// RNG seed for apple placement (None = seeded from the clock)
    pub seed: Option<u64>,
}

impl Default for SnakeSettings {
    fn default() -> Self {
        Self {
            tick_step_ms: SNAKE_TICK_STEP,
            grid_size: GRID_SIZE,
            grid_step: GRID_STEP,
            ui_height: UI_HEIGHT,
            start: None,
            food_placement: FoodPlacement::Anywhere,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSettings {
    /// Milliseconds per simulation step
    pub tick_step_ms: f64,
    /// Size of a pixel in meters
    pub pixel_size: f32,
    /// Gravity in m/s² (positive is down)
    pub gravity: f32,
    /// Drag constant, negative
    pub drag: f32,
    /// Coefficient of restitution applied on each bounce
    pub restitution: f32,
    /// Speed (px/tick) under which a projectile is at rest (None = never)
    pub rest_speed: Option<f32>,
    /// Detonation timer in ticks (None = no fuse)
    pub fuse_ticks: Option<u32>,
    pub radius: f32,
    pub wall_response: WallResponse,
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self {
            tick_step_ms: PROJECTILE_TICK_STEP,
            pixel_size: PIXEL_SIZE,
            gravity: GRAVITY,
            drag: DRAG,
            restitution: RESTITUTION,
            rest_speed: Some(REST_SPEED),
            fuse_ticks: None,
            radius: PROJECTILE_RADIUS,
            wall_response: WallResponse::Reflect,
        }
    }
}

impl ProjectileSettings {
    /// Multiplier that turns physical constants into per-tick pixel units
    pub fn speed_constant(&self) -> f32 {
        1.0 / self.tick_step_ms as f32 / self.pixel_size
    }

    /// Gravity as a per-tick acceleration vector
    pub fn gravity_per_tick(&self) -> Vec2 {
        Vec2::new(0.0, self.gravity * self.speed_constant())
    }

    /// Drag coefficient applied to the velocity each tick
    pub fn drag_per_tick(&self) -> f32 {
        self.drag * self.speed_constant()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretSettings {
    /// Initial aim angle in degrees
    pub initial_angle_deg: f32,
    /// Aim rotation per tick in degrees
    pub aim_sensitivity_deg: f32,
    pub min_fire_interval_ms: f64,
    /// Aim magnitude as a fraction of the block diagonal
    pub aim_rate: f32,
}

impl Default for TurretSettings {
    fn default() -> Self {
        Self {
            initial_angle_deg: TURRET_INITIAL_ANGLE,
            aim_sensitivity_deg: TURRET_AIM_SENSITIVITY,
            min_fire_interval_ms: TURRET_MIN_FIRE_INTERVAL,
            aim_rate: TURRET_AIM_RATE,
        }
    }
}

/// All game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "loop")]
    pub looping: LoopSettings,
    pub snake: SnakeSettings,
    pub projectile: ProjectileSettings,
    pub turret: TurretSettings,
}

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the games cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.looping.max_frameskip == 0 {
            return Err(invalid("loop.max_frameskip", "must be at least 1"));
        }

        let snake = &self.snake;
        positive("snake.tick_step_ms", snake.tick_step_ms)?;
        let (cols, rows) = snake.grid_size;
        if cols < 1 || rows < 1 {
            let reason = format!("needs at least one cell per axis, got {cols}x{rows}");
            return Err(invalid("snake.grid_size", reason));
        }
        positive("snake.grid_step", snake.grid_step as f64)?;

        let projectile = &self.projectile;
        positive("projectile.tick_step_ms", projectile.tick_step_ms)?;
        positive("projectile.pixel_size", projectile.pixel_size as f64)?;
        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings if a path is given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(
            r#"{ "snake": { "tick_step_ms": 100.0, "food_placement": "avoid_snake" } }"#,
        )
        .unwrap();
        assert_eq!(settings.snake.tick_step_ms, 100.0);
        assert_eq!(settings.snake.food_placement, FoodPlacement::AvoidSnake);
        assert_eq!(settings.snake.grid_size, GRID_SIZE);
        assert_eq!(settings.looping.max_frameskip, MAX_FRAMESKIP);
        assert_eq!(settings.projectile.wall_response, WallResponse::Reflect);
    }

    #[test]
    fn test_loop_section_name() {
        let settings = Settings::from_json(r#"{ "loop": { "max_frameskip": 3 } }"#).unwrap();
        assert_eq!(settings.looping.max_frameskip, 3);
        assert_eq!(settings.looping.frame_cap, Some(60));
    }

    #[test]
    fn test_malformed_json() {
        let err = Settings::from_json("{ snake: }").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    fn rejected_field(json: &str) -> &'static str {
        match Settings::from_json(json) {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected an invalid setting, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_empty_grid_rejected() {
        let field = rejected_field(r#"{ "snake": { "grid_size": [0, 15] } }"#);
        assert_eq!(field, "snake.grid_size");
        let field = rejected_field(r#"{ "snake": { "grid_size": [20, -1] } }"#);
        assert_eq!(field, "snake.grid_size");
    }

    #[test]
    fn test_grid_step_rejected() {
        assert_eq!(rejected_field(r#"{ "snake": { "grid_step": 0 } }"#), "snake.grid_step");
        assert_eq!(rejected_field(r#"{ "snake": { "grid_step": -20 } }"#), "snake.grid_step");
    }

    #[test]
    fn test_tick_steps_rejected() {
        let field = rejected_field(r#"{ "snake": { "tick_step_ms": 0.0 } }"#);
        assert_eq!(field, "snake.tick_step_ms");
        let field = rejected_field(r#"{ "projectile": { "tick_step_ms": -10.0 } }"#);
        assert_eq!(field, "projectile.tick_step_ms");
    }

    #[test]
    fn test_zero_frameskip_rejected() {
        let field = rejected_field(r#"{ "loop": { "max_frameskip": 0 } }"#);
        assert_eq!(field, "loop.max_frameskip");
    }

    #[test]
    fn test_pixel_size_rejected() {
        let field = rejected_field(r#"{ "projectile": { "pixel_size": 0.0 } }"#);
        assert_eq!(field, "projectile.pixel_size");
    }

    #[test]
    fn test_load_validates() {
        let name = format!("arcade-lab-cfg-{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, r#"{ "loop": { "max_frameskip": 0 } }"#).unwrap();
        let err = Settings::load(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(err.to_string().contains("loop.max_frameskip"));
    }

    #[test]
    fn test_per_tick_constants() {
        let p = ProjectileSettings::default();
        // 1 / 10ms / 50 px-per-meter
        assert!((p.speed_constant() - 0.002).abs() < 1e-7);
        assert!((p.gravity_per_tick().y - 9.78 * 0.002).abs() < 1e-6);
        assert!(p.drag_per_tick() < 0.0);
    }
}
