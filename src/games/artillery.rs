//! Turret and ballistic projectiles over a blueprint

use glam::Vec2;

use crate::app::{FrameInfo, Game};
use crate::platform::{Key, KeyState};
use crate::renderer::{Drawable, Frame, colors, grid_overlay};
use crate::settings::Settings;
use crate::sim::{Blueprint, Physics, ProjectileManager, Turret, TurretInput};

/// Optional overlays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtilleryOptions {
    /// Latest projectile and counters
    pub debug: bool,
    /// Block grid lines
    pub grid: bool,
    pub fps: bool,
}

/// Right rotates clockwise and wins over left, space fires
pub fn turret_input(keys: &KeyState) -> TurretInput {
    TurretInput {
        rotate_cw: keys.is_down(Key::Right),
        rotate_ccw: keys.is_down(Key::Left),
        fire: keys.is_down(Key::Space),
    }
}

pub struct ArtilleryGame {
    blueprint: Blueprint,
    projectiles: ProjectileManager,
    turret: Turret,
    tick_step_ms: f64,
    options: ArtilleryOptions,
}

impl ArtilleryGame {
    pub fn new(blueprint: Blueprint, settings: &Settings, options: ArtilleryOptions) -> Self {
        let physics = Physics::from_settings(&settings.projectile);
        let turret = Turret::new(&blueprint, &settings.turret);
        log::info!(
            "Artillery on {:?}: {} walls, turret at {:?}, g={} k={}",
            blueprint.name(),
            blueprint.walls().len(),
            blueprint.turret_cell(),
            physics.gravity,
            physics.drag
        );
        Self {
            blueprint,
            projectiles: ProjectileManager::new(physics),
            turret,
            tick_step_ms: settings.projectile.tick_step_ms,
            options,
        }
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn projectiles(&self) -> &ProjectileManager {
        &self.projectiles
    }

    pub fn turret(&self) -> &Turret {
        &self.turret
    }

    fn draw_debug(&self, frame: &mut Frame) {
        let pm = &self.projectiles;
        let mut y = 4.0;
        frame.text(
            Vec2::new(4.0, y),
            format!(
                "angle {:.0}  live {}  fired {}  exploded {}",
                self.turret.angle_deg(),
                pm.len(),
                pm.fired,
                pm.exploded
            ),
            colors::DEBUG_TEXT,
        );
        y += 16.0;
        if let Some(p) = pm.latest() {
            frame.text(
                Vec2::new(4.0, y),
                format!(
                    "#{} p=({:.1}, {:.1}) v=({:.2}, {:.2})",
                    p.id, p.pos.x, p.pos.y, p.vel.x, p.vel.y
                ),
                colors::DEBUG_TEXT,
            );
        }
    }
}

impl Game for ArtilleryGame {
    fn name(&self) -> &'static str {
        "artillery"
    }

    fn tick_step_ms(&self) -> f64 {
        self.tick_step_ms
    }

    fn viewport(&self) -> Vec2 {
        self.blueprint.rect().size()
    }

    fn update(&mut self, now_ms: f64, keys: &KeyState) {
        self.turret
            .update(now_ms, turret_input(keys), &mut self.projectiles);
        self.projectiles.tick(&self.blueprint);
    }

    fn draw(&self, info: &FrameInfo, frame: &mut Frame) {
        if self.options.grid {
            grid_overlay(&self.blueprint, frame);
        }
        self.blueprint.draw(&(), frame);
        for p in self.projectiles.iter() {
            p.draw(&info.interpolation, frame);
        }
        self.turret.draw(&(), frame);

        if self.options.fps {
            let text = match info.fps {
                Some(fps) => format!("{fps} fps"),
                None => "-- fps".to_string(),
            };
            let x = (frame.size.x - 60.0).max(0.0);
            frame.text(Vec2::new(x, 4.0), text, colors::TEXT);
        }
        if self.options.debug {
            self.draw_debug(frame);
        }
    }
}
