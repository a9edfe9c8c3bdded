//! The turret: aims by rotating a fixed-length vector, fires on a cooldown

use glam::Vec2;

use super::blueprint::Blueprint;
use super::projectile::ProjectileManager;
use crate::consts::{TURRET_AIM_WIDTH_RATE, TURRET_CIRCLE_RATE};
use crate::settings::TurretSettings;
use crate::{from_polar_deg, rotate_deg};

/// Held-key state for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurretInput {
    /// Rotate clockwise (right key)
    pub rotate_cw: bool,
    /// Rotate counter-clockwise (left key)
    pub rotate_ccw: bool,
    pub fire: bool,
}

#[derive(Debug, Clone)]
pub struct Turret {
    /// Spawn cell as (column, row)
    cell: (usize, usize),
    block_size: Vec2,
    /// Muzzle offset from the centre, also the launch velocity
    aim: Vec2,
    /// Time of the last shot in ms
    last_shot: Option<f64>,
    sensitivity_deg: f32,
    min_fire_interval_ms: f64,
}

impl Turret {
    pub fn new(blueprint: &Blueprint, settings: &TurretSettings) -> Self {
        let block_size = blueprint.block_size();
        let aim = from_polar_deg(
            block_size.length() * settings.aim_rate,
            settings.initial_angle_deg,
        );
        Self {
            cell: blueprint.turret_cell(),
            block_size,
            aim,
            last_shot: None,
            sensitivity_deg: settings.aim_sensitivity_deg,
            min_fire_interval_ms: settings.min_fire_interval_ms,
        }
    }

    pub fn aim(&self) -> Vec2 {
        self.aim
    }

    /// Aim angle in degrees, in (-180, 180]
    pub fn angle_deg(&self) -> f32 {
        self.aim.y.atan2(self.aim.x).to_degrees()
    }

    pub fn last_shot(&self) -> Option<f64> {
        self.last_shot
    }

    /// Top-left of the turret cell in screen coordinates
    pub fn render_pos(&self) -> Vec2 {
        Vec2::new(self.cell.0 as f32, self.cell.1 as f32) * self.block_size
    }

    /// Turret centre in screen coordinates
    pub fn center(&self) -> Vec2 {
        self.render_pos() + self.block_size / 2.0
    }

    /// Where projectiles spawn
    pub fn muzzle(&self) -> Vec2 {
        self.center() + self.aim
    }

    pub fn radius(&self) -> f32 {
        self.block_size.length() * TURRET_CIRCLE_RATE
    }

    pub fn aim_width(&self) -> f32 {
        (self.block_size.length() * TURRET_AIM_WIDTH_RATE).floor()
    }

    /// Rotate the aim, no angle limits
    pub fn rotate(&mut self, degrees: f32) {
        self.aim = rotate_deg(self.aim, degrees);
    }

    /// Apply one tick of input; returns the id of a fired projectile
    pub fn update(
        &mut self,
        now_ms: f64,
        input: TurretInput,
        pm: &mut ProjectileManager,
    ) -> Option<u32> {
        if input.rotate_cw {
            self.rotate(self.sensitivity_deg);
        } else if input.rotate_ccw {
            self.rotate(-self.sensitivity_deg);
        }

        if input.fire {
            self.fire(now_ms, pm)
        } else {
            None
        }
    }

    /// Fire unless still cooling down; dropped requests are not queued
    pub fn fire(&mut self, now_ms: f64, pm: &mut ProjectileManager) -> Option<u32> {
        if let Some(last) = self.last_shot {
            if now_ms - last < self.min_fire_interval_ms {
                log::trace!("Fire request dropped, {:.0} ms since last shot", now_ms - last);
                return None;
            }
        }
        self.last_shot = Some(now_ms);
        Some(pm.create(self.muzzle(), self.aim))
    }
}
