//! Projectile physics
//!
//! Semi-implicit Euler with gravity and drag proportional to velocity, all in
//! per-tick pixel units. Every tick either leaves the projectile flying,
//! bounces it off a wall, or reports why it exploded so the manager can drop
//! it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::blueprint::Blueprint;
use super::collision::{Rect, bounce, find_contact};
use crate::settings::{ProjectileSettings, WallResponse};

/// Why a projectile was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplodeCause {
    /// Detonation timer elapsed
    Fuse,
    /// Slowed down to (almost) nothing
    AtRest,
    /// Left the playfield
    OutOfBounds,
    /// Touched a wall with `WallResponse::Explode`
    Wall,
}

/// Result of one physics tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileStatus {
    Flying,
    /// Reflected off wall number `wall`
    Bounced { wall: usize },
    Exploded(ExplodeCause),
}

/// Per-tick physical constants
#[derive(Debug, Clone, PartialEq)]
pub struct Physics {
    /// Acceleration added every tick
    pub gravity: Vec2,
    /// Fraction of the velocity added every tick (negative)
    pub drag: f32,
    pub restitution: f32,
    pub rest_speed: Option<f32>,
    pub fuse_ticks: Option<u32>,
    pub radius: f32,
    pub wall_response: WallResponse,
}

impl Physics {
    pub fn from_settings(settings: &ProjectileSettings) -> Self {
        Self {
            gravity: settings.gravity_per_tick(),
            drag: settings.drag_per_tick(),
            restitution: settings.restitution,
            rest_speed: settings.rest_speed,
            fuse_ticks: settings.fuse_ticks,
            radius: settings.radius,
            wall_response: settings.wall_response,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Screen position in px
    pub pos: Vec2,
    /// px per tick
    pub vel: Vec2,
    pub radius: f32,
    pub age_ticks: u32,
    pub bounces: u32,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            age_ticks: 0,
            bounces: 0,
        }
    }

    /// Bounding square used against walls
    pub fn bounds(&self) -> Rect {
        Rect::around(self.pos, self.radius)
    }

    /// Advance one tick
    pub fn step(&mut self, physics: &Physics, blueprint: &Blueprint) -> ProjectileStatus {
        // Drag from the previous tick's velocity
        let drag = self.vel * physics.drag;
        self.vel += physics.gravity + drag;
        self.pos += self.vel;
        self.age_ticks += 1;

        if physics.fuse_ticks.is_some_and(|fuse| self.age_ticks >= fuse) {
            return ProjectileStatus::Exploded(ExplodeCause::Fuse);
        }
        if physics.rest_speed.is_some_and(|rest| self.vel.length() < rest) {
            return ProjectileStatus::Exploded(ExplodeCause::AtRest);
        }
        if !blueprint.rect().contains_point(self.pos) {
            return ProjectileStatus::Exploded(ExplodeCause::OutOfBounds);
        }

        let walls = blueprint.walls();
        let open = |wall: usize, face| blueprint.face_open(wall, face);
        let Some(contact) = find_contact(walls, &self.bounds(), self.pos, open) else {
            return ProjectileStatus::Flying;
        };
        match physics.wall_response {
            WallResponse::Explode => ProjectileStatus::Exploded(ExplodeCause::Wall),
            WallResponse::Reflect => {
                let normal = contact.normal();
                self.pos += normal * contact.depth;
                // Already leaving the face: the push-out is enough
                if self.vel.dot(normal) < 0.0 {
                    self.vel = bounce(self.vel, normal, physics.restitution);
                    self.bounces += 1;
                    ProjectileStatus::Bounced { wall: contact.wall }
                } else {
                    ProjectileStatus::Flying
                }
            }
        }
    }

    /// Position blended toward the predicted next position
    pub fn render_position(&self, interpolation: f32) -> Vec2 {
        self.pos.lerp(self.pos + self.vel, interpolation)
    }
}

/// Owns every live projectile
#[derive(Debug, Clone)]
pub struct ProjectileManager {
    physics: Physics,
    /// Sorted by id
    projectiles: Vec<Projectile>,
    next_id: u32,
    /// Last known state of the most recently fired projectile
    latest: Option<Projectile>,
    pub fired: u64,
    pub exploded: u64,
}

impl ProjectileManager {
    pub fn new(physics: Physics) -> Self {
        Self {
            physics,
            projectiles: Vec::new(),
            next_id: 1,
            latest: None,
            fired: 0,
            exploded: 0,
        }
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    /// Spawn a projectile, returning its id
    pub fn create(&mut self, pos: Vec2, vel: Vec2) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let projectile = Projectile::new(id, pos, vel, self.physics.radius);
        log::debug!("Projectile {} fired from {} at {}", id, pos, vel);
        self.latest = Some(projectile.clone());
        self.projectiles.push(projectile);
        self.fired += 1;
        id
    }

    /// Advance every projectile; returns the ones removed this tick
    pub fn tick(&mut self, blueprint: &Blueprint) -> Vec<(u32, ExplodeCause)> {
        let physics = &self.physics;
        let latest_id = self.latest.as_ref().map(|p| p.id);
        let mut latest = None;
        let mut removed = Vec::new();

        self.projectiles.retain_mut(|proj| {
            let status = proj.step(physics, blueprint);
            if Some(proj.id) == latest_id {
                latest = Some(proj.clone());
            }
            match status {
                ProjectileStatus::Exploded(cause) => {
                    log::debug!("Projectile {} exploded ({:?}) at {}", proj.id, cause, proj.pos);
                    removed.push((proj.id, cause));
                    false
                }
                ProjectileStatus::Bounced { .. } | ProjectileStatus::Flying => true,
            }
        });

        if latest.is_some() {
            self.latest = latest;
        }
        self.exploded += removed.len() as u64;
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Most recently fired projectile, as last simulated (kept after removal)
    pub fn latest(&self) -> Option<&Projectile> {
        self.latest.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 400x300 open field, turret in the corner, no walls
    fn open_field() -> Blueprint {
        let row = " ".repeat(40);
        let mut terrain = vec![row.clone(); 30];
        terrain[0] = format!("H{}", " ".repeat(39));
        let json = serde_json::json!({
            "name": "open",
            "block": { "width": 10, "height": 10 },
            "terrain": terrain,
        });
        Blueprint::from_json(&json.to_string()).unwrap()
    }

    /// Open field with a floor of walls on the last row
    fn floored() -> Blueprint {
        let mut terrain = vec![" ".repeat(40); 30];
        terrain[0] = format!("H{}", " ".repeat(39));
        terrain[29] = "|".repeat(40);
        let json = serde_json::json!({
            "name": "floor",
            "block": { "width": 10, "height": 10 },
            "terrain": terrain,
        });
        Blueprint::from_json(&json.to_string()).unwrap()
    }

    /// Open field with a vertical wall at column 20, rows 10 to 19
    fn pillar() -> Blueprint {
        let mut terrain = vec![" ".repeat(40); 30];
        terrain[0] = format!("H{}", " ".repeat(39));
        for row in &mut terrain[10..20] {
            row.replace_range(20..21, "|");
        }
        let json = serde_json::json!({
            "name": "pillar",
            "block": { "width": 10, "height": 10 },
            "terrain": terrain,
        });
        Blueprint::from_json(&json.to_string()).unwrap()
    }

    fn ballistic() -> Physics {
        Physics {
            gravity: Vec2::new(0.0, 1.0),
            drag: 0.0,
            restitution: 0.45,
            rest_speed: None,
            fuse_ticks: None,
            radius: 3.0,
            wall_response: WallResponse::Reflect,
        }
    }

    #[test]
    fn test_semi_implicit_euler() {
        let bp = open_field();
        let mut p = Projectile::new(1, Vec2::new(100.0, 100.0), Vec2::new(10.0, -10.0), 3.0);
        assert_eq!(p.step(&ballistic(), &bp), ProjectileStatus::Flying);
        // Velocity updated before position
        assert_eq!(p.vel, Vec2::new(10.0, -9.0));
        assert_eq!(p.pos, Vec2::new(110.0, 91.0));
    }

    #[test]
    fn test_drag_uses_previous_velocity() {
        let bp = open_field();
        let physics = Physics {
            gravity: Vec2::ZERO,
            drag: -0.5,
            ..ballistic()
        };
        let mut p = Projectile::new(1, Vec2::new(100.0, 100.0), Vec2::new(8.0, 0.0), 3.0);
        p.step(&physics, &bp);
        assert_eq!(p.vel, Vec2::new(4.0, 0.0));
        assert_eq!(p.pos, Vec2::new(104.0, 100.0));
    }

    #[test]
    fn test_ballistic_arc_until_out_of_bounds() {
        let bp = open_field();
        let physics = ballistic();
        let mut p = Projectile::new(1, Vec2::new(50.0, 200.0), Vec2::new(10.0, -10.0), 3.0);

        let mut last_vy = p.vel.y;
        let mut ticks = 0;
        let cause = loop {
            match p.step(&physics, &bp) {
                ProjectileStatus::Flying => {}
                ProjectileStatus::Exploded(cause) => break cause,
                other => panic!("unexpected {other:?}"),
            }
            // Constant downward acceleration
            assert!((p.vel.y - last_vy - 1.0).abs() < 1e-5);
            last_vy = p.vel.y;
            ticks += 1;
            assert!(ticks < 1000);
        };
        // Drops below the bottom edge (y = 300) well before reaching x = 400
        assert_eq!(cause, ExplodeCause::OutOfBounds);
        assert!(p.pos.y >= 300.0);
        assert!(p.pos.x < 400.0);
    }

    #[test]
    fn test_falls_out_of_bottom() {
        let bp = open_field();
        let mut p = Projectile::new(1, Vec2::new(200.0, 250.0), Vec2::new(0.0, -10.0), 3.0);
        let mut status = ProjectileStatus::Flying;
        while status == ProjectileStatus::Flying {
            status = p.step(&ballistic(), &bp);
        }
        assert_eq!(status, ProjectileStatus::Exploded(ExplodeCause::OutOfBounds));
        assert!(p.pos.y >= 300.0);
    }

    #[test]
    fn test_reflects_off_floor() {
        let bp = floored();
        let physics = Physics {
            gravity: Vec2::ZERO,
            ..ballistic()
        };
        // Floor top edge at y = 290
        let mut p = Projectile::new(1, Vec2::new(150.0, 284.0), Vec2::new(3.0, 4.0), 3.0);
        let status = p.step(&physics, &bp);
        assert!(matches!(status, ProjectileStatus::Bounced { .. }));
        assert!((p.vel.y - (-1.8)).abs() < 1e-5);
        assert!((p.vel.x - 1.35).abs() < 1e-5);
        assert_eq!(p.bounces, 1);

        // Moving away afterwards
        assert_eq!(p.step(&physics, &bp), ProjectileStatus::Flying);
        assert!(p.vel.y < 0.0);
    }

    #[test]
    fn test_reflects_at_seam_between_wall_cells() {
        let bp = pillar();
        let physics = Physics {
            gravity: Vec2::ZERO,
            ..ballistic()
        };
        // Lands at (203, 109), one pixel above the edge shared by rows 10 and 11
        let mut p = Projectile::new(1, Vec2::new(199.0, 109.0), Vec2::new(4.0, 0.0), 3.0);
        let status = p.step(&physics, &bp);
        assert!(matches!(status, ProjectileStatus::Bounced { .. }));
        assert_eq!(p.pos, Vec2::new(197.0, 109.0));
        assert!((p.vel.x - (-1.8)).abs() < 1e-5);
        assert_eq!(p.vel.y, 0.0);

        assert_eq!(p.step(&physics, &bp), ProjectileStatus::Flying);
        assert!(p.pos.x < 200.0);
    }

    #[test]
    fn test_overlap_is_always_resolved() {
        let bp = pillar();
        let physics = Physics {
            gravity: Vec2::ZERO,
            ..ballistic()
        };
        // Sliding straight down along the wall's left face while inside it
        let mut p = Projectile::new(1, Vec2::new(199.0, 140.0), Vec2::new(0.0, 2.0), 3.0);
        assert_eq!(p.step(&physics, &bp), ProjectileStatus::Flying);
        assert_eq!(p.pos, Vec2::new(197.0, 142.0));
        assert_eq!(p.vel, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_explode_on_wall() {
        let bp = floored();
        let physics = Physics {
            gravity: Vec2::ZERO,
            wall_response: WallResponse::Explode,
            ..ballistic()
        };
        let mut p = Projectile::new(1, Vec2::new(150.0, 284.0), Vec2::new(3.0, 4.0), 3.0);
        assert_eq!(
            p.step(&physics, &bp),
            ProjectileStatus::Exploded(ExplodeCause::Wall)
        );
    }

    #[test]
    fn test_fuse_and_rest_checks() {
        let bp = open_field();
        let fused = Physics {
            gravity: Vec2::ZERO,
            fuse_ticks: Some(3),
            ..ballistic()
        };
        let mut p = Projectile::new(1, Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), 3.0);
        assert_eq!(p.step(&fused, &bp), ProjectileStatus::Flying);
        assert_eq!(p.step(&fused, &bp), ProjectileStatus::Flying);
        assert_eq!(p.step(&fused, &bp), ProjectileStatus::Exploded(ExplodeCause::Fuse));

        let resting = Physics {
            gravity: Vec2::ZERO,
            rest_speed: Some(0.05),
            ..ballistic()
        };
        let mut p = Projectile::new(2, Vec2::new(100.0, 100.0), Vec2::new(0.01, 0.0), 3.0);
        assert_eq!(p.step(&resting, &bp), ProjectileStatus::Exploded(ExplodeCause::AtRest));
    }

    #[test]
    fn test_render_interpolation_endpoints() {
        let p = Projectile::new(1, Vec2::new(10.0, 20.0), Vec2::new(4.0, -2.0), 3.0);
        assert_eq!(p.render_position(0.0), p.pos);
        assert_eq!(p.render_position(1.0), Vec2::new(14.0, 18.0));
        assert_eq!(p.render_position(0.5), Vec2::new(12.0, 19.0));
    }

    #[test]
    fn test_manager_removes_exploded_and_keeps_latest() {
        let bp = open_field();
        let mut pm = ProjectileManager::new(ballistic());
        let a = pm.create(Vec2::new(200.0, 150.0), Vec2::new(0.0, 0.0));
        let b = pm.create(Vec2::new(395.0, 150.0), Vec2::new(10.0, 0.0));
        assert_eq!((a, b), (1, 2));
        assert_eq!(pm.len(), 2);

        let removed = pm.tick(&bp);
        assert_eq!(removed, vec![(b, ExplodeCause::OutOfBounds)]);
        assert_eq!(pm.len(), 1);
        assert_eq!(pm.iter().next().map(|p| p.id), Some(a));

        // Latest survives removal with its final state
        let latest = pm.latest().unwrap();
        assert_eq!(latest.id, b);
        assert_eq!(latest.pos, Vec2::new(405.0, 151.0));
        assert_eq!((pm.fired, pm.exploded), (2, 1));
    }

    #[test]
    fn test_physics_from_default_settings() {
        let physics = Physics::from_settings(&ProjectileSettings::default());
        assert!(physics.gravity.y > 0.0);
        assert_eq!(physics.gravity.x, 0.0);
        assert!(physics.drag < 0.0);
        assert_eq!(physics.wall_response, WallResponse::Reflect);
    }
}
