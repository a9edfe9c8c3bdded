//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one call = one tick)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod blueprint;
pub mod collision;
pub mod grid;
pub mod projectile;
pub mod snake;
pub mod turret;

pub use blueprint::{Blueprint, BlueprintError, Cell};
pub use collision::{Contact, Face, Rect, bounce, find_contact, reflect_velocity};
pub use grid::{Apple, Direction, Grid, Point};
pub use projectile::{ExplodeCause, Physics, Projectile, ProjectileManager, ProjectileStatus};
pub use snake::{DeathCause, Segment, Snake, SnakeWorld, StepOutcome};
pub use turret::{Turret, TurretInput};
