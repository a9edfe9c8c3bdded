//! The two applications driven by the fixed-step loop

pub mod artillery;
pub mod snake;

pub use artillery::{ArtilleryGame, ArtilleryOptions};
pub use snake::SnakeGame;
