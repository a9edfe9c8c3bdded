//! Platform abstraction layer
//!
//! The simulation never talks to a terminal or window directly. It is driven
//! through this narrow contract:
//! - Time (monotonic milliseconds)
//! - Input events, drained without blocking
//! - Presenting a finished frame

use std::collections::HashSet;
use std::time::Instant;

use thiserror::Error;

use crate::renderer::Frame;

pub mod scripted;
#[cfg(not(target_arch = "wasm32"))]
pub mod terminal;

pub use scripted::ScriptedPlatform;

/// Keys the games react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Q,
}

/// A single input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Window closed / interrupt
    Quit,
    KeyDown(Key),
    KeyUp(Key),
}

impl InputEvent {
    /// Window close, or releasing the quit key
    pub fn is_quit(&self) -> bool {
        matches!(self, InputEvent::Quit | InputEvent::KeyUp(Key::Q))
    }
}

/// Continuous keyboard state, rebuilt from the event stream
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<Key>,
}

impl KeyState {
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown(key) => {
                self.held.insert(key);
            }
            InputEvent::KeyUp(key) => {
                self.held.remove(&key);
            }
            InputEvent::Quit => self.held.clear(),
        }
    }

    #[inline]
    pub fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("display I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Monotonic wall clock in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Real time, measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self { now: start_ms }
    }

    pub fn advance(&mut self, ms: f64) {
        self.now += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now
    }
}

/// The rendering/input collaborator the main loop runs against
pub trait Platform {
    /// Monotonic time in milliseconds
    fn now_ms(&self) -> f64;

    /// Drain all pending input events (never blocks)
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Composite and show one frame
    fn present(&mut self, frame: &Frame) -> Result<(), PlatformError>;

    /// Idle until `ms` milliseconds have passed (render rate cap)
    fn wait_ms(&mut self, ms: f64) {
        if ms > 0.0 {
            std::thread::sleep(std::time::Duration::from_secs_f64(ms / 1000.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_events() {
        assert!(InputEvent::Quit.is_quit());
        assert!(InputEvent::KeyUp(Key::Q).is_quit());
        // Quitting happens on release, not press
        assert!(!InputEvent::KeyDown(Key::Q).is_quit());
        assert!(!InputEvent::KeyUp(Key::Space).is_quit());
    }

    #[test]
    fn test_key_state_tracks_held_keys() {
        let mut keys = KeyState::default();
        keys.apply(&InputEvent::KeyDown(Key::Left));
        keys.apply(&InputEvent::KeyDown(Key::Space));
        assert!(keys.is_down(Key::Left));
        assert!(keys.is_down(Key::Space));

        keys.apply(&InputEvent::KeyUp(Key::Left));
        assert!(!keys.is_down(Key::Left));
        assert!(keys.is_down(Key::Space));

        keys.apply(&InputEvent::Quit);
        assert!(!keys.is_down(Key::Space));
    }

    #[test]
    fn test_manual_clock() {
        let mut clock = ManualClock::new(5.0);
        clock.advance(10.0);
        assert_eq!(clock.now_ms(), 15.0);
        assert_eq!(ManualClock::default().now_ms(), 0.0);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
