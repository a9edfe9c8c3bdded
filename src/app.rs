//! Fixed-step main loop
//!
//! The simulation advances in constant `tick_step` increments no matter how
//! fast frames are drawn. A slow frame is caught up with at most
//! `max_frameskip` steps; rendering then blends between the last committed
//! state and the predicted next one.

use std::ops::ControlFlow;

use glam::Vec2;

use crate::platform::{InputEvent, KeyState, Platform, PlatformError};
use crate::renderer::Frame;
use crate::settings::LoopSettings;

/// Frames averaged by the FPS meter
const FPS_WINDOW: usize = 60;

/// Catch-up scheduler
#[derive(Debug, Clone)]
pub struct FixedStep {
    tick_step: f64,
    max_frameskip: u32,
    /// When the next step is due
    next_tick: f64,
}

impl FixedStep {
    pub fn new(tick_step: f64, max_frameskip: u32, now: f64) -> Self {
        Self {
            tick_step,
            // Zero would never poll input again
            max_frameskip: max_frameskip.max(1),
            next_tick: now,
        }
    }

    pub fn tick_step(&self) -> f64 {
        self.tick_step
    }

    pub fn next_tick(&self) -> f64 {
        self.next_tick
    }

    /// Run every step that is due at `now`, bounded by the frameskip limit
    ///
    /// `update` receives `now` and may stop the loop by returning `Break`.
    /// Returns the number of steps taken when the loop keeps going.
    pub fn advance<F>(&mut self, now: f64, mut update: F) -> ControlFlow<(), u32>
    where
        F: FnMut(f64) -> ControlFlow<()>,
    {
        let mut loops = 0;
        while now > self.next_tick && loops < self.max_frameskip {
            let flow = update(now);
            self.next_tick += self.tick_step;
            loops += 1;
            if flow.is_break() {
                return ControlFlow::Break(());
            }
        }

        if loops == self.max_frameskip && now > self.next_tick {
            log::warn!(
                "Simulation fell behind by {:.0} ms ({} steps this frame)",
                now - self.next_tick,
                loops
            );
        }
        ControlFlow::Continue(loops)
    }

    /// How far `now` is between the last step and the next, in [0, 1]
    pub fn interpolation(&self, now: f64) -> f32 {
        let t = (now + self.tick_step - self.next_tick) / self.tick_step;
        t.clamp(0.0, 1.0) as f32
    }
}

/// Rolling frame rate over the last [`FPS_WINDOW`] frames
#[derive(Debug, Clone)]
pub struct FpsMeter {
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    filled: usize,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsMeter {
    pub fn new() -> Self {
        Self {
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            filled: 0,
        }
    }

    pub fn record(&mut self, time_ms: f64) {
        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;
        self.filled = (self.filled + 1).min(FPS_WINDOW);
    }

    /// None until two frames have been seen
    pub fn fps(&self) -> Option<u32> {
        if self.filled < 2 {
            return None;
        }
        let newest = self.frame_times[(self.frame_index + FPS_WINDOW - 1) % FPS_WINDOW];
        let oldest = if self.filled < FPS_WINDOW {
            self.frame_times[0]
        } else {
            self.frame_times[self.frame_index]
        };
        let elapsed = newest - oldest;
        if elapsed <= 0.0 {
            return None;
        }
        Some(((self.filled - 1) as f64 * 1000.0 / elapsed).round() as u32)
    }
}

/// Per-frame values handed to [`Game::draw`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub interpolation: f32,
    pub fps: Option<u32>,
}

/// An application the main loop can drive
pub trait Game {
    fn name(&self) -> &'static str;

    /// Milliseconds per simulation step
    fn tick_step_ms(&self) -> f64;

    /// Logical screen size in px
    fn viewport(&self) -> Vec2;

    /// Discrete input, delivered during the step that polled it
    fn handle_event(&mut self, _event: &InputEvent) {}

    /// One simulation step; `keys` holds the continuous key state
    fn update(&mut self, now_ms: f64, keys: &KeyState);

    fn draw(&self, info: &FrameInfo, frame: &mut Frame);
}

/// Totals for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub frames: u64,
}

/// Drive `game` on `platform` until a quit event is seen
pub fn run<P, G>(
    platform: &mut P,
    game: &mut G,
    settings: &LoopSettings,
) -> Result<RunStats, PlatformError>
where
    P: Platform + ?Sized,
    G: Game + ?Sized,
{
    let mut step = FixedStep::new(game.tick_step_ms(), settings.max_frameskip, platform.now_ms());
    let frame_budget = settings
        .frame_cap
        .filter(|cap| *cap > 0)
        .map(|cap| 1000.0 / cap as f64);
    let mut keys = KeyState::default();
    let mut fps = FpsMeter::new();
    let mut frame = Frame::new(game.viewport());
    let mut stats = RunStats::default();

    log::info!(
        "Starting {} ({} ms per tick, frameskip {}, frame cap {:?})",
        game.name(),
        step.tick_step(),
        settings.max_frameskip,
        settings.frame_cap
    );

    loop {
        let frame_start = platform.now_ms();
        let flow = step.advance(frame_start, |now| {
            for event in platform.poll_events() {
                if event.is_quit() {
                    return ControlFlow::Break(());
                }
                keys.apply(&event);
                game.handle_event(&event);
            }
            game.update(now, &keys);
            stats.ticks += 1;
            ControlFlow::Continue(())
        });
        if flow.is_break() {
            log::info!("Quit requested after {} ticks", stats.ticks);
            break;
        }

        let now = platform.now_ms();
        fps.record(now);
        let info = FrameInfo {
            interpolation: step.interpolation(now),
            fps: fps.fps(),
        };
        frame.clear();
        game.draw(&info, &mut frame);
        platform.present(&frame)?;
        stats.frames += 1;

        if let Some(budget) = frame_budget {
            let elapsed = platform.now_ms() - frame_start;
            if elapsed < budget {
                platform.wait_ms(budget - elapsed);
            }
        }
    }

    Ok(stats)
}
