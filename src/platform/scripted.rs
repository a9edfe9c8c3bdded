//! Headless platform driven by a script of timed events
//!
//! Time only moves when the loop presents a frame or waits, so runs are
//! fully reproducible. Used by tests and replays.

use std::collections::VecDeque;

use super::{Clock, InputEvent, ManualClock, Platform, PlatformError};
use crate::renderer::Frame;

#[derive(Debug, Clone)]
pub struct ScriptedPlatform {
    clock: ManualClock,
    /// Time a frame takes to present
    frame_ms: f64,
    /// Events sorted by due time
    script: VecDeque<(f64, InputEvent)>,
    /// Stop after this many frames (appends a Quit)
    frame_limit: Option<u64>,
    frames: u64,
    last_frame: Option<Frame>,
}

impl ScriptedPlatform {
    pub fn new(frame_ms: f64) -> Self {
        Self {
            clock: ManualClock::default(),
            frame_ms,
            script: VecDeque::new(),
            frame_limit: None,
            frames: 0,
            last_frame: None,
        }
    }

    /// Queue an event that becomes visible once the clock reaches `at_ms`
    pub fn push(&mut self, at_ms: f64, event: InputEvent) -> &mut Self {
        let idx = self.script.partition_point(|(t, _)| *t <= at_ms);
        self.script.insert(idx, (at_ms, event));
        self
    }

    /// Quit once `frames` frames have been presented
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Start the clock at `start_ms` instead of zero
    pub fn starting_at(mut self, start_ms: f64) -> Self {
        self.clock = ManualClock::new(start_ms);
        self
    }

    /// Jump the clock forward (simulates a stall)
    pub fn advance(&mut self, ms: f64) {
        self.clock.advance(ms);
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }
}

impl Platform for ScriptedPlatform {
    fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        let now = self.clock.now_ms();
        let mut events = Vec::new();
        while let Some(&(at, event)) = self.script.front() {
            if at > now {
                break;
            }
            self.script.pop_front();
            events.push(event);
        }
        if let Some(limit) = self.frame_limit {
            if self.frames >= limit {
                events.push(InputEvent::Quit);
            }
        }
        events
    }

    fn present(&mut self, frame: &Frame) -> Result<(), PlatformError> {
        self.frames += 1;
        self.clock.advance(self.frame_ms);
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn wait_ms(&mut self, ms: f64) {
        if ms > 0.0 {
            self.clock.advance(ms);
        }
    }
}
