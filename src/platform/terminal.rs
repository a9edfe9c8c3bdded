//! Terminal front-end built on crossterm
//!
//! Input: a dedicated thread blocks on `event::read()` and forwards events
//! through a channel, so polling never blocks. Terminals with the keyboard
//! enhancement protocol report key releases; on the others a key counts as
//! held while press/repeat events keep arriving within [`HOLD_WINDOW_MS`].
//!
//! Output: each frame is rasterized onto the character grid, scaled from the
//! frame's logical size to the current terminal size.

use std::collections::HashMap;
use std::io::{BufWriter, Stdout, Write, stdout};
use std::sync::mpsc;
use std::thread;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::{self, Print};
use crossterm::{ExecutableCommand, QueueableCommand, cursor, terminal};
use glam::Vec2;

use super::{Clock, InputEvent, Key, Platform, PlatformError, SystemClock};
use crate::renderer::{Color, Frame, Shape};

/// A key without release support stays held this long after its last repeat
const HOLD_WINDOW_MS: f64 = 150.0;

/// One character cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermCell {
    pub ch: char,
    pub color: Color,
}

impl TermCell {
    const BLANK: TermCell = TermCell {
        ch: ' ',
        color: [0.0, 0.0, 0.0, 1.0],
    };
}

pub struct TerminalPlatform {
    out: BufWriter<Stdout>,
    clock: SystemClock,
    rx: mpsc::Receiver<Event>,
    keyboard_enhanced: bool,
    /// Held keys and the time they were last pressed or repeated
    held: HashMap<Key, f64>,
}

impl TerminalPlatform {
    /// Switch the terminal to raw mode on the alternate screen
    pub fn new() -> Result<Self, PlatformError> {
        let mut out = BufWriter::new(stdout());
        terminal::enable_raw_mode()?;
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;

        // Falls back to press-only input when unsupported
        let keyboard_enhanced = out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();
        log::info!("Terminal ready, key release events: {keyboard_enhanced}");

        let (tx, rx) = mpsc::channel::<Event>();
        thread::spawn(move || {
            while let Ok(ev) = event::read() {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            out,
            clock: SystemClock::new(),
            rx,
            keyboard_enhanced,
            held: HashMap::new(),
        })
    }

    fn translate(&mut self, key: KeyEvent, now: f64, events: &mut Vec<InputEvent>) {
        let ctrl_c =
            key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl_c || key.code == KeyCode::Esc {
            events.push(InputEvent::Quit);
            return;
        }
        let Some(mapped) = map_key(key.code) else {
            return;
        };
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if self.held.insert(mapped, now).is_none() {
                    events.push(InputEvent::KeyDown(mapped));
                }
            }
            KeyEventKind::Release => {
                if self.held.remove(&mapped).is_some() {
                    events.push(InputEvent::KeyUp(mapped));
                }
            }
        }
    }

    fn expire_held(&mut self, now: f64, events: &mut Vec<InputEvent>) {
        let mut expired: Vec<Key> = self
            .held
            .iter()
            .filter(|(_, last)| now - **last > HOLD_WINDOW_MS)
            .map(|(key, _)| *key)
            .collect();
        // HashMap order is arbitrary
        expired.sort_by_key(|k| *k as u8);
        for key in expired {
            self.held.remove(&key);
            events.push(InputEvent::KeyUp(key));
        }
    }
}

impl Drop for TerminalPlatform {
    fn drop(&mut self) {
        if self.keyboard_enhanced {
            let _ = self.out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = self.out.execute(style::ResetColor);
        let _ = self.out.execute(cursor::Show);
        let _ = self.out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Platform for TerminalPlatform {
    fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        let now = self.now_ms();
        let mut events = Vec::new();
        while let Ok(ev) = self.rx.try_recv() {
            if let Event::Key(key) = ev {
                self.translate(key, now, &mut events);
            }
        }
        if !self.keyboard_enhanced {
            self.expire_held(now, &mut events);
        }
        events
    }

    fn present(&mut self, frame: &Frame) -> Result<(), PlatformError> {
        let (cols, rows) = terminal::size()?;
        let cells = rasterize(frame, cols as usize, rows as usize);

        for (y, row) in cells.iter().enumerate() {
            self.out.queue(cursor::MoveTo(0, y as u16))?;
            let mut current = None;
            for cell in row {
                if current != Some(cell.color) {
                    self.out
                        .queue(style::SetForegroundColor(to_term_color(cell.color)))?;
                    current = Some(cell.color);
                }
                self.out.queue(Print(cell.ch))?;
            }
        }
        self.out.queue(style::ResetColor)?;
        self.out.flush()?;
        Ok(())
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Key::Q),
        _ => None,
    }
}

fn to_term_color(c: Color) -> style::Color {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    style::Color::Rgb {
        r: channel(c[0]),
        g: channel(c[1]),
        b: channel(c[2]),
    }
}

/// Project a frame onto a `cols` x `rows` character grid
///
/// Shapes are painted in order, later ones on top. Every non-text shape
/// covers at least the cell containing its anchor point.
pub fn rasterize(frame: &Frame, cols: usize, rows: usize) -> Vec<Vec<TermCell>> {
    let mut grid = vec![vec![TermCell::BLANK; cols]; rows];
    if cols == 0 || rows == 0 || frame.size.x <= 0.0 || frame.size.y <= 0.0 {
        return grid;
    }
    let scale = Vec2::new(cols as f32 / frame.size.x, rows as f32 / frame.size.y);
    let to_cell = |p: Vec2| -> (i64, i64) {
        let c = p * scale;
        (c.x.floor() as i64, c.y.floor() as i64)
    };
    let put = |grid: &mut Vec<Vec<TermCell>>, (x, y): (i64, i64), ch: char, color: Color| {
        if x >= 0 && y >= 0 && (x as usize) < cols && (y as usize) < rows {
            grid[y as usize][x as usize] = TermCell { ch, color };
        }
    };

    for shape in &frame.shapes {
        match shape {
            Shape::Rect { min, size, color } => {
                let (x0, y0) = to_cell(*min);
                let end = *min + *size;
                let (x1, y1) = (
                    ((end.x * scale.x).ceil() as i64).max(x0 + 1),
                    ((end.y * scale.y).ceil() as i64).max(y0 + 1),
                );
                for y in y0..y1 {
                    for x in x0..x1 {
                        put(&mut grid, (x, y), '█', *color);
                    }
                }
            }
            Shape::Circle {
                center,
                radius,
                color,
            } => {
                let (x0, y0) = to_cell(*center - Vec2::splat(*radius));
                let (x1, y1) = to_cell(*center + Vec2::splat(*radius));
                for y in y0..=y1 {
                    for x in x0..=x1 {
                        let mid = (Vec2::new(x as f32, y as f32) + 0.5) / scale;
                        if mid.distance(*center) <= *radius {
                            put(&mut grid, (x, y), '●', *color);
                        }
                    }
                }
                put(&mut grid, to_cell(*center), '●', *color);
            }
            Shape::Line {
                from, to, color, ..
            } => {
                let span = (*to - *from) * scale;
                let steps = span.x.abs().max(span.y.abs()).ceil().max(1.0) as usize;
                for i in 0..=steps {
                    let p = from.lerp(*to, i as f32 / steps as f32);
                    put(&mut grid, to_cell(p), '•', *color);
                }
            }
            Shape::Text { pos, text, color } => {
                let (x0, y0) = to_cell(*pos);
                for (i, ch) in text.chars().enumerate() {
                    put(&mut grid, (x0 + i as i64, y0), ch, *color);
                }
            }
        }
    }
    grid
}
