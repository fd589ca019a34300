//! Monotonic time sources for the render loop.
//!
//! All animation is evaluated against elapsed milliseconds, so the
//! oscillation frequencies in the demo are expressed per millisecond.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A read-only source of elapsed time in milliseconds.
pub trait TimeSource {
    /// Milliseconds elapsed since the source started. Never decreases.
    fn elapsed_ms(&self) -> f64;

    /// Restart counting from zero. Called once when a session first starts.
    fn restart(&mut self) {}
}

/// Wall clock backed by [`Instant`], started on creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::start_new()
    }
}

impl SystemClock {
    pub fn start_new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl TimeSource for SystemClock {
    fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    fn restart(&mut self) {
        self.start = Instant::now();
    }
}

/// A clock advanced by hand.
///
/// Clones share the same underlying time, so a host can keep one handle
/// to drive time while the render loop reads through another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock to `ms`. Earlier values are ignored to keep time monotonic.
    pub fn set(&self, ms: f64) {
        if ms > self.now.get() {
            self.now.set(ms);
        }
    }

    pub fn advance(&self, ms: f64) {
        self.set(self.now.get() + ms);
    }
}

impl TimeSource for ManualClock {
    fn elapsed_ms(&self) -> f64 {
        self.now.get()
    }
}
