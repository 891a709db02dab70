//! Frame scheduling without a real frame clock.
//!
//! The browser drives `tick` from `requestAnimationFrame`; tests drive it with
//! a [`ManualClock`].

use instant::Instant;
use std::cell::Cell;
use std::rc::Rc;

pub trait Clock {
    /// Monotonic milliseconds since an arbitrary origin.
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by `instant`, which maps to `performance.now()` on wasm.
#[derive(Clone, Debug)]
pub struct InstantClock {
    origin: Instant,
}

impl Default for InstantClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for InstantClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-advanced clock; clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    pub now_ms: f64,
    pub dt_ms: f64,
}

/// Start/stop/tick wrapper that yields frame deltas only while running.
pub struct FrameScheduler<C: Clock> {
    clock: C,
    running: bool,
    last_ms: Option<f64>,
}

impl<C: Clock> FrameScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            running: false,
            last_ms: None,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.last_ms = None;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.last_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// `None` once stopped; the first tick after `start` has `dt_ms == 0`.
    pub fn tick(&mut self) -> Option<FrameTick> {
        if !self.running {
            return None;
        }
        let now_ms = self.clock.now_ms();
        let dt_ms = self.last_ms.map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_ms = Some(now_ms);
        Some(FrameTick { now_ms, dt_ms })
    }
}

/// Fires at most once per `interval_ms`; the first call always fires.
#[derive(Clone, Debug)]
pub struct IntervalGate {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl IntervalGate {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
