//! Intro → ritual → transition → garden.
//!
//! Phases only move forward. The ritual is a wall-clock countdown, the
//! transition follows scroll position, and the garden is terminal.

use crate::constants::{GARDEN_ENTRY_THRESHOLD, RITUAL_DURATION_MS, SCROLL_EPSILON};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Intro,
    Ritual,
    Transition,
    Garden,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Intro => "intro",
            Phase::Ritual => "ritual",
            Phase::Transition => "transition",
            Phase::Garden => "garden",
        }
    }
}

#[inline]
pub fn clamp01(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// 0 when the element top sits on the viewport bottom, 1 once its bottom
/// edge has passed the viewport top.
pub fn scroll_progress(element_top: f32, element_height: f32, viewport_height: f32) -> f32 {
    let span = -element_height - viewport_height;
    if span >= 0.0 {
        return 0.0;
    }
    clamp01((element_top - viewport_height) / span)
}

/// Scroll progress with small-delta suppression.
#[derive(Clone, Debug)]
pub struct ScrollTracker {
    progress: f32,
    epsilon: f32,
    primed: bool,
}

impl ScrollTracker {
    pub fn new(epsilon: f32) -> Self {
        Self {
            progress: 0.0,
            epsilon,
            primed: false,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// `Some(progress)` when the value moved by at least epsilon (or on the first observation).
    pub fn observe(&mut self, top: f32, height: f32, viewport_height: f32) -> Option<f32> {
        let next = scroll_progress(top, height, viewport_height);
        let changed = (next - self.progress).abs() >= self.epsilon
            // always land exactly on the ends
            || (next != self.progress && (next == 0.0 || next == 1.0));
        if self.primed && !changed {
            return None;
        }
        self.primed = true;
        self.progress = next;
        Some(next)
    }
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new(SCROLL_EPSILON)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RitualTick {
    pub elapsed_ms: f64,
    pub remaining_sec: u32,
    pub progress: f32,
}

/// Countdown measured against externally supplied timestamps.
#[derive(Clone, Debug)]
pub struct RitualCountdown {
    total_ms: f64,
    started_ms: Option<f64>,
    elapsed_ms: f64,
}

impl RitualCountdown {
    pub fn new(total_ms: f64) -> Self {
        Self {
            total_ms: total_ms.max(1.0),
            started_ms: None,
            elapsed_ms: 0.0,
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        if self.started_ms.is_none() {
            self.started_ms = Some(now_ms);
            self.elapsed_ms = 0.0;
        }
    }

    pub fn is_started(&self) -> bool {
        self.started_ms.is_some()
    }

    /// Elapsed time never decreases, even if `now_ms` does.
    pub fn tick(&mut self, now_ms: f64) -> RitualTick {
        if let Some(start) = self.started_ms {
            self.elapsed_ms = self.elapsed_ms.max((now_ms - start).max(0.0));
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> RitualTick {
        let total_sec = (self.total_ms / 1000.0).ceil() as u32;
        let whole = (self.elapsed_ms / 1000.0).floor() as u32;
        RitualTick {
            elapsed_ms: self.elapsed_ms,
            remaining_sec: total_sec.saturating_sub(whole),
            progress: (self.elapsed_ms / self.total_ms).min(1.0) as f32,
        }
    }

    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }
}

#[derive(Clone, Debug)]
pub struct TimelineConfig {
    pub ritual_ms: f64,
    pub garden_threshold: f32,
    pub scroll_epsilon: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            ritual_ms: RITUAL_DURATION_MS,
            garden_threshold: GARDEN_ENTRY_THRESHOLD,
            scroll_epsilon: SCROLL_EPSILON,
        }
    }
}

/// What a single `tick`/`observe_scroll` changed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimelineUpdate {
    pub entered: Option<Phase>,
    pub ritual: Option<RitualTick>,
    pub transition_progress: Option<f32>,
}

type CompletionCallback = Box<dyn FnOnce()>;

pub struct TimelineController {
    config: TimelineConfig,
    phase: Phase,
    countdown: RitualCountdown,
    scroll: ScrollTracker,
    ritual_completed: bool,
    on_ritual_complete: Option<CompletionCallback>,
}

impl TimelineController {
    pub fn new(config: TimelineConfig) -> Self {
        let countdown = RitualCountdown::new(config.ritual_ms);
        let scroll = ScrollTracker::new(config.scroll_epsilon);
        Self {
            config,
            phase: Phase::Intro,
            countdown,
            scroll,
            ritual_completed: false,
            on_ritual_complete: None,
        }
    }

    /// Callback invoked once, on the frame the ritual reaches progress 1.
    pub fn on_ritual_complete(&mut self, f: impl FnOnce() + 'static) {
        self.on_ritual_complete = Some(Box::new(f));
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ritual(&self) -> RitualTick {
        self.countdown.snapshot()
    }

    pub fn transition_progress(&self) -> f32 {
        match self.phase {
            Phase::Intro | Phase::Ritual => 0.0,
            Phase::Transition => self.scroll.progress(),
            Phase::Garden => 1.0,
        }
    }

    pub fn is_ritual_complete(&self) -> bool {
        self.ritual_completed
    }

    /// User action ending the intro. Ignored outside `Intro`.
    pub fn begin_ritual(&mut self, now_ms: f64) -> bool {
        if self.phase != Phase::Intro {
            return false;
        }
        self.countdown.start(now_ms);
        self.enter(Phase::Ritual);
        true
    }

    /// Skip straight to the garden (returning visitors). Forward only.
    pub fn enter_garden(&mut self) -> bool {
        if self.phase == Phase::Garden {
            return false;
        }
        self.enter(Phase::Garden);
        true
    }

    /// Per-frame advance of the ritual countdown.
    pub fn tick(&mut self, now_ms: f64) -> TimelineUpdate {
        let mut update = TimelineUpdate::default();
        if self.phase != Phase::Ritual {
            return update;
        }
        let tick = self.countdown.tick(now_ms);
        update.ritual = Some(tick);
        if tick.progress >= 1.0 && !self.ritual_completed {
            self.ritual_completed = true;
            self.enter(Phase::Transition);
            update.entered = Some(Phase::Transition);
            if let Some(cb) = self.on_ritual_complete.take() {
                cb();
            }
        }
        update
    }

    /// Feed the observed transition element's rect. Only meaningful in `Transition`.
    pub fn observe_scroll(
        &mut self,
        top: f32,
        height: f32,
        viewport_height: f32,
    ) -> TimelineUpdate {
        let mut update = TimelineUpdate::default();
        if self.phase != Phase::Transition {
            return update;
        }
        if let Some(p) = self.scroll.observe(top, height, viewport_height) {
            update.transition_progress = Some(p);
            if p >= self.config.garden_threshold {
                self.enter(Phase::Garden);
                update.entered = Some(Phase::Garden);
            }
        }
        update
    }

    fn enter(&mut self, next: Phase) {
        debug_assert!(next > self.phase);
        log::info!("[timeline] {} -> {}", self.phase.as_str(), next.as_str());
        self.phase = next;
    }
}

impl Default for TimelineController {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}
