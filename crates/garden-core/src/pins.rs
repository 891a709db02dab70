//! Which flowers get a floating message label.
//!
//! The label set is a render-budget policy: own, hovered and selected flowers
//! always show, and the nearest flowers around the camera fill the remaining
//! slots up to `max_pins`.

use crate::constants::{MAX_PINS, PIN_MAX_RADIUS, PIN_REFRESH_MS};
use crate::scheduler::IntervalGate;
use glam::Vec3;
use smallvec::SmallVec;

#[derive(Clone, Debug)]
pub struct PinConfig {
    pub max_pins: usize,
    pub max_radius: f32,
    pub refresh_ms: f64,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            max_pins: MAX_PINS,
            max_radius: PIN_MAX_RADIUS,
            refresh_ms: PIN_REFRESH_MS,
        }
    }
}

/// Inputs for one recompute. `flowers` pairs ids with world positions.
pub struct PinQuery<'a> {
    pub focus: Vec3,
    pub own: Option<&'a str>,
    pub hovered: Option<&'a str>,
    pub selected: Option<&'a str>,
    pub flowers: &'a [(&'a str, Vec3)],
}

/// Must-show ids first (own, hovered, selected), then nearest by squared distance.
pub fn select_pins(query: &PinQuery<'_>, cfg: &PinConfig) -> Vec<String> {
    let mut must: SmallVec<[&str; 3]> = SmallVec::new();
    for id in [query.own, query.hovered, query.selected].into_iter().flatten() {
        if !must.contains(&id) {
            must.push(id);
        }
    }

    let max_r2 = cfg.max_radius * cfg.max_radius;
    let mut nearby: Vec<(f32, usize)> = query
        .flowers
        .iter()
        .enumerate()
        .filter(|(_, (id, _))| !must.contains(id))
        .map(|(i, (_, p))| (p.distance_squared(query.focus), i))
        .filter(|(d2, _)| *d2 <= max_r2)
        .collect();
    // stable sort keeps array order among equal distances
    nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

    let room = cfg.max_pins.saturating_sub(must.len());
    let mut out: Vec<String> = must.iter().map(|s| s.to_string()).collect();
    out.extend(
        nearby
            .into_iter()
            .take(room)
            .map(|(_, i)| query.flowers[i].0.to_string()),
    );
    out
}

/// Throttled pin recompute: at most once per interval and never mid camera move.
pub struct PinSelector {
    pub config: PinConfig,
    gate: IntervalGate,
    current: Vec<String>,
}

impl PinSelector {
    pub fn new(config: PinConfig) -> Self {
        let gate = IntervalGate::new(config.refresh_ms);
        Self {
            config,
            gate,
            current: Vec::new(),
        }
    }

    /// Returns `true` when the pinned set was recomputed.
    pub fn refresh(&mut self, now_ms: f64, camera_moving: bool, query: &PinQuery<'_>) -> bool {
        if camera_moving || !self.gate.ready(now_ms) {
            return false;
        }
        self.current = select_pins(query, &self.config);
        true
    }

    pub fn pinned(&self) -> &[String] {
        &self.current
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.current.iter().any(|p| p == id)
    }
}

impl Default for PinSelector {
    fn default() -> Self {
        Self::new(PinConfig::default())
    }
}
