//! Application state with a single writer per field.
//!
//! The frontend holds one `AppState` and hands views an [`AppSnapshot`], a
//! plain copy they cannot write back through.

use crate::timeline::{Phase, TimelineController, TimelineUpdate};

/// Identity of the visitor on this device.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalUser {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AppSnapshot {
    pub phase: Phase,
    pub ritual_progress: f32,
    pub remaining_sec: u32,
    pub transition_progress: f32,
    pub muted: bool,
}

pub struct AppState {
    timeline: TimelineController,
    muted: bool,
    user: LocalUser,
}

impl AppState {
    pub fn new(timeline: TimelineController, user: LocalUser, muted: bool) -> Self {
        Self {
            timeline,
            muted,
            user,
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        let ritual = self.timeline.ritual();
        AppSnapshot {
            phase: self.timeline.phase(),
            ritual_progress: ritual.progress,
            remaining_sec: ritual.remaining_sec,
            transition_progress: self.timeline.transition_progress(),
            muted: self.muted,
        }
    }

    pub fn user(&self) -> &LocalUser {
        &self.user
    }

    pub fn set_user_name(&mut self, name: Option<String>) {
        self.user.name = name;
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn begin_ritual(&mut self, now_ms: f64) -> bool {
        self.timeline.begin_ritual(now_ms)
    }

    pub fn enter_garden(&mut self) -> bool {
        self.timeline.enter_garden()
    }

    pub fn tick(&mut self, now_ms: f64) -> TimelineUpdate {
        self.timeline.tick(now_ms)
    }

    pub fn observe_scroll(
        &mut self,
        top: f32,
        height: f32,
        viewport_height: f32,
    ) -> TimelineUpdate {
        self.timeline.observe_scroll(top, height, viewport_height)
    }

    pub fn on_ritual_complete(&mut self, f: impl FnOnce() + 'static) {
        self.timeline.on_ritual_complete(f);
    }
}
