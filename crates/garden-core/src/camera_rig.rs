//! Timeline-driven camera with a one-shot hand-off to user control.
//!
//! Below the snap threshold the rig eases between the wide establishing pose
//! and the garden-entry pose. Crossing it snaps once to the final pose; from
//! then on the rig reports `Free` and the orbit controls own the camera.

use crate::constants::CAMERA_SNAP_THRESHOLD;
use crate::timeline::clamp01;
use glam::{Mat4, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn from_pose(pose: &CameraPose, aspect: f32) -> Self {
        Self {
            eye: pose.eye,
            target: pose.target,
            up: Vec3::Y,
            aspect,
            fovy_radians: pose.fov_deg.to_radians(),
            znear: 0.1,
            zfar: 200.0,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Camera placement plus the fog band that travels with it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_deg: f32,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl CameraPose {
    pub fn lerp(&self, other: &CameraPose, t: f32) -> CameraPose {
        let lerp = |a: f32, b: f32| a + (b - a) * t;
        CameraPose {
            eye: self.eye.lerp(other.eye, t),
            target: self.target.lerp(other.target, t),
            fov_deg: lerp(self.fov_deg, other.fov_deg),
            fog_near: lerp(self.fog_near, other.fog_near),
            fog_far: lerp(self.fog_far, other.fog_far),
        }
    }
}

/// Cubic ease-in-out on [0, 1].
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = clamp01(t);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Clone, Debug)]
pub struct RigConfig {
    pub wide: CameraPose,
    pub entry: CameraPose,
    pub settled: CameraPose,
    pub snap_threshold: f32,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            wide: CameraPose {
                eye: Vec3::new(0.0, 26.0, 34.0),
                target: Vec3::new(0.0, 0.0, 0.0),
                fov_deg: 38.0,
                fog_near: 30.0,
                fog_far: 90.0,
            },
            entry: CameraPose {
                eye: Vec3::new(0.0, 4.5, 15.0),
                target: Vec3::new(0.0, 0.8, 0.0),
                fov_deg: 50.0,
                fog_near: 10.0,
                fog_far: 42.0,
            },
            settled: CameraPose {
                eye: Vec3::new(0.0, 5.0, 14.0),
                target: Vec3::new(0.0, 0.6, 0.0),
                fov_deg: 50.0,
                fog_near: 12.0,
                fog_far: 45.0,
            },
            snap_threshold: CAMERA_SNAP_THRESHOLD,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RigOutput {
    /// Follow the timeline.
    Interpolated(CameraPose),
    /// Emitted exactly once when the threshold is first crossed.
    Snapped(CameraPose),
    /// Timeline input ignored; the user drives the camera.
    Free,
}

pub struct CameraRig {
    config: RigConfig,
    snapped: bool,
}

impl CameraRig {
    pub fn new(config: RigConfig) -> Self {
        Self {
            config,
            snapped: false,
        }
    }

    pub fn is_free(&self) -> bool {
        self.snapped
    }

    pub fn settled_pose(&self) -> CameraPose {
        self.config.settled
    }

    pub fn wide_pose(&self) -> CameraPose {
        self.config.wide
    }

    pub fn update(&mut self, progress: f32) -> RigOutput {
        if self.snapped {
            return RigOutput::Free;
        }
        let p = clamp01(progress);
        if p >= self.config.snap_threshold {
            self.snapped = true;
            log::info!("[camera] snapped to settled pose at progress {:.3}", p);
            return RigOutput::Snapped(self.config.settled);
        }
        let t = ease_in_out(p / self.config.snap_threshold.max(1e-3));
        RigOutput::Interpolated(self.config.wide.lerp(&self.config.entry, t))
    }

    /// Hand control to the user without a timeline crossing (e.g. returning visitors).
    pub fn release(&mut self) -> Option<CameraPose> {
        if self.snapped {
            return None;
        }
        self.snapped = true;
        Some(self.config.settled)
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(RigConfig::default())
    }
}
