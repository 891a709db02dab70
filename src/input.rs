use glam::{Vec2, Vec3};

#[derive(Default, Clone, Copy, Debug)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub down: bool,
    /// Pointer travel since the last press, in CSS pixels.
    pub travel: f32,
}

impl MouseState {
    /// Presses that barely moved count as clicks, not drags.
    pub fn is_click(&self) -> bool {
        self.travel < 4.0
    }
}

/// Spherical orbit around a ground target, owned by the user once the
/// camera rig has released it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitState {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub pitch_limits: (f32, f32),
    pub distance_limits: (f32, f32),
}

impl OrbitState {
    /// Orbit whose eye sits at `eye` looking at `target`.
    pub fn from_eye(
        eye: Vec3,
        target: Vec3,
        pitch_limits: (f32, f32),
        distance_limits: (f32, f32),
    ) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(1e-3);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        let mut orbit = Self {
            target,
            yaw,
            pitch,
            distance,
            pitch_limits,
            distance_limits,
        };
        orbit.clamp();
        orbit
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.distance
    }

    pub fn drag(&mut self, delta: Vec2, yaw_per_px: f32, pitch_per_px: f32) {
        self.yaw -= delta.x * yaw_per_px;
        self.pitch += delta.y * pitch_per_px;
        self.clamp();
    }

    pub fn zoom(&mut self, wheel_delta: f32, per_unit: f32) {
        self.distance *= (1.0 + wheel_delta * per_unit).max(0.1);
        self.clamp();
    }

    fn clamp(&mut self) {
        self.pitch = self.pitch.clamp(self.pitch_limits.0, self.pitch_limits.1);
        self.distance = self
            .distance
            .clamp(self.distance_limits.0, self.distance_limits.1);
    }
}

#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Index of the closest pick sphere hit along the ray.
pub fn pick_nearest(
    ray_origin: Vec3,
    ray_dir: Vec3,
    centers: impl IntoIterator<Item = Vec3>,
    radius: f32,
) -> Option<usize> {
    let mut best = None::<(usize, f32)>;
    for (i, c) in centers.into_iter().enumerate() {
        if let Some(t) = ray_sphere(ray_origin, ray_dir, c, radius) {
            match best {
                Some((_, bt)) if t >= bt => {}
                _ => best = Some((i, t)),
            }
        }
    }
    best.map(|(i, _)| i)
}
