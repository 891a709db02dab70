use garden_core::Camera;
use glam::{Vec2, Vec3, Vec4};

/// World-space ray through a pixel of a `width` x `height` backing store.
///
/// Returns `(ray_origin, ray_direction)`.
pub fn screen_to_world_ray(
    camera: &Camera,
    width: f32,
    height: f32,
    sx: f32,
    sy: f32,
) -> (Vec3, Vec3) {
    let ndc_x = (2.0 * sx / width.max(1.0)) - 1.0;
    let ndc_y = 1.0 - (2.0 * sy / height.max(1.0));
    let inv = camera.view_proj().inverse();
    let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    let p1: Vec3 = p_far.truncate() / p_far.w;
    let ro = camera.eye;
    let rd = (p1 - ro).normalize_or_zero();
    (ro, rd)
}

/// Pixel position of a world point, `None` when it is behind the camera or
/// outside the clip volume.
pub fn world_to_screen(camera: &Camera, width: f32, height: f32, world: Vec3) -> Option<Vec2> {
    let clip = camera.view_proj() * world.extend(1.0);
    if clip.w <= 1e-5 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || !(0.0..=1.0).contains(&ndc.z) {
        return None;
    }
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * width,
        (1.0 - ndc.y) * 0.5 * height,
    ))
}
