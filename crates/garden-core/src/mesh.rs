//! Procedural flower geometry with a cylinder fallback.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::TAU;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    /// 0 = stem, 1 = petal; the shader tints petals with the instance color.
    pub petal: f32,
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}

/// Open cylinder along +Y, triangle list.
pub fn cylinder(radius: f32, height: f32, segments: u32, petal: f32) -> Mesh {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity(segments as usize * 6);
    for i in 0..segments {
        let a0 = TAU * i as f32 / segments as f32;
        let a1 = TAU * (i + 1) as f32 / segments as f32;
        let (s0, c0) = a0.sin_cos();
        let (s1, c1) = a1.sin_cos();
        let v = |c: f32, s: f32, y: f32| MeshVertex {
            pos: [c * radius, y, s * radius],
            normal: [c, 0.0, s],
            petal,
        };
        vertices.extend_from_slice(&[
            v(c0, s0, 0.0),
            v(c1, s1, 0.0),
            v(c1, s1, height),
            v(c0, s0, 0.0),
            v(c1, s1, height),
            v(c0, s0, height),
        ]);
    }
    Mesh { vertices }
}

/// Stem plus a ring of flat petals at the top. `None` for degenerate parameters.
pub fn flower(petals: u32, stem_height: f32, petal_length: f32) -> Option<Mesh> {
    if petals < 3 || stem_height <= 0.0 || petal_length <= 0.0 {
        return None;
    }
    let mut mesh = cylinder(0.035, stem_height, 6, 0.0);
    let y = stem_height;
    let half_width = TAU / petals as f32 * 0.35;
    let up = [0.0, 1.0, 0.0];
    for i in 0..petals {
        let a = TAU * i as f32 / petals as f32;
        let tip = [a.cos() * petal_length, y + 0.06, a.sin() * petal_length];
        let left = [
            (a - half_width).cos() * petal_length * 0.45,
            y + 0.02,
            (a - half_width).sin() * petal_length * 0.45,
        ];
        let right = [
            (a + half_width).cos() * petal_length * 0.45,
            y + 0.02,
            (a + half_width).sin() * petal_length * 0.45,
        ];
        let center = [0.0, y, 0.0];
        for pos in [center, left, tip, center, tip, right] {
            mesh.vertices.push(MeshVertex {
                pos,
                normal: up,
                petal: 1.0,
            });
        }
    }
    Some(mesh)
}

/// Flower geometry, or a plain cylinder when the flower cannot be built.
pub fn flower_or_placeholder(petals: u32, stem_height: f32, petal_length: f32) -> Mesh {
    match flower(petals, stem_height, petal_length) {
        Some(mesh) if !mesh.is_empty() => mesh,
        _ => {
            log::warn!("[mesh] flower geometry unavailable; using cylinder placeholder");
            cylinder(0.12, stem_height.max(0.4), 10, 1.0)
        }
    }
}

/// Flat disk in the XZ plane, triangle fan expanded to a list.
pub fn ground_disk(radius: f32, segments: u32) -> Vec<[f32; 3]> {
    let segments = segments.max(3);
    let mut out = Vec::with_capacity(segments as usize * 3);
    for i in 0..segments {
        let a0 = TAU * i as f32 / segments as f32;
        let a1 = TAU * (i + 1) as f32 / segments as f32;
        out.push([0.0, 0.0, 0.0]);
        out.push([a1.cos() * radius, 0.0, a1.sin() * radius]);
        out.push([a0.cos() * radius, 0.0, a0.sin() * radius]);
    }
    out
}
