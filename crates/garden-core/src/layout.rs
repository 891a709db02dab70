//! Deterministic flower placement on the ground disk.
//!
//! Every derived attribute is a pure function of the record id (plus the
//! occupancy claimed by records placed before it). Records must be placed in a
//! stable order, usually the order the server returned them in.

use crate::constants::*;
use crate::palette::{pick_palette_color, Rgb};
use crate::records::FlowerRecord;
use crate::rng::{attribute_rng, SeededRng};
use fnv::FnvHashSet;
use glam::Vec3;
use std::f32::consts::TAU;

#[derive(Clone, Debug)]
pub struct LayoutConfig {
    pub min_radius: f32,
    pub max_radius: f32,
    pub disk_radius: f32,
    pub min_separation: f32,
    pub max_spiral_steps: usize,
    pub spiral_radius_step: f32,
    pub spiral_angle_step: f32,
    pub base_scale: f32,
    pub scale_jitter: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_radius: PLACEMENT_MIN_RADIUS,
            max_radius: PLACEMENT_MAX_RADIUS,
            disk_radius: GARDEN_RADIUS,
            min_separation: MIN_SEPARATION,
            max_spiral_steps: MAX_SPIRAL_STEPS,
            spiral_radius_step: SPIRAL_RADIUS_STEP,
            spiral_angle_step: SPIRAL_ANGLE_STEP,
            base_scale: BASE_SCALE,
            scale_jitter: SCALE_JITTER,
        }
    }
}

/// Base position: stored coordinates when complete, otherwise a seeded polar sample.
pub fn position_for(record: &FlowerRecord) -> Vec3 {
    position_with_radii(record, PLACEMENT_MIN_RADIUS, PLACEMENT_MAX_RADIUS)
}

fn position_with_radii(record: &FlowerRecord, min_radius: f32, max_radius: f32) -> Vec3 {
    if let Some(p) = record.stored_position() {
        return Vec3::new(p.x, p.y.max(0.0), p.z);
    }
    let mut rng = SeededRng::from_seed_str(&record.id);
    let r = rng.range(min_radius, max_radius);
    let a = rng.range(0.0, TAU);
    Vec3::new(r * a.cos(), 0.0, r * a.sin())
}

/// Keep `(x, z)` inside `radius * DISK_MARGIN`, projecting radially when outside.
pub fn clamp_to_disk(x: f32, z: f32, radius: f32) -> (f32, f32) {
    let limit = radius * DISK_MARGIN;
    let len = (x * x + z * z).sqrt();
    if len <= limit || len <= f32::EPSILON {
        return (x, z);
    }
    let s = limit / len;
    (x * s, z * s)
}

/// Square-cell occupancy over the ground plane.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    cell_size: f32,
    cells: FnvHashSet<(i32, i32)>,
}

impl OccupancyGrid {
    pub fn new(min_separation: f32) -> Self {
        Self {
            cell_size: (min_separation * CELL_SIZE_FACTOR).max(1e-3),
            cells: FnvHashSet::default(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn cell_of(&self, x: f32, z: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (z / self.cell_size).floor() as i32,
        )
    }

    #[inline]
    pub fn is_free(&self, cell: (i32, i32)) -> bool {
        !self.cells.contains(&cell)
    }

    /// Returns `false` when the cell was already taken.
    #[inline]
    pub fn claim(&mut self, cell: (i32, i32)) -> bool {
        self.cells.insert(cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Outcome of a non-overlap search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved {
    pub position: Vec3,
    /// `false` when the spiral budget ran out and `position` is the unclaimed base.
    pub claimed: bool,
}

/// Claim the base cell, or walk a seeded outward spiral to the first free cell.
/// Base and candidates are clamped to the disk before their cell is claimed.
pub fn resolve_non_overlapping_position(
    base: Vec3,
    grid: &mut OccupancyGrid,
    id: &str,
) -> Vec3 {
    resolve_with_config(base, grid, id, &LayoutConfig::default()).position
}

pub fn resolve_with_config(
    base: Vec3,
    grid: &mut OccupancyGrid,
    id: &str,
    cfg: &LayoutConfig,
) -> Resolved {
    // claim the cell the flower is drawn in, after the disk clamp
    let on_disk = |p: Vec3| {
        let (x, z) = clamp_to_disk(p.x, p.z, cfg.disk_radius);
        Vec3::new(x, p.y, z)
    };
    let base = on_disk(base);
    let base_cell = grid.cell_of(base.x, base.z);
    if grid.claim(base_cell) {
        return Resolved {
            position: base,
            claimed: true,
        };
    }
    let mut rng = attribute_rng(id, "spiral");
    let mut angle = rng.range(0.0, TAU);
    for step in 1..=cfg.max_spiral_steps {
        let r = cfg.spiral_radius_step * step as f32;
        let candidate = on_disk(Vec3::new(
            base.x + r * angle.cos(),
            base.y,
            base.z + r * angle.sin(),
        ));
        if grid.claim(grid.cell_of(candidate.x, candidate.z)) {
            return Resolved {
                position: candidate,
                claimed: true,
            };
        }
        angle += cfg.spiral_angle_step;
    }
    log::debug!("[layout] spiral budget exhausted for {id}; accepting overlap");
    Resolved {
        position: base,
        claimed: false,
    }
}

/// Seeded scale around the configured base.
pub fn scale_for(id: &str, cfg: &LayoutConfig) -> f32 {
    let mut rng = attribute_rng(id, "scale");
    cfg.base_scale * (1.0 + rng.range(-cfg.scale_jitter, cfg.scale_jitter))
}

/// `(direction, amount)` in radians; alive flowers stand upright.
pub fn tilt_for(id: &str, alive: bool) -> (f32, f32) {
    if alive {
        return (0.0, 0.0);
    }
    let mut rng = attribute_rng(id, "tilt");
    let direction = rng.range(0.0, TAU);
    let amount = rng.range(WILT_TILT_MIN, WILT_TILT_MAX);
    (direction, amount)
}

pub fn rotation_phase_for(id: &str) -> f32 {
    attribute_rng(id, "spin").range(0.0, TAU)
}

/// Render-ready attributes for one record.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedFlower {
    pub id: String,
    pub position: Vec3,
    pub color: Rgb,
    pub scale: f32,
    pub tilt_direction: f32,
    pub tilt_amount: f32,
    pub rotation_phase: f32,
    pub alive: bool,
    pub mine: bool,
    /// Set when the spiral budget ran out and this flower may overlap another.
    pub overlapping: bool,
}

/// One layout pass; owns its occupancy grid for the duration of the pass.
pub struct GardenLayout {
    pub config: LayoutConfig,
}

impl Default for GardenLayout {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl GardenLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn place(
        &self,
        records: &[FlowerRecord],
        local_user_id: Option<&str>,
    ) -> Vec<PlacedFlower> {
        let cfg = &self.config;
        let mut grid = OccupancyGrid::new(cfg.min_separation);
        let mut out = Vec::with_capacity(records.len());
        let mut overlaps = 0usize;
        for record in records {
            let base = position_with_radii(record, cfg.min_radius, cfg.max_radius);
            let resolved = resolve_with_config(base, &mut grid, &record.id, cfg);
            if !resolved.claimed {
                overlaps += 1;
            }
            let alive = record.is_alive();
            let (tilt_direction, tilt_amount) = tilt_for(&record.id, alive);
            out.push(PlacedFlower {
                id: record.id.clone(),
                position: resolved.position,
                color: pick_palette_color(record),
                scale: scale_for(&record.id, cfg),
                tilt_direction,
                tilt_amount,
                rotation_phase: rotation_phase_for(&record.id),
                alive,
                mine: record.is_mine(local_user_id),
                overlapping: !resolved.claimed,
            });
        }
        if overlaps > 0 {
            log::info!(
                "[layout] placed {} flowers, {} without a free cell",
                out.len(),
                overlaps
            );
        }
        out
    }
}
