// Host-side tests for the deterministic layout engine.

use garden_core::constants::{GARDEN_RADIUS, MIN_SEPARATION};
use garden_core::palette::{
    format_hex_color, palette_for_family, parse_hex_color, pick_palette_color, BRIGHT, ROSA,
};
use garden_core::*;
use glam::Vec3;

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("flower-{i:04}")).collect()
}

#[test]
fn seeded_generator_repeats_for_same_seed() {
    for id in ids(20) {
        let mut a = seeded_generator(&id);
        let mut b = seeded_generator(&id);
        for _ in 0..64 {
            assert_eq!(a().to_bits(), b().to_bits(), "stream diverged for {id}");
        }
    }
}

#[test]
fn seeded_generator_stays_in_unit_interval() {
    let mut next = seeded_generator("bounds");
    for _ in 0..10_000 {
        let v = next();
        assert!((0.0..1.0).contains(&v), "value out of range: {v}");
    }
}

#[test]
fn different_seeds_give_different_streams() {
    let mut a = seeded_generator("a");
    let mut b = seeded_generator("b");
    let sa: Vec<u32> = (0..8).map(|_| a().to_bits()).collect();
    let sb: Vec<u32> = (0..8).map(|_| b().to_bits()).collect();
    assert_ne!(sa, sb);
}

#[test]
fn fnv_hash_matches_reference_values() {
    assert_eq!(hash_str(""), 0x811C_9DC5);
    assert_eq!(hash_str("a"), 0xE40C_292C);
}

#[test]
fn random_positions_lie_on_the_ground_ring() {
    for id in ids(500) {
        let p = position_for(&FlowerRecord::new(id.clone()));
        assert_eq!(p.y, 0.0);
        let r = (p.x * p.x + p.z * p.z).sqrt();
        assert!(r >= 3.0 - 1e-4 && r < 12.0 + 1e-4, "radius {r} out of range for {id}");
    }
}

#[test]
fn position_is_pure_function_of_id() {
    let a = FlowerRecord {
        message: Some("hola".into()),
        ..FlowerRecord::new("same-id")
    };
    let b = FlowerRecord {
        family: Some("rosa".into()),
        ..FlowerRecord::new("same-id")
    };
    assert_eq!(position_for(&a), position_for(&b));
}

#[test]
fn stored_position_is_authoritative_with_floored_height() {
    let record = FlowerRecord {
        x: Some(1.5),
        y: Some(-2.0),
        z: Some(-4.0),
        ..FlowerRecord::new("stored")
    };
    assert_eq!(position_for(&record), Vec3::new(1.5, 0.0, -4.0));

    let partial = FlowerRecord {
        x: Some(1.5),
        z: Some(-4.0),
        ..FlowerRecord::new("stored")
    };
    assert_eq!(partial.stored_position(), None);
    assert_eq!(position_for(&partial).y, 0.0);
}

#[test]
fn clamp_to_disk_keeps_inner_points_and_projects_outer_ones() {
    assert_eq!(clamp_to_disk(1.0, 2.0, 10.0), (1.0, 2.0));
    let (x, z) = clamp_to_disk(30.0, 40.0, 10.0);
    let d = (x * x + z * z).sqrt();
    assert!((d - 9.8).abs() < 1e-4, "projected distance {d}");
    // direction preserved
    assert!((z / x - 40.0 / 30.0).abs() < 1e-4);
}

#[test]
fn clamp_to_disk_bound_holds_on_a_sweep() {
    let radius = 12.5;
    for i in 0..200 {
        let a = i as f32 * 0.1;
        for r in [0.0, 5.0, 12.24, 12.3, 12.5, 13.0, 100.0] {
            let (x, z) = clamp_to_disk(r * a.cos(), r * a.sin(), radius);
            let d = (x * x + z * z).sqrt();
            assert!(d <= radius * 0.98 + 1e-3, "distance {d} for r={r}");
        }
    }
}

#[test]
fn free_cell_returns_base_unchanged() {
    let mut grid = OccupancyGrid::new(MIN_SEPARATION);
    let base = Vec3::new(4.0, 0.0, 1.0);
    assert_eq!(resolve_non_overlapping_position(base, &mut grid, "x"), base);
    assert_eq!(grid.len(), 1);
}

#[test]
fn occupied_cell_moves_to_a_different_free_cell() {
    let mut grid = OccupancyGrid::new(MIN_SEPARATION);
    let base = Vec3::new(4.0, 0.0, 1.0);
    let first = resolve_non_overlapping_position(base, &mut grid, "first");
    let second = resolve_non_overlapping_position(base, &mut grid, "second");
    assert_eq!(first, base);
    assert_ne!(second, base);
    assert_ne!(
        grid.cell_of(first.x, first.z),
        grid.cell_of(second.x, second.z)
    );
    assert_eq!(grid.len(), 2);
}

#[test]
fn exhausted_spiral_returns_base() {
    let cfg = LayoutConfig {
        max_spiral_steps: 0,
        ..LayoutConfig::default()
    };
    let mut grid = OccupancyGrid::new(cfg.min_separation);
    let base = Vec3::new(-2.0, 0.0, 6.0);
    assert!(resolve_with_config(base, &mut grid, "a", &cfg).claimed);
    let again = resolve_with_config(base, &mut grid, "b", &cfg);
    assert!(!again.claimed);
    assert_eq!(again.position, base);
}

#[test]
fn layout_pass_is_order_deterministic_and_cells_are_unique() {
    let records: Vec<FlowerRecord> = ids(300).into_iter().map(FlowerRecord::new).collect();
    let layout = GardenLayout::default();
    let a = layout.place(&records, None);
    let b = layout.place(&records, None);
    assert_eq!(a, b);

    let grid = OccupancyGrid::new(layout.config.min_separation);
    let mut seen = std::collections::HashSet::new();
    for f in a.iter().filter(|f| !f.overlapping) {
        let d = (f.position.x * f.position.x + f.position.z * f.position.z).sqrt();
        assert!(d <= GARDEN_RADIUS * 0.98 + 1e-3);
        assert!(
            seen.insert(grid.cell_of(f.position.x, f.position.z)),
            "two flowers share a cell near {:?}",
            f.position
        );
    }
}

#[test]
fn flowers_stored_past_the_rim_claim_the_cell_they_are_drawn_in() {
    let records: Vec<FlowerRecord> = (0..20)
        .map(|i| {
            let mut r = FlowerRecord::new(format!("rim-{i}"));
            r.x = Some(GARDEN_RADIUS + 0.2);
            r.y = Some(0.0);
            r.z = Some(0.0);
            r
        })
        .collect();
    let layout = GardenLayout::default();
    let placed = layout.place(&records, None);

    let grid = OccupancyGrid::new(layout.config.min_separation);
    let mut owners = std::collections::HashMap::new();
    for f in placed.iter().filter(|f| !f.overlapping) {
        let d = f.position.x.hypot(f.position.z);
        assert!(d <= GARDEN_RADIUS * 0.98 + 1e-3, "{} left the disk", f.id);
        let cell = grid.cell_of(f.position.x, f.position.z);
        if let Some(other) = owners.insert(cell, f.id.clone()) {
            panic!("{other} and {} share cell {cell:?}", f.id);
        }
    }
    assert!(owners.len() > 1);
}

#[test]
fn prefix_of_records_places_identically() {
    let records: Vec<FlowerRecord> = ids(50).into_iter().map(FlowerRecord::new).collect();
    let layout = GardenLayout::default();
    let full = layout.place(&records, None);
    let prefix = layout.place(&records[..20], None);
    assert_eq!(&full[..20], &prefix[..]);
}

#[test]
fn derived_visuals_are_stable_and_bounded() {
    let cfg = LayoutConfig::default();
    for id in ids(200) {
        let s = scale_for(&id, &cfg);
        assert_eq!(s, scale_for(&id, &cfg));
        assert!(s >= cfg.base_scale * 0.91 - 1e-5 && s <= cfg.base_scale * 1.09 + 1e-5);
        assert_eq!(tilt_for(&id, true), (0.0, 0.0));
        let (_, amount) = tilt_for(&id, false);
        assert!(amount >= 0.15 && amount < 0.45 + 1e-5);
        assert_eq!(rotation_phase_for(&id), rotation_phase_for(&id));
    }
}

#[test]
fn wilted_flowers_tilt_and_owner_is_marked() {
    let records = vec![
        FlowerRecord {
            wilted: Some(true),
            user_id: Some("me".into()),
            ..FlowerRecord::new("w")
        },
        FlowerRecord::new("a"),
    ];
    let placed = GardenLayout::default().place(&records, Some("me"));
    assert!(!placed[0].alive && placed[0].tilt_amount > 0.0);
    assert!(placed[0].mine);
    assert!(placed[1].alive && placed[1].tilt_amount == 0.0);
    assert!(!placed[1].mine);
}

#[test]
fn color_override_wins_and_bad_override_falls_back() {
    let explicit = FlowerRecord {
        color: Some("#ff0000".into()),
        ..FlowerRecord::new("c")
    };
    assert_eq!(pick_palette_color(&explicit), [1.0, 0.0, 0.0]);

    let broken = FlowerRecord {
        color: Some("not-a-color".into()),
        family: Some("rosa".into()),
        ..FlowerRecord::new("c")
    };
    assert!(ROSA.contains(&pick_palette_color(&broken)));
}

#[test]
fn palette_pick_uses_family_and_is_deterministic() {
    for id in ids(50) {
        let rec = FlowerRecord {
            family: Some("Rosa".into()),
            ..FlowerRecord::new(id.clone())
        };
        let c = pick_palette_color(&rec);
        assert!(ROSA.contains(&c));
        assert_eq!(c, pick_palette_color(&rec));

        let unknown = FlowerRecord {
            family: Some("cactus".into()),
            ..FlowerRecord::new(id)
        };
        assert!(BRIGHT.contains(&pick_palette_color(&unknown)));
    }
    assert_eq!(palette_for_family(None), BRIGHT);
}

#[test]
fn hex_parser_accepts_short_and_long_forms() {
    assert_eq!(parse_hex_color("#fff"), Some([1.0, 1.0, 1.0]));
    assert_eq!(parse_hex_color("000000"), Some([0.0, 0.0, 0.0]));
    assert_eq!(parse_hex_color("#12345"), None);
    assert_eq!(parse_hex_color("#ññ"), None);
}

#[test]
fn hex_formatting_round_trips_palette_colors() {
    assert_eq!(format_hex_color([1.0, 0.0, 0.5]), "#ff0080");
    for &c in ROSA {
        let back = parse_hex_color(&format_hex_color(c)).unwrap();
        for i in 0..3 {
            assert!((back[i] - c[i]).abs() <= 0.5 / 255.0 + 1e-6);
        }
    }
}

#[test]
fn pins_include_must_shows_and_respect_budget() {
    let positions: Vec<(String, Vec3)> = (0..40)
        .map(|i| (format!("p{i}"), Vec3::new(i as f32 * 0.1, 0.0, 0.0)))
        .collect();
    let flowers: Vec<(&str, Vec3)> = positions.iter().map(|(id, p)| (id.as_str(), *p)).collect();
    let cfg = PinConfig {
        max_pins: 5,
        max_radius: 100.0,
        refresh_ms: 100.0,
    };
    let query = PinQuery {
        focus: Vec3::ZERO,
        own: Some("p30"),
        hovered: Some("p20"),
        selected: Some("p30"),
        flowers: &flowers,
    };
    let pins = select_pins(&query, &cfg);
    assert_eq!(pins, vec!["p30", "p20", "p0", "p1", "p2"]);
}

#[test]
fn pins_skip_far_flowers() {
    let flowers = [("near", Vec3::new(1.0, 0.0, 0.0)), ("far", Vec3::new(50.0, 0.0, 0.0))];
    let query = PinQuery {
        focus: Vec3::ZERO,
        own: None,
        hovered: None,
        selected: None,
        flowers: &flowers,
    };
    assert_eq!(select_pins(&query, &PinConfig::default()), vec!["near"]);
}

#[test]
fn pin_selector_waits_for_interval_and_idle_camera() {
    let flowers = [("a", Vec3::ZERO)];
    let query = PinQuery {
        focus: Vec3::ZERO,
        own: None,
        hovered: None,
        selected: None,
        flowers: &flowers,
    };
    let mut sel = PinSelector::new(PinConfig {
        refresh_ms: 250.0,
        ..PinConfig::default()
    });
    assert!(!sel.refresh(0.0, true, &query), "moving camera must not refresh");
    assert!(sel.refresh(10.0, false, &query));
    assert!(sel.is_pinned("a"));
    assert!(!sel.refresh(100.0, false, &query));
    assert!(sel.refresh(300.0, false, &query));
}
