// Host-side tests for the page's flower bed: optimistic plantings, server
// confirmation and stable placement.

#![allow(dead_code)]
#[path = "../src/garden.rs"]
mod garden;

use garden::FlowerBed;
use garden_core::{FlowerRecord, GardenLayout, NewFlower};

const ME: &str = "visitor-me";

fn row(id: &str, ts: &str) -> FlowerRecord {
    FlowerRecord {
        id: id.to_string(),
        created_at: ts.to_string(),
        wilted: Some(false),
        ..Default::default()
    }
}

fn snapshot(n: usize) -> Vec<FlowerRecord> {
    // newest first, as the server lists them
    (0..n)
        .rev()
        .map(|i| row(&format!("f{i}"), &format!("2026-01-01T00:00:{i:02}.000Z")))
        .collect()
}

fn bed() -> FlowerBed {
    FlowerBed::new(GardenLayout::default(), 200, Some(ME.to_string()))
}

#[test]
fn snapshot_is_placed_in_record_order() {
    let mut b = bed();
    b.apply_snapshot(snapshot(5));
    assert_eq!(b.records().len(), 5);
    assert_eq!(b.records()[0].id, "f4");
    let placed: Vec<&str> = b.placed().iter().map(|p| p.id.as_str()).collect();
    let records: Vec<&str> = b.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(placed, records);
}

#[test]
fn newer_flowers_do_not_move_older_ones() {
    let mut b = bed();
    b.apply_snapshot(snapshot(20));
    let before: Vec<_> = b.placed().iter().map(|p| (p.id.clone(), p.position)).collect();

    b.upsert(row("fresh", "2026-01-01T00:01:00.000Z"));
    assert_eq!(b.records()[0].id, "fresh");
    for (id, pos) in before {
        assert_eq!(b.placed_flower(&id).unwrap().position, pos, "{id} moved");
    }
}

#[test]
fn planting_shows_a_placeholder_and_fills_the_request() {
    let mut b = bed();
    b.apply_snapshot(snapshot(3));
    let mut body = NewFlower {
        message: Some("for you".into()),
        user_id: Some(ME.into()),
        ..Default::default()
    };
    let local = b.push_optimistic(&mut body, "2026-01-01T00:05:00.000Z");

    assert!(garden_core::is_local_id(&local));
    assert_eq!(b.records()[0].id, local);
    assert_eq!(b.pending_len(), 1);
    let placed = b.placed_flower(&local).unwrap();
    assert!(placed.mine);
    assert_eq!(body.x, Some(placed.position.x));
    assert_eq!(body.z, Some(placed.position.z));
    let color = body.color.as_deref().unwrap();
    assert!(color.starts_with('#') && color.len() == 7);
    assert_eq!(b.own_latest(), Some(local.as_str()));
}

#[test]
fn confirmation_replaces_the_placeholder_in_place() {
    let mut b = bed();
    b.apply_snapshot(snapshot(3));
    let mut body = NewFlower {
        message: Some("hello world".into()),
        user_id: Some(ME.into()),
        ..Default::default()
    };
    let local = b.push_optimistic(&mut body, "2026-01-01T00:05:00.000Z");
    let spot = b.placed_flower(&local).unwrap().position;

    let mut server = row("2b1f4c8e-0000-4000-8000-000000000001", "2026-01-01T00:05:00.120Z");
    server.message = body.message.clone();
    server.user_id = body.user_id.clone();
    server.color = body.color.clone();
    server.x = body.x;
    server.y = body.y;
    server.z = body.z;
    b.confirm(&local, server.clone());

    assert_eq!(b.pending_len(), 0);
    assert!(b.record(&local).is_none());
    assert_eq!(b.records().len(), 4);
    let placed = b.placed_flower(&server.id).unwrap();
    assert!((placed.position - spot).length() < 1e-4);
    assert_eq!(b.own_latest(), Some(server.id.as_str()));
}

#[test]
fn repeated_plantings_with_the_same_message_both_show() {
    let mut b = bed();
    let mut existing = row("old", "2026-01-01T00:00:00.000Z");
    existing.user_id = Some(ME.into());
    b.apply_snapshot(vec![existing]);

    let mut body = NewFlower {
        user_id: Some(ME.into()),
        ..Default::default()
    };
    let first = b.push_optimistic(&mut body.clone(), "2026-01-01T00:01:00.000Z");
    let second = b.push_optimistic(&mut body, "2026-01-01T00:02:00.000Z");
    assert_ne!(first, second);
    assert_eq!(b.records().len(), 3);
    assert!(b.record(&first).is_some() && b.record(&second).is_some());
}

#[test]
fn rejected_planting_is_discarded() {
    let mut b = bed();
    let mut body = NewFlower::default();
    let local = b.push_optimistic(&mut body, "2026-01-01T00:00:00.000Z");
    assert!(b.discard_optimistic(&local));
    assert!(!b.discard_optimistic(&local));
    assert!(b.records().is_empty());
    assert!(b.placed().is_empty());
}

#[test]
fn revived_row_replaces_the_wilted_one() {
    let mut b = bed();
    let mut wilted = row("w", "2026-01-01T00:00:00.000Z");
    wilted.wilted = Some(true);
    b.apply_snapshot(vec![wilted.clone()]);
    assert!(!b.placed_flower("w").unwrap().alive);

    let mut revived = wilted;
    revived.wilted = Some(false);
    revived.revived_at = Some("2026-01-02T00:00:00.000Z".into());
    b.upsert(revived);
    assert_eq!(b.records().len(), 1);
    assert!(b.placed_flower("w").unwrap().alive);
}

#[test]
fn list_is_capped_at_the_limit() {
    let mut b = FlowerBed::new(GardenLayout::default(), 4, None);
    b.apply_snapshot(snapshot(10));
    assert_eq!(b.records().len(), 4);
    assert_eq!(b.placed().len(), 4);
    assert_eq!(b.records()[0].id, "f9");
    assert_eq!(b.own_latest(), None);
}
