// Host-side tests for front-end constants and their relationships.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;
use garden_core::constants::{GARDEN_RADIUS, MIN_SEPARATION};
use std::collections::HashSet;

#[test]
#[allow(clippy::assertions_on_constants)]
fn orbit_limits_are_well_formed() {
    assert!(ORBIT_PITCH_MIN > 0.0, "camera must stay above the ground");
    assert!(ORBIT_PITCH_MAX < std::f32::consts::FRAC_PI_2);
    assert!(ORBIT_PITCH_MIN < ORBIT_PITCH_MAX);
    assert!(ORBIT_DISTANCE_MIN > 0.0 && ORBIT_DISTANCE_MIN < ORBIT_DISTANCE_MAX);
    assert!(ORBIT_YAW_PER_PX > 0.0 && ORBIT_PITCH_PER_PX > 0.0);
    assert!(ORBIT_ZOOM_PER_WHEEL > 0.0 && ORBIT_ZOOM_PER_WHEEL < 0.01);
    assert!(CAMERA_IDLE_MS > 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn picking_spheres_do_not_swallow_neighbours() {
    // two flowers at minimum separation keep distinct pick targets
    assert!(PICK_SPHERE_RADIUS * 2.0 <= MIN_SEPARATION);
    assert!(PICK_CENTER_HEIGHT > 0.0);
    assert!(PICK_CENTER_HEIGHT <= FLOWER_STEM_HEIGHT + FLOWER_PETAL_LENGTH);
    assert!(ORBIT_DISTANCE_MAX > GARDEN_RADIUS);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn colors_and_audio_levels_are_in_range() {
    for c in [CLEAR_COLOR, GROUND_COLOR, FOG_COLOR] {
        assert!(c.iter().all(|v| (0.0..=1.0).contains(v)));
    }
    assert!(HOVER_BRIGHTEN > 1.0);
    assert!(WILT_DARKEN > 0.0 && WILT_DARKEN < 1.0);
    assert!(DRONE_LEVEL > 0.0 && DRONE_LEVEL <= 0.25);
    assert!(DRONE_BASE_HZ > 20.0 && DRONE_LOWPASS_HZ > DRONE_BASE_HZ * DRONE_FIFTH_RATIO);
    assert!(MUTE_RAMP_SEC > 0.0);
}

#[test]
fn dom_ids_and_storage_keys_are_unique() {
    let ids = [
        CANVAS_ID,
        INTRO_OVERLAY_ID,
        BEGIN_BUTTON_ID,
        SKIP_BUTTON_ID,
        RITUAL_OVERLAY_ID,
        COUNTDOWN_ID,
        RITUAL_BAR_ID,
        TRANSITION_SECTION_ID,
        GARDEN_UI_ID,
        MUTE_BUTTON_ID,
        PLANT_INPUT_ID,
        PLANT_BUTTON_ID,
        NAME_INPUT_ID,
        MESSAGE_INPUT_ID,
        MESSAGE_BUTTON_ID,
        MESSAGE_LIST_ID,
        REVIVE_BUTTON_ID,
        EDIT_BUTTON_ID,
        STATUS_ID,
        LABEL_LAYER_ID,
    ];
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());

    let keys = [
        STORAGE_USER_ID,
        STORAGE_USER_NAME,
        STORAGE_MUTED,
        STORAGE_RITUAL_DONE,
        STORAGE_MESSAGES,
    ];
    let unique: HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
}

#[test]
fn api_paths_match_the_server_routes() {
    assert_eq!(API_FLOWERS, "/api/flowers");
    assert_eq!(API_MESSAGES, "/api/messages");
    assert!(API_MESSAGES_STREAM.starts_with(API_MESSAGES));
}
