// Host-side tests for the ritual/garden timeline, camera rig and scheduler.

use garden_core::*;
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn ritual_countdown_reports_elapsed_remaining_and_progress() {
    let mut c = RitualCountdown::new(60_000.0);
    c.start(1_000.0);
    let t = c.tick(1_000.0);
    assert_eq!(t.remaining_sec, 60);
    assert_eq!(t.progress, 0.0);

    let t = c.tick(31_500.0);
    assert_eq!(t.elapsed_ms, 30_500.0);
    assert_eq!(t.remaining_sec, 30);
    assert!((t.progress - 30_500.0 / 60_000.0).abs() < 1e-6);

    let t = c.tick(200_000.0);
    assert_eq!(t.remaining_sec, 0);
    assert_eq!(t.progress, 1.0);
}

#[test]
fn ritual_elapsed_never_goes_backwards() {
    let mut c = RitualCountdown::new(60_000.0);
    c.start(0.0);
    c.tick(10_000.0);
    let t = c.tick(5_000.0);
    assert_eq!(t.elapsed_ms, 10_000.0);
}

#[test]
fn completion_fires_exactly_once() {
    let fired = Rc::new(Cell::new(0u32));
    let mut tl = TimelineController::default();
    let f = fired.clone();
    tl.on_ritual_complete(move || f.set(f.get() + 1));

    assert!(tl.begin_ritual(0.0));
    assert_eq!(tl.phase(), Phase::Ritual);
    tl.tick(59_999.0);
    assert_eq!(fired.get(), 0);

    let update = tl.tick(60_000.0);
    assert_eq!(update.entered, Some(Phase::Transition));
    assert_eq!(update.ritual.map(|r| r.progress), Some(1.0));
    assert_eq!(fired.get(), 1);

    for extra in 1..20 {
        tl.tick(60_000.0 + extra as f64 * 16.0);
    }
    assert_eq!(fired.get(), 1);
    assert_eq!(tl.phase(), Phase::Transition);
    assert!(tl.is_ritual_complete());
}

#[test]
fn phases_only_move_forward() {
    let mut tl = TimelineController::default();
    // scroll is ignored before the transition
    assert_eq!(tl.observe_scroll(-10_000.0, 100.0, 800.0).entered, None);
    assert_eq!(tl.phase(), Phase::Intro);

    assert!(tl.begin_ritual(0.0));
    assert!(!tl.begin_ritual(5.0), "second begin must be ignored");
    tl.tick(60_000.0);
    assert_eq!(tl.phase(), Phase::Transition);

    let update = tl.observe_scroll(-2_000.0, 2_000.0, 800.0);
    assert_eq!(update.entered, Some(Phase::Garden));
    assert_eq!(tl.phase(), Phase::Garden);

    // scrolling back up does not leave the garden
    tl.observe_scroll(800.0, 2_000.0, 800.0);
    assert_eq!(tl.phase(), Phase::Garden);
    assert_eq!(tl.transition_progress(), 1.0);
    assert!(!tl.enter_garden());
}

#[test]
fn scroll_progress_endpoints() {
    let (h, vh) = (1_500.0, 900.0);
    assert_eq!(scroll_progress(vh, h, vh), 0.0);
    assert_eq!(scroll_progress(-h, h, vh), 1.0);
    let mid = scroll_progress((vh - h) / 2.0, h, vh);
    assert!((mid - 0.5).abs() < 1e-6);
    // clamped outside the range
    assert_eq!(scroll_progress(vh * 3.0, h, vh), 0.0);
    assert_eq!(scroll_progress(-h * 3.0, h, vh), 1.0);
    // degenerate sizes
    assert_eq!(scroll_progress(0.0, 0.0, 0.0), 0.0);
}

#[test]
fn scroll_tracker_suppresses_tiny_deltas() {
    let mut tr = ScrollTracker::new(1e-3);
    let (h, vh) = (1_000.0, 1_000.0);
    assert_eq!(tr.observe(vh, h, vh), Some(0.0));
    // 0.1 px of a 2000 px span is far below epsilon
    assert_eq!(tr.observe(vh - 0.1, h, vh), None);
    let p = tr.observe(vh - 100.0, h, vh).expect("large move reported");
    assert!((p - 0.05).abs() < 1e-6);
    assert_eq!(tr.progress(), p);
}

#[test]
fn transition_below_threshold_stays_in_transition() {
    let mut tl = TimelineController::default();
    tl.begin_ritual(0.0);
    tl.tick(60_000.0);
    let (h, vh) = (1_000.0, 1_000.0);
    // progress 0.5
    let update = tl.observe_scroll(0.0, h, vh);
    assert_eq!(update.transition_progress, Some(0.5));
    assert_eq!(update.entered, None);
    assert_eq!(tl.phase(), Phase::Transition);
}

#[test]
fn ease_in_out_is_monotonic_with_fixed_ends() {
    assert_eq!(ease_in_out(0.0), 0.0);
    assert_eq!(ease_in_out(1.0), 1.0);
    assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
    let mut prev = 0.0;
    for i in 1..=100 {
        let v = ease_in_out(i as f32 / 100.0);
        assert!(v >= prev);
        prev = v;
    }
}

#[test]
fn camera_rig_snaps_once_then_frees() {
    let mut rig = CameraRig::default();
    match rig.update(0.0) {
        RigOutput::Interpolated(p) => {
            assert!(p.eye.distance(rig.wide_pose().eye) < 1e-5);
            assert!((p.fog_far - rig.wide_pose().fog_far).abs() < 1e-5);
        }
        other => panic!("expected interpolation, got {other:?}"),
    }
    assert!(matches!(rig.update(0.5), RigOutput::Interpolated(_)));
    assert!(matches!(rig.update(0.95), RigOutput::Snapped(_)));
    assert!(rig.is_free());
    for p in [0.96, 1.0, 0.2, 0.99] {
        assert_eq!(rig.update(p), RigOutput::Free);
    }
    assert_eq!(rig.release(), None);
}

#[test]
fn camera_rig_interpolation_moves_toward_entry() {
    let cfg = RigConfig::default();
    let mut rig = CameraRig::new(cfg.clone());
    let RigOutput::Interpolated(near_start) = rig.update(0.1) else {
        panic!("expected interpolation");
    };
    let RigOutput::Interpolated(near_end) = rig.update(0.9) else {
        panic!("expected interpolation");
    };
    let d0 = near_start.eye.distance(cfg.entry.eye);
    let d1 = near_end.eye.distance(cfg.entry.eye);
    assert!(d1 < d0);
}

#[test]
fn camera_matrices_are_finite() {
    let cam = Camera::from_pose(&RigConfig::default().settled, 16.0 / 9.0);
    let vp = cam.view_proj();
    assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
}

#[test]
fn frame_scheduler_ticks_only_while_running() {
    let clock = ManualClock::new(100.0);
    let mut s = FrameScheduler::new(clock.clone());
    assert_eq!(s.tick(), None);
    s.start();
    assert_eq!(
        s.tick(),
        Some(FrameTick {
            now_ms: 100.0,
            dt_ms: 0.0
        })
    );
    clock.advance(16.0);
    assert_eq!(s.tick().map(|t| t.dt_ms), Some(16.0));
    s.stop();
    clock.advance(16.0);
    assert_eq!(s.tick(), None);
    assert!(!s.is_running());
}

#[test]
fn scheduler_drives_ritual_to_completion() {
    let clock = ManualClock::new(0.0);
    let mut s = FrameScheduler::new(clock.clone());
    let mut state = AppState::new(TimelineController::default(), LocalUser::default(), false);
    let done = Rc::new(Cell::new(0));
    let d = done.clone();
    state.on_ritual_complete(move || d.set(d.get() + 1));
    s.start();
    state.begin_ritual(clock.now_ms());
    for _ in 0..4_000 {
        clock.advance(16.0);
        if let Some(tick) = s.tick() {
            state.tick(tick.now_ms);
        }
    }
    assert_eq!(done.get(), 1);
    let snap = state.snapshot();
    assert_eq!(snap.phase, Phase::Transition);
    assert_eq!(snap.ritual_progress, 1.0);
    assert_eq!(snap.remaining_sec, 0);
}

#[test]
fn app_state_mute_toggles() {
    let mut state = AppState::new(TimelineController::default(), LocalUser::default(), false);
    assert!(state.toggle_mute());
    assert!(state.snapshot().muted);
    assert!(!state.toggle_mute());
}

#[test]
fn interval_gate_fires_once_per_interval() {
    let mut g = IntervalGate::new(100.0);
    assert!(g.ready(0.0));
    assert!(!g.ready(50.0));
    assert!(g.ready(100.0));
    g.reset();
    assert!(g.ready(101.0));
}

#[test]
fn returning_visitor_skips_straight_to_the_garden() {
    let mut state = AppState::new(TimelineController::default(), LocalUser::default(), false);
    assert!(state.enter_garden());
    assert!(!state.enter_garden());
    let snap = state.snapshot();
    assert_eq!(snap.phase, Phase::Garden);
    assert_eq!(snap.transition_progress, 1.0);
    assert!(!state.begin_ritual(0.0), "ritual cannot start once in the garden");

    // no threshold was crossed, so the rig hands over exactly once
    let mut rig = CameraRig::default();
    let settled = rig.settled_pose();
    assert_eq!(rig.release(), Some(settled));
    assert!(rig.is_free());
    assert_eq!(rig.release(), None);
    assert_eq!(rig.update(1.0), RigOutput::Free);
}
