use crate::api::{self, CancelFlag};
use crate::audio::AmbientAudio;
use crate::camera::screen_to_world_ray;
use crate::constants::*;
use crate::dom;
use crate::feed::{self, SharedWall};
use crate::frame::SharedInteraction;
use crate::garden::FlowerBed;
use crate::input;
use garden_core::constants::{FLOWER_MESSAGE_MAX, MESSAGE_TEXT_MAX, USER_FIELD_MAX};
use garden_core::text::{sanitize_optional, sanitize_required};
use garden_core::{AppState, Clock, FlowerPatch, InstantClock, NewFlower, Phase};
use glam::{Vec2, Vec3};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

#[derive(Clone)]
pub struct Wiring {
    pub document: web::Document,
    pub canvas: web::HtmlCanvasElement,
    pub state: Rc<RefCell<AppState>>,
    pub bed: Rc<RefCell<FlowerBed>>,
    pub wall: SharedWall,
    pub interaction: SharedInteraction,
    pub audio: Option<Rc<AmbientAudio>>,
    pub clock: InstantClock,
    pub cancel: CancelFlag,
}

pub fn wire_all(w: &Wiring) {
    wire_begin(w);
    wire_skip(w);
    wire_mute(w);
    wire_scroll(w);
    wire_pointer(w);
    wire_wheel(w);
    wire_plant(w);
    wire_edit(w);
    wire_revive(w);
    wire_message(w);
}

fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
    target: &web::EventTarget,
    event: &str,
    handler: impl FnMut(E) + 'static,
) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn status(document: &web::Document, text: &str) {
    dom::set_text(document, STATUS_ID, text);
}

fn wire_begin(w: &Wiring) {
    let w2 = w.clone();
    dom::add_click_listener(&w.document, BEGIN_BUTTON_ID, move || {
        if w2.cancel.is_cancelled() {
            return;
        }
        let now = w2.clock.now_ms();
        let (started, muted) = {
            let mut st = w2.state.borrow_mut();
            (st.begin_ritual(now), st.snapshot().muted)
        };
        if !started {
            return;
        }
        // first user gesture: the audio context may start now
        if let Some(audio) = &w2.audio {
            audio.resume();
            if !muted {
                audio.set_muted(false);
            }
        }
    });
}

/// Returning visitors may go straight to the garden.
fn wire_skip(w: &Wiring) {
    let w2 = w.clone();
    dom::add_click_listener(&w.document, SKIP_BUTTON_ID, move || {
        if w2.cancel.is_cancelled() {
            return;
        }
        let (entered, muted) = {
            let mut st = w2.state.borrow_mut();
            (st.enter_garden(), st.snapshot().muted)
        };
        if !entered {
            return;
        }
        log::info!("[intro] returning visitor skipped the ritual");
        dom::set_hidden(&w2.document, SKIP_BUTTON_ID, true);
        if let Some(audio) = &w2.audio {
            audio.resume();
            if !muted {
                audio.set_muted(false);
            }
        }
    });
}

fn toggle_mute(w: &Wiring) {
    let muted = w.state.borrow_mut().toggle_mute();
    dom::storage_set(STORAGE_MUTED, if muted { "1" } else { "0" });
    if let Some(audio) = &w.audio {
        audio.resume();
        audio.set_muted(muted);
    }
}

fn typing_in_field(document: &web::Document) -> bool {
    document
        .active_element()
        .map(|el| {
            let tag = el.tag_name();
            tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea")
        })
        .unwrap_or(false)
}

fn wire_mute(w: &Wiring) {
    let w_click = w.clone();
    dom::add_click_listener(&w.document, MUTE_BUTTON_ID, move || {
        if !w_click.cancel.is_cancelled() {
            toggle_mute(&w_click);
        }
    });

    let w_key = w.clone();
    if let Some(window) = web::window() {
        listen(&window, "keydown", move |ev: web::KeyboardEvent| {
            if w_key.cancel.is_cancelled() || ev.repeat() || typing_in_field(&w_key.document) {
                return;
            }
            if matches!(ev.key().as_str(), "m" | "M") {
                toggle_mute(&w_key);
            }
        });
    }
}

/// Feed the transition section's position to the timeline.
pub fn observe_scroll(w: &Wiring) {
    let Some(window) = web::window() else {
        return;
    };
    let Some(section) = w.document.get_element_by_id(TRANSITION_SECTION_ID) else {
        return;
    };
    let vh = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as f32;
    let rect = section.get_bounding_client_rect();
    _ = w
        .state
        .borrow_mut()
        .observe_scroll(rect.top() as f32, rect.height() as f32, vh);
}

fn wire_scroll(w: &Wiring) {
    let Some(window) = web::window() else {
        return;
    };
    for event in ["scroll", "resize"] {
        let w2 = w.clone();
        listen(&window, event, move |_ev: web::Event| {
            if !w2.cancel.is_cancelled() {
                observe_scroll(&w2);
            }
        });
    }
    let canvas = w.canvas.clone();
    listen(&window, "resize", move |_ev: web::Event| {
        dom::sync_canvas_backing_size(&canvas);
    });
}

fn pointer_css(ev: &web::MouseEvent, canvas: &web::HtmlCanvasElement) -> (Vec2, Vec2) {
    let rect = canvas.get_bounding_client_rect();
    (
        Vec2::new(
            ev.client_x() as f32 - rect.left() as f32,
            ev.client_y() as f32 - rect.top() as f32,
        ),
        Vec2::new(rect.width() as f32, rect.height() as f32),
    )
}

/// Flower under a CSS-pixel position, using the last rendered camera.
fn pick(w: &Wiring, pos: Vec2, size: Vec2) -> Option<String> {
    let camera = w.interaction.borrow().camera.clone();
    let (ro, rd) = screen_to_world_ray(&camera, size.x, size.y, pos.x, pos.y);
    let bed = w.bed.borrow();
    let centers = bed
        .placed()
        .iter()
        .map(|f| f.position + Vec3::Y * PICK_CENTER_HEIGHT * f.scale);
    input::pick_nearest(ro, rd, centers, PICK_SPHERE_RADIUS)
        .and_then(|i| bed.placed().get(i))
        .map(|f| f.id.clone())
}

fn in_garden(w: &Wiring) -> bool {
    w.state.borrow().snapshot().phase == Phase::Garden
}

fn wire_pointer(w: &Wiring) {
    let w_down = w.clone();
    listen(&w.canvas, "pointerdown", move |ev: web::PointerEvent| {
        let (pos, _) = pointer_css(&ev, &w_down.canvas);
        let mut ia = w_down.interaction.borrow_mut();
        ia.mouse.x = pos.x;
        ia.mouse.y = pos.y;
        ia.mouse.down = true;
        ia.mouse.travel = 0.0;
        _ = w_down.canvas.set_pointer_capture(ev.pointer_id());
    });

    let w_move = w.clone();
    if let Some(window) = web::window() {
        listen(&window, "pointermove", move |ev: web::PointerEvent| {
            if w_move.cancel.is_cancelled() || !in_garden(&w_move) {
                return;
            }
            let (pos, size) = pointer_css(&ev, &w_move.canvas);
            let dragging = {
                let mut ia = w_move.interaction.borrow_mut();
                let delta = pos - Vec2::new(ia.mouse.x, ia.mouse.y);
                ia.mouse.x = pos.x;
                ia.mouse.y = pos.y;
                if ia.mouse.down {
                    ia.mouse.travel += delta.length();
                    if !ia.mouse.is_click() {
                        if let Some(orbit) = ia.orbit.as_mut() {
                            orbit.drag(delta, ORBIT_YAW_PER_PX, ORBIT_PITCH_PER_PX);
                            ia.orbit_touched = true;
                        }
                    }
                }
                ia.mouse.down
            };
            if !dragging {
                let hit = pick(&w_move, pos, size);
                w_move.interaction.borrow_mut().hovered = hit;
            }
        });
    }

    let w_up = w.clone();
    listen(&w.canvas, "pointerup", move |ev: web::PointerEvent| {
        _ = w_up.canvas.release_pointer_capture(ev.pointer_id());
        let was_click = {
            let mut ia = w_up.interaction.borrow_mut();
            let click = ia.mouse.down && ia.mouse.is_click();
            ia.mouse.down = false;
            click
        };
        if !was_click || w_up.cancel.is_cancelled() || !in_garden(&w_up) {
            return;
        }
        let (pos, size) = pointer_css(&ev, &w_up.canvas);
        let hit = pick(&w_up, pos, size);
        if let Some(id) = &hit {
            log::info!("[input] selected flower {id}");
        }
        w_up.interaction.borrow_mut().selected = hit;
    });
}

fn wire_wheel(w: &Wiring) {
    let w2 = w.clone();
    listen(&w.canvas, "wheel", move |ev: web::WheelEvent| {
        if w2.cancel.is_cancelled() {
            return;
        }
        let mut ia = w2.interaction.borrow_mut();
        if let Some(orbit) = ia.orbit.as_mut() {
            ev.prevent_default();
            orbit.zoom(ev.delta_y() as f32, ORBIT_ZOOM_PER_WHEEL);
            ia.orbit_touched = true;
        }
    });
}

/// Trimmed visitor name from the name field, remembered for later visits.
fn read_user_name(w: &Wiring) -> Option<String> {
    let raw = dom::input_value(&w.document, NAME_INPUT_ID);
    match sanitize_optional("user_name", raw.as_deref(), USER_FIELD_MAX) {
        Ok(name) => {
            if let Some(n) = &name {
                dom::storage_set(STORAGE_USER_NAME, n);
            }
            w.state.borrow_mut().set_user_name(name.clone());
            name
        }
        Err(e) => {
            log::warn!("[input] ignoring name: {e}");
            w.state.borrow().user().name.clone()
        }
    }
}

fn wire_plant(w: &Wiring) {
    let w2 = w.clone();
    dom::add_click_listener(&w.document, PLANT_BUTTON_ID, move || {
        if w2.cancel.is_cancelled() {
            return;
        }
        let raw = dom::input_value(&w2.document, PLANT_INPUT_ID);
        let message = match sanitize_optional("message", raw.as_deref(), FLOWER_MESSAGE_MAX) {
            Ok(m) => m,
            Err(e) => {
                status(&w2.document, &e.to_string());
                return;
            }
        };
        let user_name = read_user_name(&w2);
        let user_id = w2.state.borrow().user().id.clone();
        let mut body = NewFlower {
            message,
            user_id: Some(user_id),
            user_name,
            ..Default::default()
        };
        let local_id = w2
            .bed
            .borrow_mut()
            .push_optimistic(&mut body, &dom::now_iso());
        dom::clear_input(&w2.document, PLANT_INPUT_ID);
        status(&w2.document, "");
        w2.interaction.borrow_mut().selected = Some(local_id.clone());

        let w3 = w2.clone();
        spawn_local(async move {
            let result = api::plant_flower(&body).await;
            if w3.cancel.is_cancelled() {
                return;
            }
            match result {
                Ok(row) => {
                    log::info!("[garden] planted {}", row.id);
                    let id = row.id.clone();
                    w3.bed.borrow_mut().confirm(&local_id, row);
                    let mut ia = w3.interaction.borrow_mut();
                    if ia.selected.as_deref() == Some(local_id.as_str()) {
                        ia.selected = Some(id);
                    }
                }
                Err(e) if e.is_rejection() => {
                    log::warn!("[garden] planting rejected: {e}");
                    w3.bed.borrow_mut().discard_optimistic(&local_id);
                    status(&w3.document, &e.to_string());
                }
                // keep the placeholder so the visitor still sees their flower
                Err(e) => log::warn!("[garden] planting not saved: {e}"),
            }
        });
    });
}

/// Selected flower owned by this visitor and already known to the server.
fn selected_own(w: &Wiring) -> Option<(String, String)> {
    let id = w.interaction.borrow().selected.clone()?;
    let user_id = w.state.borrow().user().id.clone();
    let bed = w.bed.borrow();
    let record = bed.record(&id)?;
    if garden_core::is_local_id(&id) || !record.is_mine(Some(user_id.as_str())) {
        return None;
    }
    Some((id, user_id))
}

fn wire_edit(w: &Wiring) {
    let w2 = w.clone();
    dom::add_click_listener(&w.document, EDIT_BUTTON_ID, move || {
        if w2.cancel.is_cancelled() {
            return;
        }
        let Some((id, user_id)) = selected_own(&w2) else {
            status(&w2.document, "Select one of your flowers first");
            return;
        };
        let raw = dom::input_value(&w2.document, PLANT_INPUT_ID);
        let message = match sanitize_optional("message", raw.as_deref(), FLOWER_MESSAGE_MAX) {
            Ok(m) => m,
            Err(e) => {
                status(&w2.document, &e.to_string());
                return;
            }
        };
        let patch = FlowerPatch {
            message,
            user_id: Some(user_id),
        };
        let w3 = w2.clone();
        spawn_local(async move {
            let result = api::update_flower(&id, &patch).await;
            if w3.cancel.is_cancelled() {
                return;
            }
            match result {
                Ok(row) => {
                    w3.bed.borrow_mut().upsert(row);
                    dom::clear_input(&w3.document, PLANT_INPUT_ID);
                    status(&w3.document, "");
                }
                Err(e) => {
                    log::warn!("[garden] edit failed: {e}");
                    status(&w3.document, &e.to_string());
                }
            }
        });
    });
}

fn wire_revive(w: &Wiring) {
    let w2 = w.clone();
    dom::add_click_listener(&w.document, REVIVE_BUTTON_ID, move || {
        if w2.cancel.is_cancelled() {
            return;
        }
        let Some((id, user_id)) = selected_own(&w2) else {
            status(&w2.document, "Select one of your flowers first");
            return;
        };
        let w3 = w2.clone();
        spawn_local(async move {
            let result = api::revive_flower(&id, &user_id).await;
            if w3.cancel.is_cancelled() {
                return;
            }
            match result {
                Ok(row) => {
                    log::info!("[garden] revived {}", row.id);
                    w3.bed.borrow_mut().upsert(row);
                }
                Err(e) => {
                    log::warn!("[garden] revive failed: {e}");
                    status(&w3.document, &e.to_string());
                }
            }
        });
    });
}

fn send_message(w: &Wiring) {
    let raw = dom::input_value(&w.document, MESSAGE_INPUT_ID).unwrap_or_default();
    let text = match sanitize_required("text", &raw, MESSAGE_TEXT_MAX) {
        Ok(t) => t,
        Err(e) => {
            status(&w.document, &e.to_string());
            return;
        }
    };
    _ = read_user_name(w);
    let user = w.state.borrow().user().clone();
    feed::submit(w.wall.clone(), w.cancel.clone(), &text, &user);
    dom::clear_input(&w.document, MESSAGE_INPUT_ID);
    status(&w.document, "");
}

fn wire_message(w: &Wiring) {
    let w_click = w.clone();
    dom::add_click_listener(&w.document, MESSAGE_BUTTON_ID, move || {
        if !w_click.cancel.is_cancelled() {
            send_message(&w_click);
        }
    });
    let Some(input) = w.document.get_element_by_id(MESSAGE_INPUT_ID) else {
        return;
    };
    let w_key = w.clone();
    listen(&input, "keydown", move |ev: web::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() && !w_key.cancel.is_cancelled() {
            ev.prevent_default();
            send_message(&w_key);
        }
    });
}
