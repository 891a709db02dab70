use crate::camera::world_to_screen;
use crate::constants::{
    COUNTDOWN_ID, GARDEN_UI_ID, INTRO_OVERLAY_ID, LABEL_LAYER_ID, MUTE_BUTTON_ID,
    PICK_CENTER_HEIGHT, RITUAL_BAR_ID, RITUAL_OVERLAY_ID,
};
use crate::dom;
use garden_core::{AppSnapshot, Camera, FlowerRecord, Phase, PlacedFlower};
use glam::Vec3;
use std::collections::HashMap;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Writes phase-dependent DOM state, touching elements only when the
/// snapshot changed.
#[derive(Default)]
pub struct OverlayView {
    last: Option<AppSnapshot>,
}

impl OverlayView {
    pub fn apply(&mut self, document: &web::Document, snap: &AppSnapshot) {
        if self.last.as_ref() == Some(snap) {
            return;
        }
        let phase_changed = self.last.map(|s| s.phase) != Some(snap.phase);
        if phase_changed {
            dom::set_hidden(document, INTRO_OVERLAY_ID, snap.phase != Phase::Intro);
            dom::set_hidden(document, RITUAL_OVERLAY_ID, snap.phase != Phase::Ritual);
            dom::set_hidden(document, GARDEN_UI_ID, snap.phase != Phase::Garden);
            if let Some(body) = document.body() {
                _ = body.set_attribute("data-phase", snap.phase.as_str());
            }
        }
        if snap.phase == Phase::Ritual {
            dom::set_text(document, COUNTDOWN_ID, &snap.remaining_sec.to_string());
            if let Some(bar) = document
                .get_element_by_id(RITUAL_BAR_ID)
                .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
            {
                let pct = format!("{:.1}%", snap.ritual_progress * 100.0);
                _ = bar.style().set_property("width", &pct);
            }
        }
        if self.last.map(|s| s.muted) != Some(snap.muted) {
            let label = if snap.muted { "Sound off" } else { "Sound on" };
            dom::set_text(document, MUTE_BUTTON_ID, label);
            if let Some(btn) = document.get_element_by_id(MUTE_BUTTON_ID) {
                _ = btn.set_attribute("aria-pressed", if snap.muted { "true" } else { "false" });
            }
        }
        self.last = Some(*snap);
    }
}

/// Text shown on a pinned flower.
pub fn label_text(record: &FlowerRecord) -> Option<String> {
    match (record.message.as_deref(), record.user_name.as_deref()) {
        (Some(msg), Some(name)) => Some(format!("{msg} ({name})")),
        (Some(msg), None) => Some(msg.to_string()),
        (None, Some(name)) => Some(name.to_string()),
        (None, None) => None,
    }
}

/// Absolutely positioned `<div>` labels for the pinned flowers.
#[derive(Default)]
pub struct LabelLayer {
    labels: HashMap<String, web::HtmlElement>,
}

impl LabelLayer {
    pub fn sync(
        &mut self,
        document: &web::Document,
        camera: &Camera,
        css_size: (f32, f32),
        pinned: &[String],
        placed: &[PlacedFlower],
        records: &[FlowerRecord],
    ) {
        let Some(layer) = document.get_element_by_id(LABEL_LAYER_ID) else {
            return;
        };
        self.labels.retain(|id, el| {
            let keep = pinned.iter().any(|p| p == id);
            if !keep {
                el.remove();
            }
            keep
        });

        for id in pinned {
            let Some(flower) = placed.iter().find(|f| &f.id == id) else {
                continue;
            };
            let anchor = flower.position + Vec3::Y * PICK_CENTER_HEIGHT * flower.scale;
            let screen = world_to_screen(camera, css_size.0, css_size.1, anchor);
            let Some(text) = records.iter().find(|r| &r.id == id).and_then(label_text) else {
                continue;
            };
            if !self.labels.contains_key(id) {
                let Some(el) = document
                    .create_element("div")
                    .ok()
                    .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
                else {
                    continue;
                };
                el.set_class_name(if flower.mine {
                    "flower-label mine"
                } else {
                    "flower-label"
                });
                _ = layer.append_child(&el);
                self.labels.insert(id.clone(), el);
            }
            let Some(el) = self.labels.get(id) else {
                continue;
            };
            // messages can be edited after the label was created
            if el.text_content().as_deref() != Some(text.as_str()) {
                el.set_text_content(Some(&text));
            }
            let style = el.style();
            match screen {
                Some(p) => {
                    _ = style.set_property(
                        "transform",
                        &format!("translate({:.1}px, {:.1}px)", p.x, p.y),
                    );
                    _ = style.remove_property("display");
                }
                None => {
                    _ = style.set_property("display", "none");
                }
            }
        }
    }

    pub fn clear(&mut self) {
        for (_, el) in self.labels.drain() {
            el.remove();
        }
    }
}
