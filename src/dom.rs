use crate::constants::HIDDEN_CLASS;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    match document.get_element_by_id(element_id) {
        Some(el) => {
            let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
            _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        None => log::warn!("[dom] #{element_id} missing; click handler not attached"),
    }
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

pub fn set_hidden(document: &web::Document, element_id: &str, hidden: bool) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let cl = el.class_list();
        _ = if hidden {
            cl.add_1(HIDDEN_CLASS)
        } else {
            cl.remove_1(HIDDEN_CLASS)
        };
    }
}

pub fn set_text(document: &web::Document, element_id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        el.set_text_content(Some(text));
    }
}

/// Current value of an `<input>` or `<textarea>`.
pub fn input_value(document: &web::Document, element_id: &str) -> Option<String> {
    let el = document.get_element_by_id(element_id)?;
    if let Some(input) = el.dyn_ref::<web::HtmlInputElement>() {
        return Some(input.value());
    }
    el.dyn_ref::<web::HtmlTextAreaElement>().map(|t| t.value())
}

pub fn clear_input(document: &web::Document, element_id: &str) {
    let Some(el) = document.get_element_by_id(element_id) else {
        return;
    };
    if let Some(input) = el.dyn_ref::<web::HtmlInputElement>() {
        input.set_value("");
    } else if let Some(t) = el.dyn_ref::<web::HtmlTextAreaElement>() {
        t.set_value("");
    }
}

pub fn local_storage() -> Option<web::Storage> {
    web::window().and_then(|w| w.local_storage().ok().flatten())
}

pub fn storage_get(key: &str) -> Option<String> {
    local_storage().and_then(|s| s.get_item(key).ok().flatten())
}

pub fn storage_set(key: &str, value: &str) {
    match local_storage() {
        Some(s) => {
            if let Err(e) = s.set_item(key, value) {
                log::warn!("[dom] localStorage write {key} failed: {e:?}");
            }
        }
        None => log::warn!("[dom] localStorage unavailable; {key} not saved"),
    }
}

/// Browser clock as an ISO-8601 UTC timestamp.
pub fn now_iso() -> String {
    String::from(js_sys::Date::new_0().to_iso_string())
}
