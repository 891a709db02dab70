//! Message wall: REST snapshot, realtime inserts over server-sent events, and
//! a localStorage copy that takes over when the network does not.

use crate::api::{self, CancelFlag};
use crate::constants::{API_MESSAGES_STREAM, MESSAGE_LIST_ID, STORAGE_MESSAGES};
use crate::dom;
use garden_core::constants::MESSAGES_DEFAULT_LIMIT;
use garden_core::{is_local_id, LocalUser, MessageFeed, MessageRecord, NewMessage};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

pub struct Wall {
    feed: MessageFeed,
    offline: bool,
    source: Option<web::EventSource>,
    on_message: Option<Closure<dyn FnMut(web::MessageEvent)>>,
    on_error: Option<Closure<dyn FnMut(web::Event)>>,
}

pub type SharedWall = Rc<RefCell<Wall>>;

impl Wall {
    pub fn shared() -> SharedWall {
        Rc::new(RefCell::new(Self {
            feed: MessageFeed::new(MESSAGES_DEFAULT_LIMIT),
            offline: false,
            source: None,
            on_message: None,
            on_error: None,
        }))
    }

    fn go_offline(&mut self, reason: &str) {
        if self.offline {
            return;
        }
        log::warn!("[feed] {reason}; switching to the local message wall");
        self.offline = true;
        self.close_source();
        let stored = load_stored();
        if self.feed.records().is_empty() && !stored.is_empty() {
            self.feed.apply_snapshot(stored);
        }
    }

    // Handlers stay alive here: this can run from inside `on_error`.
    fn close_source(&mut self) {
        if let Some(es) = self.source.take() {
            es.set_onmessage(None);
            es.set_onerror(None);
            es.close();
        }
    }

    /// Closes the realtime connection and drops its handlers.
    pub fn shutdown(&mut self) {
        self.close_source();
        self.on_message = None;
        self.on_error = None;
    }

    fn render(&self) {
        let records = self.feed.records();
        store_records(&records);
        let Some(document) = dom::window_document() else {
            return;
        };
        let Some(list) = document.get_element_by_id(MESSAGE_LIST_ID) else {
            return;
        };
        list.set_text_content(None);
        for m in &records {
            let Ok(item) = document.create_element("li") else {
                continue;
            };
            let line = match m.user_name.as_deref() {
                Some(name) => format!("{name}: {}", m.text),
                None => m.text.clone(),
            };
            item.set_text_content(Some(&line));
            if is_local_id(&m.id) {
                _ = item.class_list().add_1("pending");
            }
            _ = list.append_child(&item);
        }
    }
}

fn load_stored() -> Vec<MessageRecord> {
    dom::storage_get(STORAGE_MESSAGES)
        .and_then(|raw| match serde_json::from_str::<Vec<MessageRecord>>(&raw) {
            Ok(rows) => Some(rows),
            Err(e) => {
                log::warn!("[feed] ignoring unreadable stored messages: {e}");
                None
            }
        })
        .unwrap_or_default()
}

fn store_records(records: &[MessageRecord]) {
    match serde_json::to_string(records) {
        Ok(json) => dom::storage_set(STORAGE_MESSAGES, &json),
        Err(e) => log::warn!("[feed] could not encode messages: {e}"),
    }
}

/// Load the snapshot, then subscribe to realtime inserts.
pub fn connect(wall: SharedWall, cancel: CancelFlag) {
    let wall_fetch = wall.clone();
    let cancel_fetch = cancel.clone();
    spawn_local(async move {
        let result = api::fetch_messages(MESSAGES_DEFAULT_LIMIT).await;
        if cancel_fetch.is_cancelled() {
            return;
        }
        let mut w = wall_fetch.borrow_mut();
        match result {
            Ok(rows) => {
                log::info!("[feed] loaded {} messages", rows.len());
                w.feed.apply_snapshot(rows);
            }
            Err(e) => w.go_offline(&format!("message snapshot failed ({e})")),
        }
        w.render();
    });

    let es = match web::EventSource::new(API_MESSAGES_STREAM) {
        Ok(es) => es,
        Err(e) => {
            wall.borrow_mut()
                .go_offline(&format!("realtime unavailable ({e:?})"));
            return;
        }
    };

    let wall_msg = wall.clone();
    let cancel_msg = cancel.clone();
    let on_message = Closure::wrap(Box::new(move |ev: web::MessageEvent| {
        if cancel_msg.is_cancelled() {
            return;
        }
        let Some(data) = ev.data().as_string() else {
            return;
        };
        match serde_json::from_str::<MessageRecord>(&data) {
            Ok(row) => {
                let mut w = wall_msg.borrow_mut();
                w.feed.apply_realtime(row);
                w.render();
            }
            Err(e) => log::warn!("[feed] ignoring malformed realtime row: {e}"),
        }
    }) as Box<dyn FnMut(web::MessageEvent)>);

    let wall_err = wall.clone();
    let es_err = es.clone();
    let on_error = Closure::wrap(Box::new(move |_ev: web::Event| {
        if cancel.is_cancelled() {
            return;
        }
        // the browser retries on its own unless the stream is closed
        if es_err.ready_state() == web::EventSource::CLOSED {
            let mut w = wall_err.borrow_mut();
            w.go_offline("realtime stream closed");
            w.render();
        }
    }) as Box<dyn FnMut(web::Event)>);

    es.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    es.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    let mut w = wall.borrow_mut();
    w.source = Some(es);
    w.on_message = Some(on_message);
    w.on_error = Some(on_error);
}

/// Show the message at once, then confirm it with the server. Offline, the
/// placeholder is kept in the local wall.
pub fn submit(wall: SharedWall, cancel: CancelFlag, text: &str, user: &LocalUser) {
    let local_id = {
        let mut w = wall.borrow_mut();
        let id = w.feed.push_optimistic(
            text,
            Some(user.id.as_str()),
            user.name.as_deref(),
            &dom::now_iso(),
        );
        w.render();
        if w.offline {
            return;
        }
        id
    };
    let body = NewMessage {
        text: text.to_string(),
        user_id: Some(user.id.clone()),
        user_name: user.name.clone(),
    };
    spawn_local(async move {
        let result = api::post_message(&body).await;
        if cancel.is_cancelled() {
            return;
        }
        let mut w = wall.borrow_mut();
        match result {
            Ok(row) => w.feed.confirm(&local_id, row),
            Err(e) if e.is_rejection() => {
                log::warn!("[feed] message rejected: {e}");
                w.feed.discard_optimistic(&local_id);
            }
            Err(e) => w.go_offline(&format!("sending failed ({e})")),
        }
        w.render();
    });
}
