#![cfg(target_arch = "wasm32")]
use garden_core::constants::FLOWERS_LIST_LIMIT;
use garden_core::{
    AppState, CameraRig, FrameScheduler, GardenLayout, InstantClock, LocalUser, PinSelector,
    RigConfig, TimelineConfig, TimelineController,
};
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod api;
mod audio;
mod camera;
mod constants;
mod dom;
mod events;
mod feed;
mod frame;
mod garden;
mod input;
mod overlay;
mod render;

use constants::{
    CANVAS_ID, SKIP_BUTTON_ID, STORAGE_MUTED, STORAGE_RITUAL_DONE, STORAGE_USER_ID,
    STORAGE_USER_NAME, TRANSITION_SECTION_ID,
};

/// Everything `stop()` needs to tear the page down.
struct App {
    frame_loop: frame::LoopHandle,
    frame_ctx: Rc<RefCell<frame::FrameContext<'static>>>,
    wall: feed::SharedWall,
    cancel: api::CancelFlag,
    audio: Option<Rc<audio::AmbientAudio>>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Device-local visitor identity, minted once and kept in localStorage.
fn load_local_user() -> LocalUser {
    let id = match dom::storage_get(STORAGE_USER_ID) {
        Some(id) if !id.trim().is_empty() => id,
        _ => {
            let mut rng = rand::thread_rng();
            let id = format!("visitor-{:016x}", rng.gen::<u64>());
            dom::storage_set(STORAGE_USER_ID, &id);
            log::info!("[init] new visitor id {id}");
            id
        }
    };
    let name = dom::storage_get(STORAGE_USER_NAME).filter(|n| !n.trim().is_empty());
    LocalUser { id, name }
}

fn load_flowers(bed: Rc<RefCell<garden::FlowerBed>>, cancel: api::CancelFlag) {
    spawn_local(async move {
        let result = api::fetch_flowers().await;
        if cancel.is_cancelled() {
            return;
        }
        match result {
            Ok(rows) => {
                log::info!("[init] loaded {} flowers", rows.len());
                bed.borrow_mut().apply_snapshot(rows);
            }
            Err(e) => log::warn!("[init] flowers unavailable: {e}"),
        }
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("minuto-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas_el = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{CANVAS_ID}"))?;
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    dom::sync_canvas_backing_size(&canvas);

    let user = load_local_user();
    let muted = dom::storage_get(STORAGE_MUTED).as_deref() == Some("1");
    let mut state = AppState::new(
        TimelineController::new(TimelineConfig::default()),
        user.clone(),
        muted,
    );
    let document_done = document.clone();
    state.on_ritual_complete(move || {
        dom::storage_set(STORAGE_RITUAL_DONE, "1");
        // bring the transition section on screen; scrolling drives the rest
        if let Some(section) = document_done.get_element_by_id(TRANSITION_SECTION_ID) {
            section.scroll_into_view();
        }
    });
    let state = Rc::new(RefCell::new(state));

    let audio = match audio::AmbientAudio::new() {
        Ok(a) => Some(Rc::new(a)),
        Err(e) => {
            log::warn!("[audio] disabled: {e}");
            None
        }
    };

    let cancel = api::CancelFlag::default();
    let bed = Rc::new(RefCell::new(garden::FlowerBed::new(
        GardenLayout::default(),
        FLOWERS_LIST_LIMIT,
        Some(user.id.clone()),
    )));
    load_flowers(bed.clone(), cancel.clone());

    let wall = feed::Wall::shared();
    feed::connect(wall.clone(), cancel.clone());

    let rig = CameraRig::new(RigConfig::default());
    let pose = rig.wide_pose();
    let interaction = Rc::new(RefCell::new(frame::Interaction::new(&pose)));
    let clock = InstantClock::default();

    let wiring = events::Wiring {
        document: document.clone(),
        canvas: canvas.clone(),
        state: state.clone(),
        bed: bed.clone(),
        wall: wall.clone(),
        interaction: interaction.clone(),
        audio: audio.clone(),
        clock: clock.clone(),
        cancel: cancel.clone(),
    };
    events::wire_all(&wiring);
    let returning = dom::storage_get(STORAGE_RITUAL_DONE).as_deref() == Some("1");
    dom::set_hidden(&document, SKIP_BUTTON_ID, !returning);
    events::observe_scroll(&wiring);

    let gpu = frame::init_gpu(&canvas).await;
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        state,
        bed,
        interaction,
        audio: audio.clone(),
        scheduler: FrameScheduler::new(clock),
        rig,
        pins: PinSelector::default(),
        overlay: overlay::OverlayView::default(),
        labels: overlay::LabelLayer::default(),
        gpu,
        canvas,
        document,
        pose,
        last_orbit_ms: f64::NEG_INFINITY,
    }));
    let frame_loop = frame::start_loop(frame_ctx.clone());

    APP.with(|app| {
        *app.borrow_mut() = Some(App {
            frame_loop,
            frame_ctx,
            wall,
            cancel,
            audio,
        });
    });
    Ok(())
}

/// Tear down the loop, the realtime feed and pending network work.
#[wasm_bindgen]
pub fn stop() {
    let Some(app) = APP.with(|app| app.borrow_mut().take()) else {
        return;
    };
    app.cancel.cancel();
    app.frame_loop.cancel();
    {
        let mut ctx = app.frame_ctx.borrow_mut();
        ctx.scheduler.stop();
        ctx.labels.clear();
    }
    app.wall.borrow_mut().shutdown();
    if let Some(audio) = &app.audio {
        audio.set_muted(true);
    }
    log::info!("minuto-web stopped");
}
