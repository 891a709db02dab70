use crate::audio::AmbientAudio;
use crate::constants::{
    CAMERA_IDLE_MS, ORBIT_DISTANCE_MAX, ORBIT_DISTANCE_MIN, ORBIT_PITCH_MAX, ORBIT_PITCH_MIN,
};
use crate::garden::FlowerBed;
use crate::input::{MouseState, OrbitState};
use crate::overlay::{LabelLayer, OverlayView};
use crate::render::{self, FlowerInstance};
use garden_core::{
    AppState, Camera, CameraPose, CameraRig, FrameScheduler, InstantClock, Phase, PinQuery,
    PinSelector, RigOutput,
};
use glam::Vec3;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Pointer-driven state shared between the DOM handlers and the frame loop.
pub struct Interaction {
    pub mouse: MouseState,
    /// Present once the camera rig has handed control to the visitor.
    pub orbit: Option<OrbitState>,
    /// Set by handlers on drag/zoom; the frame loop stamps the time.
    pub orbit_touched: bool,
    pub hovered: Option<String>,
    pub selected: Option<String>,
    /// Camera of the last rendered frame, used for picking.
    pub camera: Camera,
}

impl Interaction {
    pub fn new(pose: &CameraPose) -> Self {
        Self {
            mouse: MouseState::default(),
            orbit: None,
            orbit_touched: false,
            hovered: None,
            selected: None,
            camera: Camera::from_pose(pose, 1.0),
        }
    }
}

pub type SharedInteraction = Rc<RefCell<Interaction>>;

pub struct FrameContext<'a> {
    pub state: Rc<RefCell<AppState>>,
    pub bed: Rc<RefCell<FlowerBed>>,
    pub interaction: SharedInteraction,
    pub audio: Option<Rc<AmbientAudio>>,

    pub scheduler: FrameScheduler<InstantClock>,
    pub rig: CameraRig,
    pub pins: PinSelector,
    pub overlay: OverlayView,
    pub labels: LabelLayer,
    pub gpu: Option<render::GpuState<'a>>,

    pub canvas: web::HtmlCanvasElement,
    pub document: web::Document,

    pub pose: CameraPose,
    pub last_orbit_ms: f64,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let Some(tick) = self.scheduler.tick() else {
            return;
        };
        _ = self.state.borrow_mut().tick(tick.now_ms);
        let snap = self.state.borrow().snapshot();

        if let Some(audio) = &self.audio {
            if snap.phase == Phase::Ritual {
                audio.set_swell(snap.ritual_progress);
            }
        }

        let aspect = self.canvas.width().max(1) as f32 / self.canvas.height().max(1) as f32;
        let camera = self.update_camera(snap.phase, snap.transition_progress, aspect, tick.now_ms);

        let css_size = {
            let rect = self.canvas.get_bounding_client_rect();
            (rect.width() as f32, rect.height() as f32)
        };
        let (instances, hovered, selected) = {
            let bed = self.bed.borrow();
            let mut ia = self.interaction.borrow_mut();
            ia.camera = camera.clone();
            // forget picks whose flowers vanished (discarded placeholders)
            let gone = |id: &Option<String>| {
                id.as_deref()
                    .is_some_and(|id| bed.placed_flower(id).is_none())
            };
            if gone(&ia.hovered) {
                ia.hovered = None;
            }
            if gone(&ia.selected) {
                ia.selected = None;
            }
            let instances: Vec<FlowerInstance> = bed
                .placed()
                .iter()
                .map(|f| {
                    let lit = ia.hovered.as_deref() == Some(f.id.as_str())
                        || ia.selected.as_deref() == Some(f.id.as_str());
                    FlowerInstance::from_placed(f, lit)
                })
                .collect();
            (instances, ia.hovered.clone(), ia.selected.clone())
        };

        if snap.phase == Phase::Garden {
            let bed = self.bed.borrow();
            let moving = tick.now_ms - self.last_orbit_ms < CAMERA_IDLE_MS;
            let flowers: Vec<(&str, Vec3)> = bed
                .placed()
                .iter()
                .map(|f| (f.id.as_str(), f.position))
                .collect();
            let query = PinQuery {
                focus: self.pose.target,
                own: bed.own_latest(),
                hovered: hovered.as_deref(),
                selected: selected.as_deref(),
                flowers: &flowers,
            };
            self.pins.refresh(tick.now_ms, moving, &query);
            self.labels.sync(
                &self.document,
                &camera,
                css_size,
                self.pins.pinned(),
                bed.placed(),
                bed.records(),
            );
        }

        if let Some(g) = &mut self.gpu {
            g.resize_if_needed(self.canvas.width(), self.canvas.height());
            let dt_sec = (tick.dt_ms / 1000.0) as f32;
            match g.render(dt_sec, &camera, self.pose.fog_near, self.pose.fog_far, &instances) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => g.reconfigure(),
                Err(wgpu::SurfaceError::Timeout) => log::warn!("[gpu] frame timeout"),
                Err(e) => log::error!("render error: {:?}", e),
            }
        }

        self.overlay.apply(&self.document, &snap);
    }

    fn update_camera(&mut self, phase: Phase, transition: f32, aspect: f32, now_ms: f64) -> Camera {
        if !self.rig.is_free() {
            let output = match phase {
                Phase::Intro | Phase::Ritual => self.rig.update(0.0),
                Phase::Transition => self.rig.update(transition),
                // skipped straight here: no threshold crossing to snap on
                Phase::Garden => self
                    .rig
                    .release()
                    .map_or(RigOutput::Free, RigOutput::Snapped),
            };
            match output {
                RigOutput::Interpolated(pose) => self.pose = pose,
                RigOutput::Snapped(pose) => {
                    self.pose = pose;
                    self.interaction.borrow_mut().orbit = Some(OrbitState::from_eye(
                        pose.eye,
                        pose.target,
                        (ORBIT_PITCH_MIN, ORBIT_PITCH_MAX),
                        (ORBIT_DISTANCE_MIN, ORBIT_DISTANCE_MAX),
                    ));
                }
                RigOutput::Free => {}
            }
        } else {
            let mut ia = self.interaction.borrow_mut();
            if ia.orbit_touched {
                ia.orbit_touched = false;
                self.last_orbit_ms = now_ms;
            }
            if let Some(orbit) = &ia.orbit {
                self.pose.eye = orbit.eye();
                self.pose.target = orbit.target;
            }
        }
        Camera::from_pose(&self.pose, aspect)
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

type TickSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Owner of the running `requestAnimationFrame` loop.
#[derive(Default)]
pub struct LoopHandle {
    tick: TickSlot,
    raf_id: Rc<Cell<Option<i32>>>,
    stopped: Rc<Cell<bool>>,
}

impl LoopHandle {
    /// Cancels the pending frame and stops rescheduling. Must not be called
    /// from inside the frame callback.
    pub fn cancel(&self) {
        self.stopped.set(true);
        if let (Some(id), Some(w)) = (self.raf_id.take(), web::window()) {
            _ = w.cancel_animation_frame(id);
        }
        self.tick.borrow_mut().take();
        log::info!("[frame] loop cancelled");
    }
}

fn request_frame(tick: &TickSlot) -> Option<i32> {
    let w = web::window()?;
    let slot = tick.borrow();
    let cb = slot.as_ref()?;
    w.request_animation_frame(cb.as_ref().unchecked_ref()).ok()
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) -> LoopHandle {
    let handle = LoopHandle::default();
    frame_ctx.borrow_mut().scheduler.start();

    let tick_clone = handle.tick.clone();
    let raf_id = handle.raf_id.clone();
    let stopped = handle.stopped.clone();
    *handle.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if stopped.get() {
            return;
        }
        frame_ctx.borrow_mut().frame();
        raf_id.set(request_frame(&tick_clone));
    }) as Box<dyn FnMut()>));
    handle.raf_id.set(request_frame(&handle.tick));
    handle
}
