/// Front-end tuning constants: DOM wiring, network endpoints, camera orbit and
/// colors. Layout and timeline tuning lives in `garden_core::constants`.

// DOM element ids
pub const CANVAS_ID: &str = "garden-canvas";
pub const INTRO_OVERLAY_ID: &str = "intro-overlay";
pub const BEGIN_BUTTON_ID: &str = "begin-ritual";
pub const SKIP_BUTTON_ID: &str = "enter-garden"; // shown to visitors who finished the ritual before
pub const RITUAL_OVERLAY_ID: &str = "ritual-overlay";
pub const COUNTDOWN_ID: &str = "ritual-countdown";
pub const RITUAL_BAR_ID: &str = "ritual-progress";
pub const TRANSITION_SECTION_ID: &str = "garden-entry"; // scroll target for transition progress
pub const GARDEN_UI_ID: &str = "garden-ui";
pub const MUTE_BUTTON_ID: &str = "mute-toggle";
pub const PLANT_INPUT_ID: &str = "plant-message";
pub const PLANT_BUTTON_ID: &str = "plant-submit";
pub const NAME_INPUT_ID: &str = "visitor-name";
pub const MESSAGE_INPUT_ID: &str = "wall-message";
pub const MESSAGE_BUTTON_ID: &str = "wall-submit";
pub const MESSAGE_LIST_ID: &str = "wall-messages";
pub const REVIVE_BUTTON_ID: &str = "revive-flower";
// rewrites the selected flower's message from the plant input
pub const EDIT_BUTTON_ID: &str = "edit-flower";
pub const STATUS_ID: &str = "garden-status";
pub const LABEL_LAYER_ID: &str = "flower-labels";
pub const HIDDEN_CLASS: &str = "hidden";

// REST + realtime endpoints (same origin)
pub const API_FLOWERS: &str = "/api/flowers";
pub const API_MESSAGES: &str = "/api/messages";
pub const API_MESSAGES_STREAM: &str = "/api/messages/stream";

// localStorage keys
pub const STORAGE_USER_ID: &str = "garden.user_id";
pub const STORAGE_USER_NAME: &str = "garden.user_name";
pub const STORAGE_MUTED: &str = "garden.muted";
pub const STORAGE_RITUAL_DONE: &str = "garden.ritual_done";
pub const STORAGE_MESSAGES: &str = "garden.messages"; // offline message wall

// Orbit camera (user-owned after the rig snaps)
pub const ORBIT_YAW_PER_PX: f32 = 0.006; // radians per CSS pixel of drag
pub const ORBIT_PITCH_PER_PX: f32 = 0.004;
pub const ORBIT_PITCH_MIN: f32 = 0.12; // radians above the ground plane
pub const ORBIT_PITCH_MAX: f32 = 1.35;
pub const ORBIT_DISTANCE_MIN: f32 = 4.0;
pub const ORBIT_DISTANCE_MAX: f32 = 30.0;
pub const ORBIT_ZOOM_PER_WHEEL: f32 = 0.0015; // fractional distance change per wheel delta unit
pub const CAMERA_IDLE_MS: f64 = 180.0; // orbit input younger than this counts as moving

// Picking
pub const PICK_SPHERE_RADIUS: f32 = 0.45;
pub const PICK_CENTER_HEIGHT: f32 = 0.6; // flower head above its ground position

// Geometry
pub const FLOWER_PETALS: u32 = 6;
pub const FLOWER_STEM_HEIGHT: f32 = 0.6;
pub const FLOWER_PETAL_LENGTH: f32 = 0.28;
pub const GROUND_SEGMENTS: u32 = 96;

// Colors (linear RGB)
pub const CLEAR_COLOR: [f32; 3] = [0.02, 0.025, 0.04];
pub const GROUND_COLOR: [f32; 3] = [0.07, 0.11, 0.07];
pub const FOG_COLOR: [f32; 3] = [0.02, 0.025, 0.04];
pub const HOVER_BRIGHTEN: f32 = 1.35;
pub const WILT_DARKEN: f32 = 0.45;

// Ambient audio
pub const DRONE_BASE_HZ: f32 = 110.0;
pub const DRONE_FIFTH_RATIO: f32 = 1.5;
pub const DRONE_DETUNE_CENTS: f32 = 4.0;
pub const DRONE_LOWPASS_HZ: f32 = 900.0;
pub const DRONE_LEVEL: f32 = 0.08;
pub const MUTE_RAMP_SEC: f64 = 0.4;
