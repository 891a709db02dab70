// Shared layout/timeline tuning constants used by the web frontend and the server.

// Ground disk
pub const GARDEN_RADIUS: f32 = 12.5; // visible ground disk radius (world units)
pub const DISK_MARGIN: f32 = 0.98; // clamp target as a fraction of the radius

// Random placement
pub const PLACEMENT_MIN_RADIUS: f32 = 3.0;
pub const PLACEMENT_MAX_RADIUS: f32 = 12.0; // exclusive

// Occupancy grid and spiral search
pub const MIN_SEPARATION: f32 = 0.9;
pub const CELL_SIZE_FACTOR: f32 = 0.75; // cell edge = MIN_SEPARATION * factor
pub const MAX_SPIRAL_STEPS: usize = 28;
pub const SPIRAL_RADIUS_STEP: f32 = 0.45; // world units added per spiral step
pub const SPIRAL_ANGLE_STEP: f32 = 2.399_963; // golden angle (radians)

// Derived visuals
pub const BASE_SCALE: f32 = 1.0;
pub const SCALE_JITTER: f32 = 0.09; // +/- fraction around BASE_SCALE
pub const WILT_TILT_MIN: f32 = 0.15; // radians
pub const WILT_TILT_MAX: f32 = 0.45;
pub const WILT_AFTER_HOURS: i64 = 168; // untended time before a flower wilts

// Labels / pins
pub const MAX_PINS: usize = 12;
pub const PIN_MAX_RADIUS: f32 = 6.0;
pub const PIN_REFRESH_MS: f64 = 250.0;

// Ritual and transition timeline
pub const RITUAL_DURATION_MS: f64 = 60_000.0;
pub const SCROLL_EPSILON: f32 = 1e-3;
pub const GARDEN_ENTRY_THRESHOLD: f32 = 0.94;
pub const CAMERA_SNAP_THRESHOLD: f32 = 0.94;

// Text limits (Unicode scalar values, after whitespace collapse)
pub const FLOWER_MESSAGE_MAX: usize = 140;
pub const MESSAGE_TEXT_MAX: usize = 80;
pub const USER_FIELD_MAX: usize = 60;

// List limits
pub const FLOWERS_LIST_LIMIT: usize = 200;
pub const MESSAGES_DEFAULT_LIMIT: usize = 120;
pub const MESSAGES_MAX_LIMIT: usize = 300;
