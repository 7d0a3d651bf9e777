//! Squad system constants - all tunable defaults in one place
//!
//! Times are in seconds of simulation time, distances in world units.

// Grid
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

// Orders
pub const FORMATION_CHANGE_COOLDOWN: f32 = 1.0;
pub const DOUBLE_ACTIVATION_WINDOW: f32 = 0.5;

// Unit formation FSM
pub const FORMATION_RADIUS_SQ: f32 = 25.0; // 5 units
pub const ARRIVAL_TOLERANCE_SQ: f32 = 0.04; // 0.2 units
pub const WAIT_DELAY_MIN: f32 = 0.5;
pub const WAIT_DELAY_MAX: f32 = 1.5;

// Tactical intent
pub const COHESION_RADIUS: f32 = 5.0;

// Movement
pub const DEFAULT_BASE_SPEED: f32 = 3.5;
pub const TURN_RATE: f32 = 8.0;
pub const WEIGHT_LIGHT: f32 = 1.0;
pub const WEIGHT_MEDIUM: f32 = 0.8;
pub const WEIGHT_HEAVY: f32 = 0.6;

/// Vectors shorter than this normalize to zero
pub const NORMALIZE_EPSILON: f32 = 0.0001;

// Spacing
pub const MIN_SEPARATION: f32 = 0.8;
pub const REPEL_STRENGTH: f32 = 1.0;
pub const MAX_SPACING_PUSH: f32 = 0.5;
