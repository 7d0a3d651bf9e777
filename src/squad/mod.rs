//! Squad formation system - units holding, breaking and reforming around a hero
//!
//! Per-step data flow:
//! orders -> squad state machine -> formation targets -> unit state machine
//! -> movement -> spacing. Tactical intent is classified alongside and is
//! advisory only.
//!
//! Key properties:
//! - Formations are integer grid cells, centered on their bounding box
//! - A single hold activation only becomes an order once the
//!   double-activation window has closed
//! - Units react to a moving hero with a randomized delay, and never stop
//!   half way once moving
//! - Spacing pushes the next target, never the live position

pub mod archetype;
pub mod constants;
pub mod events;
pub mod formation;
pub mod formation_layout;
pub mod grid;
pub mod intent;
pub mod movement;
pub mod orders;
pub mod spacing;
pub mod state_machine;
pub mod terrain;
pub mod unit_fsm;
pub mod units;
pub mod world;

// Re-exports for convenient access
pub use archetype::{ArchetypeDef, ArchetypeRegistry, FormationDef, SquadArchetype};
pub use constants::*;
pub use events::{SquadEvent, SquadEventLog, SquadEventType};
pub use formation::{Formation, FormationLibrary, FormationType};
pub use formation_layout::{
    compute_formation_positions, compute_slot_target, formation_bounds, formation_center,
    slot_offset,
};
pub use grid::{GridCell, GridMapper};
pub use intent::{
    classify_intent, evaluate_intent, is_dispersed, BehaviorProfile, IntentReport,
    TacticalIntent,
};
pub use movement::{advance_unit_movement, safe_normalize, update_orientation, MovementResult};
pub use orders::{FormationRequest, InputAction, InputFrame, OrderInterpreter, PendingOrders};
pub use spacing::{resolve_spacing, SpacingParams};
pub use state_machine::{advance_squad_state, request_formation_change, FormationChangeResult};
pub use terrain::{FlatTerrain, TerrainSampler};
pub use unit_fsm::{advance_unit_state, squad_center};
pub use units::{
    HoldAnchor, OrderKind, OrientationPolicy, Squad, SquadOrder, SquadState, Unit,
    UnitFormationState, WeightClass,
};
pub use world::{
    HeroSnapshot, SquadSnapshot, SquadWorld, StepContext, UnitSnapshot, WorldSnapshot,
};
