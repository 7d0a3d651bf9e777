//! Squad and unit records
//!
//! A squad is a group of units commanded together around one hero. Both
//! records live in the world arena and refer to each other by handle only.

use std::sync::Arc;

use glam::{Quat, Vec3};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{HeroId, SquadId, UnitId};
use crate::squad::archetype::SquadArchetype;
use crate::squad::constants::{WEIGHT_HEAVY, WEIGHT_LIGHT, WEIGHT_MEDIUM};
use crate::squad::formation::{Formation, FormationType};
use crate::squad::intent::IntentReport;
use crate::squad::orders::{OrderInterpreter, PendingOrders};

/// Player order currently in force for a squad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SquadOrder {
    FollowHero,
    HoldPosition(Vec3),
    Attack,
}

impl Default for SquadOrder {
    fn default() -> Self {
        SquadOrder::FollowHero
    }
}

impl SquadOrder {
    pub fn kind(&self) -> OrderKind {
        match self {
            SquadOrder::FollowHero => OrderKind::FollowHero,
            SquadOrder::HoldPosition(_) => OrderKind::HoldPosition,
            SquadOrder::Attack => OrderKind::Attack,
        }
    }
}

/// Order without its payload, for table lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    FollowHero,
    HoldPosition,
    Attack,
}

/// Coarse tactical state of a squad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SquadState {
    #[default]
    Idle,
    FollowingHero,
    HoldingPosition,
    InCombat,
    Retreating,
    KO, // Hero knocked out
}

/// Fixed point a holding squad forms around
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldAnchor {
    pub point: Vec3,
    /// Formation active when the anchor was set (kept in sync on change)
    pub formation: FormationType,
}

/// Per-unit formation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitFormationState {
    #[default]
    Formed, // Settled in slot
    Waiting, // Reacting to a moved reference, delay running
    Moving,  // Heading for slot
}

/// Coarse speed tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightClass {
    Light,
    #[default]
    Medium,
    Heavy,
}

impl WeightClass {
    pub fn speed_multiplier(&self) -> f32 {
        match self {
            WeightClass::Light => WEIGHT_LIGHT,
            WeightClass::Medium => WEIGHT_MEDIUM,
            WeightClass::Heavy => WEIGHT_HEAVY,
        }
    }
}

/// How a unit turns each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationPolicy {
    None,
    FaceHero,
    #[default]
    MatchHeroDirection,
    FaceMovementDirection,
}

/// A squad of units around one hero
#[derive(Debug, Clone)]
pub struct Squad {
    pub hero: HeroId,
    pub archetype: Arc<SquadArchetype>,
    /// Ordered members; member i holds slot i after each formation change
    pub members: Vec<UnitId>,
    pub formation: FormationType,
    pub order: SquadOrder,
    pub state: SquadState,
    /// Seconds until another formation change is accepted
    pub formation_cooldown: f32,
    pub hold_anchor: Option<HoldAnchor>,
    pub intent: IntentReport,
    pub pending: PendingOrders,
    pub interpreter: OrderInterpreter,
    pub(crate) rng: ChaCha8Rng,
}

impl Squad {
    pub fn new(
        hero: HeroId,
        archetype: Arc<SquadArchetype>,
        rng: ChaCha8Rng,
    ) -> Self {
        let formation = archetype.formations.initial().kind();
        Self {
            hero,
            archetype,
            members: Vec::new(),
            formation,
            order: SquadOrder::default(),
            state: SquadState::default(),
            formation_cooldown: 0.0,
            hold_anchor: None,
            intent: IntentReport::default(),
            pending: PendingOrders::default(),
            interpreter: OrderInterpreter::default(),
            rng,
        }
    }

    /// The active formation, if the library still knows it
    pub fn active_formation(&self) -> Option<&Formation> {
        self.archetype.formations.get(self.formation)
    }

    /// Point the formation is laid out around
    pub fn reference_point(&self, hero_position: Vec3) -> Vec3 {
        match (self.state, self.hold_anchor) {
            (SquadState::HoldingPosition, Some(anchor)) => anchor.point,
            _ => hero_position,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.state == SquadState::HoldingPosition
    }
}

/// A single squad member
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub squad: SquadId,
    /// Slot in the squad's active formation
    pub slot: Option<usize>,
    pub state: UnitFormationState,
    /// Remaining reaction delay while `Waiting`
    pub wait_timer: f32,
    pub weight_class: WeightClass,
    /// Individual speed variation around 1.0
    pub individual_speed: f32,
    pub orientation_policy: OrientationPolicy,

    // Authoritative transform, written only by the movement pass
    pub position: Vec3,
    pub rotation: Quat,

    /// Desired target computed this step
    pub target: Option<Vec3>,
    /// Push from the spacing pass, added to the next desired target
    pub spacing_offset: Vec3,
}

impl Unit {
    pub fn new(squad: SquadId, slot: usize, position: Vec3) -> Self {
        Self {
            squad,
            slot: Some(slot),
            state: UnitFormationState::default(),
            wait_timer: 0.0,
            weight_class: WeightClass::default(),
            individual_speed: 1.0,
            orientation_policy: OrientationPolicy::default(),
            position,
            rotation: Quat::IDENTITY,
            target: None,
            spacing_offset: Vec3::ZERO,
        }
    }

    /// Combined weight and individual speed modifier
    pub fn speed_multiplier(&self) -> f32 {
        self.weight_class.speed_multiplier() * self.individual_speed
    }

    pub fn is_moving(&self) -> bool {
        self.state == UnitFormationState::Moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_weight_multipliers() {
        assert_eq!(WeightClass::Light.speed_multiplier(), 1.0);
        assert_eq!(WeightClass::Medium.speed_multiplier(), 0.8);
        assert_eq!(WeightClass::Heavy.speed_multiplier(), 0.6);
    }

    #[test]
    fn test_unit_speed_multiplier() {
        let mut unit = Unit::new(SquadId::new(0, 0), 0, Vec3::ZERO);
        unit.weight_class = WeightClass::Heavy;
        unit.individual_speed = 1.5;
        assert!((unit.speed_multiplier() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_order_kind() {
        assert_eq!(SquadOrder::HoldPosition(Vec3::ONE).kind(), OrderKind::HoldPosition);
        assert_eq!(SquadOrder::default().kind(), OrderKind::FollowHero);
    }

    #[test]
    fn test_reference_point_uses_anchor_only_while_holding() {
        let archetype = Arc::new(SquadArchetype::builtin("legionaries").unwrap());
        let mut squad = Squad::new(HeroId::new(1), archetype, ChaCha8Rng::seed_from_u64(0));
        let hero = Vec3::new(4.0, 0.0, 4.0);
        assert_eq!(squad.reference_point(hero), hero);

        squad.state = SquadState::HoldingPosition;
        squad.hold_anchor = Some(HoldAnchor {
            point: Vec3::new(-1.0, 0.0, 2.0),
            formation: squad.formation,
        });
        assert_eq!(squad.reference_point(hero), Vec3::new(-1.0, 0.0, 2.0));
    }

    #[test]
    fn test_new_squad_starts_in_initial_formation() {
        let archetype = Arc::new(SquadArchetype::builtin("legionaries").unwrap());
        let squad = Squad::new(HeroId::new(1), archetype.clone(), ChaCha8Rng::seed_from_u64(0));
        assert_eq!(squad.formation, archetype.formations.initial().kind());
        assert_eq!(squad.state, SquadState::Idle);
        assert!(squad.hold_anchor.is_none());
        assert_eq!(squad.formation_cooldown, 0.0);
    }
}
