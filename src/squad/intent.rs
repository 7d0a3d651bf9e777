//! Tactical intent classification
//!
//! Advisory only: combat/AI collaborators read the result, the squad state
//! machine never does. Intent and order state can disagree (a harassing
//! squad holding position reports `Attacking` once enemies show up).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::squad::units::OrderKind;

/// Behavior profile of a squad archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorProfile {
    Defensive,
    Harassing,
    AntiCharge,
    #[default]
    Versatile,
}

/// Advisory posture of a squad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TacticalIntent {
    #[default]
    Idle,
    Attacking,
    Regrouping,
    Defending,
}

/// Result of one classification pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntentReport {
    pub intent: TacticalIntent,
    pub is_in_combat: bool,
}

/// Member closest to the centroid (first one on ties)
pub fn reference_member(positions: &[Vec3]) -> Option<Vec3> {
    if positions.is_empty() {
        return None;
    }
    let centroid = positions.iter().copied().sum::<Vec3>() / positions.len() as f32;
    positions.iter().copied().fold(None, |best: Option<Vec3>, p| match best {
        Some(b) if b.distance_squared(centroid) <= p.distance_squared(centroid) => Some(b),
        _ => Some(p),
    })
}

/// True when any member is farther than `cohesion_radius` from the reference member
pub fn is_dispersed(positions: &[Vec3], cohesion_radius: f32) -> bool {
    let Some(reference) = reference_member(positions) else {
        return false;
    };
    let radius_sq = cohesion_radius * cohesion_radius;
    positions
        .iter()
        .any(|p| p.distance_squared(reference) > radius_sq)
}

/// Fixed decision table; dispersion always wins
pub fn classify_intent(
    profile: BehaviorProfile,
    dispersed: bool,
    enemies_detected: bool,
    order: OrderKind,
) -> TacticalIntent {
    use BehaviorProfile::*;
    use OrderKind::*;
    use TacticalIntent::*;

    if dispersed {
        return Regrouping;
    }

    if !enemies_detected {
        return match (profile, order) {
            (Defensive | AntiCharge, HoldPosition) => Defending,
            _ => Idle,
        };
    }

    match (profile, order) {
        (Harassing, _) => Attacking,
        (_, Attack) => Attacking,
        (Versatile, FollowHero) => Attacking,
        (Versatile, HoldPosition) => Defending,
        (Defensive | AntiCharge, _) => Defending,
    }
}

/// Classify and derive the combat flag
pub fn evaluate_intent(
    profile: BehaviorProfile,
    positions: &[Vec3],
    cohesion_radius: f32,
    enemies_detected: bool,
    order: OrderKind,
) -> IntentReport {
    let dispersed = is_dispersed(positions, cohesion_radius);
    let intent = classify_intent(profile, dispersed, enemies_detected, order);
    IntentReport {
        intent,
        is_in_combat: enemies_detected
            && matches!(intent, TacticalIntent::Attacking | TacticalIntent::Defending),
    }
}
