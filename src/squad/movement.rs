//! Unit movement executor
//!
//! The only code that writes a unit's live transform.

use glam::{Quat, Vec3};

use crate::squad::constants::NORMALIZE_EPSILON;
use crate::squad::units::{OrientationPolicy, Unit};
use crate::squad::world::HeroSnapshot;

/// Result of moving a unit for one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementResult {
    /// Unit direction of travel (zero if the unit did not move)
    pub direction: Vec3,
    pub distance_moved: f32,
    pub remaining: f32,
}

/// Normalize, or zero when the vector is too short to have a direction
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq < NORMALIZE_EPSILON * NORMALIZE_EPSILON {
        Vec3::ZERO
    } else {
        v / len_sq.sqrt()
    }
}

/// Move a unit toward its target without overshooting
pub fn advance_unit_movement(unit: &mut Unit, target: Vec3, base_speed: f32, dt: f32) -> MovementResult {
    let delta = target - unit.position;
    let distance = delta.length();
    let direction = safe_normalize(delta);
    if direction == Vec3::ZERO {
        return MovementResult {
            direction,
            distance_moved: 0.0,
            remaining: distance,
        };
    }

    let max_step = base_speed * unit.speed_multiplier() * dt;
    let step = distance.min(max_step.max(0.0));
    if step >= distance {
        unit.position = target;
    } else {
        unit.position += direction * step;
    }

    MovementResult {
        direction,
        distance_moved: step,
        remaining: distance - step,
    }
}

/// Yaw rotation facing along a horizontal direction (+Z forward)
pub fn facing_rotation(direction: Vec3) -> Option<Quat> {
    let flat = safe_normalize(Vec3::new(direction.x, 0.0, direction.z));
    if flat == Vec3::ZERO {
        return None;
    }
    Some(Quat::from_rotation_y(flat.x.atan2(flat.z)))
}

/// Turn a unit according to its orientation policy
pub fn update_orientation(
    unit: &mut Unit,
    hero: &HeroSnapshot,
    move_direction: Vec3,
    turn_rate: f32,
    dt: f32,
) {
    let facing = match unit.orientation_policy {
        OrientationPolicy::None => None,
        OrientationPolicy::FaceHero => facing_rotation(hero.position - unit.position),
        OrientationPolicy::MatchHeroDirection => facing_rotation(hero.forward),
        OrientationPolicy::FaceMovementDirection => facing_rotation(move_direction),
    };

    if let Some(desired) = facing {
        let t = (turn_rate * dt).clamp(0.0, 1.0);
        unit.rotation = unit.rotation.slerp(desired, t).normalize();
    }
}
