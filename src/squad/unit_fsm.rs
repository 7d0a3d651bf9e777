//! Per-unit formation state machine
//!
//! Formed units only react once the squad's reference point drifts out of
//! the formation radius, and then only after a randomized delay, so a squad
//! breaks formation in a ragged wave rather than all at once.

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::SquadConfig;
use crate::squad::units::{Unit, UnitFormationState};

/// Centroid of the squad's live positions
pub fn squad_center(positions: &[Vec3]) -> Option<Vec3> {
    if positions.is_empty() {
        return None;
    }
    let sum: Vec3 = positions.iter().copied().sum();
    Some(sum / positions.len() as f32)
}

/// Is the reference point within the formation radius of the center?
///
/// Measured on the ground plane so terrain height does not break formation.
pub fn reference_within_radius(reference: Vec3, center: Vec3, radius_sq: f32) -> bool {
    let dx = reference.x - center.x;
    let dz = reference.z - center.z;
    dx * dx + dz * dz <= radius_sq
}

/// Has the unit reached its target?
pub fn within_arrival_tolerance(position: Vec3, target: Vec3, tolerance_sq: f32) -> bool {
    position.distance_squared(target) <= tolerance_sq
}

/// Advance one unit's formation state by one step
///
/// Returns the transition taken, if any.
pub fn advance_unit_state(
    unit: &mut Unit,
    target: Vec3,
    reference_in_radius: bool,
    config: &SquadConfig,
    dt: f32,
    rng: &mut ChaCha8Rng,
) -> Option<(UnitFormationState, UnitFormationState)> {
    let from = unit.state;
    let arrived = within_arrival_tolerance(unit.position, target, config.arrival_tolerance_sq);

    let next = match from {
        UnitFormationState::Formed => {
            if reference_in_radius {
                return None;
            }
            unit.wait_timer = draw_wait_delay(config, rng);
            UnitFormationState::Waiting
        }
        UnitFormationState::Waiting => {
            if reference_in_radius && arrived {
                unit.wait_timer = 0.0;
                UnitFormationState::Formed
            } else {
                unit.wait_timer -= dt;
                if unit.wait_timer > 0.0 {
                    return None;
                }
                unit.wait_timer = 0.0;
                UnitFormationState::Moving
            }
        }
        // Keeps moving until it arrives, even if the reference leaves again
        UnitFormationState::Moving => {
            if !(arrived && reference_in_radius) {
                return None;
            }
            UnitFormationState::Formed
        }
    };

    unit.state = next;
    Some((from, next))
}

/// Force a unit into `Moving`, e.g. after its slot was reassigned
pub fn force_moving(unit: &mut Unit) -> Option<(UnitFormationState, UnitFormationState)> {
    let from = unit.state;
    unit.wait_timer = 0.0;
    unit.state = UnitFormationState::Moving;
    (from != UnitFormationState::Moving).then_some((from, UnitFormationState::Moving))
}

fn draw_wait_delay(config: &SquadConfig, rng: &mut ChaCha8Rng) -> f32 {
    if config.wait_delay_max > config.wait_delay_min {
        rng.gen_range(config.wait_delay_min..=config.wait_delay_max)
    } else {
        config.wait_delay_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SquadId;
    use rand::SeedableRng;

    fn unit_at(position: Vec3) -> Unit {
        Unit::new(SquadId::new(0, 0), 0, position)
    }

    #[test]
    fn test_squad_center() {
        let positions = [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 3.0)];
        assert_eq!(squad_center(&positions), Some(Vec3::new(1.0, 0.0, 1.0)));
        assert_eq!(squad_center(&[]), None);
    }

    #[test]
    fn test_radius_ignores_height() {
        assert!(reference_within_radius(
            Vec3::new(3.0, 50.0, 4.0),
            Vec3::ZERO,
            25.0
        ));
        assert!(!reference_within_radius(Vec3::new(3.0, 0.0, 4.1), Vec3::ZERO, 25.0));
    }

    #[test]
    fn test_formed_stays_while_reference_in_radius() {
        let config = SquadConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut unit = unit_at(Vec3::ZERO);
        assert_eq!(advance_unit_state(&mut unit, Vec3::ZERO, true, &config, 0.1, &mut rng), None);
        assert_eq!(unit.state, UnitFormationState::Formed);
    }

    #[test]
    fn test_wait_delay_within_configured_range() {
        let config = SquadConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let mut unit = unit_at(Vec3::ZERO);
            advance_unit_state(&mut unit, Vec3::ZERO, false, &config, 0.1, &mut rng);
            assert_eq!(unit.state, UnitFormationState::Waiting);
            assert!(unit.wait_timer >= config.wait_delay_min);
            assert!(unit.wait_timer <= config.wait_delay_max);
        }
    }

    #[test]
    fn test_full_cycle() {
        let config = SquadConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut unit = unit_at(Vec3::ZERO);
        let target = Vec3::new(10.0, 0.0, 0.0);

        let transition = advance_unit_state(&mut unit, target, false, &config, 0.1, &mut rng);
        assert_eq!(
            transition,
            Some((UnitFormationState::Formed, UnitFormationState::Waiting))
        );

        // Delay is at most 1.5, so 16 steps of 0.1 always elapse it
        let mut became_moving = false;
        for _ in 0..16 {
            if advance_unit_state(&mut unit, target, false, &config, 0.1, &mut rng).is_some() {
                became_moving = true;
                break;
            }
        }
        assert!(became_moving);
        assert_eq!(unit.state, UnitFormationState::Moving);

        // Still outside radius: arriving alone does not settle the unit
        unit.position = target;
        assert_eq!(advance_unit_state(&mut unit, target, false, &config, 0.1, &mut rng), None);
        assert_eq!(unit.state, UnitFormationState::Moving);

        let transition = advance_unit_state(&mut unit, target, true, &config, 0.1, &mut rng);
        assert_eq!(
            transition,
            Some((UnitFormationState::Moving, UnitFormationState::Formed))
        );
    }

    #[test]
    fn test_waiting_returns_to_formed_when_reference_comes_back() {
        let config = SquadConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut unit = unit_at(Vec3::ZERO);
        advance_unit_state(&mut unit, Vec3::ZERO, false, &config, 0.1, &mut rng);
        assert_eq!(unit.state, UnitFormationState::Waiting);

        advance_unit_state(&mut unit, Vec3::new(0.1, 0.0, 0.0), true, &config, 0.1, &mut rng);
        assert_eq!(unit.state, UnitFormationState::Formed);
    }

    #[test]
    fn test_moving_never_reverts_to_waiting() {
        let config = SquadConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut unit = unit_at(Vec3::ZERO);
        unit.state = UnitFormationState::Moving;
        for _ in 0..20 {
            advance_unit_state(&mut unit, Vec3::new(5.0, 0.0, 0.0), false, &config, 0.1, &mut rng);
            assert_eq!(unit.state, UnitFormationState::Moving);
        }
    }

    #[test]
    fn test_force_moving() {
        let mut unit = unit_at(Vec3::ZERO);
        unit.state = UnitFormationState::Waiting;
        unit.wait_timer = 0.8;
        assert_eq!(
            force_moving(&mut unit),
            Some((UnitFormationState::Waiting, UnitFormationState::Moving))
        );
        assert_eq!(unit.wait_timer, 0.0);
        assert_eq!(force_moving(&mut unit), None);
    }
}
