//! Local repulsion between squad members
//!
//! Produces a bounded per-unit push that is added to the next desired
//! target, never to the live position, so overlaps resolve over several
//! steps instead of snapping apart.

use glam::Vec3;

use crate::core::config::SquadConfig;
use crate::squad::constants::NORMALIZE_EPSILON;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingParams {
    pub min_separation: f32,
    pub repel_strength: f32,
    pub max_push: f32,
}

impl SpacingParams {
    pub fn from_config(config: &SquadConfig) -> Self {
        Self {
            min_separation: config.min_separation,
            repel_strength: config.repel_strength,
            max_push: config.max_push,
        }
    }
}

/// Push for each position, same order as the input
///
/// Pairs are compared on the ground plane. Coincident units are split along
/// the x axis, lower index toward -X.
pub fn resolve_spacing(positions: &[Vec3], params: &SpacingParams) -> Vec<Vec3> {
    let mut pushes = vec![Vec3::ZERO; positions.len()];
    if params.min_separation <= 0.0 || params.repel_strength <= 0.0 {
        return pushes;
    }

    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let mut away = positions[i] - positions[j];
            away.y = 0.0;
            let distance = away.length();
            if distance >= params.min_separation {
                continue;
            }

            let direction = if distance < NORMALIZE_EPSILON {
                -Vec3::X
            } else {
                away / distance
            };
            let push = direction * (params.min_separation - distance) * params.repel_strength;
            pushes[i] += push;
            pushes[j] -= push;
        }
    }

    for push in &mut pushes {
        *push = push.clamp_length_max(params.max_push);
    }
    pushes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SpacingParams {
        SpacingParams {
            min_separation: 0.8,
            repel_strength: 1.0,
            max_push: 0.5,
        }
    }

    #[test]
    fn test_far_apart_untouched() {
        let pushes = resolve_spacing(&[Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)], &params());
        assert_eq!(pushes, vec![Vec3::ZERO, Vec3::ZERO]);
    }

    #[test]
    fn test_pair_pushed_apart() {
        let pushes = resolve_spacing(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 0.4)], &params());
        assert!((pushes[0] - Vec3::new(0.0, 0.0, -0.4)).length() < 1e-6);
        assert!((pushes[1] - Vec3::new(0.0, 0.0, 0.4)).length() < 1e-6);
    }

    #[test]
    fn test_coincident_split_along_x() {
        let pushes = resolve_spacing(&[Vec3::ONE, Vec3::ONE], &params());
        assert!(pushes[0].x < 0.0);
        assert!(pushes[1].x > 0.0);
        assert!((pushes[0].length() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_push_capped_under_crowding() {
        let crowd = vec![Vec3::ZERO; 6]
            .into_iter()
            .chain([Vec3::new(0.1, 0.0, 0.0), Vec3::new(-0.1, 0.0, 0.1)])
            .collect::<Vec<_>>();
        for push in resolve_spacing(&crowd, &params()) {
            assert!(push.length() <= 0.5 + 1e-5);
        }
    }

    #[test]
    fn test_height_difference_ignored() {
        let pushes = resolve_spacing(&[Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0)], &params());
        assert!(pushes[0].length() > 0.0);
        assert_eq!(pushes[0].y, 0.0);
    }
}
