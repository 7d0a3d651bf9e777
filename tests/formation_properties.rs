//! Property tests for the grid mapping, formation centering and spacing

use glam::Vec3;
use hero_squad::squad::*;
use proptest::prelude::*;

fn cells_strategy() -> impl Strategy<Value = Vec<GridCell>> {
    prop::collection::hash_set((-20i32..20, -20i32..20), 1..30)
        .prop_map(|set| set.into_iter().map(|(x, y)| GridCell::new(x, y)).collect())
}

proptest! {
    /// Property: grid -> world -> grid is the identity for any positive cell size
    #[test]
    fn prop_grid_round_trip(
        x in -1000i32..1000,
        y in -1000i32..1000,
        cell_size in 0.25f32..4.0
    ) {
        let mapper = GridMapper::new(cell_size);
        let cell = GridCell::new(x, y);
        let world = mapper.grid_to_world(cell);
        prop_assert_eq!(world.y, 0.0);
        prop_assert_eq!(mapper.world_to_grid(world), cell);
    }

    /// Property: the center always lies inside the bounding box
    #[test]
    fn prop_center_inside_bounds(cells in cells_strategy()) {
        let (min, max) = formation_bounds(&cells).unwrap();
        let center = formation_center(&cells).unwrap();
        prop_assert!(center.x >= min.x && center.x <= max.x);
        prop_assert!(center.y >= min.y && center.y <= max.y);
    }

    /// Property: translating a formation translates its center by the same amount
    #[test]
    fn prop_center_translates(cells in cells_strategy(), dx in -3i32..3, dy in -3i32..3) {
        // Even shifts keep the half-to-even tie breaking stable
        let shift = GridCell::new(dx * 2, dy * 2);
        let moved: Vec<GridCell> = cells.iter().map(|&c| c + shift).collect();
        prop_assert_eq!(
            formation_center(&moved).unwrap(),
            formation_center(&cells).unwrap() + shift
        );
    }

    /// Property: no unit is ever pushed farther than the cap in one step
    #[test]
    fn prop_spacing_push_capped(
        points in prop::collection::vec((-2.0f32..2.0, -2.0f32..2.0), 0..40),
        max_push in 0.05f32..1.0
    ) {
        let positions: Vec<Vec3> = points.iter().map(|&(x, z)| Vec3::new(x, 0.0, z)).collect();
        let params = SpacingParams { min_separation: 0.8, repel_strength: 1.0, max_push };
        let pushes = resolve_spacing(&positions, &params);
        prop_assert_eq!(pushes.len(), positions.len());
        for push in pushes {
            prop_assert!(push.length() <= max_push + 1e-4);
            prop_assert_eq!(push.y, 0.0);
        }
    }

    /// Property: movement never overshoots and never moves away from the target
    #[test]
    fn prop_movement_no_overshoot(
        tx in -50.0f32..50.0,
        tz in -50.0f32..50.0,
        dt in 0.001f32..1.0
    ) {
        let mut unit = Unit::new(hero_squad::core::types::SquadId::new(0, 0), 0, Vec3::ZERO);
        let target = Vec3::new(tx, 0.0, tz);
        let before = unit.position.distance(target);
        let result = advance_unit_movement(&mut unit, target, 3.5, dt);
        let after = unit.position.distance(target);
        prop_assert!(after <= before + 1e-4);
        prop_assert!(result.distance_moved <= 3.5 * unit.speed_multiplier() * dt + 1e-4);
    }
}
