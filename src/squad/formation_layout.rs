//! Formation layout computation
//!
//! Converts a unit's grid slot into a world-space target. The formation is
//! centered on its own bounding box, then placed at the squad reference
//! point (the hero, or the hold anchor while holding position).

use glam::Vec3;

use crate::squad::formation::Formation;
use crate::squad::grid::{GridCell, GridMapper};
use crate::squad::terrain::TerrainSampler;

/// Axis-aligned bounds (min, max) over a set of cells
pub fn formation_bounds(cells: &[GridCell]) -> Option<(GridCell, GridCell)> {
    let first = *cells.first()?;
    Some(
        cells
            .iter()
            .fold((first, first), |(min, max), &cell| (min.min(cell), max.max(cell))),
    )
}

/// Center cell of the bounding box
///
/// Each axis uses `round((min + max) / 2)` with ties going to the even
/// integer, so X∈[3,6] centers on 4 and X∈[2,8] on 5.
pub fn formation_center(cells: &[GridCell]) -> Option<GridCell> {
    let (min, max) = formation_bounds(cells)?;
    Some(GridCell::new(
        halve_round_even(min.x + max.x),
        halve_round_even(min.y + max.y),
    ))
}

/// `sum / 2` rounded half-to-even, in integer arithmetic
fn halve_round_even(sum: i32) -> i32 {
    let half = sum.div_euclid(2);
    if sum.rem_euclid(2) == 0 || half % 2 == 0 {
        half
    } else {
        half + 1
    }
}

/// World offset of a slot relative to the formation center
pub fn slot_offset(mapper: &GridMapper, formation: &Formation, slot: usize) -> Option<Vec3> {
    let cell = formation.cell(slot)?;
    let center = formation_center(formation.cells())?;
    Some(mapper.grid_to_world(cell - center))
}

/// Target world position for a slot around the reference point
///
/// Returns `None` when the slot does not exist in the formation; such a
/// unit is left out of repositioning for this step.
pub fn compute_slot_target(
    mapper: &GridMapper,
    formation: &Formation,
    slot: usize,
    reference: Vec3,
    terrain: Option<&dyn TerrainSampler>,
) -> Option<Vec3> {
    let mut target = reference + slot_offset(mapper, formation, slot)?;
    if let Some(terrain) = terrain {
        target.y = terrain.sample_height(target.x, target.z);
    }
    Some(target)
}

/// Targets for every slot of a formation, in slot order
pub fn compute_formation_positions(
    mapper: &GridMapper,
    formation: &Formation,
    reference: Vec3,
    terrain: Option<&dyn TerrainSampler>,
) -> Vec<Vec3> {
    (0..formation.len())
        .filter_map(|slot| compute_slot_target(mapper, formation, slot, reference, terrain))
        .collect()
}
