//! Squad world: storage and the per-step pipeline
//!
//! A step runs strictly ordered passes over every squad:
//!
//! 1. order interpretation
//! 2. squad state machine (slot reassignments applied after the pass)
//! 3. formation targets
//! 4. unit formation state machine
//! 5. movement (the only writer of live transforms)
//! 6. spacing (offsets picked up by the next step's targets)
//!
//! Tactical intent is classified last, for every squad, from the committed
//! positions.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::arena::Arena;
use crate::core::config::SquadConfig;
use crate::core::error::{Result, SquadError};
use crate::core::types::{HeroId, SquadId, Tick, UnitId};
use crate::squad::archetype::SquadArchetype;
use crate::squad::events::{SquadEvent, SquadEventLog, SquadEventType};
use crate::squad::formation::FormationType;
use crate::squad::formation_layout::{compute_formation_positions, compute_slot_target};
use crate::squad::grid::GridMapper;
use crate::squad::intent::{evaluate_intent, IntentReport};
use crate::squad::movement::{advance_unit_movement, facing_rotation, update_orientation};
use crate::squad::orders::{FormationRequest, InputFrame};
use crate::squad::spacing::{resolve_spacing, SpacingParams};
use crate::squad::state_machine::{self, advance_squad_state};
use crate::squad::terrain::TerrainSampler;
use crate::squad::unit_fsm::{advance_unit_state, force_moving, reference_within_radius, squad_center};
use crate::squad::units::{
    HoldAnchor, Squad, SquadOrder, SquadState, Unit, UnitFormationState,
};

/// Hero state sampled once per step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeroSnapshot {
    pub position: Vec3,
    /// Facing direction; only its horizontal part is used
    pub forward: Vec3,
    pub knocked_out: bool,
}

impl HeroSnapshot {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward,
            knocked_out: false,
        }
    }

    pub fn knocked_out(mut self) -> Self {
        self.knocked_out = true;
        self
    }
}

/// Everything collaborators supply for one step
pub struct StepContext<'a> {
    pub dt: f32,
    pub heroes: AHashMap<HeroId, HeroSnapshot>,
    pub inputs: AHashMap<SquadId, InputFrame>,
    /// Squads with enemies detected nearby
    pub hostiles_near: AHashSet<SquadId>,
    pub terrain: Option<&'a dyn TerrainSampler>,
}

impl<'a> StepContext<'a> {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            heroes: AHashMap::new(),
            inputs: AHashMap::new(),
            hostiles_near: AHashSet::new(),
            terrain: None,
        }
    }

    pub fn with_hero(mut self, hero: HeroId, snapshot: HeroSnapshot) -> Self {
        self.heroes.insert(hero, snapshot);
        self
    }

    pub fn with_input(mut self, squad: SquadId, frame: InputFrame) -> Self {
        self.inputs.insert(squad, frame);
        self
    }

    pub fn with_hostiles(mut self, squad: SquadId) -> Self {
        self.hostiles_near.insert(squad);
        self
    }

    pub fn with_terrain(mut self, terrain: &'a dyn TerrainSampler) -> Self {
        self.terrain = Some(terrain);
        self
    }
}

/// Serializable view of one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub slot: Option<usize>,
    pub state: UnitFormationState,
    pub position: Vec3,
    pub rotation: Quat,
    pub target: Option<Vec3>,
}

/// Serializable view of one squad
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadSnapshot {
    pub id: SquadId,
    pub hero: HeroId,
    pub archetype: String,
    pub state: SquadState,
    pub order: SquadOrder,
    pub formation: FormationType,
    pub formation_cooldown: f32,
    pub hold_anchor: Option<HoldAnchor>,
    pub intent: IntentReport,
    pub units: Vec<UnitSnapshot>,
}

/// Serializable view of the whole world, for rendering and tooling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: Tick,
    pub time: f32,
    pub squads: Vec<SquadSnapshot>,
}

/// Owns every squad and unit and runs the step pipeline
#[derive(Debug, Clone)]
pub struct SquadWorld {
    config: SquadConfig,
    mapper: GridMapper,
    squads: Arena<SquadId, Squad>,
    units: Arena<UnitId, Unit>,
    time: f32,
    tick: Tick,
    events: SquadEventLog,
}

impl SquadWorld {
    pub fn new(config: SquadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            mapper: GridMapper::new(config.cell_size),
            config,
            squads: Arena::new(),
            units: Arena::new(),
            time: 0.0,
            tick: 0,
            events: SquadEventLog::new(),
        })
    }

    pub fn config(&self) -> &SquadConfig {
        &self.config
    }

    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    /// Simulation time at the last completed step
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Spawn a squad around its hero, units settled in the initial formation
    pub fn spawn_squad(
        &mut self,
        hero: HeroId,
        archetype: Arc<SquadArchetype>,
        hero_position: Vec3,
        hero_forward: Vec3,
    ) -> SquadId {
        let seed = self.config.seed;
        let squad_id = self.squads.insert_with(|id| {
            let rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(id.index as u64));
            Squad::new(hero, Arc::clone(&archetype), rng)
        });

        let slots = compute_formation_positions(
            &self.mapper,
            archetype.formations.initial(),
            hero_position,
            None,
        );
        let rotation = facing_rotation(hero_forward).unwrap_or(Quat::IDENTITY);
        let (low, high) = archetype.speed_variation;

        let Some(squad) = self.squads.get_mut(squad_id) else {
            return squad_id;
        };
        for (slot, position) in slots.into_iter().enumerate() {
            let individual_speed = if high > low {
                squad.rng.gen_range(low..=high)
            } else {
                low
            };
            let mut unit = Unit::new(squad_id, slot, position);
            unit.weight_class = archetype.weight_class;
            unit.orientation_policy = archetype.orientation;
            unit.individual_speed = individual_speed;
            unit.rotation = rotation;
            squad.members.push(self.units.insert(unit));
        }

        tracing::info!(
            "Spawned squad {:?} ({}, {} units) for hero {:?}",
            squad_id,
            archetype.name,
            squad.members.len(),
            hero
        );
        self.events.push(
            SquadEventType::SquadSpawned { squad: squad_id },
            format!("Spawned {} squad", archetype.name),
            self.tick,
        );
        squad_id
    }

    /// Remove a squad and all of its units
    pub fn despawn_squad(&mut self, squad_id: SquadId) -> Option<Squad> {
        let squad = self.squads.remove(squad_id)?;
        for &unit_id in &squad.members {
            self.units.remove(unit_id);
        }
        tracing::debug!("Despawned squad {:?}", squad_id);
        self.events.push(
            SquadEventType::SquadDespawned { squad: squad_id },
            format!("Despawned {} squad", squad.archetype.name),
            self.tick,
        );
        Some(squad)
    }

    /// Remove a single unit (e.g. a casualty); remaining slots are untouched
    pub fn despawn_unit(&mut self, unit_id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(unit_id)?;
        if let Some(squad) = self.squads.get_mut(unit.squad) {
            squad.members.retain(|&member| member != unit_id);
        }
        Some(unit)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn squad(&self, squad_id: SquadId) -> Option<&Squad> {
        self.squads.get(squad_id)
    }

    pub fn unit(&self, unit_id: UnitId) -> Option<&Unit> {
        self.units.get(unit_id)
    }

    pub fn squads(&self) -> impl Iterator<Item = (SquadId, &Squad)> + '_ {
        self.squads.iter()
    }

    pub fn squad_count(&self) -> usize {
        self.squads.len()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Live members of a squad, in member order
    pub fn units_of(&self, squad_id: SquadId) -> impl Iterator<Item = (UnitId, &Unit)> + '_ {
        self.squads
            .get(squad_id)
            .into_iter()
            .flat_map(|squad| squad.members.iter())
            .filter_map(move |&id| self.units.get(id).map(|unit| (id, unit)))
    }

    /// Latest advisory intent for a squad
    pub fn intent(&self, squad_id: SquadId) -> Option<IntentReport> {
        self.squads.get(squad_id).map(|squad| squad.intent)
    }

    /// Targets of units walking to a hold position
    ///
    /// Only squads holding position show markers, and only for members still
    /// `Moving`.
    pub fn destination_markers(&self, squad_id: SquadId) -> Vec<(UnitId, Vec3)> {
        match self.squads.get(squad_id) {
            Some(squad) if squad.is_holding() => self
                .units_of(squad_id)
                .filter(|(_, unit)| unit.is_moving())
                .filter_map(|(id, unit)| unit.target.map(|target| (id, target)))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let squads = self
            .squads
            .iter()
            .map(|(id, squad)| SquadSnapshot {
                id,
                hero: squad.hero,
                archetype: squad.archetype.name.clone(),
                state: squad.state,
                order: squad.order,
                formation: squad.formation,
                formation_cooldown: squad.formation_cooldown,
                hold_anchor: squad.hold_anchor,
                intent: squad.intent,
                units: self
                    .units_of(id)
                    .map(|(unit_id, unit)| UnitSnapshot {
                        id: unit_id,
                        slot: unit.slot,
                        state: unit.state,
                        position: unit.position,
                        rotation: unit.rotation,
                        target: unit.target,
                    })
                    .collect(),
            })
            .collect();

        WorldSnapshot {
            tick: self.tick,
            time: self.time,
            squads,
        }
    }

    pub fn events(&self) -> &SquadEventLog {
        &self.events
    }

    /// Drain everything logged since the last call
    pub fn take_events(&mut self) -> Vec<SquadEvent> {
        self.events.drain()
    }

    // ------------------------------------------------------------------
    // Commands from collaborators
    // ------------------------------------------------------------------

    /// Queue an order directly, bypassing input interpretation
    pub fn issue_order(&mut self, squad_id: SquadId, order: SquadOrder) -> Result<()> {
        let squad = self
            .squads
            .get_mut(squad_id)
            .ok_or(SquadError::SquadNotFound(squad_id))?;
        squad.pending.issue(order);
        Ok(())
    }

    /// Queue a formation change; the cooldown still applies at the next step
    pub fn request_formation(&mut self, squad_id: SquadId, kind: FormationType) -> Result<()> {
        let squad = self
            .squads
            .get_mut(squad_id)
            .ok_or(SquadError::SquadNotFound(squad_id))?;
        if !squad.archetype.formations.contains(kind) {
            return Err(SquadError::FormationNotFound(kind));
        }
        squad.pending.request_formation(FormationRequest::Select(kind));
        Ok(())
    }

    /// Put a squad into `Retreating`; any later order takes it out again
    pub fn begin_retreat(&mut self, squad_id: SquadId) -> Result<()> {
        let squad = self
            .squads
            .get_mut(squad_id)
            .ok_or(SquadError::SquadNotFound(squad_id))?;
        state_machine::begin_retreat(squad_id, squad, self.tick, &mut self.events);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Step pipeline
    // ------------------------------------------------------------------

    /// Advance every squad by `ctx.dt`
    ///
    /// Each step appends to the event log (unit state changes included). The
    /// log is never trimmed here; hosts drain it with [`Self::take_events`].
    pub fn step(&mut self, ctx: &StepContext<'_>) {
        self.tick += 1;
        self.time += ctx.dt;

        let handles: Vec<SquadId> = self.squads.handles().collect();

        self.interpret_orders(&handles, ctx);
        let changed = self.update_squad_states(&handles, ctx);
        for squad_id in changed {
            self.reassign_slots(squad_id);
        }
        let radius_checks = self.compute_targets(&handles, ctx);
        self.update_unit_states(&radius_checks, ctx.dt);
        self.move_units(&radius_checks, ctx);
        self.apply_spacing(&handles);
        self.update_intents(&handles, ctx);
    }

    fn active_hero<'c>(&self, squad: &Squad, ctx: &'c StepContext<'_>) -> Option<&'c HeroSnapshot> {
        let hero = ctx.heroes.get(&squad.hero);
        if hero.is_none() {
            tracing::trace!("No snapshot for hero {:?}, squad skipped", squad.hero);
        }
        hero
    }

    fn interpret_orders(&mut self, handles: &[SquadId], ctx: &StepContext<'_>) {
        let window = self.config.double_activation_window;
        for &squad_id in handles {
            let Some(hero) = self.squads.get(squad_id).and_then(|s| self.active_hero(s, ctx)) else {
                continue;
            };
            let fallback = hero.position;
            if let Some(squad) = self.squads.get_mut(squad_id) {
                squad.interpreter.interpret(
                    self.time,
                    ctx.inputs.get(&squad_id),
                    fallback,
                    window,
                    &mut squad.pending,
                );
            }
        }
    }

    /// Returns the squads whose formation changed
    fn update_squad_states(&mut self, handles: &[SquadId], ctx: &StepContext<'_>) -> Vec<SquadId> {
        let mut changed = Vec::new();
        for &squad_id in handles {
            let Some(hero) = self.squads.get(squad_id).and_then(|s| self.active_hero(s, ctx)) else {
                continue;
            };
            let knocked_out = hero.knocked_out;
            let Some(squad) = self.squads.get_mut(squad_id) else {
                continue;
            };
            if advance_squad_state(
                squad_id,
                squad,
                knocked_out,
                self.config.formation_cooldown,
                ctx.dt,
                self.tick,
                &mut self.events,
            )
            .is_some()
            {
                changed.push(squad_id);
            }
        }
        changed
    }

    /// Member i takes slot i of the new formation and heads for it
    fn reassign_slots(&mut self, squad_id: SquadId) {
        let Some(squad) = self.squads.get(squad_id) else {
            return;
        };
        for (slot, &unit_id) in squad.members.iter().enumerate() {
            let Some(unit) = self.units.get_mut(unit_id) else {
                continue;
            };
            unit.slot = Some(slot);
            if let Some((from, to)) = force_moving(unit) {
                self.events.push(
                    SquadEventType::UnitStateChanged { unit: unit_id, from, to },
                    format!("{:?} -> {:?} (slot {})", from, to, slot),
                    self.tick,
                );
            }
        }
    }

    /// Desired targets for every live member
    ///
    /// Returns, per active squad, whether the reference point is inside the
    /// formation radius of the squad's current center.
    fn compute_targets(&mut self, handles: &[SquadId], ctx: &StepContext<'_>) -> Vec<(SquadId, bool)> {
        let mut radius_checks = Vec::with_capacity(handles.len());

        for &squad_id in handles {
            let Some(squad) = self.squads.get(squad_id) else {
                continue;
            };
            let Some(hero) = self.active_hero(squad, ctx) else {
                continue;
            };
            if squad.state == SquadState::KO {
                continue;
            }

            let reference = squad.reference_point(hero.position);
            let Some(formation) = squad.active_formation() else {
                tracing::debug!(
                    "Squad {:?} formation {:?} missing from archetype '{}'",
                    squad_id,
                    squad.formation,
                    squad.archetype.name
                );
                continue;
            };

            let positions: Vec<Vec3> = squad
                .members
                .iter()
                .filter_map(|&id| self.units.get(id).map(|unit| unit.position))
                .collect();
            let in_radius = squad_center(&positions).map_or(true, |center| {
                reference_within_radius(reference, center, self.config.formation_radius_sq)
            });

            for &unit_id in &squad.members {
                let Some(unit) = self.units.get_mut(unit_id) else {
                    continue;
                };
                let target = unit
                    .slot
                    .and_then(|slot| compute_slot_target(&self.mapper, formation, slot, reference, None))
                    .map(|base| {
                        let mut target = base + unit.spacing_offset;
                        if let Some(terrain) = ctx.terrain {
                            target.y = terrain.sample_height(target.x, target.z);
                        }
                        target
                    });
                if target.is_none() {
                    tracing::trace!("Unit {:?} has no slot in {:?}, skipped", unit_id, squad.formation);
                }
                unit.target = target;
            }

            radius_checks.push((squad_id, in_radius));
        }

        radius_checks
    }

    fn update_unit_states(&mut self, radius_checks: &[(SquadId, bool)], dt: f32) {
        for &(squad_id, in_radius) in radius_checks {
            let Some(squad) = self.squads.get_mut(squad_id) else {
                continue;
            };
            for &unit_id in &squad.members {
                let Some(unit) = self.units.get_mut(unit_id) else {
                    continue;
                };
                let Some(target) = unit.target else {
                    continue;
                };
                if let Some((from, to)) =
                    advance_unit_state(unit, target, in_radius, &self.config, dt, &mut squad.rng)
                {
                    self.events.push(
                        SquadEventType::UnitStateChanged { unit: unit_id, from, to },
                        format!("{:?} -> {:?}", from, to),
                        self.tick,
                    );
                }
            }
        }
    }

    fn move_units(&mut self, radius_checks: &[(SquadId, bool)], ctx: &StepContext<'_>) {
        for &(squad_id, _) in radius_checks {
            let Some(squad) = self.squads.get(squad_id) else {
                continue;
            };
            let Some(hero) = ctx.heroes.get(&squad.hero) else {
                continue;
            };
            let base_speed = squad.archetype.base_speed;

            for &unit_id in &squad.members {
                let Some(unit) = self.units.get_mut(unit_id) else {
                    continue;
                };
                let Some(target) = unit.target else {
                    continue;
                };
                let direction = if unit.is_moving() {
                    advance_unit_movement(unit, target, base_speed, ctx.dt).direction
                } else {
                    Vec3::ZERO
                };
                update_orientation(unit, hero, direction, self.config.turn_rate, ctx.dt);
            }
        }
    }

    fn apply_spacing(&mut self, handles: &[SquadId]) {
        let params = SpacingParams::from_config(&self.config);
        for &squad_id in handles {
            let Some(squad) = self.squads.get(squad_id) else {
                continue;
            };
            let members: Vec<UnitId> = squad
                .members
                .iter()
                .copied()
                .filter(|&id| self.units.contains(id))
                .collect();
            let positions: Vec<Vec3> = members
                .iter()
                .filter_map(|&id| self.units.get(id).map(|unit| unit.position))
                .collect();

            let pushes = resolve_spacing(&positions, &params);
            for (unit_id, push) in members.into_iter().zip(pushes) {
                if let Some(unit) = self.units.get_mut(unit_id) {
                    unit.spacing_offset = push;
                }
            }
        }
    }

    fn update_intents(&mut self, handles: &[SquadId], ctx: &StepContext<'_>) {
        for &squad_id in handles {
            let Some(squad) = self.squads.get(squad_id) else {
                continue;
            };
            let positions: Vec<Vec3> = squad
                .members
                .iter()
                .filter_map(|&id| self.units.get(id).map(|unit| unit.position))
                .collect();
            let report = evaluate_intent(
                squad.archetype.behavior,
                &positions,
                self.config.cohesion_radius,
                ctx.hostiles_near.contains(&squad_id),
                squad.order.kind(),
            );
            if let Some(squad) = self.squads.get_mut(squad_id) {
                squad.intent = report;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squad::intent::TacticalIntent;

    fn legionaries() -> Arc<SquadArchetype> {
        Arc::new(SquadArchetype::builtin("legionaries").unwrap())
    }

    fn world_with_squad() -> (SquadWorld, SquadId) {
        let mut world = SquadWorld::new(SquadConfig::default()).unwrap();
        let id = world.spawn_squad(HeroId::new(1), legionaries(), Vec3::ZERO, Vec3::Z);
        (world, id)
    }

    #[test]
    fn test_spawn_places_units_on_slots() {
        let (world, id) = world_with_squad();
        let units: Vec<_> = world.units_of(id).collect();
        assert_eq!(units.len(), 12);
        assert_eq!(units[0].1.position, Vec3::new(-3.0, 0.0, 0.0));
        assert!(units
            .iter()
            .all(|(_, u)| u.state == UnitFormationState::Formed));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SquadConfig {
            cell_size: 0.0,
            ..SquadConfig::default()
        };
        assert!(SquadWorld::new(config).is_err());
    }

    #[test]
    fn test_individual_speed_in_archetype_range() {
        let (world, id) = world_with_squad();
        for (_, unit) in world.units_of(id) {
            assert!(unit.individual_speed >= 0.9 && unit.individual_speed <= 1.1);
        }
    }

    #[test]
    fn test_same_seed_same_speeds() {
        let (a, id_a) = world_with_squad();
        let (b, id_b) = world_with_squad();
        let speeds_a: Vec<f32> = a.units_of(id_a).map(|(_, u)| u.individual_speed).collect();
        let speeds_b: Vec<f32> = b.units_of(id_b).map(|(_, u)| u.individual_speed).collect();
        assert_eq!(speeds_a, speeds_b);
    }

    #[test]
    fn test_stale_handles() {
        let (mut world, id) = world_with_squad();
        let unit_id = world.units_of(id).next().unwrap().0;
        assert!(world.despawn_squad(id).is_some());
        assert!(world.squad(id).is_none());
        assert!(world.unit(unit_id).is_none());
        assert_eq!(world.units_of(id).count(), 0);
        assert!(matches!(world.begin_retreat(id), Err(SquadError::SquadNotFound(_))));

        let again = world.spawn_squad(HeroId::new(2), legionaries(), Vec3::ZERO, Vec3::Z);
        assert_eq!(again.index, id.index);
        assert!(world.squad(id).is_none());
    }

    #[test]
    fn test_despawn_unit_updates_members() {
        let (mut world, id) = world_with_squad();
        let unit_id = world.units_of(id).nth(3).unwrap().0;
        world.despawn_unit(unit_id);
        assert_eq!(world.squad(id).unwrap().members.len(), 11);
        assert!(!world.squad(id).unwrap().members.contains(&unit_id));
    }

    #[test]
    fn test_missing_hero_skips_squad() {
        let (mut world, id) = world_with_squad();
        world.issue_order(id, SquadOrder::Attack).unwrap();
        world.step(&StepContext::new(0.1));
        assert_eq!(world.squad(id).unwrap().state, SquadState::Idle);
        assert_eq!(world.tick(), 1);
    }

    #[test]
    fn test_request_unknown_formation() {
        let (mut world, id) = world_with_squad();
        assert!(matches!(
            world.request_formation(id, FormationType::Circle),
            Err(SquadError::FormationNotFound(FormationType::Circle))
        ));
    }

    #[test]
    fn test_intent_updates_with_hostiles() {
        let (mut world, id) = world_with_squad();
        world.issue_order(id, SquadOrder::HoldPosition(Vec3::ZERO)).unwrap();
        let ctx = StepContext::new(0.1)
            .with_hero(HeroId::new(1), HeroSnapshot::new(Vec3::ZERO, Vec3::Z))
            .with_hostiles(id);
        world.step(&ctx);
        let report = world.intent(id).unwrap();
        assert_eq!(report.intent, TacticalIntent::Defending);
        assert!(report.is_in_combat);
    }

    #[test]
    fn test_spacing_offsets_targets_but_not_positions() {
        let (mut world, id) = world_with_squad();
        let members: Vec<UnitId> = world.squad(id).unwrap().members.clone();
        let (first, second) = (members[0], members[1]);
        let slot = Vec3::new(-3.0, 0.0, 0.0);
        for unit_id in [first, second] {
            let unit = world.units.get_mut(unit_id).unwrap();
            unit.position = slot;
            unit.state = UnitFormationState::Moving;
        }
        let ctx = StepContext::new(0.1).with_hero(HeroId::new(1), HeroSnapshot::new(Vec3::ZERO, Vec3::Z));

        world.step(&ctx);
        let a = world.unit(first).unwrap();
        assert_eq!(a.target, Some(slot));
        assert_eq!(a.position, slot);
        assert!(a.spacing_offset.x < 0.0);
        assert!(a.spacing_offset.length() <= world.config().max_push + 1e-5);
        let b = world.unit(second).unwrap();
        assert!(b.position.x > slot.x && b.position.x <= -2.0);
        assert!(b.spacing_offset.x > 0.0);

        world.step(&ctx);
        let a = world.unit(first).unwrap();
        let shift = a.target.unwrap() - slot;
        assert!(shift.length() > 0.0);
        assert!(shift.length() <= world.config().max_push + 1e-5);
        assert_eq!(a.position, slot);

        for _ in 0..40 {
            world.step(&ctx);
        }
        let a = world.unit(first).unwrap().position;
        let b = world.unit(second).unwrap().position;
        assert!(a.distance(b) >= world.config().min_separation - 1e-4);
    }

    #[test]
    fn test_events_accumulate_until_drained() {
        let (mut world, id) = world_with_squad();
        let ctx = StepContext::new(0.1).with_hero(HeroId::new(1), HeroSnapshot::new(Vec3::ZERO, Vec3::Z));
        world.issue_order(id, SquadOrder::FollowHero).unwrap();
        world.step(&ctx);
        world.request_formation(id, FormationType::Testudo).unwrap();
        world.step(&ctx);

        let logged = world.events().len();
        assert!(logged >= 3);
        assert_eq!(world.take_events().len(), logged);
        assert!(world.events().is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let (world, _) = world_with_squad();
        let snapshot = world.snapshot();
        assert_eq!(snapshot.squads.len(), 1);
        assert_eq!(snapshot.squads[0].units.len(), 12);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("legionaries"));
    }
}
