//! Squad state machine
//!
//! Consumes the pending order and formation request written by the order
//! interpreter. Slot reassignment is not done here: a successful formation
//! change is returned to the caller, which applies it once the pass over all
//! squads has finished.

use crate::core::types::{SquadId, Tick};
use crate::squad::events::{SquadEventLog, SquadEventType};
use crate::squad::formation::FormationType;
use crate::squad::orders::FormationRequest;
use crate::squad::units::{HoldAnchor, Squad, SquadOrder, SquadState};

/// Outcome of a formation request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormationChangeResult {
    Applied { from: FormationType, to: FormationType },
    AlreadyActive,
    CoolingDown { remaining: f32 },
    NotInLibrary(FormationType),
}

/// Advance one squad by one step
///
/// Returns the new formation when a change was applied.
pub fn advance_squad_state(
    squad_id: SquadId,
    squad: &mut Squad,
    hero_knocked_out: bool,
    cooldown_reset: f32,
    dt: f32,
    tick: Tick,
    events: &mut SquadEventLog,
) -> Option<FormationType> {
    squad.formation_cooldown = (squad.formation_cooldown - dt).max(0.0);

    if hero_knocked_out {
        if squad.state != SquadState::KO {
            set_state(squad_id, squad, SquadState::KO, tick, events);
            squad.hold_anchor = None;
        }
        squad.pending.clear();
        return None;
    }

    if squad.state == SquadState::KO {
        set_state(squad_id, squad, SquadState::Idle, tick, events);
    }

    if let Some(order) = squad.pending.take_order() {
        apply_order(squad_id, squad, order, tick, events);
    }

    let request = squad.pending.take_formation()?;
    match request_formation_change(squad, request, cooldown_reset) {
        FormationChangeResult::Applied { from, to } => {
            tracing::debug!("Squad {:?} formation {:?} -> {:?}", squad_id, from, to);
            events.push(
                SquadEventType::FormationChanged {
                    squad: squad_id,
                    from,
                    to,
                },
                format!("Formation changed to {}", to.name()),
                tick,
            );
            Some(to)
        }
        FormationChangeResult::CoolingDown { remaining } => {
            events.push(
                SquadEventType::FormationChangeRejected { squad: squad_id },
                format!("Formation change on cooldown ({:.2}s left)", remaining),
                tick,
            );
            None
        }
        FormationChangeResult::NotInLibrary(kind) => {
            tracing::debug!(
                "Squad {:?} requested {:?}, not in archetype '{}'",
                squad_id,
                kind,
                squad.archetype.name
            );
            None
        }
        FormationChangeResult::AlreadyActive => None,
    }
}

/// Apply an order to the squad's state and anchor
pub fn apply_order(
    squad_id: SquadId,
    squad: &mut Squad,
    order: SquadOrder,
    tick: Tick,
    events: &mut SquadEventLog,
) {
    squad.order = order;

    let next = match order {
        SquadOrder::FollowHero => {
            squad.hold_anchor = None;
            SquadState::FollowingHero
        }
        SquadOrder::HoldPosition(point) => {
            // An existing anchor stays put while already holding
            if squad.state != SquadState::HoldingPosition || squad.hold_anchor.is_none() {
                squad.hold_anchor = Some(HoldAnchor {
                    point,
                    formation: squad.formation,
                });
            }
            SquadState::HoldingPosition
        }
        SquadOrder::Attack => {
            squad.hold_anchor = None;
            SquadState::InCombat
        }
    };

    events.push(
        SquadEventType::OrderApplied {
            squad: squad_id,
            order,
        },
        format!("{:?}", order),
        tick,
    );
    set_state(squad_id, squad, next, tick, events);
}

/// Resolve and gate a formation request
///
/// On success the cooldown restarts and a holding squad's anchor follows
/// the new formation while keeping its point.
pub fn request_formation_change(
    squad: &mut Squad,
    request: FormationRequest,
    cooldown_reset: f32,
) -> FormationChangeResult {
    let library = &squad.archetype.formations;
    let requested = match request {
        FormationRequest::Select(kind) => kind,
        FormationRequest::CycleNext => library.next_after(squad.formation),
    };

    if requested == squad.formation {
        return FormationChangeResult::AlreadyActive;
    }
    if !library.contains(requested) {
        return FormationChangeResult::NotInLibrary(requested);
    }
    if squad.formation_cooldown > 0.0 {
        return FormationChangeResult::CoolingDown {
            remaining: squad.formation_cooldown,
        };
    }

    let from = squad.formation;
    squad.formation = requested;
    squad.formation_cooldown = cooldown_reset;
    if let Some(anchor) = squad.hold_anchor.as_mut() {
        anchor.formation = requested;
    }

    FormationChangeResult::Applied {
        from,
        to: requested,
    }
}

/// Enter `Retreating` on behalf of a combat/AI collaborator
pub fn begin_retreat(squad_id: SquadId, squad: &mut Squad, tick: Tick, events: &mut SquadEventLog) {
    if squad.state == SquadState::KO {
        return;
    }
    squad.hold_anchor = None;
    set_state(squad_id, squad, SquadState::Retreating, tick, events);
}

fn set_state(
    squad_id: SquadId,
    squad: &mut Squad,
    next: SquadState,
    tick: Tick,
    events: &mut SquadEventLog,
) {
    if squad.state == next {
        return;
    }
    let from = squad.state;
    squad.state = next;
    tracing::debug!("Squad {:?} state {:?} -> {:?}", squad_id, from, next);
    events.push(
        SquadEventType::StateChanged {
            squad: squad_id,
            from,
            to: next,
        },
        format!("{:?} -> {:?}", from, next),
        tick,
    );
}
