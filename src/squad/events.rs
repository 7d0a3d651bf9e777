//! Events raised while stepping squads

use serde::{Deserialize, Serialize};

use crate::core::types::{SquadId, Tick, UnitId};
use crate::squad::formation::FormationType;
use crate::squad::units::{SquadOrder, SquadState, UnitFormationState};

/// Something noteworthy that happened during a step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadEvent {
    pub tick: Tick,
    pub event_type: SquadEventType,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SquadEventType {
    SquadSpawned { squad: SquadId },
    SquadDespawned { squad: SquadId },
    OrderApplied { squad: SquadId, order: SquadOrder },
    StateChanged { squad: SquadId, from: SquadState, to: SquadState },
    FormationChanged { squad: SquadId, from: FormationType, to: FormationType },
    FormationChangeRejected { squad: SquadId },
    UnitStateChanged {
        unit: UnitId,
        from: UnitFormationState,
        to: UnitFormationState,
    },
}

/// Events accumulated since the last drain
#[derive(Debug, Clone, Default)]
pub struct SquadEventLog {
    pub events: Vec<SquadEvent>,
}

impl SquadEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event_type: SquadEventType, description: String, tick: Tick) {
        self.events.push(SquadEvent {
            tick,
            event_type,
            description,
        });
    }

    /// Take every buffered event, leaving the log empty
    pub fn drain(&mut self) -> Vec<SquadEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SquadEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
