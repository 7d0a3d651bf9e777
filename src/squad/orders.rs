//! Order interpretation
//!
//! Turns one step's captured input into at most one pending order and one
//! pending formation request per squad. The hold control doubles as a
//! gesture: a second activation inside the double-activation window cycles
//! the formation instead of holding position.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::squad::formation::FormationType;
use crate::squad::units::SquadOrder;

/// A control activated by the player this step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputAction {
    FollowHero,
    /// Single activation holds, double activation cycles formation
    HoldOrCycle,
    Attack,
    SelectFormation(FormationType),
}

/// Input captured for one squad controller during one step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Where a hold order issued now would anchor
    pub target_point: Option<Vec3>,
    pub actions: Vec<InputAction>,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, action: InputAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target_point = Some(target);
        self
    }
}

/// Requested formation change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationRequest {
    Select(FormationType),
    CycleNext,
}

/// Orders waiting for the squad state machine (last write wins)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PendingOrders {
    pub order: Option<SquadOrder>,
    pub formation: Option<FormationRequest>,
    /// Set when `order` is written, cleared by the state machine
    pub has_new_order: bool,
}

impl PendingOrders {
    pub fn issue(&mut self, order: SquadOrder) {
        self.order = Some(order);
        self.has_new_order = true;
    }

    pub fn request_formation(&mut self, request: FormationRequest) {
        self.formation = Some(request);
    }

    /// Consume the pending order, if one was issued
    pub fn take_order(&mut self) -> Option<SquadOrder> {
        if !self.has_new_order {
            return None;
        }
        self.has_new_order = false;
        self.order.take()
    }

    pub fn take_formation(&mut self) -> Option<FormationRequest> {
        self.formation.take()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Per-squad controller state: one stored activation timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderInterpreter {
    last_activation: Option<f32>,
}

impl OrderInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Is a lone hold activation waiting for its window to close?
    pub fn awaiting_second_activation(&self) -> bool {
        self.last_activation.is_some()
    }

    /// Interpret one step of input
    ///
    /// `now` is the simulation time of the step. `fallback_target` anchors a
    /// hold order when the frame carries no target point (usually the hero
    /// position). A lone activation is only turned into a hold once the
    /// window has passed without a second one, and it anchors at the target
    /// of the step where the window closes, not the step of the press. Any
    /// other action before then cancels the waiting activation.
    pub fn interpret(
        &mut self,
        now: f32,
        frame: Option<&InputFrame>,
        fallback_target: Vec3,
        window: f32,
        pending: &mut PendingOrders,
    ) {
        let target = frame
            .and_then(|f| f.target_point)
            .unwrap_or(fallback_target);

        // Window closed without a second activation: it was a hold
        if let Some(at) = self.last_activation {
            if now - at > window {
                self.last_activation = None;
                tracing::trace!("Hold activation at {:.2} resolved as hold position", at);
                pending.issue(SquadOrder::HoldPosition(target));
            }
        }

        let Some(frame) = frame else {
            return;
        };

        for action in &frame.actions {
            match action {
                InputAction::FollowHero => {
                    self.last_activation = None;
                    pending.issue(SquadOrder::FollowHero);
                }
                InputAction::Attack => {
                    self.last_activation = None;
                    pending.issue(SquadOrder::Attack);
                }
                InputAction::SelectFormation(kind) => {
                    self.last_activation = None;
                    pending.request_formation(FormationRequest::Select(*kind));
                }
                InputAction::HoldOrCycle => match self.last_activation.take() {
                    Some(at) if now - at <= window => {
                        tracing::trace!("Double activation ({:.2} -> {:.2}): cycle", at, now);
                        pending.request_formation(FormationRequest::CycleNext);
                    }
                    _ => self.last_activation = Some(now),
                },
            }
        }
    }
}
