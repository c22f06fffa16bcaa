use std::cell::Cell;

use serde::Serialize;

/// What the debugger should do at the next qualifying hook event.
///
/// Set by controller commands, consumed by the hook handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PendingAction {
    /// Run until an enabled breakpoint is reached.
    Continue,
    /// Halt at the next qualifying event.
    Pause,
    /// Halt at the next qualifying event, entering calls.
    StepInto,
    /// Halt when back at the depth the step was issued at, or shallower.
    StepOver,
    /// Halt when shallower than the depth the step was issued at.
    StepOut,
}

/// Pending action plus the relative call-depth target that step-over and
/// step-out compare against.
///
/// Depth values are only meaningful relative to each other; the engine's
/// call-depth counter has no absolute interpretation.
#[derive(Debug)]
pub struct StepController {
    action: Cell<PendingAction>,
    target_depth: Cell<i32>,
}

impl StepController {
    pub fn new() -> Self {
        Self {
            action: Cell::new(PendingAction::Continue),
            target_depth: Cell::new(0),
        }
    }

    pub fn action(&self) -> PendingAction {
        self.action.get()
    }

    pub fn target_depth(&self) -> i32 {
        self.target_depth.get()
    }

    /// Breakpoint-only halting; clears any step target.
    pub fn set_continue(&self) {
        self.action.set(PendingAction::Continue);
    }

    pub fn set_pause(&self) {
        self.action.set(PendingAction::Pause);
    }

    pub fn set_step_into(&self) {
        self.action.set(PendingAction::StepInto);
    }

    pub fn set_step_over(&self, current_depth: i32) {
        self.action.set(PendingAction::StepOver);
        self.target_depth.set(current_depth);
    }

    pub fn set_step_out(&self, current_depth: i32) {
        self.action.set(PendingAction::StepOut);
        self.target_depth.set(current_depth - 1);
    }

    /// Per-event halt decision.
    ///
    /// `breakpoint_enabled` is whether an enabled breakpoint exists at the
    /// event's (file, line). Stepping over/out only cares about being back at
    /// the recorded depth or shallower, but an intervening breakpoint still
    /// interrupts it.
    pub fn should_halt(&self, current_depth: i32, breakpoint_enabled: bool) -> bool {
        match self.action.get() {
            PendingAction::Continue => breakpoint_enabled,
            PendingAction::Pause | PendingAction::StepInto => true,
            PendingAction::StepOver | PendingAction::StepOut => {
                current_depth <= self.target_depth.get() || breakpoint_enabled
            }
        }
    }
}

impl Default for StepController {
    fn default() -> Self {
        Self::new()
    }
}
