//! Stack and variable introspection, valid only while suspended.
//!
//! Slot indices handed out here are transient: they stay valid through the
//! end of the current suspension and must not be cached across a
//! resume/suspend cycle.

use serde::Serialize;

use crate::engine::{Debugger, DebuggerState};
use crate::hook::{FrameInfo, HookBridge, InfoMask, Value};

/// Snapshot of one call-stack frame, taken at the suspended instant.
pub struct StackFrame<F> {
    /// Frame level; 0 is the innermost frame.
    pub level: u32,
    /// Resolved name/source/line information.
    pub info: FrameInfo,
    pub(crate) handle: F,
}

impl<F> StackFrame<F> {
    /// The runtime's activation handle backing this frame.
    pub fn handle(&self) -> &F {
        &self.handle
    }
}

/// A local variable or upvalue, copied out of the runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    /// Transient slot index, valid only for the current suspension.
    pub slot: u32,
    pub name: String,
    pub value: Value,
}

impl<B: HookBridge + 'static> Debugger<B> {
    /// The current call stack, innermost frame first. Empty unless
    /// suspended.
    pub fn call_stack(&self) -> Vec<StackFrame<B::Frame>> {
        let mut frames = Vec::new();
        if self.state() != DebuggerState::Suspended {
            return frames;
        }
        let mut level = 0;
        while let Some(mut handle) = self.bridge.stack(level) {
            let Some(info) = self.bridge.info(&mut handle, InfoMask::all()) else {
                break;
            };
            frames.push(StackFrame {
                level,
                info,
                handle,
            });
            level += 1;
        }
        frames
    }

    /// All locals of a frame, probing slots from 1 until the runtime reports
    /// no more. Empty unless suspended.
    pub fn locals(&self, frame: &StackFrame<B::Frame>) -> Vec<Variable> {
        let mut vars = Vec::new();
        if self.state() != DebuggerState::Suspended {
            return vars;
        }
        let mut slot = 1;
        while let Some(name) = self.bridge.local_name(&frame.handle, slot) {
            vars.push(Variable {
                slot,
                name,
                value: self.bridge.pop(),
            });
            slot += 1;
        }
        vars
    }

    /// All upvalues of the function at `func_index`. Empty unless suspended.
    pub fn upvalues(&self, func_index: u32) -> Vec<Variable> {
        let mut vars = Vec::new();
        if self.state() != DebuggerState::Suspended {
            return vars;
        }
        let mut slot = 1;
        while let Some(name) = self.bridge.upvalue_name(func_index, slot) {
            vars.push(Variable {
                slot,
                name,
                value: self.bridge.pop(),
            });
            slot += 1;
        }
        vars
    }

    /// Writes a new value into a local's slot. The new value's type need not
    /// match the old one. No-op unless suspended.
    pub fn set_local(&self, frame: &StackFrame<B::Frame>, var: &Variable, value: Value) {
        if self.state() != DebuggerState::Suspended {
            return;
        }
        self.bridge.push(value);
        self.bridge.bind_local(&frame.handle, var.slot);
    }

    /// Writes a new value into an upvalue's slot. No-op unless suspended.
    pub fn set_upvalue(&self, func_index: u32, var: &Variable, value: Value) {
        if self.state() != DebuggerState::Suspended {
            return;
        }
        self.bridge.push(value);
        self.bridge.bind_upvalue(func_index, var.slot);
    }

    /// Re-enumerates the frame's locals and writes to the first
    /// case-insensitive name match. Returns false when no local matches;
    /// how to report that is the caller's decision.
    pub fn set_local_by_name(
        &self,
        frame: &StackFrame<B::Frame>,
        name: &str,
        value: Value,
    ) -> bool {
        let found = self
            .locals(frame)
            .into_iter()
            .find(|v| v.name.eq_ignore_ascii_case(name));
        match found {
            Some(var) => {
                self.set_local(frame, &var, value);
                true
            }
            None => false,
        }
    }

    /// Upvalue counterpart of [`set_local_by_name`](Self::set_local_by_name).
    pub fn set_upvalue_by_name(&self, func_index: u32, name: &str, value: Value) -> bool {
        let found = self
            .upvalues(func_index)
            .into_iter()
            .find(|v| v.name.eq_ignore_ascii_case(name));
        match found {
            Some(var) => {
                self.set_upvalue(func_index, &var, value);
                true
            }
            None => false,
        }
    }
}
