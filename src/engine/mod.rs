//! The debug-hook state machine.
//!
//! One [`Debugger`] owns a full debug session: the hook subscription, the
//! Disabled/Running/Suspended state, the relative call-depth counter, the
//! breakpoint registry, and the observer channels a controller listens on.
//!
//! Everything is single-threaded and cooperative. Suspension parks the
//! runtime's own thread inside the hook handler in a blocking loop; the only
//! way out is a controller calling one of the resume operations from inside
//! a waiting-for-command notification, which runs on that same thread.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::breakpoints::{Breakpoint, SourceRegistry};
use crate::error::DebugError;
use crate::hook::{FrameInfo, HookBridge, HookEvent, InfoMask};
use crate::stepping::{PendingAction, StepController};

/// Session state. Exactly one instance, owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DebuggerState {
    /// No hook installed; the runtime executes at full speed.
    Disabled,
    /// Hook installed, execution in progress.
    Running,
    /// The runtime's thread is parked inside the hook handler.
    Suspended,
}

/// Why and where execution halted. Delivered once per halt through the
/// stopping channel; the signal that inspection calls are now valid.
#[derive(Debug, Clone, Serialize)]
pub struct StopEvent {
    /// Short source name of the halting frame.
    pub file: String,
    pub line: u32,
    /// The pending action that caused the halt.
    pub action: PendingAction,
    /// Set when an enabled breakpoint was responsible.
    pub breakpoint: Option<Breakpoint>,
}

type TraceObserver = dyn Fn(HookEvent);
type StopObserver<B> = dyn Fn(&Debugger<B>, &StopEvent);
type WaitObserver<B> = dyn Fn(&Debugger<B>);

/// Execution-control layer over one embedded runtime.
pub struct Debugger<B: HookBridge + 'static> {
    pub(crate) bridge: B,
    state: Cell<DebuggerState>,
    stepper: StepController,
    /// Relative call depth; adjusted on call/return events, compared against
    /// the step target, never meaningful as an absolute stack size.
    depth: Cell<i32>,
    /// True for the entire duration of one hook invocation, including the
    /// whole suspension. Nested events raised while set are dropped.
    in_hook: Cell<bool>,
    full_trace: Cell<bool>,
    files: RefCell<SourceRegistry>,
    trace_observers: RefCell<Vec<Rc<TraceObserver>>>,
    stop_observers: RefCell<Vec<Rc<StopObserver<B>>>>,
    wait_observers: RefCell<Vec<Rc<WaitObserver<B>>>>,
}

impl<B: HookBridge + 'static> Debugger<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            state: Cell::new(DebuggerState::Disabled),
            stepper: StepController::new(),
            depth: Cell::new(0),
            in_hook: Cell::new(false),
            full_trace: Cell::new(false),
            files: RefCell::new(SourceRegistry::new()),
            trace_observers: RefCell::new(Vec::new()),
            stop_observers: RefCell::new(Vec::new()),
            wait_observers: RefCell::new(Vec::new()),
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn state(&self) -> DebuggerState {
        self.state.get()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.get() != DebuggerState::Disabled
    }

    pub fn pending_action(&self) -> PendingAction {
        self.stepper.action()
    }

    /// Relative call-depth counter. Only meaningful while enabled, and only
    /// for comparisons.
    pub fn call_depth(&self) -> i32 {
        self.depth.get()
    }

    /// Installs the hook and starts the session. No-op while already
    /// running; while suspended this is an implicit [`resume`](Self::resume).
    pub fn enable(&self) {
        match self.state.get() {
            DebuggerState::Disabled => {
                self.bridge.attach();
                self.depth.set(0);
                self.stepper.set_continue();
                self.state.set(DebuggerState::Running);
                debug!("debugger enabled");
            }
            DebuggerState::Suspended => self.resume(),
            DebuggerState::Running => {}
        }
    }

    /// Removes the hook and ends the session. If currently suspended, forces
    /// a resume first so the runtime's thread is never left parked with no
    /// hook holding it. No-op when already disabled.
    pub fn disable(&self) {
        if self.state.get() == DebuggerState::Disabled {
            return;
        }
        self.depth.set(0);
        if self.state.get() == DebuggerState::Suspended {
            self.resume();
        }
        self.bridge.detach();
        self.state.set(DebuggerState::Disabled);
        debug!("debugger disabled");
    }

    pub fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.enable();
        } else {
            self.disable();
        }
    }

    /// Explicit state assignment. Disabled and Running route through
    /// [`disable`](Self::disable)/[`enable`](Self::enable); Suspended is only
    /// ever entered internally by the hook handler and is rejected.
    pub fn set_state(&self, state: DebuggerState) -> Result<(), DebugError> {
        match state {
            DebuggerState::Disabled => {
                self.disable();
                Ok(())
            }
            DebuggerState::Running => {
                self.enable();
                Ok(())
            }
            DebuggerState::Suspended => Err(DebugError::ExplicitSuspend),
        }
    }

    /// Continues execution until the next enabled breakpoint. No-op unless
    /// suspended.
    pub fn resume(&self) {
        if self.state.get() == DebuggerState::Suspended {
            self.stepper.set_continue();
            self.state.set(DebuggerState::Running);
        }
    }

    /// Requests a halt at the next qualifying event. Valid any time while
    /// enabled; takes effect lazily and never blocks the caller.
    pub fn pause(&self) {
        if self.is_enabled() {
            self.stepper.set_pause();
        }
    }

    /// No-op unless suspended.
    pub fn step_into(&self) {
        if self.state.get() == DebuggerState::Suspended {
            self.stepper.set_step_into();
            self.state.set(DebuggerState::Running);
        }
    }

    /// No-op unless suspended.
    pub fn step_over(&self) {
        if self.state.get() == DebuggerState::Suspended {
            self.stepper.set_step_over(self.depth.get());
            self.state.set(DebuggerState::Running);
        }
    }

    /// No-op unless suspended.
    pub fn step_out(&self) {
        if self.state.get() == DebuggerState::Suspended {
            self.stepper.set_step_out(self.depth.get());
            self.state.set(DebuggerState::Running);
        }
    }

    // --- breakpoints ---------------------------------------------------
    //
    // The registry lives behind a RefCell; the conveniences below hand out
    // snapshots so a controller can never hold a borrow across a hook
    // invocation.

    /// Adds (or re-enables) a breakpoint, creating the file entry on first
    /// use. Returns a snapshot of the breakpoint.
    pub fn add_breakpoint(&self, file: &str, line: u32) -> Breakpoint {
        *self.files.borrow_mut().add_breakpoint(file, line)
    }

    /// No-op when the file or breakpoint does not exist.
    pub fn remove_breakpoint(&self, file: &str, line: u32) {
        self.files.borrow_mut().remove_breakpoint(file, line);
    }

    /// Creates the breakpoint if absent (returning a snapshot), removes it if
    /// present (returning `None`).
    pub fn toggle_breakpoint(&self, file: &str, line: u32) -> Option<Breakpoint> {
        self.files
            .borrow_mut()
            .get_or_create(file)
            .toggle(line)
            .copied()
    }

    pub fn breakpoint_at(&self, file: &str, line: u32) -> Option<Breakpoint> {
        self.files.borrow().breakpoint_at(file, line).copied()
    }

    /// Enables or disables a breakpoint in place without removing it.
    /// Returns false when there is no such breakpoint.
    pub fn set_breakpoint_enabled(&self, file: &str, line: u32, enabled: bool) -> bool {
        let mut files = self.files.borrow_mut();
        match files.find_mut(file).and_then(|f| f.get_mut(line)) {
            Some(breakpoint) => {
                breakpoint.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Snapshot of all breakpoints in one file, in insertion order.
    pub fn breakpoints(&self, file: &str) -> Vec<Breakpoint> {
        self.files
            .borrow()
            .find(file)
            .map(|f| f.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Names of all tracked source files.
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .borrow()
            .files()
            .map(|f| f.name().to_string())
            .collect()
    }

    /// Read access to the registry without copying.
    pub fn with_files<R>(&self, f: impl FnOnce(&SourceRegistry) -> R) -> R {
        f(&self.files.borrow())
    }

    // --- observers -----------------------------------------------------

    /// Fires on every raw hook event when full trace is on, regardless of
    /// engine state. Diagnostics only.
    pub fn on_trace(&self, observer: impl Fn(HookEvent) + 'static) {
        self.trace_observers.borrow_mut().push(Rc::new(observer));
    }

    /// Fires once per halt, before the waiting loop starts. From this point
    /// until resume, inspection calls are valid.
    pub fn on_stop(&self, observer: impl Fn(&Debugger<B>, &StopEvent) + 'static) {
        self.stop_observers.borrow_mut().push(Rc::new(observer));
    }

    /// Fires repeatedly while suspended; the controller's only opportunity
    /// to issue commands.
    pub fn on_wait(&self, observer: impl Fn(&Debugger<B>) + 'static) {
        self.wait_observers.borrow_mut().push(Rc::new(observer));
    }

    pub fn set_full_trace(&self, on: bool) {
        self.full_trace.set(on);
    }

    pub fn full_trace(&self) -> bool {
        self.full_trace.get()
    }

    // --- hook handler --------------------------------------------------

    /// Entry point for the runtime's hook callback. The embedder forwards
    /// every hook event here, passing the runtime's activation handle.
    ///
    /// Inspection calls made while suspended may cause the runtime to emit
    /// nested hook events on this same thread; the guard drops them rather
    /// than queueing.
    pub fn debug_hook(&self, event: HookEvent, frame: &mut B::Frame) {
        if self.in_hook.get() {
            trace!(?event, "nested hook event dropped");
            return;
        }
        self.in_hook.set(true);
        let _hook_guard = ClearOnDrop(&self.in_hook);

        if self.full_trace.get() {
            for observer in snapshot(&self.trace_observers) {
                observer(event);
            }
        }

        if self.state.get() == DebuggerState::Disabled {
            return;
        }

        match event {
            HookEvent::Call => self.depth.set(self.depth.get() + 1),
            HookEvent::Return | HookEvent::TailReturn => self.depth.set(self.depth.get() - 1),
            HookEvent::Line => {}
        }

        // Only call and line events can trigger a halt.
        if !matches!(event, HookEvent::Call | HookEvent::Line) {
            return;
        }

        let Some(info) = self.bridge.info(frame, InfoMask::all()) else {
            return;
        };
        // Chunks with no backing file cannot hold breakpoints and are never
        // a place to stop.
        if !info.has_source_file() {
            return;
        }

        let line = match event {
            HookEvent::Call => info.line_defined,
            _ => match info.current_line {
                Some(line) => line,
                None => return,
            },
        };

        trace!(?event, file = %info.short_src, line, depth = self.depth.get(), "hook event");

        let breakpoint = self
            .files
            .borrow()
            .breakpoint_at(&info.short_src, line)
            .copied();
        let at_enabled_breakpoint = breakpoint.is_some_and(|b| b.enabled);

        if self.stepper.should_halt(self.depth.get(), at_enabled_breakpoint) {
            let breakpoint = breakpoint.filter(|b| b.enabled);
            self.suspend(&info, line, breakpoint);
        }
    }

    /// Parks the runtime's thread until a controller resumes.
    ///
    /// Whatever happens inside the observers, the state is forced out of
    /// Suspended before control returns to the runtime; a disable issued
    /// from inside an observer survives (the restore only applies if the
    /// state is still Suspended on exit).
    fn suspend(&self, info: &FrameInfo, line: u32, breakpoint: Option<Breakpoint>) {
        let stop = StopEvent {
            file: info.short_src.clone(),
            line,
            action: self.stepper.action(),
            breakpoint,
        };
        debug!(file = %stop.file, line, action = ?stop.action, "execution suspended");

        self.state.set(DebuggerState::Suspended);
        let _state_guard = RunOnDrop(&self.state);

        for observer in snapshot(&self.stop_observers) {
            observer(self, &stop);
        }

        while self.state.get() == DebuggerState::Suspended {
            let waiters = snapshot(&self.wait_observers);
            if waiters.is_empty() {
                // Nothing can ever flip the state; bail out instead of
                // spinning forever on the runtime's thread.
                warn!("suspended with no waiting-for-command observer; resuming");
                self.state.set(DebuggerState::Running);
                break;
            }
            for observer in waiters {
                observer(self);
                if self.state.get() != DebuggerState::Suspended {
                    break;
                }
            }
        }
    }
}

/// Clears the reentrancy flag on every exit path, panics included.
struct ClearOnDrop<'a>(&'a Cell<bool>);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Forces the state out of Suspended on every exit path. Leaves a state
/// already moved on (Running or Disabled) alone.
struct RunOnDrop<'a>(&'a Cell<DebuggerState>);

impl Drop for RunOnDrop<'_> {
    fn drop(&mut self) {
        if self.0.get() == DebuggerState::Suspended {
            self.0.set(DebuggerState::Running);
        }
    }
}

/// Observer lists are cloned before iteration so a notification can register
/// further observers (or drive the engine) without a borrow conflict.
fn snapshot<T: ?Sized>(list: &RefCell<Vec<Rc<T>>>) -> Vec<Rc<T>> {
    list.borrow().iter().cloned().collect()
}
