//! Interactive execution control for an embedded scripting runtime.
//!
//! The runtime drives everything: it invokes [`Debugger::debug_hook`] at
//! every call, return, tail-return, and line boundary. The engine decides
//! per event whether to halt — enabled breakpoint reached, pause requested,
//! or a step target satisfied — and on a halt parks the runtime's thread in
//! a blocking loop until the controller, called back synchronously on that
//! same thread, issues a resume or step command. While parked, the
//! controller may walk the call stack and read or write locals and upvalues
//! through the [`HookBridge`].
//!
//! ```no_run
//! # use script_debugger::{Debugger, HookBridge};
//! # fn demo<B: HookBridge + 'static>(bridge: B) {
//! let debugger = Debugger::new(bridge);
//! debugger.add_breakpoint("main.lua", 10);
//! debugger.on_stop(|_dbg, stop| println!("halted at {}:{}", stop.file, stop.line));
//! debugger.on_wait(|dbg| {
//!     for frame in dbg.call_stack() {
//!         println!("#{} {:?}", frame.level, frame.info.name);
//!     }
//!     dbg.resume();
//! });
//! debugger.enable();
//! # }
//! ```

mod breakpoints;
mod engine;
mod error;
mod hook;
mod inspect;
mod stepping;

pub use breakpoints::{Breakpoint, SourceFile, SourceRegistry};
pub use engine::{Debugger, DebuggerState, StopEvent};
pub use error::DebugError;
pub use hook::{FrameInfo, HookBridge, HookEvent, InfoMask, Value};
pub use inspect::{StackFrame, Variable};
pub use stepping::{PendingAction, StepController};
