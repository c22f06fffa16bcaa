//! The contract between the debugger and the embedded runtime.
//!
//! The runtime delivers hook events by calling [`Debugger::debug_hook`] from
//! its own hook callback; everything else here is what the debugger asks of
//! the runtime in return: frame resolution, local/upvalue enumeration, and
//! by-copy value transfer over the runtime's evaluation stack.
//!
//! [`Debugger::debug_hook`]: crate::Debugger::debug_hook

use serde::Serialize;

/// Values crossing the bridge are transferred by copy, never as live
/// references into the runtime. The write-back type need not match the type
/// a slot previously held.
pub use serde_json::Value;

/// Execution points at which the runtime invokes the debug hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HookEvent {
    /// A function activation is being entered.
    Call,
    /// A function activation is returning.
    Return,
    /// A tail call is returning; there is no separate `Call` to pair with.
    TailReturn,
    /// Execution reached a new source line.
    Line,
}

/// Selects which [`FrameInfo`] fields a bridge must resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfoMask {
    pub name: bool,
    pub source: bool,
    pub current_line: bool,
}

impl InfoMask {
    pub const fn all() -> Self {
        Self {
            name: true,
            source: true,
            current_line: true,
        }
    }
}

/// Resolved information about one activation.
///
/// Fields are only trustworthy after a [`HookBridge::info`] call with the
/// matching mask bits set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameInfo {
    /// Best-effort function name; `None` for anonymous functions.
    pub name: Option<String>,
    /// How the name was derived ("global", "local", "method", ...).
    pub name_what: String,
    /// Raw chunk source. File-backed chunks start with `@`; anything else
    /// (ad-hoc strings, native frames) has no file and cannot hold
    /// breakpoints.
    pub source: String,
    /// Shortened, printable source name; the key breakpoints are filed under.
    pub short_src: String,
    pub line_defined: u32,
    pub last_line_defined: u32,
    /// Line being executed, when the frame is at a line boundary.
    pub current_line: Option<u32>,
}

impl FrameInfo {
    /// Whether the frame's chunk came from a file and is therefore eligible
    /// for breakpoints.
    pub fn has_source_file(&self) -> bool {
        self.source.starts_with('@')
    }
}

/// What the debugger consumes from the embedded runtime.
///
/// Implementations wrap the runtime's debug API. All methods take `&self`:
/// the bridge is expected to carry its own interior mutability, the same way
/// a runtime handle would. Everything runs on the runtime's single thread.
///
/// Enumeration methods mirror the runtime's stack discipline: a successful
/// `local_name`/`upvalue_name` pushes the slot's value onto the evaluation
/// stack (retrieve it with [`pop`]), and `bind_local`/`bind_upvalue` pop the
/// topmost value into the slot (provide it with [`push`]).
///
/// [`pop`]: HookBridge::pop
/// [`push`]: HookBridge::push
pub trait HookBridge {
    /// Runtime-owned activation handle, delivered with each hook event and
    /// refined in place by [`info`](HookBridge::info).
    type Frame;

    /// Start delivering hook events for every call, return, and line.
    fn attach(&self);
    /// Stop delivering hook events.
    fn detach(&self);

    /// Resolve the fields selected by `mask` on an activation handle.
    /// Returns `None` if the handle is no longer valid.
    fn info(&self, frame: &mut Self::Frame, mask: InfoMask) -> Option<FrameInfo>;

    /// Activation handle for the frame at `level` (0 = innermost), or `None`
    /// past the outermost frame.
    fn stack(&self, level: u32) -> Option<Self::Frame>;

    /// Name of the local at `slot` (1-based), pushing its value; `None` once
    /// the slots are exhausted.
    fn local_name(&self, frame: &Self::Frame, slot: u32) -> Option<String>;
    /// Pop the top of the evaluation stack into the local at `slot`.
    fn bind_local(&self, frame: &Self::Frame, slot: u32);

    /// Name of the upvalue at `slot` of the function at `func_index`,
    /// pushing its value; `None` once exhausted.
    fn upvalue_name(&self, func_index: u32, slot: u32) -> Option<String>;
    /// Pop the top of the evaluation stack into the upvalue at `slot`.
    fn bind_upvalue(&self, func_index: u32, slot: u32);

    /// Push a copied value onto the runtime's evaluation stack.
    fn push(&self, value: Value);
    /// Pop the top value off the runtime's evaluation stack.
    fn pop(&self) -> Value;
}
