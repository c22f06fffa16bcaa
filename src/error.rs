use thiserror::Error;

/// State-machine misuse surfaced to the caller.
///
/// No-op conditions (resuming while already running, removing an absent
/// breakpoint, disabling twice) are deliberately not represented here; they
/// are harmless and return normally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DebugError {
    /// The suspended state is only ever entered by the hook handler itself;
    /// assigning it from outside is a programming error.
    #[error("suspended state cannot be assigned directly; it is entered only from the debug hook")]
    ExplicitSuspend,
}
