//! Session lifecycle states.

use std::fmt;

/// Lifecycle of a [`SessionManager`](super::SessionManager).
///
/// `Uninitialized → Initializing → Ready → Dispatching → Ready | Failed`.
/// `Failed` is entered only when a whole candidate walk is exhausted and
/// is recoverable through `reset`, `reconfigure`, or another send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Dispatching,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initializing => "initializing",
            SessionState::Ready => "ready",
            SessionState::Dispatching => "dispatching",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}
