//! Conversation session management.
//!
//! A [`SessionManager`] picks a working model, binds a [`ChatSession`] to
//! it, and dispatches messages with fallback to stateless generation.

mod chat;
mod error;
mod manager;
mod types;


pub use chat::ChatSession;
pub use error::SessionError;
pub use manager::{SessionManager, PROBE_PROMPT};
pub use types::SessionState;
