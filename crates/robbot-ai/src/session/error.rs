use robbot_common::ConfigError;

use crate::fallback::AttemptLog;
use crate::BackendError;

use super::types::SessionState;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("no usable model: {0}")]
    ModelUnavailable(AttemptLog),

    #[error("failed to get a response from any model: {0}")]
    Dispatch(AttemptLog),

    #[error("message is empty")]
    EmptyMessage,

    #[error("session is not ready (state: {0})")]
    NotReady(SessionState),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::Attempt;

    #[test]
    fn dispatch_error_lists_every_cause() {
        let mut log = AttemptLog::default();
        log.push(Attempt {
            model: "a".into(),
            cause: BackendError::RateLimited,
        });
        log.push(Attempt {
            model: "b".into(),
            cause: BackendError::EmptyResponse,
        });
        let msg = SessionError::Dispatch(log).to_string();
        assert!(msg.contains("a: Rate limited"));
        assert!(msg.contains("b: empty response"));
    }

    #[test]
    fn model_unavailable_without_attempts() {
        let msg = SessionError::ModelUnavailable(AttemptLog::default()).to_string();
        assert!(msg.contains("no candidate models were tried"));
    }

    #[test]
    fn not_ready_names_state() {
        let msg = SessionError::NotReady(SessionState::Uninitialized).to_string();
        assert_eq!(msg, "session is not ready (state: uninitialized)");
    }
}
