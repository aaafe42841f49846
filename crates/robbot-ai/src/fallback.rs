//! Sequential walk over an ordered list of candidate models.
//!
//! Each candidate is tried once, in order, and yields an
//! [`AttemptOutcome`]. The walk stops at the first answer; if none
//! answers, every failure is returned in an [`AttemptLog`].

use std::fmt;

use tracing::{debug, warn};

use crate::{BackendError, GenerationRequest, ModelBackend};

/// A non-empty reply and the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub model: String,
    pub text: String,
}

/// One failed candidate.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub model: String,
    pub cause: BackendError,
}

/// Result of trying a single candidate.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Answered(Answer),
    Failed(Attempt),
}

/// Every failure collected while walking the candidate list.
#[derive(Debug, Clone, Default)]
pub struct AttemptLog {
    attempts: Vec<Attempt>,
}

impl AttemptLog {
    pub fn push(&mut self, attempt: Attempt) {
        self.attempts.push(attempt);
    }

    pub fn extend(&mut self, other: AttemptLog) {
        self.attempts.extend(other.attempts);
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// The most recent failure.
    pub fn last(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Models that were tried, in order.
    pub fn models(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.model.as_str()).collect()
    }
}

impl fmt::Display for AttemptLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return f.write_str("no candidate models were tried");
        }
        for (i, attempt) in self.attempts.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", attempt.model, attempt.cause)?;
        }
        Ok(())
    }
}

/// Try one candidate. An empty reply counts as a failure.
pub async fn attempt(
    backend: &dyn ModelBackend,
    model: &str,
    request: &GenerationRequest,
) -> AttemptOutcome {
    let result = match backend.generate(model, request).await {
        Ok(text) if text.trim().is_empty() => Err(BackendError::EmptyResponse),
        other => other,
    };

    match result {
        Ok(text) => AttemptOutcome::Answered(Answer {
            model: model.to_string(),
            text,
        }),
        Err(cause) => AttemptOutcome::Failed(Attempt {
            model: model.to_string(),
            cause,
        }),
    }
}

/// Walk `candidates` in order and return the first answer.
pub async fn first_answer(
    backend: &dyn ModelBackend,
    candidates: &[String],
    request: &GenerationRequest,
) -> Result<Answer, AttemptLog> {
    let mut log = AttemptLog::default();

    for model in candidates {
        match attempt(backend, model, request).await {
            AttemptOutcome::Answered(answer) => {
                debug!(model = %answer.model, "candidate answered");
                return Ok(answer);
            }
            AttemptOutcome::Failed(failure) => {
                warn!(model = %failure.model, error = %failure.cause, "candidate model failed");
                log.push(failure);
            }
        }
    }

    Err(log)
}
