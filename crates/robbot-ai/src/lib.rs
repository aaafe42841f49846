//! Model session core for Robbot.
//!
//! Provides Gemini and OpenAI clients behind a common [`ModelBackend`]
//! trait, plus:
//! - Model selection by probing an ordered candidate list
//! - A session manager that falls back to stateless generation when the
//!   bound session fails
//! - Streaming (SSE) support
//! - Word-count usage estimation

pub mod connector;
pub mod fallback;
pub mod gemini;
mod http;
pub mod openai;
pub mod session;
pub mod streaming;
pub mod usage;

use async_trait::async_trait;
use robbot_common::Message;
use robbot_config::SamplingParams;

pub use connector::{BackendConnector, HttpConnector};
pub use fallback::{Answer, Attempt, AttemptLog, AttemptOutcome};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use session::{ChatSession, SessionError, SessionManager, SessionState, PROBE_PROMPT};
pub use usage::{estimate_usage, UsageEstimate, UsageTracker};

/// Callback receiving streamed text chunks.
pub type ChunkFn<'a> = dyn Fn(&str) + Send + Sync + 'a;

/// Progress of a streaming send, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEvent<'a> {
    /// More reply text.
    Chunk(&'a str),
    /// The text delivered so far belongs to a reply that failed part way.
    /// Discard it; the replacement reply follows as new chunks.
    Restart,
}

/// Callback receiving [`StreamEvent`]s from a streaming send.
pub type StreamFn = dyn Fn(StreamEvent<'_>) + Send + Sync;

/// A hosted generative-model API.
///
/// Implementations are stateless: every call carries the full
/// conversation it needs. Conversation state lives in [`ChatSession`].
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Enumerate the models the credential can access.
    async fn list_models(&self) -> Result<Vec<String>, BackendError>;

    /// Generate a reply from `model`.
    async fn generate(&self, model: &str, request: &GenerationRequest)
        -> Result<String, BackendError>;

    /// Generate a reply, passing text to `on_chunk` as it arrives.
    ///
    /// The default delivers the whole reply as a single chunk.
    async fn generate_streaming(
        &self,
        model: &str,
        request: &GenerationRequest,
        on_chunk: &ChunkFn<'_>,
    ) -> Result<String, BackendError> {
        let text = self.generate(model, request).await?;
        if !text.is_empty() {
            on_chunk(&text);
        }
        Ok(text)
    }
}

/// Everything a backend needs for one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub contents: Vec<Message>,
    pub sampling: SamplingParams,
}

impl GenerationRequest {
    /// A request with no prior conversation.
    pub fn single_turn(prompt: impl Into<String>, sampling: SamplingParams) -> Self {
        Self {
            contents: vec![Message::user(prompt)],
            sampling,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("empty response")]
    EmptyResponse,
}
