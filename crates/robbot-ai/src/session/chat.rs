//! Stateful conversation bound to one model.

use robbot_common::Message;
use robbot_config::SamplingParams;
use tracing::debug;

use crate::{BackendError, ChunkFn, GenerationRequest, ModelBackend};

/// A conversation bound to a single model.
///
/// The backend APIs are stateless, so the session keeps the transcript
/// itself and re-sends it on every turn. A turn is recorded only when the
/// model answered.
#[derive(Debug, Clone)]
pub struct ChatSession {
    model: String,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            history: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    fn request_for(&self, message: &str, sampling: &SamplingParams) -> GenerationRequest {
        let mut contents = self.history.clone();
        contents.push(Message::user(message));
        GenerationRequest {
            contents,
            sampling: sampling.clone(),
        }
    }

    /// Send `message` with the full history. Streams through `on_chunk`
    /// when given.
    pub(crate) async fn send(
        &mut self,
        backend: &dyn ModelBackend,
        message: &str,
        sampling: &SamplingParams,
        on_chunk: Option<&ChunkFn<'_>>,
    ) -> Result<String, BackendError> {
        let request = self.request_for(message, sampling);
        debug!(model = %self.model, turns = request.contents.len(), "stateful send");

        let reply = match on_chunk {
            Some(on_chunk) => {
                backend
                    .generate_streaming(&self.model, &request, on_chunk)
                    .await?
            }
            None => backend.generate(&self.model, &request).await?,
        };
        if reply.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }

        self.history.push(Message::user(message));
        self.history.push(Message::assistant(reply.clone()));
        Ok(reply)
    }
}
