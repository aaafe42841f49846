//! SessionManager: model selection, initialization, and dispatch with
//! fallback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use robbot_common::Message;
use robbot_config::ChatConfig;
use tracing::{debug, info, warn};

use crate::connector::{BackendConnector, HttpConnector};
use crate::fallback::{self, Attempt, AttemptLog};
use crate::usage::{estimate_usage, UsageEstimate, UsageTracker};
use crate::{BackendError, ChunkFn, GenerationRequest, ModelBackend, StreamEvent, StreamFn};

use super::chat::ChatSession;
use super::error::SessionError;
use super::types::SessionState;

/// Prompt sent to each candidate to check it is reachable and authorized.
pub const PROBE_PROMPT: &str = "Hello, testing the API.";

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Owns one conversation against a hosted model.
///
/// Not meant to be shared between concurrent callers: every operation
/// takes `&mut self`, so give each user session its own manager.
pub struct SessionManager {
    config: ChatConfig,
    connector: Arc<dyn BackendConnector>,
    env_lookup: Arc<EnvLookup>,
    backend: Option<Arc<dyn ModelBackend>>,
    session: Option<ChatSession>,
    state: SessionState,
    usage: UsageTracker,
}

impl SessionManager {
    /// Create an uninitialized manager that talks to the real APIs.
    pub fn new(config: ChatConfig) -> Self {
        Self::with_connector(config, Arc::new(HttpConnector))
    }

    pub fn with_connector(config: ChatConfig, connector: Arc<dyn BackendConnector>) -> Self {
        Self {
            config,
            connector,
            env_lookup: Arc::new(|name: &str| std::env::var(name).ok()),
            backend: None,
            session: None,
            state: SessionState::Uninitialized,
            usage: UsageTracker::new(),
        }
    }

    /// Replace the environment lookup used to find an API key that is not
    /// set in the configuration.
    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env_lookup = Arc::new(lookup);
        self
    }

    /// Create a manager and initialize it.
    pub async fn connect(config: ChatConfig) -> Result<Self, SessionError> {
        let mut manager = Self::new(config);
        manager.initialize().await?;
        Ok(manager)
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Model the current session is bound to.
    pub fn bound_model(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.model())
    }

    /// Transcript held by the bound session.
    pub fn history(&self) -> &[Message] {
        self.session.as_ref().map(|s| s.history()).unwrap_or(&[])
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Pick a model and start a fresh session.
    ///
    /// Any previous session is discarded first. Fails with
    /// `Authentication` when no key resolves or the backend rejects it, and
    /// with `ModelUnavailable` when the model list is empty or no candidate
    /// answers the probe.
    pub async fn initialize(&mut self) -> Result<(), SessionError> {
        self.backend = None;
        self.session = None;
        self.state = SessionState::Initializing;

        let started = self.start_session().await;
        match started {
            Ok((backend, session)) => {
                info!(model = %session.model(), "session ready");
                self.backend = Some(backend);
                self.session = Some(session);
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = match e {
                    SessionError::ModelUnavailable(_) => SessionState::Failed,
                    _ => SessionState::Uninitialized,
                };
                Err(e)
            }
        }
    }

    async fn start_session(&self) -> Result<(Arc<dyn ModelBackend>, ChatSession), SessionError> {
        let api_key = self
            .config
            .resolve_api_key_with(|name| (self.env_lookup)(name))
            .map_err(|e| SessionError::Authentication(e.to_string()))?;

        let backend = self.connector.connect(self.config.provider(), &api_key)?;

        let available = backend.list_models().await.map_err(|e| match e {
            BackendError::Unauthorized(msg) => SessionError::Authentication(msg),
            other => SessionError::Backend(other),
        })?;
        if available.is_empty() {
            return Err(SessionError::ModelUnavailable(AttemptLog::default()));
        }
        debug!(count = available.len(), models = ?available, "available models");

        let sampling = self.config.sampling();
        let probe = GenerationRequest::single_turn(PROBE_PROMPT, sampling.clone());
        let answer = fallback::first_answer(
            backend.as_ref(),
            &self.config.candidate_models(),
            &probe,
        )
        .await
        .map_err(SessionError::ModelUnavailable)?;

        let mut session = ChatSession::new(answer.model);
        if let Some(persona) = self.config.system_message() {
            // The reply is discarded; the exchange stays in the history.
            session
                .send(backend.as_ref(), persona, &sampling, None)
                .await?;
        }

        Ok((backend, session))
    }

    /// Send a message and return the reply.
    pub async fn send(&mut self, message: &str) -> Result<String, SessionError> {
        self.dispatch(message, None).await
    }

    /// Send a message, streaming the reply through `on_event`.
    ///
    /// A reply obtained from the stateless fallback arrives as one chunk.
    /// If the bound session had already streamed part of its reply before
    /// failing, [`StreamEvent::Restart`] is sent first, so the chunks after
    /// the last restart always add up to the returned reply.
    pub async fn send_streaming(
        &mut self,
        message: &str,
        on_event: &StreamFn,
    ) -> Result<String, SessionError> {
        self.dispatch(message, Some(on_event)).await
    }

    async fn dispatch(
        &mut self,
        message: &str,
        on_event: Option<&StreamFn>,
    ) -> Result<String, SessionError> {
        if message.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        let Some(backend) = self.backend.clone() else {
            return Err(SessionError::NotReady(self.state));
        };
        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::NotReady(self.state));
        };

        self.state = SessionState::Dispatching;
        let sampling = self.config.sampling();
        let mut failures = AttemptLog::default();

        let emitted = AtomicBool::new(false);
        let forward = |chunk: &str| {
            emitted.store(true, Ordering::Relaxed);
            if let Some(on_event) = on_event {
                on_event(StreamEvent::Chunk(chunk));
            }
        };
        let on_chunk = on_event.map(|_| &forward as &ChunkFn<'_>);

        let bound_model = session.model().to_string();
        let stateful = session
            .send(backend.as_ref(), message, &sampling, on_chunk)
            .await;
        match stateful {
            Ok(reply) => return Ok(self.complete(message, reply)),
            Err(cause) => {
                warn!(model = %bound_model, error = %cause, "session send failed, falling back to stateless generation");
                failures.push(Attempt {
                    model: bound_model,
                    cause,
                });
            }
        }

        // Stateless: the fallback reply carries no conversational context
        // and is not added to the session history.
        let request = GenerationRequest::single_turn(message, sampling);
        let candidates = self.config.candidate_models();
        let stateless = fallback::first_answer(backend.as_ref(), &candidates, &request).await;
        match stateless {
            Ok(answer) => {
                info!(model = %answer.model, "fallback model answered");
                if let Some(on_event) = on_event {
                    if emitted.load(Ordering::Relaxed) {
                        on_event(StreamEvent::Restart);
                    }
                    on_event(StreamEvent::Chunk(&answer.text));
                }
                Ok(self.complete(message, answer.text))
            }
            Err(log) => {
                failures.extend(log);
                self.state = SessionState::Failed;
                Err(SessionError::Dispatch(failures))
            }
        }
    }

    fn complete(&mut self, message: &str, reply: String) -> String {
        self.usage.record(&estimate_usage(message, &reply));
        self.state = SessionState::Ready;
        reply
    }

    /// Discard the session, including its history, and initialize again.
    pub async fn reset(&mut self) -> Result<(), SessionError> {
        self.usage.reset();
        self.initialize().await
    }

    /// Replace the configuration (e.g. a newly entered API key) and
    /// initialize again.
    pub async fn reconfigure(&mut self, config: ChatConfig) -> Result<(), SessionError> {
        self.config = config;
        self.reset().await
    }

    /// Word-count token and cost estimate for an exchange.
    pub fn estimate_usage(&self, input_text: &str, output_text: &str) -> UsageEstimate {
        estimate_usage(input_text, output_text)
    }
}
