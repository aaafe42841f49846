//! Construction of backend client handles.
//!
//! A [`SessionManager`](crate::SessionManager) asks its connector for a
//! fresh client whenever it (re)initializes, so every manager owns its own
//! credential-bearing handle.

use std::sync::Arc;

use robbot_config::Provider;

use crate::{BackendError, GeminiClient, ModelBackend, OpenAiClient};

/// Builds a backend client for a provider and API key.
pub trait BackendConnector: Send + Sync {
    fn connect(&self, provider: Provider, api_key: &str)
        -> Result<Arc<dyn ModelBackend>, BackendError>;
}

/// Connects to the real hosted APIs over HTTPS.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl BackendConnector for HttpConnector {
    fn connect(
        &self,
        provider: Provider,
        api_key: &str,
    ) -> Result<Arc<dyn ModelBackend>, BackendError> {
        match provider {
            Provider::Gemini => Ok(Arc::new(GeminiClient::new(api_key)?)),
            Provider::OpenAi => Ok(Arc::new(OpenAiClient::new(api_key)?)),
        }
    }
}
