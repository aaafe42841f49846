//! Configuration schema.
//!
//! `ChatSettings` is the raw, deserializable field set. Every section
//! uses serde defaults so a partial TOML file (or none at all) works.
//! Settings only become usable after `validation::validate` turns them
//! into a [`ChatConfig`](crate::ChatConfig).

mod gemini;
mod openai;
mod provider;

pub use gemini::{GeminiSettings, GEMINI_MODELS};
pub use openai::{OpenAiSettings, OPENAI_MODELS};
pub use provider::Provider;

use serde::{Deserialize, Serialize};

/// Top-level chat settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub provider: Provider,
    /// Ordered candidate models; when unset the provider default list is used.
    pub model_priority: Option<Vec<String>>,
    /// Persona message sent as the first turn of every session.
    pub system_message: Option<String>,
    pub gemini: GeminiSettings,
    pub openai: OpenAiSettings,
}
