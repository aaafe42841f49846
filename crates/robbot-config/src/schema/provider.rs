//! Backend provider selection.

use std::fmt;
use std::str::FromStr;

use robbot_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Which hosted model API a session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl Provider {
    /// Environment variable consulted when no explicit key is configured.
    pub fn env_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GOOGLE_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Built-in model preference order, most preferred first.
    pub fn default_models(&self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => &[
                "models/gemini-pro",
                "models/gemini-2.0-flash",
                "models/gemini-2.0-flash-lite",
            ],
            Provider::OpenAi => &["gpt-4", "gpt-3.5-turbo"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            other => Err(ConfigError::ValidationError(format!(
                "provider = \"{other}\" is not one of [gemini, openai]"
            ))),
        }
    }
}
