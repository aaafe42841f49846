//! Validated, immutable chat configuration.

use std::fmt;

use robbot_common::ConfigError;

use crate::schema::{ChatSettings, Provider};

/// Sampling parameters for the active provider, flattened for backends.
///
/// Fields a provider does not support are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: Option<u32>,
    pub max_output_tokens: Option<u32>,
    pub presence_penalty: Option<f64>,
    pub frequency_penalty: Option<f64>,
}

/// Chat configuration that has passed validation.
///
/// Can only be obtained from [`crate::validate`], so every instance holds
/// in-range values. There are no setters: changing anything means building
/// a new config, which runs validation again.
#[derive(Clone, PartialEq)]
pub struct ChatConfig {
    settings: ChatSettings,
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatConfig {
    pub(crate) fn from_validated(settings: ChatSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn into_settings(self) -> ChatSettings {
        self.settings
    }

    pub fn provider(&self) -> Provider {
        self.settings.provider
    }

    pub fn system_message(&self) -> Option<&str> {
        self.settings
            .system_message
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// Model named in the active provider section.
    pub fn model(&self) -> &str {
        match self.settings.provider {
            Provider::Gemini => &self.settings.gemini.model,
            Provider::OpenAi => &self.settings.openai.model,
        }
    }

    /// Ordered candidate models tried at initialization and on fallback.
    ///
    /// An explicit `model_priority` wins. Otherwise the configured model
    /// comes first, followed by the provider's built-in list, with
    /// duplicates (ignoring a `models/` prefix) removed.
    pub fn candidate_models(&self) -> Vec<String> {
        if let Some(priority) = &self.settings.model_priority {
            return priority.clone();
        }

        let mut candidates: Vec<String> = Vec::new();
        let defaults = self.provider().default_models().iter().copied();
        for model in std::iter::once(self.model()).chain(defaults) {
            if !candidates.iter().any(|c| bare(c) == bare(model)) {
                candidates.push(model.to_string());
            }
        }
        candidates
    }

    pub fn sampling(&self) -> SamplingParams {
        match self.settings.provider {
            Provider::Gemini => {
                let g = &self.settings.gemini;
                SamplingParams {
                    temperature: g.temperature,
                    top_p: g.top_p,
                    top_k: Some(g.top_k),
                    max_output_tokens: Some(g.max_output_tokens),
                    presence_penalty: None,
                    frequency_penalty: None,
                }
            }
            Provider::OpenAi => {
                let o = &self.settings.openai;
                SamplingParams {
                    temperature: o.temperature,
                    top_p: o.top_p,
                    top_k: None,
                    max_output_tokens: o.max_tokens,
                    presence_penalty: Some(o.presence_penalty),
                    frequency_penalty: Some(o.frequency_penalty),
                }
            }
        }
    }

    fn explicit_api_key(&self) -> Option<&str> {
        let key = match self.settings.provider {
            Provider::Gemini => self.settings.gemini.api_key.as_deref(),
            Provider::OpenAi => self.settings.openai.api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// Resolve the API key for the active provider.
    ///
    /// Resolution happens on every call, so a key exported after the
    /// config was built is still picked up.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Like [`resolve_api_key`](Self::resolve_api_key) with a custom
    /// environment lookup.
    pub fn resolve_api_key_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        if let Some(key) = self.explicit_api_key() {
            return Ok(key.to_string());
        }

        let env_var = self.provider().env_var();
        lookup(env_var)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                provider: self.provider().to_string(),
                env_var,
            })
    }

    /// Return a copy with an explicit key for the active provider.
    pub fn with_api_key(&self, api_key: impl Into<String>) -> Result<ChatConfig, ConfigError> {
        let mut settings = self.settings.clone();
        let key = Some(api_key.into());
        match settings.provider {
            Provider::Gemini => settings.gemini.api_key = key,
            Provider::OpenAi => settings.openai.api_key = key,
        }
        crate::validation::validate(settings)
    }
}

fn bare(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn explicit_key_wins_over_env() {
        let mut settings = ChatSettings::default();
        settings.gemini.api_key = Some("explicit".into());
        let config = validate(settings).unwrap();
        let key = config
            .resolve_api_key_with(|_| Some("from-env".into()))
            .unwrap();
        assert_eq!(key, "explicit");
    }

    #[test]
    fn falls_back_to_provider_env_var() {
        let config = validate(ChatSettings::default()).unwrap();
        let key = config
            .resolve_api_key_with(|name| (name == "GOOGLE_API_KEY").then(|| "env-key".into()))
            .unwrap();
        assert_eq!(key, "env-key");

        let settings = ChatSettings {
            provider: Provider::OpenAi,
            ..ChatSettings::default()
        };
        let config = validate(settings).unwrap();
        let key = config
            .resolve_api_key_with(|name| (name == "OPENAI_API_KEY").then(|| "oa-key".into()))
            .unwrap();
        assert_eq!(key, "oa-key");
    }

    #[test]
    fn missing_key_is_missing_credential() {
        let config = validate(ChatSettings::default()).unwrap();
        let err = config.resolve_api_key_with(no_env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                env_var: "GOOGLE_API_KEY",
                ..
            }
        ));
    }

    #[test]
    fn blank_keys_count_as_missing() {
        let mut settings = ChatSettings::default();
        settings.gemini.api_key = Some("   ".into());
        let config = validate(settings).unwrap();
        assert!(config.resolve_api_key_with(|_| Some(String::new())).is_err());
    }

    #[test]
    fn key_of_inactive_provider_is_ignored() {
        let mut settings = ChatSettings::default();
        settings.openai.api_key = Some("openai-key".into());
        let config = validate(settings).unwrap();
        assert!(config.resolve_api_key_with(no_env).is_err());
    }

    #[test]
    fn with_api_key_returns_new_config() {
        let config = validate(ChatSettings::default()).unwrap();
        let updated = config.with_api_key("typed-in").unwrap();
        assert_eq!(updated.resolve_api_key_with(no_env).unwrap(), "typed-in");
        assert!(config.resolve_api_key_with(no_env).is_err());
    }

    #[test]
    fn default_candidates_start_with_configured_model() {
        let config = validate(ChatSettings::default()).unwrap();
        assert_eq!(
            config.candidate_models(),
            vec![
                "gemini-pro".to_string(),
                "models/gemini-2.0-flash".to_string(),
                "models/gemini-2.0-flash-lite".to_string(),
            ]
        );
    }

    #[test]
    fn explicit_priority_is_used_verbatim() {
        let mut settings = ChatSettings::default();
        settings.model_priority = Some(vec!["a".into(), "b".into(), "c".into()]);
        let config = validate(settings).unwrap();
        assert_eq!(config.candidate_models(), vec!["a", "b", "c"]);
    }

    #[test]
    fn sampling_follows_provider() {
        let config = validate(ChatSettings::default()).unwrap();
        let sampling = config.sampling();
        assert_eq!(sampling.top_k, Some(40));
        assert_eq!(sampling.max_output_tokens, Some(2048));
        assert_eq!(sampling.presence_penalty, None);

        let settings = ChatSettings {
            provider: Provider::OpenAi,
            ..ChatSettings::default()
        };
        let sampling = validate(settings).unwrap().sampling();
        assert_eq!(sampling.top_k, None);
        assert_eq!(sampling.max_output_tokens, None);
        assert_eq!(sampling.presence_penalty, Some(0.0));
    }

    #[test]
    fn blank_system_message_is_none() {
        let mut settings = ChatSettings::default();
        settings.system_message = Some("  ".into());
        assert!(validate(settings).unwrap().system_message().is_none());
    }
}
