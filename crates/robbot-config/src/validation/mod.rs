//! Configuration validation.
//!
//! Only the sub-config selected by `provider` is checked; the other one is
//! carried along but never used. All violations are collected into a
//! single `ConfigError::ValidationError`.

mod helpers;
mod providers;


use robbot_common::ConfigError;

use crate::config::ChatConfig;
use crate::schema::{ChatSettings, Provider};

/// Validate raw settings and freeze them into a [`ChatConfig`].
pub fn validate(settings: ChatSettings) -> Result<ChatConfig, ConfigError> {
    check(&settings)?;
    Ok(ChatConfig::from_validated(settings))
}

/// Run every check against `settings` without consuming them.
pub fn check(settings: &ChatSettings) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    match settings.provider {
        Provider::Gemini => providers::validate_gemini(&mut errors, &settings.gemini),
        Provider::OpenAi => providers::validate_openai(&mut errors, &settings.openai),
    }
    providers::validate_priority(&mut errors, settings.model_priority.as_deref());

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
