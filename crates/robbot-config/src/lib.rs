//! Robbot configuration model.
//!
//! Settings are read from TOML (all sections optional), adjusted by the
//! caller, and then frozen into a validated [`ChatConfig`]. Out-of-range
//! values are rejected at that point rather than when a request is made.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use robbot_config::{load_settings, validate};
//!
//! let settings = load_settings(None).expect("failed to load settings");
//! let config = validate(settings).expect("invalid settings");
//! println!("{:?}", config.candidate_models());
//! ```

pub mod config;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use config::{ChatConfig, SamplingParams};
pub use schema::{ChatSettings, GeminiSettings, OpenAiSettings, Provider};
pub use validation::validate;

use robbot_common::ConfigError;
use std::path::Path;

/// Load settings from `path`, or from the platform default location.
///
/// An explicit path must exist; a missing default file yields defaults.
pub fn load_settings(path: Option<&Path>) -> Result<ChatSettings, ConfigError> {
    match path {
        Some(path) => toml_loader::load_from_path(path),
        None => toml_loader::load_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = load_settings(Some(Path::new("/tmp/robbot_does_not_exist.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
