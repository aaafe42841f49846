use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("no API key for {provider}: pass one explicitly or set {env_var}")]
    MissingCredential {
        provider: String,
        env_var: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("gemini.temperature = 1.5 is out of range".into());
        assert_eq!(
            err.to_string(),
            "config validation error: gemini.temperature = 1.5 is out of range"
        );
    }

    #[test]
    fn missing_credential_names_env_var() {
        let err = ConfigError::MissingCredential {
            provider: "gemini".into(),
            env_var: "GOOGLE_API_KEY",
        };
        let msg = err.to_string();
        assert!(msg.contains("gemini"));
        assert!(msg.contains("GOOGLE_API_KEY"));
    }
}
