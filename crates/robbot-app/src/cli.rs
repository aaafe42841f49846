use std::path::PathBuf;

use clap::{Parser, Subcommand};
use robbot_config::{ChatSettings, Provider};
use tracing::warn;

/// Robbot — chat with Gemini (or OpenAI) from the terminal.
#[derive(Parser, Debug)]
#[command(name = "robbot", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Backend provider (gemini, openai).
    #[arg(long)]
    pub provider: Option<Provider>,

    /// Preferred model for the selected provider.
    #[arg(long)]
    pub model: Option<String>,

    /// Comma-separated candidate models, most preferred first.
    #[arg(long, value_delimiter = ',')]
    pub models: Option<Vec<String>>,

    /// Sampling temperature.
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Nucleus sampling parameter.
    #[arg(long)]
    pub top_p: Option<f64>,

    /// Top-k sampling parameter (Gemini only).
    #[arg(long)]
    pub top_k: Option<u32>,

    /// Maximum number of tokens in the response.
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// API key; defaults to GOOGLE_API_KEY / OPENAI_API_KEY.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Persona message sent at the start of every session.
    #[arg(long)]
    pub system: Option<String>,

    /// Print replies as they stream in.
    #[arg(long)]
    pub stream: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive chat in the terminal (default).
    Chat,
    /// Send a single message and print the reply.
    Ask {
        /// Message text.
        #[arg(required = true)]
        message: Vec<String>,
    },
}

pub fn parse() -> Args {
    Args::parse()
}

/// Apply command-line overrides on top of file settings. Sampling flags
/// target the section of the provider in effect after `--provider`.
pub fn apply_overrides(args: &Args, settings: &mut ChatSettings) {
    if let Some(provider) = args.provider {
        settings.provider = provider;
    }
    if let Some(models) = &args.models {
        settings.model_priority = Some(models.clone());
    }
    if let Some(system) = &args.system {
        settings.system_message = Some(system.clone());
    }

    match settings.provider {
        Provider::Gemini => {
            let gemini = &mut settings.gemini;
            if let Some(model) = &args.model {
                gemini.model = model.clone();
            }
            if let Some(t) = args.temperature {
                gemini.temperature = t;
            }
            if let Some(p) = args.top_p {
                gemini.top_p = p;
            }
            if let Some(k) = args.top_k {
                gemini.top_k = k;
            }
            if let Some(max) = args.max_tokens {
                gemini.max_output_tokens = max;
            }
            if let Some(key) = &args.api_key {
                gemini.api_key = Some(key.clone());
            }
        }
        Provider::OpenAi => {
            let openai = &mut settings.openai;
            if let Some(model) = &args.model {
                openai.model = model.clone();
            }
            if let Some(t) = args.temperature {
                openai.temperature = t;
            }
            if let Some(p) = args.top_p {
                openai.top_p = p;
            }
            if args.top_k.is_some() {
                warn!("--top-k is not supported by openai, ignoring");
            }
            if let Some(max) = args.max_tokens {
                openai.max_tokens = Some(max);
            }
            if let Some(key) = &args.api_key {
                openai.api_key = Some(key.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("robbot").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn no_subcommand_means_chat() {
        let args = args(&[]);
        assert!(args.command.is_none());
        assert!(!args.stream);
    }

    #[test]
    fn ask_collects_words() {
        let args = args(&["ask", "what", "is", "rust?"]);
        assert_eq!(
            args.command,
            Some(Command::Ask {
                message: vec!["what".into(), "is".into(), "rust?".into()]
            })
        );
    }

    #[test]
    fn sampling_flags_override_gemini_section() {
        let args = args(&[
            "--temperature",
            "0.2",
            "--top-p",
            "0.5",
            "--top-k",
            "8",
            "--max-tokens",
            "256",
            "--models",
            "models/gemini-2.0-flash,models/gemini-pro",
        ]);
        let mut settings = ChatSettings::default();
        apply_overrides(&args, &mut settings);

        assert_eq!(settings.gemini.temperature, 0.2);
        assert_eq!(settings.gemini.top_p, 0.5);
        assert_eq!(settings.gemini.top_k, 8);
        assert_eq!(settings.gemini.max_output_tokens, 256);
        assert_eq!(
            settings.model_priority,
            Some(vec![
                "models/gemini-2.0-flash".to_string(),
                "models/gemini-pro".to_string()
            ])
        );
    }

    #[test]
    fn provider_switch_targets_openai_section() {
        let args = args(&["--provider", "openai", "--temperature", "1.5", "--api-key", "k"]);
        let mut settings = ChatSettings::default();
        apply_overrides(&args, &mut settings);

        assert_eq!(settings.provider, Provider::OpenAi);
        assert_eq!(settings.openai.temperature, 1.5);
        assert_eq!(settings.openai.api_key.as_deref(), Some("k"));
        assert_eq!(settings.gemini.temperature, 0.7);
        assert!(robbot_config::validate(settings).is_ok());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(Args::try_parse_from(["robbot", "--provider", "llama"]).is_err());
    }
}
