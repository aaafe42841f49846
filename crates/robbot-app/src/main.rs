mod cli;
mod export;
mod repl;

use std::process::ExitCode;

use robbot_ai::{SessionError, SessionManager};
use robbot_common::ConfigError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Load environment variables from a .env file (KEY=VALUE lines).
///
/// Variables already present in the environment are left alone.
fn load_dotenv() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        // Current directory
        std::path::PathBuf::from(".env"),
        // Workspace root — two levels up from crates/robbot-app/
        manifest_dir.join("..").join("..").join(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let line = line.strip_prefix("export ").unwrap_or(line);
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
            return;
        }
    }
}

async fn run(args: cli::Args) -> Result<(), AppError> {
    let mut settings = robbot_config::load_settings(args.config.as_deref())?;
    cli::apply_overrides(&args, &mut settings);
    let config = robbot_config::validate(settings)?;
    tracing::info!(
        provider = %config.provider(),
        candidates = ?config.candidate_models(),
        "config loaded"
    );

    let mut manager = SessionManager::new(config);

    match args.command.clone().unwrap_or(cli::Command::Chat) {
        cli::Command::Chat => repl::run(&mut manager, args.stream).await?,
        cli::Command::Ask { message } => {
            manager.initialize().await?;
            let reply = repl::send(&mut manager, &message.join(" "), args.stream).await?;
            if args.stream {
                println!();
            } else {
                println!("{reply}");
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file before anything else
    load_dotenv();

    let args = cli::parse();

    // Logs go to stderr so chat output on stdout stays clean
    let log_directive = args.log_level.as_deref().unwrap_or("robbot=warn");
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "robbot=warn".parse().unwrap()),
            ),
        )
        .init();

    tracing::info!("Robbot v{} starting...", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
