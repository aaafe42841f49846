//! Terminal chat loop.

use std::io::Write;
use std::path::PathBuf;

use robbot_ai::{SessionError, SessionManager, StreamEvent};
use robbot_common::Message;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::export::write_transcript;

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Skip,
    Quit,
    Reset,
    Usage,
    Key(String),
    Export(PathBuf),
    Message(String),
    Unknown(String),
}

pub fn parse_line(line: &str) -> ReplInput {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Skip;
    }
    if matches!(line.to_ascii_lowercase().as_str(), "exit" | "quit" | "q") {
        return ReplInput::Quit;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ReplInput::Message(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match (name, arg) {
        ("reset", _) => ReplInput::Reset,
        ("usage", _) => ReplInput::Usage,
        ("quit" | "exit", _) => ReplInput::Quit,
        ("key", key) if !key.is_empty() => ReplInput::Key(key.to_string()),
        ("export", path) if !path.is_empty() => ReplInput::Export(PathBuf::from(path)),
        _ => ReplInput::Unknown(line.to_string()),
    }
}

const HELP: &str = "Commands: /reset, /usage, /key <api-key>, /export <file.md>, exit";

/// Printed when a partly streamed reply is replaced by a fallback answer.
const RESTART_NOTICE: &str = "\n[reply interrupted; answer from a fallback model follows]\n";

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

fn stream_text(event: StreamEvent<'_>) -> &str {
    match event {
        StreamEvent::Chunk(chunk) => chunk,
        StreamEvent::Restart => RESTART_NOTICE,
    }
}

/// Run the interactive loop until EOF or a quit command.
///
/// Errors are reported and the loop continues, so a missing or wrong key
/// can be fixed with `/key` without restarting.
pub async fn run(manager: &mut SessionManager, stream: bool) -> std::io::Result<()> {
    let initialized = manager.initialize().await;
    match initialized {
        Ok(()) => println!(
            "Connected to {}. {HELP}",
            manager.bound_model().unwrap_or("?")
        ),
        Err(e) => println!("Error: {e}\n{HELP}"),
    }

    // Everything shown on screen, including fallback replies.
    let mut transcript: Vec<Message> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt("\nYou: ");
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            ReplInput::Skip => continue,
            ReplInput::Quit => break,
            ReplInput::Reset => {
                let reset = manager.reset().await;
                match reset {
                    Ok(()) => {
                        transcript.clear();
                        println!("Session reset ({}).", manager.bound_model().unwrap_or("?"));
                    }
                    Err(e) => println!("\nError: {e}"),
                }
            }
            ReplInput::Usage => {
                let usage = manager.usage();
                let total = usage.total();
                println!(
                    "{} exchanges, ~{} input / ~{} output tokens, ~${:.6}",
                    usage.exchanges(),
                    total.input_tokens,
                    total.output_tokens,
                    total.cost
                );
            }
            ReplInput::Key(key) => {
                let updated = match manager.config().with_api_key(key) {
                    Ok(config) => config,
                    Err(e) => {
                        println!("\nError: {e}");
                        continue;
                    }
                };
                let reconfigured = manager.reconfigure(updated).await;
                match reconfigured {
                    Ok(()) => {
                        transcript.clear();
                        println!("Connected to {}.", manager.bound_model().unwrap_or("?"));
                    }
                    Err(e) => println!("\nError: {e}"),
                }
            }
            ReplInput::Export(path) => match write_transcript(&path, &transcript) {
                Ok(()) => {
                    info!(path = %path.display(), "transcript exported");
                    println!("Saved {} messages to {}", transcript.len(), path.display());
                }
                Err(e) => println!("\nError: failed to write {}: {e}", path.display()),
            },
            ReplInput::Unknown(cmd) => println!("Unknown command {cmd}. {HELP}"),
            ReplInput::Message(text) => {
                prompt("\nAssistant: ");
                match send(manager, &text, stream).await {
                    Ok(reply) => {
                        if !stream {
                            print!("{reply}");
                        }
                        println!();
                        transcript.push(Message::user(text));
                        transcript.push(Message::assistant(reply));
                    }
                    Err(e) => println!("\nError: {e}"),
                }
            }
        }
    }

    debug!("leaving chat loop");
    Ok(())
}

/// Send one message, printing chunks as they arrive when streaming.
pub async fn send(
    manager: &mut SessionManager,
    text: &str,
    stream: bool,
) -> Result<String, SessionError> {
    if stream {
        let on_event = |event: StreamEvent<'_>| prompt(stream_text(event));
        manager.send_streaming(text, &on_event).await
    } else {
        manager.send(text).await
    }
}
