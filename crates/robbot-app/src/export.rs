//! Transcript export as Markdown.

use std::path::Path;

use chrono::{DateTime, Local};
use robbot_common::Message;

/// Render a chat transcript as a Markdown document.
pub fn render_markdown(messages: &[Message], generated_at: DateTime<Local>) -> String {
    let mut out = String::from("# Chat History\n\n");
    out.push_str(&format!(
        "_Exported {}_\n",
        generated_at.format("%Y-%m-%d %H:%M")
    ));

    for msg in messages {
        out.push_str(&format!("\n## {}:\n\n{}\n", msg.role.label(), msg.content.trim_end()));
    }
    out
}

/// Write the transcript to `path`, creating parent directories.
pub fn write_transcript(path: &Path, messages: &[Message]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_markdown(messages, Local::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Vec<Message> {
        vec![
            Message::user("What is Rust?"),
            Message::assistant("A systems programming language.\n"),
        ]
    }

    #[test]
    fn renders_roles_as_headers() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let md = render_markdown(&sample(), at);

        assert!(md.starts_with("# Chat History\n"));
        assert!(md.contains("_Exported 2024-05-01 09:30_"));
        assert!(md.contains("## User:\n\nWhat is Rust?\n"));
        assert!(md.contains("## Assistant:\n\nA systems programming language.\n"));
        let user = md.find("## User:").unwrap();
        let assistant = md.find("## Assistant:").unwrap();
        assert!(user < assistant);
    }

    #[test]
    fn writes_file_with_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("chat.md");

        write_transcript(&path, &sample()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("What is Rust?"));
    }
}
