use std::io::Write;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tempfile::NamedTempFile;

use crate::dashboard::EditBuffer;

const TITLE_PREFIX: &str = "title:";

/// Text handed to the editor: a `title:` line, a blank line, then the content
pub fn compose(buffer: &EditBuffer) -> String {
    format!("{} {}\n\n{}", TITLE_PREFIX, buffer.title, buffer.content)
}

/// Read the editor's text back. Without a leading `title:` line the whole
/// text is content and the title is kept.
pub fn parse(text: &str, previous_title: &str) -> EditBuffer {
    let Some(first) = text.lines().next().filter(|l| l.starts_with(TITLE_PREFIX)) else {
        return EditBuffer {
            title: previous_title.to_string(),
            content: text.to_string(),
        };
    };

    let title = first[TITLE_PREFIX.len()..].trim().to_string();
    let rest = text[first.len()..]
        .strip_prefix("\r\n")
        .or_else(|| text[first.len()..].strip_prefix('\n'))
        .unwrap_or("");
    let content = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    EditBuffer {
        title,
        content: content.to_string(),
    }
}

/// Editor command from the environment, falling back to vim
pub fn editor_command() -> String {
    std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| "vim".to_string())
}

/// Launch external editor on the buffer, return the edited buffer
pub fn edit_externally(buffer: &EditBuffer) -> Result<EditBuffer> {
    let editor = editor_command();

    let mut temp_file = NamedTempFile::with_suffix(".md")?;
    temp_file.write_all(compose(buffer).as_bytes())?;
    temp_file.flush()?;
    let temp_path = temp_file.path().to_path_buf();

    tracing::debug!(%editor, path = %temp_path.display(), "launching editor");
    let status = Command::new(&editor)
        .arg(&temp_path)
        .status()
        .with_context(|| format!("Failed to launch editor '{}'", editor))?;

    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }

    let edited = std::fs::read_to_string(&temp_path)
        .context("Could not read edited file")?;
    Ok(parse(&edited, &buffer.title))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(title: &str, content: &str) -> EditBuffer {
        EditBuffer {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn composed_text_parses_back() {
        let original = buffer("Runbook", "# Steps\n\n1. restart\n");
        assert_eq!(parse(&compose(&original), "ignored"), original);
    }

    #[test]
    fn title_line_is_trimmed() {
        assert_eq!(
            parse("title:   Renamed  \n\nbody", "Old"),
            buffer("Renamed", "body")
        );
    }

    #[test]
    fn missing_title_line_keeps_previous_title() {
        assert_eq!(parse("# Just content", "Old"), buffer("Old", "# Just content"));
    }

    #[test]
    fn title_only_file_has_empty_content() {
        assert_eq!(parse("title: Empty", "Old"), buffer("Empty", ""));
    }
}
