//! Turning a local file into a chat message for `/file`.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Longest file content sent, in characters
pub const MAX_FILE_CHARS: usize = 15_000;

/// What the backend is asked to do with the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
    #[default]
    Normal,
    Summary,
    Explain,
    Refactor,
}

impl FileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::Normal => "normal",
            FileMode::Summary => "summary",
            FileMode::Explain => "explain",
            FileMode::Refactor => "refactor",
        }
    }

    /// Parse a `--summary` style flag
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag.strip_prefix("--")? {
            "summary" => Some(FileMode::Summary),
            "explain" => Some(FileMode::Explain),
            "refactor" => Some(FileMode::Refactor),
            _ => None,
        }
    }

    fn instruction(&self, file_name: &str) -> String {
        match self {
            FileMode::Normal => format!("Here is the content of file `{}`:", file_name),
            FileMode::Summary => "Provide a concise summary of this file.".to_string(),
            FileMode::Explain => {
                "Explain in detail what this file does, including architecture and logic."
                    .to_string()
            }
            FileMode::Refactor => "Refactor and improve this file. \
                Improve readability, structure, and performance. \
                Return the improved full code."
                .to_string(),
        }
    }
}

/// A file read and wrapped, ready to be sent as an ordinary message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMessage {
    pub file_name: String,
    /// Characters of file content included
    pub chars: usize,
    pub truncated: bool,
    pub text: String,
}

impl FileMessage {
    pub fn load(path: &Path, mode: FileMode) -> Result<Self> {
        if !path.exists() {
            bail!("File not found: {}", path.display());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::build(&file_name, &content, mode))
    }

    fn build(file_name: &str, content: &str, mode: FileMode) -> Self {
        let truncated = content.chars().count() > MAX_FILE_CHARS;
        let content: String = if truncated {
            content.chars().take(MAX_FILE_CHARS).collect()
        } else {
            content.to_string()
        };

        let text = format!(
            "{}\n\nFile name: `{}`\n\n```\n{}\n```",
            mode.instruction(file_name),
            file_name,
            content
        );

        Self {
            file_name: file_name.to_string(),
            chars: content.chars().count(),
            truncated,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fence;
    use tempfile::tempdir;

    #[test]
    fn test_mode_flags() {
        assert_eq!(FileMode::from_flag("--summary"), Some(FileMode::Summary));
        assert_eq!(FileMode::from_flag("--explain"), Some(FileMode::Explain));
        assert_eq!(FileMode::from_flag("--refactor"), Some(FileMode::Refactor));
        assert_eq!(FileMode::from_flag("--shout"), None);
        assert_eq!(FileMode::from_flag("summary"), None);
    }

    #[test]
    fn test_file_is_wrapped_in_a_fence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.py");
        fs::write(&path, "print('hi')").unwrap();

        let msg = FileMessage::load(&path, FileMode::Normal).unwrap();
        assert_eq!(msg.file_name, "main.py");
        assert_eq!(msg.chars, 11);
        assert!(!msg.truncated);
        assert_eq!(
            msg.text,
            concat!(
                "Here is the content of file `main.py`:\n\n",
                "File name: `main.py`\n\n```\nprint('hi')\n```",
            )
        );
        assert_eq!(fence::code_blocks(&msg.text), vec!["print('hi')"]);
    }

    #[test]
    fn test_mode_sets_the_instruction() {
        let msg = FileMessage::build("a.rs", "fn a() {}", FileMode::Summary);
        assert!(msg.text.starts_with("Provide a concise summary of this file.\n\n"));

        let msg = FileMessage::build("a.rs", "fn a() {}", FileMode::Refactor);
        assert!(msg.text.starts_with("Refactor and improve this file. Improve readability"));
    }

    #[test]
    fn test_long_file_is_truncated_by_characters() {
        let content = "é".repeat(MAX_FILE_CHARS + 10);
        let msg = FileMessage::build("big.txt", &content, FileMode::Explain);
        assert!(msg.truncated);
        assert_eq!(msg.chars, MAX_FILE_CHARS);
        assert!(msg.text.contains(&"é".repeat(MAX_FILE_CHARS)));
        assert!(!msg.text.contains(&"é".repeat(MAX_FILE_CHARS + 1)));
    }

    #[test]
    fn test_missing_and_unreadable_files() {
        let dir = tempdir().unwrap();
        let missing = FileMessage::load(&dir.path().join("nope.txt"), FileMode::Normal);
        let err = format!("{:#}", missing.unwrap_err());
        assert!(err.starts_with("File not found:"));

        let binary = dir.path().join("blob.bin");
        fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
        let err = format!("{:#}", FileMessage::load(&binary, FileMode::Normal).unwrap_err());
        assert!(err.starts_with("Could not read"));
    }
}
