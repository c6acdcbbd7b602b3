use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::controller::Exchange;

const SEPARATOR_WIDTH: usize = 30;

/// Appends finished exchanges to a dated plain-text log
#[derive(Debug, Clone)]
pub struct Transcript {
    dir: PathBuf,
}

impl Transcript {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, at: &DateTime<Local>) -> PathBuf {
        self.dir.join(format!("chat-{}.log", at.format("%Y-%m-%d")))
    }

    pub fn record(&self, exchange: &Exchange) -> Result<PathBuf> {
        self.record_at(exchange, &Local::now())
    }

    pub fn record_at(&self, exchange: &Exchange, at: &DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;

        let path = self.path_for(at);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        file.write_all(format_entry(exchange, at).as_bytes())?;
        Ok(path)
    }
}

fn format_entry(exchange: &Exchange, at: &DateTime<Local>) -> String {
    let timestamp = at.format("%H:%M:%S");
    format!(
        "[{timestamp}] USER: {}\n[{timestamp}] AI: {}\n{}\n",
        exchange.user,
        exchange.reply,
        "-".repeat(SEPARATOR_WIDTH)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn exchange(user: &str, reply: &str) -> Exchange {
        Exchange {
            user: user.to_string(),
            reply: reply.to_string(),
            failed: false,
        }
    }

    #[test]
    fn test_entries_are_appended_to_dated_file() {
        let dir = tempdir().unwrap();
        let transcript = Transcript::new(dir.path().join("logs"));
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        let path = transcript.record_at(&exchange("hi", "hello"), &at).unwrap();
        transcript.record_at(&exchange("bye", "later"), &at).unwrap();

        assert!(path.ends_with("chat-2024-03-09.log"));
        let content = fs::read_to_string(path).unwrap();
        let separator = "-".repeat(30);
        assert_eq!(
            content,
            format!(
                "[14:05:07] USER: hi\n[14:05:07] AI: hello\n{separator}\n\
                 [14:05:07] USER: bye\n[14:05:07] AI: later\n{separator}\n"
            )
        );
    }
}
