use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::constants::HISTORY_TIMESTAMP_FORMAT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

/// One line of the message history file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub counterpart: String,
    pub direction: Direction,
    pub text: String,
}

impl HistoryEntry {
    pub fn sent(recipient: &str, text: &str) -> Self {
        Self::now(Direction::Sent, recipient, text)
    }

    pub fn received(counterpart: &str, text: &str) -> Self {
        Self::now(Direction::Received, counterpart, text)
    }

    fn now(direction: Direction, counterpart: &str, text: &str) -> Self {
        Self {
            timestamp: chrono::Local::now()
                .format(HISTORY_TIMESTAMP_FORMAT)
                .to_string(),
            counterpart: counterpart.to_string(),
            direction,
            text: text.to_string(),
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.direction {
            Direction::Sent => "Sent to",
            Direction::Received => "Received from",
        };
        // One entry per line
        let text = self.text.replace(['\r', '\n'], " ");
        write!(
            f,
            "[{}] {} {}: {}",
            self.timestamp, verb, self.counterpart, text
        )
    }
}

/// Append-only history file. The file is opened in append mode per write.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &HistoryEntry) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", entry)
    }
}
