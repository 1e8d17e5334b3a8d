//! Append-only audit log of command invocations.
//!
//! Line format: `{YYYY-MM-DD HH:MM:SS} - {command} - {result}`.
//! Result text is flattened to a single line so every entry occupies
//! exactly one line of the file.

use crate::error::Result;
use chrono::{Local, NaiveDateTime, Timelike};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Timestamp format of an audit line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SEPARATOR: &str = " - ";
const LINE_JOINER: &str = "; ";

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp: NaiveDateTime,
    pub command: String,
    pub result: String,
}

impl AuditEntry {
    /// Create an entry stamped with the current local time.
    pub fn new(command: impl Into<String>, result: &str) -> Self {
        let now = Local::now().naive_local();
        Self {
            timestamp: now.with_nanosecond(0).unwrap_or(now),
            command: command.into(),
            result: flatten(result),
        }
    }

    /// Render as a single log line, without the trailing newline.
    pub fn format_line(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            SEPARATOR,
            self.command,
            SEPARATOR,
            self.result
        )
    }

    /// Parse a line produced by [`AuditEntry::format_line`].
    ///
    /// The result text may itself contain the separator; only the first two
    /// occurrences delimit fields.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, SEPARATOR);
        let timestamp = NaiveDateTime::parse_from_str(parts.next()?, TIMESTAMP_FORMAT).ok()?;
        let command = parts.next()?.to_string();
        let result = parts.next()?.to_string();
        Some(Self {
            timestamp,
            command,
            result,
        })
    }
}

fn flatten(text: &str) -> String {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join(LINE_JOINER)
}

/// Shared handle to the audit file.
///
/// Appends are serialized through one mutex-guarded file handle, so lines
/// from concurrent connections never interleave.
pub struct AuditLog {
    path: PathBuf,
    file: Mutex<File>,
    timeout: Duration,
}

impl AuditLog {
    /// Open (or create) the audit file in append mode.
    pub async fn open(path: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        info!("Audit log opened at {}", path.display());

        Ok(Self {
            path,
            file: Mutex::new(file),
            timeout,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. Failures and timeouts are logged, never returned.
    ///
    /// The timeout bounds only the wait for the file. Once the lock is held
    /// the whole line is written, so a timeout never leaves a partial line.
    pub async fn record(&self, command: &str, result: &str) {
        let entry = AuditEntry::new(command, result);
        let mut line = entry.format_line();
        line.push('\n');

        let mut file = match tokio::time::timeout(self.timeout, self.file.lock()).await {
            Ok(file) => file,
            Err(_) => {
                error!(
                    "Timed out after {:?} waiting to write audit entry for '{}'",
                    self.timeout, command
                );
                return;
            }
        };

        let written = async {
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        };
        match written.await {
            Ok(()) => debug!("Audit entry written for '{}'", command),
            Err(e) => error!("Failed to write audit entry for '{}': {}", command, e),
        }
    }
}
