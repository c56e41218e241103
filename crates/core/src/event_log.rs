//! Append-only severity logs (`error.log`, `info.log`).
//!
//! Each entry is one line:
//!
//! ```text
//! [2024-03-01 14:05:09] ERROR: Statement failed Context: {"index":5}
//! ```
//!
//! Every append takes an exclusive `flock` on the target file so lines from
//! concurrent processes never interleave. Ordering between racing writers is
//! not guaranteed. Entries are never read back by this crate.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use chrono_tz::Tz;
use fs2::FileExt;

use crate::constants::{DATETIME_FORMAT, ERROR_LOG_FILE, INFO_LOG_FILE};
use crate::paths::ensure_dir;
use crate::types::{LocalTimestamp, LogContext};

/// Which log file an entry goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Info,
}

impl Severity {
    /// Label written after the timestamp.
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Info => "INFO",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Error => ERROR_LOG_FILE,
            Self::Info => INFO_LOG_FILE,
        }
    }
}

/// Format a single log line, including the trailing newline.
///
/// An empty `context` produces no `Context:` suffix.
pub fn format_entry(
    timestamp: &LocalTimestamp,
    severity: Severity,
    message: &str,
    context: &LogContext,
) -> String {
    let mut line = format!(
        "[{}] {}: {}",
        timestamp.format(DATETIME_FORMAT),
        severity.label(),
        message
    );
    if !context.is_empty() {
        // Serializing a map of JSON values cannot fail.
        let json = serde_json::to_string(context).unwrap_or_default();
        line.push_str(" Context: ");
        line.push_str(&json);
    }
    line.push('\n');
    line
}

/// Writer for the two severity logs under one directory.
#[derive(Debug, Clone)]
pub struct EventLog {
    dir: PathBuf,
    timezone: Tz,
}

impl EventLog {
    /// `dir` is usually [`crate::paths::Paths::log_path`]; it is created on
    /// first append if missing.
    pub fn new(dir: impl Into<PathBuf>, timezone: Tz) -> Self {
        Self {
            dir: dir.into(),
            timezone,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self, severity: Severity) -> PathBuf {
        self.dir.join(severity.file_name())
    }

    /// Append an `ERROR` entry. Write failures are traced, not returned.
    pub fn log_error(&self, message: &str, context: &LogContext) {
        self.append_best_effort(Severity::Error, message, context);
    }

    /// Append an `INFO` entry. Write failures are traced, not returned.
    pub fn log_info(&self, message: &str, context: &LogContext) {
        self.append_best_effort(Severity::Info, message, context);
    }

    /// Append an entry stamped with the current time in the configured zone.
    pub fn append(
        &self,
        severity: Severity,
        message: &str,
        context: &LogContext,
    ) -> io::Result<()> {
        let now = Utc::now().with_timezone(&self.timezone);
        self.append_at(&now, severity, message, context)
    }

    /// Append an entry with an explicit timestamp.
    pub fn append_at(
        &self,
        timestamp: &LocalTimestamp,
        severity: Severity,
        message: &str,
        context: &LogContext,
    ) -> io::Result<()> {
        ensure_dir(&self.dir)?;
        let line = format_entry(timestamp, severity, message, context);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_path(severity))?;

        file.lock_exclusive()?;
        let written = file.write_all(line.as_bytes()).and_then(|()| file.flush());
        let unlocked = FileExt::unlock(&file);
        written?;
        unlocked
    }

    fn append_best_effort(&self, severity: Severity, message: &str, context: &LogContext) {
        if let Err(e) = self.append(severity, message, context) {
            tracing::warn!(
                error = %e,
                file = %self.file_path(severity).display(),
                "Failed to append log entry",
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
