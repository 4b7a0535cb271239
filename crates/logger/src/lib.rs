//! Logging setup shared by the binaries, plus a small append-only activity
//! log recording every change made to the month records.

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` is used
/// (e.g. `"info"` or `"utils=debug"`). Calling it twice is harmless.
pub fn init(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub action: String,
    #[serde(default)]
    pub detail: Value,
}

/// JSON-lines file, one [`LogEntry`] per line.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, action: &str, detail: Value) -> Result<LogEntry> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            action: action.to_string(),
            detail,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Cannot open activity log at {:?}", self.path))?;
        writeln!(file, "{}", serde_json::to_string(&entry)?)?;

        Ok(entry)
    }

    /// Reads back all entries. A missing file is an empty log; blank lines
    /// are skipped.
    pub fn entries(&self) -> Result<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read activity log at {:?}", self.path))?;

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Activity log line {} is not valid JSON", i + 1))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("logs").join("activity.jsonl"));

        log.append("append", json!({"id": "1"})).unwrap();
        log.append("remove", json!({"id": "1"})).unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "append");
        assert_eq!(entries[1].detail, json!({"id": "1"}));
        assert!(!entries[0].timestamp.is_empty());
    }

    #[test]
    fn test_missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("nope.jsonl"));
        assert!(log.entries().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        fs::write(&path, "{not json}\n").unwrap();
        assert!(ActivityLog::new(&path).entries().is_err());
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init("info");
        init("debug");
    }
}
