//! Append-only operation log.
//!
//! The log is the sole persisted state of the system. One line is appended
//! per processing attempt; "already processed" membership is recovered by
//! re-reading the file and collecting original names from `OK` lines.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::receipt::ProcessingResult;
use crate::rules::patterns::LOG_LINE;

/// Capability set of the operation log.
#[async_trait]
pub trait OperationLog: Send + Sync {
    /// Append one attempt. Line format:
    /// `timestamp | original → target-or-dash | OK` or `... | ERROR: message`.
    async fn append(&self, result: &ProcessingResult) -> Result<()>;

    /// Original file names with an `OK` entry, lowercased for
    /// case-insensitive membership checks.
    async fn load_processed(&self) -> Result<HashSet<String>>;
}

/// Operation log backed by a plain text file. Writes are serialized with an
/// internal lock so concurrent loggers never interleave partial lines.
pub struct FileOperationLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileOperationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn format_line(result: &ProcessingResult) -> String {
        let timestamp = result.processed_at.format("%Y-%m-%d %H:%M");
        let target = result.new_name.as_deref().unwrap_or("--");
        let status = if result.is_success() {
            "OK".to_string()
        } else {
            format!("ERROR: {}", result.error.as_deref().unwrap_or("unknown"))
        };
        format!("{timestamp} | {} → {target} | {status}", result.original_name)
    }
}

#[async_trait]
impl OperationLog for FileOperationLog {
    async fn append(&self, result: &ProcessingResult) -> Result<()> {
        let line = Self::format_line(result);

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;

        Ok(())
    }

    async fn load_processed(&self) -> Result<HashSet<String>> {
        let mut processed = HashSet::new();

        if !self.path.exists() {
            return Ok(processed);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        for line in content.lines() {
            if !line.contains("| OK") {
                continue;
            }
            if let Some(caps) = LOG_LINE.captures(line) {
                processed.insert(caps[1].trim().to_lowercase());
            }
        }

        Ok(processed)
    }
}
