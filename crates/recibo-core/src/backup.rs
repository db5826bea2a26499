//! Backup of originals before any mutation.

use std::path::Path;

use async_trait::async_trait;

use crate::error::BackupError;

/// Capability to preserve an original file before the pipeline touches it.
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Copy `source` into `backup_dir` and verify the copy.
    async fn backup(&self, source: &Path, backup_dir: &Path) -> Result<(), BackupError>;
}

/// File-system backup store.
///
/// Verification compares file sizes only. That is a deliberately cheap check:
/// it catches truncated copies but not bit-level corruption.
#[derive(Debug, Default)]
pub struct FsBackupStore;

impl FsBackupStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BackupStore for FsBackupStore {
    async fn backup(&self, source: &Path, backup_dir: &Path) -> Result<(), BackupError> {
        tokio::fs::create_dir_all(backup_dir).await?;

        let file_name = source
            .file_name()
            .ok_or_else(|| BackupError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("source has no file name: {}", source.display()),
            )))?;
        let dest = backup_dir.join(file_name);

        // Overwrites any stale same-named backup
        tokio::fs::copy(source, &dest).await?;

        let expected = tokio::fs::metadata(source).await?.len();
        let actual = tokio::fs::metadata(&dest).await?.len();
        if expected != actual {
            return Err(BackupError::Verification {
                file: file_name.to_string_lossy().into_owned(),
                expected,
                actual,
            });
        }

        tracing::debug!("backed up {} ({} bytes)", file_name.to_string_lossy(), actual);
        Ok(())
    }
}
