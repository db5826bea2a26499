//! Receipt data extracted from one image and the per-attempt result record.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Data resolved for one receipt, constructed only after both the provider
/// and the purchase date were successfully extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptRecord {
    /// Canonical merchant name.
    pub provider: String,

    /// Purchase date, no time component.
    pub date: NaiveDate,

    /// File name the receipt arrived under.
    pub original_name: String,

    /// Extension of the original file, with or without a leading dot.
    pub extension: String,
}

/// Terminal outcome classification for one file in one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    /// Renamed and moved (or previewed, in dry-run mode).
    Success,
    /// The extraction service call failed, or an unexpected per-file error.
    OcrFailed,
    /// No parseable purchase date in the extracted text.
    DateNotFound,
    /// The extraction service returned no merchant name.
    ProviderNotFound,
    /// Backing up the original failed; aborts the batch.
    BackupFailed,
    /// An OK log entry already exists for this file name.
    AlreadyProcessed,
    /// The file could not be read as an image.
    InvalidImage,
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::OcrFailed => "OCR failed",
            Self::DateNotFound => "date not found",
            Self::ProviderNotFound => "provider not found",
            Self::BackupFailed => "backup failed",
            Self::AlreadyProcessed => "already processed",
            Self::InvalidImage => "invalid image",
        };
        f.write_str(s)
    }
}

/// The authoritative record of one processing attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// File name the attempt was made for.
    pub original_name: String,

    /// Target file name, present only on success.
    pub new_name: Option<String>,

    /// Terminal status of the attempt.
    pub status: ProcessingStatus,

    /// Human-readable failure reason.
    pub error: Option<String>,

    /// When the attempt finished.
    pub processed_at: DateTime<Local>,
}

impl ProcessingResult {
    /// A successful attempt with the resolved target name.
    pub fn success(original_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            new_name: Some(new_name.into()),
            status: ProcessingStatus::Success,
            error: None,
            processed_at: Local::now(),
        }
    }

    /// A failed attempt with its terminal status and reason.
    pub fn failure(
        original_name: impl Into<String>,
        status: ProcessingStatus,
        error: impl Into<String>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            new_name: None,
            status,
            error: Some(error.into()),
            processed_at: Local::now(),
        }
    }

    /// Whether this attempt ended in `Success`.
    pub fn is_success(&self) -> bool {
        self.status == ProcessingStatus::Success
    }
}
