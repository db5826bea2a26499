//! Extraction service abstraction.
//!
//! The vision/OCR call is an external collaborator: it receives an image
//! path and returns best-effort raw text fields, or fails with a transport
//! error. The pipeline never retries it; retry policy belongs to the
//! operator (re-run, already-succeeded files are skipped via the log).

use std::path::Path;

use async_trait::async_trait;

use crate::error::ExtractError;

/// Raw fields returned by the extraction service. Either or both may be
/// absent; the pipeline maps absence to per-file failure statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    /// Merchant name as it appeared on the receipt.
    pub provider: Option<String>,

    /// Purchase date text, not yet parsed.
    pub date_text: Option<String>,
}

/// Capability to extract receipt fields from an image.
#[async_trait]
pub trait ReceiptExtractor: Send + Sync {
    async fn extract(&self, image: &Path) -> Result<ExtractedFields, ExtractError>;
}
