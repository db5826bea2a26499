//! Core library for receipt photo processing.
//!
//! This crate provides:
//! - Date and merchant extraction rules for OCR text from Spanish receipts
//! - Deterministic, collision-safe output naming
//! - Backup store with copy verification
//! - Append-only operation log doubling as dedup state
//! - The batch processing pipeline and single-flight folder watcher

pub mod backup;
pub mod error;
pub mod extract;
pub mod models;
pub mod naming;
pub mod oplog;
pub mod pipeline;
pub mod rules;
pub mod watcher;

pub use error::{BackupError, ExtractError, ReciboError, Result};
pub use models::config::{ReciboConfig, WatchConfig};
pub use models::dictionary::{ProviderDictionary, ProviderMapping};
pub use models::options::{ProcessingOptions, SUPPORTED_EXTENSIONS};
pub use models::receipt::{ProcessingResult, ProcessingStatus, ReceiptRecord};

pub use backup::{BackupStore, FsBackupStore};
pub use extract::{ExtractedFields, ReceiptExtractor};
pub use oplog::{FileOperationLog, OperationLog};
pub use pipeline::{BatchRunner, CancelFlag, ProcessingPipeline};
pub use rules::provider::ProviderMatcher;
pub use watcher::{FolderWatcher, WatcherConfig};
