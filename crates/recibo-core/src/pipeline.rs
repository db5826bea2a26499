//! The batch processing pipeline.
//!
//! One `process_all` call is one batch: scan → dedup → backup-all →
//! extract/parse/rename each → log each → validate. Files are strictly
//! sequential; the only cross-batch hazard is handled by the folder watcher.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::backup::BackupStore;
use crate::error::{ExtractError, ReciboError, Result};
use crate::extract::ReceiptExtractor;
use crate::models::options::ProcessingOptions;
use crate::models::receipt::{ProcessingResult, ProcessingStatus, ReceiptRecord};
use crate::naming;
use crate::oplog::OperationLog;
use crate::rules::dates::parse_date;
use crate::rules::provider::ProviderMatcher;

/// Per-file and per-batch progress messages honor the batch's verbosity
/// flag: info level when the options ask for it, debug otherwise. Warnings
/// and errors are never gated.
macro_rules! progress {
    ($options:expr, $($arg:tt)*) => {
        if $options.verbose {
            info!($($arg)*);
        } else {
            debug!($($arg)*);
        }
    };
}

/// Cooperative cancellation signal, checked before each backup and at the
/// start of each file's processing. Mid-file operations run to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Something that can execute one batch. Implemented by
/// [`ProcessingPipeline`] and by test doubles in the watcher tests.
#[async_trait]
pub trait BatchRunner: Send + Sync {
    async fn run_batch(&self, options: &ProcessingOptions) -> Result<Vec<ProcessingResult>>;
}

/// Orchestrates backup, extraction, parsing, renaming and logging for one
/// batch of input files. Collaborators are injected so the network call and
/// the stores can be substituted in tests.
pub struct ProcessingPipeline {
    extractor: Arc<dyn ReceiptExtractor>,
    backup: Arc<dyn BackupStore>,
    log: Arc<dyn OperationLog>,
    matcher: ProviderMatcher,
    cancel: CancelFlag,
}

impl ProcessingPipeline {
    pub fn new(
        extractor: Arc<dyn ReceiptExtractor>,
        backup: Arc<dyn BackupStore>,
        log: Arc<dyn OperationLog>,
        matcher: ProviderMatcher,
    ) -> Self {
        Self {
            extractor,
            backup,
            log,
            matcher,
            cancel: CancelFlag::new(),
        }
    }

    /// Use an externally-owned cancellation flag.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Process every pending file in the input directory.
    ///
    /// Returns one [`ProcessingResult`] per attempted file. A backup failure
    /// aborts the batch immediately with the results collected so far; no
    /// original is ever mutated before its backup is verified.
    pub async fn process_all(&self, options: &ProcessingOptions) -> Result<Vec<ProcessingResult>> {
        let mut results = Vec::new();

        std::fs::create_dir_all(&options.input_dir)?;
        std::fs::create_dir_all(&options.output_dir)?;
        std::fs::create_dir_all(&options.backup_dir)?;

        let image_files = list_image_files(&options.input_dir)?;
        if image_files.is_empty() {
            progress!(options, "no image files found in input folder");
            return Ok(results);
        }
        progress!(options, "found {} image(s) in input folder", image_files.len());

        let processed = self.log.load_processed().await?;
        let new_files: Vec<PathBuf> = image_files
            .into_iter()
            .filter(|path| {
                let name = file_name_of(path).trim().to_lowercase();
                !processed.contains(&name)
            })
            .collect();

        if new_files.is_empty() {
            progress!(options, "all files have already been processed");
            return Ok(results);
        }
        progress!(options, "{} new file(s) to process", new_files.len());

        // Backup phase, fail-fast: never risk losing an unbacked-up original
        // by proceeding to rename/move operations.
        for file in &new_files {
            if self.cancel.is_cancelled() {
                return Err(ReciboError::Cancelled);
            }

            let file_name = file_name_of(file);
            progress!(options, "backing up: {file_name}");

            if let Err(e) = self.backup.backup(file, &options.backup_dir).await {
                error!("backup failed for {file_name}: {e}");
                let result = ProcessingResult::failure(
                    &file_name,
                    ProcessingStatus::BackupFailed,
                    format!("backup failed: {e}"),
                );
                self.log.append(&result).await?;
                results.push(result);
                return Ok(results);
            }
        }

        // Extraction/rename phase, in listing order.
        for file in &new_files {
            if self.cancel.is_cancelled() {
                return Err(ReciboError::Cancelled);
            }

            let result = self.process_file(file, options).await;
            self.log.append(&result).await?;
            results.push(result);
        }

        self.validate_batch(options, &results);

        Ok(results)
    }

    async fn process_file(&self, file: &Path, options: &ProcessingOptions) -> ProcessingResult {
        let file_name = file_name_of(file);
        let extension = file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();

        progress!(options, "processing: {file_name}");

        let fields = match self.extractor.extract(file).await {
            Ok(fields) => fields,
            Err(ExtractError::InvalidImage(msg)) => {
                warn!("invalid image {file_name}: {msg}");
                return ProcessingResult::failure(&file_name, ProcessingStatus::InvalidImage, msg);
            }
            Err(e @ ExtractError::Transport(_)) => {
                warn!("extraction failed for {file_name}: {e}");
                return ProcessingResult::failure(
                    &file_name,
                    ProcessingStatus::OcrFailed,
                    e.to_string(),
                );
            }
        };

        // Date is resolved first; its failure short-circuits before the
        // provider is ever looked at.
        let Some(date) = fields.date_text.as_deref().and_then(parse_date) else {
            progress!(options, "date not found for {file_name}");
            return ProcessingResult::failure(
                &file_name,
                ProcessingStatus::DateNotFound,
                format!(
                    "could not extract date, service returned: '{}'",
                    fields.date_text.as_deref().unwrap_or("")
                ),
            );
        };

        let provider = match fields.provider.as_deref() {
            Some(raw) if !raw.trim().is_empty() => self.matcher.normalize(raw),
            _ => {
                progress!(options, "provider not found for {file_name}");
                return ProcessingResult::failure(
                    &file_name,
                    ProcessingStatus::ProviderNotFound,
                    "could not extract provider name",
                );
            }
        };

        let record = ReceiptRecord {
            provider,
            date,
            original_name: file_name.clone(),
            extension,
        };

        if options.dry_run {
            let preview = naming::preview_name(&record);
            progress!(options, "[dry-run] would rename: {file_name} -> {preview}");
            return ProcessingResult::success(&file_name, preview);
        }

        let new_name = match naming::build_name(&record, &options.output_dir) {
            Ok(name) => name,
            Err(e) => {
                error!("naming failed for {file_name}: {e}");
                return ProcessingResult::failure(
                    &file_name,
                    ProcessingStatus::OcrFailed,
                    e.to_string(),
                );
            }
        };

        let dest = options.output_dir.join(&new_name);
        if let Err(e) = std::fs::rename(file, &dest) {
            error!("move failed for {file_name}: {e}");
            return ProcessingResult::failure(&file_name, ProcessingStatus::OcrFailed, e.to_string());
        }

        progress!(options, "renamed: {file_name} -> {new_name}");
        ProcessingResult::success(&file_name, new_name)
    }

    /// Diagnostic step, not a correctness gate.
    fn validate_batch(&self, options: &ProcessingOptions, results: &[ProcessingResult]) {
        let success_count = results.iter().filter(|r| r.is_success()).count();
        let fail_count = results.len() - success_count;
        progress!(options, "validation: {success_count} succeeded, {fail_count} failed");

        if !options.dry_run && success_count > 0 {
            let output_files = count_files(&options.output_dir);
            let backup_files = count_files(&options.backup_dir);
            progress!(options, "output folder: {output_files} file(s), backup folder: {backup_files} file(s)");
        }
    }
}

#[async_trait]
impl BatchRunner for ProcessingPipeline {
    async fn run_batch(&self, options: &ProcessingOptions) -> Result<Vec<ProcessingResult>> {
        self.process_all(options).await
    }
}

/// Supported images in the directory, in listing order.
fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && ProcessingOptions::is_supported_image(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).count())
        .unwrap_or(0)
}
