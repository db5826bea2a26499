//! Per-batch processing options.

use std::path::{Path, PathBuf};

/// Image extensions the pipeline picks up, lowercase without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Options for one batch run. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ProcessingOptions {
    /// Directory scanned for incoming receipt photos.
    pub input_dir: PathBuf,

    /// Directory renamed files are moved into.
    pub output_dir: PathBuf,

    /// Directory holding the pristine copy of every original.
    pub backup_dir: PathBuf,

    /// Path of the append-only operation log.
    pub log_file: PathBuf,

    /// Path of the provider alias dictionary (JSON).
    pub dictionary_path: PathBuf,

    /// Compute target names without touching the file system.
    pub dry_run: bool,

    /// Emit per-file progress messages.
    pub verbose: bool,
}

impl ProcessingOptions {
    /// Whether a path has one of the supported image extensions.
    pub fn is_supported_image(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let ext = e.to_lowercase();
                SUPPORTED_EXTENSIONS.iter().any(|s| *s == ext)
            })
            .unwrap_or(false)
    }
}
