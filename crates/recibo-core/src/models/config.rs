//! Configuration structures for the processing pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::options::ProcessingOptions;

/// Main configuration for recibo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReciboConfig {
    /// Directory scanned for incoming receipt photos.
    pub input_dir: PathBuf,

    /// Directory renamed files are moved into.
    pub output_dir: PathBuf,

    /// Directory holding the backup copy of every original.
    pub backup_dir: PathBuf,

    /// Path of the append-only operation log.
    pub log_file: PathBuf,

    /// Path of the provider alias dictionary (JSON).
    pub dictionary_path: PathBuf,

    /// Compute target names without touching the file system.
    pub dry_run: bool,

    /// Emit per-file progress messages.
    pub verbose: bool,

    /// Vision service API key. Falls back to the GROQ_API_KEY environment
    /// variable when absent.
    pub api_key: Option<String>,

    /// Folder watcher configuration.
    pub watch: WatchConfig,
}

impl Default for ReciboConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("tickets/entrada"),
            output_dir: PathBuf::from("tickets/procesados"),
            backup_dir: PathBuf::from("tickets/backup"),
            log_file: PathBuf::from("tickets/registro.txt"),
            dictionary_path: PathBuf::from("proveedores.json"),
            dry_run: false,
            verbose: true,
            api_key: None,
            watch: WatchConfig::default(),
        }
    }
}

/// Folder watcher timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Interval between input directory scans, in milliseconds.
    pub poll_interval_ms: u64,

    /// Quiescence delay after a new file appears, so the writer can finish.
    pub debounce_ms: u64,

    /// Capacity of the new-file event queue.
    pub queue_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            debounce_ms: 1000,
            queue_capacity: 16,
        }
    }
}

impl ReciboConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Build the immutable per-batch options from this configuration.
    pub fn processing_options(&self) -> ProcessingOptions {
        ProcessingOptions {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            backup_dir: self.backup_dir.clone(),
            log_file: self.log_file.clone(),
            dictionary_path: self.dictionary_path.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ReciboConfig::default();
        config.dry_run = true;
        config.watch.debounce_ms = 250;
        config.save(&path).unwrap();

        let loaded = ReciboConfig::from_file(&path).unwrap();
        assert!(loaded.dry_run);
        assert_eq!(loaded.watch.debounce_ms, 250);
        assert_eq!(loaded.input_dir, PathBuf::from("tickets/entrada"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"input_dir":"fotos"}"#).unwrap();

        let loaded = ReciboConfig::from_file(&path).unwrap();
        assert_eq!(loaded.input_dir, PathBuf::from("fotos"));
        assert!(loaded.verbose);
        assert_eq!(loaded.watch.poll_interval_ms, 2000);
    }
}
