//! CLI subcommands.

pub mod config;
pub mod run;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use recibo_core::{
    FileOperationLog, FsBackupStore, ProcessingOptions, ProviderDictionary, ProviderMatcher,
    ProcessingPipeline, ReciboConfig,
};

use crate::vision::GroqVisionClient;

/// Option overrides shared by `run` and `watch`.
#[derive(Args, Clone)]
pub struct BatchArgs {
    /// Compute target names without touching the file system
    #[arg(long)]
    pub dry_run: bool,

    /// Input folder (overrides config)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output folder (overrides config)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Backup folder (overrides config)
    #[arg(long)]
    pub backup: Option<PathBuf>,

    /// Operation log path (overrides config)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Provider dictionary path (overrides config)
    #[arg(long)]
    pub dictionary: Option<PathBuf>,
}

/// Load configuration from an explicit path, the default location, or
/// defaults, then apply CLI overrides.
pub fn load_config(config_path: Option<&str>, args: &BatchArgs) -> anyhow::Result<ReciboConfig> {
    let mut config = if let Some(path) = config_path {
        ReciboConfig::from_file(std::path::Path::new(path))?
    } else {
        let default_path = config::default_config_path();
        if default_path.exists() {
            ReciboConfig::from_file(&default_path)?
        } else {
            ReciboConfig::default()
        }
    };

    if args.dry_run {
        config.dry_run = true;
    }
    if let Some(input) = &args.input {
        config.input_dir = input.clone();
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(backup) = &args.backup {
        config.backup_dir = backup.clone();
    }
    if let Some(log) = &args.log {
        config.log_file = log.clone();
    }
    if let Some(dictionary) = &args.dictionary {
        config.dictionary_path = dictionary.clone();
    }

    Ok(config)
}

/// API key from config or the GROQ_API_KEY environment variable.
pub fn resolve_api_key(config: &ReciboConfig) -> Option<String> {
    config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var("GROQ_API_KEY").ok().filter(|k| !k.trim().is_empty()))
}

/// Wire up the pipeline with its real collaborators.
pub fn build_pipeline(
    config: &ReciboConfig,
    options: &ProcessingOptions,
    api_key: String,
) -> anyhow::Result<ProcessingPipeline> {
    let dictionary = ProviderDictionary::load(&config.dictionary_path)?;

    Ok(ProcessingPipeline::new(
        Arc::new(GroqVisionClient::new(api_key)),
        Arc::new(FsBackupStore::new()),
        Arc::new(FileOperationLog::new(options.log_file.clone())),
        ProviderMatcher::new(dictionary),
    ))
}
