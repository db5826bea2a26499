//! Watch command - process new receipts as they appear.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;

use recibo_core::{FolderWatcher, WatcherConfig};

use super::BatchArgs;

/// Arguments for the watch command.
#[derive(Args)]
pub struct WatchArgs {
    #[command(flatten)]
    batch: BatchArgs,
}

pub async fn run(args: WatchArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let config = super::load_config(config_path, &args.batch)?;
    let options = config.processing_options();

    let Some(api_key) = super::resolve_api_key(&config) else {
        eprintln!(
            "{} No Groq API key configured. Set GROQ_API_KEY or add \"api_key\" to the config file.",
            style("✗").red()
        );
        return Ok(ExitCode::from(2));
    };

    let pipeline = Arc::new(super::build_pipeline(&config, &options, api_key)?);

    println!(
        "{} Watching {} - press Ctrl+C to stop",
        style("ℹ").blue(),
        options.input_dir.display()
    );

    // Process any files that are already waiting. This must finish before
    // the watcher starts: the poller raises triggers for pre-existing files,
    // and only batches it starts itself go through its single-flight guard.
    let start = Instant::now();
    match pipeline.process_all(&options).await {
        Ok(results) if !results.is_empty() => {
            super::run::report(&results, start);
        }
        Ok(_) => {}
        Err(e) => eprintln!("{} Initial batch failed: {e}", style("✗").red()),
    }

    let mut watcher = FolderWatcher::new(
        pipeline.clone(),
        options.clone(),
        WatcherConfig::from(&config.watch),
    );
    watcher.start();

    tokio::signal::ctrl_c().await?;
    println!();
    println!("{} Stopping watcher", style("ℹ").blue());
    watcher.stop();

    Ok(ExitCode::SUCCESS)
}
