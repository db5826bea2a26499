//! Run command - process all pending receipts once.

use std::process::ExitCode;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use recibo_core::{ProcessingResult, ProcessingStatus};

use super::BatchArgs;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    batch: BatchArgs,
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let start = Instant::now();

    let config = super::load_config(config_path, &args.batch)?;
    let options = config.processing_options();

    let Some(api_key) = super::resolve_api_key(&config) else {
        eprintln!(
            "{} No Groq API key configured. Set GROQ_API_KEY or add \"api_key\" to the config file.",
            style("✗").red()
        );
        return Ok(ExitCode::from(2));
    };

    let pipeline = super::build_pipeline(&config, &options, api_key)?;

    println!("  Entrada:    {}", options.input_dir.display());
    println!("  Procesados: {}", options.output_dir.display());
    println!("  Backup:     {}", options.backup_dir.display());
    println!("  Registro:   {}", options.log_file.display());
    if options.dry_run {
        println!("  {}", style("[dry-run] no files will be moved").yellow());
    }
    println!();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message("processing receipts...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcome = pipeline.process_all(&options).await;
    spinner.finish_and_clear();

    let results = match outcome {
        Ok(results) => results,
        Err(e) => {
            eprintln!("{} Critical error: {e}", style("✗").red());
            return Ok(ExitCode::from(2));
        }
    };

    Ok(report(&results, start))
}

/// Print the batch summary and map it to the process exit code:
/// 0 all succeeded, 1 some failed, 2 a backup failure occurred.
pub fn report(results: &[ProcessingResult], start: Instant) -> ExitCode {
    let success_count = results.iter().filter(|r| r.is_success()).count();
    let fail_count = results.len() - success_count;

    println!(
        "{} Processed {} file(s) in {:?}: {} succeeded, {} failed",
        style("✓").green(),
        results.len(),
        start.elapsed(),
        style(success_count).green(),
        style(fail_count).red(),
    );

    for result in results.iter().filter(|r| !r.is_success()) {
        println!(
            "  {} {} - {}: {}",
            style("✗").red(),
            result.original_name,
            result.status,
            result.error.as_deref().unwrap_or("unknown error"),
        );
    }

    if results.iter().any(|r| r.status == ProcessingStatus::BackupFailed) {
        ExitCode::from(2)
    } else if fail_count > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
