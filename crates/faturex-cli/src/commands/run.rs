//! Run command - process the inbox against the ledger.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use faturex_core::models::config::FaturexConfig;
use faturex_core::pipeline::{BatchReport, FileOutcome, FileReport, Pipeline, SkipReason};

use super::load_config;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Inbox directory with .pdf/.xml invoices (overrides config)
    #[arg(short, long)]
    inbox: Option<PathBuf>,

    /// Directory committed files are moved to (overrides config)
    #[arg(short, long)]
    archive: Option<PathBuf>,

    /// Ledger CSV file (overrides config)
    #[arg(short, long)]
    ledger: Option<PathBuf>,
}

pub fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(inbox) = args.inbox {
        config.paths.inbox_dir = inbox;
    }
    if let Some(archive) = args.archive {
        config.paths.archive_dir = archive;
    }
    if let Some(ledger) = args.ledger {
        config.paths.ledger_file = ledger;
    }

    println!(
        "{} Batch started {}",
        style("ℹ").blue(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let pipeline = Pipeline::new(&config);
    let files = pipeline
        .inbox_files()
        .with_context(|| format!("reading inbox {}", config.paths.inbox_dir.display()))?;

    if files.is_empty() {
        println!(
            "{} Inbox {} is empty, nothing to do.",
            style("ℹ").blue(),
            config.paths.inbox_dir.display()
        );
        return Ok(());
    }

    println!(
        "{} Found {} files in {}",
        style("ℹ").blue(),
        files.len(),
        config.paths.inbox_dir.display()
    );

    // Set up progress bar
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut report = BatchReport::default();
    for path in files {
        // A ledger failure aborts the batch; everything else is per-file.
        let outcome = pipeline
            .process_file(&path)
            .with_context(|| format!("ledger failure while processing {}", path.display()))?;
        report.files.push(FileReport { path, outcome });
        pb.inc(1);
    }
    pb.finish_and_clear();

    for file in &report.files {
        print_outcome(file);
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        report.total(),
        start.elapsed()
    );
    println!(
        "   {} committed, {} duplicates, {} rejected, {} ignored",
        style(report.committed()).green(),
        style(report.duplicates()).yellow(),
        style(report.rejected()).red(),
        report.ignored()
    );
    println!("   Ledger: {}", config.paths.ledger_file.display());

    let failures = report.archive_failures();
    if !failures.is_empty() {
        println!();
        println!(
            "{}",
            style("ARCHIVE FAILURES - rows committed but files still in the inbox:")
                .red()
                .bold()
        );
        for file in failures {
            if let FileOutcome::CommittedUnarchived { error, .. } = &file.outcome {
                println!("  - {}: {}", file.path.display(), error);
            }
        }
        println!("  Move these files out of the inbox by hand before the next run.");
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_outcome(file: &FileReport) {
    let name = file
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("?");

    match &file.outcome {
        FileOutcome::Committed { record } => {
            println!(
                "  {} {} committed invoice {} ({})",
                style("✓").green(),
                name,
                record.document_number,
                record.total_amount
            );
        }
        FileOutcome::CommittedUnarchived { record, .. } => {
            println!(
                "  {} {} committed invoice {} but NOT archived",
                style("!").red(),
                name,
                record.document_number
            );
        }
        FileOutcome::Skipped(reason) => {
            let mark = match reason {
                SkipReason::Duplicate => style("·").yellow(),
                SkipReason::UnsupportedExtension(_) => style("·").dim(),
                _ => style("✗").red(),
            };
            println!("  {} {} skipped: {}", mark, name, reason);
        }
    }
}
