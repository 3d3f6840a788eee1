//! Inspect command - extract a single file and show what would be committed.

use std::path::PathBuf;

use clap::Args;
use console::style;

use faturex_core::extract::{SourceDocument, strategy_for};
use faturex_core::models::record::InvoiceRecord;
use faturex_core::pipeline::acquire;

use super::load_config;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input file (.pdf or .xml)
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text summary
    Text,
    /// JSON output
    Json,
}

/// Dry run of the per-file pipeline: no ledger row, no file move.
pub fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let doc = match acquire(&args.input)? {
        Some(doc) => doc,
        None => anyhow::bail!("Unsupported file format: {}", args.input.display()),
    };

    let strategy = strategy_for(&doc);
    let raw = strategy.extract(&doc);

    let distributor = match &doc {
        SourceDocument::Text(_) => &config.extraction.pdf_distributor,
        SourceDocument::Tree(_) => &config.extraction.xml_distributor,
    };
    let filename = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    println!(
        "{} Strategy: {}, {} fields extracted",
        style("ℹ").blue(),
        strategy.name(),
        raw.len()
    );
    println!();

    match InvoiceRecord::from_raw(&raw, distributor, filename) {
        Ok(record) => match args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
            OutputFormat::Text => print!("{}", format_record(&record)),
        },
        Err(e) => {
            println!("{} Record would be rejected: {}", style("✗").red(), e);
            if !raw.is_empty() {
                println!();
                println!("Raw fields found:");
                for (key, value) in raw.iter() {
                    println!("  {}: {}", key, value);
                }
            }
        }
    }

    Ok(())
}

fn format_record(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", record.document_number));
    output.push_str(&format!("Issuer CNPJ: {}\n", record.tax_id));
    output.push_str(&format!("Issued: {}\n", record.issue_date));
    output.push_str(&format!(
        "Period: {} to {}\n",
        record.period_start, record.period_end
    ));
    output.push_str("\n");

    output.push_str("Amounts:\n");
    output.push_str(&format!("  Total: {}\n", record.total_amount));
    output.push_str(&format!("  Volume: {} m3\n", record.total_volume));
    output.push_str(&format!("  ICMS: {}\n", record.icms_tax_amount));
    if !record.pcs_correction.is_empty() {
        output.push_str(&format!("  PCS correction: {}\n", record.pcs_correction));
    }
    output.push_str("\n");

    output.push_str(&format!("Distributor: {}\n", record.distributor));

    output
}
