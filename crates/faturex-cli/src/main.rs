//! CLI application for utility invoice intake.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, inspect, run};

/// Utility invoice intake - extract gas bill fields into a CSV ledger
#[derive(Parser)]
#[command(name = "faturex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every file in the inbox: extract, deduplicate, commit, archive
    Run(run::RunArgs),

    /// Extract a single file and show the record, without touching the ledger
    Inspect(inspect::InspectArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Run(args) => run::run(args, cli.config.as_deref()),
        Commands::Inspect(args) => inspect::run(args, cli.config.as_deref()),
        Commands::Config(args) => config::run(args),
    }
}
