//! Fieldlens CLI - AI-assisted species identification from wildlife photos.
//!
//! Fieldlens sends a photo to a configured vision provider and prints a
//! normalized identification: primary match, alternatives, confidence, and
//! edibility/safety classification.
//!
//! # Usage
//!
//! ```bash
//! # Identify a photo
//! fieldlens identify robin.jpg
//!
//! # With a category hint and JSON output
//! fieldlens identify mushroom.jpg --category fungi --output json
//!
//! # View configuration
//! fieldlens config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Fieldlens - AI-assisted species identification from wildlife photos.
#[derive(Parser, Debug)]
#[command(name = "fieldlens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Identify the species in a photo
    Identify(cli::identify::IdentifyArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match fieldlens_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `fieldlens config path`."
            );
            fieldlens_core::Config::default()
        }
    };
    logging::init(&config.logging, cli.verbose, cli.json_logs);

    tracing::debug!("Fieldlens v{}", fieldlens_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Identify(args) => cli::identify::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
