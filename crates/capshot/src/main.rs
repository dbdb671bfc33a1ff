//! Capshot CLI - Batch image captioning via a hosted inference endpoint.
//!
//! Capshot scans a directory for images without `.txt` caption sidecars,
//! sends each to a serverless captioning endpoint with bounded retries, and
//! writes the returned captions next to the images.
//!
//! # Usage
//!
//! ```bash
//! # Caption everything in a directory that still needs it
//! capshot caption ./photos/
//!
//! # Use the submit-and-poll endpoint variant
//! capshot caption ./photos/ --poll
//!
//! # Probe the endpoint before a long run
//! capshot check
//!
//! # View configuration
//! capshot config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Capshot - Batch image captioning via a hosted inference endpoint.
#[derive(Parser, Debug)]
#[command(name = "capshot")]
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
    /// Caption images that lack a sidecar
    Caption(cli::caption::CaptionArgs),

    /// Probe the endpoint's health route
    Check(cli::check::CheckArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match capshot_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `capshot config path`."
            );
            capshot_core::Config::default()
        }
    };
    logging::init(&config.logging, cli.verbose, cli.json_logs);

    tracing::debug!("Capshot v{}", capshot_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Caption(args) => cli::caption::execute(args, config).await,
        Commands::Check(args) => cli::check::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
