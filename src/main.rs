//! Dermascan - dermatology scan client
//!
#![doc = "Dermascan - dermatology scan client"]
#![doc = "Main entry point for the Dermascan command-line client."]

use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dermascan::cli::Cli;
use dermascan::commands;
use dermascan::config::Config;
use dermascan::error::{user_message, ErrorCategory};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        tracing::debug!("Command failed: {:#}", err);
        eprintln!("{} {}", "Error:".red().bold(), user_message(&err));
        if ErrorCategory::of(&err) == ErrorCategory::Authentication {
            eprintln!("Log in with {}.", "dermascan login".cyan());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load configuration
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| "config/config.yaml".to_string());
    let config = Config::load(&config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    commands::run(cli, config).await
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "dermascan=debug"
    } else {
        "dermascan=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
