//! Ceplote CLI - Main entry point

use ceplote_cli::{Cli, Commands};
use ceplote_common::logging::{init_logging, LogConfig, LogLevel};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging: warnings only on the console unless --verbose
    let log_config = LogConfig {
        level: if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        },
        log_file_prefix: "ceplote-cli".to_string(),
        ..LogConfig::default()
    };

    // Environment variables take precedence
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // Initialize logging (ignore errors as the CLI should work without it)
    let _ = init_logging(&log_config);

    // Execute command
    let result = execute_command(cli).await;

    // Handle result
    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> ceplote_cli::Result<()> {
    let server_url = cli.server_url;

    match cli.command {
        Commands::Upload { file } => ceplote_cli::commands::upload::run(server_url, file).await,

        Commands::Jobs => ceplote_cli::commands::jobs::run(server_url).await,

        Commands::Job { id } => ceplote_cli::commands::job::run(server_url, id).await,

        Commands::Run { watch } => ceplote_cli::commands::run::run(server_url, watch).await,

        Commands::Export { id, output } => {
            ceplote_cli::commands::export::run(server_url, id, output).await
        }

        Commands::Lookup { cep } => ceplote_cli::commands::lookup::run(server_url, cep).await,

        Commands::Providers => ceplote_cli::commands::providers::run(server_url).await,
    }
}
