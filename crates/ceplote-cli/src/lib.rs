//! Ceplote CLI Library
//!
//! Command-line interface for the Ceplote enrichment server.
//!
//! # Overview
//!
//! The CLI drives the server's job queue and lookup endpoints:
//!
//! - **Upload**: Submit a spreadsheet as a new job (`ceplote upload`)
//! - **Queue**: List jobs and inspect one (`ceplote jobs`, `ceplote job`)
//! - **Execution**: Trigger the next queued job (`ceplote run`)
//! - **Export**: Download the enriched CSV (`ceplote export`)
//! - **Lookup**: Compare one CEP across providers (`ceplote lookup`)
//! - **Health**: Provider status dashboard (`ceplote providers`)

pub mod api;
pub mod commands;
pub mod error;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use api::ApiClient;
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};

/// Ceplote - CEP batch enrichment
#[derive(Parser, Debug)]
#[command(name = "ceplote")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server URL
    #[arg(
        long,
        env = "CEPLOTE_SERVER_URL",
        default_value = "http://localhost:8080",
        global = true
    )]
    pub server_url: String,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a spreadsheet and queue it as a job
    Upload {
        /// Path to the CSV file
        file: String,
    },

    /// List all jobs, newest first
    Jobs,

    /// Show one job in detail
    Job {
        /// Job id
        id: i64,
    },

    /// Trigger the next queued job
    Run {
        /// Stay attached and report progress until the job finishes
        #[arg(short, long)]
        watch: bool,
    },

    /// Download a job's results as CSV
    Export {
        /// Job id
        id: i64,

        /// Output file path (defaults to job-{id}-resultados.csv)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Look up one CEP across every provider
    Lookup {
        /// The postal code, with or without formatting
        cep: String,
    },

    /// Show provider health
    Providers,
}
