//! `ceplote upload` command implementation
//!
//! Submits a spreadsheet to the server, which resolves the columns and
//! queues the job.

use std::path::Path;

use colored::Colorize;

use crate::api::ApiClient;
use crate::error::{CliError, Result};
use crate::progress;

/// Upload a file and queue it as a job
pub async fn run(server_url: String, file: String) -> Result<()> {
    let path = Path::new(&file);
    if !path.exists() {
        return Err(CliError::FileNotFound(file));
    }

    let client = ApiClient::new(server_url)?;

    let spinner = progress::create_spinner(&format!("Uploading {}...", path.display()));
    let result = client.upload(path).await;
    spinner.finish_and_clear();

    let job = result?;

    println!("{} Job {} queued", "✓".green(), job.id);
    println!("  File:       {}", job.original_filename);
    println!("  CEP column: {}", job.cep_column);
    println!("  ID column:  {}", job.identifier_column);
    println!("  Records:    {}", job.total_records);
    println!();
    println!("Start it with 'ceplote run'.");

    Ok(())
}
