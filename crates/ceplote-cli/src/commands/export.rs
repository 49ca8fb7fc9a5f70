//! `ceplote export` command implementation
//!
//! Downloads a job's results CSV to a local file.

use colored::Colorize;

use crate::api::ApiClient;
use crate::error::Result;
use crate::progress;

/// Download a job's results
pub async fn run(server_url: String, id: i64, output: Option<String>) -> Result<()> {
    let client = ApiClient::new(server_url)?;

    let spinner = progress::create_spinner(&format!("Exporting job {}...", id));
    let result = client.export(id).await;
    spinner.finish_and_clear();

    let bytes = result?;
    let path = output.unwrap_or_else(|| format!("job-{}-resultados.csv", id));

    tokio::fs::write(&path, &bytes).await?;

    // Header line plus data rows
    let rows = bytes.iter().filter(|b| **b == b'\n').count().saturating_sub(1);
    println!("{} Wrote {} row(s) to {}", "✓".green(), rows, path);

    Ok(())
}
