//! `ceplote run` command implementation
//!
//! Triggers the next queued job and optionally stays attached until it
//! finishes.

use std::time::Duration;

use colored::Colorize;

use ceplote_common::types::JobStatus;

use crate::api::ApiClient;
use crate::error::{CliError, Result};
use crate::progress;

/// Poll cadence while watching a running job
const WATCH_INTERVAL: Duration = Duration::from_secs(2);

/// Trigger the next queued job
pub async fn run(server_url: String, watch: bool) -> Result<()> {
    let client = ApiClient::new(server_url)?;

    let job = client.run_next().await?;

    println!(
        "{} Job {} started ({}, {} records)",
        "✓".green(),
        job.id,
        job.original_filename,
        job.total_records
    );

    if !watch {
        println!("Follow it with 'ceplote job {}'.", job.id);
        return Ok(());
    }

    let pb = progress::create_job_progress(
        job.total_records.max(0) as u64,
        &format!("Processing job {}", job.id),
    );

    loop {
        tokio::time::sleep(WATCH_INTERVAL).await;

        let detail = client.get_job(job.id).await?;
        pb.set_position(detail.job.processed_records.max(0) as u64);

        match detail.job.status {
            JobStatus::Done => {
                pb.finish_with_message(format!("Job {} done", job.id));
                println!();
                println!(
                    "{} {} record(s) processed. Export with 'ceplote export {}'.",
                    "✓".green(),
                    detail.job.processed_records,
                    job.id
                );
                return Ok(());
            }
            JobStatus::Failed => {
                pb.abandon_with_message(format!("Job {} failed", job.id));
                println!();
                // Nonzero exit so scripts can tell a failed watch apart
                return Err(CliError::JobFailed {
                    id: job.id,
                    processed: detail.job.processed_records,
                });
            }
            _ => {}
        }
    }
}
