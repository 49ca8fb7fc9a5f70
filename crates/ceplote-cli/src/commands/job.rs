//! `ceplote job` command implementation
//!
//! Shows one job in detail, with live throughput numbers while it runs.

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use ceplote_common::types::JobStatus;

use crate::api::ApiClient;
use crate::error::Result;
use crate::output;

/// Show one job
pub async fn run(server_url: String, id: i64) -> Result<()> {
    let client = ApiClient::new(server_url)?;
    let detail = client.get_job(id).await?;
    let job = &detail.job;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);

    table.add_row(vec!["ID".to_string(), job.id.to_string()]);
    table.add_row(vec!["File".to_string(), job.original_filename.clone()]);
    table.add_row(vec!["CEP column".to_string(), job.cep_column.clone()]);
    table.add_row(vec!["ID column".to_string(), job.identifier_column.clone()]);
    table.add_row(vec![
        "Status".to_string(),
        output::status_label(job.status).to_string(),
    ]);
    table.add_row(vec![
        "Records".to_string(),
        output::record_counter(job.processed_records, job.total_records),
    ]);
    table.add_row(vec!["Created".to_string(), output::local_time(job.created_at)]);
    table.add_row(vec![
        "Started".to_string(),
        output::local_time_opt(job.started_at),
    ]);
    table.add_row(vec![
        "Finished".to_string(),
        output::local_time_opt(job.finished_at),
    ]);

    println!();
    println!("{}", table);

    if let Some(progress) = detail.progress {
        println!();
        println!(
            "  {:.0}% complete, {:.1} records/s{}",
            progress.fraction * 100.0,
            progress.records_per_sec,
            progress
                .eta_secs
                .map(|s| format!(", ~{}s remaining", s))
                .unwrap_or_default()
        );
    }

    match job.status {
        JobStatus::Done => {
            println!();
            println!(
                "Download the results with {}",
                format!("'ceplote export {}'", job.id).cyan()
            );
        }
        JobStatus::Failed => {
            println!();
            println!(
                "{} The job failed; batches persisted before the failure are still exportable.",
                "!".yellow()
            );
        }
        _ => {}
    }
    println!();

    Ok(())
}
