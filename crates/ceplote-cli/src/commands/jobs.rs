//! `ceplote jobs` command implementation
//!
//! Lists all jobs, newest first.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use crate::api::ApiClient;
use crate::error::Result;
use crate::output;

/// List all jobs
pub async fn run(server_url: String) -> Result<()> {
    let client = ApiClient::new(server_url)?;
    let jobs = client.list_jobs().await?;

    if jobs.is_empty() {
        println!("No jobs yet.");
        println!("Queue one with 'ceplote upload <file>'.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["ID", "File", "Status", "Records", "Created"]);

    for job in &jobs {
        table.add_row(vec![
            job.id.to_string(),
            job.original_filename.clone(),
            output::status_label(job.status).to_string(),
            output::record_counter(job.processed_records, job.total_records),
            output::local_time(job.created_at),
        ]);
    }

    println!();
    println!("{}", table);
    println!();
    println!("{} job(s). Inspect one with 'ceplote job <id>'.", jobs.len());

    Ok(())
}
