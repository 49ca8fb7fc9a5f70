//! `ceplote providers` command implementation
//!
//! Shows the provider health dashboard.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use crate::api::ApiClient;
use crate::error::Result;
use crate::output;

/// Show provider health
pub async fn run(server_url: String) -> Result<()> {
    let client = ApiClient::new(server_url)?;
    let providers = client.provider_status().await?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Provider", "State", "Latency"]);

    for health in &providers {
        table.add_row(vec![
            health.provider.clone(),
            output::provider_state_label(health.state).to_string(),
            format!("{} ms", health.latency_ms),
        ]);
    }

    println!();
    println!("{}", table);
    println!();

    Ok(())
}
