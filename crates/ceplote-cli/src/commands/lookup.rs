//! `ceplote lookup` command implementation
//!
//! Queries one CEP against every provider and shows the answers side by
//! side.

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use crate::api::ApiClient;
use crate::error::Result;

/// Look up one CEP across every provider
pub async fn run(server_url: String, cep: String) -> Result<()> {
    let client = ApiClient::new(server_url)?;
    let lookup = client.lookup(&cep).await?;

    println!();
    println!("CEP {}", lookup.cep.bold());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            "Provider", "Status", "Street", "Neighborhood", "City", "State", "Latency",
        ]);

    for answer in &lookup.answers {
        let address = answer.address.clone().unwrap_or_default();
        let status = match answer.status.as_str() {
            "Sucesso" => answer.status.green().to_string(),
            "Não encontrado" => answer.status.yellow().to_string(),
            _ => answer.status.red().to_string(),
        };

        table.add_row(vec![
            answer.provider.clone(),
            status,
            address.street.unwrap_or_else(|| "-".to_string()),
            address.neighborhood.unwrap_or_else(|| "-".to_string()),
            address.city.unwrap_or_else(|| "-".to_string()),
            address.state.unwrap_or_else(|| "-".to_string()),
            format!("{} ms", answer.latency_ms),
        ]);
    }

    println!("{}", table);
    println!();

    Ok(())
}
