//! Configured providers

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tfdocs_core::{DocService, ResourceKind};

use crate::output::{OutputFormat, print_json};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderRow {
    name: String,
    resources: usize,
    data_sources: usize,
}

pub fn execute_providers(service: &DocService, format: OutputFormat) -> Result<()> {
    let rows: Vec<ProviderRow> = service
        .registry()
        .providers()
        .map(|provider| {
            let ids = provider.list_resources();
            let data_sources = ids
                .iter()
                .filter(|id| id.kind == ResourceKind::DataSource)
                .count();
            ProviderRow {
                name: provider.name().to_string(),
                resources: ids.len() - data_sources,
                data_sources,
            }
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No providers configured");
            }
            for row in &rows {
                println!(
                    "{}  {} resources, {} data sources",
                    row.name.bold(),
                    row.resources,
                    row.data_sources
                );
            }
            Ok(())
        },
    }
}
