//! Example block for insertion

use anyhow::Result;
use tfdocs_core::{DocService, ResourceKind};

use crate::output::{OutputFormat, print_json};

/// Print the chosen example. Text output is the bare source, ready to paste.
pub async fn execute_example(
    service: &DocService,
    kind: ResourceKind,
    type_name: &str,
    index: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let example = service.example(kind, type_name, index).await?;

    match format {
        OutputFormat::Json => print_json(&example),
        OutputFormat::Text => {
            println!("{}", example.source);
            Ok(())
        },
    }
}
