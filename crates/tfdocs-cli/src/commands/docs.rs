//! Structured docs for one resource or data source

use anyhow::Result;
use tfdocs_core::{DocService, ResourceKind};

use crate::output::{OutputFormat, print_json, text};

pub async fn execute_docs(
    service: &DocService,
    kind: ResourceKind,
    type_name: &str,
    format: OutputFormat,
) -> Result<()> {
    let record = service.get_docs(kind, type_name).await?;

    match format {
        OutputFormat::Json => print_json(record.as_ref()),
        OutputFormat::Text => {
            print!("{}", text::document(&record));
            Ok(())
        },
    }
}
