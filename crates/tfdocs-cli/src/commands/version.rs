//! Resolved provider version

use anyhow::Result;
use tfdocs_core::DocService;

use crate::output::{OutputFormat, print_json, text};

pub async fn execute_version(
    service: &DocService,
    provider: &str,
    format: OutputFormat,
) -> Result<()> {
    let version = service.resolve_version(provider).await?;

    match format {
        OutputFormat::Json => print_json(&version),
        OutputFormat::Text => {
            print!("{}", text::version(&version));
            Ok(())
        },
    }
}
