//! Command implementations.
//!
//! Each command builds a [`DocService`] from configuration, runs one lookup,
//! and renders the result in the requested [`OutputFormat`](crate::output::OutputFormat).

mod docs;
mod example;
mod providers;
mod search;
mod version;

pub use docs::execute_docs;
pub use example::execute_example;
pub use providers::execute_providers;
pub use search::execute_search;
pub use version::execute_version;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tfdocs_core::transport::HttpTransport;
use tfdocs_core::{Config, DocService};

/// Build the service from `--config`, `TFDOCS_CONFIG`, or the platform default.
pub fn build_service(config_path: Option<&Path>) -> Result<DocService> {
    let config = match config_path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };

    let transport = HttpTransport::with_timeout(config.docs.timeout())?;
    Ok(DocService::from_config(&config, Arc::new(transport))?)
}
