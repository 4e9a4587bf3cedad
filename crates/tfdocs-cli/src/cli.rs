//! # CLI Structure and Argument Parsing
//!
//! Command-line interface for `tfdocs`, built with `clap` derive macros.
//!
//! ## Usage Patterns
//!
//! ```bash
//! # Search the catalog of known resources and data sources
//! tfdocs search security_group --limit 5
//!
//! # Structured docs for one resource
//! tfdocs docs resource aws_instance
//!
//! # Example block ready to paste into a .tf file
//! tfdocs example resource aws_instance --index 1
//!
//! # Provider version the docs are served at
//! tfdocs version aws
//! ```
//!
//! ## Output Formats
//!
//! - **text**: Human-readable output (default)
//! - **json**: Machine-readable JSON for scripting and editor integrations

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tfdocs_core::ResourceKind;

use crate::output::OutputFormat;

/// Main CLI structure for the `tfdocs` command
#[derive(Parser, Clone, Debug)]
#[command(name = "tfdocs")]
#[command(version)]
#[command(about = "tfdocs - Terraform provider documentation lookup", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Config file to use instead of `TFDOCS_CONFIG` or the platform default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Search known resource and data source names
    Search {
        /// Full or partial type name; empty lists the whole catalog
        #[arg(default_value = "")]
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Show structured documentation for a resource or data source
    Docs {
        /// `resource` or `data` (also `r`, `d`, `data_source`)
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Full type name, e.g. `aws_instance`
        type_name: String,
    },

    /// Print an example block for insertion into a configuration
    Example {
        /// `resource` or `data` (also `r`, `d`, `data_source`)
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Full type name, e.g. `aws_instance`
        type_name: String,

        /// Zero-based example index; defaults to the primary example
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Show the provider version docs are currently served at
    Version {
        /// Provider name, e.g. `aws`
        provider: String,
    },

    /// List configured providers and their catalog sizes
    Providers,
}

fn parse_kind(value: &str) -> Result<ResourceKind, String> {
    value.parse().map_err(|e: tfdocs_core::Error| e.to_string())
}
