//! # Output Formatting
//!
//! Commands build plain data and hand it to one of two renderers:
//!
//! - [`text`]: human-readable output with color
//! - JSON via [`print_json`]: pretty-printed `serde_json` for scripts
//!
//! ```bash
//! tfdocs search vpc --format json | jq '.[].typeName'
//! ```

pub mod text;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for CLI results.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted text.
    #[default]
    Text,
    /// JSON for machine consumption.
    Json,
}

impl OutputFormat {
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Write `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
