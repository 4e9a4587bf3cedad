//! Shared helpers for the CLI.

pub mod logging;
