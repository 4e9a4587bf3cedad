//! Human-readable renderers.

use colored::Colorize;
use std::fmt::Write as _;
use tfdocs_core::{DocumentRecord, ProviderVersion, SearchHit};

pub fn search_results(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No matches for '{query}'\n");
    }

    let width = hits
        .iter()
        .map(|hit| hit.display_name.len())
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    for hit in hits {
        let _ = writeln!(
            out,
            "{:<width$}  {}",
            hit.display_name.bold(),
            hit.identifier.kind.to_string().dimmed(),
        );
    }
    out
}

pub fn document(record: &DocumentRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", record.title.bold());
    if let Some(subcategory) = &record.subcategory {
        let _ = writeln!(out, "{}", subcategory.dimmed());
    }
    let _ = writeln!(
        out,
        "{} {}",
        "version".dimmed(),
        record.source_version.as_str().cyan()
    );

    if !record.description.is_empty() {
        let _ = writeln!(out, "\n{}", record.description);
    }

    if !record.arguments.is_empty() {
        let _ = writeln!(out, "\n{}", "Arguments".green().bold());
        for arg in &record.arguments {
            let flag = if arg.required {
                "required".yellow()
            } else {
                "optional".dimmed()
            };
            let _ = write!(out, "  {} ({flag}", arg.name.bold());
            if let Some(ty) = &arg.arg_type {
                let _ = write!(out, ", {ty}");
            }
            let _ = writeln!(out, ")");
            if !arg.description.is_empty() {
                let _ = writeln!(out, "      {}", arg.description);
            }
        }
    }

    if !record.attributes.is_empty() {
        let _ = writeln!(out, "\n{}", "Attributes".green().bold());
        for attr in &record.attributes {
            let _ = writeln!(out, "  {}", attr.name.bold());
            if !attr.description.is_empty() {
                let _ = writeln!(out, "      {}", attr.description);
            }
        }
    }

    let _ = writeln!(
        out,
        "\n{} example(s); `tfdocs example {} {}` prints the first",
        record.examples.len(),
        record.identifier.kind,
        record.identifier.type_name()
    );
    out
}

pub fn version(version: &ProviderVersion) -> String {
    format!(
        "{} {} {}\n",
        version.provider.bold(),
        version.version.to_string().cyan(),
        format!("({:?}, resolved {})", version.channel, version.resolved_at.to_rfc3339())
            .dimmed()
    )
}
