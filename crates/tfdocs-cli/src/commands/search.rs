//! Catalog search

use anyhow::Result;
use serde::Serialize;
use tfdocs_core::{DocService, MatchTier, SearchHit};

use crate::output::{OutputFormat, print_json, text};

/// One search result as emitted in JSON
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRow<'a> {
    type_name: &'a str,
    provider: &'a str,
    kind: String,
    tier: MatchTier,
    score: i64,
}

impl<'a> From<&'a SearchHit> for SearchRow<'a> {
    fn from(hit: &'a SearchHit) -> Self {
        Self {
            type_name: &hit.display_name,
            provider: &hit.identifier.provider,
            kind: hit.identifier.kind.to_string(),
            tier: hit.tier,
            score: hit.score,
        }
    }
}

pub fn execute_search(
    service: &DocService,
    query: &str,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let hits: Vec<SearchHit> = service.search_ranked(query).into_iter().take(limit).collect();

    match format {
        OutputFormat::Json => {
            let rows: Vec<SearchRow<'_>> = hits.iter().map(SearchRow::from).collect();
            print_json(&rows)
        },
        OutputFormat::Text => {
            print!("{}", text::search_results(query, &hits));
            Ok(())
        },
    }
}
