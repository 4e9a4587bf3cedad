//! In-memory catalog of known resource and data source names.
//!
//! The index is derived data: it is rebuilt from provider catalogs whenever
//! needed and never persisted. Results are ordered by match tier
//! ([`MatchTier`]), then by tier score, then by type name and kind.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::ResourceIdentifier;

/// One searchable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub identifier: ResourceIdentifier,
    /// Full type name, e.g. `aws_instance`.
    pub display_name: String,
    /// Lowercase words of the type name.
    pub tokens: Vec<String>,
}

impl IndexEntry {
    pub fn new(identifier: ResourceIdentifier) -> Self {
        let display_name = identifier.type_name();
        let tokens = tokenize(&display_name);
        Self {
            identifier,
            display_name,
            tokens,
        }
    }
}

/// How a query matched an entry. Lower tiers rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Prefix,
    Substring,
    TokenOverlap,
    Fuzzy,
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub identifier: ResourceIdentifier,
    pub display_name: String,
    pub tier: MatchTier,
    /// Tier-specific score; higher is better (overlapping tokens or fuzzy score).
    pub score: i64,
}

/// Searchable catalog of resource identifiers
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    /// Sorted by type name, then kind.
    entries: Vec<IndexEntry>,
}

impl CatalogIndex {
    /// Build from identifiers; duplicates collapse to one entry.
    pub fn build(identifiers: impl IntoIterator<Item = ResourceIdentifier>) -> Self {
        let unique: BTreeSet<ResourceIdentifier> = identifiers.into_iter().collect();
        let mut entries: Vec<IndexEntry> = unique.into_iter().map(IndexEntry::new).collect();
        entries.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then(a.identifier.kind.cmp(&b.identifier.kind))
        });
        debug!(entries = entries.len(), "built catalog index");
        Self { entries }
    }

    /// Number of indexed identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Ranked identifiers for `query`. An empty query lists the whole catalog.
    pub fn search(&self, query: &str) -> Vec<ResourceIdentifier> {
        self.search_ranked(query)
            .into_iter()
            .map(|hit| hit.identifier)
            .collect()
    }

    /// Like [`search`](Self::search), truncated to `limit` results.
    pub fn search_with_limit(&self, query: &str, limit: usize) -> Vec<ResourceIdentifier> {
        let mut results = self.search(query);
        results.truncate(limit);
        results
    }

    /// Ranked hits with their tier and score.
    pub fn search_ranked(&self, query: &str) -> Vec<SearchHit> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self
                .entries
                .iter()
                .map(|entry| hit(entry, MatchTier::Exact, 0))
                .collect();
        }

        let matcher = SkimMatcherV2::default();
        let query_tokens = tokenize(&query);

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let (tier, score) = classify(entry, &query, &query_tokens, &matcher)?;
                Some(hit(entry, tier, score))
            })
            .collect();

        // stable: equal tier and score keep catalog order
        hits.sort_by(|a, b| a.tier.cmp(&b.tier).then(b.score.cmp(&a.score)));
        hits
    }
}

fn hit(entry: &IndexEntry, tier: MatchTier, score: i64) -> SearchHit {
    SearchHit {
        identifier: entry.identifier.clone(),
        display_name: entry.display_name.clone(),
        tier,
        score,
    }
}

fn classify(
    entry: &IndexEntry,
    query: &str,
    query_tokens: &[String],
    matcher: &SkimMatcherV2,
) -> Option<(MatchTier, i64)> {
    let full = entry.display_name.to_lowercase();
    let short = entry.identifier.name.to_lowercase();

    if full == query || short == query {
        return Some((MatchTier::Exact, 0));
    }
    if full.starts_with(query) || short.starts_with(query) {
        return Some((MatchTier::Prefix, 0));
    }
    if full.contains(query) {
        return Some((MatchTier::Substring, 0));
    }

    // the provider prefix is shared by every entry of a provider
    let overlap = query_tokens
        .iter()
        .filter(|token| **token != entry.identifier.provider && entry.tokens.contains(token))
        .count();
    if overlap > 0 {
        return Some((MatchTier::TokenOverlap, i64::try_from(overlap).unwrap_or(i64::MAX)));
    }

    matcher
        .fuzzy_match(&full, query)
        .map(|score| (MatchTier::Fuzzy, score))
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ResourceKind;
    use proptest::prelude::*;

    fn resource(name: &str) -> ResourceIdentifier {
        ResourceIdentifier::new("aws", ResourceKind::Resource, name)
    }

    fn data(name: &str) -> ResourceIdentifier {
        ResourceIdentifier::new("aws", ResourceKind::DataSource, name)
    }

    fn catalog() -> CatalogIndex {
        CatalogIndex::build([
            resource("instance"),
            resource("spot_instance_request"),
            resource("ec2_instance_state"),
            resource("security_group"),
            resource("security_group_rule"),
            resource("s3_bucket"),
            data("instance"),
            data("ami"),
            resource("ami"),
        ])
    }

    fn names(results: &[ResourceIdentifier]) -> Vec<String> {
        results
            .iter()
            .map(|id| format!("{}:{}", id.kind.docs_dir(), id.type_name()))
            .collect()
    }

    #[test]
    fn test_empty_query_lists_catalog_in_order() {
        let index = catalog();
        let all = index.search("");
        assert_eq!(all.len(), 9);
        assert_eq!(
            names(&all)[..4],
            ["r:aws_ami", "d:aws_ami", "r:aws_ec2_instance_state", "r:aws_instance"]
        );
        assert_eq!(all, index.search("   "));
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let results = catalog().search("aws_instance");
        assert_eq!(
            names(&results)[..3],
            ["r:aws_instance", "d:aws_instance", "r:aws_ec2_instance_state"]
        );

        // short names count as exact too
        let results = catalog().search("Security_Group");
        assert_eq!(results[0], resource("security_group"));
        assert_eq!(results[1], resource("security_group_rule"));
    }

    #[test]
    fn test_tiers() {
        let hits = catalog().search_ranked("instance");
        let tiers: Vec<_> = hits.iter().map(|h| (h.display_name.as_str(), h.tier)).collect();
        assert_eq!(
            tiers,
            [
                ("aws_instance", MatchTier::Exact),
                ("aws_instance", MatchTier::Exact),
                ("aws_ec2_instance_state", MatchTier::Substring),
                ("aws_spot_instance_request", MatchTier::Substring),
            ]
        );
    }

    #[test]
    fn test_token_overlap_and_fuzzy() {
        let hits = catalog().search_ranked("group security");
        assert_eq!(hits[0].tier, MatchTier::TokenOverlap);
        assert_eq!(hits[0].score, 2);
        assert_eq!(hits[0].display_name, "aws_security_group");

        let hits = catalog().search_ranked("sgrule");
        assert_eq!(hits[0].display_name, "aws_security_group_rule");
        assert_eq!(hits[0].tier, MatchTier::Fuzzy);
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(catalog().search("kubernetes").is_empty());
        assert!(CatalogIndex::default().search("").is_empty());
    }

    #[test]
    fn test_limit_and_duplicates() {
        let index = CatalogIndex::build([resource("vpc"), resource("vpc"), resource("subnet")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.search_with_limit("", 1), [resource("subnet")]);
    }

    fn arb_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,6}(_[a-z0-9]{1,6}){0,2}"
    }

    proptest! {
        #[test]
        fn prop_empty_search_is_stable(names in prop::collection::vec(arb_name(), 0..40)) {
            let ids: Vec<_> = names.iter().map(|n| resource(n)).collect();
            let forward = CatalogIndex::build(ids.clone());
            let reversed = CatalogIndex::build(ids.into_iter().rev());

            let listed = forward.search("");
            prop_assert_eq!(&listed, &forward.search(""));
            prop_assert_eq!(&listed, &reversed.search(""));
            prop_assert!(listed.windows(2).all(|w| w[0].type_name() <= w[1].type_name()));
        }

        #[test]
        fn prop_exact_name_ranks_first(
            names in prop::collection::vec(arb_name(), 1..40),
            pick in any::<prop::sample::Index>(),
        ) {
            let target = pick.get(&names).clone();
            let index = CatalogIndex::build(names.iter().map(|n| resource(n)));

            let hits = index.search_ranked(&format!("aws_{target}"));
            prop_assert_eq!(hits[0].tier, MatchTier::Exact);
            let exact: Vec<_> = hits
                .iter()
                .take_while(|hit| hit.tier == MatchTier::Exact)
                .map(|hit| hit.identifier.clone())
                .collect();
            prop_assert!(exact.contains(&resource(&target)));
        }
    }
}
