/// Phrases shown by client-rendered shells instead of content.
const PLACEHOLDER_PHRASES: &[&str] = &[
    "enable javascript",
    "javascript is required",
    "javascript is disabled",
    "requires javascript",
    "turn on javascript",
    "javascript must be enabled",
];

/// Markers that only appear on real provider documentation.
const DOC_MARKERS: &[&str] = &[
    "```",
    "argument reference",
    "arguments reference",
    "attribute reference",
    "attributes reference",
    "example usage",
    "## schema",
];

/// Returns the reason when `text` is a JavaScript-required placeholder page.
pub fn placeholder_reason(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    if DOC_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return None;
    }

    if let Some(phrase) = PLACEHOLDER_PHRASES.iter().find(|p| lower.contains(*p)) {
        return Some(format!("client-rendered placeholder page (\"{phrase}\")"));
    }

    if lower.contains("<noscript") {
        return Some("client-rendered page with <noscript> fallback and no documentation".into());
    }

    None
}
