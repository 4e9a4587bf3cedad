//! HTML to markdown normalization for pages served as rendered HTML.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static DROP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript|head)\b[^>]*>.*?</(?:script|style|noscript|head)>|<!--.*?-->").unwrap()
});

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static PRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<pre\b[^>]*>\s*(?:<code\b(?P<attrs>[^>]*)>)?(?P<code>.*?)(?:</code>)?\s*</pre>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static LANG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)class\s*=\s*["'][^"']*\b(?:language|lang)-(?P<lang>[\w+-]+)"#).unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h(?P<level>[1-6])\b[^>]*>(?P<text>.*?)</h[1-6]\s*>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static LI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<li\b[^>]*>(?P<text>.*?)</li\s*>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<code\b[^>]*>(?P<text>.*?)</code\s*>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static BLOCK_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:p|div|ul|ol|section|article|br)\b[^>]*>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").unwrap());

const CODE_SLOT: char = '\u{1a}';

/// Whether `text` looks like an HTML document rather than markdown.
pub fn looks_like_html(text: &str) -> bool {
    let head: String = text.trim_start().chars().take(512).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html") || head.starts_with("<body")
        || (head.starts_with('<') && (head.contains("<h1") || head.contains("<div") || head.contains("<pre")))
}

/// Convert rendered HTML into the markdown shape the parser understands.
///
/// Code blocks are decoded and set aside before tags are stripped, so
/// their contents survive verbatim.
pub fn to_markdown(html: &str) -> String {
    let text = DROP_RE.replace_all(html, "");

    let mut blocks: Vec<String> = Vec::new();
    let text = PRE_RE.replace_all(&text, |caps: &Captures<'_>| {
        let lang = caps
            .name("attrs")
            .and_then(|attrs| LANG_RE.captures(attrs.as_str()))
            .and_then(|lang| lang.name("lang"))
            .map_or_else(String::new, |m| m.as_str().to_ascii_lowercase());
        let code = caps.name("code").map_or("", |m| m.as_str());
        let code = html_escape::decode_html_entities(&TAG_RE.replace_all(code, "")).into_owned();

        blocks.push(format!("```{lang}\n{}\n```", code.trim_matches('\n')));
        format!("\n\n{CODE_SLOT}{}{CODE_SLOT}\n\n", blocks.len() - 1)
    });

    let text = HEADING_RE.replace_all(&text, |caps: &Captures<'_>| {
        let level = caps
            .name("level")
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .unwrap_or(1);
        let inner = caps.name("text").map_or("", |m| m.as_str());
        format!("\n\n{} {}\n\n", "#".repeat(level), collapse(&TAG_RE.replace_all(inner, "")))
    });

    let text = LI_RE.replace_all(&text, |caps: &Captures<'_>| {
        let inner = caps.name("text").map_or("", |m| m.as_str());
        let inner = CODE_RE.replace_all(inner, "`$text`");
        format!("\n- {}\n", collapse(&TAG_RE.replace_all(&inner, "")))
    });

    let text = CODE_RE.replace_all(&text, "`$text`");
    let text = BLOCK_BREAK_RE.replace_all(&text, "\n\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text).into_owned();
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");

    restore_code_blocks(text.trim(), &blocks)
}

fn restore_code_blocks(text: &str, blocks: &[String]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut parts = text.split(CODE_SLOT);
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    while let Some(slot) = parts.next() {
        match slot.parse::<usize>().ok().and_then(|i| blocks.get(i)) {
            Some(block) => out.push_str(block),
            None => out.push_str(slot),
        }
        if let Some(rest) = parts.next() {
            out.push_str(rest);
        }
    }
    out.push('\n');
    out
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
