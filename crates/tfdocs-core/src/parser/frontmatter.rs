use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::debug;

/// Leading `---` YAML block of a provider docs page
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static FRONT_MATTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\u{feff}?---\r?\n(?s)(?P<yaml>.*?)\r?\n---[ \t]*(?:\r?\n|\z)").unwrap());

/// Metadata header of a provider docs page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FrontMatter {
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub page_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Split `text` into its front matter and the remaining body.
///
/// The block is removed from the body even when its YAML does not parse;
/// in that case the metadata is `None`.
pub fn split(text: &str) -> (Option<FrontMatter>, &str) {
    let Some(caps) = FRONT_MATTER_RE.captures(text) else {
        return (None, text);
    };
    let end = caps.get(0).map_or(0, |m| m.end());
    let yaml = caps.name("yaml").map_or("", |m| m.as_str());

    let meta = match serde_yaml::from_str::<FrontMatter>(yaml) {
        Ok(meta) => Some(meta),
        Err(e) => {
            debug!("ignoring malformed front matter: {e}");
            None
        },
    };
    (meta, &text[end..])
}
