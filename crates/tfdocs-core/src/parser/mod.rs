//! Provider documentation parsing.
//!
//! Turns a raw provider docs page (markdown, or HTML normalized to markdown)
//! into a [`DocumentRecord`]. Parsing is best-effort: missing optional
//! sections yield empty sequences. Two outcomes are hard failures:
//!
//! - [`Error::UnsupportedContent`] for client-rendered placeholder pages
//! - [`Error::ParseFailed`] when the text has neither a heading nor a
//!   fenced code block, so it cannot be a docs page

mod detect;
pub mod frontmatter;
mod html;

use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};
use tree_sitter::{Node, Parser, TreeCursor};

use crate::fetcher::FetchedDocument;
use crate::{
    ArgumentDef, AttributeDef, DocumentRecord, Error, ExampleBlock, ResourceIdentifier, Result,
};

pub use frontmatter::FrontMatter;

/// Fence languages treated as Terraform configuration.
pub const TERRAFORM_LANGUAGES: &[&str] = &["terraform", "hcl", "tf"];

/// `` `name` - (Required) text `` and `` `name` (String) text `` list items
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static ARGUMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[?`(?P<name>[^`]+)`(?:\]\([^)]*\))?\s*(?:[-–:]\s*)?(?:\((?P<paren>[^)]*)\))?\s*(?:[-–:]\s*)?(?P<desc>.*)$",
    )
    .unwrap()
});

pub fn is_terraform_language(language: &str) -> bool {
    TERRAFORM_LANGUAGES.contains(&language)
}

/// Top-level section of a docs page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Examples,
    Arguments,
    Attributes,
    Schema(SchemaGroup),
    Other,
}

/// Subsection of a generated `## Schema` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaGroup {
    None,
    Required,
    Optional,
    ReadOnly,
}

impl Section {
    fn classify(heading: &str) -> Self {
        let lower = heading.to_lowercase();
        if lower.starts_with("example") {
            Self::Examples
        } else if lower.contains("argument") && lower.contains("reference") {
            Self::Arguments
        } else if lower.contains("attribute") && lower.contains("reference") {
            Self::Attributes
        } else if lower == "schema" {
            Self::Schema(SchemaGroup::None)
        } else {
            Self::Other
        }
    }

    fn enter_subsection(self, heading: &str) -> Self {
        match self {
            Self::Schema(_) => Self::Schema(match heading.to_lowercase().as_str() {
                "required" => SchemaGroup::Required,
                "optional" => SchemaGroup::Optional,
                "read-only" | "read only" => SchemaGroup::ReadOnly,
                _ => SchemaGroup::None,
            }),
            other => other,
        }
    }
}

/// Structural block of the markdown tree, in document order.
#[derive(Debug)]
enum Block {
    Heading { level: usize, text: String },
    Paragraph(String),
    ListItem(String),
    Code { language: String, source: String },
}

/// Markdown parser for provider docs pages, built on tree-sitter.
pub struct DocParser {
    parser: Parser,
}

impl DocParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_md::LANGUAGE.into())
            .map_err(|e| Error::ParseFailed(format!("Failed to set language: {e}")))?;

        Ok(Self { parser })
    }

    /// Parse `page` into a record for `id` fetched at `version`.
    pub fn parse(
        &mut self,
        id: &ResourceIdentifier,
        page: &FetchedDocument,
        version: &str,
    ) -> Result<DocumentRecord> {
        if let Some(reason) = detect::placeholder_reason(&page.body) {
            warn!(url = %page.url, "{reason}");
            return Err(Error::UnsupportedContent {
                url: page.url.clone(),
                reason,
            });
        }

        let normalized;
        let text = if html::looks_like_html(&page.body) {
            debug!(url = %page.url, "normalizing HTML page");
            normalized = html::to_markdown(&page.body);
            normalized.as_str()
        } else {
            page.body.as_str()
        };

        let (meta, body) = frontmatter::split(text);
        let blocks = self.blocks(body)?;

        let has_structure = blocks
            .iter()
            .any(|b| matches!(b, Block::Heading { .. } | Block::Code { .. }));
        if !has_structure {
            return Err(Error::ParseFailed(format!(
                "{}: no headings or code blocks found",
                page.url
            )));
        }

        let mut record = assemble(id, &blocks, meta.unwrap_or_default());
        record.fetched_at = Utc::now();
        record.source_version = version.to_string();
        record.source_url.clone_from(&page.url);
        record.checksum.clone_from(&page.sha256);

        debug!(
            id = %id,
            arguments = record.arguments.len(),
            attributes = record.attributes.len(),
            examples = record.examples.len(),
            "parsed document"
        );
        Ok(record)
    }

    fn blocks(&mut self, text: &str) -> Result<Vec<Block>> {
        let tree = self
            .parser
            .parse(text, None)
            .ok_or_else(|| Error::ParseFailed("Failed to parse markdown".into()))?;

        let root = tree.root_node();
        if root.has_error() {
            debug!("parse tree contains errors, continuing best-effort");
        }

        let mut blocks = Vec::new();
        let mut cursor = root.walk();
        walk_tree(&mut cursor, |node| match node.kind() {
            "atx_heading" | "setext_heading" => blocks.push(Block::Heading {
                level: heading_level(node),
                text: heading_text(node, text),
            }),
            "paragraph" => {
                let nested = node
                    .parent()
                    .is_some_and(|p| matches!(p.kind(), "list_item" | "block_quote"));
                if !nested {
                    blocks.push(Block::Paragraph(collapse(node_text(node, text))));
                }
            },
            "list_item" => {
                let mut walker = node.walk();
                let first = node
                    .children(&mut walker)
                    .find(|child| child.kind() == "paragraph");
                if let Some(paragraph) = first {
                    blocks.push(Block::ListItem(collapse(node_text(paragraph, text))));
                }
            },
            "fenced_code_block" => {
                let (language, source) = fenced_code(node, text);
                blocks.push(Block::Code { language, source });
            },
            _ => {},
        });

        Ok(blocks)
    }
}

/// Fold the block stream into a record. Provenance fields are left empty.
fn assemble(id: &ResourceIdentifier, blocks: &[Block], meta: FrontMatter) -> DocumentRecord {
    let mut title = None;
    let mut description = Vec::new();
    let mut arguments = Vec::new();
    let mut attributes = Vec::new();
    let mut examples = Vec::new();
    let mut section = Section::Preamble;
    let mut last_heading: Option<String> = None;

    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                match level {
                    1 => {
                        if title.is_none() {
                            title = Some(text.clone());
                        }
                    },
                    2 => section = Section::classify(text),
                    _ => {
                        if let Section::Schema(_) = section {
                            section = section.enter_subsection(text);
                            // "Nested Schema for `x`" lives under its own h3
                            if text.to_lowercase().starts_with("nested schema") {
                                section = Section::Other;
                            }
                        }
                    },
                }
                last_heading = Some(text.clone());
            },
            Block::Paragraph(text) => {
                if section == Section::Preamble && title.is_some() && !is_callout(text) {
                    description.push(text.clone());
                }
            },
            Block::ListItem(text) => match section {
                Section::Arguments => {
                    if let Some(arg) = parse_argument(text, false) {
                        arguments.push(arg);
                    }
                },
                Section::Schema(SchemaGroup::Required) => {
                    if let Some(arg) = parse_argument(text, true) {
                        arguments.push(arg);
                    }
                },
                Section::Schema(SchemaGroup::Optional) => {
                    if let Some(arg) = parse_argument(text, false) {
                        arguments.push(arg);
                    }
                },
                Section::Attributes | Section::Schema(SchemaGroup::ReadOnly) => {
                    if let Some(arg) = parse_argument(text, false) {
                        attributes.push(AttributeDef {
                            name: arg.name,
                            attr_type: arg.arg_type,
                            description: arg.description,
                        });
                    }
                },
                _ => {},
            },
            Block::Code { language, source } => {
                if is_terraform_language(language) {
                    examples.push(ExampleBlock {
                        language: language.clone(),
                        source: source.clone(),
                        section: last_heading.clone(),
                    });
                }
            },
        }
    }

    let description = if description.is_empty() {
        meta.description.clone().unwrap_or_default()
    } else {
        description.join("\n\n")
    };

    DocumentRecord {
        identifier: id.clone(),
        title: title
            .or_else(|| meta.page_title.clone())
            .unwrap_or_else(|| id.type_name()),
        subcategory: meta.subcategory,
        description: description.trim().to_string(),
        arguments,
        attributes,
        examples,
        fetched_at: Utc::now(),
        source_version: String::new(),
        source_url: String::new(),
        checksum: String::new(),
    }
}

/// Parse one reference list item. `required_default` applies when the
/// item carries no explicit `Required`/`Optional` flag.
fn parse_argument(item: &str, required_default: bool) -> Option<ArgumentDef> {
    let caps = ARGUMENT_RE.captures(item)?;
    let name = caps.name("name")?.as_str().trim().to_string();
    if name.is_empty() {
        return None;
    }

    let mut required = required_default;
    let mut arg_type = None;
    if let Some(paren) = caps.name("paren") {
        let paren = paren.as_str().trim();
        let flag = paren
            .split(',')
            .map(str::trim)
            .find_map(|part| match part.to_ascii_lowercase().as_str() {
                "required" => Some(true),
                "optional" => Some(false),
                _ => None,
            });
        match flag {
            Some(flag) => required = flag,
            None if !paren.is_empty() => arg_type = Some(paren.to_string()),
            None => {},
        }
    }

    let description = caps
        .name("desc")
        .map_or("", |m| m.as_str())
        .trim()
        .to_string();

    Some(ArgumentDef {
        name,
        arg_type,
        required,
        description,
    })
}

/// `->`, `~>` and `!>` note/warning callouts
fn is_callout(text: &str) -> bool {
    ["->", "~>", "!>"].iter().any(|p| text.starts_with(p))
}

fn walk_tree<F>(cursor: &mut TreeCursor, mut callback: F)
where
    F: FnMut(Node),
{
    loop {
        let node = cursor.node();
        callback(node);

        if cursor.goto_first_child() {
            continue;
        }

        if cursor.goto_next_sibling() {
            continue;
        }

        loop {
            if !cursor.goto_parent() {
                return;
            }
            if cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

fn node_text<'a>(node: Node, text: &'a str) -> &'a str {
    text.get(node.byte_range()).unwrap_or_default()
}

fn heading_level(node: Node) -> usize {
    let mut walker = node.walk();
    node.children(&mut walker)
        .find_map(|child| match child.kind() {
            "atx_h1_marker" | "setext_h1_underline" => Some(1),
            "atx_h2_marker" | "setext_h2_underline" => Some(2),
            "atx_h3_marker" => Some(3),
            "atx_h4_marker" => Some(4),
            "atx_h5_marker" => Some(5),
            "atx_h6_marker" => Some(6),
            _ => None,
        })
        .unwrap_or(1)
}

fn heading_text(node: Node, text: &str) -> String {
    let raw = node_text(node, text);
    let line = if node.kind() == "setext_heading" {
        raw.lines().next().unwrap_or_default()
    } else {
        raw
    };
    line.trim()
        .trim_start_matches('#')
        .trim_end_matches('#')
        .trim()
        .to_string()
}

/// Language tag and verbatim body of a fenced code block.
fn fenced_code(node: Node, text: &str) -> (String, String) {
    let mut walker = node.walk();
    let mut language = String::new();
    let mut source = String::new();

    for child in node.children(&mut walker) {
        match child.kind() {
            "info_string" => {
                language = node_text(child, text)
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_ascii_lowercase();
            },
            "code_fence_content" => {
                source = fence_body(child, text, node.start_position().column);
            },
            _ => {},
        }
    }

    (language, source)
}

/// Fence content with the enclosing list indentation or `> ` markers removed.
///
/// The grammar marks container prefixes inside the content as
/// `block_continuation` nodes; without them, up to `indent` leading spaces
/// and quote markers are stripped from each line.
fn fence_body(content: Node, text: &str, indent: usize) -> String {
    let mut walker = content.walk();
    let prefixes: Vec<_> = content
        .children(&mut walker)
        .filter(|child| child.kind() == "block_continuation")
        .map(|child| child.byte_range())
        .collect();

    let mut body = String::new();
    if prefixes.is_empty() {
        for line in node_text(content, text).split_inclusive('\n') {
            let prefix = line
                .bytes()
                .take(indent)
                .take_while(|b| matches!(b, b' ' | b'>'))
                .count();
            body.push_str(&line[prefix..]);
        }
    } else {
        let mut cursor = content.start_byte();
        for range in prefixes {
            body.push_str(text.get(cursor..range.start).unwrap_or_default());
            cursor = range.end.max(cursor);
        }
        body.push_str(text.get(cursor..content.end_byte()).unwrap_or_default());
    }

    let body = match body.rsplit_once('\n') {
        Some((head, last)) if last.trim().is_empty() => head,
        _ => body.as_str(),
    };
    body.strip_suffix('\r').unwrap_or(body).to_string()
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
