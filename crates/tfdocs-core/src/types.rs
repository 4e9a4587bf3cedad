use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Kind of documented entity within a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A managed resource (`resource "aws_instance" ...`).
    Resource,
    /// A data source (`data "aws_ami" ...`).
    DataSource,
}

impl ResourceKind {
    /// Directory segment used by provider repositories (`r` or `d`).
    pub const fn docs_dir(self) -> &'static str {
        match self {
            Self::Resource => "r",
            Self::DataSource => "d",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource => f.write_str("resource"),
            Self::DataSource => f.write_str("data_source"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resource" | "resources" | "r" => Ok(Self::Resource),
            "data" | "data_source" | "data-source" | "datasource" | "d" => Ok(Self::DataSource),
            other => Err(Error::NotFound(format!("unknown resource kind '{other}'"))),
        }
    }
}

/// Identity of one documentation target: `(provider, kind, name)`.
///
/// `name` is the short name without the provider prefix (`instance` for
/// `aws_instance`), matching the file layout of provider repositories.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    pub provider: String,
    pub kind: ResourceKind,
    pub name: String,
}

impl ResourceIdentifier {
    /// Identifier from its parts; `name` excludes the provider prefix.
    pub fn new(provider: &str, kind: ResourceKind, name: &str) -> Self {
        Self {
            provider: provider.to_string(),
            kind,
            name: name.to_string(),
        }
    }

    /// Build an identifier from a full Terraform type name such as `aws_instance`.
    ///
    /// Returns `None` when `type_name` does not start with `{provider}_`.
    pub fn from_type_name(provider: &str, kind: ResourceKind, type_name: &str) -> Option<Self> {
        let short = type_name.strip_prefix(provider)?.strip_prefix('_')?;
        if short.is_empty() {
            return None;
        }
        Some(Self::new(provider, kind, short))
    }

    /// Full Terraform type name, e.g. `aws_instance`.
    pub fn type_name(&self) -> String {
        format!("{}_{}", self.provider, self.name)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}_{}", self.kind, self.provider, self.name)
    }
}

/// Release channel policy used when picking a provider version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Highest version without a pre-release component.
    #[default]
    Stable,
    /// Highest version, pre-releases included.
    Prerelease,
}

impl Channel {
    /// Whether `version` belongs to this channel.
    pub fn admits(self, version: &semver::Version) -> bool {
        match self {
            Self::Stable => version.pre.is_empty(),
            Self::Prerelease => true,
        }
    }
}

/// A resolved provider version. Immutable; a refresh produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderVersion {
    pub provider: String,
    pub version: semver::Version,
    pub channel: Channel,
    /// When the registry was last consulted.
    pub resolved_at: DateTime<Utc>,
}

impl fmt::Display for ProviderVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.provider, self.version)
    }
}

/// One entry of the "Argument Reference" section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDef {
    pub name: String,
    /// Declared type, when the page states one (`String`, `List of String`, ...).
    pub arg_type: Option<String>,
    pub required: bool,
    pub description: String,
}

/// One entry of the "Attribute Reference" section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub attr_type: Option<String>,
    pub description: String,
}

/// A fenced example block, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleBlock {
    /// Language tag from the fence info string, lowercased.
    pub language: String,
    pub source: String,
    /// Heading the block appeared under, e.g. `Basic Usage`.
    pub section: Option<String>,
}

/// Structured documentation for one resource or data source.
///
/// Never mutated after creation; a refetch builds a new record that
/// replaces the old one in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub identifier: ResourceIdentifier,
    /// Page title (`Resource: aws_instance`), falling back to the type name.
    pub title: String,
    pub subcategory: Option<String>,
    pub description: String,
    pub arguments: Vec<ArgumentDef>,
    pub attributes: Vec<AttributeDef>,
    pub examples: Vec<ExampleBlock>,
    pub fetched_at: DateTime<Utc>,
    /// Provider version the record was fetched for.
    pub source_version: String,
    pub source_url: String,
    /// Base64 SHA-256 of the raw page.
    pub checksum: String,
}

impl DocumentRecord {
    /// The example used for insertion when no index is requested.
    pub fn primary_example(&self) -> Option<&ExampleBlock> {
        self.examples.first()
    }

    /// Example at `index`, in page order.
    pub fn example(&self, index: usize) -> Option<&ExampleBlock> {
        self.examples.get(index)
    }

    pub fn required_arguments(&self) -> impl Iterator<Item = &ArgumentDef> {
        self.arguments.iter().filter(|arg| arg.required)
    }
}
