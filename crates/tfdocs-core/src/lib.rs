//! # tfdocs-core
//!
//! Core of a Terraform provider documentation pipeline: resolve the current
//! provider version, fetch the provider's docs page for a resource or data
//! source, parse it into a structured record, cache it per provider version,
//! and search the catalog of known names.
//!
//! ## Architecture
//!
//! - **Transport**: the only network boundary ([`transport::Transport`])
//! - **Version resolution**: registry lookup with channel policy and TTL memo
//! - **Fetching and parsing**: deterministic docs URLs, tree-sitter markdown parsing
//! - **Cache**: version-bound entries with at most one in-flight fetch per identifier
//! - **Index**: tiered search over provider catalogs
//! - **Providers**: the [`DocProvider`] extension point and its registry
//! - **Service**: [`DocService`], the context object consumers hold
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tfdocs_core::transport::MockTransport;
//! use tfdocs_core::{Config, DocService};
//!
//! let service = DocService::from_config(&Config::default(), Arc::new(MockTransport::new()))?;
//! let hits = service.search("aws_instance");
//! assert_eq!(hits[0].type_name(), "aws_instance");
//! # Ok::<(), tfdocs_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, Error>`]. Failures are classified,
//! never swallowed, and never cached:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tfdocs_core::transport::HttpTransport;
//! use tfdocs_core::{Config, DocService, Error, ResourceKind};
//!
//! # async fn run() -> tfdocs_core::Result<()> {
//! let service = DocService::from_config(&Config::load()?, Arc::new(HttpTransport::new()?))?;
//! match service.get_docs(ResourceKind::Resource, "aws_instance").await {
//!     Ok(record) => println!("{} examples", record.examples.len()),
//!     Err(Error::UnsupportedContent { url, .. }) => eprintln!("not a docs page: {url}"),
//!     Err(e) if e.is_recoverable() => eprintln!("try again later: {e}"),
//!     Err(e) => eprintln!("lookup failed: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

/// Version-bound document cache with request coalescing
pub mod cache;
/// Configuration loading and validation
pub mod config;
/// Error types and result aliases
pub mod error;
/// Documentation page retrieval
pub mod fetcher;
/// Catalog search
pub mod index;
/// Tree-sitter based docs page parser
pub mod parser;
/// Provider extension point and registry
pub mod provider;
/// Consumer-facing lookup API
pub mod service;
/// HTTP GET boundary
pub mod transport;
/// Core data types
pub mod types;
/// Provider version resolution
pub mod version;

// Re-export commonly used types
pub use cache::{CacheStats, DocCache};
pub use config::{Config, DocsRef, ProviderConfig};
pub use error::{Error, Result};
pub use fetcher::{DocFetcher, FetchedDocument};
pub use index::{CatalogIndex, IndexEntry, MatchTier, SearchHit};
pub use parser::DocParser;
pub use provider::{DocProvider, ProviderRegistry, TerraformProvider};
pub use service::DocService;
pub use types::{
    ArgumentDef, AttributeDef, Channel, DocumentRecord, ExampleBlock, ProviderVersion,
    ResourceIdentifier, ResourceKind,
};
pub use version::VersionResolver;
