//! Provider extension point.
//!
//! A provider module exposes its catalog and serves docs for its own
//! resources through [`DocProvider`]. [`ProviderRegistry`] composes
//! providers and routes full type names (`aws_instance`) to the provider
//! whose name is the type's prefix.

pub mod catalog;
mod terraform;

pub use terraform::TerraformProvider;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{DocumentRecord, ExampleBlock, ProviderVersion, ResourceIdentifier, ResourceKind, Result};

/// Documentation source for one provider.
#[async_trait]
pub trait DocProvider: Send + Sync {
    /// Provider name, also the type-name prefix (`aws`).
    fn name(&self) -> &str;

    /// Every identifier this provider documents.
    fn list_resources(&self) -> Vec<ResourceIdentifier>;

    /// Docs for the short `name` of `kind`.
    async fn get_docs(&self, kind: ResourceKind, name: &str) -> Result<Arc<DocumentRecord>>;

    /// Example blocks for the short `name` of `kind`, in page order.
    async fn get_examples(&self, kind: ResourceKind, name: &str) -> Result<Vec<ExampleBlock>> {
        Ok(self.get_docs(kind, name).await?.examples.clone())
    }

    /// Version the provider's docs are currently served at.
    async fn resolve_version(&self) -> Result<ProviderVersion>;

    /// Forget cached docs and versions.
    async fn invalidate(&self);
}

/// Named collection of providers
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn DocProvider>>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `provider`, replacing any provider of the same name.
    pub fn register(&mut self, provider: Arc<dyn DocProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn DocProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Provider registered as `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn DocProvider>> {
        self.providers.get(name).cloned()
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Registered providers, in name order.
    pub fn providers(&self) -> impl Iterator<Item = &Arc<dyn DocProvider>> {
        self.providers.values()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider claiming `type_name`, with the identifier it maps to.
    ///
    /// The longest matching provider name wins, so `awscc_x` goes to
    /// `awscc` even when `aws` is registered.
    pub fn route(
        &self,
        kind: ResourceKind,
        type_name: &str,
    ) -> Option<(Arc<dyn DocProvider>, ResourceIdentifier)> {
        self.providers
            .iter()
            .filter_map(|(name, provider)| {
                ResourceIdentifier::from_type_name(name, kind, type_name).map(|id| (provider, id))
            })
            .max_by_key(|(_, id)| id.provider.len())
            .map(|(provider, id)| (Arc::clone(provider), id))
    }

    /// Catalogs of all providers, concatenated.
    pub fn list_resources(&self) -> Vec<ResourceIdentifier> {
        self.providers
            .values()
            .flat_map(|provider| provider.list_resources())
            .collect()
    }
}
