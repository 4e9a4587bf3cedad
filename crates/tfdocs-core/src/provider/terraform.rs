use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{DocProvider, catalog};
use crate::cache::DocCache;
use crate::config::ProviderConfig;
use crate::fetcher::DocFetcher;
use crate::parser::DocParser;
use crate::version::VersionResolver;
use crate::{DocumentRecord, ProviderVersion, ResourceIdentifier, ResourceKind, Result};

/// A registry provider whose docs live in its GitHub repository
///
/// Lookups resolve the provider version, then go through the shared cache,
/// which fetches and parses the page on a miss.
pub struct TerraformProvider {
    config: ProviderConfig,
    resolver: Arc<VersionResolver>,
    fetcher: Arc<DocFetcher>,
    cache: DocCache,
    catalog: Vec<ResourceIdentifier>,
}

impl TerraformProvider {
    /// Provider for `config`, sharing `resolver`, `fetcher` and `cache` with its siblings.
    pub fn new(
        config: ProviderConfig,
        resolver: Arc<VersionResolver>,
        fetcher: Arc<DocFetcher>,
        cache: DocCache,
    ) -> Self {
        let catalog = catalog::identifiers(&config.name, &config.resources, &config.data_sources);
        Self {
            config,
            resolver,
            fetcher,
            cache,
            catalog,
        }
    }

    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[async_trait]
impl DocProvider for TerraformProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn list_resources(&self) -> Vec<ResourceIdentifier> {
        self.catalog.clone()
    }

    #[instrument(level = "debug", skip(self), fields(provider = %self.config.name))]
    async fn get_docs(&self, kind: ResourceKind, name: &str) -> Result<Arc<DocumentRecord>> {
        let id = ResourceIdentifier::new(&self.config.name, kind, name);
        let version = self.resolve_version().await?.version;

        let fetcher = Arc::clone(&self.fetcher);
        let config = self.config.clone();
        let target = id.clone();
        let at = version.clone();
        self.cache
            .get_or_fetch(&id, &version, move || async move {
                let page = fetcher.fetch(&config, &target, &at).await?;
                DocParser::new()?.parse(&target, &page, &at.to_string())
            })
            .await
    }

    async fn resolve_version(&self) -> Result<ProviderVersion> {
        let resolved = self.resolver.resolve(&self.config).await?;
        let dropped = self
            .cache
            .bind_version(&self.config.name, &resolved.version)
            .await;
        if dropped > 0 {
            info!(provider = %self.config.name, dropped, "dropped documents of previous version");
        }
        Ok(resolved)
    }

    async fn invalidate(&self) {
        self.resolver.invalidate(&self.config.name).await;
        self.cache.invalidate(&self.config.name).await;
    }
}
