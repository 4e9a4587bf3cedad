//! Consumer-facing lookup API.
//!
//! [`DocService`] is the explicit context object an editor layer holds: it
//! owns the provider registry, the shared document cache and the lazily
//! built catalog index, and has a defined [`reset`](DocService::reset)
//! lifecycle. Clones share state.
//!
//! The service remembers the tokio runtime it was built on, so
//! [`get_docs_with_callback`](DocService::get_docs_with_callback) can be
//! called from threads that have no runtime of their own.

use std::sync::{Arc, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheStats, DocCache};
use crate::config::Config;
use crate::fetcher::DocFetcher;
use crate::index::{CatalogIndex, SearchHit};
use crate::provider::{DocProvider, ProviderRegistry, TerraformProvider};
use crate::transport::Transport;
use crate::version::VersionResolver;
use crate::{
    DocumentRecord, Error, ExampleBlock, ProviderVersion, ResourceIdentifier, ResourceKind, Result,
};

struct ServiceInner {
    registry: ProviderRegistry,
    cache: DocCache,
    index: RwLock<Option<Arc<CatalogIndex>>>,
    runtime: Option<Handle>,
}

/// Documentation lookups for the editor layer
#[derive(Clone)]
pub struct DocService {
    inner: Arc<ServiceInner>,
}

impl DocService {
    /// Compose a service over existing providers.
    ///
    /// `cache` is only used for [`cache_stats`](Self::cache_stats) and
    /// [`reset`](Self::reset); pass the one the providers share. Callback
    /// lookups run on the current tokio runtime, if there is one.
    pub fn new(registry: ProviderRegistry, cache: DocCache) -> Self {
        Self::build(registry, cache, Handle::try_current().ok())
    }

    /// Like [`new`](Self::new), running callback lookups on `runtime`.
    pub fn with_runtime(registry: ProviderRegistry, cache: DocCache, runtime: Handle) -> Self {
        Self::build(registry, cache, Some(runtime))
    }

    fn build(registry: ProviderRegistry, cache: DocCache, runtime: Option<Handle>) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                registry,
                cache,
                index: RwLock::new(None),
                runtime,
            }),
        }
    }

    /// One [`TerraformProvider`] per configured provider, sharing a resolver,
    /// a fetcher and a cache over `transport`.
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        let resolver = Arc::new(VersionResolver::new(
            Arc::clone(&transport),
            &config.registry.base_url,
            config.registry.channel,
            config.registry.version_ttl(),
        ));
        let fetcher = Arc::new(DocFetcher::new(transport, &config.docs.base_url));
        let cache = DocCache::new();

        let mut registry = ProviderRegistry::new();
        for provider in &config.providers {
            registry.register(Arc::new(TerraformProvider::new(
                provider.clone(),
                Arc::clone(&resolver),
                Arc::clone(&fetcher),
                cache.clone(),
            )));
        }
        info!(providers = registry.len(), "documentation service ready");

        Ok(Self::new(registry, cache))
    }

    /// Providers this service routes to.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.inner.registry
    }

    fn route(
        &self,
        kind: ResourceKind,
        type_name: &str,
    ) -> Result<(Arc<dyn DocProvider>, ResourceIdentifier)> {
        self.inner
            .registry
            .route(kind, type_name)
            .ok_or_else(|| Error::NotFound(format!("no provider serves '{type_name}'")))
    }

    /// Docs for a full type name such as `aws_instance`.
    ///
    /// A page missing upstream for a name outside the provider's catalog is
    /// reported as [`Error::NotFound`]; for a catalogued name the
    /// [`Error::FetchFailed`] is passed through.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_docs(&self, kind: ResourceKind, type_name: &str) -> Result<Arc<DocumentRecord>> {
        let (provider, id) = self.route(kind, type_name)?;
        provider
            .get_docs(kind, &id.name)
            .await
            .map_err(|e| unknown_identifier(provider.as_ref(), &id, e))
    }

    /// Run [`get_docs`](Self::get_docs) in the background and hand the result
    /// to `callback`.
    ///
    /// The lookup runs on the runtime the service was built on, or the
    /// current one, and completes even if the handle is dropped. Without
    /// any runtime, `callback` receives [`Error::Config`] immediately and
    /// `None` is returned.
    pub fn get_docs_with_callback<F>(
        &self,
        kind: ResourceKind,
        type_name: &str,
        callback: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Result<Arc<DocumentRecord>>) + Send + 'static,
    {
        let Some(runtime) = self
            .inner
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
        else {
            warn!(type_name, "no tokio runtime for callback lookup");
            callback(Err(Error::Config(
                "no tokio runtime available to run the lookup".into(),
            )));
            return None;
        };

        let service = self.clone();
        let type_name = type_name.to_string();
        Some(runtime.spawn(async move {
            let result = service.get_docs(kind, &type_name).await;
            callback(result);
        }))
    }

    fn index(&self) -> Arc<CatalogIndex> {
        if let Some(index) = self
            .inner
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(index);
        }

        let mut slot = self
            .inner
            .index
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slot.get_or_insert_with(|| {
            Arc::new(CatalogIndex::build(self.inner.registry.list_resources()))
        }))
    }

    /// Ranked identifiers matching `query`; empty query lists the catalog.
    pub fn search(&self, query: &str) -> Vec<ResourceIdentifier> {
        self.index().search(query)
    }

    /// [`search`](Self::search), keeping at most `limit` results.
    pub fn search_with_limit(&self, query: &str, limit: usize) -> Vec<ResourceIdentifier> {
        self.index().search_with_limit(query, limit)
    }

    /// Ranked hits with match tier and score.
    pub fn search_ranked(&self, query: &str) -> Vec<SearchHit> {
        self.index().search_ranked(query)
    }

    /// Example block to insert for `type_name`: the primary one, or `index`.
    pub async fn example(
        &self,
        kind: ResourceKind,
        type_name: &str,
        index: Option<usize>,
    ) -> Result<ExampleBlock> {
        let (provider, id) = self.route(kind, type_name)?;
        let mut examples = provider
            .get_examples(kind, &id.name)
            .await
            .map_err(|e| unknown_identifier(provider.as_ref(), &id, e))?;
        let position = index.unwrap_or(0);
        if position >= examples.len() {
            return Err(Error::NotFound(match index {
                Some(i) => format!(
                    "{kind} {type_name} has {} example(s), no index {i}",
                    examples.len()
                ),
                None => format!("{kind} {type_name} has no examples"),
            }));
        }
        Ok(examples.swap_remove(position))
    }

    /// Source text of the example to insert for `type_name`.
    pub async fn insert_example(
        &self,
        kind: ResourceKind,
        type_name: &str,
        index: Option<usize>,
    ) -> Result<String> {
        Ok(self.example(kind, type_name, index).await?.source)
    }

    /// Currently resolved version of `provider`.
    pub async fn resolve_version(&self, provider: &str) -> Result<ProviderVersion> {
        let docs = self
            .inner
            .registry
            .get(provider)
            .ok_or_else(|| Error::NotFound(format!("unknown provider '{provider}'")))?;
        docs.resolve_version().await
    }

    /// Drop cached docs and versions of one provider.
    pub async fn invalidate(&self, provider: &str) -> Result<()> {
        let docs = self
            .inner
            .registry
            .get(provider)
            .ok_or_else(|| Error::NotFound(format!("unknown provider '{provider}'")))?;
        docs.invalidate().await;
        Ok(())
    }

    /// Return to the freshly constructed state: no cached docs, no resolved
    /// versions, index rebuilt on next search.
    pub async fn reset(&self) {
        for provider in self.inner.registry.providers() {
            provider.invalidate().await;
        }
        self.inner.cache.clear().await;
        *self
            .inner
            .index
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        debug!("documentation service reset");
    }

    /// Counters and sizes of the shared cache.
    pub async fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats().await
    }
}

/// Turn a 404 for a name the provider does not list into `NotFound`.
fn unknown_identifier(provider: &dyn DocProvider, id: &ResourceIdentifier, err: Error) -> Error {
    match err {
        Error::FetchFailed { ref reason, .. }
            if reason.starts_with("HTTP 404") && !provider.list_resources().contains(id) =>
        {
            debug!(id = %id, "page missing for uncatalogued name");
            Error::NotFound(format!(
                "{} {} is not documented by provider '{}'",
                id.kind,
                id.type_name(),
                provider.name()
            ))
        },
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn offline() -> DocService {
        DocService::from_config(&Config::default(), Arc::new(MockTransport::new())).unwrap()
    }

    #[test]
    fn test_search_uses_bundled_catalog() {
        let service = offline();
        let results = service.search("instance");
        assert_eq!(results[0].type_name(), "aws_instance");
        assert_eq!(service.search(""), service.search(""));
        assert_eq!(service.search_with_limit("", 5).len(), 5);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_not_found() {
        let service = offline();
        let err = service
            .get_docs(ResourceKind::Resource, "google_storage_bucket")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "got {err:?}");

        assert!(matches!(
            service.resolve_version("google").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(service.invalidate("google").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reset_rebuilds_index() {
        let service = offline();
        let before = service.search("");
        service.reset().await;
        assert_eq!(service.search(""), before);
        assert_eq!(service.cache_stats().await, CacheStats::default());
    }
}
