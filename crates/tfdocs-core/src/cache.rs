//! Version-bound document cache with request coalescing.
//!
//! [`DocCache`] maps [`ResourceIdentifier`]s to parsed [`DocumentRecord`]s.
//! Each provider is *bound* to the version it was last resolved at; an
//! entry is only served while its version equals its provider's bound
//! version, and rebinding a provider drops every entry it owns.
//!
//! [`DocCache::get_or_fetch`] guarantees at most one in-flight fetch per
//! identifier. Concurrent misses share one spawned task through a
//! [`Shared`] future, so every waiter observes the same `Ok` or `Err`.
//! The task runs to completion even if all waiters go away, and populates
//! the cache for later lookups. Failures are handed to waiters and then
//! forgotten.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{DocumentRecord, Error, ResourceIdentifier, Result};

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<DocumentRecord>>>>;

/// A cached record and the provider version it is bound to
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Parsed document shared with every caller.
    pub record: Arc<DocumentRecord>,
    /// Provider version the document was fetched at.
    pub version: semver::Version,
}

struct InFlight {
    fetch_id: u64,
    version: semver::Version,
    future: SharedFetch,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<ResourceIdentifier, CacheEntry>,
    versions: HashMap<String, semver::Version>,
    in_flight: HashMap<ResourceIdentifier, InFlight>,
}

impl CacheState {
    fn fresh(&self, id: &ResourceIdentifier) -> Option<&CacheEntry> {
        let entry = self.entries.get(id)?;
        (self.versions.get(&id.provider) == Some(&entry.version)).then_some(entry)
    }

    /// Bind `provider` to `version`, returning how many entries were dropped.
    fn bind(&mut self, provider: &str, version: &semver::Version) -> usize {
        if self.versions.get(provider) == Some(version) {
            return 0;
        }
        let previous = self.versions.insert(provider.to_string(), version.clone());

        let before = self.entries.len();
        self.entries
            .retain(|id, entry| id.provider != provider || entry.version == *version);
        let dropped = before - self.entries.len();

        if let Some(previous) = previous {
            info!(provider, from = %previous, to = %version, dropped, "provider version changed");
        }
        dropped
    }
}

#[derive(Default)]
struct CacheCounters {
    hits: AtomicUsize,
    misses: AtomicUsize,
    fetches: AtomicUsize,
    coalesced: AtomicUsize,
    next_fetch_id: AtomicU64,
}

/// Cache statistics summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a fresh entry.
    pub hits: usize,
    /// Lookups that found no fresh entry.
    pub misses: usize,
    /// Fetches started by the cache.
    pub fetches: usize,
    /// Lookups that joined a fetch already in flight.
    pub coalesced: usize,
    /// Entries currently stored, fresh or not.
    pub entries: usize,
    /// Fetches currently in flight.
    pub in_flight: usize,
}

/// Shared, cheaply clonable document cache
#[derive(Clone, Default)]
pub struct DocCache {
    state: Arc<Mutex<CacheState>>,
    counters: Arc<CacheCounters>,
}

impl DocCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The fresh record for `id`, if any.
    pub async fn get(&self, id: &ResourceIdentifier) -> Option<Arc<DocumentRecord>> {
        let state = self.state.lock().await;
        match state.fresh(id) {
            Some(entry) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.record))
            },
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            },
        }
    }

    /// Store `record` for `id` at `version`, binding the provider to it.
    pub async fn put(
        &self,
        id: &ResourceIdentifier,
        record: DocumentRecord,
        version: &semver::Version,
    ) -> Arc<DocumentRecord> {
        let record = Arc::new(record);
        let mut state = self.state.lock().await;
        state.bind(&id.provider, version);
        state.entries.insert(
            id.clone(),
            CacheEntry {
                record: Arc::clone(&record),
                version: version.clone(),
            },
        );
        record
    }

    /// Record the currently resolved version of `provider`.
    ///
    /// A change drops that provider's entries; returns how many.
    pub async fn bind_version(&self, provider: &str, version: &semver::Version) -> usize {
        self.state.lock().await.bind(provider, version)
    }

    /// The version `provider` is currently bound to.
    pub async fn bound_version(&self, provider: &str) -> Option<semver::Version> {
        self.state.lock().await.versions.get(provider).cloned()
    }

    /// Drop every entry and the version binding of `provider`.
    ///
    /// Fetches already in flight still deliver to their waiters but are not
    /// cached, and later lookups start a new fetch.
    pub async fn invalidate(&self, provider: &str) -> usize {
        let mut state = self.state.lock().await;
        state.versions.remove(provider);
        state.in_flight.retain(|id, _| id.provider != provider);

        let before = state.entries.len();
        state.entries.retain(|id, _| id.provider != provider);
        let dropped = before - state.entries.len();

        info!(provider, dropped, "invalidated provider cache");
        dropped
    }

    /// Drop all entries, bindings and counters.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        *state = CacheState::default();
        self.counters.hits.store(0, Ordering::Relaxed);
        self.counters.misses.store(0, Ordering::Relaxed);
        self.counters.fetches.store(0, Ordering::Relaxed);
        self.counters.coalesced.store(0, Ordering::Relaxed);
    }

    /// Number of cached documents.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// `true` when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of hit, miss and fetch counters.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            entries: state.entries.len(),
            in_flight: state.in_flight.len(),
        }
    }

    /// Return the fresh record for `id` at `version`, or fetch it.
    ///
    /// Binds the provider to `version` first. `fetch` is only invoked when
    /// no fetch for `id` at `version` is already in flight; otherwise the
    /// caller waits on that fetch and receives its result.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        id: &ResourceIdentifier,
        version: &semver::Version,
        fetch: F,
    ) -> Result<Arc<DocumentRecord>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<DocumentRecord>> + Send + 'static,
    {
        let future = {
            let mut state = self.state.lock().await;
            state.bind(&id.provider, version);

            if let Some(entry) = state.fresh(id) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(&entry.record));
            }
            self.counters.misses.fetch_add(1, Ordering::Relaxed);

            match state.in_flight.get(id) {
                Some(pending) if pending.version == *version => {
                    self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                    debug!(id = %id, "joining in-flight fetch");
                    pending.future.clone()
                },
                _ => {
                    let fetch_id = self.counters.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                    self.counters.fetches.fetch_add(1, Ordering::Relaxed);
                    let future = self.spawn_fetch(id.clone(), version.clone(), fetch_id, fetch());
                    state.in_flight.insert(
                        id.clone(),
                        InFlight {
                            fetch_id,
                            version: version.clone(),
                            future: future.clone(),
                        },
                    );
                    future
                },
            }
        };

        future.await
    }

    fn spawn_fetch<Fut>(
        &self,
        id: ResourceIdentifier,
        version: semver::Version,
        fetch_id: u64,
        fetch: Fut,
    ) -> SharedFetch
    where
        Fut: Future<Output = Result<DocumentRecord>> + Send + 'static,
    {
        let cache = self.clone();
        let task = tokio::spawn(async move {
            let result = fetch.await.map(Arc::new);
            cache.complete(&id, &version, fetch_id, &result).await;
            result
        });

        async move {
            task.await
                .unwrap_or_else(|e| Err(Error::Other(format!("fetch task failed: {e}"))))
        }
        .boxed()
        .shared()
    }

    async fn complete(
        &self,
        id: &ResourceIdentifier,
        version: &semver::Version,
        fetch_id: u64,
        result: &Result<Arc<DocumentRecord>>,
    ) {
        let mut state = self.state.lock().await;
        if state
            .in_flight
            .get(id)
            .is_some_and(|pending| pending.fetch_id == fetch_id)
        {
            state.in_flight.remove(id);
        }

        match result {
            Ok(record) if state.versions.get(&id.provider) == Some(version) => {
                state.entries.insert(
                    id.clone(),
                    CacheEntry {
                        record: Arc::clone(record),
                        version: version.clone(),
                            },
                );
                debug!(id = %id, %version, "cached document");
            },
            Ok(_) => debug!(id = %id, %version, "version no longer bound, not caching"),
            Err(e) => debug!(id = %id, category = e.category(), "fetch failed, not caching"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ResourceKind;
    use chrono::Utc;
    use std::time::Duration;

    fn id(provider: &str, name: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(provider, ResourceKind::Resource, name)
    }

    fn v(version: &str) -> semver::Version {
        semver::Version::parse(version).unwrap()
    }

    fn record(id: &ResourceIdentifier, description: &str) -> DocumentRecord {
        DocumentRecord {
            identifier: id.clone(),
            title: id.type_name(),
            subcategory: None,
            description: description.to_string(),
            arguments: Vec::new(),
            attributes: Vec::new(),
            examples: Vec::new(),
            fetched_at: Utc::now(),
            source_version: "1.0.0".into(),
            source_url: String::new(),
            checksum: String::new(),
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = DocCache::new();
        let instance = id("aws", "instance");
        let stored = record(&instance, "a");
        cache.put(&instance, stored.clone(), &v("1.0.0")).await;

        let got = cache.get(&instance).await.unwrap();
        assert_eq!(*got, stored);
        assert!(cache.get(&id("aws", "vpc")).await.is_none());

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_rebinding_drops_only_that_provider() {
        let cache = DocCache::new();
        let instance = id("aws", "instance");
        let vpc = id("aws", "vpc");
        let bucket = id("google", "storage_bucket");
        cache.put(&instance, record(&instance, "a"), &v("1.0.0")).await;
        cache.put(&vpc, record(&vpc, "b"), &v("1.0.0")).await;
        cache.put(&bucket, record(&bucket, "c"), &v("4.0.0")).await;

        assert_eq!(cache.bind_version("aws", &v("1.0.0")).await, 0);
        assert_eq!(cache.bind_version("aws", &v("1.1.0")).await, 2);

        assert!(cache.get(&instance).await.is_none());
        assert!(cache.get(&vpc).await.is_none());
        assert!(cache.get(&bucket).await.is_some());
        assert_eq!(cache.bound_version("aws").await, Some(v("1.1.0")));
    }

    #[tokio::test]
    async fn test_invalidate_is_per_provider() {
        let cache = DocCache::new();
        let instance = id("aws", "instance");
        let bucket = id("google", "storage_bucket");
        cache.put(&instance, record(&instance, "a"), &v("1.0.0")).await;
        cache.put(&bucket, record(&bucket, "c"), &v("4.0.0")).await;

        assert_eq!(cache.invalidate("aws").await, 1);

        assert!(cache.get(&instance).await.is_none());
        assert!(cache.get(&bucket).await.is_some());
        assert_eq!(cache.bound_version("aws").await, None);
    }

    #[tokio::test]
    async fn test_concurrent_misses_coalesce() {
        let cache = DocCache::new();
        let instance = id("aws", "instance");
        let calls = Arc::new(AtomicUsize::new(0));

        let lookups = (0..8).map(|_| {
            let cache = cache.clone();
            let instance = instance.clone();
            let calls = Arc::clone(&calls);
            async move {
                cache
                    .get_or_fetch(&instance, &v("1.0.0"), || {
                        let record = record(&instance, "fetched");
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(30)).await;
                            Ok(record)
                        }
                    })
                    .await
            }
        });
        let results = futures::future::join_all(lookups).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let first = results[0].as_ref().unwrap();
        for result in &results {
            assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
        }

        let stats = cache.stats().await;
        assert_eq!(stats.fetches, 1);
        assert_eq!(stats.coalesced, 7);
        assert_eq!(stats.in_flight, 0);
        assert!(cache.get(&instance).await.is_some());
    }

    #[tokio::test]
    async fn test_failures_are_shared_and_not_cached() {
        let cache = DocCache::new();
        let instance = id("aws", "instance");
        let failure = Error::FetchFailed {
            url: "u".into(),
            reason: "HTTP 500 Internal Server Error".into(),
        };

        let failing = || {
            let failure = failure.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err(failure)
            }
        };
        let v1 = v("1.0.0");
        let (a, b) = tokio::join!(
            cache.get_or_fetch(&instance, &v1, failing),
            cache.get_or_fetch(&instance, &v1, failing),
        );
        assert_eq!(a.unwrap_err(), failure);
        assert_eq!(b.unwrap_err(), failure);
        assert_eq!(cache.len().await, 0);

        // next lookup retries
        let ok = cache
            .get_or_fetch(&instance, &v("1.0.0"), || {
                let record = record(&instance, "second try");
                async move { Ok(record) }
            })
            .await
            .unwrap();
        assert_eq!(ok.description, "second try");
        assert_eq!(cache.stats().await.fetches, 2);
    }

    #[tokio::test]
    async fn test_fetch_completes_after_caller_is_dropped() {
        let cache = DocCache::new();
        let instance = id("aws", "instance");

        let v1 = v("1.0.0");
        let lookup = cache.get_or_fetch(&instance, &v1, || {
            let record = record(&instance, "late");
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(record)
            }
        });
        // poll once so the fetch is registered, then abandon it
        let _ = tokio::time::timeout(Duration::from_millis(1), lookup).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.get(&instance).await.unwrap().description, "late");
    }

    #[tokio::test]
    async fn test_stale_version_result_is_not_cached() {
        let cache = DocCache::new();
        let instance = id("aws", "instance");

        let v1 = v("1.0.0");
        let slow = cache.get_or_fetch(&instance, &v1, || {
            let record = record(&instance, "old");
            async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok(record)
            }
        });
        let rebind = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            cache.bind_version("aws", &v("2.0.0")).await
        };
        let (old, _) = tokio::join!(slow, rebind);

        assert_eq!(old.unwrap().description, "old");
        assert!(cache.get(&instance).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_resets_everything() {
        let cache = DocCache::new();
        let instance = id("aws", "instance");
        cache.put(&instance, record(&instance, "a"), &v("1.0.0")).await;
        cache.get(&instance).await;

        cache.clear().await;

        assert!(cache.is_empty().await);
        assert_eq!(cache.stats().await, CacheStats::default());
        assert_eq!(cache.bound_version("aws").await, None);
    }
}
