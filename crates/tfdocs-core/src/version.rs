//! Provider version resolution against the Terraform registry.
//!
//! `GET {registry}/v1/providers/{org}/{name}/versions` returns every
//! published version. The resolver drops entries that are not valid semver
//! or not admitted by the configured [`Channel`], then picks the highest
//! remaining version by semver ordering. Nothing beyond semver ordering is
//! inferred about channels.
//!
//! Results are memoized per provider for a TTL. When a refresh fails and a
//! previous result exists, the previous result is served and the failure is
//! logged; a first-time failure propagates.

use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::ProviderConfig;
use crate::transport::Transport;
use crate::{Channel, Error, ProviderVersion, Result};

#[derive(Debug, Deserialize)]
struct VersionsResponse {
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    version: String,
}

#[derive(Debug, Clone)]
struct Memo {
    version: ProviderVersion,
    stored_at: Instant,
}

/// Resolves and memoizes the documentation version of each provider.
pub struct VersionResolver {
    transport: Arc<dyn Transport>,
    base_url: String,
    channel: Channel,
    ttl: Duration,
    memo: Mutex<HashMap<String, Memo>>,
}

impl VersionResolver {
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: &str,
        channel: Channel,
        ttl: Duration,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            channel,
            ttl,
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Registry URL listing the versions of `provider`.
    pub fn versions_url(&self, provider: &ProviderConfig) -> String {
        format!(
            "{}/v1/providers/{}/{}/versions",
            self.base_url, provider.org, provider.name
        )
    }

    /// Current version for `provider`, from memo, pin, or the registry.
    #[instrument(level = "debug", skip(self, provider), fields(provider = %provider.name))]
    pub async fn resolve(&self, provider: &ProviderConfig) -> Result<ProviderVersion> {
        if let Some(pinned) = &provider.pinned_version {
            let version = semver::Version::parse(pinned)?;
            return Ok(ProviderVersion {
                provider: provider.name.clone(),
                version,
                channel: self.channel,
                resolved_at: Utc::now(),
            });
        }

        let stale = {
            let memo = self.memo.lock().await;
            match memo.get(&provider.name) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    debug!(version = %entry.version.version, "version memo hit");
                    return Ok(entry.version.clone());
                },
                Some(entry) => Some(entry.version.clone()),
                None => None,
            }
        };

        match self.fetch_latest(provider).await {
            Ok(resolved) => {
                if let Some(previous) = &stale {
                    if previous.version != resolved.version {
                        info!(
                            from = %previous.version,
                            to = %resolved.version,
                            "provider version changed"
                        );
                    }
                }
                self.memo.lock().await.insert(
                    provider.name.clone(),
                    Memo {
                        version: resolved.clone(),
                        stored_at: Instant::now(),
                    },
                );
                Ok(resolved)
            },
            Err(err) => match stale {
                Some(previous) => {
                    warn!(
                        error = %err,
                        version = %previous.version,
                        "version refresh failed, keeping last resolved version"
                    );
                    Ok(previous)
                },
                None => Err(err),
            },
        }
    }

    async fn fetch_latest(&self, provider: &ProviderConfig) -> Result<ProviderVersion> {
        let url = self.versions_url(provider);
        let response = self.transport.get(&url).await?;
        if !response.is_ok() {
            return Err(Error::FetchFailed {
                url,
                reason: response.status_line(),
            });
        }

        let version = select_version(&response.body, self.channel)?.ok_or_else(|| {
            Error::NoVersionsAvailable {
                provider: provider.name.clone(),
            }
        })?;

        info!(%version, channel = ?self.channel, "resolved provider version");
        Ok(ProviderVersion {
            provider: provider.name.clone(),
            version,
            channel: self.channel,
            resolved_at: Utc::now(),
        })
    }

    /// Forget the memoized version of one provider.
    pub async fn invalidate(&self, provider: &str) {
        self.memo.lock().await.remove(provider);
    }

    /// Forget every resolved version.
    pub async fn clear(&self) {
        self.memo.lock().await.clear();
    }
}

/// Pick the highest version admitted by `channel` from a registry response body.
///
/// Returns `Ok(None)` when the list is empty or nothing qualifies.
pub fn select_version(body: &str, channel: Channel) -> Result<Option<semver::Version>> {
    let response: VersionsResponse = serde_json::from_str(body)?;
    Ok(response
        .versions
        .iter()
        .filter_map(|entry| match semver::Version::parse(entry.version.trim()) {
            Ok(version) => Some(version),
            Err(err) => {
                debug!(version = %entry.version, error = %err, "skipping unparsable version");
                None
            },
        })
        .filter(|version| channel.admits(version))
        .max())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::transport::{MockRoute, MockTransport};

    const REGISTRY: &str = "https://registry.test";
    const AWS_VERSIONS: &str = "https://registry.test/v1/providers/hashicorp/aws/versions";

    fn versions_body(versions: &[&str]) -> String {
        let entries: Vec<String> = versions
            .iter()
            .map(|v| format!(r#"{{"version":"{v}","protocols":["5.0"],"platforms":[]}}"#))
            .collect();
        format!(
            r#"{{"id":"hashicorp/aws","versions":[{}],"warnings":null}}"#,
            entries.join(",")
        )
    }

    fn resolver(transport: Arc<MockTransport>, ttl: Duration) -> VersionResolver {
        VersionResolver::new(transport, REGISTRY, Channel::Stable, ttl)
    }

    #[test]
    fn test_select_highest_stable() {
        let body = versions_body(&["5.9.0", "5.10.0", "5.10.1", "6.0.0-beta2", "4.67.0"]);
        let selected = select_version(&body, Channel::Stable).unwrap().unwrap();
        // semver ordering, not string ordering
        assert_eq!(selected.to_string(), "5.10.1");
    }

    #[test]
    fn test_select_prerelease_channel() {
        let body = versions_body(&["5.10.1", "6.0.0-beta2", "6.0.0-beta10"]);
        let selected = select_version(&body, Channel::Prerelease).unwrap().unwrap();
        assert_eq!(selected.to_string(), "6.0.0-beta2");
    }

    #[test]
    fn test_select_skips_garbage_versions() {
        let body = versions_body(&["latest", "1.2", "1.0.0"]);
        let selected = select_version(&body, Channel::Stable).unwrap().unwrap();
        assert_eq!(selected.to_string(), "1.0.0");
    }

    #[test]
    fn test_select_empty_list() {
        assert_eq!(select_version(&versions_body(&[]), Channel::Stable).unwrap(), None);
        assert_eq!(
            select_version(&versions_body(&["7.0.0-rc1"]), Channel::Stable).unwrap(),
            None
        );
        assert_eq!(select_version("{}", Channel::Stable).unwrap(), None);
    }

    #[test]
    fn test_select_rejects_non_json() {
        assert!(matches!(
            select_version("<html>", Channel::Stable),
            Err(Error::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_fetches_and_memoizes() {
        let transport = Arc::new(
            MockTransport::new().with_route(AWS_VERSIONS, MockRoute::ok(versions_body(&["5.1.0"]))),
        );
        let resolver = resolver(Arc::clone(&transport), Duration::from_secs(600));
        let provider = ProviderConfig::new("hashicorp", "aws");

        let first = resolver.resolve(&provider).await.unwrap();
        let second = resolver.resolve(&provider).await.unwrap();

        assert_eq!(first.version.to_string(), "5.1.0");
        assert_eq!(first.version, second.version);
        assert_eq!(transport.calls(AWS_VERSIONS), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refreshes() {
        let transport = Arc::new(
            MockTransport::new().with_route(AWS_VERSIONS, MockRoute::ok(versions_body(&["5.1.0"]))),
        );
        let resolver = resolver(Arc::clone(&transport), Duration::ZERO);
        let provider = ProviderConfig::new("hashicorp", "aws");

        resolver.resolve(&provider).await.unwrap();
        transport.set_route(AWS_VERSIONS, MockRoute::ok(versions_body(&["5.1.0", "5.2.0"])));
        let refreshed = resolver.resolve(&provider).await.unwrap();

        assert_eq!(refreshed.version.to_string(), "5.2.0");
        assert_eq!(transport.calls(AWS_VERSIONS), 2);
    }

    #[tokio::test]
    async fn test_empty_registry_is_no_versions_available() {
        let transport = Arc::new(
            MockTransport::new().with_route(AWS_VERSIONS, MockRoute::ok(versions_body(&[]))),
        );
        let resolver = resolver(transport, Duration::from_secs(600));

        let err = resolver
            .resolve(&ProviderConfig::new("hashicorp", "aws"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::NoVersionsAvailable {
                provider: "aws".into()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_registry_is_network_error() {
        let transport = Arc::new(
            MockTransport::new().with_route(AWS_VERSIONS, MockRoute::failing("connection refused")),
        );
        let resolver = resolver(transport, Duration::from_secs(600));

        let err = resolver
            .resolve(&ProviderConfig::new("hashicorp", "aws"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_registry_error_status_is_fetch_failed() {
        let transport = Arc::new(MockTransport::new());
        let resolver = resolver(transport, Duration::from_secs(600));

        let err = resolver
            .resolve(&ProviderConfig::new("hashicorp", "aws"))
            .await
            .unwrap_err();
        match err {
            Error::FetchFailed { url, reason } => {
                assert_eq!(url, AWS_VERSIONS);
                assert_eq!(reason, "HTTP 404 Not Found");
            },
            other => panic!("Expected FetchFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stale_version_served_when_refresh_fails() {
        let transport = Arc::new(
            MockTransport::new().with_route(AWS_VERSIONS, MockRoute::ok(versions_body(&["5.1.0"]))),
        );
        let resolver = resolver(Arc::clone(&transport), Duration::ZERO);
        let provider = ProviderConfig::new("hashicorp", "aws");

        resolver.resolve(&provider).await.unwrap();
        transport.set_route(AWS_VERSIONS, MockRoute::failing("offline"));
        let stale = resolver.resolve(&provider).await.unwrap();

        assert_eq!(stale.version.to_string(), "5.1.0");
    }

    #[tokio::test]
    async fn test_pinned_version_skips_registry() {
        let transport = Arc::new(MockTransport::new());
        let resolver = resolver(Arc::clone(&transport), Duration::from_secs(600));
        let provider = ProviderConfig::new("hashicorp", "aws").with_pinned_version("4.67.0");

        let resolved = resolver.resolve(&provider).await.unwrap();

        assert_eq!(resolved.version.to_string(), "4.67.0");
        assert_eq!(transport.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let transport = Arc::new(
            MockTransport::new().with_route(AWS_VERSIONS, MockRoute::ok(versions_body(&["5.1.0"]))),
        );
        let resolver = resolver(Arc::clone(&transport), Duration::from_secs(600));
        let provider = ProviderConfig::new("hashicorp", "aws");

        resolver.resolve(&provider).await.unwrap();
        resolver.invalidate("aws").await;
        resolver.resolve(&provider).await.unwrap();

        assert_eq!(transport.calls(AWS_VERSIONS), 2);
    }
}
