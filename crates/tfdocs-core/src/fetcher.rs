use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::{DocsRef, ProviderConfig};
use crate::transport::Transport;
use crate::{Error, ResourceIdentifier, Result};

/// Raw documentation page as received from the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    /// URL the page was fetched from.
    pub url: String,
    /// Raw page body, Markdown or HTML.
    pub body: String,
    /// Base64 `SHA256` of `body`
    pub sha256: String,
}

impl FetchedDocument {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            url: url.into(),
            sha256: calculate_sha256(&body),
            body,
        }
    }
}

/// Retrieves raw provider documentation pages
///
/// One attempt per call; retry policy belongs to the caller.
pub struct DocFetcher {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl DocFetcher {
    /// Fetcher for raw docs under `base_url`.
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Canonical documentation URL for `id` at `version`
    ///
    /// `{base}/{org}/terraform-provider-{provider}/{ref}/website/docs/{r|d}/{name}.html.markdown`
    pub fn docs_url(
        &self,
        provider: &ProviderConfig,
        id: &ResourceIdentifier,
        version: &semver::Version,
    ) -> String {
        let git_ref = match &provider.docs_ref {
            DocsRef::VersionTag => format!("v{version}"),
            DocsRef::Branch(branch) => branch.clone(),
        };
        format!(
            "{}/{}/terraform-provider-{}/{}/website/docs/{}/{}.html.markdown",
            self.base_url,
            provider.org,
            id.provider,
            git_ref,
            id.kind.docs_dir(),
            id.name
        )
    }

    /// Fetch the page for `id`, failing on transport errors and non-200 statuses
    #[instrument(level = "debug", skip(self, provider), fields(id = %id, %version))]
    pub async fn fetch(
        &self,
        provider: &ProviderConfig,
        id: &ResourceIdentifier,
        version: &semver::Version,
    ) -> Result<FetchedDocument> {
        let url = self.docs_url(provider, id, version);
        let response = self.transport.get(&url).await?;

        if !response.is_ok() {
            return Err(Error::FetchFailed {
                url,
                reason: response.status_line(),
            });
        }

        info!("Fetched {} bytes from {}", response.body.len(), url);
        Ok(FetchedDocument::new(url, response.body))
    }
}

pub(crate) fn calculate_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    STANDARD.encode(result)
}
