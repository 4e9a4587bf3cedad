use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::{HttpResponse, Transport};
use crate::{Error, Result};

/// HTTP client for registry and documentation requests
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a new transport with the default 30 second timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Creates a new transport with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tfdocs/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

// Note: Default is not implemented as HttpTransport::new() can fail.

fn network_error(url: &str, err: &reqwest::Error) -> Error {
    let reason = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    Error::Network {
        url: url.to_string(),
        reason,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(url, &e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| network_error(url, &e))?;

        info!(%url, status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, body })
    }
}
