use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::{HttpResponse, Transport};
use crate::{Error, Result};

/// Canned behavior for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRoute {
    pub status: u16,
    pub body: String,
    /// Simulated latency before the outcome is delivered.
    pub delay: Option<Duration>,
    /// When set, the request fails with `Error::Network` carrying this reason.
    pub failure: Option<String>,
}

impl MockRoute {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    /// Respond with `status` and `body`.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
            failure: None,
        }
    }

    /// Fail with a network error.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            status: 0,
            body: String::new(),
            delay: None,
            failure: Some(reason.into()),
        }
    }

    /// Wait `delay` before responding.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// In-memory [`Transport`] with per-URL routes and call accounting.
///
/// Unrouted URLs answer `404`. Routes can be replaced while the transport
/// is shared, which lets tests simulate a provider release mid-session.
///
/// ```rust
/// use tfdocs_core::transport::{MockRoute, MockTransport, Transport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let transport = MockTransport::new().with_route("https://example.test/a", MockRoute::ok("hello"));
/// let response = transport.get("https://example.test/a").await.unwrap();
/// assert_eq!(response.body, "hello");
/// assert_eq!(transport.calls("https://example.test/a"), 1);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, MockRoute>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_route(self, url: impl Into<String>, route: MockRoute) -> Self {
        self.set_route(url, route);
        self
    }

    /// Install or replace the route for `url`.
    pub fn set_route(&self, url: impl Into<String>, route: MockRoute) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.into(), route);
    }

    /// Number of requests made for `url`, routed or not.
    pub fn calls(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// Requests made across all URLs.
    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(url.to_string())
            .or_default() += 1;

        let route = self
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned();

        let Some(route) = route else {
            return Ok(HttpResponse::new(404, "404: Not Found"));
        };

        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(reason) = route.failure {
            return Err(Error::Network {
                url: url.to_string(),
                reason,
            });
        }

        Ok(HttpResponse::new(route.status, route.body))
    }
}
