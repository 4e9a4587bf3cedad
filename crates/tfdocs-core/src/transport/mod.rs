//! Asynchronous HTTP GET boundary.
//!
//! Everything above this module talks to the network only through the
//! [`Transport`] trait, which is the single suspension point of the
//! pipeline. A request either yields an [`HttpResponse`] (any status) or an
//! [`Error::Network`](crate::Error::Network) describing why no response was
//! received. Implementations never panic on transport failure.
//!
//! - [`HttpTransport`]: production implementation on `reqwest`
//! - [`MockTransport`]: deterministic double with per-URL latency and
//!   forced failures, used by tests and by embedders that want offline
//!   behavior

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockRoute, MockTransport};

use async_trait::async_trait;

use crate::Result;

/// A received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for 2xx statuses.
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// `HTTP 404 Not Found` style description of the status.
    pub fn status_line(&self) -> String {
        let reason = reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown Status");
        format!("HTTP {} {reason}", self.status)
    }
}

/// Performs GET requests for the pipeline.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`](crate::Error::Network) when no response
    /// could be obtained. Non-2xx responses are *not* errors here.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}
