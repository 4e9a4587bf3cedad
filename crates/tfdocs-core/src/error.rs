//! Error types and handling for tfdocs-core operations.
//!
//! Every failure in the documentation pipeline is classified into one
//! variant of [`Error`] and surfaced to the immediate caller. Nothing is
//! swallowed and failures are never cached, so a failed lookup is retried
//! on the next request.
//!
//! ## Error Categories
//!
//! - **Network**: the transport could not complete a request
//! - **Versions**: the registry returned no usable provider versions
//! - **Fetch**: the documentation source answered with a non-200 status
//! - **Content**: the page exists but is a client-rendered placeholder
//! - **Parse**: the page is not structured like provider documentation
//! - **Not found**: no provider module knows the identifier
//!
//! ## Cloning
//!
//! `Error` is `Clone` because a single coalesced fetch hands the same
//! result to every waiter. Wrapped library errors are stored as their
//! rendered message for that reason.
//!
//! ```rust
//! use tfdocs_core::Error;
//!
//! let err = Error::Network {
//!     url: "https://registry.terraform.io/v1/providers/hashicorp/aws/versions".into(),
//!     reason: "connection refused".into(),
//! };
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), "network");
//! ```

use thiserror::Error;

/// The main error type for tfdocs-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Transport-level failure: DNS, connect, TLS, timeout, or body read.
    ///
    /// ## Recoverability
    ///
    /// Always treated as recoverable; the caller may re-issue the lookup.
    #[error("Network error for '{url}': {reason}")]
    Network {
        /// URL that was requested.
        url: String,
        /// Underlying transport reason.
        reason: String,
    },

    /// The registry answered but listed no versions matching the channel policy.
    #[error("No versions available for provider '{provider}'")]
    NoVersionsAvailable {
        /// Provider that was queried.
        provider: String,
    },

    /// The server answered with a non-200 status.
    ///
    /// `reason` carries the status line, e.g. `HTTP 404 Not Found`.
    #[error("Fetch failed for '{url}': {reason}")]
    FetchFailed {
        /// URL that was requested.
        url: String,
        /// Status or other reason reported by the server.
        reason: String,
    },

    /// The page exists but is not documentation the parser can read.
    ///
    /// Raised for client-rendered placeholder pages ("enable JavaScript")
    /// instead of producing an empty record.
    #[error("Unsupported content at '{url}': {reason}")]
    UnsupportedContent {
        /// URL the content came from.
        url: String,
        /// What was detected.
        reason: String,
    },

    /// The content lacks every structural marker of a documentation page.
    #[error("Parse error: {0}")]
    ParseFailed(String),

    /// No provider module knows the requested identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O failed (config file access).
    #[error("IO error: {0}")]
    Io(String),

    /// JSON/TOML encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A version string is not valid semver.
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// Uncategorized failure, e.g. a background fetch task that panicked.
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<semver::Error> for Error {
    fn from(err: semver::Error) -> Self {
        Self::InvalidVersion(err.to_string())
    }
}

impl Error {
    /// Check if the error might go away if the same lookup is retried.
    ///
    /// Network failures are recoverable, as are fetch failures caused by
    /// server-side trouble (5xx) or rate limiting (429). Everything else
    /// describes the content or the request itself and will fail again.
    ///
    /// ```rust
    /// use tfdocs_core::Error;
    ///
    /// let busy = Error::FetchFailed { url: "u".into(), reason: "HTTP 503 Service Unavailable".into() };
    /// let missing = Error::FetchFailed { url: "u".into(), reason: "HTTP 404 Not Found".into() };
    /// assert!(busy.is_recoverable());
    /// assert!(!missing.is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::FetchFailed { reason, .. } => {
                reason.starts_with("HTTP 5") || reason.starts_with("HTTP 429")
            },
            _ => false,
        }
    }

    /// Get the error category as a stable string identifier.
    ///
    /// Useful as a structured logging field:
    ///
    /// ```rust
    /// use tfdocs_core::Error;
    ///
    /// let err = Error::ParseFailed("no headings".into());
    /// tracing::warn!(category = err.category(), error = %err, "lookup failed");
    /// ```
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::NoVersionsAvailable { .. } => "no_versions",
            Self::FetchFailed { .. } => "fetch",
            Self::UnsupportedContent { .. } => "unsupported_content",
            Self::ParseFailed(_) => "parse",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::InvalidVersion(_) => "invalid_version",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        let cases = vec![
            (
                Error::Network {
                    url: "https://example.com/a".into(),
                    reason: "timed out".into(),
                },
                "Network error for 'https://example.com/a': timed out",
            ),
            (
                Error::NoVersionsAvailable {
                    provider: "aws".into(),
                },
                "No versions available for provider 'aws'",
            ),
            (
                Error::FetchFailed {
                    url: "https://example.com/b".into(),
                    reason: "HTTP 404 Not Found".into(),
                },
                "Fetch failed for 'https://example.com/b': HTTP 404 Not Found",
            ),
            (
                Error::ParseFailed("no headings".into()),
                "Parse error: no headings",
            ),
            (
                Error::NotFound("resource google_thing".into()),
                "Not found: resource google_thing",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: Error = io_error.into();

        match error {
            Error::Io(msg) => assert!(msg.contains("access denied")),
            other => panic!("Expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_from_semver_error() {
        let err: Error = semver::Version::parse("not-a-version").unwrap_err().into();
        assert_eq!(err.category(), "invalid_version");
    }

    #[test]
    fn test_error_categories() {
        let cases = vec![
            (
                Error::UnsupportedContent {
                    url: "u".into(),
                    reason: "r".into(),
                },
                "unsupported_content",
            ),
            (Error::Config("bad".into()), "config"),
            (Error::Serialization("bad".into()), "serialization"),
            (Error::Other("bad".into()), "other"),
        ];

        for (error, category) in cases {
            assert_eq!(error.category(), category);
        }
    }

    #[test]
    fn test_error_recoverability() {
        let recoverable = vec![
            Error::Network {
                url: "u".into(),
                reason: "reset".into(),
            },
            Error::FetchFailed {
                url: "u".into(),
                reason: "HTTP 502 Bad Gateway".into(),
            },
            Error::FetchFailed {
                url: "u".into(),
                reason: "HTTP 429 Too Many Requests".into(),
            },
        ];
        let permanent = vec![
            Error::FetchFailed {
                url: "u".into(),
                reason: "HTTP 404 Not Found".into(),
            },
            Error::UnsupportedContent {
                url: "u".into(),
                reason: "javascript placeholder".into(),
            },
            Error::ParseFailed("x".into()),
            Error::NoVersionsAvailable {
                provider: "aws".into(),
            },
            Error::NotFound("x".into()),
        ];

        for error in recoverable {
            assert!(error.is_recoverable(), "Expected {error:?} to be recoverable");
        }
        for error in permanent {
            assert!(
                !error.is_recoverable(),
                "Expected {error:?} to be non-recoverable"
            );
        }
    }

    #[test]
    fn test_cloned_errors_compare_equal() {
        let original = Error::FetchFailed {
            url: "https://example.com".into(),
            reason: "HTTP 500 Internal Server Error".into(),
        };
        assert_eq!(original.clone(), original);
    }

    proptest! {
        #[test]
        fn test_parse_error_with_arbitrary_messages(msg in r".{0,500}") {
            let error = Error::ParseFailed(msg.clone());
            let display = error.to_string();
            prop_assert!(display.starts_with("Parse error: "));
            prop_assert!(display.contains(&msg));
            prop_assert_eq!(error.category(), "parse");
        }
    }
}
