//! HTTP Client port

use async_trait::async_trait;
use conform_domain::{HttpRequest, HttpResponse};
use thiserror::Error;

/// Transport failures: the request never produced a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The request did not complete in time.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("DNS lookup failed for {host}: {message}")]
    DnsError {
        /// Host being resolved.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The remote end refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// TLS negotiation failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The redirect limit was exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// The URL could not be built or parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

impl HttpClientError {
    /// Broad category used in logs and reports.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::DnsError { .. } => "dns",
            Self::ConnectionRefused { .. } | Self::ConnectionFailed(_) => "connection",
            Self::Tls(_) => "tls",
            Self::TooManyRedirects { .. }
            | Self::InvalidUrl(_)
            | Self::InvalidBody(_)
            | Self::Other(_) => "other",
        }
    }
}

/// Port for sending HTTP requests.
///
/// Relative request URLs are resolved by the implementation, which owns the
/// base URL and any default headers.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a request and returns the full response.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received. Any status
    /// code, including 4xx and 5xx, is a successful send.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpClientError>;
}
