//! HTTP client port

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use warden_domain::{FetchRequest, FetchResponse, HttpMethod};

/// Errors raised by the HTTP transport before a response is available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpClientError {
    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name or value was rejected by the transport.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The transport gave up waiting.
    #[error("Request timed out")]
    Timeout,

    /// No handler is registered for the request.
    #[error("No handler for {method} {url}")]
    Unhandled {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
    },

    /// Any other transport failure, reported verbatim.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing the
/// application layer to be independent of specific HTTP libraries. A
/// response with any status code is a success at this level.
pub trait HttpClient: Send + Sync {
    /// Executes an HTTP request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained.
    fn execute<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FetchResponse, HttpClientError>> + Send + 'a>>;
}
