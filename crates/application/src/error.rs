//! Application error types

use thiserror::Error;
use warden_domain::{AuthError, FetchErrorKind, FetchFailure, StatusCode};

use crate::ports::HttpClientError;

/// Errors produced by an authenticated fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The identity provider could not supply a token.
    #[error(transparent)]
    Credential(#[from] AuthError),

    /// The transport failed before a response arrived.
    #[error(transparent)]
    Transport(#[from] HttpClientError),

    /// The server answered with a non-success status.
    #[error("HTTP error! status: {}", status.as_u16())]
    Status {
        /// The status received.
        status: StatusCode,
    },

    /// The response body could not be parsed.
    #[error("failed to parse response body: {0}")]
    Parse(String),
}

impl FetchError {
    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Credential(_) => FetchErrorKind::Credential,
            Self::Transport(_) => FetchErrorKind::Transport,
            Self::Status { .. } => FetchErrorKind::Protocol,
            Self::Parse(_) => FetchErrorKind::Parse,
        }
    }

    /// Converts this error into the clonable failure stored in fetch state.
    #[must_use]
    pub fn to_failure(&self) -> FetchFailure {
        FetchFailure::new(self.kind(), self.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
