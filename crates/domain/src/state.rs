//! Fetch state types for consumer binding.
//!
//! `FetchState` is the three-field view a consumer renders: the parsed
//! data, whether a request is in flight, and the last error.

use serde::{Deserialize, Serialize};

/// Observable state of a data fetch.
///
/// Outside of loading, at most one of `data` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchState<T> {
    /// Parsed response body of the last successful request.
    pub data: Option<T>,
    /// True strictly between request start and its resolution.
    pub is_loading: bool,
    /// Failure of the last request.
    pub error: Option<FetchFailure>,
}

impl<T> FetchState<T> {
    /// Initial state: nothing loaded, nothing in flight.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }

    /// Resolved with data.
    #[must_use]
    pub const fn success(data: T) -> Self {
        Self {
            data: Some(data),
            is_loading: false,
            error: None,
        }
    }

    /// Resolved with an error; data is cleared.
    #[must_use]
    pub const fn failed(error: FetchFailure) -> Self {
        Self {
            data: None,
            is_loading: false,
            error: Some(error),
        }
    }

    /// Marks a request as started. Previous data stays visible, the
    /// previous error is cleared.
    pub fn start_loading(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

/// A clonable description of why a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// Error category.
    pub kind: FetchErrorKind,
    /// Human-readable message, shown as-is to the user.
    pub message: String,
}

impl FetchFailure {
    /// Creates a failure.
    #[must_use]
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Categories of fetch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The identity provider could not supply a token.
    Credential,
    /// The request never produced a response.
    Transport,
    /// The server answered with a non-success status.
    Protocol,
    /// The body could not be read as structured data.
    Parse,
}
