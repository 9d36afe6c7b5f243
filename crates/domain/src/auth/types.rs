//! Credential types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// An opaque bearer credential.
///
/// `Debug` only ever prints a preview so tokens do not leak into logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this token.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Get a preview of the token (first 8 chars + ...).
    #[must_use]
    pub fn preview(&self) -> String {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) if self.0.len() > 12 => format!("{}...", &self.0[..idx]),
            _ => self.0.clone(),
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessToken").field(&self.preview()).finish()
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Token issued by the identity provider, with metadata for expiry tracking.
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// The access token
    pub access_token: AccessToken,
    /// When the token expires (if known)
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token for obtaining new access tokens
    pub refresh_token: Option<String>,
    /// Scopes granted by this token
    pub scopes: Vec<String>,
}

impl SessionToken {
    /// Create a new token obtained now.
    #[must_use]
    pub fn new(
        access_token: impl Into<AccessToken>,
        expires_in_secs: Option<u64>,
        refresh_token: Option<String>,
        scopes: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        let expires_at = expires_in_secs
            .map(|secs| now + chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));

        Self {
            access_token: access_token.into(),
            expires_at,
            refresh_token,
            scopes,
        }
    }

    /// Check if the token is expired or will expire within the given buffer.
    #[must_use]
    pub fn is_expired_or_expiring(&self, buffer_seconds: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| {
            Utc::now() + chrono::Duration::seconds(buffer_seconds) >= expires_at
        })
    }

    /// Check if the token can be refreshed.
    #[must_use]
    pub const fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Time until expiry in seconds, or None if no expiry.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|exp| (exp - Utc::now()).num_seconds())
    }
}

/// Errors reported by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No usable session: the user must log in again.
    #[error("Login required")]
    LoginRequired,

    /// Failed to refresh the access token.
    #[error("Failed to refresh token: {message}")]
    RefreshFailed {
        /// Error description.
        message: String,
    },

    /// The identity provider is misconfigured.
    #[error("Invalid identity provider configuration: {message}")]
    InvalidConfiguration {
        /// Error description.
        message: String,
    },

    /// The identity provider could not be reached.
    #[error("Network error: {message}")]
    Network {
        /// Error description.
        message: String,
    },

    /// Any other failure, reported verbatim.
    #[error("{message}")]
    Provider {
        /// Error description.
        message: String,
    },
}

impl AuthError {
    /// Creates a provider error with the given message.
    #[must_use]
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Returns true if this error means the session is over.
    #[must_use]
    pub const fn is_session_over(&self) -> bool {
        matches!(self, Self::LoginRequired | Self::RefreshFailed { .. })
    }
}
