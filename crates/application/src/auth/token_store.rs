//! In-memory session token storage with expiry tracking.

use std::sync::Arc;
use tokio::sync::RwLock;
use warden_domain::SessionToken;

/// Seconds before expiry at which a token is treated as expiring.
const DEFAULT_REFRESH_BUFFER_SECS: i64 = 60;

/// Thread-safe holder of the current session token.
///
/// Clones share the same underlying slot.
#[derive(Debug, Clone)]
pub struct SessionTokenStore {
    token: Arc<RwLock<Option<SessionToken>>>,
    refresh_buffer_seconds: i64,
}

impl SessionTokenStore {
    /// Create an empty store with the default refresh buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_refresh_buffer(DEFAULT_REFRESH_BUFFER_SECS)
    }

    /// Create an empty store with a custom refresh buffer.
    #[must_use]
    pub fn with_refresh_buffer(refresh_buffer_seconds: i64) -> Self {
        Self {
            token: Arc::new(RwLock::new(None)),
            refresh_buffer_seconds,
        }
    }

    /// Replace the stored token.
    pub async fn store(&self, token: SessionToken) {
        *self.token.write().await = Some(token);
    }

    /// Get the stored token, valid or not.
    pub async fn get(&self) -> Option<SessionToken> {
        self.token.read().await.clone()
    }

    /// Get the token if it is not within the refresh buffer of expiring.
    pub async fn get_fresh(&self) -> Option<SessionToken> {
        self.token
            .read()
            .await
            .as_ref()
            .filter(|t| !t.is_expired_or_expiring(self.refresh_buffer_seconds))
            .cloned()
    }

    /// Get the refresh token of the stored session, if any.
    pub async fn refresh_token(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
    }

    /// Remove the stored token.
    pub async fn clear(&self) -> Option<SessionToken> {
        self.token.write().await.take()
    }

    /// Get the token status.
    pub async fn status(&self) -> TokenStatus {
        let token = self.token.read().await;
        token.as_ref().map_or(TokenStatus::NotAuthenticated, |token| {
            if token.is_expired_or_expiring(0) {
                TokenStatus::Expired {
                    can_refresh: token.can_refresh(),
                }
            } else if token.is_expired_or_expiring(self.refresh_buffer_seconds) {
                TokenStatus::Expiring {
                    seconds_remaining: token.seconds_until_expiry().unwrap_or(0),
                    can_refresh: token.can_refresh(),
                }
            } else {
                TokenStatus::Valid {
                    seconds_remaining: token.seconds_until_expiry(),
                }
            }
        })
    }
}

impl Default for SessionTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Status of the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// No token is stored.
    NotAuthenticated,
    /// Token is valid and not expiring soon.
    Valid {
        /// Seconds until expiry, or None if no expiry.
        seconds_remaining: Option<i64>,
    },
    /// Token is valid but will expire soon.
    Expiring {
        /// Seconds until expiry.
        seconds_remaining: i64,
        /// Whether the token can be refreshed.
        can_refresh: bool,
    },
    /// Token has expired.
    Expired {
        /// Whether the token can be refreshed.
        can_refresh: bool,
    },
}

impl TokenStatus {
    /// Returns true if a refresh grant should be attempted.
    #[must_use]
    pub const fn should_refresh(&self) -> bool {
        matches!(
            self,
            Self::Expiring {
                can_refresh: true,
                ..
            } | Self::Expired { can_refresh: true }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_store_and_clear() {
        let store = SessionTokenStore::new();
        assert_eq!(store.status().await, TokenStatus::NotAuthenticated);

        store
            .store(SessionToken::new("abc", Some(3600), Some("r1".into()), vec![]))
            .await;
        assert!(matches!(store.status().await, TokenStatus::Valid { .. }));
        assert_eq!(store.refresh_token().await.as_deref(), Some("r1"));

        let cleared = store.clear().await;
        assert!(cleared.is_some());
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_expiring_token_is_not_fresh() {
        let store = SessionTokenStore::with_refresh_buffer(120);
        store
            .store(SessionToken::new("abc", Some(60), Some("r1".into()), vec![]))
            .await;

        assert!(store.get_fresh().await.is_none());
        let status = store.status().await;
        assert!(matches!(status, TokenStatus::Expiring { can_refresh: true, .. }));
        assert!(status.should_refresh());
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token() {
        let store = SessionTokenStore::new();
        store.store(SessionToken::new("abc", Some(0), None, vec![])).await;

        let status = store.status().await;
        assert_eq!(status, TokenStatus::Expired { can_refresh: false });
        assert!(!status.should_refresh());
    }

    #[tokio::test]
    async fn clones_share_the_slot() {
        let store = SessionTokenStore::new();
        let other = store.clone();
        other.store(SessionToken::new("abc", None, None, vec![])).await;

        assert_eq!(
            store.get_fresh().await.map(|t| t.access_token.as_str().to_string()),
            Some("abc".to_string())
        );
    }
}
