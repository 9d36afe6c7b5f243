//! Identity provider port

use std::future::Future;
use std::pin::Pin;

use warden_domain::{AccessToken, AuthError, LogoutParams};

/// Port for the identity provider client.
///
/// Implementations own credential storage and refresh; callers ask for a
/// token every time they need one.
pub trait IdentityProvider: Send + Sync {
    /// Returns the current access token, refreshing it silently if needed.
    ///
    /// # Errors
    ///
    /// Fails when the session is invalid or expired and cannot be renewed
    /// without user interaction.
    fn access_token(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<AccessToken, AuthError>> + Send + '_>>;

    /// Ends the local session and performs the configured post-logout
    /// navigation.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout could not be completed.
    fn logout<'a>(
        &'a self,
        params: &'a LogoutParams,
    ) -> Pin<Box<dyn Future<Output = Result<(), AuthError>> + Send + 'a>>;
}
