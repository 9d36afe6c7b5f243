//! Fixed-token identity provider for local development.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;
use warden_application::ports::IdentityProvider;
use warden_domain::{AccessToken, AuthError, LogoutParams};

/// Serves one configured token until logged out.
///
/// Pairs with the mock responder so the whole stack runs without an identity
/// provider tenant.
#[derive(Debug)]
pub struct StaticIdentityProvider {
    token: AccessToken,
    logged_out: AtomicBool,
}

impl StaticIdentityProvider {
    /// Creates a provider that hands out `token`.
    #[must_use]
    pub fn new(token: impl Into<AccessToken>) -> Self {
        Self {
            token: token.into(),
            logged_out: AtomicBool::new(false),
        }
    }

    /// Returns true once `logout` has been called.
    #[must_use]
    pub fn is_logged_out(&self) -> bool {
        self.logged_out.load(Ordering::Acquire)
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn access_token(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<AccessToken, AuthError>> + Send + '_>> {
        Box::pin(async move {
            if self.is_logged_out() {
                return Err(AuthError::LoginRequired);
            }
            Ok(self.token.clone())
        })
    }

    fn logout<'a>(
        &'a self,
        params: &'a LogoutParams,
    ) -> Pin<Box<dyn Future<Output = Result<(), AuthError>> + Send + 'a>> {
        Box::pin(async move {
            self.logged_out.store(true, Ordering::Release);
            info!(
                return_to = params.return_to.as_ref().map(url::Url::as_str),
                "development session ended"
            );
            Ok(())
        })
    }
}
