//! Authenticated Fetch use case
//!
//! Wraps the `HttpClient` port and attaches a bearer token obtained from
//! the `IdentityProvider` to every request that does not opt out.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, error};
use warden_domain::{AUTHORIZATION, FetchOptions, FetchRequest, FetchResponse};

use crate::error::{FetchError, FetchResult};
use crate::ports::{HttpClient, IdentityProvider};

/// Use case for issuing requests on behalf of the signed-in user.
///
/// Tokens are not cached here: every authenticated call asks the identity
/// provider, which owns caching and refresh.
///
/// # Example
///
/// ```ignore
/// let fetch = AuthenticatedFetch::new(identity, Arc::new(ReqwestHttpClient::new()?));
///
/// let response = fetch.fetch("https://api.example.com/user", &FetchOptions::new()).await?;
/// let public = fetch
///     .fetch("https://api.example.com/status", &FetchOptions::new().skip_auth())
///     .await?;
/// ```
#[derive(Clone)]
pub struct AuthenticatedFetch {
    identity: Arc<dyn IdentityProvider>,
    client: Arc<dyn HttpClient>,
}

impl AuthenticatedFetch {
    /// Creates the use case from its two collaborators.
    pub fn new(identity: Arc<dyn IdentityProvider>, client: Arc<dyn HttpClient>) -> Self {
        Self { identity, client }
    }

    /// Issues a request, adding `Authorization: Bearer <token>` unless
    /// `options.skip_auth` is set.
    ///
    /// Caller headers are kept, except that an `Authorization` header is
    /// replaced by the bearer credential.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Credential` with the provider's error if no token
    /// could be obtained (no request is sent in that case), and
    /// `FetchError::Transport` if the transport fails.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> FetchResult<FetchResponse> {
        let mut request = FetchRequest::new(url, options);

        if options.skip_auth {
            debug!(method = %request.method, url, "fetching without credentials");
            return Ok(self.client.execute(&request).await?);
        }

        let token = self
            .identity
            .access_token()
            .await
            .inspect_err(|e| error!(error = %e, url, "Error getting access token"))?;
        debug!(method = %request.method, url, token = %token.preview(), "fetching with bearer token");

        request.headers.set(AUTHORIZATION, token.bearer());
        Ok(self.client.execute(&request).await?)
    }

    /// Fetches and parses a JSON body.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`fetch`](Self::fetch), returns
    /// `FetchError::Status` for a non-2xx response and `FetchError::Parse`
    /// when the body is not valid JSON for `T`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> FetchResult<T> {
        let response = self.fetch(url, options).await?;

        if !response.ok() {
            return Err(FetchError::Status {
                status: response.status,
            });
        }

        Ok(response.json()?)
    }
}
