//! OpenID Connect identity provider backed by refresh tokens.
//!
//! Keeps the current session token in a [`SessionTokenStore`] and renews it
//! silently with the `refresh_token` grant, the way a browser SPA client
//! configured with rotating refresh tokens does.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;
use warden_application::SessionTokenStore;
use warden_application::ports::IdentityProvider;
use warden_domain::{AccessToken, AuthError, LogoutParams, SessionToken};

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Identity provider tenant settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcConfig {
    /// Tenant domain, e.g. `example.eu.auth0.com`. A full `http(s)://` base
    /// URL is accepted as well.
    pub domain: String,
    /// Public client identifier.
    pub client_id: String,
    /// API audience requested for access tokens.
    #[serde(default)]
    pub audience: Option<String>,
    /// Space-separated scopes requested on refresh.
    #[serde(default)]
    pub scope: Option<String>,
}

impl OidcConfig {
    /// Creates a config for `domain` and `client_id`.
    #[must_use]
    pub fn new(domain: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            audience: None,
            scope: None,
        }
    }

    fn base_url(&self) -> Result<Url, AuthError> {
        let raw = if self.domain.starts_with("http://") || self.domain.starts_with("https://") {
            self.domain.clone()
        } else {
            format!("https://{}", self.domain)
        };
        Url::parse(&raw).map_err(|e| AuthError::InvalidConfiguration {
            message: format!("invalid domain {:?}: {e}", self.domain),
        })
    }
}

/// Token endpoint success response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Token endpoint error response.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Identity provider client for an OIDC tenant.
pub struct OidcIdentityProvider {
    config: OidcConfig,
    base_url: Url,
    token_store: SessionTokenStore,
    http_client: reqwest::Client,
    refresh_lock: Mutex<()>,
}

impl OidcIdentityProvider {
    /// Create a provider with an empty token store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidConfiguration` if the domain is not a
    /// valid host or URL.
    pub fn new(config: OidcConfig) -> Result<Self, AuthError> {
        Self::with_token_store(config, SessionTokenStore::new())
    }

    /// Create with a shared token store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidConfiguration` if the domain is invalid.
    pub fn with_token_store(
        config: OidcConfig,
        token_store: SessionTokenStore,
    ) -> Result<Self, AuthError> {
        let base_url = config.base_url()?;
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::InvalidConfiguration {
                message: e.to_string(),
            })?;

        Ok(Self {
            config,
            base_url,
            token_store,
            http_client,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Get access to the token store.
    #[must_use]
    pub const fn token_store(&self) -> &SessionTokenStore {
        &self.token_store
    }

    /// Installs the session obtained at login.
    pub async fn sign_in(&self, token: SessionToken) {
        info!(token = %token.access_token.preview(), "session established");
        self.token_store.store(token).await;
    }

    /// Builds the tenant's logout URL for `params`.
    #[must_use]
    pub fn logout_url(&self, params: &LogoutParams) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/v2/logout");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            if let Some(return_to) = &params.return_to {
                query.append_pair("returnTo", return_to.as_str());
            }
            if params.federated {
                query.append_key_only("federated");
            }
        }
        url
    }

    fn token_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/oauth/token");
        url
    }

    /// Execute the refresh token grant.
    async fn refresh_token_flow(&self, refresh_token: &str) -> Result<SessionToken, AuthError> {
        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("refresh_token", refresh_token),
        ];
        if let Some(audience) = &self.config.audience {
            params.push(("audience", audience.as_str()));
        }
        if let Some(scope) = &self.config.scope {
            params.push(("scope", scope.as_str()));
        }

        let body = serde_urlencoded::to_string(&params).map_err(|e| AuthError::Network {
            message: format!("Failed to encode form: {e}"),
        })?;

        let response = self
            .http_client
            .post(self.token_url())
            .header("Content-Type", FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| AuthError::Network {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorResponse>(&error_text).map_or(
                error_text,
                |error_response| {
                    error_response
                        .error_description
                        .unwrap_or(error_response.error)
                },
            );
            return Err(AuthError::RefreshFailed { message });
        }

        let token_response: TokenResponse =
            response.json().await.map_err(|e| AuthError::Network {
                message: format!("Failed to parse token response: {e}"),
            })?;

        let scopes = token_response
            .scope
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default();

        // Without rotation the server omits the refresh token; keep the old one.
        let refresh_token = token_response
            .refresh_token
            .or_else(|| Some(refresh_token.to_string()));

        Ok(SessionToken::new(
            token_response.access_token,
            token_response.expires_in,
            refresh_token,
            scopes,
        ))
    }

    async fn current_token(&self) -> Result<AccessToken, AuthError> {
        if let Some(token) = self.token_store.get_fresh().await {
            return Ok(token.access_token);
        }

        // One refresh at a time: rotated refresh tokens are single-use.
        let _guard = self.refresh_lock.lock().await;
        if let Some(token) = self.token_store.get_fresh().await {
            return Ok(token.access_token);
        }

        let status = self.token_store.status().await;
        if status.should_refresh() {
            let Some(refresh_token) = self.token_store.refresh_token().await else {
                return Err(AuthError::LoginRequired);
            };
            debug!("refreshing access token");
            let token = self
                .refresh_token_flow(&refresh_token)
                .await
                .inspect_err(|e| warn!(error = %e, "token refresh failed"))?;
            let access_token = token.access_token.clone();
            self.token_store.store(token).await;
            return Ok(access_token);
        }

        // Expiring soon but not refreshable: usable until it actually expires.
        match self.token_store.get().await {
            Some(token) if !token.is_expired_or_expiring(0) => Ok(token.access_token),
            _ => Err(AuthError::LoginRequired),
        }
    }
}

impl IdentityProvider for OidcIdentityProvider {
    fn access_token(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<AccessToken, AuthError>> + Send + '_>> {
        Box::pin(self.current_token())
    }

    fn logout<'a>(
        &'a self,
        params: &'a LogoutParams,
    ) -> Pin<Box<dyn Future<Output = Result<(), AuthError>> + Send + 'a>> {
        Box::pin(async move {
            self.token_store.clear().await;
            let url = self.logout_url(params);
            info!(%url, "session cleared, continue at identity provider logout");
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OidcIdentityProvider {
        let mut config = OidcConfig::new(server.uri(), "client-123");
        config.audience = Some("https://api.example.com".to_string());
        OidcIdentityProvider::new(config).unwrap()
    }

    #[tokio::test]
    async fn fresh_token_is_served_from_store() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider(&server);
        provider
            .sign_in(SessionToken::new("cached", Some(3600), Some("r1".into()), vec![]))
            .await;

        let token = provider.access_token().await.unwrap();
        assert_eq!(token.as_str(), "cached");
    }

    #[tokio::test]
    async fn expiring_token_is_refreshed_and_rotated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=r1"))
            .and(body_string_contains("client_id=client-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "renewed",
                "token_type": "Bearer",
                "expires_in": 86400,
                "refresh_token": "r2",
                "scope": "openid profile"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        provider
            .sign_in(SessionToken::new("old", Some(10), Some("r1".into()), vec![]))
            .await;

        let token = provider.access_token().await.unwrap();

        assert_eq!(token.as_str(), "renewed");
        let stored = provider.token_store().get().await.unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("r2"));
        assert_eq!(stored.scopes, vec!["openid", "profile"]);
    }

    #[tokio::test]
    async fn rejected_refresh_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Unknown or invalid refresh token."
            })))
            .mount(&server)
            .await;

        let provider = provider(&server);
        provider
            .sign_in(SessionToken::new("old", Some(0), Some("r1".into()), vec![]))
            .await;

        let result = provider.access_token().await;

        assert_eq!(
            result,
            Err(AuthError::RefreshFailed {
                message: "Unknown or invalid refresh token.".to_string()
            })
        );
    }

    #[tokio::test]
    async fn no_session_requires_login() {
        let server = MockServer::start().await;
        let provider = provider(&server);

        assert_eq!(provider.access_token().await, Err(AuthError::LoginRequired));
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let server = MockServer::start().await;
        let provider = provider(&server);
        provider
            .sign_in(SessionToken::new("cached", None, None, vec![]))
            .await;

        provider.logout(&LogoutParams::default()).await.unwrap();

        assert_eq!(provider.access_token().await, Err(AuthError::LoginRequired));
    }

    #[test]
    fn logout_url_carries_params() {
        let provider =
            OidcIdentityProvider::new(OidcConfig::new("tenant.example.com", "client-123")).unwrap();
        let params = LogoutParams {
            return_to: Some(Url::parse("http://localhost:5173/").unwrap()),
            federated: true,
        };

        assert_eq!(
            provider.logout_url(&params).as_str(),
            "https://tenant.example.com/v2/logout?client_id=client-123&returnTo=http%3A%2F%2Flocalhost%3A5173%2F&federated"
        );
    }

    #[test]
    fn invalid_domain_is_rejected() {
        let result = OidcIdentityProvider::new(OidcConfig::new("http://", "client"));
        assert!(matches!(
            result,
            Err(AuthError::InvalidConfiguration { .. })
        ));
    }
}
