//! Warden runtime wiring.
//!
//! Builds the identity provider and HTTP stack from [`Settings`], loads the
//! signed-in user's profile and keeps a session watchdog running until the
//! process is interrupted or the session ends.

pub mod settings;
mod error;

use std::sync::Arc;

use tracing::{info, warn};
use warden_application::{
    AuthenticatedFetch, FetchData, HttpClient, IdentityProvider, SessionStatus, SessionWatchdog,
};
use warden_domain::{FetchOptions, FetchState, SessionToken, UserProfile};
use warden_infrastructure::{
    MockResponder, OidcConfig, OidcIdentityProvider, ReqwestHttpClient, StaticIdentityProvider,
    USER_ENDPOINT,
};

pub use settings::{ApiSettings, IdentitySettings, MockSettings, Settings, WatchdogSettings};
pub use error::AppError;

/// Shown instead of the profile when there is no active session.
pub const LOGIN_PROMPT: &str = "Please log in to view your profile.";

/// Builds the identity provider described by `settings`.
///
/// # Errors
///
/// Returns an error if the tenant settings are incomplete or invalid.
pub async fn identity_provider(
    settings: &IdentitySettings,
) -> Result<Arc<dyn IdentityProvider>, AppError> {
    let Some(domain) = settings.domain.as_deref() else {
        info!("no identity domain configured, serving the development token");
        return Ok(Arc::new(StaticIdentityProvider::new(
            settings.dev_token.as_str(),
        )));
    };

    let client_id = settings
        .client_id
        .clone()
        .ok_or(AppError::InvalidSetting {
            key: "identity.client_id",
            message: "required when identity.domain is set".to_string(),
        })?;

    let mut config = OidcConfig::new(domain, client_id);
    config.audience.clone_from(&settings.audience);
    config.scope.clone_from(&settings.scope);
    let provider = OidcIdentityProvider::new(config)?;

    if let Some(refresh_token) = &settings.refresh_token {
        // Already expired, so the first token request runs the refresh grant.
        provider
            .sign_in(SessionToken::new(
                "",
                Some(0),
                Some(refresh_token.clone()),
                Vec::new(),
            ))
            .await;
    } else {
        warn!(domain, "no refresh token configured, every token request will require login");
    }

    Ok(Arc::new(provider))
}

/// Builds the HTTP stack, fronted by the mock responder when enabled.
///
/// # Errors
///
/// Returns an error if the network client cannot be created.
pub fn http_client(settings: &MockSettings) -> Result<Arc<dyn HttpClient>, AppError> {
    let network: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
    if !settings.enabled {
        return Ok(network);
    }

    info!(endpoint = USER_ENDPOINT, "mock responder enabled");
    Ok(Arc::new(
        MockResponder::with_default_handlers().with_fallback(network),
    ))
}

/// Fetches the profile at `url` and returns the settled state.
pub async fn load_profile(fetcher: AuthenticatedFetch, url: &str) -> FetchState<UserProfile> {
    let profile = FetchData::mount(fetcher, url, FetchOptions::new());
    let state = profile.settled().await;
    profile.teardown();
    state
}

/// Renders a profile state as text. Nothing is rendered when idle.
#[must_use]
pub fn render_profile(state: &FetchState<UserProfile>) -> Option<String> {
    if state.is_loading {
        return Some("Loading...".to_string());
    }
    if let Some(message) = state.error_message() {
        return Some(format!("Error: {message}"));
    }
    let profile = state.data.as_ref()?;
    Some(format!(
        "User Profile\nName: {}\nToken: {}",
        profile.full_name(),
        profile.token.as_deref().unwrap_or_default()
    ))
}

/// Renders the profile at `url`, or [`LOGIN_PROMPT`] without fetching
/// anything when no access token is available.
pub async fn home_view(
    identity: Arc<dyn IdentityProvider>,
    client: Arc<dyn HttpClient>,
    url: &str,
) -> Option<String> {
    if let Err(e) = identity.access_token().await {
        info!(error = %e, "no active session");
        return Some(LOGIN_PROMPT.to_string());
    }

    let state = load_profile(AuthenticatedFetch::new(identity, client), url).await;
    match &state.data {
        Some(profile) => info!(id = %profile.id, name = %profile.full_name(), "profile loaded"),
        None => warn!(error = state.error_message(), "profile unavailable"),
    }
    render_profile(&state)
}

/// Runs until Ctrl-C or until the watchdog ends the session.
///
/// # Errors
///
/// Returns an error if the identity provider or HTTP stack cannot be built.
pub async fn run(settings: Settings) -> Result<(), AppError> {
    let identity = identity_provider(&settings.identity).await?;
    let client = http_client(&settings.mock)?;

    let view = home_view(Arc::clone(&identity), client, &settings.api.profile_url).await;
    if let Some(view) = &view {
        println!("{view}");
    }
    if view.as_deref() == Some(LOGIN_PROMPT) {
        return Ok(());
    }

    let mut watchdog = SessionWatchdog::new(identity, settings.logout_params())
        .with_interval(settings.watchdog.interval())
        .spawn();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "failed to listen for Ctrl-C");
            }
            info!("shutting down");
        }
        () = watchdog.logged_out() => {
            info!("session ended");
        }
    }

    if watchdog.status() == SessionStatus::LoggedOut {
        println!("Logged out.");
    }
    watchdog.stop();
    Ok(())
}
