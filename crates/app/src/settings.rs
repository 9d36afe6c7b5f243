//! Runtime settings.
//!
//! Read once at startup from an optional `warden.toml` and from `WARDEN_`
//! environment variables, e.g. `WARDEN_IDENTITY__DOMAIN` for
//! `identity.domain`. Environment values override the file.

use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;
use warden_application::DEFAULT_CHECK_INTERVAL;
use warden_domain::LogoutParams;
use warden_infrastructure::USER_ENDPOINT;

use crate::AppError;

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Identity provider settings
    #[serde(default)]
    pub identity: IdentitySettings,
    /// Where logout sends the user
    #[serde(default)]
    pub logout: LogoutParams,
    /// Session watchdog settings
    #[serde(default)]
    pub watchdog: WatchdogSettings,
    /// API endpoints
    #[serde(default)]
    pub api: ApiSettings,
    /// Mock responder settings
    #[serde(default)]
    pub mock: MockSettings,
}

/// Identity provider tenant and credentials.
///
/// Without a `domain`, the development token is served by a static provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySettings {
    /// Tenant domain
    #[serde(default)]
    pub domain: Option<String>,
    /// Public client identifier, required with `domain`
    #[serde(default)]
    pub client_id: Option<String>,
    /// API audience
    #[serde(default)]
    pub audience: Option<String>,
    /// Space-separated scopes requested on refresh
    #[serde(default)]
    pub scope: Option<String>,
    /// Refresh token from a previous login
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token served when no tenant is configured
    #[serde(default = "default_dev_token")]
    pub dev_token: String,
}

/// Session watchdog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogSettings {
    /// Seconds between session checks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

/// API endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Profile endpoint
    #[serde(default = "default_profile_url")]
    pub profile_url: String,
}

/// Mock responder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockSettings {
    /// Answer the API endpoints locally
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_dev_token() -> String {
    "dev-token".to_string()
}

const fn default_interval_secs() -> u64 {
    DEFAULT_CHECK_INTERVAL.as_secs()
}

fn default_profile_url() -> String {
    USER_ENDPOINT.to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            domain: None,
            client_id: None,
            audience: None,
            scope: None,
            refresh_token: None,
            dev_token: default_dev_token(),
        }
    }
}

impl Default for WatchdogSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            profile_url: default_profile_url(),
        }
    }
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Settings {
    /// Load settings from `warden.toml` (if present) and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, AppError> {
        let config = Config::builder()
            .add_source(File::with_name("warden").required(false))
            .add_source(
                Environment::with_prefix("WARDEN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, AppError> {
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.watchdog.interval_secs == 0 {
            return Err(AppError::InvalidSetting {
                key: "watchdog.interval_secs",
                message: "must be at least 1".to_string(),
            });
        }
        if self.identity.domain.is_some() && self.identity.client_id.is_none() {
            return Err(AppError::InvalidSetting {
                key: "identity.client_id",
                message: "required when identity.domain is set".to_string(),
            });
        }
        Url::parse(&self.api.profile_url).map_err(|e| AppError::InvalidSetting {
            key: "api.profile_url",
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Logout parameters shared by every logout path.
    #[must_use]
    pub fn logout_params(&self) -> LogoutParams {
        self.logout.clone()
    }
}

impl WatchdogSettings {
    /// Interval between session checks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
