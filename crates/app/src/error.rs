//! Binary-level errors

use thiserror::Error;
use warden_application::HttpClientError;
use warden_domain::AuthError;

/// Errors raised while starting the runtime.
#[derive(Debug, Error)]
pub enum AppError {
    /// A settings source could not be read or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A setting has an unusable value.
    #[error("invalid setting {key}: {message}")]
    InvalidSetting {
        /// Dotted settings key.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// The identity provider could not be built.
    #[error(transparent)]
    Identity(#[from] AuthError),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Http(#[from] HttpClientError),
}
