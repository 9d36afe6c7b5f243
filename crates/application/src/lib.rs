//! Warden Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits for the identity provider and the HTTP transport
//! - Authenticated fetch and the observable data-fetch state
//! - The session watchdog
//! - Application-level error handling

pub mod auth;
pub mod error;
pub mod fetch;
pub mod ports;
pub mod session;

#[cfg(test)]
mod test_support;

pub use auth::{SessionTokenStore, TokenStatus};
pub use error::{FetchError, FetchResult};
pub use fetch::{AuthenticatedFetch, FetchData};
pub use ports::{HttpClient, HttpClientError, IdentityProvider};
pub use session::{DEFAULT_CHECK_INTERVAL, SessionStatus, SessionWatchdog, WatchdogHandle};
