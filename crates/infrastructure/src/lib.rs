//! Warden Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod auth;

pub use adapters::{MOCK_USER_ID, MockResponder, ReqwestHttpClient, USER_ENDPOINT};
pub use auth::{OidcConfig, OidcIdentityProvider, StaticIdentityProvider};
