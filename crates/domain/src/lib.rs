//! Warden Domain - Core types
//!
//! This crate defines the domain model for the Warden authenticated fetch
//! runtime: request and response descriptors, access tokens, logout
//! parameters and the observable fetch state.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod profile;
pub mod request;
pub mod response;
pub mod state;

pub use auth::{AccessToken, AuthError, LogoutParams, SessionToken};
pub use error::{DomainError, DomainResult};
pub use profile::UserProfile;
pub use request::{FetchOptions, FetchRequest, Header, Headers, HttpMethod, AUTHORIZATION};
pub use response::{FetchResponse, StatusCode};
pub use state::{FetchErrorKind, FetchFailure, FetchState};
