//! Identity provider adapters.

mod oidc_provider;
mod static_provider;

pub use oidc_provider::{OidcConfig, OidcIdentityProvider};
pub use static_provider::StaticIdentityProvider;
