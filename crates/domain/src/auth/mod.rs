//! Authentication types: credentials, identity-provider errors and logout parameters.

mod logout;
mod types;

pub use logout::LogoutParams;
pub use types::{AccessToken, AuthError, SessionToken};
