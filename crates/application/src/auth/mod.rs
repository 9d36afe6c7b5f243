//! Session credential storage shared by identity provider adapters.

mod token_store;

pub use token_store::{SessionTokenStore, TokenStatus};
