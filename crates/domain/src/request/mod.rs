//! Outgoing request types

mod header;
mod method;
mod options;

pub use header::{AUTHORIZATION, Header, Headers};
pub use method::HttpMethod;
pub use options::{FetchOptions, FetchRequest};
