//! Authenticated fetch and the observable data-fetch state built on it.

mod authenticated;
mod data;

pub use authenticated::AuthenticatedFetch;
pub use data::FetchData;
