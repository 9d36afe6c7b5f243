//! Infrastructure adapters

mod mock_responder;
mod reqwest_client;

pub use mock_responder::{MOCK_USER_ID, MockResponder, USER_ENDPOINT};
pub use reqwest_client::ReqwestHttpClient;
