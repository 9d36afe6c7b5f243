//! Response types
//!
//! A transport-neutral view of an HTTP response: status code, headers
//! and the raw body, with helpers to read the body as text or JSON.

mod status;

use serde::de::DeserializeOwned;

pub use status::StatusCode;

use crate::request::Headers;

/// Response returned by the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: Headers,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Creates a response from raw parts.
    #[must_use]
    pub fn new(status: impl Into<StatusCode>, headers: Headers, body: Vec<u8>) -> Self {
        Self {
            status: status.into(),
            headers,
            body,
        }
    }

    /// Creates a JSON response from a serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn json_body<T: serde::Serialize>(
        status: impl Into<StatusCode>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json");
        Ok(Self::new(status, headers, body))
    }

    /// Returns true if the status code is 2xx.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Returns the body as a lossy UTF-8 string.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[test]
    fn json_body_sets_content_type() {
        let response = FetchResponse::json_body(200, &json!({"data": "test"})).expect("serializable");

        assert!(response.ok());
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.json::<Value>().expect("json"), json!({"data": "test"}));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let response = FetchResponse::new(200, Headers::new(), b"<html>".to_vec());
        assert!(response.json::<Value>().is_err());
        assert_eq!(response.text(), "<html>");
    }

    #[test]
    fn not_found_is_not_ok() {
        let response = FetchResponse::new(404, Headers::new(), Vec::new());
        assert!(!response.ok());
    }
}
