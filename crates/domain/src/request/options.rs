//! Per-call fetch options and the request descriptor built from them

use serde::{Deserialize, Serialize};

use super::{Headers, HttpMethod};

/// Options for a single fetch, mirroring the caller-facing request init.
///
/// Two option sets compare equal when every field matches; the data-fetch
/// state container uses this equality (together with the URL) to decide
/// whether a new request is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchOptions {
    /// HTTP method, GET unless set.
    #[serde(default)]
    pub method: HttpMethod,
    /// Caller-supplied headers.
    #[serde(default)]
    pub headers: Headers,
    /// Optional request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// When set, no credential is looked up or attached.
    #[serde(default)]
    pub skip_auth: bool,
}

impl FetchOptions {
    /// Creates default options: GET, no headers, no body, authenticated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub const fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Adds or replaces a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets a JSON body and the matching content type.
    #[must_use]
    pub fn with_json_body(mut self, body: impl Into<String>) -> Self {
        self.headers.set("Content-Type", "application/json");
        self.body = Some(body.into());
        self
    }

    /// Opts this request out of authentication.
    #[must_use]
    pub const fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }
}

/// A fully resolved outgoing request, handed to the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Target URL, parsed by the transport.
    pub url: String,
    /// Headers to send.
    pub headers: Headers,
    /// Optional body.
    pub body: Option<String>,
}

impl FetchRequest {
    /// Builds the request for `url` from caller options, dropping the
    /// `skip_auth` flag which never reaches the wire.
    #[must_use]
    pub fn new(url: impl Into<String>, options: &FetchOptions) -> Self {
        Self {
            method: options.method,
            url: url.into(),
            headers: options.headers.clone(),
            body: options.body.clone(),
        }
    }

    /// Creates a bare GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, &FetchOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_inherits_caller_options() {
        let options = FetchOptions::new()
            .with_method(HttpMethod::Post)
            .with_header("X-Request-Id", "42")
            .with_json_body(r#"{"name":"x"}"#);

        let request = FetchRequest::new("https://api.example.com/items", &options);

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers.get("x-request-id"), Some("42"));
        assert_eq!(request.headers.get("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(r#"{"name":"x"}"#));
    }

    #[test]
    fn options_identity_is_structural() {
        let a = FetchOptions::new().with_header("Accept", "application/json");
        let b = FetchOptions::new().with_header("Accept", "application/json");
        assert_eq!(a, b);
        assert_ne!(a, b.skip_auth());
    }

    #[test]
    fn deserializes_with_defaults() {
        let options: FetchOptions =
            serde_json::from_str(r#"{"skip_auth": true}"#).expect("valid options");
        assert_eq!(options.method, HttpMethod::Get);
        assert!(options.headers.is_empty());
        assert!(options.skip_auth);
    }
}
