//! In-process request interceptor for local development and tests.
//!
//! `MockResponder` implements the `HttpClient` port by answering matching
//! requests from registered handlers. The default handler set serves the
//! user profile endpoint, echoing back the bearer token it received.
//! Requests without a handler go to the fallback client when one is set.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, warn};
use url::{Position, Url};
use warden_application::ports::{HttpClient, HttpClientError};
use warden_domain::{AUTHORIZATION, FetchRequest, FetchResponse, HttpMethod, UserProfile};

/// Profile endpoint served by the default handlers.
pub const USER_ENDPOINT: &str = "https://api.example.com/user";

/// Identifier of the mocked user.
pub const MOCK_USER_ID: &str = "c7b3d8e0-5e0b-4b0f-8b3a-3b9f4b3d3b3d";

type Handler = Arc<dyn Fn(&FetchRequest) -> Result<FetchResponse, HttpClientError> + Send + Sync>;

struct Route {
    method: HttpMethod,
    url: String,
    handler: Handler,
}

impl Route {
    /// Matches on method and on the URL up to its path; query and fragment
    /// are ignored.
    fn matches(&self, method: HttpMethod, url: &Url) -> bool {
        self.method == method && url[..Position::AfterPath] == self.url
    }
}

/// Request interceptor answering from registered handlers.
#[derive(Default)]
pub struct MockResponder {
    routes: Vec<Route>,
    fallback: Option<Arc<dyn HttpClient>>,
}

impl MockResponder {
    /// Creates a responder with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a responder serving `GET` [`USER_ENDPOINT`].
    #[must_use]
    pub fn with_default_handlers() -> Self {
        Self::new().route(HttpMethod::Get, USER_ENDPOINT, user_profile)
    }

    /// Registers a handler for `method` and `url`. Routes registered later
    /// take precedence.
    #[must_use]
    pub fn route<F>(mut self, method: HttpMethod, url: &str, handler: F) -> Self
    where
        F: Fn(&FetchRequest) -> Result<FetchResponse, HttpClientError> + Send + Sync + 'static,
    {
        let url = Url::parse(url).map_or_else(
            |_| url.to_string(),
            |parsed| parsed[..Position::AfterPath].to_string(),
        );
        self.routes.insert(
            0,
            Route {
                method,
                url,
                handler: Arc::new(handler),
            },
        );
        self
    }

    /// Sends unmatched requests to `client` instead of failing them.
    #[must_use]
    pub fn with_fallback(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.fallback = Some(client);
        self
    }

    fn find(&self, request: &FetchRequest) -> Option<&Route> {
        let url = Url::parse(&request.url).ok()?;
        self.routes.iter().find(|r| r.matches(request.method, &url))
    }
}

impl HttpClient for MockResponder {
    fn execute<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FetchResponse, HttpClientError>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(route) = self.find(request) {
                debug!(method = %request.method, url = %request.url, "mock handler matched");
                return (route.handler)(request);
            }

            match &self.fallback {
                Some(client) => {
                    warn!(method = %request.method, url = %request.url, "unhandled request, passing through");
                    client.execute(request).await
                }
                None => {
                    warn!(method = %request.method, url = %request.url, "unhandled request");
                    Err(HttpClientError::Unhandled {
                        method: request.method,
                        url: request.url.clone(),
                    })
                }
            }
        })
    }
}

/// Answers with the fixed profile and the token taken from `Authorization`.
fn user_profile(request: &FetchRequest) -> Result<FetchResponse, HttpClientError> {
    let token = request
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.split(' ').nth(1))
        .map(str::to_string);

    let profile = UserProfile {
        id: MOCK_USER_ID.to_string(),
        first_name: "John".to_string(),
        last_name: "Maverick".to_string(),
        token,
    };

    FetchResponse::json_body(200, &profile).map_err(|e| HttpClientError::Other(e.to_string()))
}
