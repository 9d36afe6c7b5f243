//! Hand-written port doubles shared by the unit tests.

#![allow(clippy::expect_used)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use warden_domain::{
    AccessToken, AuthError, FetchRequest, FetchResponse, Headers, LogoutParams,
};

use crate::ports::{HttpClient, HttpClientError, IdentityProvider};

/// Identity provider returning a fixed token until `fail_from` checks.
pub struct MockIdentity {
    token: String,
    failure: Option<AuthError>,
    fail_from: usize,
    calls: AtomicUsize,
    logouts: Mutex<Vec<LogoutParams>>,
}

impl MockIdentity {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: token.to_string(),
            failure: None,
            fail_from: usize::MAX,
            calls: AtomicUsize::new(0),
            logouts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: AuthError) -> Self {
        Self::failing_after(0, error)
    }

    /// Succeeds for the first `ok_calls` calls, then fails.
    pub fn failing_after(ok_calls: usize, error: AuthError) -> Self {
        Self {
            failure: Some(error),
            fail_from: ok_calls,
            ..Self::with_token("test-token")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> Vec<LogoutParams> {
        self.logouts.lock().expect("logouts lock").clone()
    }
}

impl IdentityProvider for MockIdentity {
    fn access_token(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<AccessToken, AuthError>> + Send + '_>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match &self.failure {
            Some(error) if call >= self.fail_from => Err(error.clone()),
            _ => Ok(AccessToken::new(self.token.clone())),
        };
        Box::pin(async move { result })
    }

    fn logout<'a>(
        &'a self,
        params: &'a LogoutParams,
    ) -> Pin<Box<dyn Future<Output = Result<(), AuthError>> + Send + 'a>> {
        self.logouts
            .lock()
            .expect("logouts lock")
            .push(params.clone());
        Box::pin(async { Ok(()) })
    }
}

/// HTTP client that records requests and answers with a fixed result.
///
/// When gated, every request waits for a permit released by the test.
pub struct MockHttpClient {
    response: Result<FetchResponse, HttpClientError>,
    echo_url: bool,
    gate: Option<Arc<Semaphore>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl MockHttpClient {
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            response: Ok(FetchResponse::new(status, Headers::new(), body.as_bytes().to_vec())),
            echo_url: false,
            gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: HttpClientError) -> Self {
        Self {
            response: Err(error),
            ..Self::responding(200, "")
        }
    }

    /// Answers 200 with `{"url": <request url>}`.
    pub fn echoing_url() -> Self {
        Self {
            echo_url: true,
            ..Self::responding(200, "")
        }
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl HttpClient for MockHttpClient {
    fn execute<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FetchResponse, HttpClientError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        Box::pin(async move {
            if let Some(gate) = &self.gate {
                gate.acquire().await.expect("gate open").forget();
            }
            if self.echo_url {
                return Ok(FetchResponse::json_body(
                    200,
                    &serde_json::json!({ "url": request.url }),
                )
                .expect("serializable"));
            }
            self.response.clone()
        })
    }
}
