//! Observable data-fetch state.
//!
//! `FetchData` owns the `FetchState` of one consumer and drives it through
//! `idle -> loading -> {success, failed}` for a `(url, options)` identity.
//! Consumers read snapshots or subscribe to changes through a
//! `tokio::sync::watch` channel.
//!
//! Every request captures a generation number when it starts. Loading a new
//! identity, refetching, or dropping the container bumps the generation, and
//! a resolution is only written if its generation is still current. The bump
//! and the check both run inside the channel's modify closure, so they are
//! serialized with each other.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::debug;
use warden_domain::{FetchOptions, FetchState};

use super::AuthenticatedFetch;

/// State container for one consumer of a remote resource.
///
/// Requests run on spawned Tokio tasks, so `load` and `refetch` must be
/// called from within a Tokio runtime. In-flight requests are not aborted on
/// teardown; their results are discarded.
pub struct FetchData<T> {
    fetcher: AuthenticatedFetch,
    state: Arc<watch::Sender<FetchState<T>>>,
    generation: Arc<AtomicU64>,
    target: Option<(String, FetchOptions)>,
}

impl<T> FetchData<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    /// Creates an idle container. Nothing is fetched until `load`.
    #[must_use]
    pub fn new(fetcher: AuthenticatedFetch) -> Self {
        let (state, _) = watch::channel(FetchState::idle());
        Self {
            fetcher,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            target: None,
        }
    }

    /// Creates a container and immediately starts loading `url`.
    #[must_use]
    pub fn mount(fetcher: AuthenticatedFetch, url: impl Into<String>, options: FetchOptions) -> Self {
        let mut data = Self::new(fetcher);
        data.load(url, options);
        data
    }

    /// Points the container at `(url, options)`.
    ///
    /// Starts a request only when the identity differs from the one already
    /// loaded, so callers should keep `options` stable between calls.
    pub fn load(&mut self, url: impl Into<String>, options: FetchOptions) {
        let url = url.into();
        if self
            .target
            .as_ref()
            .is_some_and(|(u, o)| *u == url && *o == options)
        {
            return;
        }
        self.target = Some((url, options));
        self.start();
    }

    /// Requests the current identity again. Does nothing before `load`.
    pub fn refetch(&mut self) {
        self.start();
    }

    /// Returns a receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }

    /// Tears the consumer down. Results still in flight are dropped.
    pub fn teardown(self) {
        drop(self);
    }

    fn start(&self) {
        let Some((url, options)) = self.target.clone() else {
            return;
        };

        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            state.start_loading();
        });
        debug!(url = %url, generation, "fetch started");

        let fetcher = self.fetcher.clone();
        let sender = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);

        tokio::spawn(async move {
            let next = match fetcher.fetch_json::<T>(&url, &options).await {
                Ok(data) => FetchState::success(data),
                Err(e) => {
                    debug!(url = %url, generation, error = %e, "fetch failed");
                    FetchState::failed(e.to_failure())
                }
            };

            let applied = sender.send_if_modified(|state| {
                if current.load(Ordering::Acquire) != generation {
                    return false;
                }
                *state = next;
                true
            });

            if !applied {
                debug!(url = %url, generation, "discarding stale fetch result");
            }
        });
    }
}

impl<T> FetchData<T>
where
    T: Clone + DeserializeOwned + Send + Sync + 'static,
{
    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    /// Waits until no request is in flight and returns that state.
    pub async fn settled(&self) -> FetchState<T> {
        let mut receiver = self.state.subscribe();
        match receiver.wait_for(|state| !state.is_loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }
}

impl<T> Drop for FetchData<T> {
    fn drop(&mut self) {
        self.state.send_if_modified(|_| {
            self.generation.fetch_add(1, Ordering::AcqRel);
            false
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ports::HttpClientError;
    use crate::test_support::{MockHttpClient, MockIdentity};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio::sync::Semaphore;
    use warden_domain::{AuthError, FetchErrorKind};

    fn fetcher(client: MockHttpClient) -> (AuthenticatedFetch, Arc<MockHttpClient>) {
        let client = Arc::new(client);
        let fetch = AuthenticatedFetch::new(
            Arc::new(MockIdentity::with_token("test-token")),
            client.clone(),
        );
        (fetch, client)
    }

    #[tokio::test]
    async fn starts_idle_until_loaded() {
        let (fetch, client) = fetcher(MockHttpClient::responding(200, "{}"));
        let data = FetchData::<Value>::new(fetch);

        assert_eq!(data.state(), FetchState::idle());
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn successful_fetch_ends_with_data() {
        let (fetch, _) = fetcher(MockHttpClient::responding(200, r#"{"data":"test"}"#));
        let data = FetchData::<Value>::mount(fetch, "https://api.example.com", FetchOptions::new());

        let state = data.settled().await;

        assert_eq!(state, FetchState::success(json!({"data": "test"})));
    }

    #[tokio::test]
    async fn network_error_ends_with_error() {
        let (fetch, _) = fetcher(MockHttpClient::failing(HttpClientError::Other(
            "Network error".into(),
        )));
        let data = FetchData::<Value>::mount(fetch, "https://api.example.com", FetchOptions::new());

        let state = data.settled().await;

        assert!(!state.is_loading);
        assert_eq!(state.data, None);
        assert_eq!(state.error_message(), Some("Network error"));
        assert_eq!(state.error.map(|e| e.kind), Some(FetchErrorKind::Transport));
    }

    #[tokio::test]
    async fn not_found_ends_with_status_error() {
        let (fetch, _) = fetcher(MockHttpClient::responding(404, r#"{"error":"Not found"}"#));
        let data = FetchData::<Value>::mount(fetch, "https://api.example.com", FetchOptions::new());

        let state = data.settled().await;

        assert!(!state.is_loading);
        assert_eq!(state.data, None);
        assert!(state.error_message().is_some_and(|m| m.contains("404")));
    }

    #[tokio::test]
    async fn token_failure_ends_with_credential_error() {
        let client = Arc::new(MockHttpClient::responding(200, "{}"));
        let fetch = AuthenticatedFetch::new(
            Arc::new(MockIdentity::failing(AuthError::LoginRequired)),
            client.clone(),
        );
        let data = FetchData::<Value>::mount(fetch, "https://api.example.com", FetchOptions::new());

        let state = data.settled().await;

        assert_eq!(state.error.map(|e| e.kind), Some(FetchErrorKind::Credential));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn loading_while_in_flight() {
        let gate = Arc::new(Semaphore::new(0));
        let (fetch, _) = fetcher(MockHttpClient::responding(200, "{}").gated(gate.clone()));
        let data = FetchData::<Value>::mount(fetch, "https://api.example.com", FetchOptions::new());

        let state = data.state();
        assert!(state.is_loading);
        assert_eq!(state.data, None);
        assert_eq!(state.error, None);

        gate.add_permits(1);
        assert!(!data.settled().await.is_loading);
    }

    #[tokio::test]
    async fn same_identity_does_not_refetch() {
        let (fetch, client) = fetcher(MockHttpClient::responding(200, "{}"));
        let options = FetchOptions::new().with_header("Accept", "application/json");
        let mut data = FetchData::<Value>::mount(fetch, "https://api.example.com", options.clone());
        data.settled().await;

        data.load("https://api.example.com", options);
        data.settled().await;
        assert_eq!(client.requests().len(), 1);

        data.refetch();
        data.settled().await;
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn changed_options_trigger_refetch() {
        let (fetch, client) = fetcher(MockHttpClient::responding(200, "{}"));
        let mut data = FetchData::<Value>::mount(fetch, "https://api.example.com", FetchOptions::new());
        data.settled().await;

        data.load("https://api.example.com", FetchOptions::new().skip_auth());
        data.settled().await;

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].headers.contains("Authorization"));
        assert!(!requests[1].headers.contains("Authorization"));
    }

    #[tokio::test]
    async fn superseded_request_does_not_write() {
        let gate = Arc::new(Semaphore::new(0));
        let (fetch, _) = fetcher(MockHttpClient::echoing_url().gated(gate.clone()));
        let mut data = FetchData::<Value>::mount(fetch, "https://api.example.com/a", FetchOptions::new());
        let mut changes = data.subscribe();
        data.load("https://api.example.com/b", FetchOptions::new());
        changes.mark_unchanged();

        // The first permit goes to the request for /a.
        gate.add_permits(1);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!changes.has_changed().expect("channel open"));
        assert!(data.state().is_loading);

        gate.add_permits(1);
        let state = data.settled().await;
        assert_eq!(
            state,
            FetchState::success(json!({"url": "https://api.example.com/b"}))
        );
    }

    #[tokio::test]
    async fn teardown_discards_in_flight_result() {
        let gate = Arc::new(Semaphore::new(0));
        let (fetch, client) = fetcher(MockHttpClient::responding(200, "{}").gated(gate.clone()));
        let data = FetchData::<Value>::mount(fetch, "https://api.example.com", FetchOptions::new());
        let mut changes = data.subscribe();
        changes.mark_unchanged();

        data.teardown();
        gate.add_permits(1);

        // The channel closes when the request task finishes; a write would
        // have surfaced as a change first.
        let outcome = tokio::time::timeout(Duration::from_secs(1), changes.changed())
            .await
            .expect("request task finishes");
        assert!(outcome.is_err());
        assert!(changes.borrow().is_loading);
        assert_eq!(client.requests().len(), 1);
    }
}
