//! Periodic re-validation of the cached credential.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use warden_domain::LogoutParams;

use crate::ports::IdentityProvider;

/// Interval between two session checks.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Outcome of a session check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The identity provider still issues tokens.
    Active,
    /// Token refresh failed and the user was logged out.
    LoggedOut,
}

/// Watches the session and forces a logout once it can no longer be renewed.
///
/// A failed check is never reported as an error: it means the session is
/// over, and navigation passes to the identity provider's logout.
pub struct SessionWatchdog {
    identity: Arc<dyn IdentityProvider>,
    logout_params: LogoutParams,
    interval: Duration,
}

impl SessionWatchdog {
    /// Creates a watchdog checking every [`DEFAULT_CHECK_INTERVAL`].
    pub fn new(identity: Arc<dyn IdentityProvider>, logout_params: LogoutParams) -> Self {
        Self {
            identity,
            logout_params,
            interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    /// Sets the check interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Returns the check interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one check, logging out if the token cannot be obtained.
    pub async fn check_once(&self) -> SessionStatus {
        match self.identity.access_token().await {
            Ok(token) => {
                debug!(token = %token.preview(), "session still valid");
                SessionStatus::Active
            }
            Err(e) => {
                if e.is_session_over() {
                    warn!(error = %e, "session expired, logging out");
                } else {
                    warn!(error = %e, "token check failed, logging out");
                }
                if let Err(e) = self.identity.logout(&self.logout_params).await {
                    error!(error = %e, "logout after session expiry failed");
                }
                SessionStatus::LoggedOut
            }
        }
    }

    /// Starts checking on a background task. The first check runs one full
    /// interval after this call; the task ends after a forced logout.
    #[must_use]
    pub fn spawn(self) -> WatchdogHandle {
        let (status_tx, status_rx) = watch::channel(SessionStatus::Active);
        info!(interval_secs = self.interval.as_secs(), "session watchdog started");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let status = self.check_once().await;
                status_tx.send_replace(status);
                if status == SessionStatus::LoggedOut {
                    break;
                }
            }
        });

        WatchdogHandle {
            status: status_rx,
            task,
        }
    }
}

/// Handle to a running watchdog. Dropping it stops the checks.
pub struct WatchdogHandle {
    status: watch::Receiver<SessionStatus>,
    task: JoinHandle<()>,
}

impl WatchdogHandle {
    /// Returns the last observed status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Returns a receiver notified when the status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Waits until the watchdog has logged the user out.
    pub async fn logged_out(&mut self) {
        // The sender only closes once the task ends, which follows a logout
        // or `stop`.
        let _ = self
            .status
            .wait_for(|status| *status == SessionStatus::LoggedOut)
            .await;
    }

    /// Returns true while checks are still scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the checks.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for WatchdogHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
