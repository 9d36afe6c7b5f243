//! Session expiry watchdog.

mod watchdog;

pub use watchdog::{DEFAULT_CHECK_INTERVAL, SessionStatus, SessionWatchdog, WatchdogHandle};
