//! Logout parameters

use serde::{Deserialize, Serialize};
use url::Url;

/// Parameters passed to the identity provider when logging out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutParams {
    /// Where the identity provider should send the user after logout.
    #[serde(default)]
    pub return_to: Option<Url>,
    /// Also end the session at the federated upstream provider.
    #[serde(default)]
    pub federated: bool,
}

impl LogoutParams {
    /// Logout parameters redirecting to `return_to`.
    #[must_use]
    pub const fn returning_to(return_to: Url) -> Self {
        Self {
            return_to: Some(return_to),
            federated: false,
        }
    }
}
