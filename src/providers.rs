//! Inputs the page supplies besides the player itself.

use crate::models::{AnalyticsToken, ViewerId};

/// Yields the token that enables telemetry. `None` disables the bridge.
pub trait FeatureTokenProvider {
    fn analytics_token(&self) -> Option<AnalyticsToken>;
}

/// Yields the signed-in viewer, if any.
pub trait IdentityProvider {
    fn viewer_id(&self) -> Option<ViewerId>;
}

/// Viewer as the account store describes it: a string user id, absent for
/// anonymous viewers.
#[derive(Debug, Clone, Default)]
pub struct AccountIdentity {
    pub user_id: Option<String>,
}

impl AccountIdentity {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl IdentityProvider for AccountIdentity {
    fn viewer_id(&self) -> Option<ViewerId> {
        self.user_id.as_deref().and_then(ViewerId::from_account_id)
    }
}

impl FeatureTokenProvider for Option<AnalyticsToken> {
    fn analytics_token(&self) -> Option<AnalyticsToken> {
        self.clone()
    }
}
