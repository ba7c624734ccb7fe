use serde::{Deserialize, Serialize};
use std::fmt;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Capability token that switches telemetry on for this deployment.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnalyticsToken(String);

impl AnalyticsToken {
    /// Empty strings are treated the same as a missing token.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AnalyticsToken {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| anyhow::anyhow!("analytics token must not be empty"))
    }
}

impl From<AnalyticsToken> for String {
    fn from(token: AnalyticsToken) -> Self {
        token.0
    }
}

/// Reads an optional token, treating `""` the same as a missing one.
pub fn deserialize_optional_token<'de, D>(deserializer: D) -> Result<Option<AnalyticsToken>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(AnalyticsToken::new))
}

// Tokens end up in log lines; keep them out.
impl fmt::Debug for AnalyticsToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnalyticsToken(..)")
    }
}

/// Numeric id of the signed-in viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerId(pub u64);

impl ViewerId {
    /// Converts the account store's string user id. Only non-negative
    /// integers are viewer ids; anything else gives `None`.
    pub fn from_account_id(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        match trimmed.parse::<u64>() {
            Ok(id) => Some(Self(id)),
            Err(err) => {
                log_warn!("ignoring non-numeric viewer id '{}': {}", trimmed, err);
                None
            }
        }
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
