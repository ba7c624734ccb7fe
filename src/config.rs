use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

use crate::models::AnalyticsToken;
use crate::providers::FeatureTokenProvider;

const DEBUG_ENV: &str = "PLAYBACK_TELEMETRY_DEBUG";
const ORIGIN_ENV: &str = "PLAYBACK_TELEMETRY_ORIGIN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub analytics_token: Option<String>,
    /// Host name the client is served from, reported with every `ready`.
    pub collector_origin: String,
    /// Log every forwarded call at debug level.
    pub debug: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            analytics_token: None,
            collector_origin: "localhost".into(),
            debug: false,
        }
    }
}

impl TelemetryConfig {
    /// Applies `PLAYBACK_TELEMETRY_DEBUG` and `PLAYBACK_TELEMETRY_ORIGIN`.
    pub fn with_env_overrides(mut self) -> Self {
        let debug_mode = std::env::var(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_mode {
            self.debug = true;
        }

        if let Ok(origin) = std::env::var(ORIGIN_ENV) {
            if !origin.trim().is_empty() {
                self.collector_origin = origin.trim().to_string();
            }
        }

        self
    }

    /// The token, unless telemetry is switched off.
    pub fn token(&self) -> Option<AnalyticsToken> {
        if !self.enabled {
            return None;
        }
        self.analytics_token.clone().and_then(AnalyticsToken::new)
    }
}

/// JSON-backed configuration shared between the host and the bridge.
pub struct ConfigStore {
    path: PathBuf,
    data: RwLock<TelemetryConfig>,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read telemetry config from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            TelemetryConfig::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data.with_env_overrides()),
        })
    }

    pub fn config(&self) -> TelemetryConfig {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update_token(&self, token: Option<String>) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.analytics_token = token;
        self.persist(&guard)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.enabled = enabled;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read telemetry config from {}", self.path.display()))?;
        let data: TelemetryConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid telemetry config in {}", self.path.display()))?;
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *guard = data.with_env_overrides();
        Ok(())
    }

    fn persist(&self, data: &TelemetryConfig) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write telemetry config to {}", self.path.display()))
    }
}

impl FeatureTokenProvider for ConfigStore {
    fn analytics_token(&self) -> Option<AnalyticsToken> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token()
    }
}
