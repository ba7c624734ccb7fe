//! Playback telemetry bridge.
//!
//! Attaches to a live media player, listens to its lifecycle and progress
//! events, and forwards them to an analytics collector. At most one
//! subscription set exists at a time, and every teardown flushes the
//! collector before a new session is bound.

mod utils;

pub mod bridge;
pub mod config;
pub mod models;
pub mod player;
pub mod providers;
pub mod sink;

pub use bridge::{BridgeDriver, BridgeInputs, BridgeSnapshot, PlaybackContext, TelemetryBridge};
pub use config::{ConfigStore, TelemetryConfig};
pub use models::{AnalyticsToken, ContentItem, ViewerId};
pub use player::{LocalPlayer, PlayerEvent, PlayerEventKind, PlayerHandle, Subscription};
pub use providers::{AccountIdentity, FeatureTokenProvider, IdentityProvider};
pub use sink::{AnalyticsSink, ReadyReport, RecordingSink, SinkCall};

/// Installs the `env_logger` backend. `RUST_LOG` overrides the default
/// `info` level. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
