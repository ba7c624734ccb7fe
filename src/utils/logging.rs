//! Logging macros gated on a per-module `ENABLE_LOGS` switch.
//!
//! The bridge forwards events at player frame rate, so each module decides
//! whether its chatter reaches the `log` facade at all:
//!
//! ```rust,ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info};
//!
//! log_info!("session {} bound", session_id);
//! ```

/// Info-level log, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!(target: "playback_telemetry", $($arg)*);
        }
    };
}

/// Warn-level counterpart of [`log_info!`].
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!(target: "playback_telemetry", $($arg)*);
        }
    };
}

/// Debug-level log for high-frequency paths (time events, stale handlers).
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!(target: "playback_telemetry", $($arg)*);
        }
    };
}
