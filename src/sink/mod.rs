//! The analytics collector the bridge reports into.
//!
//! The host installs one sink for the lifetime of the process and hands it to
//! the bridge. Every call is fire-and-forget: the sink owns delivery and the
//! bridge never learns whether a call reached the collector.

mod recording;

use serde::{Deserialize, Serialize};

use crate::models::ViewerId;

pub use recording::{RecordingSink, SinkCall};

/// Arguments of the `ready` call, one per item activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyReport {
    pub token: String,
    pub origin: String,
    pub feed_id: String,
    pub media_id: String,
    pub title: String,
    pub viewer_id: Option<ViewerId>,
}

pub trait AnalyticsSink: Send + Sync {
    fn ready(&self, report: &ReadyReport);

    fn time(&self, position: f64, duration: f64);

    fn seek(&self, offset: f64, duration: f64);

    fn seeked(&self);

    fn complete(&self);

    fn ad_impression(&self);

    /// Flushes watch-time accrued since the last `time` call.
    fn remove(&self);
}
