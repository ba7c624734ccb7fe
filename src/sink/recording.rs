use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::{AnalyticsSink, ReadyReport};

/// One call made into an [`AnalyticsSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum SinkCall {
    Ready(ReadyReport),
    Time { position: f64, duration: f64 },
    Seek { offset: f64, duration: f64 },
    Seeked,
    Complete,
    AdImpression,
    Remove,
}

/// Sink that keeps every call in order. Useful for tests and for hosts that
/// batch telemetry themselves.
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: SinkCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns and clears the recorded calls.
    pub fn take(&self) -> Vec<SinkCall> {
        std::mem::take(&mut *self.calls.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn count(&self, predicate: impl Fn(&SinkCall) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| predicate(call))
            .count()
    }
}

impl AnalyticsSink for RecordingSink {
    fn ready(&self, report: &ReadyReport) {
        self.push(SinkCall::Ready(report.clone()));
    }

    fn time(&self, position: f64, duration: f64) {
        self.push(SinkCall::Time { position, duration });
    }

    fn seek(&self, offset: f64, duration: f64) {
        self.push(SinkCall::Seek { offset, duration });
    }

    fn seeked(&self) {
        self.push(SinkCall::Seeked);
    }

    fn complete(&self) {
        self.push(SinkCall::Complete);
    }

    fn ad_impression(&self) {
        self.push(SinkCall::AdImpression);
    }

    fn remove(&self) {
        self.push(SinkCall::Remove);
    }
}
