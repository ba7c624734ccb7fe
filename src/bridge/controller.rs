use std::sync::{atomic::Ordering, Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::handlers::{handler_for, HandlerContext};
use super::inputs::{BridgeInputs, PlaybackContext};
use super::state::{
    plan, BridgeState, BridgeStatus, Session, SessionKey, SetupAction, TeardownAction,
};
use crate::config::TelemetryConfig;
use crate::models::ContentItem;
use crate::player::{subscribe, PlayerHandle};
use crate::providers::{FeatureTokenProvider, IdentityProvider};
use crate::sink::{AnalyticsSink, ReadyReport};
use crate::{log_debug, log_info, log_warn};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeSnapshot {
    pub status: BridgeStatus,
    pub session_id: Option<Uuid>,
    pub media_id: Option<String>,
    pub feed_id: Option<String>,
    pub bound_at: Option<DateTime<Utc>>,
    /// Events forwarded by the current session.
    pub forwarded_events: u64,
    /// `remove()` calls issued since the bridge was created.
    pub flush_count: u64,
}

struct BridgeInner {
    inputs: BridgeInputs,
    state: BridgeState,
    flush_count: u64,
    sink: Option<Arc<dyn AnalyticsSink>>,
}

impl Drop for BridgeInner {
    fn drop(&mut self) {
        if let BridgeState::Bound(session) = std::mem::replace(&mut self.state, BridgeState::Unbound) {
            teardown_session(session, &TEARDOWN_ALL, self.sink.as_deref());
        }
    }
}

const TEARDOWN_ALL: [TeardownAction; 3] = [
    TeardownAction::Deactivate,
    TeardownAction::Unsubscribe,
    TeardownAction::Flush,
];

/// Keeps at most one subscription set between the page's player and the
/// analytics sink.
///
/// Every input change runs a reconciliation: the bound session, if any, is
/// deactivated, unsubscribed and flushed, and only then is a new one set up.
/// Cloning yields another handle to the same bridge; dropping the last handle
/// tears down a bound session the same way.
///
/// Sink and player calls run without the state lock, so a sink may read
/// [`snapshot`](Self::snapshot) or [`is_bound`](Self::is_bound) from inside
/// `remove()`. Reconciliations are serialized, so a sink must not call
/// `bind`/`reconcile` re-entrantly.
#[derive(Clone)]
pub struct TelemetryBridge {
    inner: Arc<Mutex<BridgeInner>>,
    reconciling: Arc<Mutex<()>>,
    sink: Option<Arc<dyn AnalyticsSink>>,
    origin: String,
    debug: bool,
}

impl TelemetryBridge {
    /// A bridge without a sink never binds and never reports.
    pub fn new(sink: Option<Arc<dyn AnalyticsSink>>, config: &TelemetryConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BridgeInner {
                inputs: BridgeInputs::default(),
                state: BridgeState::Unbound,
                flush_count: 0,
                sink: sink.clone(),
            })),
            reconciling: Arc::new(Mutex::new(())),
            sink,
            origin: config.collector_origin.clone(),
            debug: config.debug,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BridgeInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Points the bridge at a new player, or at none.
    pub fn bind(&self, player: Option<Arc<dyn PlayerHandle>>) {
        self.apply(|inputs| inputs.player = player);
    }

    pub fn set_context(&self, context: PlaybackContext) {
        self.apply(|inputs| inputs.context = context);
    }

    /// Changes the loaded item and the feed it came from.
    pub fn set_item(&self, item: Option<ContentItem>, feed_id: impl Into<String>) {
        let feed_id = feed_id.into();
        self.apply(|inputs| {
            inputs.context.item = item;
            inputs.context.feed_id = feed_id;
        });
    }

    /// Pulls the current token and viewer from the providers.
    pub fn refresh_from(&self, tokens: &dyn FeatureTokenProvider, identity: &dyn IdentityProvider) {
        let token = tokens.analytics_token();
        let viewer_id = identity.viewer_id();
        self.apply(|inputs| {
            inputs.context.token = token;
            inputs.context.viewer_id = viewer_id;
        });
    }

    /// Replaces every input at once.
    pub fn reconcile(&self, inputs: BridgeInputs) {
        self.apply(|current| *current = inputs);
    }

    /// The page is going away: flush and drop everything.
    pub fn unmount(&self) {
        self.reconcile(BridgeInputs::default());
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.lock().state, BridgeState::Bound(_))
    }

    pub fn snapshot(&self) -> BridgeSnapshot {
        let inner = self.lock();
        let session = inner.state.session();
        BridgeSnapshot {
            status: inner.state.status(),
            session_id: session.map(|s| s.id),
            media_id: session.map(|s| s.item.media_id.clone()),
            feed_id: session.map(|s| s.feed_id.clone()),
            bound_at: session.map(|s| s.bound_at),
            forwarded_events: session.map_or(0, |s| s.forwarded.load(Ordering::Relaxed)),
            flush_count: inner.flush_count,
        }
    }

    fn apply(&self, update: impl FnOnce(&mut BridgeInputs)) {
        let _serial = self
            .reconciling
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Decide under the state lock; talk to the sink and player outside it.
        let (transition, retired, inputs) = {
            let mut inner = self.lock();
            let mut inputs = inner.inputs.clone();
            update(&mut inputs);

            let transition = plan(&inner.state, &inputs, self.sink.is_some());
            inner.inputs = inputs.clone();

            if transition.is_noop() {
                return;
            }

            let retired = if transition.teardown.is_empty() {
                None
            } else {
                match std::mem::replace(&mut inner.state, BridgeState::Unbound) {
                    BridgeState::Bound(session) => {
                        inner.flush_count += 1;
                        Some(session)
                    }
                    BridgeState::Unbound => None,
                }
            };
            (transition, retired, inputs)
        };

        if let Some(session) = retired {
            teardown_session(session, &transition.teardown, self.sink.as_deref());
        }

        if transition.setup.is_empty() {
            log_debug!("telemetry inactive: player, item or token missing");
            return;
        }

        let Some(key) = SessionKey::from_inputs(&inputs) else {
            return;
        };
        match self.setup(&key, &inputs, &transition.setup) {
            Ok(session) => {
                log_info!(
                    "telemetry session {} bound to item {} (feed '{}')",
                    session.id,
                    session.item.media_id,
                    session.feed_id
                );
                self.lock().state = BridgeState::Bound(session);
            }
            Err(err) => {
                log_warn!("telemetry left unbound: {:#}", err);
            }
        }
    }

    fn setup(&self, key: &SessionKey, inputs: &BridgeInputs, actions: &[SetupAction]) -> Result<Session> {
        let Some(sink) = self.sink.clone() else {
            anyhow::bail!("no analytics sink installed");
        };

        let mut session = Session::new(key, inputs.context.viewer_id);
        let context = Arc::new(HandlerContext {
            session_id: session.id,
            sink,
            player: session.player.clone(),
            ready: ReadyReport {
                token: key.token.as_str().to_string(),
                origin: self.origin.clone(),
                feed_id: key.feed_id.clone(),
                media_id: key.item.media_id.clone(),
                title: key.item.title.clone(),
                viewer_id: session.viewer_id,
            },
            live: Arc::clone(&session.live),
            forwarded: Arc::clone(&session.forwarded),
            debug: self.debug,
        });

        for action in actions {
            let SetupAction::Subscribe(kind) = action;
            match subscribe(&key.player, *kind, handler_for(*kind, Arc::clone(&context))) {
                Ok(subscription) => session.subscriptions.push(subscription),
                Err(err) => {
                    // Nothing was forwarded yet, so there is nothing to flush.
                    session.live.store(false, Ordering::SeqCst);
                    for subscription in session.subscriptions.iter_mut() {
                        subscription.unsubscribe();
                    }
                    return Err(err);
                }
            }
        }

        Ok(session)
    }
}

fn teardown_session(mut session: Session, actions: &[TeardownAction], sink: Option<&dyn AnalyticsSink>) {
    for action in actions {
        match action {
            TeardownAction::Deactivate => session.live.store(false, Ordering::SeqCst),
            TeardownAction::Unsubscribe => {
                for subscription in session.subscriptions.iter_mut() {
                    subscription.unsubscribe();
                }
            }
            TeardownAction::Flush => {
                if let Some(sink) = sink {
                    sink.remove();
                }
            }
        }
    }

    log_info!(
        "telemetry session {} torn down after {} events",
        session.id,
        session.forwarded.load(Ordering::Relaxed)
    );
}
