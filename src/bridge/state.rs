use std::sync::{
    atomic::{AtomicBool, AtomicU64},
    Arc, Weak,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::inputs::BridgeInputs;
use crate::models::{AnalyticsToken, ContentItem, ViewerId};
use crate::player::{PlayerEventKind, PlayerHandle, Subscription};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BridgeStatus {
    Unbound,
    Bound,
}

/// The values a session is bound to. Any difference forces a full rebind.
#[derive(Clone)]
pub struct SessionKey {
    pub player: Arc<dyn PlayerHandle>,
    pub item: ContentItem,
    pub token: AnalyticsToken,
    pub feed_id: String,
}

impl SessionKey {
    /// `None` unless player, item and token are all present.
    pub fn from_inputs(inputs: &BridgeInputs) -> Option<Self> {
        let player = inputs.player.clone()?;
        let item = inputs.context.item.clone()?;
        let token = inputs.context.token.clone()?;

        Some(Self {
            player,
            item,
            token,
            feed_id: inputs.context.feed_id.clone(),
        })
    }
}

/// One live subscription set and the values its handlers captured.
pub struct Session {
    pub id: Uuid,
    pub bound_at: DateTime<Utc>,
    pub(crate) player: Weak<dyn PlayerHandle>,
    pub item: ContentItem,
    pub token: AnalyticsToken,
    pub feed_id: String,
    pub viewer_id: Option<ViewerId>,
    pub(crate) subscriptions: Vec<Subscription>,
    /// Cleared before unsubscribing; handlers check it so nothing is
    /// forwarded once teardown has begun.
    pub(crate) live: Arc<AtomicBool>,
    pub(crate) forwarded: Arc<AtomicU64>,
}

impl Session {
    pub(crate) fn new(key: &SessionKey, viewer_id: Option<ViewerId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bound_at: Utc::now(),
            player: Arc::downgrade(&key.player),
            item: key.item.clone(),
            token: key.token.clone(),
            feed_id: key.feed_id.clone(),
            viewer_id,
            subscriptions: Vec::with_capacity(PlayerEventKind::ALL.len()),
            live: Arc::new(AtomicBool::new(true)),
            forwarded: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_bound_to(&self, key: &SessionKey) -> bool {
        std::ptr::addr_eq(self.player.as_ptr(), Arc::as_ptr(&key.player))
            && self.item == key.item
            && self.token == key.token
            && self.feed_id == key.feed_id
    }
}

pub enum BridgeState {
    Unbound,
    Bound(Session),
}

impl BridgeState {
    pub fn status(&self) -> BridgeStatus {
        match self {
            BridgeState::Unbound => BridgeStatus::Unbound,
            BridgeState::Bound(_) => BridgeStatus::Bound,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            BridgeState::Unbound => None,
            BridgeState::Bound(session) => Some(session),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownAction {
    /// Stop handlers from forwarding.
    Deactivate,
    Unsubscribe,
    /// Emit `remove()` to the sink.
    Flush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupAction {
    Subscribe(PlayerEventKind),
}

/// What one reconciliation has to do, teardown strictly first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub teardown: Vec<TeardownAction>,
    pub setup: Vec<SetupAction>,
}

impl Transition {
    pub fn is_noop(&self) -> bool {
        self.teardown.is_empty() && self.setup.is_empty()
    }
}

/// Decides how to move from `state` to the session `inputs` describe.
///
/// Without an installed sink the bridge never binds.
pub fn plan(state: &BridgeState, inputs: &BridgeInputs, sink_installed: bool) -> Transition {
    let desired = if sink_installed {
        SessionKey::from_inputs(inputs)
    } else {
        None
    };

    let mut transition = Transition::default();

    if let BridgeState::Bound(session) = state {
        if desired.as_ref().is_some_and(|key| session.is_bound_to(key)) {
            return transition;
        }
        transition.teardown = vec![
            TeardownAction::Deactivate,
            TeardownAction::Unsubscribe,
            TeardownAction::Flush,
        ];
    }

    if desired.is_some() {
        transition.setup = PlayerEventKind::ALL
            .iter()
            .map(|kind| SetupAction::Subscribe(*kind))
            .collect();
    }

    transition
}
