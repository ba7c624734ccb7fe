use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::identity::deserialize_optional_token;
use crate::models::{AnalyticsToken, ContentItem, ViewerId};
use crate::player::PlayerHandle;

/// Everything the page supplies apart from the player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackContext {
    pub item: Option<ContentItem>,
    /// An empty token in serialized form reads back as no token.
    #[serde(default, deserialize_with = "deserialize_optional_token")]
    pub token: Option<AnalyticsToken>,
    pub viewer_id: Option<ViewerId>,
    /// Feed or shelf that surfaced the item. Empty when unknown.
    #[serde(default)]
    pub feed_id: String,
}

/// Full input set for one reconciliation.
#[derive(Clone, Default)]
pub struct BridgeInputs {
    pub player: Option<Arc<dyn PlayerHandle>>,
    pub context: PlaybackContext,
}

impl BridgeInputs {
    pub fn new(player: Option<Arc<dyn PlayerHandle>>, context: PlaybackContext) -> Self {
        Self { player, context }
    }
}

impl fmt::Debug for BridgeInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeInputs")
            .field("player", &self.player.as_ref().map(|_| "<player>"))
            .field("context", &self.context)
            .finish()
    }
}
