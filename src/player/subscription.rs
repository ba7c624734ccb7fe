use std::sync::{Arc, Weak};

use anyhow::{Context, Result};

use super::{EventHandler, ListenerId, PlayerEventKind, PlayerHandle};

/// One handler registered on one player.
///
/// The subscription holds the player weakly: if the page has already dropped
/// the player, unsubscribing does nothing. Dropping a subscription
/// unsubscribes it.
pub struct Subscription {
    player: Weak<dyn PlayerHandle>,
    kind: PlayerEventKind,
    listener: Option<ListenerId>,
}

/// Registers `handler` for `kind` on `player`.
pub fn subscribe(
    player: &Arc<dyn PlayerHandle>,
    kind: PlayerEventKind,
    handler: EventHandler,
) -> Result<Subscription> {
    let listener = player
        .on(kind, handler)
        .with_context(|| format!("failed to subscribe to '{kind}' events"))?;

    Ok(Subscription {
        player: Arc::downgrade(player),
        kind,
        listener: Some(listener),
    })
}

impl Subscription {
    pub fn kind(&self) -> PlayerEventKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.listener.is_some()
    }

    /// Removes the handler from the player. Safe to call any number of times.
    pub fn unsubscribe(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };

        if let Some(player) = self.player.upgrade() {
            player.off(self.kind, listener);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("listener", &self.listener)
            .finish()
    }
}
