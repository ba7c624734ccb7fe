//! The player side of the bridge.
//!
//! The page owns the player; the bridge only sees it through [`PlayerHandle`],
//! registers handlers for the six event kinds and reads the current duration.
//! It never issues playback commands.

pub mod events;
pub mod local;
pub mod subscription;

use std::sync::Arc;

use anyhow::Result;

pub use events::{PlayerEvent, PlayerEventKind};
pub use local::LocalPlayer;
pub use subscription::{subscribe, Subscription};

/// Callback installed on a player for one event kind.
pub type EventHandler = Arc<dyn Fn(&PlayerEvent) + Send + Sync>;

/// Identifies one registered handler on one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Live media-player instance as seen by the bridge.
pub trait PlayerHandle: Send + Sync {
    /// Registers `handler` for `kind`. Handlers are invoked synchronously
    /// on the thread that drives the player.
    fn on(&self, kind: PlayerEventKind, handler: EventHandler) -> Result<ListenerId>;

    /// Removes a handler. Must be a no-op for unknown or already removed ids.
    fn off(&self, kind: PlayerEventKind, listener: ListenerId);

    /// Duration of the active item as the player currently reports it.
    fn duration(&self) -> f64;
}

