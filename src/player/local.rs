use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, PoisonError,
};

use anyhow::Result;

use super::{EventHandler, ListenerId, PlayerEvent, PlayerEventKind, PlayerHandle};

/// In-process player event hub.
///
/// Hosts that drive playback themselves (headless players, replays of
/// recorded sessions, tests) push events through [`LocalPlayer::emit`] and
/// the bridge sees them exactly as it would from a real player.
pub struct LocalPlayer {
    listeners: Mutex<HashMap<PlayerEventKind, Vec<(ListenerId, EventHandler)>>>,
    next_listener: AtomicU64,
    duration_bits: AtomicU64,
}

impl LocalPlayer {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
            duration_bits: AtomicU64::new(0f64.to_bits()),
        }
    }

    pub fn set_duration(&self, duration: f64) {
        self.duration_bits
            .store(duration.to_bits(), Ordering::SeqCst);
    }

    /// Delivers `event` to every handler registered for its kind, in
    /// registration order.
    pub fn emit(&self, event: &PlayerEvent) {
        // Snapshot so handlers may call back into the player.
        let handlers: Vec<EventHandler> = {
            let guard = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            guard
                .get(&event.kind())
                .map(|entries| entries.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        };

        for handler in handlers {
            handler(event);
        }
    }

    /// Tears the player down the way a page does on unmount: every handler
    /// is dropped and later `off` calls find nothing.
    pub fn destroy(&self) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn listener_count(&self) -> usize {
        let guard = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        guard.values().map(Vec::len).sum()
    }

    pub fn listeners_for(&self, kind: PlayerEventKind) -> usize {
        let guard = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        guard.get(&kind).map_or(0, Vec::len)
    }
}

impl Default for LocalPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerHandle for LocalPlayer {
    fn on(&self, kind: PlayerEventKind, handler: EventHandler) -> Result<ListenerId> {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::SeqCst));
        let mut guard = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        guard.entry(kind).or_default().push((id, handler));
        Ok(id)
    }

    fn off(&self, kind: PlayerEventKind, listener: ListenerId) {
        let mut guard = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entries) = guard.get_mut(&kind) {
            entries.retain(|(id, _)| *id != listener);
        }
    }

    fn duration(&self) -> f64 {
        f64::from_bits(self.duration_bits.load(Ordering::SeqCst))
    }
}
