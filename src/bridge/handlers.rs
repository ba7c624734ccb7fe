use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Weak,
};

use uuid::Uuid;

use crate::player::{EventHandler, PlayerEvent, PlayerEventKind, PlayerHandle};
use crate::sink::{AnalyticsSink, ReadyReport};
use crate::log_debug;

const ENABLE_LOGS: bool = true;

/// State shared by the handlers of one session. Everything here is captured
/// at bind time; later changes to the page's inputs never reach it.
pub(crate) struct HandlerContext {
    pub session_id: Uuid,
    pub sink: Arc<dyn AnalyticsSink>,
    pub player: Weak<dyn PlayerHandle>,
    pub ready: ReadyReport,
    pub live: Arc<AtomicBool>,
    pub forwarded: Arc<AtomicU64>,
    pub debug: bool,
}

impl HandlerContext {
    fn forward(&self, event: &PlayerEvent) {
        if !self.live.load(Ordering::SeqCst) {
            log_debug!(
                "session {}: dropping '{}' delivered after teardown",
                self.session_id,
                event.kind()
            );
            return;
        }

        match event {
            PlayerEvent::ItemReady { .. } => self.sink.ready(&self.ready),
            PlayerEvent::Time { position, duration } => self.sink.time(*position, *duration),
            PlayerEvent::Seek { offset, .. } => {
                // The payload duration is unreliable; ask the player instead.
                let Some(player) = self.player.upgrade() else {
                    log_debug!("session {}: seek after player was dropped", self.session_id);
                    return;
                };
                self.sink.seek(*offset, player.duration());
            }
            PlayerEvent::Seeked => self.sink.seeked(),
            PlayerEvent::Complete => self.sink.complete(),
            PlayerEvent::AdImpression => self.sink.ad_impression(),
        }

        self.forwarded.fetch_add(1, Ordering::Relaxed);
        if self.debug {
            log_debug!(
                "session {}: forwarded {:?}",
                self.session_id,
                event
            );
        }
    }
}

/// Builds the handler installed for `kind`. Events of any other kind that
/// reach it are ignored.
pub(crate) fn handler_for(kind: PlayerEventKind, context: Arc<HandlerContext>) -> EventHandler {
    Arc::new(move |event: &PlayerEvent| {
        if event.kind() != kind {
            return;
        }
        context.forward(event);
    })
}
