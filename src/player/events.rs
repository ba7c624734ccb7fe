use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed vocabulary of player events the bridge listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerEventKind {
    ItemReady,
    Time,
    Seek,
    Seeked,
    Complete,
    AdImpression,
}

impl PlayerEventKind {
    pub const ALL: [PlayerEventKind; 6] = [
        PlayerEventKind::ItemReady,
        PlayerEventKind::Time,
        PlayerEventKind::Seek,
        PlayerEventKind::Seeked,
        PlayerEventKind::Complete,
        PlayerEventKind::AdImpression,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerEventKind::ItemReady => "item-ready",
            PlayerEventKind::Time => "time",
            PlayerEventKind::Seek => "seek",
            PlayerEventKind::Seeked => "seeked",
            PlayerEventKind::Complete => "complete",
            PlayerEventKind::AdImpression => "ad-impression",
        }
    }
}

impl fmt::Display for PlayerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event as delivered by the player, payload included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PlayerEvent {
    /// The player activated a playlist entry.
    ItemReady { index: usize },
    Time { position: f64, duration: f64 },
    /// `duration` is whatever the player put on the payload. It is not
    /// trusted; see the seek handler.
    Seek {
        position: f64,
        offset: f64,
        duration: Option<f64>,
    },
    Seeked,
    Complete,
    AdImpression,
}

impl PlayerEvent {
    pub fn kind(&self) -> PlayerEventKind {
        match self {
            PlayerEvent::ItemReady { .. } => PlayerEventKind::ItemReady,
            PlayerEvent::Time { .. } => PlayerEventKind::Time,
            PlayerEvent::Seek { .. } => PlayerEventKind::Seek,
            PlayerEvent::Seeked => PlayerEventKind::Seeked,
            PlayerEvent::Complete => PlayerEventKind::Complete,
            PlayerEvent::AdImpression => PlayerEventKind::AdImpression,
        }
    }
}
