use serde::{Deserialize, Serialize};

/// Media currently loaded on the page.
///
/// Two items are the same item only when both the id and the title match;
/// a retitled item rebinds the session so `ready` never reports a stale title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub media_id: String,
    pub title: String,
}

impl ContentItem {
    pub fn new(media_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            media_id: media_id.into(),
            title: title.into(),
        }
    }
}
