use serde::{Deserialize, Serialize};

const WATCH_BASE: &str = "https://www.youtube.com/watch";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub video_id: String,
    pub title: String,
    pub position: u32,
}

pub fn watch_url(video_id: &str) -> String {
    format!("{}?v={}", WATCH_BASE, urlencoding::encode(video_id))
}

/// One decoded page of playlist items, ordered by `position`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistPage {
    entries: Vec<PlaylistEntry>,
}

impl PlaylistPage {
    pub fn new(mut entries: Vec<PlaylistEntry>) -> Self {
        // stable: duplicates and ties keep response order
        entries.sort_by_key(|e| e.position);
        Self { entries }
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }
}
