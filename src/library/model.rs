use serde::{Deserialize, Serialize};

/// A playable item as the player sees it.
///
/// Tracks are plain values: lists that produce them own them, the queue holds
/// copies, and the player never edits their fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Human readable length (`m:ss`); may be absent until metadata is known.
    #[serde(default, alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_label: Option<String>,
    #[serde(default, alias = "cover")]
    pub cover_url: String,
    /// Fully qualified location of the media (`file://`, `http(s)://`).
    pub source_url: String,
}

impl Track {
    /// Whether two values denote the same queue entry.
    pub fn same_id(&self, other: &Track) -> bool {
        self.id == other.id
    }
}
