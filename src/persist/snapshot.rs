use serde::{Deserialize, Serialize};

use crate::library::Track;

/// What gets written to disk after each state change.
///
/// `current_index` is `-1` when the selection is not part of the queue (or
/// there is none). Every field is required; a file missing one is treated
/// as no snapshot at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub queue: Vec<Track>,
    pub current_index: i64,
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub current_time_seconds: f64,
    pub volume: u8,
}
