//! Track-list collaborators.
//!
//! Tracks reach the player from two places: a local directory scan and JSON
//! exports of the music backend (song lists, playlists, liked songs). Both
//! produce plain `Track` values that are copied into the play queue.

mod display;
mod import;
mod model;
mod scan;

use std::path::Path;

pub use display::{display_from_fields, format_duration_label};
use import::import_file;
pub use model::Track;
use scan::scan;

use crate::config::LibrarySettings;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed track list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} does not exist")]
    Missing(String),
}

/// Load the tracks named by a CLI argument: a `.json` export is imported,
/// anything else (directory or single audio file) is scanned.
pub fn load_tracks(path: &Path, settings: &LibrarySettings) -> Result<Vec<Track>, LibraryError> {
    if !path.exists() {
        return Err(LibraryError::Missing(path.display().to_string()));
    }

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        import_file(path, settings)
    } else {
        Ok(scan(path, settings))
    }
}
