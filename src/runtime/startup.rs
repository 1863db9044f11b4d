use std::path::Path;

use tracing::{info, warn};

use crate::config;
use crate::library::{LibraryError, Track, load_tracks};
use crate::persist::{JsonFileStore, Snapshot, SnapshotWriter, load_snapshot};

/// Tracks named on the command line, if any.
pub fn tracks_from_arg(
    arg: Option<&str>,
    settings: &config::Settings,
) -> Result<Option<Vec<Track>>, LibraryError> {
    let Some(arg) = arg else {
        return Ok(None);
    };
    let tracks = load_tracks(Path::new(arg), &settings.library)?;
    info!(path = arg, tracks = tracks.len(), "loaded tracks from command line");
    Ok(Some(tracks))
}

/// Read the saved session and start the snapshot writer.
pub fn open_session(settings: &config::Settings) -> (Option<Snapshot>, Option<SnapshotWriter>) {
    if !settings.persistence.enabled {
        info!("session persistence disabled");
        return (None, None);
    }
    let Some(path) = settings.snapshot_path() else {
        warn!("no state directory; session will not be saved");
        return (None, None);
    };

    let store = JsonFileStore::new(path);
    info!(path = %store.path().display(), "session file");
    let restored = load_snapshot(&store);
    let writer = match SnapshotWriter::spawn(Box::new(store)) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "session will not be saved");
            None
        }
    };
    (restored, writer)
}
