use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{PersistError, Snapshot};

/// Where snapshots live.
pub trait SnapshotStore: Send {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Snapshot>, PersistError>;
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), PersistError>;
}

/// A JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let body = serde_json::to_vec(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }
}

/// Read the saved session. Missing, unreadable and corrupt snapshots all
/// come back as `None`; startup never fails on them.
pub fn load_snapshot(store: &dyn SnapshotStore) -> Option<Snapshot> {
    match store.load() {
        Ok(Some(snapshot)) => {
            debug!(tracks = snapshot.queue.len(), "loaded session snapshot");
            Some(snapshot)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "ignoring unreadable session snapshot");
            None
        }
    }
}

/// In-memory store for tests; clones share the same slot.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: std::sync::Arc<std::sync::Mutex<Option<String>>>,
    fail_saves: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().unwrap().clone()
    }

    pub fn put_raw(&self, text: &str) {
        *self.slot.lock().unwrap() = Some(text.to_string());
    }
}

#[cfg(test)]
impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        match self.raw() {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), PersistError> {
        if self.fail_saves {
            return Err(PersistError::Io {
                path: PathBuf::from("<memory>"),
                source: io::Error::other("save refused"),
            });
        }
        self.put_raw(&serde_json::to_string(snapshot)?);
        Ok(())
    }
}
