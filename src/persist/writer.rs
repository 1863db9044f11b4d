use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use tracing::{trace, warn};

use super::{PersistError, Snapshot, SnapshotStore};

/// Writes snapshots on a background thread so the UI never waits on disk.
///
/// Each submitted snapshot is written in order. After the first failed
/// write the thread keeps draining but stops writing; the session carries on
/// without persistence.
pub struct SnapshotWriter {
    tx: Option<Sender<Snapshot>>,
    handle: Option<JoinHandle<()>>,
}

impl SnapshotWriter {
    pub fn spawn(mut store: Box<dyn SnapshotStore>) -> Result<Self, PersistError> {
        let (tx, rx) = mpsc::channel::<Snapshot>();
        let handle = thread::Builder::new()
            .name("snapshot-writer".into())
            .spawn(move || {
                let mut failed = false;
                for snapshot in rx {
                    if failed {
                        continue;
                    }
                    match store.save(&snapshot) {
                        Ok(()) => trace!("session snapshot written"),
                        Err(e) => {
                            warn!(error = %e, "session snapshot write failed, persistence disabled");
                            failed = true;
                        }
                    }
                }
            })
            .map_err(PersistError::Spawn)?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn submit(&self, snapshot: Snapshot) {
        if let Some(tx) = &self.tx {
            if tx.send(snapshot).is_err() {
                warn!("snapshot writer has exited");
            }
        }
    }

    /// Flush pending writes and stop the thread.
    pub fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("snapshot writer panicked");
            }
        }
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        self.stop();
    }
}
