//! Session persistence: the queue, selection and volume survive restarts.

mod snapshot;
mod store;
mod writer;

pub use snapshot::Snapshot;
pub use store::{JsonFileStore, SnapshotStore, load_snapshot};
pub use writer::SnapshotWriter;

#[cfg(test)]
pub use store::MemoryStore;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not start snapshot writer: {0}")]
    Spawn(std::io::Error),
}

#[cfg(test)]
mod tests;
