use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::player::MediaCmd;

#[derive(Debug)]
pub(super) enum AudioCmd {
    Media(MediaCmd),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    NoOutput(String),
    #[error("could not start audio thread: {0}")]
    Spawn(#[source] io::Error),
    #[error("unsupported media location: {0}")]
    Unsupported(String),
    #[error("{path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("fetching {url}: {message}")]
    Fetch { url: String, message: String },
    #[error("cannot decode media: {0}")]
    Decode(String),
}
