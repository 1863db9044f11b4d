//! Opening media locations as seekable rodio sources.
//!
//! Local files are streamed from disk; remote ones are downloaded whole so
//! that seeking works the same for both.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use rodio::Decoder;
use url::Url;

use super::types::AudioError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Location {
    Path(PathBuf),
    Remote(String),
}

/// Classify a track's source URL.
pub(super) fn locate(url: &str) -> Result<Location, AudioError> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Ok(Location::Remote(url.to_string()));
    }
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "file" => parsed
            .to_file_path()
            .map(Location::Path)
            .map_err(|()| AudioError::Unsupported(url.to_string())),
        // Single-letter schemes are drive letters, not URLs.
        Ok(parsed) if parsed.scheme().len() > 1 => Err(AudioError::Unsupported(url.to_string())),
        _ => Ok(Location::Path(PathBuf::from(url))),
    }
}

pub(super) enum MediaReader {
    File(BufReader<File>),
    Memory(Cursor<Vec<u8>>),
}

impl Read for MediaReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            MediaReader::File(r) => r.read(buf),
            MediaReader::Memory(r) => r.read(buf),
        }
    }
}

impl Seek for MediaReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            MediaReader::File(r) => r.seek(pos),
            MediaReader::Memory(r) => r.seek(pos),
        }
    }
}

/// Open `url` and build a decoder for it.
pub(super) fn open_source(
    url: &str,
    agent: &ureq::Agent,
) -> Result<Decoder<MediaReader>, AudioError> {
    let (reader, len, hint) = match locate(url)? {
        Location::Path(path) => {
            let (reader, len) = open_file(&path)?;
            (reader, len, extension_hint(&path.to_string_lossy()))
        }
        Location::Remote(remote) => {
            let bytes = fetch(&remote, agent)?;
            let len = bytes.len() as u64;
            let hint = Url::parse(&remote)
                .ok()
                .and_then(|u| extension_hint(u.path()));
            (MediaReader::Memory(Cursor::new(bytes)), len, hint)
        }
    };

    let mut builder = Decoder::builder()
        .with_data(reader)
        .with_byte_len(len)
        .with_seekable(true);
    if let Some(hint) = &hint {
        builder = builder.with_hint(hint);
    }
    builder.build().map_err(|e| AudioError::Decode(e.to_string()))
}

fn open_file(path: &Path) -> Result<(MediaReader, u64), AudioError> {
    let open_err = |source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_err)?;
    let len = file.metadata().map_err(open_err)?.len();
    Ok((MediaReader::File(BufReader::new(file)), len))
}

fn fetch(url: &str, agent: &ureq::Agent) -> Result<Vec<u8>, AudioError> {
    let fetch_err = |message: String| AudioError::Fetch {
        url: url.to_string(),
        message,
    };
    let response = agent.get(url).call().map_err(|e| fetch_err(e.to_string()))?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| fetch_err(e.to_string()))?;
    Ok(bytes)
}

fn extension_hint(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}
