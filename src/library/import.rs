//! Importer for JSON exports of the music backend.
//!
//! Accepted shapes: an array of song records, an array of liked-song
//! entries (`{"song": {...}}`), a playlist object (`{"songs": [...]}`), or
//! an array of already-normalized `Track` values.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::LibrarySettings;

use super::LibraryError;
use super::display::format_duration_label;
use super::model::Track;

/// A song as served by the backend's REST API.
#[derive(Debug, Deserialize)]
struct SongRecord {
    id: RecordId,
    title: String,
    artist: String,
    #[serde(default)]
    album: Option<String>,
    file: String,
    #[serde(default)]
    cover_image: Option<String>,
    /// Length in seconds.
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Number(u64),
    Text(String),
}

impl RecordId {
    fn into_string(self) -> String {
        match self {
            RecordId::Number(n) => n.to_string(),
            RecordId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Track(Track),
    Liked { song: SongRecord },
    Song(SongRecord),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TrackFile {
    List(Vec<Entry>),
    Playlist { songs: Vec<Entry> },
}

/// Resolve a media path from a song record into a full URL.
///
/// Absolute `http…` locations are kept, relative ones live under
/// `{api_base_url}/media/`, and missing ones become `placeholder`.
pub fn resolve_media_url(api_base_url: &str, path: Option<&str>, placeholder: &str) -> String {
    match path.map(str::trim).filter(|p| !p.is_empty()) {
        None => placeholder.to_string(),
        Some(p) if p.starts_with("http") => p.to_string(),
        Some(p) => format!(
            "{}/media/{}",
            api_base_url.trim_end_matches('/'),
            p.trim_start_matches('/')
        ),
    }
}

fn song_to_track(song: SongRecord, settings: &LibrarySettings) -> Track {
    Track {
        id: song.id.into_string(),
        title: song.title,
        artist: song.artist,
        album: song.album.filter(|a| !a.trim().is_empty()),
        duration_label: song.duration.filter(|d| *d > 0.0).map(format_duration_label),
        cover_url: resolve_media_url(
            &settings.api_base_url,
            song.cover_image.as_deref(),
            &settings.placeholder_cover,
        ),
        source_url: resolve_media_url(
            &settings.api_base_url,
            Some(&song.file),
            &settings.placeholder_cover,
        ),
    }
}

/// Parse a JSON export into tracks, dropping entries whose id was already seen.
pub fn parse_records(json: &str, settings: &LibrarySettings) -> Result<Vec<Track>, serde_json::Error> {
    let entries = match serde_json::from_str::<TrackFile>(json)? {
        TrackFile::List(entries) => entries,
        TrackFile::Playlist { songs } => songs,
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut tracks = Vec::with_capacity(entries.len());
    for entry in entries {
        let track = match entry {
            Entry::Track(t) => t,
            Entry::Liked { song } | Entry::Song(song) => song_to_track(song, settings),
        };
        if !seen.insert(track.id.clone()) {
            warn!(id = %track.id, "duplicate track id in import, skipping");
            continue;
        }
        tracks.push(track);
    }

    debug!(count = tracks.len(), "parsed track records");
    Ok(tracks)
}

/// Read and parse a JSON export from disk.
pub fn import_file(path: &Path, settings: &LibrarySettings) -> Result<Vec<Track>, LibraryError> {
    let json = std::fs::read_to_string(path).map_err(|source| LibraryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_records(&json, settings)?)
}
