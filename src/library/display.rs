use std::time::Duration;

use crate::config::TrackDisplayField;

use super::model::Track;

/// Build a display string for a track according to the provided `fields` and separator.
///
/// This composes metadata fields in the configured order and falls back to
/// the title when no parts were produced.
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    let title = track.title.trim();
    let artist = Some(track.artist.trim()).filter(|s| !s.is_empty());
    let album = track.album.as_deref().map(str::trim).filter(|s| !s.is_empty());

    for f in fields {
        match f {
            TrackDisplayField::Display => {
                if let Some(a) = artist {
                    parts.push(a.to_string());
                }
                if !title.is_empty() {
                    parts.push(title.to_string());
                }
            }
            TrackDisplayField::Title => {
                if !title.is_empty() {
                    parts.push(title.to_string());
                }
            }
            TrackDisplayField::Artist => {
                if let Some(a) = artist {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Album => {
                if let Some(a) = album {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Duration => {
                if let Some(d) = track.duration_label.as_deref().filter(|s| !s.is_empty()) {
                    parts.push(d.to_string());
                }
            }
        }
    }

    if parts.is_empty() {
        track.title.clone()
    } else {
        parts.join(sep)
    }
}

/// Format a length in seconds as `m:ss`.
pub fn format_duration_label(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds).as_secs()
    } else {
        0
    };
    format!("{}:{:02}", secs / 60, secs % 60)
}
