use thiserror::Error;

/// Failures the player keeps in its state for the UI to render.
///
/// None of these abort an operation; they describe why playback stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The current track's source could not be opened or decoded.
    /// Retried by playing again.
    #[error("cannot play \"{track_id}\": {message}")]
    Source { track_id: String, message: String },

    /// No audio output is available; the player is read-only.
    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),
}
