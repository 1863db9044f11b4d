//! Authoritative playback state.
//!
//! The transport is an explicit sum type: nothing can be seeking or playing
//! without a selected track, and a selection always carries the tag of the
//! load that backs it.

use crate::library::Track;

use super::error::PlaybackError;
use super::volume::Volume;

/// Identifies one load of a source into the media binding.
///
/// Every event the binding emits carries the tag of the load it belongs to;
/// events whose tag differs from the current selection's are stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadTag {
    pub generation: u64,
    pub track_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Paused,
    Playing,
    /// A seek was issued and the binding has not confirmed it yet.
    /// `resume` is the play state the seek was issued in.
    Seeking { resume: bool },
}

impl Phase {
    pub fn is_playing(self) -> bool {
        matches!(self, Phase::Playing | Phase::Seeking { resume: true })
    }

    /// The phase a confirmed seek lands in.
    pub(super) fn settled(self) -> Self {
        match self {
            Phase::Seeking { resume: true } => Phase::Playing,
            Phase::Seeking { resume: false } => Phase::Paused,
            other => other,
        }
    }

    /// Same kind of phase with the play flag replaced.
    fn with_playing(self, playing: bool) -> Self {
        match self {
            Phase::Seeking { .. } => Phase::Seeking { resume: playing },
            _ if playing => Phase::Playing,
            _ => Phase::Paused,
        }
    }
}

/// Transport position in seconds.
///
/// `current` never exceeds `duration` once the duration is known (> 0).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    current: f64,
    duration: f64,
}

impl Position {
    pub fn at(current: f64) -> Self {
        let mut p = Self::default();
        p.set_current(current);
        p
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Clamp `seconds` into the valid range for this position.
    pub fn clamp(&self, seconds: f64) -> f64 {
        let s = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        if self.duration > 0.0 {
            s.min(self.duration)
        } else {
            s
        }
    }

    pub fn set_current(&mut self, seconds: f64) {
        self.current = self.clamp(seconds);
    }

    pub fn set_duration(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        self.duration = seconds.max(0.0);
        self.current = self.clamp(self.current);
    }
}

/// The selected track and everything tied to its current load.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub track: Track,
    /// Position of `track` in the queue; `None` when the track was selected
    /// without being part of the queue.
    pub index: Option<usize>,
    pub phase: Phase,
    pub position: Position,
    pub tag: LoadTag,
}

impl Selection {
    pub(super) fn set_playing(&mut self, playing: bool) {
        self.phase = self.phase.with_playing(playing);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Transport {
    /// Nothing selected. The queue may still hold tracks.
    #[default]
    Empty,
    Loaded(Selection),
}

/// Everything a UI surface may read.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub(super) queue: Vec<Track>,
    pub(super) transport: Transport,
    pub(super) shuffle: bool,
    pub(super) repeat: bool,
    pub(super) volume: Volume,
    pub(super) error: Option<PlaybackError>,
}

impl PlayerState {
    pub(super) fn new(shuffle: bool, repeat: bool, volume: Volume) -> Self {
        Self {
            queue: Vec::new(),
            transport: Transport::Empty,
            shuffle,
            repeat,
            volume,
            error: None,
        }
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn selection(&self) -> Option<&Selection> {
        match &self.transport {
            Transport::Loaded(sel) => Some(sel),
            Transport::Empty => None,
        }
    }

    pub(super) fn selection_mut(&mut self) -> Option<&mut Selection> {
        match &mut self.transport {
            Transport::Loaded(sel) => Some(sel),
            Transport::Empty => None,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.selection().map(|s| &s.track)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.selection().and_then(|s| s.index)
    }

    pub fn is_playing(&self) -> bool {
        self.selection().is_some_and(|s| s.phase.is_playing())
    }

    pub fn is_seeking(&self) -> bool {
        self.selection()
            .is_some_and(|s| matches!(s.phase, Phase::Seeking { .. }))
    }

    pub fn current_time(&self) -> f64 {
        self.selection().map_or(0.0, |s| s.position.current())
    }

    pub fn duration(&self) -> f64 {
        self.selection().map_or(0.0, |s| s.position.duration())
    }

    /// Progress through the current track in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let d = self.duration();
        if d > 0.0 {
            (self.current_time() / d).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffle
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn error(&self) -> Option<&PlaybackError> {
        self.error.as_ref()
    }

    /// Whether the selection and the queue agree.
    ///
    /// Holds for every state the machine can reach: an indexed selection
    /// names a valid queue slot holding a track with the same id.
    #[cfg(test)]
    pub fn selection_is_consistent(&self) -> bool {
        match self.selection() {
            None => true,
            Some(Selection { index: None, .. }) => true,
            Some(Selection {
                index: Some(i),
                track,
                ..
            }) => self.queue.get(*i).is_some_and(|q| q.same_id(track)),
        }
    }
}
