//! The playback state machine.
//!
//! Operations mutate `PlayerState` and queue commands for the media binding;
//! binding events come back through `fold`. The machine never blocks and
//! never talks to the binding directly, which keeps every transition
//! testable without audio hardware.
//!
//! Ordering rules:
//! - Every load gets a fresh `LoadTag`; events carrying any other tag are
//!   dropped, so a late report from an abandoned track cannot touch the
//!   current one.
//! - Every seek bumps `seek_seq`. Position reports taken before the binding
//!   processed the newest seek carry an older sequence and are dropped; the
//!   first report with the newest sequence ends the `Seeking` phase.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::library::Track;
use crate::persist::Snapshot;

use super::command::{MediaCmd, MediaEvent, Outbox};
use super::error::PlaybackError;
use super::state::{LoadTag, Phase, PlayerState, Position, Selection, Transport};
use super::volume::Volume;

/// A list a track was picked from, and where in it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueContext {
    pub tracks: Vec<Track>,
    pub index: usize,
}

/// Everything a UI surface can ask the player to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetQueue {
        tracks: Vec<Track>,
        start: usize,
    },
    /// `None` clears the selection but keeps the queue.
    SetCurrentTrack {
        track: Option<Track>,
        context: Option<QueueContext>,
    },
    PlayTrack {
        track: Track,
        context: Option<QueueContext>,
    },
    TogglePlay,
    Play,
    Pause,
    /// Pause and rewind.
    Stop,
    ToggleShuffle,
    ToggleRepeat,
    SetShuffle(bool),
    SetRepeat(bool),
    Next,
    Prev,
    Seek(f64),
    SeekBy(f64),
    SetVolume(i32),
    ToggleMute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub shuffle: bool,
    pub repeat: bool,
    pub volume: u8,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            shuffle: false,
            repeat: false,
            volume: Volume::default().level(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advance {
    User,
    Ended,
}

#[derive(Debug)]
pub struct Machine {
    state: PlayerState,
    outbox: Outbox,
    rng: StdRng,
    generation: u64,
    seek_seq: u64,
    revision: u64,
}

impl Machine {
    pub fn new(options: EngineOptions) -> Self {
        Self::with_rng(options, StdRng::from_entropy())
    }

    #[cfg(test)]
    pub fn seeded(options: EngineOptions, seed: u64) -> Self {
        Self::with_rng(options, StdRng::seed_from_u64(seed))
    }

    fn with_rng(options: EngineOptions, rng: StdRng) -> Self {
        let volume = Volume::new(options.volume);
        let mut outbox = Outbox::default();
        outbox.push(MediaCmd::SetVolume {
            level: volume.level(),
            muted: volume.is_muted(),
        });
        Self {
            state: PlayerState::new(options.shuffle, options.repeat, volume),
            outbox,
            rng,
            generation: 0,
            seek_seq: 0,
            revision: 0,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Bumped whenever an action or accepted event may have changed state.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Commands queued since the last call, in delivery order.
    pub fn take_commands(&mut self) -> Vec<MediaCmd> {
        self.outbox.take()
    }

    pub fn apply(&mut self, action: Action) {
        trace!(?action, "apply");
        match action {
            Action::SetQueue { tracks, start } => self.set_queue(tracks, start),
            Action::SetCurrentTrack { track, context } => self.set_current_track(track, context),
            Action::PlayTrack { track, context } => self.play_track(track, context),
            Action::TogglePlay => self.toggle_play(),
            Action::Play => self.set_playing(true),
            Action::Pause => self.set_playing(false),
            Action::Stop => self.stop(),
            Action::ToggleShuffle => self.set_shuffle(!self.state.shuffle),
            Action::ToggleRepeat => self.set_repeat(!self.state.repeat),
            Action::SetShuffle(on) => self.set_shuffle(on),
            Action::SetRepeat(on) => self.set_repeat(on),
            Action::Next => self.next_track(),
            Action::Prev => self.prev_track(),
            Action::Seek(seconds) => self.seek(seconds),
            Action::SeekBy(delta) => self.seek_by(delta),
            Action::SetVolume(level) => self.set_volume(level),
            Action::ToggleMute => self.toggle_mute(),
        }
        self.revision += 1;
    }

    /// Seed state from a persisted snapshot. Returns `false` (and leaves the
    /// machine untouched) when the snapshot contradicts itself.
    ///
    /// The restored track is loaded paused at the saved position, whatever
    /// the snapshot says about playing.
    pub fn restore(&mut self, snapshot: Snapshot) -> bool {
        let Snapshot {
            queue,
            current_index,
            current_track,
            is_playing,
            current_time_seconds,
            volume,
        } = snapshot;

        let index = match (current_index, &current_track) {
            (-1, _) => None,
            (i, Some(t))
                if usize::try_from(i)
                    .ok()
                    .and_then(|i| queue.get(i))
                    .is_some_and(|q| q.same_id(t)) =>
            {
                usize::try_from(i).ok()
            }
            _ => {
                warn!(current_index, "snapshot index does not match its queue, ignoring it");
                return false;
            }
        };

        self.state.queue = queue;
        self.set_volume(i32::from(volume));
        if is_playing {
            debug!("snapshot was taken while playing; restoring paused");
        }
        if let Some(track) = current_track {
            let track = match index {
                Some(i) => self.state.queue[i].clone(),
                None => track,
            };
            self.select(track, index, current_time_seconds);
        }
        self.revision += 1;
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            queue: self.state.queue.clone(),
            current_index: self
                .state
                .current_index()
                .and_then(|i| i64::try_from(i).ok())
                .unwrap_or(-1),
            current_track: self.state.current_track().cloned(),
            is_playing: self.state.is_playing(),
            current_time_seconds: self.state.current_time(),
            volume: self.state.volume.level(),
        }
    }

    /// Make `track` the selection and load it. Keeps the current play
    /// state: the binding autoplays the new source only if we were playing.
    fn select(&mut self, track: Track, index: Option<usize>, start_at: f64) {
        let playing = self.state.is_playing();
        self.generation += 1;
        let tag = LoadTag {
            generation: self.generation,
            track_id: track.id.clone(),
        };
        let position = Position::at(start_at);

        debug!(track = %track.id, ?index, playing, "select");
        self.outbox.push(MediaCmd::Load {
            tag: tag.clone(),
            url: track.source_url.clone(),
            start_at: position.current(),
            autoplay: playing,
        });

        self.state.error = None;
        self.state.transport = Transport::Loaded(Selection {
            track,
            index,
            phase: if playing { Phase::Playing } else { Phase::Paused },
            position,
            tag,
        });
    }

    fn clear_selection(&mut self) {
        if matches!(self.state.transport, Transport::Loaded(_)) {
            self.outbox.push(MediaCmd::Unload);
        }
        self.state.transport = Transport::Empty;
        self.state.error = None;
    }

    /// Replace the queue and select `start`. No-op for an empty list or an
    /// out-of-range start.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start: usize) {
        let Some(track) = tracks.get(start).cloned() else {
            debug!(len = tracks.len(), start, "set_queue ignored");
            return;
        };
        self.state.queue = tracks;
        self.select(track, Some(start), 0.0);
    }

    /// Select a track.
    ///
    /// - with a context: the context becomes the queue; the entry at
    ///   `context.index` is selected if it is `track`, otherwise `track` is
    ///   looked up by id, otherwise `context.index` wins;
    /// - without one: `track` is looked up in the current queue; when absent
    ///   it is shown with no queue index;
    /// - `None`: the selection is cleared, the queue kept.
    pub fn set_current_track(&mut self, track: Option<Track>, context: Option<QueueContext>) {
        let Some(track) = track else {
            self.clear_selection();
            return;
        };

        match context {
            Some(QueueContext { tracks, index }) => {
                let Some(at_index) = tracks.get(index) else {
                    debug!(len = tracks.len(), index, "set_current_track ignored");
                    return;
                };
                let chosen = if at_index.same_id(&track) {
                    index
                } else {
                    tracks
                        .iter()
                        .position(|t| t.same_id(&track))
                        .unwrap_or(index)
                };
                let selected = tracks[chosen].clone();
                self.state.queue = tracks;
                self.select(selected, Some(chosen), 0.0);
            }
            None => match self.state.queue.iter().position(|t| t.same_id(&track)) {
                Some(i) => {
                    let selected = self.state.queue[i].clone();
                    self.select(selected, Some(i), 0.0);
                }
                None => {
                    debug!(track = %track.id, "track is not in the queue");
                    self.select(track, None, 0.0);
                }
            },
        }
    }

    pub fn play_track(&mut self, track: Track, context: Option<QueueContext>) {
        self.set_current_track(Some(track), context);
        self.set_playing(true);
    }

    pub fn toggle_play(&mut self) {
        let target = !self.state.is_playing();
        self.set_playing(target);
    }

    /// Move to the requested play state. Playing a track whose source
    /// failed reloads it from where it stopped.
    pub fn set_playing(&mut self, playing: bool) {
        let retry = playing && self.state.error.is_some();
        let Some(sel) = self.state.selection_mut() else {
            return;
        };

        if retry {
            sel.set_playing(true);
            let (track, index, at) = (sel.track.clone(), sel.index, sel.position.current());
            self.select(track, index, at);
            return;
        }

        if sel.phase.is_playing() == playing {
            return;
        }
        sel.set_playing(playing);
        self.outbox
            .push(if playing { MediaCmd::Play } else { MediaCmd::Pause });
    }

    pub fn stop(&mut self) {
        if self.state.selection().is_none() {
            return;
        }
        self.set_playing(false);
        self.seek(0.0);
    }

    pub fn set_shuffle(&mut self, on: bool) {
        self.state.shuffle = on;
    }

    pub fn set_repeat(&mut self, on: bool) {
        self.state.repeat = on;
    }

    pub fn next_track(&mut self) {
        self.advance(Advance::User);
    }

    fn advance(&mut self, trigger: Advance) {
        let len = self.state.queue.len();
        if len == 0 {
            if trigger == Advance::Ended {
                self.finish_queue(trigger);
            }
            return;
        }

        let candidate = if self.state.shuffle {
            self.rng.gen_range(0..len)
        } else {
            self.state.current_index().map_or(0, |i| i + 1)
        };

        let target = if candidate < len {
            candidate
        } else if self.state.repeat {
            0
        } else {
            self.finish_queue(trigger);
            return;
        };

        let track = self.state.queue[target].clone();
        self.select(track, Some(target), 0.0);
    }

    /// Ran off the end of the queue without repeat: stop on the last track.
    /// After a natural end the track is reloaded at 0 so playing again
    /// restarts it.
    fn finish_queue(&mut self, trigger: Advance) {
        match trigger {
            Advance::User => self.set_playing(false),
            Advance::Ended => {
                let Some(sel) = self.state.selection_mut() else {
                    return;
                };
                sel.set_playing(false);
                let (track, index) = (sel.track.clone(), sel.index);
                self.select(track, index, 0.0);
            }
        }
    }

    pub fn prev_track(&mut self) {
        let len = self.state.queue.len();
        if len == 0 {
            return;
        }

        let current = self.state.current_index();
        let target = match current {
            Some(i) if i > 0 => i - 1,
            _ if self.state.repeat => len - 1,
            Some(0) => {
                // First track without repeat: restart it.
                self.seek(0.0);
                return;
            }
            _ => 0,
        };

        let track = self.state.queue[target].clone();
        self.select(track, Some(target), 0.0);
    }

    /// Jump to `seconds`, updating the position right away.
    pub fn seek(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let Some(sel) = self.state.selection_mut() else {
            return;
        };

        sel.position.set_current(seconds);
        sel.phase = Phase::Seeking {
            resume: sel.phase.is_playing(),
        };
        self.seek_seq += 1;
        self.outbox.push(MediaCmd::Seek {
            seconds: sel.position.current(),
            seq: self.seek_seq,
        });
    }

    /// End a pending seek without a confirmation from the binding.
    pub fn settle_seek(&mut self) {
        if let Some(sel) = self.state.selection_mut() {
            sel.phase = sel.phase.settled();
        }
    }

    pub fn seek_by(&mut self, delta: f64) {
        let target = self.state.current_time() + delta;
        self.seek(target);
    }

    /// Set the volume (clamped to 0..=100). Setting a level unmutes.
    pub fn set_volume(&mut self, requested: i32) {
        self.state.volume.set_level(Volume::clamped(requested));
        self.state.volume.set_muted(false);
        self.push_volume();
    }

    pub fn toggle_mute(&mut self) {
        let muted = !self.state.volume.is_muted();
        self.state.volume.set_muted(muted);
        self.push_volume();
    }

    fn push_volume(&mut self) {
        self.outbox.push(MediaCmd::SetVolume {
            level: self.state.volume.level(),
            muted: self.state.volume.is_muted(),
        });
    }

    /// Fold one binding event into the state.
    pub fn fold(&mut self, event: MediaEvent) {
        let stale = self
            .state
            .selection()
            .is_none_or(|sel| &sel.tag != event.tag());
        if stale {
            trace!(?event, "dropping event for an abandoned load");
            return;
        }

        match event {
            MediaEvent::TimeAdvanced {
                seconds, seek_seq, ..
            } => {
                if seek_seq < self.seek_seq {
                    trace!(seconds, seek_seq, "dropping position report older than last seek");
                    return;
                }
                if let Some(sel) = self.state.selection_mut() {
                    sel.phase = sel.phase.settled();
                    sel.position.set_current(seconds);
                }
            }
            MediaEvent::MetadataReady { duration, .. } => {
                if let Some(sel) = self.state.selection_mut() {
                    sel.position.set_duration(duration);
                }
            }
            MediaEvent::Ended { seek_seq, .. } => {
                if seek_seq < self.seek_seq {
                    trace!(seek_seq, "dropping end of track older than last seek");
                    return;
                }
                if self.state.error.is_some() {
                    debug!("ignoring end of a track that failed to load");
                    return;
                }
                debug!("track ended");
                self.advance(Advance::Ended);
            }
            MediaEvent::SourceError { tag, message } => {
                warn!(track = %tag.track_id, %message, "source failed");
                if let Some(sel) = self.state.selection_mut() {
                    sel.set_playing(false);
                }
                self.state.error = Some(PlaybackError::Source {
                    track_id: tag.track_id,
                    message,
                });
            }
        }
        self.revision += 1;
    }
}
