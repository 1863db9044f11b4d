//! Application model types: `App` and `Intent`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::ControlsSettings;
use crate::player::{Action, PlayerState};

/// What a key press asks the runtime to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Quit,
    Player(Action),
}

/// The main application model.
#[derive(Debug)]
pub struct App {
    /// Highlighted row of the queue viewer.
    pub cursor: usize,
    pub follow_playback: bool,
    pub show_help: bool,

    pending_gg: bool,
    pending_zz: bool,
    /// Scrub seconds accumulated since the last frame.
    pending_scrub: f64,
}

impl App {
    pub fn new(follow_playback: bool) -> Self {
        Self {
            cursor: 0,
            follow_playback,
            show_help: false,
            pending_gg: false,
            pending_zz: false,
            pending_scrub: 0.0,
        }
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Move the cursor to the playing track when following, and keep it in
    /// range of a queue of `len` rows.
    pub fn sync_cursor(&mut self, state: &PlayerState) {
        if self.follow_playback {
            if let Some(i) = state.current_index() {
                self.cursor = i;
            }
        }
        let len = state.queue().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    /// Move to the next row, wrapping to the top.
    pub fn next(&mut self, len: usize) {
        if len > 0 {
            self.cursor = (self.cursor + 1) % len;
        }
    }

    /// Move to the previous row, wrapping to the bottom.
    pub fn prev(&mut self, len: usize) {
        if len > 0 {
            self.cursor = if self.cursor == 0 { len - 1 } else { self.cursor - 1 };
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Scrub requests coalesced since the last call.
    pub fn take_scrub(&mut self) -> Option<f64> {
        let delta = std::mem::take(&mut self.pending_scrub);
        (delta != 0.0).then_some(delta)
    }

    /// Translate a key press. View-only keys are handled here and return
    /// `None`; scrubbing is collected for `take_scrub`.
    pub fn on_key(
        &mut self,
        key: KeyEvent,
        state: &PlayerState,
        controls: &ControlsSettings,
    ) -> Option<Intent> {
        let len = state.queue().len();
        let gg = std::mem::take(&mut self.pending_gg);
        let zz = std::mem::take(&mut self.pending_zz);

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Intent::Quit);
        }

        let action = match key.code {
            KeyCode::Char('q') => return Some(Intent::Quit),
            KeyCode::Char('?') => {
                self.toggle_help();
                return None;
            }
            KeyCode::Esc => {
                self.show_help = false;
                return None;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.follow_playback_off();
                self.next(len);
                return None;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.follow_playback_off();
                self.prev(len);
                return None;
            }
            KeyCode::Char('g') => {
                if gg {
                    self.follow_playback_off();
                    self.cursor = 0;
                } else {
                    self.pending_gg = true;
                }
                return None;
            }
            KeyCode::Char('G') => {
                self.follow_playback_off();
                self.cursor = len.saturating_sub(1);
                return None;
            }
            KeyCode::Char('z') => {
                if zz {
                    self.follow_playback_on();
                    if let Some(i) = state.current_index() {
                        self.cursor = i;
                    }
                } else {
                    self.pending_zz = true;
                }
                return None;
            }
            KeyCode::Char('L') => {
                self.pending_scrub += controls.scrub_seconds as f64;
                return None;
            }
            KeyCode::Char('H') => {
                self.pending_scrub -= controls.scrub_seconds as f64;
                return None;
            }
            KeyCode::Enter => {
                let track = state.queue().get(self.cursor)?.clone();
                let already_playing =
                    state.is_playing() && state.current_index() == Some(self.cursor);
                if already_playing {
                    return None;
                }
                self.follow_playback_on();
                Action::PlayTrack {
                    track,
                    context: None,
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('p') => Action::TogglePlay,
            KeyCode::Char('l') => {
                self.follow_playback_on();
                Action::Next
            }
            KeyCode::Char('h') => {
                self.follow_playback_on();
                Action::Prev
            }
            KeyCode::Char('S') => Action::Stop,
            KeyCode::Char('s') => Action::ToggleShuffle,
            KeyCode::Char('r') => Action::ToggleRepeat,
            KeyCode::Char('m') => Action::ToggleMute,
            KeyCode::Char('c') => Action::SetCurrentTrack {
                track: None,
                context: None,
            },
            KeyCode::Char('+') | KeyCode::Char('=') => Action::SetVolume(
                i32::from(state.volume().level()) + i32::from(controls.volume_step),
            ),
            KeyCode::Char('-') => Action::SetVolume(
                i32::from(state.volume().level()) - i32::from(controls.volume_step),
            ),
            KeyCode::Char(d @ '0'..='9') => {
                let digit = d.to_digit(10).unwrap_or(0);
                Action::SetVolume(i32::try_from(digit * 10).unwrap_or(0))
            }
            _ => return None,
        };

        Some(Intent::Player(action))
    }
}
