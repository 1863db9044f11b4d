use std::time::Duration;

use super::command::MediaCmd;

/// The side of the player that actually makes sound.
///
/// Implementations receive commands in order and report back through
/// whatever event channel they were built with; the machine folds those
/// events via `Player::handle_event`.
pub trait MediaBinding {
    fn send(&mut self, cmd: MediaCmd);

    /// Stop output, optionally fading out first. Called once on exit.
    fn shutdown(&mut self, _fade_out: Duration) {}

    /// Why this binding cannot produce sound, if it cannot.
    fn unavailable_reason(&self) -> Option<&str> {
        None
    }
}

/// Stand-in used when no audio output could be opened. Commands are
/// dropped and the player runs read-only.
#[derive(Debug, Clone)]
pub struct DisabledBinding {
    reason: String,
}

impl DisabledBinding {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl MediaBinding for DisabledBinding {
    fn send(&mut self, cmd: MediaCmd) {
        tracing::trace!(?cmd, "audio disabled, dropping command");
    }

    fn unavailable_reason(&self) -> Option<&str> {
        Some(&self.reason)
    }
}
