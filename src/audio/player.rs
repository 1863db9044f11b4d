use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;
use crate::player::{MediaBinding, MediaCmd, MediaEvent};

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioError};

/// Handle to the audio thread.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    join: Option<JoinHandle<()>>,
}

impl AudioPlayer {
    /// Open the default output device and start the audio thread.
    ///
    /// Fails when no output device can be opened; the caller falls back to
    /// a disabled binding.
    pub fn spawn(
        audio_settings: &AudioSettings,
        events: Sender<MediaEvent>,
    ) -> Result<Self, AudioError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let join = spawn_audio_thread(rx, events, audio_settings)?;
        Ok(Self {
            tx,
            join: Some(join),
        })
    }
}

impl MediaBinding for AudioPlayer {
    fn send(&mut self, cmd: MediaCmd) {
        if self.tx.send(AudioCmd::Media(cmd)).is_err() {
            warn!("audio thread is gone, dropping command");
        }
    }

    fn shutdown(&mut self, fade_out: Duration) {
        let _ = self.tx.send(AudioCmd::Quit {
            fade_out_ms: u64::try_from(fade_out.as_millis()).unwrap_or(u64::MAX),
        });

        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}
