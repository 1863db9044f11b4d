use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, warn};

use crate::config::AudioSettings;
use crate::player::{LoadTag, MediaCmd, MediaEvent, Volume};

use super::source::open_source;
use super::types::{AudioCmd, AudioError};

/// Start the audio thread. Returns once the output device is open, or with
/// the reason it could not be.
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<MediaEvent>,
    audio_settings: &AudioSettings,
) -> Result<JoinHandle<()>, AudioError> {
    let tick = Duration::from_millis(audio_settings.tick_ms.max(10));
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(audio_settings.http_timeout_secs))
        .build();
    let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), AudioError>>(1);

    let handle = thread::Builder::new()
        .name("audio".into())
        .spawn(move || {
            let mut stream = match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send(Err(AudioError::NoOutput(e.to_string())));
                    return;
                }
            };
            // rodio logs to stderr when OutputStream is dropped, which would
            // scribble over the TUI.
            stream.log_on_drop(false);
            let _ = ready_tx.send(Ok(()));

            let mut engine = Engine::new(stream, events, agent);
            loop {
                match rx.recv_timeout(tick) {
                    Ok(AudioCmd::Media(cmd)) => engine.handle(cmd),
                    Ok(AudioCmd::Quit { fade_out_ms }) => {
                        engine.fade_out(fade_out_ms);
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => engine.tick(),
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        })
        .map_err(AudioError::Spawn)?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => {
            let _ = handle.join();
            Err(AudioError::NoOutput("audio thread exited during startup".into()))
        }
    }
}

struct Engine {
    // Dropping the stream silences the sink.
    _stream: OutputStream,
    sink: Sink,
    events: Sender<MediaEvent>,
    agent: ureq::Agent,
    tag: Option<LoadTag>,
    // Kept so a seek after the sink drained can reopen the track.
    url: Option<String>,
    /// A decoded source was appended for `tag`.
    loaded: bool,
    /// `Ended` was reported for `tag` while playing.
    drained: bool,
    playing: bool,
    seek_seq: u64,
    gain: f32,
}

impl Engine {
    fn new(stream: OutputStream, events: Sender<MediaEvent>, agent: ureq::Agent) -> Self {
        let sink = Sink::connect_new(stream.mixer());
        sink.pause();
        Self {
            _stream: stream,
            sink,
            events,
            agent,
            tag: None,
            url: None,
            loaded: false,
            drained: false,
            playing: false,
            seek_seq: 0,
            gain: 1.0,
        }
    }

    fn emit(&self, event: MediaEvent) {
        // The receiver only goes away while we are shutting down.
        let _ = self.events.send(event);
    }

    fn handle(&mut self, cmd: MediaCmd) {
        match cmd {
            MediaCmd::Load {
                tag,
                url,
                start_at,
                autoplay,
            } => self.load(tag, &url, start_at, autoplay),
            MediaCmd::Play => {
                if self.loaded {
                    self.sink.play();
                    self.playing = true;
                }
            }
            MediaCmd::Pause => {
                self.sink.pause();
                self.playing = false;
                self.drained = false;
            }
            MediaCmd::Seek { seconds, seq } => {
                self.seek_seq = seq;
                let Some(tag) = self.tag.clone() else {
                    return;
                };
                if self.loaded && self.sink.empty() {
                    if let Some(url) = self.url.clone() {
                        // The reload reports the new position itself.
                        let autoplay = self.playing || self.drained;
                        self.load(tag, &url, seconds, autoplay);
                        return;
                    }
                }
                self.seek_to(seconds);
                self.emit(MediaEvent::TimeAdvanced {
                    tag,
                    seconds,
                    seek_seq: seq,
                });
            }
            MediaCmd::SetVolume { level, muted } => {
                let mut volume = Volume::new(level);
                volume.set_muted(muted);
                self.gain = volume.gain();
                self.sink.set_volume(self.gain);
            }
            MediaCmd::Unload => {
                self.sink.clear();
                self.tag = None;
                self.url = None;
                self.loaded = false;
                self.drained = false;
                self.playing = false;
            }
        }
    }

    fn load(&mut self, tag: LoadTag, url: &str, start_at: f64, autoplay: bool) {
        // `clear` also pauses the sink.
        self.sink.clear();
        self.playing = false;
        self.tag = Some(tag.clone());
        self.url = Some(url.to_string());
        self.loaded = false;
        self.drained = false;

        let source = match open_source(url, &self.agent) {
            Ok(source) => source,
            Err(e) => {
                warn!(track = %tag.track_id, error = %e, "failed to open source");
                self.emit(MediaEvent::SourceError {
                    tag,
                    message: e.to_string(),
                });
                return;
            }
        };

        let duration = source.total_duration();
        self.sink.append(source);
        self.loaded = true;
        if start_at > 0.0 {
            self.seek_to(start_at);
        }
        debug!(track = %tag.track_id, ?duration, autoplay, "loaded source");

        if let Some(d) = duration {
            self.emit(MediaEvent::MetadataReady {
                tag: tag.clone(),
                duration: d.as_secs_f64(),
            });
        }
        self.emit(MediaEvent::TimeAdvanced {
            tag,
            seconds: start_at,
            seek_seq: self.seek_seq,
        });

        if autoplay {
            self.sink.play();
            self.playing = true;
        }
    }

    fn seek_to(&self, seconds: f64) {
        if self.sink.empty() || !seconds.is_finite() {
            return;
        }
        let target = Duration::from_secs_f64(seconds.max(0.0));
        if let Err(e) = self.sink.try_seek(target) {
            warn!(?target, error = %e, "seek failed");
        }
    }

    /// Periodic position report and end-of-track detection.
    fn tick(&mut self) {
        let Some(tag) = self.tag.clone() else {
            return;
        };
        if !self.playing {
            return;
        }
        if self.sink.empty() {
            self.playing = false;
            self.drained = true;
            self.emit(MediaEvent::Ended {
                tag,
                seek_seq: self.seek_seq,
            });
        } else {
            self.emit(MediaEvent::TimeAdvanced {
                tag,
                seconds: self.sink.get_pos().as_secs_f64(),
                seek_seq: self.seek_seq,
            });
        }
    }

    fn fade_out(&self, fade_out_ms: u64) {
        if self.playing && fade_out_ms > 0 {
            let steps: u64 = 20;
            let step_ms = (fade_out_ms / steps).max(1);
            for step in 1..=steps {
                let t = step as f32 / steps as f32;
                self.sink.set_volume(self.gain * (1.0 - t));
                thread::sleep(Duration::from_millis(step_ms));
            }
        }
        self.sink.stop();
    }
}
