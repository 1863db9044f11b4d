//! MPRIS D-Bus service so desktop media keys and `playerctl` can drive the
//! player.
//!
//! The service runs on its own thread. Incoming method calls become
//! `ControlCmd`s on a channel; outgoing state is mirrored into a shared
//! struct by `MprisHandle` and announced with PropertiesChanged.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::library::Track;
use crate::player::PlayerState;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.echodune";

#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    SetShuffle(bool),
    SetRepeat(bool),
    /// MPRIS volume, `0.0..=1.0`.
    SetVolume(f64),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    pub fn of(state: &PlayerState) -> Self {
        if state.selection().is_none() {
            Self::Stopped
        } else if state.is_playing() {
            Self::Playing
        } else {
            Self::Paused
        }
    }
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackStatus,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
    shuffle: bool,
    repeat: bool,
    volume: f64,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    fn update(&self, f: impl FnOnce(&mut SharedState)) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        let before = (
            s.playback,
            s.track_id.clone(),
            s.url.clone(),
            s.length_micros,
            s.shuffle,
            s.repeat,
            s.volume,
        );
        f(&mut s);
        let after = (
            s.playback,
            s.track_id.clone(),
            s.url.clone(),
            s.length_micros,
            s.shuffle,
            s.repeat,
            s.volume,
        );
        drop(s);
        if before != after {
            let _ = self.notify.send(());
        }
    }

    pub fn set_playback(&self, playback: PlaybackStatus) {
        self.update(|s| s.playback = playback);
    }

    /// Publish the current track. `index` is its queue position; a track
    /// outside the queue gets a fixed id.
    pub fn set_track_metadata(&self, index: Option<usize>, track: Option<&Track>, length_secs: f64) {
        self.update(|s| match track {
            Some(track) => {
                s.title = Some(track.title.clone());
                s.artist = if track.artist.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![track.artist.clone()]
                };
                s.album = track.album.clone();
                s.url = Some(track.source_url.clone());
                s.art_url = Some(track.cover_url.clone()).filter(|u| !u.is_empty());
                s.length_micros = (length_secs > 0.0).then(|| (length_secs * 1_000_000.0) as i64);
                let path = match index {
                    Some(i) => format!("{OBJECT_PATH}/track/{i}"),
                    None => format!("{OBJECT_PATH}/track/detached"),
                };
                s.track_id = ObjectPath::try_from(path).ok().map(OwnedObjectPath::from);
            }
            None => {
                s.title = None;
                s.artist.clear();
                s.album = None;
                s.url = None;
                s.art_url = None;
                s.length_micros = None;
                s.track_id = None;
            }
        });
    }

    pub fn set_modes(&self, shuffle: bool, repeat: bool) {
        self.update(|s| {
            s.shuffle = shuffle;
            s.repeat = repeat;
        });
    }

    pub fn set_volume(&self, level: u8, muted: bool) {
        let v = if muted { 0.0 } else { f64::from(level) / 100.0 };
        self.update(|s| s.volume = v);
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "echodune"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".into(), "http".into(), "https".into()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn read<T: Default>(&self, f: impl FnOnce(&SharedState) -> T) -> T {
        self.state.lock().map(|s| f(&s)).unwrap_or_default()
    }
}

fn owned(value: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(value).ok()
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn loop_status(&self) -> &str {
        if self.read(|s| s.repeat) {
            "Playlist"
        } else {
            "None"
        }
    }

    #[zbus(property)]
    fn set_loop_status(&mut self, value: String) {
        let _ = self.tx.send(ControlCmd::SetRepeat(value != "None"));
    }

    #[zbus(property)]
    fn shuffle(&self) -> bool {
        self.read(|s| s.shuffle)
    }

    #[zbus(property)]
    fn set_shuffle(&mut self, value: bool) {
        let _ = self.tx.send(ControlCmd::SetShuffle(value));
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.read(|s| s.volume)
    }

    #[zbus(property)]
    fn set_volume(&mut self, value: f64) {
        let _ = self.tx.send(ControlCmd::SetVolume(value));
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, value: Option<OwnedValue>| {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        };

        let track_id = s
            .track_id
            .clone()
            .map(|p| Value::from(p.into_inner()))
            .or_else(|| {
                ObjectPath::try_from("/org/mpris/MediaPlayer2/TrackList/NoTrack")
                    .ok()
                    .map(Value::from)
            });
        put("mpris:trackid", track_id.and_then(owned));
        put(
            "xesam:title",
            owned(Value::from(s.title.clone().unwrap_or_default())),
        );
        if !s.artist.is_empty() {
            put("xesam:artist", owned(Value::from(s.artist.clone())));
        }
        put("xesam:album", s.album.clone().and_then(|a| owned(Value::from(a))));
        put("xesam:url", s.url.clone().and_then(|u| owned(Value::from(u))));
        put("mpris:artUrl", s.art_url.clone().and_then(|u| owned(Value::from(u))));
        put("mpris:length", s.length_micros.and_then(|l| owned(Value::from(l))));
        map
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("mpris".into())
        .spawn(move || {
            block_on(async move {
                if let Err(e) = serve(tx, state_for_thread, notify_rx).await {
                    warn!(error = %e, "MPRIS service unavailable");
                }
            });
        });
    if let Err(e) = spawned {
        warn!(error = %e, "could not start MPRIS thread");
    }

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    debug!(name = BUS_NAME, "MPRIS service registered");

    let iface = object_server
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;

    loop {
        Timer::after(Duration::from_millis(250)).await;

        let mut changed = false;
        loop {
            match notify.try_recv() {
                Ok(()) => changed = true,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if !changed {
            continue;
        }

        let emitter = iface.signal_emitter();
        let player = iface.get().await;
        player.playback_status_changed(emitter).await?;
        player.metadata_changed(emitter).await?;
        player.shuffle_changed(emitter).await?;
        player.loop_status_changed(emitter).await?;
        player.volume_changed(emitter).await?;
    }
}

#[cfg(test)]
mod tests;
