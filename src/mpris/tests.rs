use super::*;
use std::sync::mpsc;

fn make_track() -> Track {
    Track {
        id: "42".into(),
        title: "Test Title".into(),
        artist: "Test Artist".into(),
        album: Some("Test Album".into()),
        duration_label: Some("0:01".into()),
        cover_url: "http://localhost:8000/media/covers/42.jpg".into(),
        source_url: "file:///tmp/music/test.mp3".into(),
    }
}

fn handle_with_state() -> (MprisHandle, Arc<Mutex<SharedState>>, mpsc::Receiver<()>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();
    let handle = MprisHandle {
        state: state.clone(),
        notify: notify_tx,
    };
    (handle, state, notify_rx)
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state, _rx) = handle_with_state();

    let track = make_track();
    handle.set_track_metadata(Some(7), Some(&track), 1.234567);

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(s.album.as_deref(), Some("Test Album"));
        assert!(s.url.as_deref().unwrap().contains("/tmp/music/test.mp3"));
        assert_eq!(s.art_url.as_deref(), Some(track.cover_url.as_str()));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/7")
        );
    }

    handle.set_track_metadata(None, None, 0.0);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.album, None);
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn detached_track_gets_a_fixed_id_and_unknown_length() {
    let (handle, state, _rx) = handle_with_state();
    handle.set_track_metadata(None, Some(&make_track()), 0.0);

    let s = state.lock().unwrap();
    assert_eq!(
        s.track_id.as_ref().map(|p| p.as_str()),
        Some("/org/mpris/MediaPlayer2/track/detached")
    );
    assert_eq!(s.length_micros, None);
}

#[test]
fn setters_notify_only_on_change() {
    let (handle, _state, rx) = handle_with_state();

    handle.set_playback(PlaybackStatus::Playing);
    assert!(rx.try_recv().is_ok());

    handle.set_playback(PlaybackStatus::Playing);
    assert!(rx.try_recv().is_err());

    handle.set_modes(true, false);
    assert!(rx.try_recv().is_ok());

    handle.set_volume(50, false);
    assert!(rx.try_recv().is_ok());
    handle.set_volume(50, false);
    assert!(rx.try_recv().is_err());
}

#[test]
fn muted_volume_is_published_as_silence() {
    let (handle, state, _rx) = handle_with_state();
    handle.set_volume(80, true);
    assert_eq!(state.lock().unwrap().volume, 0.0);
    handle.set_volume(80, false);
    assert!((state.lock().unwrap().volume - 0.8).abs() < 1e-9);
}

#[test]
fn playback_status_maps_state_to_spec_strings() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert_eq!(iface.playback_status(), "Stopped");

    state.lock().unwrap().playback = PlaybackStatus::Playing;
    assert_eq!(iface.playback_status(), "Playing");

    state.lock().unwrap().playback = PlaybackStatus::Paused;
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn loop_and_shuffle_setters_become_control_commands() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let mut iface = PlayerIface { tx, state };

    iface.set_loop_status("Playlist".into());
    iface.set_loop_status("None".into());
    iface.set_shuffle(true);
    iface.set_volume(0.25);

    let got: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![
            ControlCmd::SetRepeat(true),
            ControlCmd::SetRepeat(false),
            ControlCmd::SetShuffle(true),
            ControlCmd::SetVolume(0.25),
        ]
    );
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    {
        let mut s = state.lock().unwrap();
        s.title = Some("Title".to_string());
        s.artist = vec!["Artist".to_string()];
        s.album = Some("Album".to_string());
        s.url = Some("file:///tmp/test.mp3".to_string());
        s.art_url = Some("http://localhost/cover.jpg".to_string());
        s.length_micros = Some(42);
        s.track_id = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/1")
            .ok()
            .map(|p| p.into());
    }

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "xesam:url",
        "mpris:artUrl",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn metadata_without_track_still_has_a_track_id() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    let map = iface.metadata();
    assert!(map.contains_key("mpris:trackid"));
    assert!(!map.contains_key("xesam:artist"));
}
