use super::*;
use crate::library::Track;

fn t(id: &str) -> Track {
    Track {
        id: id.into(),
        title: format!("Song {id}"),
        artist: "Artist".into(),
        album: Some("Album".into()),
        duration_label: Some("3:05".into()),
        cover_url: "/placeholder.svg".into(),
        source_url: format!("http://localhost:8000/media/songs/{id}.mp3"),
    }
}

fn sample() -> Snapshot {
    Snapshot {
        queue: vec![t("1"), t("2")],
        current_index: 0,
        current_track: Some(t("1")),
        is_playing: true,
        current_time_seconds: 12.5,
        volume: 80,
    }
}

#[test]
fn snapshot_uses_camel_case_keys() {
    let json = serde_json::to_value(sample()).unwrap();
    for key in [
        "queue",
        "currentIndex",
        "currentTrack",
        "isPlaying",
        "currentTimeSeconds",
        "volume",
    ] {
        assert!(json.get(key).is_some(), "missing key: {key}");
    }
    assert_eq!(json["queue"][0]["sourceUrl"], "http://localhost:8000/media/songs/1.mp3");
    assert_eq!(json["queue"][0]["durationLabel"], "3:05");
}

#[test]
fn no_selection_is_null_and_minus_one() {
    let snap = Snapshot {
        current_index: -1,
        current_track: None,
        ..sample()
    };
    let json = serde_json::to_value(snap).unwrap();
    assert_eq!(json["currentIndex"], -1);
    assert!(json["currentTrack"].is_null());
}

#[test]
fn missing_fields_are_rejected() {
    let text = r#"{"queue": [], "currentIndex": -1}"#;
    assert!(serde_json::from_str::<Snapshot>(text).is_err());
}

#[test]
fn file_store_round_trips_and_replaces_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");
    let mut store = JsonFileStore::new(&path);

    assert!(store.load().unwrap().is_none());

    store.save(&sample()).unwrap();
    let mut second = sample();
    second.volume = 10;
    store.save(&second).unwrap();

    assert_eq!(store.load().unwrap(), Some(second));
    assert_eq!(store.path(), path.as_path());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn corrupt_file_loads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store = JsonFileStore::new(&path);

    assert!(matches!(store.load(), Err(PersistError::Json(_))));
    assert_eq!(load_snapshot(&store), None);
}

#[test]
fn wrong_shape_loads_as_absent() {
    let store = MemoryStore::default();
    store.put_raw(r#"{"queue": "nope"}"#);
    assert_eq!(load_snapshot(&store), None);
}

#[test]
fn unwritable_location_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "x").unwrap();
    let mut store = JsonFileStore::new(blocker.join("session.json"));

    assert!(matches!(store.save(&sample()), Err(PersistError::Io { .. })));
}

#[test]
fn writer_saves_every_submission_in_order() {
    let store = MemoryStore::default();
    let writer = SnapshotWriter::spawn(Box::new(store.clone())).unwrap();

    for volume in [10, 20, 30] {
        writer.submit(Snapshot {
            volume,
            ..sample()
        });
    }
    writer.finish();

    assert_eq!(store.load().unwrap().map(|s| s.volume), Some(30));
}

#[test]
fn writer_survives_failing_store() {
    let writer = SnapshotWriter::spawn(Box::new(MemoryStore::failing())).unwrap();
    writer.submit(sample());
    writer.submit(sample());
    writer.finish();
}
