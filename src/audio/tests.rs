use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use super::source::{Location, locate, open_source};
use super::types::AudioError;

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(1))
        .build()
}

#[test]
fn locate_classifies_remote_urls() {
    assert_eq!(
        locate("https://example.com/media/a.mp3").unwrap(),
        Location::Remote("https://example.com/media/a.mp3".into())
    );
    assert!(matches!(
        locate("HTTP://example.com/a.ogg").unwrap(),
        Location::Remote(_)
    ));
}

#[test]
fn locate_turns_file_urls_into_paths() {
    assert_eq!(
        locate("file:///music/My%20Song.flac").unwrap(),
        Location::Path(PathBuf::from("/music/My Song.flac"))
    );
}

#[test]
fn locate_accepts_bare_paths() {
    assert_eq!(
        locate("/music/a.mp3").unwrap(),
        Location::Path(PathBuf::from("/music/a.mp3"))
    );
    assert_eq!(
        locate("relative/a.mp3").unwrap(),
        Location::Path(PathBuf::from("relative/a.mp3"))
    );
}

#[test]
fn locate_rejects_other_schemes() {
    assert!(matches!(
        locate("ftp://example.com/a.mp3"),
        Err(AudioError::Unsupported(_))
    ));
}

#[test]
fn open_source_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.mp3");
    let err = open_source(path.to_str().unwrap(), &agent())
        .err()
        .expect("missing file must fail");
    assert!(matches!(err, AudioError::Open { .. }));
}

#[test]
fn open_source_reports_undecodable_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.mp3");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(b"definitely not audio").unwrap();
    drop(f);

    let err = open_source(path.to_str().unwrap(), &agent())
        .err()
        .expect("garbage must fail to decode");
    assert!(matches!(err, AudioError::Decode(_)));
}
