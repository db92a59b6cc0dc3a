//! End-to-end coverage of the load -> segment -> name -> transform -> save pipeline, built from a
//! hand-assembled Standard MIDI File (the public API has no note-message constructor, only a
//! parser, so a well-formed byte stream is the only way to exercise this from outside the crate).

use chordcraft::chord::{TransformMode, TransformationOptions};
use chordcraft::midi::MidiFile;
use chordcraft::Document;
use std::time::SystemTime;

fn vlq(mut n: u32) -> Vec<u8> {
    let mut bytes = vec![(n & 0x7f) as u8];
    n >>= 7;
    while n > 0 {
        bytes.push(((n & 0x7f) as u8) | 0x80);
        n >>= 7;
    }
    bytes.reverse();
    bytes
}

/// A single-track, format-0 file: a C major triad (60, 64, 67) struck together, held 480 ticks,
/// then released.
fn c_major_smf_bytes() -> Vec<u8> {
    let mut track = Vec::new();
    for &note in &[60u8, 64, 67] {
        track.extend(vlq(0));
        track.extend([0x90, note, 100]);
    }
    for (i, &note) in [60u8, 64, 67].iter().enumerate() {
        track.extend(vlq(if i == 0 { 480 } else { 0 }));
        track.extend([0x80, note, 0]);
    }
    track.extend(vlq(0));
    track.extend([0xff, 0x2f, 0x00]);

    let mut bytes = Vec::new();
    bytes.extend(b"MThd");
    bytes.extend(6u32.to_be_bytes());
    bytes.extend(0u16.to_be_bytes()); // format 0
    bytes.extend(1u16.to_be_bytes()); // one track
    bytes.extend(480u16.to_be_bytes()); // quarter-note division
    bytes.extend(b"MTrk");
    bytes.extend((track.len() as u32).to_be_bytes());
    bytes.extend(track);
    bytes
}

#[test]
fn full_pipeline_load_segment_name_transform_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c_major.mid");
    std::fs::write(&path, c_major_smf_bytes()).unwrap();

    let mut document = Document::new();
    document.load(&path).unwrap();

    assert_eq!(1, document.chords().len());
    assert_eq!("C", document.chords()[0].name());
    assert_eq!(&[60, 64, 67], document.chords()[0].pitches());
    assert_eq!(480, document.chords()[0].duration());

    let results = document.transform(
        &[0],
        &[Some("Am")],
        &TransformationOptions::default(),
        SystemTime::UNIX_EPOCH,
    );
    assert!(results[0].is_ok());
    assert_eq!("Am", document.chords()[0].name());
    assert!(document.chords()[0].is_transformed());
    assert_eq!(Some(&[60u8, 64, 67][..]), document.chords()[0].original_pitches());

    assert!(document.undo());
    assert_eq!("C", document.chords()[0].name());
    assert!(document.redo());
    assert_eq!("Am", document.chords()[0].name());

    let key = document.detect_key();
    assert!(key.is_none(), "a single chord should not yield a confident key");

    let out_path = dir.path().join("roundtrip.mid");
    document.save(&out_path).unwrap();
    let reloaded = MidiFile::load(&out_path).unwrap();
    assert_eq!(1, reloaded.tracks_len());
}

#[test]
fn switch_tonality_then_dump_reports_original() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c_major.mid");
    std::fs::write(&path, c_major_smf_bytes()).unwrap();

    let mut document = Document::new();
    document.load(&path).unwrap();
    document.switch_tonality(0, SystemTime::UNIX_EPOCH).unwrap();
    assert_eq!("Cm", document.chords()[0].name());

    let text = chordcraft::dump::dump("c_major.mid", document.chords());
    assert!(text.contains("Cm"));
    assert!(text.contains("original: C"));
}

#[test]
fn inversion_transform_produces_slash_chord_voicing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c_major.mid");
    std::fs::write(&path, c_major_smf_bytes()).unwrap();

    let mut document = Document::new();
    document.load(&path).unwrap();

    let options = TransformationOptions {
        mode: TransformMode::Inversion,
        inversion: 1,
        use_voice_leading: false,
        ..TransformationOptions::default()
    };
    let results = document.transform(&[0], &[Some("C")], &options, SystemTime::UNIX_EPOCH);
    assert!(results[0].is_ok());
    assert!(document.chords()[0].name().contains('/'));
}

#[test]
fn loading_truncated_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.mid");
    std::fs::write(&path, b"MThd\x00\x00\x00").unwrap();

    let mut document = Document::new();
    assert!(document.load(&path).is_err());
}
