//! Plain-text chord analysis output, as produced by a host wrapping [`crate::document::Document`].

use std::fmt::Write as _;

use crate::chord::{pitch_class_name, Chord};

/// Render a header block (`file_name` and chord count) followed by one record per chord: its
/// 1-based index, name, onset tick, duration tick, comma-separated pitch names, and — for chords
/// a transform has touched — the name and pitches it had before that transform.
pub fn dump(file_name: &str, chords: &[Chord]) -> String {
    let mut out = String::new();
    writeln!(out, "File: {}", file_name).unwrap();
    writeln!(out, "Chords: {}", chords.len()).unwrap();
    writeln!(out).unwrap();

    for (i, chord) in chords.iter().enumerate() {
        writeln!(
            out,
            "{}. {} (onset {}, duration {})",
            i + 1,
            chord.name(),
            chord.onset(),
            chord.duration()
        )
        .unwrap();
        writeln!(out, "   pitches: {}", pitch_names(chord.pitches())).unwrap();
        if let (Some(original_name), Some(original_pitches)) =
            (chord.original_name(), chord.original_pitches())
        {
            writeln!(
                out,
                "   original: {} ({})",
                original_name,
                pitch_names(original_pitches)
            )
            .unwrap();
        }
    }

    out
}

fn pitch_names(pitches: &[u8]) -> String {
    pitches
        .iter()
        .map(|&p| format!("{}{}", pitch_class_name(p % 12), p / 12 - 1))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::Chord;

    #[test]
    fn header_names_file_and_chord_count() {
        let chords = vec![Chord::synthetic(vec![60, 64, 67], 0, 480)];
        let text = dump("song.mid", &chords);
        assert!(text.contains("File: song.mid"));
        assert!(text.contains("Chords: 1"));
        assert!(text.contains("1. C (onset 0, duration 480)"));
        assert!(text.contains("pitches: C4, E4, G4"));
    }

    #[test]
    fn transformed_chord_includes_original() {
        let mut chord = Chord::synthetic(vec![60, 64, 67], 0, 480);
        chord.update(vec![60, 64, 69], "Am".to_string());
        let text = dump("song.mid", &[chord]);
        assert!(text.contains("original: C (C4, E4, G4)"));
    }

    #[test]
    fn untransformed_chord_has_no_original_line() {
        let chords = vec![Chord::synthetic(vec![60, 64, 67], 0, 480)];
        let text = dump("song.mid", &chords);
        assert!(!text.contains("original:"));
    }
}
