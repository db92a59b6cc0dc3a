use crate::chord::{parse_name_with_quality, pitch_class_name, Chord};

/// A known chord-quality sequence, its display name, and the keys it's commonly heard in.
///
/// `degree_offsets` gives each slot's semitone distance above the pattern's implied tonic (e.g.
/// `ii` sits a whole step, 2 semitones, above `I`) so a match's "starting root" can be compared
/// against `common_keys` as the key the pattern resolves to, not the literal root of its first
/// chord (a ii-V-I match starting on a Dm7 implies the key of C, not D).
struct Pattern {
    display_name: &'static str,
    qualities: &'static [&'static str],
    degree_offsets: &'static [i32],
    tonic_is_minor: bool,
    common_keys: &'static [&'static str],
}

const PATTERNS: &[Pattern] = &[
    Pattern {
        display_name: "ii-V-I",
        qualities: &["m", "7", ""],
        degree_offsets: &[2, 7, 0],
        tonic_is_minor: false,
        common_keys: &["C", "F", "G", "Bb"],
    },
    Pattern {
        display_name: "I-V-vi-IV",
        qualities: &["", "", "m", ""],
        degree_offsets: &[0, 7, 9, 5],
        tonic_is_minor: false,
        common_keys: &["C", "G", "D"],
    },
    Pattern {
        display_name: "I-IV-V",
        qualities: &["", "", ""],
        degree_offsets: &[0, 5, 7],
        tonic_is_minor: false,
        common_keys: &["C", "G", "D", "A"],
    },
    Pattern {
        display_name: "ii-V-i (minor)",
        qualities: &["m7\u{266d}5", "7", "m"],
        degree_offsets: &[2, 7, 0],
        tonic_is_minor: true,
        common_keys: &["Am", "Dm", "Em"],
    },
];

const MIN_CONFIDENCE: f64 = 0.6;

/// A progression match against the labelled chord sequence: which pattern, where it starts, and
/// how confident the match is.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressionMatch {
    name: &'static str,
    start_index: usize,
    length: usize,
    confidence: f64,
}

impl ProgressionMatch {
    /// The progression's display name, e.g. `"ii-V-I"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The index into the chord list where the match begins.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// The number of chords the match spans.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Match confidence in `0.0..=1.0`.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

fn quality_matches_major_family(target: &str, actual: &str) -> bool {
    target.is_empty() && matches!(actual, "" | "maj7" | "6" | "9")
}

fn same_first_letter(a: &str, b: &str) -> bool {
    match (a.chars().next(), b.chars().next()) {
        (None, None) => true,
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Slide every known pattern over `chords`, scoring each window by quality match, and return every
/// match scoring at least 0.6 confidence, sorted by descending confidence.
///
/// A window scores +1.0 per exact quality match (where a `""` pattern slot also accepts the major
/// family `"maj7"`/`"6"`/`"9"`), +0.5 for a same-letter-family partial match (e.g. `"m"` vs `"m7"`),
/// and aborts on any other mismatch. The per-chord average is then scaled by 1.2 if the window's
/// starting chord's root matches one of the pattern's common keys, else by 0.8.
pub fn analyze(chords: &[Chord]) -> Vec<ProgressionMatch> {
    let mut matches = Vec::new();
    for start in 0..chords.len() {
        for pattern in PATTERNS {
            let len = pattern.qualities.len();
            if start + len > chords.len() {
                continue;
            }
            if let Some(confidence) = score_window(&chords[start..start + len], pattern) {
                if confidence >= MIN_CONFIDENCE {
                    matches.push(ProgressionMatch {
                        name: pattern.display_name,
                        start_index: start,
                        length: len,
                        confidence,
                    });
                }
            }
        }
    }
    matches.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
    matches
}

fn score_window(window: &[Chord], pattern: &Pattern) -> Option<f64> {
    let mut total = 0.0;
    let mut start_root: Option<u8> = None;
    for (chord, &target_quality) in window.iter().zip(pattern.qualities.iter()) {
        let (root_pc, quality, _) = parse_name_with_quality(chord.name())?;
        if start_root.is_none() {
            start_root = Some(root_pc);
        }
        if quality == target_quality || quality_matches_major_family(target_quality, quality) {
            total += 1.0;
        } else if same_first_letter(target_quality, quality) {
            total += 0.5;
        } else {
            return None;
        }
    }
    let mut confidence = total / pattern.qualities.len() as f64;

    let start_root = start_root?;
    let tonic = ((start_root as i32 - pattern.degree_offsets[0]).rem_euclid(12)) as u8;
    let tonic_name = pitch_class_name(tonic).to_string();
    let key_name = if pattern.tonic_is_minor {
        format!("{}m", tonic_name)
    } else {
        tonic_name
    };
    if pattern.common_keys.contains(&key_name.as_str()) {
        confidence *= 1.2;
    } else {
        confidence *= 0.8;
    }
    Some(confidence.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::Chord;

    fn chord(pitches: &[u8]) -> Chord {
        Chord::synthetic(pitches.to_vec(), 0, 480)
    }

    #[test]
    fn detects_ii_v_i_in_c() {
        // Dm7, G7, Cmaj7
        let chords = vec![
            chord(&[62, 65, 69, 72]),
            chord(&[67, 71, 74, 77]),
            chord(&[60, 64, 67, 71]),
        ];
        let matches = analyze(&chords);
        let best = matches.iter().find(|m| m.name() == "ii-V-I").expect("expected ii-V-I match");
        assert_eq!(0, best.start_index());
        assert!(best.confidence() >= 0.72, "confidence was {}", best.confidence());
    }

    #[test]
    fn no_chords_yields_no_matches() {
        assert!(analyze(&[]).is_empty());
    }
}
