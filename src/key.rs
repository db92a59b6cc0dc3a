use crate::chord::{parse_name_with_quality, Chord};

/// A detected key: a root pitch class, major/minor flag, the seven scale pitch classes, and the
/// default triad quality for each scale degree (1-indexed by position, degree 1 first).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeySignature {
    root: u8,
    is_major: bool,
    scale: [u8; 7],
    degree_qualities: [&'static str; 7],
}

impl KeySignature {
    /// The key's tonic pitch class, 0..11.
    pub fn root(&self) -> u8 {
        self.root
    }

    /// `true` for a major key, `false` for minor.
    pub fn is_major(&self) -> bool {
        self.is_major
    }

    /// The key's seven scale degrees as pitch classes, tonic first.
    pub fn scale(&self) -> [u8; 7] {
        self.scale
    }

    /// The conventional display name, e.g. `"C"` or `"Am"`.
    pub fn name(&self) -> String {
        let root_name = crate::chord::pitch_class_name(self.root);
        if self.is_major {
            root_name.to_string()
        } else {
            format!("{}m", root_name)
        }
    }

    /// The default triad quality for `degree` (1..=7).
    pub fn degree_quality(&self, degree: u8) -> Option<&'static str> {
        self.degree_qualities.get((degree.checked_sub(1)?) as usize).copied()
    }
}

const MAJOR_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR_STEPS: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];
const MAJOR_DEGREE_QUALITIES: [&str; 7] = ["", "m", "m", "", "", "m", "dim"];
const MINOR_DEGREE_QUALITIES: [&str; 7] = ["m", "dim", "", "m", "m", "", ""];

fn scale_for(root: u8, is_major: bool) -> [u8; 7] {
    let steps = if is_major { MAJOR_STEPS } else { MINOR_STEPS };
    let mut scale = [0u8; 7];
    for (i, step) in steps.iter().enumerate() {
        scale[i] = (root + step) % 12;
    }
    scale
}

fn all_candidate_keys() -> Vec<KeySignature> {
    let mut keys = Vec::with_capacity(24);
    for root in 0..12u8 {
        keys.push(KeySignature {
            root,
            is_major: true,
            scale: scale_for(root, true),
            degree_qualities: MAJOR_DEGREE_QUALITIES,
        });
        keys.push(KeySignature {
            root,
            is_major: false,
            scale: scale_for(root, false),
            degree_qualities: MINOR_DEGREE_QUALITIES,
        });
    }
    keys
}

const MIN_CONFIDENT_SCORE: f64 = 0.6;

/// Score every major and minor key against the pitch-class histogram of `chords`' notes plus
/// functional cues from their labels, returning the best match if its score clears 0.6.
///
/// This never fails hard: an empty chord list, or one with no chord scoring high enough,
/// simply yields `None` ("no confident key"), matching `NoConfidentKey`'s "soft" classification.
pub fn detect_key(chords: &[Chord]) -> Option<KeySignature> {
    let mut histogram = [0u64; 12];
    for chord in chords {
        for &pitch in chord.pitches() {
            histogram[(pitch % 12) as usize] += 1;
        }
    }
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return None;
    }

    let mut best: Option<(f64, KeySignature)> = None;
    for key in all_candidate_keys() {
        let scale_sum: u64 = key.scale.iter().map(|&pc| histogram[pc as usize]).sum();
        let mut score = scale_sum as f64 / total as f64;

        let tonic = key.root;
        let dominant = (key.root + 7) % 12;
        let subdominant = (key.root + 5) % 12;
        if histogram[tonic as usize] > 0 {
            score *= 1.2;
        }
        if histogram[dominant as usize] > 0 {
            score *= 1.1;
        }
        if histogram[subdominant as usize] > 0 {
            score *= 1.05;
        }

        let tonic_family: &[&str] = if key.is_major {
            &["", "maj7", "6"]
        } else {
            &["m", "m7"]
        };
        let mut has_tonic_chord = false;
        let mut has_dominant_chord = false;
        let mut has_subdominant_chord = false;
        for chord in chords {
            if let Some((root_pc, quality, _)) = parse_name_with_quality(chord.name()) {
                if root_pc == tonic && tonic_family.contains(&quality) {
                    has_tonic_chord = true;
                }
                if root_pc == dominant && (quality == "" || quality == "7") {
                    has_dominant_chord = true;
                }
                let subdominant_family: &[&str] = if key.is_major {
                    &["", "maj7"]
                } else {
                    &["m", "m7"]
                };
                if root_pc == subdominant && subdominant_family.contains(&quality) {
                    has_subdominant_chord = true;
                }
            }
        }
        if has_tonic_chord {
            score *= 1.3;
        }
        if has_dominant_chord {
            score *= 1.2;
        }
        if has_subdominant_chord {
            score *= 1.1;
        }

        if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
            best = Some((score, key));
        }
    }

    best.filter(|(score, _)| *score >= MIN_CONFIDENT_SCORE)
        .map(|(_, key)| key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::Chord;

    fn chord(pitches: &[u8]) -> Chord {
        Chord::synthetic(pitches.to_vec(), 0, 480)
    }

    #[test]
    fn detects_c_major_from_tonic_dominant_subdominant_chords() {
        let chords = vec![
            chord(&[60, 64, 67]),      // C
            chord(&[65, 69, 72]),      // F
            chord(&[67, 71, 74]),      // G
            chord(&[60, 64, 67]),      // C
        ];
        let key = detect_key(&chords).expect("expected a confident key");
        assert_eq!(0, key.root());
        assert!(key.is_major());
        assert_eq!("C", key.name());
    }

    #[test]
    fn no_chords_yields_no_confident_key() {
        assert!(detect_key(&[]).is_none());
    }
}
