/// Root-position interval vectors (semitones above the lowest pitch) mapped to a chord quality
/// suffix. Ninths reach above an octave (14 = a major 9th above the root) by design: the pattern
/// is matched against the chord's raw interval vector, not a pitch-class-reduced one.
const QUALITY_TABLE: &[(&[i32], &str)] = &[
    (&[0, 4, 7], ""),
    (&[0, 3, 7], "m"),
    (&[0, 3, 6], "dim"),
    (&[0, 4, 8], "aug"),
    (&[0, 5, 7], "sus4"),
    (&[0, 2, 7], "sus2"),
    (&[0, 4, 7, 10], "7"),
    (&[0, 4, 7, 11], "maj7"),
    (&[0, 3, 7, 10], "m7"),
    (&[0, 3, 6, 9], "dim7"),
    (&[0, 3, 6, 10], "m7\u{266d}5"),
    (&[0, 4, 8, 10], "aug7"),
    (&[0, 5, 7, 10], "7sus4"),
    (&[0, 4, 7, 9], "6"),
    (&[0, 3, 7, 9], "m6"),
    (&[0, 4, 7, 10, 14], "9"),
    (&[0, 4, 7, 11, 14], "maj9"),
    (&[0, 3, 7, 10, 14], "m9"),
    (&[0, 4, 7, 14], "add9"),
    (&[0, 3, 7, 14], "madd9"),
];

const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C\u{266f}", "D", "D\u{266f}", "E", "F", "F\u{266f}", "G", "G\u{266f}", "A", "A\u{266f}",
    "B",
];

pub fn pitch_class_name(pc: u8) -> &'static str {
    PITCH_CLASS_NAMES[(pc % 12) as usize]
}

fn natural_pitch_class(letter: char) -> Option<u8> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

fn lookup_quality(intervals: &[i32]) -> Option<&'static str> {
    QUALITY_TABLE
        .iter()
        .find(|(pattern, _)| *pattern == intervals)
        .map(|(_, quality)| *quality)
}

/// Name an ascending, deduplicated pitch list per the root-position/inversion/fallback rules.
///
/// Root position is tried first; failing that, every inversion (shifting the lowest `k` interval
/// entries up an octave and re-sorting) is tried in turn, naming the result `root/bass` on a
/// match. If nothing matches, a descriptive fallback names the lowest pitch and lists the rest.
pub fn name_pitches(pitches: &[u8]) -> String {
    if pitches.is_empty() {
        return String::new();
    }
    let root = pitches[0];
    let intervals: Vec<i32> = pitches.iter().map(|&p| p as i32 - root as i32).collect();

    if let Some(quality) = lookup_quality(&intervals) {
        return format!("{}{}", pitch_class_name(root % 12), quality);
    }

    for k in 1..intervals.len() {
        let mut rotated: Vec<i32> = intervals
            .iter()
            .enumerate()
            .map(|(i, v)| if i < k { v + 12 } else { *v })
            .collect();
        rotated.sort_unstable();
        let base = rotated[0];
        let rebased: Vec<i32> = rotated.iter().map(|v| v - base).collect();
        if let Some(quality) = lookup_quality(&rebased) {
            let root_pc = ((root as i32 + base).rem_euclid(12)) as u8;
            let bass_pc = root % 12;
            return format!(
                "{}{}/{}",
                pitch_class_name(root_pc),
                quality,
                pitch_class_name(bass_pc)
            );
        }
    }

    let others: Vec<String> = pitches[1..]
        .iter()
        .map(|&p| pitch_class_name(p % 12).to_string())
        .collect();
    format!("{} ({})", pitch_class_name(root % 12), others.join(", "))
}

/// Parse a chord-name string (as produced by [`name_pitches`]'s root-position or fallback form,
/// or supplied directly by a caller) back into a root pitch class and its raw interval vector.
///
/// A slash-chord suffix (`/bass`) is accepted but the bass spelling is discarded; callers needing
/// STANDARD/SWITCH_TONALITY target pitch classes only need the root and quality.
pub fn parse_name(name: &str) -> Option<(u8, &'static [i32])> {
    parse_name_with_quality(name).map(|(pc, _, intervals)| (pc, intervals))
}

/// As [`parse_name`], but also returns the canonical quality suffix string the name matched
/// (needed by SWITCH_TONALITY to look the current quality up in its mapping table).
pub fn parse_name_with_quality(name: &str) -> Option<(u8, &'static str, &'static [i32])> {
    let name = name.split('/').next().unwrap_or(name);
    let mut chars = name.chars();
    let letter = chars.next()?;
    let natural = natural_pitch_class(letter)?;
    let rest = chars.as_str();

    let (pc, suffix) = if let Some(tail) = rest.strip_prefix('#').or_else(|| rest.strip_prefix('\u{266f}')) {
        ((natural + 1) % 12, tail)
    } else if let Some(tail) = rest.strip_prefix('b').or_else(|| rest.strip_prefix('\u{266d}')) {
        ((natural + 11) % 12, tail)
    } else {
        (natural, rest)
    };

    let (quality, intervals) = QUALITY_TABLE
        .iter()
        .find(|(_, q)| *q == suffix)
        .map(|(pattern, q)| (*q, *pattern))?;
    Some((pc, quality, intervals))
}

/// Target pitch classes (0..11, ascending, deduplicated) for a chord name, as used by STANDARD and
/// SWITCH_TONALITY transforms.
pub fn target_pitch_classes(name: &str) -> Option<Vec<u8>> {
    let (root, intervals) = parse_name(name)?;
    let mut pcs: Vec<u8> = intervals
        .iter()
        .map(|i| ((root as i32 + i).rem_euclid(12)) as u8)
        .collect();
    pcs.sort_unstable();
    pcs.dedup();
    Some(pcs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_position_triad() {
        assert_eq!("C", name_pitches(&[60, 64, 67]));
        assert_eq!("Am", name_pitches(&[57, 60, 64]));
    }

    #[test]
    fn root_position_seventh() {
        assert_eq!("Cmaj7", name_pitches(&[60, 64, 67, 71]));
        assert_eq!("Dm7", name_pitches(&[62, 65, 69, 72]));
    }

    #[test]
    fn first_inversion_reports_slash_chord() {
        // E-G-C: first inversion of C major.
        assert_eq!("C/E", name_pitches(&[64, 67, 72]));
    }

    #[test]
    fn unrecognized_set_falls_back_to_descriptive_name() {
        let name = name_pitches(&[60, 61, 62]);
        assert!(name.starts_with('C'));
        assert!(name.contains('('));
    }

    #[test]
    fn parse_name_round_trips_quality() {
        let (pc, intervals) = parse_name("Cm7").unwrap();
        assert_eq!(0, pc);
        assert_eq!(&[0, 3, 7, 10], intervals);
    }

    #[test]
    fn target_pitch_classes_for_am() {
        assert_eq!(vec![0, 4, 9], target_pitch_classes("Am").unwrap());
    }
}
