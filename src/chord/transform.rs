use crate::chord::namer::{name_pitches, parse_name_with_quality, target_pitch_classes};
use crate::chord::voice_leader::{lead_voices, VoiceLeadingOptions};
use crate::chord::Chord;
use crate::error;

/// Fixed major/minor quality pairs consulted by [`TransformMode::SwitchTonality`]. Each pair is
/// bidirectional: switching an already-minor quality maps it back to its major counterpart.
const TONALITY_SWITCH: &[(&str, &str)] = &[
    ("", "m"),
    ("7", "m7"),
    ("maj7", "m7"),
    ("6", "m6"),
    ("add9", "madd9"),
    ("9", "m9"),
    ("maj9", "m9"),
    ("dim", "m"),
    ("dim7", "m7\u{266d}5"),
    ("aug", ""),
];

/// Selects which parametric rewrite [`transform`] performs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TransformMode {
    /// Rewrite to the target chord's pitch classes directly.
    Standard,
    /// Rewrite to the target chord's pitch classes in a chosen inversion.
    Inversion,
    /// Interpolate a fraction of the way from the current voicing toward the target.
    Percentage,
    /// Flip between the chord's major and minor counterpart, keeping the same root.
    SwitchTonality,
}

/// Parameters shared by every [`transform`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformationOptions {
    /// Which rewrite mode to apply.
    pub mode: TransformMode,
    /// Inversion index for [`TransformMode::Inversion`], clamped to `0..=(target size - 1)`.
    pub inversion: u8,
    /// Interpolation percentage for [`TransformMode::Percentage`], clamped to `0..=100`.
    pub percentage: u8,
    /// Hold the voice whose pitch class matches the chord's current root fixed, re-voicing only
    /// the rest of the target toward the remaining voices. Applies to STANDARD, INVERSION, and
    /// PERCENTAGE; has no effect on SWITCH_TONALITY, which already keeps the root pitch class by
    /// construction. Ignored if `preserve_bass` is also set (the bass wins) or if the chord's
    /// current name doesn't parse to a root.
    pub preserve_root: bool,
    /// Hold the current lowest-sounding voice fixed, re-voicing only the rest of the target toward
    /// the remaining voices. Applies to STANDARD, INVERSION, and PERCENTAGE; has no effect on
    /// SWITCH_TONALITY. Takes priority over `preserve_root` when both are set.
    pub preserve_bass: bool,
    /// Whether STANDARD/INVERSION should run the voice-leader rather than a naive octave match.
    pub use_voice_leading: bool,
    /// Options forwarded to the voice-leader when it runs.
    pub voice_leading: VoiceLeadingOptions,
}

impl Default for TransformationOptions {
    fn default() -> Self {
        TransformationOptions {
            mode: TransformMode::Standard,
            inversion: 0,
            percentage: 100,
            preserve_root: false,
            preserve_bass: false,
            use_voice_leading: true,
            voice_leading: VoiceLeadingOptions::default(),
        }
    }
}

/// Rewrite `chord` in place toward `target_name`, per `options.mode`.
///
/// `target_name` is ignored for [`TransformMode::SwitchTonality`], which derives its target from
/// the chord's own current name. Every pitch produced is clamped into `0..=127`. For the other
/// three modes, `options.preserve_root`/`options.preserve_bass` hold one voice's pitch fixed and
/// re-voice only the remaining target pitch classes toward the remaining voices.
pub fn transform(
    chord: &mut Chord,
    target_name: Option<&str>,
    options: &TransformationOptions,
) -> crate::Result<()> {
    let current = chord.pitches().to_vec();
    let pinned = pinned_voice(&current, chord.name(), options);

    let (new_pitches, new_name) = match options.mode {
        TransformMode::Standard => {
            let name = require_name(target_name)?;
            let mut targets = resolve_targets(name)?;
            let remaining = exclude_pinned(&current, &mut targets, pinned, |t| t);
            let mut pitches = if options.use_voice_leading {
                lead_voices(&targets, &remaining, &options.voice_leading)
            } else {
                place_matching_octave(&targets, &remaining)
            };
            restore_pinned(&mut pitches, pinned);
            let pitches = clamp_pitches(pitches);
            let name = name_pitches(&pitches);
            (pitches, name)
        }
        TransformMode::Inversion => {
            let name = require_name(target_name)?;
            let targets = resolve_targets(name)?;
            let mut inverted = invert(&targets, options.inversion);
            let remaining = exclude_pinned(&current, &mut inverted, pinned, |t| {
                (t as i32).rem_euclid(12) as u8
            });
            let mut pitches = if options.use_voice_leading {
                lead_voices(&inverted, &remaining, &options.voice_leading)
            } else {
                place_matching_octave(&inverted, &remaining)
            };
            restore_pinned(&mut pitches, pinned);
            let pitches = clamp_pitches(pitches);
            let name = name_pitches(&pitches);
            (pitches, name)
        }
        TransformMode::Percentage => {
            let name = require_name(target_name)?;
            let mut targets = resolve_targets(name)?;
            let remaining = exclude_pinned(&current, &mut targets, pinned, |t| t);
            let voice_led_target = lead_voices(&targets, &remaining, &options.voice_leading);
            let percentage = options.percentage.min(100) as f64 / 100.0;
            let mut pitches = interpolate(&remaining, &voice_led_target, percentage);
            restore_pinned(&mut pitches, pinned);
            pitches.sort_unstable();
            let pitches = clamp_pitches(pitches);
            let name = name_pitches(&pitches);
            (pitches, name)
        }
        TransformMode::SwitchTonality => {
            let mapped_name = switch_tonality_name(chord.name())?;
            let targets = resolve_targets(&mapped_name)?;
            let pitches = lead_voices(&targets, &current, &options.voice_leading);
            let pitches = clamp_pitches(pitches);
            (pitches, mapped_name)
        }
    };

    chord.update(new_pitches, new_name);
    Ok(())
}

fn require_name(target_name: Option<&str>) -> crate::Result<&str> {
    target_name.ok_or_else(|| {
        error::EmptyInput {
            site: site!(),
            description: "transform requires a target chord name".to_string(),
        }
        .build()
        .into()
    })
}

/// The pitch `preserve_root`/`preserve_bass` asks to hold fixed, if either is set and applicable.
/// `preserve_bass` wins when both are set. Returns `None` if neither flag is set, if
/// `preserve_root` is set but `current_name` doesn't parse to a recognized root, or if `current`
/// is empty.
fn pinned_voice(current: &[u8], current_name: &str, options: &TransformationOptions) -> Option<u8> {
    if options.preserve_bass {
        return current.iter().copied().min();
    }
    if options.preserve_root {
        let (root_pc, _, _) = parse_name_with_quality(current_name)?;
        return current.iter().copied().find(|&p| p % 12 == root_pc);
    }
    None
}

/// If `pinned` is set, drop its pitch class from `targets` (via `pitch_class_of`, since
/// [`invert`]'s output isn't always already reduced to `0..=11`) and return `current` with the
/// pinned pitch removed. Otherwise leaves `targets` untouched and returns `current` as-is.
fn exclude_pinned(
    current: &[u8],
    targets: &mut Vec<u8>,
    pinned: Option<u8>,
    pitch_class_of: impl Fn(u8) -> u8,
) -> Vec<u8> {
    match pinned {
        Some(p) => {
            let pc = p % 12;
            targets.retain(|&t| pitch_class_of(t) != pc);
            current.iter().copied().filter(|&v| v != p).collect()
        }
        None => current.to_vec(),
    }
}

/// Append the pinned pitch (if any) back into a voice-led result.
fn restore_pinned(pitches: &mut Vec<u8>, pinned: Option<u8>) {
    if let Some(p) = pinned {
        pitches.push(p);
    }
}

fn resolve_targets(name: &str) -> crate::Result<Vec<u8>> {
    target_pitch_classes(name).ok_or_else(|| {
        error::EmptyInput {
            site: site!(),
            description: format!("'{}' does not name a recognized chord quality", name),
        }
        .build()
        .into()
    })
}

/// Raise the lowest `k` entries of `targets` by an octave and re-sort, where `k` is
/// `inversion.min(targets.len() - 1)`.
fn invert(targets: &[u8], inversion: u8) -> Vec<u8> {
    if targets.is_empty() {
        return Vec::new();
    }
    let mut sorted = targets.to_vec();
    sorted.sort_unstable();
    let k = (inversion as usize).min(sorted.len() - 1);
    let mut raised: Vec<u8> = sorted
        .iter()
        .enumerate()
        .map(|(i, &t)| if i < k { t + 12 } else { t })
        .collect();
    raised.sort_unstable();
    raised
}

/// Place `targets` (pitch classes) in the octave such that the lowest placed pitch's octave
/// matches the lowest pitch of `current` — the non-voice-led STANDARD/INVERSION placement.
fn place_matching_octave(targets: &[u8], current: &[u8]) -> Vec<u8> {
    if targets.is_empty() {
        return Vec::new();
    }
    let base_octave = current.iter().min().copied().unwrap_or(60) as i32 / 12;
    let mut placed: Vec<u8> = targets
        .iter()
        .map(|&pc| ((pc as i32 + 12 * base_octave).clamp(0, 127)) as u8)
        .collect();
    placed.sort_unstable();
    placed
}

/// Pair each pitch in `current` with its closest pitch in `target` (and any unmatched target
/// pitch with its closest current pitch), then interpolate `percentage` of the way there.
fn interpolate(current: &[u8], target: &[u8], percentage: f64) -> Vec<u8> {
    if target.is_empty() {
        return current.to_vec();
    }
    if current.is_empty() {
        return target.to_vec();
    }

    let mut claimed_targets = vec![false; target.len()];
    let mut pairs: Vec<(u8, u8)> = Vec::new();

    for &v in current {
        let (idx, &w) = target
            .iter()
            .enumerate()
            .min_by_key(|&(_, &w)| (w as i32 - v as i32).abs())
            .unwrap();
        claimed_targets[idx] = true;
        pairs.push((v, w));
    }
    for (idx, &w) in target.iter().enumerate() {
        if !claimed_targets[idx] {
            let v = current
                .iter()
                .min_by_key(|&&v| (w as i32 - v as i32).abs())
                .copied()
                .unwrap();
            pairs.push((v, w));
        }
    }

    pairs
        .into_iter()
        .map(|(v, w)| {
            let interpolated = v as f64 + (w as f64 - v as f64) * percentage;
            interpolated.round().clamp(0.0, 127.0) as u8
        })
        .collect()
}

fn clamp_pitches(pitches: Vec<u8>) -> Vec<u8> {
    let mut pitches = pitches;
    pitches.sort_unstable();
    pitches.dedup();
    pitches
}

fn switch_tonality_name(current_name: &str) -> crate::Result<String> {
    let (root_pc, quality, _) = parse_name_with_quality(current_name).ok_or_else(|| {
        error::EmptyInput {
            site: site!(),
            description: format!(
                "'{}' does not name a recognized chord quality",
                current_name
            ),
        }
        .build()
        .into()
    })?;
    let mapped = TONALITY_SWITCH
        .iter()
        .find_map(|&(major, minor)| {
            if major == quality {
                Some(minor)
            } else if minor == quality {
                Some(major)
            } else {
                None
            }
        })
        .unwrap_or(quality);
    let root_name = super::namer::pitch_class_name(root_pc);
    Ok(format!("{}{}", root_name, mapped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::Chord;

    fn chord(pitches: &[u8]) -> Chord {
        Chord::synthetic(pitches.to_vec(), 0, 480)
    }

    #[test]
    fn standard_transform_to_am_with_voice_leading() {
        let mut c = chord(&[60, 64, 67]);
        transform(&mut c, Some("Am"), &TransformationOptions::default()).unwrap();
        assert_eq!(&[60, 64, 69], c.pitches());
        assert_eq!("Am", c.name());
        assert_eq!(Some(&[60u8, 64, 67][..]), c.original_pitches());
    }

    #[test]
    fn percentage_transform_halfway_to_f() {
        let mut c = chord(&[60, 64, 67]);
        let options = TransformationOptions {
            mode: TransformMode::Percentage,
            percentage: 50,
            ..TransformationOptions::default()
        };
        transform(&mut c, Some("F"), &options).unwrap();
        assert_eq!(&[60, 65, 68], c.pitches());
    }

    #[test]
    fn switch_tonality_cmaj7_to_cm7() {
        let mut c = chord(&[60, 64, 67, 71]);
        // name_pitches would already call this Cmaj7; force it to be explicit for the test.
        assert_eq!("Cmaj7", c.name());
        transform(&mut c, None, &TransformationOptions {
            mode: TransformMode::SwitchTonality,
            ..TransformationOptions::default()
        })
        .unwrap();
        assert_eq!("Cm7", c.name());
        assert_eq!(&[60, 63, 67, 70], c.pitches());
    }

    #[test]
    fn unrecognized_target_name_is_an_error() {
        let mut c = chord(&[60, 64, 67]);
        let result = transform(&mut c, Some("not a chord"), &TransformationOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn preserve_bass_holds_the_lowest_voice_fixed() {
        let mut c = chord(&[60, 64, 67]);
        let options = TransformationOptions {
            preserve_bass: true,
            ..TransformationOptions::default()
        };
        transform(&mut c, Some("Am"), &options).unwrap();
        assert!(c.pitches().contains(&60));
    }

    #[test]
    fn preserve_root_holds_the_root_pitch_class_fixed_when_it_is_not_the_bass() {
        // E-G-C, a first inversion of C major: the root (pitch class 0) sits at 72, an octave
        // above the bass at 64. preserve_root should keep that exact pitch in place.
        let mut c = chord(&[64, 67, 72]);
        assert_eq!("C/E", c.name());
        let options = TransformationOptions {
            mode: TransformMode::Inversion,
            inversion: 1,
            preserve_root: true,
            use_voice_leading: false,
            ..TransformationOptions::default()
        };
        transform(&mut c, Some("C"), &options).unwrap();
        assert!(c.pitches().contains(&72));
    }

    #[test]
    fn preserve_bass_survives_a_percentage_interpolation() {
        let mut c = chord(&[60, 64, 67]);
        let options = TransformationOptions {
            mode: TransformMode::Percentage,
            percentage: 50,
            preserve_bass: true,
            ..TransformationOptions::default()
        };
        transform(&mut c, Some("F"), &options).unwrap();
        assert!(c.pitches().contains(&60));
    }
}
