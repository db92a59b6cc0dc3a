/// Options controlling how [`lead_voices`] chooses octave placements for a target pitch-class set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct VoiceLeadingOptions {
    /// Double the movement cost, biasing the search toward the smallest possible total movement.
    pub minimize_movement: bool,
    /// Reject any candidate voicing with parallel perfect fifths or octaves against the prior
    /// voicing (only meaningful when the candidate has the same voice count as the prior voicing).
    pub avoid_parallels: bool,
    /// Penalize candidates whose voice count differs from the prior voicing.
    pub maintain_voice_count: bool,
    /// Per-voice movement beyond this many semitones is penalized rather than merely counted.
    pub max_voice_movement: u32,
}

impl Default for VoiceLeadingOptions {
    fn default() -> Self {
        VoiceLeadingOptions {
            minimize_movement: false,
            avoid_parallels: false,
            maintain_voice_count: false,
            max_voice_movement: 7,
        }
    }
}

/// A single voice's movement from a prior voicing to a new one, for reporting.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct VoiceMovement {
    /// The prior pitch, or 0 for a new voice with no prior counterpart.
    pub original: u8,
    /// The pitch this voice moved to.
    pub new: u8,
    /// Signed semitone movement (`new - original`).
    pub delta: i32,
    /// Whether this voice was matched to its closest available target.
    pub optimal: bool,
}

/// Choose octave placements for `targets` (pitch classes, 0..11) that keep each voice of `current`
/// moving as little as possible, per `options`.
///
/// The octave search window is derived from `current`'s range, clamped to the instrument's usable
/// octaves (0..10): every combination of octave assignments for each target pitch class is
/// enumerated, filtered for parallel motion if requested, and scored by [`movement_cost`]; the
/// lowest-cost candidate wins.
pub fn lead_voices(targets: &[u8], current: &[u8], options: &VoiceLeadingOptions) -> Vec<u8> {
    if targets.is_empty() {
        return Vec::new();
    }
    if current.is_empty() {
        return targets.iter().map(|&pc| pc + 12 * 5).collect();
    }

    let min_v = *current.iter().min().unwrap() as i32;
    let max_v = *current.iter().max().unwrap() as i32;
    let lo = ((min_v / 12) - 1).max(0);
    let hi = ((max_v / 12) + 1).min(10);

    // Primary key is exactly C(W) from the spec; a candidate's residual "distance from the
    // unclaimed targets back to the nearest prior voice" breaks ties the formula leaves open
    // (several octave placements of an unclaimed voice can share the same C(W)).
    let mut best: Option<((i64, i64), Vec<u8>)> = None;
    let mut first_candidate: Option<Vec<u8>> = None;

    for octaves in cartesian_octaves(targets.len(), lo, hi) {
        let w: Vec<u8> = targets
            .iter()
            .zip(octaves.iter())
            .map(|(&pc, &oct)| ((pc as i32 + 12 * oct).clamp(0, 127)) as u8)
            .collect();

        if first_candidate.is_none() {
            first_candidate = Some(w.clone());
        }

        if options.avoid_parallels && current.len() == w.len() && has_parallel_motion(current, &w)
        {
            continue;
        }

        let key = (movement_cost(current, &w, options), residual_cost(current, &w));
        if best.as_ref().map_or(true, |(best_key, _)| key < *best_key) {
            best = Some((key, w));
        }
    }

    best.map(|(_, w)| w)
        .or(first_candidate)
        .unwrap_or_else(|| targets.iter().map(|&pc| pc + 12 * 5).collect())
}

/// Sum, over every candidate pitch in `w`, of its distance to the closest pitch in `v`. Unlike
/// `movement_cost` (which looks from `v`'s perspective), this catches a `w` voice that `movement_cost`
/// is indifferent to because no `v` claims it as nearest.
fn residual_cost(v: &[u8], w: &[u8]) -> i64 {
    w.iter()
        .map(|&cand| {
            v.iter()
                .map(|&voice| (cand as i32 - voice as i32).unsigned_abs() as i64)
                .min()
                .unwrap_or(0)
        })
        .sum()
}

/// The movement cost of candidate voicing `w` against prior voicing `v`, per §4.5's formula.
pub(crate) fn movement_cost(v: &[u8], w: &[u8], options: &VoiceLeadingOptions) -> i64 {
    let mut base: i64 = 0;
    for &voice in v {
        let d_v = w
            .iter()
            .map(|&cand| (cand as i32 - voice as i32).unsigned_abs() as i64)
            .min()
            .unwrap_or(0);
        base += d_v;
        if d_v as u32 > options.max_voice_movement {
            base += 10 * (d_v - options.max_voice_movement as i64);
        }
    }
    if options.maintain_voice_count && v.len() != w.len() {
        base += 1000;
    }
    if options.minimize_movement {
        base *= 2;
    }
    base
}

fn has_parallel_motion(v: &[u8], w: &[u8]) -> bool {
    for i in 0..v.len() {
        for j in (i + 1)..v.len() {
            let interval_v = (v[i] as i32 - v[j] as i32).rem_euclid(12);
            if interval_v != 0 && interval_v != 7 {
                continue;
            }
            let interval_w = (w[i] as i32 - w[j] as i32).rem_euclid(12);
            if interval_w != interval_v {
                continue;
            }
            let dir_i = (w[i] as i32 - v[i] as i32).signum();
            let dir_j = (w[j] as i32 - v[j] as i32).signum();
            if dir_i != 0 && dir_i == dir_j {
                return true;
            }
        }
    }
    false
}

fn cartesian_octaves(n: usize, lo: i32, hi: i32) -> Vec<Vec<i32>> {
    if n == 0 || lo > hi {
        return Vec::new();
    }
    let mut result: Vec<Vec<i32>> = vec![Vec::new()];
    for _ in 0..n {
        let mut next = Vec::with_capacity(result.len() * ((hi - lo + 1) as usize));
        for prefix in &result {
            for oct in lo..=hi {
                let mut candidate = prefix.clone();
                candidate.push(oct);
                next.push(candidate);
            }
        }
        result = next;
    }
    result
}

/// Match each voice in `current` to its closest pitch in `target`, for reporting. Any target pitch
/// no voice claimed is reported with `original = 0` (a sentinel marking a new voice).
pub fn analyze_voice_movement(current: &[u8], target: &[u8]) -> Vec<VoiceMovement> {
    let mut claimed = vec![false; target.len()];
    let mut out = Vec::with_capacity(current.len());
    for &voice in current {
        if let Some((idx, &closest)) = target
            .iter()
            .enumerate()
            .min_by_key(|&(_, &w)| (w as i32 - voice as i32).abs())
        {
            claimed[idx] = true;
            out.push(VoiceMovement {
                original: voice,
                new: closest,
                delta: closest as i32 - voice as i32,
                optimal: true,
            });
        }
    }
    for (idx, &w) in target.iter().enumerate() {
        if !claimed[idx] {
            out.push(VoiceMovement {
                original: 0,
                new: w,
                delta: w as i32,
                optimal: false,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_major_to_a_minor_moves_each_voice_at_most_two_semitones() {
        // {60,64,67} -> target pitch classes of Am {9,0,4}
        let result = lead_voices(&[0, 4, 9], &[60, 64, 67], &VoiceLeadingOptions::default());
        assert_eq!(vec![60, 64, 69], result);
    }

    #[test]
    fn no_targets_yields_empty_voicing() {
        assert!(lead_voices(&[], &[60, 64, 67], &VoiceLeadingOptions::default()).is_empty());
    }

    #[test]
    fn empty_current_places_in_octave_five() {
        let result = lead_voices(&[0, 4, 7], &[], &VoiceLeadingOptions::default());
        assert_eq!(vec![60, 64, 67], result);
    }

    #[test]
    fn parallel_fifths_are_rejected_when_requested() {
        let options = VoiceLeadingOptions {
            avoid_parallels: true,
            ..VoiceLeadingOptions::default()
        };
        // moving both voices of a perfect fifth up by the same amount is a parallel fifth.
        let v = [60, 67];
        let w = [62, 69];
        assert!(has_parallel_motion(&v, &w));
        // the search itself should never return such a candidate when avoid_parallels is set.
        let result = lead_voices(&[2, 9], &v, &options);
        assert!(!has_parallel_motion(&v, &result) || result.len() != v.len());
    }

    #[test]
    fn analyze_reports_sentinel_for_unmatched_new_voice() {
        let movements = analyze_voice_movement(&[60], &[60, 67]);
        assert_eq!(2, movements.len());
        assert!(movements.iter().any(|m| m.original == 0 && m.new == 67));
    }
}
