/*!
Chord reconstruction, naming, and voice-leading-aware rewriting.

The pipeline is segment ([`segmenter`]) → name ([`namer`]) → (optionally) transform
([`transform`], backed by [`voice_leader`]).
!*/

mod namer;
mod segmenter;
mod transform;
mod voice_leader;

pub use namer::{name_pitches, parse_name_with_quality, pitch_class_name, target_pitch_classes};
pub use segmenter::{segment, DEFAULT_TICK_TOLERANCE};
pub use transform::{transform as apply_transform, TransformMode, TransformationOptions};
pub use voice_leader::{analyze_voice_movement, lead_voices, VoiceLeadingOptions, VoiceMovement};

use crate::note::{NoteOrigin, NoteSource};

/// A labelled group of simultaneously-sounding pitches.
///
/// `pitches` is always ascending with no duplicates and `pitches.len() >= 3` for any chord
/// produced by [`segment`]. If the chord has been rewritten since it was first detected, `original`
/// holds the pitch list and name it had before the first transform (the "transformation shadow");
/// a second transform updates `pitches`/`name` but leaves `original` untouched.
///
/// Each pitch's provenance in the underlying file is tracked in `origins`, kept the same length as
/// `pitches`: a transform that adds a voice marks its origin [`NoteSource::Synthetic`] (no prior
/// event to rewrite, a new one must be created on emit); a transform that drops a voice moves its
/// origin into `removed_origins` so emit knows to delete that event pair rather than silently
/// leaving it sounding.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Chord {
    pitches: Vec<u8>,
    origins: Vec<NoteSource>,
    onset: u32,
    duration: u32,
    name: String,
    original: Option<(Vec<u8>, String)>,
    removed_origins: Vec<NoteOrigin>,
}

impl Chord {
    pub(crate) fn new(pitches: Vec<u8>, origins: Vec<NoteSource>, onset: u32, duration: u32) -> Self {
        let name = name_pitches(&pitches);
        Chord {
            pitches,
            origins,
            onset,
            duration,
            name,
            original: None,
            removed_origins: Vec::new(),
        }
    }

    /// A chord with no backing file events, every pitch's origin marked [`NoteSource::Synthetic`].
    /// Used in tests that exercise naming/transform logic without a MIDI file to write back to.
    #[cfg(test)]
    pub(crate) fn synthetic(pitches: Vec<u8>, onset: u32, duration: u32) -> Self {
        let origins = vec![NoteSource::Synthetic; pitches.len()];
        Self::new(pitches, origins, onset, duration)
    }

    /// The chord's pitches, ascending, deduplicated.
    pub fn pitches(&self) -> &[u8] {
        &self.pitches
    }

    /// The tick at which the chord begins.
    pub fn onset(&self) -> u32 {
        self.onset
    }

    /// The chord's length in ticks.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// The chord's current name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` if this chord has been rewritten by a transform since it was first detected.
    pub fn is_transformed(&self) -> bool {
        self.original.is_some()
    }

    /// The pitch list this chord had before its first transform, if any.
    pub fn original_pitches(&self) -> Option<&[u8]> {
        self.original.as_ref().map(|(p, _)| p.as_slice())
    }

    /// The name this chord had before its first transform, if any.
    pub fn original_name(&self) -> Option<&str> {
        self.original.as_ref().map(|(_, n)| n.as_str())
    }

    /// Replace this chord's pitches and name, recording the original on the first call.
    ///
    /// Used both by the transform dispatch and by the journal on undo/redo. `origins` is remapped
    /// to the new pitch count by position: a pitch added past the old count gets
    /// [`NoteSource::Synthetic`] (no backing event yet), and any origin a shorter pitch list drops
    /// is moved to `removed_origins` so emit can delete that event pair instead of leaving a
    /// stale note sounding.
    pub(crate) fn update(&mut self, pitches: Vec<u8>, name: String) {
        if self.original.is_none() {
            self.original = Some((self.pitches.clone(), self.name.clone()));
        }
        let new_len = pitches.len();
        if new_len < self.origins.len() {
            for source in self.origins.drain(new_len..) {
                if let NoteSource::Existing(origin) = source {
                    self.removed_origins.push(origin);
                }
            }
        } else if new_len > self.origins.len() {
            self.origins.resize(new_len, NoteSource::Synthetic);
        }
        self.pitches = pitches;
        self.name = name;
    }

    /// This chord's per-pitch origins, parallel to [`Chord::pitches`].
    pub(crate) fn origins(&self) -> &[NoteSource] {
        &self.origins
    }

    /// Origins dropped by a transform that shrank the voice count, and not yet deleted from the
    /// file. Draining this (rather than just reading it) is the caller's responsibility once it
    /// has acted on them, so an origin is never deleted from the file twice.
    pub(crate) fn take_removed_origins(&mut self) -> Vec<NoteOrigin> {
        std::mem::take(&mut self.removed_origins)
    }

    /// Restore this chord to an exact prior state (used by the journal's undo/redo, which
    /// supplies full snapshots rather than incremental deltas).
    pub(crate) fn restore(&mut self, snapshot: ChordSnapshot) {
        self.pitches = snapshot.pitches;
        self.origins = snapshot.origins;
        self.name = snapshot.name;
        self.original = snapshot.original;
        self.removed_origins = snapshot.removed_origins;
    }

    pub(crate) fn snapshot(&self) -> ChordSnapshot {
        ChordSnapshot {
            pitches: self.pitches.clone(),
            origins: self.origins.clone(),
            name: self.name.clone(),
            original: self.original.clone(),
            removed_origins: self.removed_origins.clone(),
        }
    }
}

/// A deep copy of a chord's mutable state, captured by the journal before and after a transform.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChordSnapshot {
    pitches: Vec<u8>,
    origins: Vec<NoteSource>,
    name: String,
    original: Option<(Vec<u8>, String)>,
    removed_origins: Vec<NoteOrigin>,
}
