//! The host-facing aggregate tying file I/O, chord detection, transformation, and the undo
//! journal together behind a single handle.

use std::path::Path;

use crate::cache::DetectionCache;
use crate::chord::{self, Chord, TransformationOptions};
use crate::error;
use crate::journal::{Action, Journal};
use crate::midi::MidiFile;
use crate::note;

/// An open MIDI file together with its detected chords and edit history.
///
/// `Document` holds no interior mutability and is not `Send`/`Sync`-asserted; it is meant to be
/// owned and driven by a single caller, matching the rest of this crate's single-threaded model.
pub struct Document {
    file: Option<MidiFile>,
    chords: Vec<Chord>,
    journal: Journal,
    tick_tolerance: u32,
    cache: DetectionCache,
}

impl Document {
    /// A new, empty document with no file loaded.
    pub fn new() -> Self {
        Document {
            file: None,
            chords: Vec::new(),
            journal: Journal::new(),
            tick_tolerance: chord::DEFAULT_TICK_TOLERANCE,
            cache: DetectionCache::new(),
        }
    }

    /// Load a Standard MIDI File from `path`, aggregate its notes, and segment/name its chords.
    ///
    /// If the raw bytes match a previously loaded file (by content fingerprint), the cached chord
    /// list is reused instead of re-segmenting.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| {
            error::Error::from(error::LibError::IoUnavailable {
                site: site!(),
                path: path.to_path_buf(),
                source,
            })
        })?;

        let file = MidiFile::read(bytes.as_slice())?;

        let chords = match self.cache.get(&bytes) {
            Some(chords) => chords,
            None => {
                let notes = note::aggregate(&file);
                let chords = chord::segment(&notes, self.tick_tolerance);
                self.cache.put(&bytes, chords.clone());
                chords
            }
        };

        self.file = Some(file);
        self.chords = chords;
        self.journal.clear();
        Ok(())
    }

    /// Write the current file back to `path`, with every chord's current pitches re-embedded into
    /// its originating track events (the `emit` step of load -> segment -> name -> transform ->
    /// emit). A chord never touched by [`Document::transform`] is written back byte-identical.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> crate::Result<()> {
        self.require_file()?;
        let emitted = crate::emit::emit(self.file.as_ref().expect("checked above"), &mut self.chords);
        emitted.save(path)
    }

    /// The currently detected chords, in onset order.
    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    /// The tick tolerance used when segmenting notes into chords.
    pub fn time_tolerance(&self) -> u32 {
        self.tick_tolerance
    }

    /// Change the tick tolerance used for future loads. Does not re-segment the current file.
    pub fn set_time_tolerance(&mut self, ticks: u32) {
        self.tick_tolerance = ticks;
    }

    fn require_file(&self) -> crate::Result<&MidiFile> {
        self.file.as_ref().ok_or_else(|| {
            error::EmptyInput {
                site: site!(),
                description: "no file is loaded".to_string(),
            }
            .build()
            .into()
        })
    }

    fn require_chord_index(&self, index: usize) -> crate::Result<()> {
        if index >= self.chords.len() {
            return Err(error::OutOfRange {
                site: site!(),
                index,
                len: self.chords.len(),
            }
            .build()
            .into());
        }
        Ok(())
    }

    /// Rewrite each chord at `indices[i]` toward `target_names[i]` (or `None` if `target_names` is
    /// shorter than `indices`) per `options`, each recorded as its own undo-journal entry.
    ///
    /// A failure on one index (an out-of-range index or an unrecognized target name) does not
    /// abort the batch: the offending index is skipped, its error is reported in the returned
    /// vector at the same position, and every other index is still attempted.
    pub fn transform(
        &mut self,
        indices: &[usize],
        target_names: &[Option<&str>],
        options: &TransformationOptions,
        timestamp: std::time::SystemTime,
    ) -> Vec<crate::Result<()>> {
        indices
            .iter()
            .enumerate()
            .map(|(i, &index)| {
                let target_name = target_names.get(i).copied().flatten();
                self.transform_one(index, target_name, options, timestamp)
            })
            .collect()
    }

    /// Rewrite the chord at `index` toward `target_name` per `options`, recording the edit in the
    /// undo journal. `timestamp` is supplied by the caller; this module never samples the clock.
    fn transform_one(
        &mut self,
        index: usize,
        target_name: Option<&str>,
        options: &TransformationOptions,
        timestamp: std::time::SystemTime,
    ) -> crate::Result<()> {
        self.require_chord_index(index)?;
        let before = self.chords[index].snapshot();
        chord::apply_transform(&mut self.chords[index], target_name, options)?;
        let after = self.chords[index].snapshot();
        let description = match target_name {
            Some(name) => format!("transform chord {} to {}", index, name),
            None => format!("transform chord {}", index),
        };
        self.journal.record(Action::new(
            vec![index],
            vec![before],
            vec![after],
            description,
            timestamp,
        ));
        Ok(())
    }

    /// Flip the chord at `index` between its major and minor counterpart.
    pub fn switch_tonality(&mut self, index: usize, timestamp: std::time::SystemTime) -> crate::Result<()> {
        let options = TransformationOptions {
            mode: chord::TransformMode::SwitchTonality,
            ..TransformationOptions::default()
        };
        self.transform_one(index, None, &options, timestamp)
    }

    /// Detect the most likely key for the current chord sequence, if any is confident.
    pub fn detect_key(&self) -> Option<crate::key::KeySignature> {
        crate::key::detect_key(&self.chords)
    }

    /// Find known chord-progression patterns in the current chord sequence.
    pub fn analyze_progression(&self) -> Vec<crate::progression::ProgressionMatch> {
        crate::progression::analyze(&self.chords)
    }

    /// Undo the most recent transform, if any.
    pub fn undo(&mut self) -> bool {
        self.journal.undo(&mut self.chords)
    }

    /// Redo the most recently undone transform, if any.
    pub fn redo(&mut self) -> bool {
        self.journal.redo(&mut self.chords)
    }

    /// `true` if [`Document::undo`] would do anything.
    pub fn can_undo(&self) -> bool {
        self.journal.can_undo()
    }

    /// `true` if [`Document::redo`] would do anything.
    pub fn can_redo(&self) -> bool {
        self.journal.can_redo()
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::numbers::{Channel, NoteNumber, Velocity};
    use crate::midi::{Event, Format, Header, Message, NoteMessage, Track};
    use std::time::SystemTime;

    fn note_message(note: u8, velocity: u8) -> NoteMessage {
        NoteMessage {
            channel: Channel::new(0),
            note_number: NoteNumber::new(note),
            velocity: Velocity::new(velocity),
        }
    }

    fn sample_file() -> MidiFile {
        let mut track = Track::new();
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(60, 100))));
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(64, 100))));
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(67, 100))));
        track.push_event(480, Event::Midi(Message::NoteOff(note_message(60, 0))));
        track.push_event(0, Event::Midi(Message::NoteOff(note_message(64, 0))));
        track.push_event(0, Event::Midi(Message::NoteOff(note_message(67, 0))));
        MidiFile::new(Header::new(Format::Single, Default::default()), vec![track])
    }

    #[test]
    fn load_from_bytes_then_transform_and_undo() {
        let mut document = Document::new();
        let file = sample_file();
        let mut bytes = Vec::new();
        file.write(&mut bytes).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.mid");
        std::fs::write(&path, &bytes).unwrap();

        document.load(&path).unwrap();
        assert_eq!(1, document.chords().len());
        assert_eq!("C", document.chords()[0].name());

        let results = document.transform(
            &[0],
            &[Some("Am")],
            &TransformationOptions::default(),
            SystemTime::UNIX_EPOCH,
        );
        assert_eq!(1, results.len());
        assert!(results[0].is_ok());
        assert_eq!("Am", document.chords()[0].name());
        assert!(document.can_undo());

        document.undo();
        assert_eq!("C", document.chords()[0].name());
        assert!(document.can_redo());
    }

    #[test]
    fn transform_out_of_range_index_is_an_error() {
        let mut document = Document::new();
        let file = sample_file();
        let mut bytes = Vec::new();
        file.write(&mut bytes).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.mid");
        std::fs::write(&path, &bytes).unwrap();
        document.load(&path).unwrap();

        let results = document.transform(
            &[5],
            &[Some("Am")],
            &TransformationOptions::default(),
            SystemTime::UNIX_EPOCH,
        );
        assert!(results[0].is_err());
    }

    #[test]
    fn batch_transform_skips_offending_index_and_continues() {
        let mut document = Document::new();
        let file = sample_file();
        let mut bytes = Vec::new();
        file.write(&mut bytes).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.mid");
        std::fs::write(&path, &bytes).unwrap();
        document.load(&path).unwrap();

        // Index 5 is out of range and should be reported without preventing index 0 from
        // transforming.
        let results = document.transform(
            &[5, 0],
            &[Some("Am"), Some("Am")],
            &TransformationOptions::default(),
            SystemTime::UNIX_EPOCH,
        );
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
        assert_eq!("Am", document.chords()[0].name());
    }

    #[test]
    fn operations_on_unloaded_document_fail_cleanly() {
        let mut document = Document::new();
        assert!(document.save("/tmp/does-not-matter.mid").is_err());
    }
}
