use crate::chord::Chord;
use crate::note::{Note, NoteSource};

/// Default tick tolerance for grouping near-simultaneous note onsets into one chord anchor.
pub const DEFAULT_TICK_TOLERANCE: u32 = 120;

fn tick_distance(a: u32, b: u32) -> u32 {
    if a > b {
        a - b
    } else {
        b - a
    }
}

struct Anchor {
    tick: u32,
    pitches: Vec<u8>,
    origins: Vec<NoteSource>,
    max_note_end: u32,
}

/// Group `notes` (sorted by onset, as [`crate::note::aggregate`] produces) into [`Chord`]s.
///
/// Notes are swept in order and assigned to the first existing anchor within `tolerance` ticks of
/// their onset, or to a freshly opened anchor if none is close enough. Anchors are then sorted
/// ascending; any anchor with fewer than 3 distinct pitches is dropped. A non-terminal anchor's
/// duration runs up to the next anchor's onset; the last anchor's duration is the longest member
/// note's duration.
pub fn segment(notes: &[Note], tolerance: u32) -> Vec<Chord> {
    let mut anchors: Vec<Anchor> = Vec::new();
    for note in notes {
        let home = anchors
            .iter_mut()
            .find(|a| tick_distance(a.tick, note.onset()) <= tolerance);
        match home {
            Some(anchor) => {
                if !anchor.pitches.contains(&note.pitch()) {
                    anchor.pitches.push(note.pitch());
                    anchor.origins.push(NoteSource::Existing(note.origin()));
                }
                anchor.max_note_end = anchor.max_note_end.max(note.end());
            }
            None => anchors.push(Anchor {
                tick: note.onset(),
                pitches: vec![note.pitch()],
                origins: vec![NoteSource::Existing(note.origin())],
                max_note_end: note.end(),
            }),
        }
    }

    anchors.sort_by_key(|a| a.tick);

    let mut chords = Vec::new();
    let last_index = anchors.len().saturating_sub(1);
    for (i, anchor) in anchors.iter().enumerate() {
        if anchor.pitches.len() < 3 {
            continue;
        }
        let duration = if i == last_index {
            anchor.max_note_end.saturating_sub(anchor.tick)
        } else {
            anchors[i + 1].tick.saturating_sub(anchor.tick)
        };
        let mut paired: Vec<(u8, NoteSource)> = anchor
            .pitches
            .iter()
            .copied()
            .zip(anchor.origins.iter().copied())
            .collect();
        paired.sort_by_key(|(pitch, _)| *pitch);
        let pitches = paired.iter().map(|(pitch, _)| *pitch).collect();
        let origins = paired.iter().map(|(_, origin)| *origin).collect();
        chords.push(Chord::new(pitches, origins, anchor.tick, duration));
    }
    chords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::aggregate;
    use crate::midi::{Event, Format, Header, Message, MidiFile, Track};
    use crate::midi::numbers::{Channel, NoteNumber, Velocity};

    fn note_message(note: u8, velocity: u8) -> crate::midi::NoteMessage {
        crate::midi::NoteMessage {
            channel: Channel::new(0),
            note_number: NoteNumber::new(note),
            velocity: Velocity::new(velocity),
        }
    }

    #[test]
    fn single_chord_from_three_simultaneous_notes() {
        let mut track = Track::new();
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(60, 100))));
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(64, 100))));
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(67, 100))));
        track.push_event(480, Event::Midi(Message::NoteOff(note_message(60, 0))));
        track.push_event(0, Event::Midi(Message::NoteOff(note_message(64, 0))));
        track.push_event(0, Event::Midi(Message::NoteOff(note_message(67, 0))));
        let file = MidiFile::new(Header::new(Format::Single, Default::default()), vec![track]);

        let notes = aggregate(&file);
        let chords = segment(&notes, DEFAULT_TICK_TOLERANCE);
        assert_eq!(1, chords.len());
        assert_eq!("C", chords[0].name());
        assert_eq!(&[60, 64, 67], chords[0].pitches());
        assert_eq!(480, chords[0].duration());
    }

    #[test]
    fn groups_smaller_than_three_are_dropped() {
        let mut track = Track::new();
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(60, 100))));
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(64, 100))));
        track.push_event(480, Event::Midi(Message::NoteOff(note_message(60, 0))));
        track.push_event(0, Event::Midi(Message::NoteOff(note_message(64, 0))));
        let file = MidiFile::new(Header::new(Format::Single, Default::default()), vec![track]);

        let notes = aggregate(&file);
        let chords = segment(&notes, DEFAULT_TICK_TOLERANCE);
        assert!(chords.is_empty());
    }

    #[test]
    fn idempotent_across_runs() {
        let mut track = Track::new();
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(60, 100))));
        track.push_event(10, Event::Midi(Message::NoteOn(note_message(64, 100))));
        track.push_event(10, Event::Midi(Message::NoteOn(note_message(67, 100))));
        track.push_event(460, Event::Midi(Message::NoteOff(note_message(60, 0))));
        track.push_event(0, Event::Midi(Message::NoteOff(note_message(64, 0))));
        track.push_event(0, Event::Midi(Message::NoteOff(note_message(67, 0))));
        let file = MidiFile::new(Header::new(Format::Single, Default::default()), vec![track]);

        let notes = aggregate(&file);
        let first = segment(&notes, DEFAULT_TICK_TOLERANCE);
        let second = segment(&notes, DEFAULT_TICK_TOLERANCE);
        assert_eq!(first, second);
    }
}
