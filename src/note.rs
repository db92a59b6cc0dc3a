use crate::midi::{Event, Message, MidiFile};
use std::collections::HashMap;

/// The track and track-event positions a [`Note`] was read from, so a later rewrite of its pitch
/// can be written back to the exact bytes it came from instead of the whole file.
///
/// `note_off_index` is `None` when the note was force-closed at track end (no note-off event
/// exists to rewrite); in that case only the note-on side can be updated on emit.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub(crate) struct NoteOrigin {
    pub(crate) track_index: usize,
    pub(crate) note_on_index: usize,
    pub(crate) note_off_index: Option<usize>,
    pub(crate) channel: u8,
    pub(crate) velocity: u8,
}

/// Where a chord's current pitch at a given position should be written back to on emit: the track
/// event pair it was originally read from, or a request to synthesize a new note-on/note-off pair
/// because this voice has no prior counterpart in the file (a transform added a voice).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) enum NoteSource {
    Existing(NoteOrigin),
    Synthetic,
}

/// A sounding note reconstructed from a note-on/note-off pairing: a pitch, an onset tick, a
/// duration in ticks, a velocity, and the channel it sounded on.
///
/// Produced by [`aggregate`]; immutable after creation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Note {
    pitch: u8,
    onset: u32,
    duration: u32,
    velocity: u8,
    channel: u8,
    origin: NoteOrigin,
}

impl Note {
    /// The MIDI note number, 0..127.
    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    /// The tick at which the note begins.
    pub fn onset(&self) -> u32 {
        self.onset
    }

    /// The note's length in ticks.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// The note-on velocity, 0..127.
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// The channel the note sounded on, 0..15.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// The tick at which the note ends (`onset + duration`).
    pub fn end(&self) -> u32 {
        self.onset + self.duration
    }

    /// The track event pair this note was read from.
    pub(crate) fn origin(&self) -> NoteOrigin {
        self.origin
    }
}

/// Reconstruct [`Note`]s from the raw note-on/note-off events of every track in `file`.
///
/// Each track is walked independently with its own running absolute-tick counter. A note-on with
/// nonzero velocity opens a pending slot keyed by note number; a note-off, or a note-on with
/// velocity 0 (already normalized to [`Message::NoteOff`] by the codec), closes it and emits a
/// `Note`. Any slot still open when the track runs out of events is force-closed at the track's
/// final tick. The result is sorted by onset, ties broken by pitch.
pub fn aggregate(file: &MidiFile) -> Vec<Note> {
    let mut notes = Vec::new();
    for (track_index, track) in file.tracks().enumerate() {
        aggregate_track(track_index, track, &mut notes);
    }
    notes.sort_by(|a, b| a.onset.cmp(&b.onset).then(a.pitch.cmp(&b.pitch)));
    notes
}

struct Pending {
    start_tick: u32,
    velocity: u8,
    channel: u8,
    note_on_index: usize,
}

fn aggregate_track(track_index: usize, track: &crate::midi::Track, notes: &mut Vec<Note>) {
    let mut tick: u32 = 0;
    let mut pending: HashMap<u8, Pending> = HashMap::new();
    for (event_index, track_event) in track.events().enumerate() {
        tick = tick.saturating_add(track_event.delta_time());
        match track_event.event() {
            Event::Midi(Message::NoteOn(m)) => {
                pending.insert(
                    m.note_number().get(),
                    Pending {
                        start_tick: tick,
                        velocity: m.velocity().get(),
                        channel: m.channel().get(),
                        note_on_index: event_index,
                    },
                );
            }
            Event::Midi(Message::NoteOff(m)) => {
                if let Some(p) = pending.remove(&m.note_number().get()) {
                    notes.push(close(
                        track_index,
                        m.note_number().get(),
                        tick,
                        Some(event_index),
                        p,
                    ));
                }
            }
            _ => {}
        }
    }
    // Force-close anything left open at the end of the track. There is no note-off event to
    // point at, so its origin carries `note_off_index: None`.
    let mut remaining: Vec<(u8, Pending)> = pending.into_iter().collect();
    remaining.sort_by_key(|(pitch, _)| *pitch);
    for (pitch, p) in remaining {
        notes.push(close(track_index, pitch, tick, None, p));
    }
}

fn close(track_index: usize, pitch: u8, now: u32, note_off_index: Option<usize>, p: Pending) -> Note {
    Note {
        pitch,
        onset: p.start_tick,
        duration: now.saturating_sub(p.start_tick),
        velocity: p.velocity,
        channel: p.channel,
        origin: NoteOrigin {
            track_index,
            note_on_index: p.note_on_index,
            note_off_index,
            channel: p.channel,
            velocity: p.velocity,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::numbers::{Channel, NoteNumber, Velocity};
    use crate::midi::{Format, Header, NoteMessage, Track};

    fn note_message(note: u8, velocity: u8) -> NoteMessage {
        NoteMessage {
            channel: Channel::new(0),
            note_number: NoteNumber::new(note),
            velocity: Velocity::new(velocity),
        }
    }

    #[test]
    fn aggregates_simultaneous_notes() {
        let mut track = Track::new();
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(60, 100))));
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(64, 100))));
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(67, 100))));
        track.push_event(480, Event::Midi(Message::NoteOff(note_message(60, 0))));
        track.push_event(0, Event::Midi(Message::NoteOff(note_message(64, 0))));
        track.push_event(0, Event::Midi(Message::NoteOff(note_message(67, 0))));

        let file = MidiFile::new(
            Header::new(Format::Single, Default::default()),
            vec![track],
        );
        let notes = aggregate(&file);
        assert_eq!(3, notes.len());
        assert_eq!(vec![60, 64, 67], notes.iter().map(Note::pitch).collect::<Vec<_>>());
        assert!(notes.iter().all(|n| n.onset() == 0 && n.duration() == 480));
    }

    #[test]
    fn note_on_zero_velocity_closes_note() {
        let mut track = Track::new();
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(60, 100))));
        // Codec normalizes a velocity-0 NoteOn into Message::NoteOff, so construct it directly.
        track.push_event(100, Event::Midi(Message::NoteOff(note_message(60, 0))));
        let file = MidiFile::new(
            Header::new(Format::Single, Default::default()),
            vec![track],
        );
        let notes = aggregate(&file);
        assert_eq!(1, notes.len());
        assert_eq!(100, notes[0].duration());
    }

    #[test]
    fn unclosed_note_force_closed_at_track_end() {
        let mut track = Track::new();
        track.push_event(0, Event::Midi(Message::NoteOn(note_message(60, 100))));
        track.push_event(240, Event::Meta(crate::midi::MetaEvent::EndOfTrack));
        let file = MidiFile::new(
            Header::new(Format::Single, Default::default()),
            vec![track],
        );
        let notes = aggregate(&file);
        assert_eq!(1, notes.len());
        assert_eq!(240, notes[0].duration());
    }
}
