//! Rewrites transformed chords' pitches back into a [`MidiFile`]'s track events — the `emit` step
//! of the load -> segment -> name -> transform -> emit pipeline.

use std::collections::{BTreeSet, HashMap};

use crate::chord::Chord;
use crate::midi::{Channel, Event, MetaEvent, Message, MidiFile, NoteMessage, NoteNumber, Track, Velocity};
use crate::note::NoteSource;

#[derive(Default)]
struct TrackPlan {
    rewrites: HashMap<usize, u8>,
    removals: BTreeSet<usize>,
    insertions: Vec<(u32, Event)>,
}

/// Rewrite every chord's current pitches into a copy of `file`'s tracks.
///
/// A pitch still backed by its original note-on/note-off pair has that pair's pitch byte rewritten
/// in place, keeping the pair's timing, channel, and velocity untouched. A voice a transform added
/// (no prior event to rewrite) gets a freshly synthesized note-on/note-off pair spanning the
/// chord's onset and duration, borrowing the channel and velocity of a sibling voice in the same
/// chord (or channel 0, velocity 80 if the chord has no remaining original voice to borrow from). A
/// voice a transform dropped has its backing event pair deleted so it doesn't keep sounding.
pub(crate) fn emit(file: &MidiFile, chords: &mut [Chord]) -> MidiFile {
    let mut plans: Vec<TrackPlan> = (0..file.tracks_len()).map(|_| TrackPlan::default()).collect();

    for chord in chords.iter_mut() {
        let fallback = fallback_voice(chord);
        let onset = chord.onset();
        let end = chord.onset() + chord.duration();
        let pitches: Vec<u8> = chord.pitches().to_vec();
        let origins: Vec<NoteSource> = chord.origins().to_vec();

        for (pitch, source) in pitches.into_iter().zip(origins) {
            match source {
                NoteSource::Existing(origin) => {
                    if let Some(plan) = plans.get_mut(origin.track_index) {
                        plan.rewrites.insert(origin.note_on_index, pitch);
                        if let Some(note_off_index) = origin.note_off_index {
                            plan.rewrites.insert(note_off_index, pitch);
                        }
                    }
                }
                NoteSource::Synthetic => {
                    let (track_index, channel, velocity) = fallback;
                    if let Some(plan) = plans.get_mut(track_index) {
                        plan.insertions.push((
                            onset,
                            Event::Midi(Message::NoteOn(NoteMessage {
                                channel: Channel::new(channel),
                                note_number: NoteNumber::new(pitch),
                                velocity: Velocity::new(velocity),
                            })),
                        ));
                        plan.insertions.push((
                            end,
                            Event::Midi(Message::NoteOff(NoteMessage {
                                channel: Channel::new(channel),
                                note_number: NoteNumber::new(pitch),
                                velocity: Velocity::new(0),
                            })),
                        ));
                    }
                }
            }
        }

        for origin in chord.take_removed_origins() {
            if let Some(plan) = plans.get_mut(origin.track_index) {
                plan.removals.insert(origin.note_on_index);
                if let Some(note_off_index) = origin.note_off_index {
                    plan.removals.insert(note_off_index);
                }
            }
        }
    }

    let tracks: Vec<Track> = file
        .tracks()
        .zip(plans.iter())
        .map(|(track, plan)| rebuild_track(track, plan))
        .collect();
    MidiFile::new(*file.header(), tracks)
}

/// A `(track_index, channel, velocity)` to use for a synthesized voice, borrowed from the first
/// remaining original voice in this chord, or a reasonable default if it has none.
fn fallback_voice(chord: &Chord) -> (usize, u8, u8) {
    chord
        .origins()
        .iter()
        .find_map(|source| match source {
            NoteSource::Existing(origin) => {
                Some((origin.track_index, origin.channel, origin.velocity))
            }
            NoteSource::Synthetic => None,
        })
        .unwrap_or((0, 0, 80))
}

/// Decode `track` to absolute ticks, apply `plan`'s rewrites/removals/insertions, and re-encode to
/// delta times. The end-of-track meta event (if present) is pulled out and re-appended last, so an
/// inserted event that lands on the same tick can never be sorted after it.
fn rebuild_track(track: &Track, plan: &TrackPlan) -> Track {
    let mut abs = 0u32;
    let mut items: Vec<(u32, Event)> = Vec::new();
    let mut end_of_track: Option<(u32, Event)> = None;

    for (index, track_event) in track.events().enumerate() {
        abs = abs.saturating_add(track_event.delta_time());
        if plan.removals.contains(&index) {
            continue;
        }
        let event = match plan.rewrites.get(&index) {
            Some(&new_pitch) => rewrite_pitch(track_event.event(), new_pitch),
            None => track_event.event().clone(),
        };
        if matches!(&event, Event::Meta(MetaEvent::EndOfTrack)) {
            end_of_track = Some((abs, event));
        } else {
            items.push((abs, event));
        }
    }

    for insertion in &plan.insertions {
        items.push(insertion.clone());
    }
    items.sort_by_key(|(tick, _)| *tick);

    let mut rebuilt = Track::new();
    let mut prev = 0u32;
    for (tick, event) in items {
        rebuilt.push_event(tick.saturating_sub(prev), event);
        prev = tick;
    }
    if let Some((tick, event)) = end_of_track {
        rebuilt.push_event(tick.saturating_sub(prev), event);
    }
    rebuilt
}

fn rewrite_pitch(event: &Event, new_pitch: u8) -> Event {
    match event {
        Event::Midi(Message::NoteOn(m)) => Event::Midi(Message::NoteOn(NoteMessage {
            channel: m.channel(),
            note_number: NoteNumber::new(new_pitch),
            velocity: m.velocity(),
        })),
        Event::Midi(Message::NoteOff(m)) => Event::Midi(Message::NoteOff(NoteMessage {
            channel: m.channel(),
            note_number: NoteNumber::new(new_pitch),
            velocity: m.velocity(),
        })),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::TransformationOptions;
    use crate::midi::{Format, Header};
    use crate::note;

    fn note_message(note: u8, velocity: u8) -> NoteMessage {
        NoteMessage {
            channel: Channel::new(0),
            note_number: NoteNumber::new(note),
            velocity: Velocity::new(velocity),
        }
    }

    fn c_major_file() -> MidiFile {
        let mut track = Track::new();
        for &pitch in &[60u8, 64, 67] {
            track.push_event(0, Event::Midi(Message::NoteOn(note_message(pitch, 100))));
        }
        track.push_event(480, Event::Midi(Message::NoteOff(note_message(60, 0))));
        track.push_event(0, Event::Midi(Message::NoteOff(note_message(64, 0))));
        track.push_event(0, Event::Midi(Message::NoteOff(note_message(67, 0))));
        track.push_event(0, Event::Meta(MetaEvent::EndOfTrack));
        MidiFile::new(Header::new(Format::Single, Default::default()), vec![track])
    }

    fn pitches_in(file: &MidiFile) -> Vec<u8> {
        let notes = note::aggregate(file);
        let mut pitches: Vec<u8> = notes.iter().map(|n| n.pitch()).collect();
        pitches.sort_unstable();
        pitches
    }

    #[test]
    fn same_cardinality_transform_rewrites_existing_events() {
        let file = c_major_file();
        let notes = note::aggregate(&file);
        let mut chords = crate::chord::segment(&notes, crate::chord::DEFAULT_TICK_TOLERANCE);
        assert_eq!(1, chords.len());

        crate::chord::apply_transform(&mut chords[0], Some("Am"), &TransformationOptions::default())
            .unwrap();
        assert_eq!(&[60, 64, 69], chords[0].pitches());

        let rewritten = emit(&file, &mut chords);
        assert_eq!(1, rewritten.tracks_len());
        assert_eq!(vec![60, 64, 69], pitches_in(&rewritten));
    }

    #[test]
    fn added_voice_is_synthesized_and_removed_voice_is_deleted() {
        let file = c_major_file();
        let notes = note::aggregate(&file);
        let mut chords = crate::chord::segment(&notes, crate::chord::DEFAULT_TICK_TOLERANCE);

        // C (3 voices) -> Cmaj7 (4 voices): one voice must be synthesized.
        crate::chord::apply_transform(
            &mut chords[0],
            Some("Cmaj7"),
            &TransformationOptions {
                use_voice_leading: false,
                ..TransformationOptions::default()
            },
        )
        .unwrap();
        assert_eq!(4, chords[0].pitches().len());

        let grown = emit(&file, &mut chords);
        assert_eq!(4, pitches_in(&grown).len());

        // Now collapse back down to a triad: the dropped voice's event pair must disappear.
        let notes = note::aggregate(&grown);
        let mut chords = crate::chord::segment(&notes, crate::chord::DEFAULT_TICK_TOLERANCE);
        crate::chord::apply_transform(
            &mut chords[0],
            Some("Am"),
            &TransformationOptions {
                use_voice_leading: false,
                ..TransformationOptions::default()
            },
        )
        .unwrap();
        assert_eq!(3, chords[0].pitches().len());
        let shrunk = emit(&grown, &mut chords);
        assert_eq!(3, pitches_in(&shrunk).len());
    }

    #[test]
    fn unclosed_note_rewrites_only_its_note_on() {
        let mut track = Track::new();
        for &pitch in &[60u8, 64, 67] {
            track.push_event(0, Event::Midi(Message::NoteOn(note_message(pitch, 100))));
        }
        track.push_event(480, Event::Meta(MetaEvent::EndOfTrack));
        let file = MidiFile::new(Header::new(Format::Single, Default::default()), vec![track]);

        let notes = note::aggregate(&file);
        let mut chords = crate::chord::segment(&notes, crate::chord::DEFAULT_TICK_TOLERANCE);
        crate::chord::apply_transform(&mut chords[0], Some("Am"), &TransformationOptions::default())
            .unwrap();

        let rewritten = emit(&file, &mut chords);
        assert_eq!(vec![60, 64, 69], pitches_in(&rewritten));
    }
}
