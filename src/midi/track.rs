use crate::byte_iter::ByteIter;
use crate::error::{self, LibResult};
use crate::midi::event::{Event, TrackEvent};
use crate::midi::meta_event::MetaEvent;
use crate::scribe::{Scribe, ScribeSettings};
use log::{debug, trace};
use snafu::ResultExt;
use std::convert::TryFrom;
use std::io::{Read, Write};

/// `<Track Chunk> = <chunk type> <length> <MTrk event>+`
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Track {
    events: Vec<TrackEvent>,
}

impl Track {
    /// Create an empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the track has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The number of events in the track.
    pub fn events_len(&self) -> usize {
        self.events.len()
    }

    /// Iterator over the events in the track, in file order.
    pub fn events(&self) -> impl Iterator<Item = &TrackEvent> {
        self.events.iter()
    }

    /// Add an event to the end.
    pub fn push_event(&mut self, delta_time: u32, event: Event) {
        self.events.push(TrackEvent::new(delta_time, event));
    }

    /// Add event at `index`, shifting everything after it.
    pub fn insert_event(&mut self, index: usize, delta_time: u32, event: Event) -> crate::Result<()> {
        if index > self.events.len() {
            return Err(error::OutOfRange {
                site: site!(),
                index,
                len: self.events.len(),
            }
            .build()
            .into());
        }
        self.events
            .insert(index, TrackEvent::new(delta_time, event));
        Ok(())
    }

    /// Replace the event at `index`.
    pub fn replace_event(&mut self, index: usize, delta_time: u32, event: Event) -> crate::Result<()> {
        if index >= self.events.len() {
            return Err(error::OutOfRange {
                site: site!(),
                index,
                len: self.events.len(),
            }
            .build()
            .into());
        }
        self.events[index] = TrackEvent::new(delta_time, event);
        Ok(())
    }

    /// Remove the event at `index`.
    pub fn remove_event(&mut self, index: usize) -> crate::Result<TrackEvent> {
        if index >= self.events.len() {
            return Err(error::OutOfRange {
                site: site!(),
                index,
                len: self.events.len(),
            }
            .build()
            .into());
        }
        Ok(self.events.remove(index))
    }

    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        iter.expect_tag("MTrk").context(io!())?;
        let chunk_length = iter.read_u32().context(io!())?;
        iter.set_size_limit(chunk_length as u64);
        let mut events = Vec::new();
        let mut running_status: Option<u8> = None;
        loop {
            if iter.is_end() {
                return error::TruncatedTrack {
                    site: site!(),
                    description: "end of track bytes reached before EndOfTrack event",
                }
                .fail();
            }
            let parsed = TrackEvent::parse(iter, &mut running_status)?;
            let event = match parsed {
                Some(event) => event,
                None => continue,
            };
            trace!("parsed {:?}", event);
            let is_track_end = event.is_end();
            events.push(event);
            if is_track_end {
                debug!("end of track event");
                if !iter.is_end() {
                    return error::TruncatedTrack {
                        site: site!(),
                        description: "EndOfTrack event before end of track bytes",
                    }
                    .fail();
                }
                break;
            }
        }
        iter.clear_size_limit();
        Ok(Self { events })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        w.write_all(b"MTrk").context(wr!())?;

        // the track length isn't known until the events are serialized, so buffer them first
        let mut track_data: Vec<u8> = Vec::new();
        let mut track_scribe = Scribe::new(
            &mut track_data,
            ScribeSettings {
                running_status: w.use_running_status(),
            },
        );
        for event in self.events() {
            event.write(&mut track_scribe)?;
        }

        let track_length =
            u32::try_from(track_data.len()).map_err(|_| error::TrackTooLong { site: site!() }.build())?;
        w.write_all(&track_length.to_be_bytes()).context(wr!())?;
        w.write_all(&track_data).context(wr!())?;
        Ok(())
    }
}

/// Appends an [`MetaEvent::EndOfTrack`] if the track's last event isn't already one.
pub(crate) fn ensure_end_of_track(mut track: Track) -> Track {
    let needs_end = match track.events.last() {
        Some(last) => !matches!(last.event(), Event::Meta(MetaEvent::EndOfTrack)),
        None => true,
    };
    if needs_end {
        track.push_event(0, Event::Meta(MetaEvent::EndOfTrack));
    }
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::message::{Message, NoteMessage};
    use crate::midi::numbers::{NoteNumber, Velocity};
    use std::io::Cursor;

    fn note_on_event(delta: u32, note: u8) -> TrackEvent {
        TrackEvent::new(
            delta,
            Event::Midi(Message::NoteOn(NoteMessage {
                channel: Default::default(),
                note_number: NoteNumber::new(note),
                velocity: Velocity::new(100),
            })),
        )
    }

    #[test]
    fn track_round_trip() {
        let mut track = Track::new();
        track.push_event(0, note_on_event(0, 60).event().clone());
        track.push_event(10, note_on_event(10, 64).event().clone());
        let track = ensure_end_of_track(track);

        let mut buf: Vec<u8> = Vec::new();
        {
            let mut scribe = Scribe::new(&mut buf, ScribeSettings::default());
            track.write(&mut scribe).unwrap();
        }
        let cursor = Cursor::new(buf);
        let mut iter = ByteIter::new(std::io::Read::bytes(cursor)).unwrap();
        let parsed = Track::parse(&mut iter).unwrap();
        assert_eq!(track, parsed);
    }

    #[test]
    fn ensure_end_of_track_is_idempotent() {
        let mut track = Track::new();
        track.push_event(0, Event::Meta(MetaEvent::EndOfTrack));
        let track = ensure_end_of_track(track);
        assert_eq!(1, track.events_len());
    }
}
