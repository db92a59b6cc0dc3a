use crate::byte_iter::ByteIter;
use crate::midi::message::Message;
use crate::midi::meta_event::MetaEvent;
use crate::midi::status::{FILE_META_EVENT, FILE_SYSEX_F0, FILE_SYSEX_F7};
use crate::midi::sysex::SysexEvent;
use crate::scribe::Scribe;
use crate::vlq::Vlq;
use log::{trace, warn};
use snafu::ResultExt;
use std::io::{Read, Write};

/// `<event> = <MIDI event> | <sysex event> | <meta-event>`
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Event {
    /// `<MIDI event>` is any MIDI channel voice message. Running status is resolved at parse time.
    Midi(Message),
    /// `<sysex event>` is used to specify a MIDI system exclusive message.
    Sysex(SysexEvent),
    /// `<meta-event>` specifies non-MIDI information useful to this format or to sequencers.
    Meta(MetaEvent),
}

impl Default for Event {
    fn default() -> Self {
        Event::Midi(Message::default())
    }
}

impl Event {
    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> crate::error::LibResult<()> {
        match self {
            Event::Midi(md) => md.write(w),
            Event::Sysex(sx) => sx.write(w),
            Event::Meta(mt) => mt.write(w),
        }
    }
}

/// `<MTrk event> = <delta-time> <event>`
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TrackEvent {
    delta_time: u32,
    event: Event,
}

impl TrackEvent {
    /// Create a new track event.
    pub fn new(delta_time: u32, event: Event) -> Self {
        Self { delta_time, event }
    }

    /// The number of ticks since the previous event on this track.
    pub fn delta_time(&self) -> u32 {
        self.delta_time
    }

    /// The event payload.
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Returns true if the track event is a [`MetaEvent::EndOfTrack`].
    pub(crate) fn is_end(&self) -> bool {
        matches!(&self.event, Event::Meta(meta) if matches!(meta, MetaEvent::EndOfTrack))
    }

    /// Parse the next track event, resolving running status against `running_status`. Returns
    /// `Ok(None)` when an unrecognized channel status was encountered and the iterator has
    /// resynchronized to the next byte with its MSB set; the caller should simply continue its
    /// parse loop without emitting an event for this iteration.
    pub(crate) fn parse<R: Read>(
        iter: &mut ByteIter<R>,
        running_status: &mut Option<u8>,
    ) -> crate::error::LibResult<Option<Self>> {
        let delta_time = iter.read_vlq_u32().context(io!())?;
        trace!("delta_time {}", delta_time);
        let status_byte = iter.peek_or_die().context(io!())?;
        let parsed = match status_byte {
            FILE_SYSEX_F0 | FILE_SYSEX_F7 => {
                SysexEvent::parse(iter).map(Event::Sysex)
            }
            FILE_META_EVENT => MetaEvent::parse(iter).map(Event::Meta),
            _ => Message::parse(iter, running_status).map(Event::Midi),
        };
        match parsed {
            Ok(event) => Ok(Some(Self { delta_time, event })),
            Err(crate::error::LibError::UnknownStatus { nibble, .. }) => {
                warn!(
                    "unrecognized status nibble {:#03X}, resynchronizing to next status byte",
                    nibble
                );
                resync(iter)?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> crate::error::LibResult<()> {
        let delta = Vlq::new(self.delta_time).to_bytes();
        w.write_all(&delta).context(wr!())?;
        self.event.write(w)
    }
}

/// Consume bytes until the next one with its MSB set (a plausible status byte), or end of input.
fn resync<R: Read>(iter: &mut ByteIter<R>) -> crate::error::LibResult<()> {
    while let Some(b) = iter.peek() {
        if b & 0x80 != 0 {
            break;
        }
        iter.read().context(io!())?;
    }
    Ok(())
}
