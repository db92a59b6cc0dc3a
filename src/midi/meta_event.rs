use crate::byte_iter::ByteIter;
use crate::error::{self, LibResult};
use crate::midi::clocks::Clocks;
use crate::midi::duration_name::DurationName;
use crate::midi::numbers::{Channel, PortValue};
use crate::scribe::Scribe;
use crate::text::Text;
use crate::vlq::Vlq;
use snafu::ResultExt;
use std::io::{Read, Write};

const META_SEQUENCE_NUMBER: u8 = 0x00;
const META_TEXT: u8 = 0x01;
const META_COPYRIGHT: u8 = 0x02;
const META_TRACK_NAME: u8 = 0x03;
const META_INSTRUMENT_NAME: u8 = 0x04;
const META_LYRIC: u8 = 0x05;
const META_MARKER: u8 = 0x06;
const META_CUE_POINT: u8 = 0x07;
const META_PROGRAM_NAME: u8 = 0x08;
const META_DEVICE_NAME: u8 = 0x09;
const META_MIDI_CHANNEL_PREFIX: u8 = 0x20;
const META_PORT: u8 = 0x21;
const META_END_OF_TRACK: u8 = 0x2f;
const META_SET_TEMPO: u8 = 0x51;
const META_SMPTE_OFFSET: u8 = 0x54;
const META_TIME_SIGNATURE: u8 = 0x58;
const META_KEY_SIGNATURE: u8 = 0x59;
const META_SEQUENCER_SPECIFIC: u8 = 0x7f;

const LEN_META_MIDI_CHANNEL_PREFIX: u32 = 1;
const LEN_META_PORT: u32 = 1;
const LEN_META_END_OF_TRACK: u32 = 0;
const LEN_META_SET_TEMPO: u32 = 3;
const LEN_META_SMPTE_OFFSET: u32 = 5;
const LEN_META_TIME_SIGNATURE: u32 = 4;
const LEN_META_KEY_SIGNATURE: u32 = 2;

/// `<meta-event> = FF <type> <length> <bytes>`. Non-MIDI information meaningful to this format or
/// to host sequencers; types not recognized here are preserved verbatim as [`MetaEvent::Other`].
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum MetaEvent {
    /// `FF 00 02 ss ss`: the pattern number of this track, for a type 0 or type 1 multi-pattern
    /// file. `None` when the length byte is present but zero (the "no sequence number" form).
    SequenceNumber(Option<u16>),
    /// `FF 01 len text`: any amount of text for any purpose.
    OtherText(Text),
    /// `FF 02 len text`: a copyright notice.
    Copyright(Text),
    /// `FF 03 len text`: the name of the track, or (in the first track of a type 0/1 file) the
    /// name of the sequence.
    TrackName(Text),
    /// `FF 04 len text`: the name of the instrument used in this track.
    InstrumentName(Text),
    /// `FF 05 len text`: a lyric intended to be sung at this point in the track.
    Lyric(Text),
    /// `FF 06 len text`: a marker, e.g. "Verse 2".
    Marker(Text),
    /// `FF 07 len text`: a cue point, e.g. "Door slams".
    CuePoint(Text),
    /// `FF 08 len text`: the name of the program (patch) used in this track.
    ProgramName(Text),
    /// `FF 09 len text`: the name of the MIDI device this track expects to play through.
    DeviceName(Text),
    /// `FF 20 01 cc`: the MIDI channel associated with meta-events that follow, until overridden.
    MidiChannelPrefix(Channel),
    /// `FF 21 01 pp`: the MIDI port associated with events in this track, until overridden.
    Port(PortValue),
    /// `FF 2F 00`: marks the end of this track chunk.
    EndOfTrack,
    /// `FF 51 03 tt tt tt`: the number of microseconds per quarter note.
    SetTempo(MicrosecondsPerQuarter),
    /// `FF 54 05 hr mn se fr ff`: the SMPTE time at which this track is to start.
    SmpteOffset(SmpteOffsetValue),
    /// `FF 58 04 nn dd cc bb`: a time signature change.
    TimeSignature(TimeSignatureValue),
    /// `FF 59 02 sf mi`: a key signature change.
    KeySignature(KeySignatureValue),
    /// `FF 7F len data`: sequencer-specific data, preserved verbatim.
    Sequencer(Vec<u8>),
    /// Any meta-event type byte not recognized above, preserved verbatim along with its payload.
    Other(u8, Vec<u8>),
}

impl Default for MetaEvent {
    fn default() -> Self {
        MetaEvent::EndOfTrack
    }
}

impl MetaEvent {
    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        iter.read_or_die().context(io!())?; // consume the FF tag
        let meta_type = iter.read_or_die().context(io!())?;
        match meta_type {
            META_SEQUENCE_NUMBER => {
                let len = iter.read_vlq_u32().context(io!())?;
                if len == 0 {
                    Ok(MetaEvent::SequenceNumber(None))
                } else {
                    let hi = iter.read_or_die().context(io!())? as u16;
                    let lo = iter.read_or_die().context(io!())? as u16;
                    Ok(MetaEvent::SequenceNumber(Some((hi << 8) | lo)))
                }
            }
            META_TEXT => Ok(MetaEvent::OtherText(parse_text(iter)?)),
            META_COPYRIGHT => Ok(MetaEvent::Copyright(parse_text(iter)?)),
            META_TRACK_NAME => Ok(MetaEvent::TrackName(parse_text(iter)?)),
            META_INSTRUMENT_NAME => Ok(MetaEvent::InstrumentName(parse_text(iter)?)),
            META_LYRIC => Ok(MetaEvent::Lyric(parse_text(iter)?)),
            META_MARKER => Ok(MetaEvent::Marker(parse_text(iter)?)),
            META_CUE_POINT => Ok(MetaEvent::CuePoint(parse_text(iter)?)),
            META_PROGRAM_NAME => Ok(MetaEvent::ProgramName(parse_text(iter)?)),
            META_DEVICE_NAME => Ok(MetaEvent::DeviceName(parse_text(iter)?)),
            META_MIDI_CHANNEL_PREFIX => {
                expect_len(iter, LEN_META_MIDI_CHANNEL_PREFIX)?;
                let channel = iter.read_or_die().context(io!())?.into();
                Ok(MetaEvent::MidiChannelPrefix(channel))
            }
            META_PORT => {
                expect_len(iter, LEN_META_PORT)?;
                let port = iter.read_or_die().context(io!())?.into();
                Ok(MetaEvent::Port(port))
            }
            META_END_OF_TRACK => {
                expect_len(iter, LEN_META_END_OF_TRACK)?;
                Ok(MetaEvent::EndOfTrack)
            }
            META_SET_TEMPO => {
                expect_len(iter, LEN_META_SET_TEMPO)?;
                let b0 = iter.read_or_die().context(io!())? as u32;
                let b1 = iter.read_or_die().context(io!())? as u32;
                let b2 = iter.read_or_die().context(io!())? as u32;
                let raw = (b0 << 16) | (b1 << 8) | b2;
                Ok(MetaEvent::SetTempo(MicrosecondsPerQuarter::new(raw)))
            }
            META_SMPTE_OFFSET => {
                expect_len(iter, LEN_META_SMPTE_OFFSET)?;
                Ok(MetaEvent::SmpteOffset(SmpteOffsetValue {
                    hr: iter.read_or_die().context(io!())?,
                    mn: iter.read_or_die().context(io!())?,
                    se: iter.read_or_die().context(io!())?,
                    fr: iter.read_or_die().context(io!())?,
                    ff: iter.read_or_die().context(io!())?,
                }))
            }
            META_TIME_SIGNATURE => {
                expect_len(iter, LEN_META_TIME_SIGNATURE)?;
                let numerator = iter.read_or_die().context(io!())?;
                let denominator = DurationName::from_u8(iter.read_or_die().context(io!())?)?;
                let click = Clocks::from_u8(iter.read_or_die().context(io!())?);
                let tpq = iter.read_or_die().context(io!())?;
                Ok(MetaEvent::TimeSignature(TimeSignatureValue {
                    numerator,
                    denominator,
                    click,
                    tpq,
                }))
            }
            META_KEY_SIGNATURE => {
                expect_len(iter, LEN_META_KEY_SIGNATURE)?;
                let accidentals = KeyAccidentals::new(iter.read_or_die().context(io!())? as i8);
                let mode = KeyMode::from_u8(iter.read_or_die().context(io!())?)?;
                Ok(MetaEvent::KeySignature(KeySignatureValue {
                    accidentals,
                    mode,
                }))
            }
            META_SEQUENCER_SPECIFIC => {
                let len = iter.read_vlq_u32().context(io!())?;
                let data = iter.read_n(len as usize).context(io!())?;
                Ok(MetaEvent::Sequencer(data))
            }
            other => {
                let len = iter.read_vlq_u32().context(io!())?;
                let data = iter.read_n(len as usize).context(io!())?;
                Ok(MetaEvent::Other(other, data))
            }
        }
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        write_u8!(w, 0xff)?;
        match self {
            MetaEvent::SequenceNumber(None) => {
                write_u8!(w, META_SEQUENCE_NUMBER)?;
                write_u8!(w, 0)?;
            }
            MetaEvent::SequenceNumber(Some(sn)) => {
                write_u8!(w, META_SEQUENCE_NUMBER)?;
                write_u8!(w, 2)?;
                write_u8!(w, (sn >> 8) as u8)?;
                write_u8!(w, (sn & 0xff) as u8)?;
            }
            MetaEvent::OtherText(t) => write_text(w, META_TEXT, t)?,
            MetaEvent::Copyright(t) => write_text(w, META_COPYRIGHT, t)?,
            MetaEvent::TrackName(t) => write_text(w, META_TRACK_NAME, t)?,
            MetaEvent::InstrumentName(t) => write_text(w, META_INSTRUMENT_NAME, t)?,
            MetaEvent::Lyric(t) => write_text(w, META_LYRIC, t)?,
            MetaEvent::Marker(t) => write_text(w, META_MARKER, t)?,
            MetaEvent::CuePoint(t) => write_text(w, META_CUE_POINT, t)?,
            MetaEvent::ProgramName(t) => write_text(w, META_PROGRAM_NAME, t)?,
            MetaEvent::DeviceName(t) => write_text(w, META_DEVICE_NAME, t)?,
            MetaEvent::MidiChannelPrefix(channel) => {
                write_u8!(w, META_MIDI_CHANNEL_PREFIX)?;
                write_u8!(w, LEN_META_MIDI_CHANNEL_PREFIX as u8)?;
                write_u8!(w, channel.get())?;
            }
            MetaEvent::Port(port) => {
                write_u8!(w, META_PORT)?;
                write_u8!(w, LEN_META_PORT as u8)?;
                write_u8!(w, port.get())?;
            }
            MetaEvent::EndOfTrack => {
                write_u8!(w, META_END_OF_TRACK)?;
                write_u8!(w, LEN_META_END_OF_TRACK as u8)?;
            }
            MetaEvent::SetTempo(mspq) => {
                write_u8!(w, META_SET_TEMPO)?;
                write_u8!(w, LEN_META_SET_TEMPO as u8)?;
                let raw = mspq.get();
                write_u8!(w, ((raw >> 16) & 0xff) as u8)?;
                write_u8!(w, ((raw >> 8) & 0xff) as u8)?;
                write_u8!(w, (raw & 0xff) as u8)?;
            }
            MetaEvent::SmpteOffset(v) => {
                write_u8!(w, META_SMPTE_OFFSET)?;
                write_u8!(w, LEN_META_SMPTE_OFFSET as u8)?;
                write_u8!(w, v.hr)?;
                write_u8!(w, v.mn)?;
                write_u8!(w, v.se)?;
                write_u8!(w, v.fr)?;
                write_u8!(w, v.ff)?;
            }
            MetaEvent::TimeSignature(v) => {
                write_u8!(w, META_TIME_SIGNATURE)?;
                write_u8!(w, LEN_META_TIME_SIGNATURE as u8)?;
                write_u8!(w, v.numerator)?;
                write_u8!(w, v.denominator as u8)?;
                write_u8!(w, v.click.to_u8())?;
                write_u8!(w, v.tpq)?;
            }
            MetaEvent::KeySignature(v) => {
                write_u8!(w, META_KEY_SIGNATURE)?;
                write_u8!(w, LEN_META_KEY_SIGNATURE as u8)?;
                write_u8!(w, v.accidentals.get() as u8)?;
                write_u8!(w, v.mode as u8)?;
            }
            MetaEvent::Sequencer(data) => {
                write_u8!(w, META_SEQUENCER_SPECIFIC)?;
                let len = Vlq::new(data.len() as u32).to_bytes();
                w.write_all(&len).context(wr!())?;
                w.write_all(data).context(wr!())?;
            }
            MetaEvent::Other(kind, data) => {
                write_u8!(w, *kind)?;
                let len = Vlq::new(data.len() as u32).to_bytes();
                w.write_all(&len).context(wr!())?;
                w.write_all(data).context(wr!())?;
            }
        }
        Ok(())
    }
}

fn expect_len<R: Read>(iter: &mut ByteIter<R>, expected: u32) -> LibResult<()> {
    let len = iter.read_vlq_u32().context(io!())?;
    if len != expected {
        return error::MalformedHeader {
            site: site!(),
            description: format!("expected meta-event length {}, got {}", expected, len),
        }
        .fail();
    }
    Ok(())
}

fn parse_text<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Text> {
    let len = iter.read_vlq_u32().context(io!())?;
    let bytes = iter.read_n(len as usize).context(io!())?;
    Ok(Text::from(bytes))
}

fn write_text<W: Write>(w: &mut Scribe<W>, meta_type: u8, text: &Text) -> LibResult<()> {
    write_u8!(w, meta_type)?;
    let bytes = text.as_bytes();
    let len = Vlq::new(bytes.len() as u32).to_bytes();
    w.write_all(&len).context(wr!())?;
    w.write_all(bytes).context(wr!())?;
    Ok(())
}

/// The SMPTE time at which a [`MetaEvent::SmpteOffset`] track is to start.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct SmpteOffsetValue {
    /// Hour, with the SMPTE frame rate encoded in the top two bits per the MIDI file spec; this
    /// crate stores the byte verbatim rather than decoding it.
    pub hr: u8,
    pub mn: u8,
    pub se: u8,
    pub fr: u8,
    /// Fractional frames, 100ths of a frame.
    pub ff: u8,
}

/// A time signature change: `nn/2^denominator`, a metronome click frequency, and the number of
/// notated 32nd-notes per MIDI quarter note (always 8 for conventional usage).
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TimeSignatureValue {
    numerator: u8,
    denominator: DurationName,
    click: Clocks,
    tpq: u8,
}

impl Default for TimeSignatureValue {
    fn default() -> Self {
        TimeSignatureValue {
            numerator: 4,
            denominator: DurationName::Quarter,
            click: Clocks::Quarter,
            tpq: 8,
        }
    }
}

impl TimeSignatureValue {
    /// The top of the time signature, e.g. 4 in `4/4`.
    pub fn numerator(&self) -> u8 {
        self.numerator
    }

    /// The bottom of the time signature, expressed as the note value it names.
    pub fn denominator(&self) -> DurationName {
        self.denominator
    }

    /// The metronome click, expressed in MIDI clocks.
    pub fn click(&self) -> Clocks {
        self.click
    }

    /// The number of notated 32nd-notes per MIDI quarter note.
    pub fn notated_32nds_per_quarter(&self) -> u8 {
        self.tpq
    }
}

/// The number of sharps (positive) or flats (negative) in a [`KeySignatureValue`], -7 to 7.
clamp!(KeyAccidentals, i8, -7, 7, 0, pub);

/// Whether a [`KeySignatureValue`] names a major or minor key.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum KeyMode {
    #[default]
    Major = 0,
    Minor = 1,
}

impl KeyMode {
    fn from_u8(v: u8) -> LibResult<Self> {
        match v {
            0 => Ok(KeyMode::Major),
            1 => Ok(KeyMode::Minor),
            _ => error::MalformedHeader {
                site: site!(),
                description: format!("unrecognized key signature mode byte {:#04X}", v),
            }
            .fail(),
        }
    }
}

/// A key signature change.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct KeySignatureValue {
    accidentals: KeyAccidentals,
    mode: KeyMode,
}

impl KeySignatureValue {
    /// Sharps (positive) or flats (negative), -7 to 7.
    pub fn accidentals(&self) -> KeyAccidentals {
        self.accidentals
    }

    /// Major or minor.
    pub fn mode(&self) -> KeyMode {
        self.mode
    }
}

/// Microseconds per quarter note, as set by [`MetaEvent::SetTempo`]. The default, 500,000,
/// corresponds to 120 quarter notes per minute: `60_000_000 / 500_000 == 120`.
clamp!(MicrosecondsPerQuarter, u32, 1, 16_777_215, 500_000, pub);

impl MicrosecondsPerQuarter {
    /// Convert to a tempo expressed in quarter notes per minute, rounding to the nearest integer.
    pub fn quarters_per_minute(self) -> QuartersPerMinute {
        let qpm = (60_000_000u32 / self.get()).clamp(1, u8::MAX as u32) as u8;
        QuartersPerMinute::new(qpm)
    }

    /// Build from a tempo expressed in quarter notes per minute.
    pub fn from_quarters_per_minute(qpm: QuartersPerMinute) -> Self {
        Self::new(60_000_000u32 / qpm.get() as u32)
    }
}

/// A tempo in quarter notes per minute (BPM, when the quarter note is the beat).
clamp!(QuartersPerMinute, u8, 1, u8::MAX, 120, pub);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scribe::{Scribe, ScribeSettings};
    use std::io::Cursor;

    fn round_trip(event: &MetaEvent) -> MetaEvent {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut scribe = Scribe::new(&mut buf, ScribeSettings::default());
            event.write(&mut scribe).unwrap();
        }
        let cursor = Cursor::new(buf);
        let mut iter = ByteIter::new(std::io::Read::bytes(cursor)).unwrap();
        MetaEvent::parse(&mut iter).unwrap()
    }

    #[test]
    fn end_of_track_round_trip() {
        let event = MetaEvent::EndOfTrack;
        assert_eq!(event, round_trip(&event));
    }

    #[test]
    fn set_tempo_round_trip() {
        let event = MetaEvent::SetTempo(MicrosecondsPerQuarter::new(500_000));
        assert_eq!(event, round_trip(&event));
    }

    #[test]
    fn track_name_round_trip() {
        let event = MetaEvent::TrackName(Text::from("Piano"));
        assert_eq!(event, round_trip(&event));
    }

    #[test]
    fn sequence_number_round_trip() {
        let event = MetaEvent::SequenceNumber(Some(7));
        assert_eq!(event, round_trip(&event));
        let none_event = MetaEvent::SequenceNumber(None);
        assert_eq!(none_event, round_trip(&none_event));
    }

    #[test]
    fn sequencer_specific_round_trip() {
        let event = MetaEvent::Sequencer(vec![0x01, 0x02, 0x03]);
        assert_eq!(event, round_trip(&event));
    }

    #[test]
    fn unrecognized_type_preserved_as_other() {
        let event = MetaEvent::Other(0x15, vec![0xaa, 0xbb]);
        assert_eq!(event, round_trip(&event));
    }

    #[test]
    fn tempo_quarters_per_minute_conversion() {
        let mspq = MicrosecondsPerQuarter::new(500_000);
        assert_eq!(mspq.quarters_per_minute().get(), 120);
    }
}
