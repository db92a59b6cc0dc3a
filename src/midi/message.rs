use crate::byte_iter::ByteIter;
use crate::error::{self, LibResult};
use crate::midi::numbers::{Channel, ControlValue, NoteNumber, Program, Velocity, U7};
use crate::midi::status::{StatusType, STATUS_CHANNEL_MASK, STATUS_TYPE_MASK};
use crate::scribe::Scribe;
use snafu::ResultExt;
use std::io::{Read, Write};

/// Data shared by [`Message::NoteOn`], [`Message::NoteOff`], and [`Message::PolyPressure`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NoteMessage {
    pub(crate) channel: Channel,
    pub(crate) note_number: NoteNumber,
    pub(crate) velocity: Velocity,
}

impl NoteMessage {
    /// The MIDI channel this message is addressed to.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The note number (pitch) this message is addressed to.
    pub fn note_number(&self) -> NoteNumber {
        self.note_number
    }

    /// The velocity carried by this message.
    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    fn parse<R: Read>(iter: &mut ByteIter<R>, channel: Channel) -> LibResult<Self> {
        Ok(NoteMessage {
            channel,
            note_number: iter.read_or_die().context(io!())?.into(),
            velocity: iter.read_or_die().context(io!())?.into(),
        })
    }

    fn write<W: Write>(&self, w: &mut Scribe<W>, st: StatusType) -> LibResult<()> {
        write_status_byte(w, st, self.channel)?;
        write_u8!(w, self.note_number.get())?;
        write_u8!(w, self.velocity.get())?;
        Ok(())
    }
}

/// A control-change message: a controller number (0..127) and a new value (0..127).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ControlChangeValue {
    pub(crate) channel: Channel,
    pub(crate) control: U7,
    pub(crate) value: ControlValue,
}

impl ControlChangeValue {
    /// The MIDI channel this message is addressed to.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The controller number.
    pub fn control(&self) -> U7 {
        self.control
    }

    /// The new value of the controller.
    pub fn value(&self) -> ControlValue {
        self.value
    }

    fn parse<R: Read>(iter: &mut ByteIter<R>, channel: Channel) -> LibResult<Self> {
        Ok(Self {
            channel,
            control: iter.read_or_die().context(io!())?.into(),
            value: iter.read_or_die().context(io!())?.into(),
        })
    }

    fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        write_status_byte(w, StatusType::Control, self.channel)?;
        write_u8!(w, self.control.get())?;
        write_u8!(w, self.value.get())?;
        Ok(())
    }
}

/// A program (patch) change message.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ProgramChangeValue {
    pub(crate) channel: Channel,
    pub(crate) program: Program,
}

impl ProgramChangeValue {
    /// The MIDI channel this message is addressed to.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The new program (patch) number.
    pub fn program(&self) -> Program {
        self.program
    }

    fn parse<R: Read>(iter: &mut ByteIter<R>, channel: Channel) -> LibResult<Self> {
        Ok(Self {
            channel,
            program: iter.read_or_die().context(io!())?.into(),
        })
    }

    fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        write_status_byte(w, StatusType::Program, self.channel)?;
        write_u8!(w, self.program.get())?;
        Ok(())
    }
}

/// A channel-pressure (monophonic aftertouch) message.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ChannelPressureValue {
    pub(crate) channel: Channel,
    pub(crate) pressure: U7,
}

impl ChannelPressureValue {
    /// The MIDI channel this message is addressed to.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The pressure value.
    pub fn pressure(&self) -> U7 {
        self.pressure
    }

    fn parse<R: Read>(iter: &mut ByteIter<R>, channel: Channel) -> LibResult<Self> {
        Ok(Self {
            channel,
            pressure: iter.read_or_die().context(io!())?.into(),
        })
    }

    fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        write_status_byte(w, StatusType::ChannelPressure, self.channel)?;
        write_u8!(w, self.pressure.get())?;
        Ok(())
    }
}

/// A pitch-bend message: a 14-bit value, center (no bend) is `0x2000`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PitchBendValue {
    pub(crate) channel: Channel,
    pub(crate) value: u16,
}

impl PitchBendValue {
    /// The MIDI channel this message is addressed to.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The 14-bit bend value, `0x2000` is centered.
    pub fn value(&self) -> u16 {
        self.value
    }

    fn parse<R: Read>(iter: &mut ByteIter<R>, channel: Channel) -> LibResult<Self> {
        let lsb = iter.read_or_die().context(io!())? as u16;
        let msb = iter.read_or_die().context(io!())? as u16;
        Ok(Self {
            channel,
            value: (msb << 7) | lsb,
        })
    }

    fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        write_status_byte(w, StatusType::PitchBend, self.channel)?;
        let lsb = (self.value & 0x7f) as u8;
        let msb = ((self.value >> 7) & 0x7f) as u8;
        write_u8!(w, lsb)?;
        write_u8!(w, msb)?;
        Ok(())
    }
}

/// A MIDI channel voice message, the payload of a `<MIDI event>` in a track chunk.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Message {
    /// A note-off event (or a note-on with velocity 0, normalized to this variant by the codec).
    NoteOff(NoteMessage),
    /// A note-on event with a nonzero velocity.
    NoteOn(NoteMessage),
    /// Polyphonic key pressure (aftertouch for an individual note).
    PolyPressure(NoteMessage),
    /// A control-change message.
    Control(ControlChangeValue),
    /// A program (patch) change.
    ProgramChange(ProgramChangeValue),
    /// A channel-wide pressure (aftertouch) message.
    ChannelPressure(ChannelPressureValue),
    /// A pitch-bend message.
    PitchBend(PitchBendValue),
}

impl Default for Message {
    fn default() -> Self {
        Message::NoteOff(NoteMessage::default())
    }
}

impl Message {
    /// Parse a channel message, resolving running status against `running_status` (updated in
    /// place with whatever status byte ends up governing this message).
    pub(crate) fn parse<R: Read>(
        iter: &mut ByteIter<R>,
        running_status: &mut Option<u8>,
    ) -> LibResult<Self> {
        let peeked = iter.peek_or_die().context(io!())?;
        let status_byte = if peeked & 0x80 == 0 {
            // MSB clear: this is a data byte, not a status byte. Reuse running status.
            running_status.ok_or_else(|| {
                error::TruncatedTrack {
                    site: site!(),
                    description: "data byte encountered with no preceding running status",
                }
                .build()
            })?
        } else {
            let b = iter.read_or_die().context(io!())?;
            *running_status = Some(b);
            b
        };

        let channel = Channel::new(status_byte & STATUS_CHANNEL_MASK);
        let status_type = StatusType::from_u8((status_byte & STATUS_TYPE_MASK) >> 4)?;
        match status_type {
            StatusType::NoteOff => Ok(Message::NoteOff(NoteMessage::parse(iter, channel)?)),
            StatusType::NoteOn => {
                let note = NoteMessage::parse(iter, channel)?;
                if note.velocity.get() == 0 {
                    Ok(Message::NoteOff(note))
                } else {
                    Ok(Message::NoteOn(note))
                }
            }
            StatusType::PolyPressure => {
                Ok(Message::PolyPressure(NoteMessage::parse(iter, channel)?))
            }
            StatusType::Control => Ok(Message::Control(ControlChangeValue::parse(iter, channel)?)),
            StatusType::Program => Ok(Message::ProgramChange(ProgramChangeValue::parse(
                iter, channel,
            )?)),
            StatusType::ChannelPressure => Ok(Message::ChannelPressure(
                ChannelPressureValue::parse(iter, channel)?,
            )),
            StatusType::PitchBend => Ok(Message::PitchBend(PitchBendValue::parse(iter, channel)?)),
        }
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        match self {
            Message::NoteOff(m) => m.write(w, StatusType::NoteOff),
            Message::NoteOn(m) => m.write(w, StatusType::NoteOn),
            Message::PolyPressure(m) => m.write(w, StatusType::PolyPressure),
            Message::Control(m) => m.write(w),
            Message::ProgramChange(m) => m.write(w),
            Message::ChannelPressure(m) => m.write(w),
            Message::PitchBend(m) => m.write(w),
        }
    }
}

fn write_status_byte<W: Write>(
    w: &mut Scribe<W>,
    status_type: StatusType,
    channel: Channel,
) -> LibResult<()> {
    let byte = ((status_type as u8) << 4) | (channel.get() & STATUS_CHANNEL_MASK);
    w.write_status_byte(byte)
}
