use crate::error::{self, LibResult};
use std::convert::TryFrom;

/// The right-most four bits of a channel status byte hold the channel number.
pub(crate) const STATUS_CHANNEL_MASK: u8 = 0b0000_1111;

/// The left-most four bits of a channel status byte hold the message type.
pub(crate) const STATUS_TYPE_MASK: u8 = 0b1111_0000;

/// `0xFF`: all meta-events begin with `FF`, then an event type byte (always less than 128).
pub(crate) const FILE_META_EVENT: u8 = 0xff;

/// `0xF0`: `F0 <length> <bytes to be transmitted after F0>`
pub(crate) const FILE_SYSEX_F0: u8 = 0xf0;

/// `0xF7`: `F7 <length> <all bytes to be transmitted>`
pub(crate) const FILE_SYSEX_F7: u8 = 0xf7;

/// The status byte types in Table I "Summary of Status Bytes" from the MIDI specification, for the
/// channel voice messages this crate understands.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub(crate) enum StatusType {
    /// `0x8`: a `Note Off` message.
    NoteOff = 0x8,
    /// `0x9`: a `Note On` message (a velocity of 0 means `Note Off`).
    NoteOn = 0x9,
    /// `0xA`: a `Polyphonic key pressure`/`Aftertouch` message.
    PolyPressure = 0xA,
    /// `0xB`: a `Control change` message.
    Control = 0xB,
    /// `0xC`: a `Program change` message.
    Program = 0xC,
    /// `0xD`: a `Channel pressure`/`Aftertouch` message.
    ChannelPressure = 0xD,
    /// `0xE`: a `Pitch bend change` message.
    PitchBend = 0xE,
}

impl StatusType {
    pub(crate) fn from_u8(value: u8) -> LibResult<Self> {
        match value {
            x if StatusType::NoteOff as u8 == x => Ok(StatusType::NoteOff),
            x if StatusType::NoteOn as u8 == x => Ok(StatusType::NoteOn),
            x if StatusType::PolyPressure as u8 == x => Ok(StatusType::PolyPressure),
            x if StatusType::Control as u8 == x => Ok(StatusType::Control),
            x if StatusType::Program as u8 == x => Ok(StatusType::Program),
            x if StatusType::ChannelPressure as u8 == x => Ok(StatusType::ChannelPressure),
            x if StatusType::PitchBend as u8 == x => Ok(StatusType::PitchBend),
            _ => error::UnknownStatus {
                site: site!(),
                nibble: value,
            }
            .fail(),
        }
    }

    /// Number of data bytes that follow a status byte of this type.
    pub(crate) fn data_len(self) -> usize {
        match self {
            StatusType::Program | StatusType::ChannelPressure => 1,
            _ => 2,
        }
    }
}

impl TryFrom<u8> for StatusType {
    type Error = crate::Error;

    fn try_from(value: u8) -> crate::Result<Self> {
        Ok(StatusType::from_u8(value)?)
    }
}
