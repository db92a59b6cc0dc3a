use crate::error::LibResult;
use crate::scribe::Scribe;
use snafu::ResultExt;
use std::io::Write;

/// The allowable values for [`Division::QuarterNote`]. A positive `u14`, range 1 to 16,383.
/// Default 1024.
clamp!(QuarterNoteDivision, u16, 1, 16383, 1024, pub);

/// Specifies the meaning of delta-times, either in ticks per quarter note or in SMPTE frames.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Division {
    /// If bit 15 of `division` is zero, bits 14..0 are the number of delta-time "ticks" per
    /// quarter note.
    QuarterNote(QuarterNoteDivision),
    /// Frame rate and resolution within the frame, for SMPTE-based time.
    Smpte(SmpteRate),
}

impl Default for Division {
    fn default() -> Self {
        Division::QuarterNote(QuarterNoteDivision::default())
    }
}

const DIVISION_TYPE_BIT: u16 = 0b1000_0000_0000_0000;

impl Division {
    pub(crate) fn from_u16(value: u16) -> LibResult<Self> {
        if value & DIVISION_TYPE_BIT == DIVISION_TYPE_BIT {
            let frame_rate = FrameRate::from_bits(((value >> 8) & 0x7f) as u8)?;
            let resolution = (value & 0xff) as u8;
            Ok(Division::Smpte(SmpteRate {
                frame_rate,
                resolution,
            }))
        } else {
            Ok(Division::QuarterNote(QuarterNoteDivision::new(value)))
        }
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        match self {
            Division::QuarterNote(q) => Ok(w.write_all(&q.get().to_be_bytes()).context(wr!())?),
            Division::Smpte(s) => {
                let hi = (DIVISION_TYPE_BIT >> 8) as u8 | s.frame_rate.to_bits();
                let bytes = [hi, s.resolution];
                Ok(w.write_all(&bytes).context(wr!())?)
            }
        }
    }
}

/// `division` bits 14..8 hold one of -24, -25, -29, or -30 (two's complement), the four standard
/// SMPTE/MIDI time code frame rates (-29 is 30 drop-frame).
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum FrameRate {
    /// 24 frames per second
    N24,
    /// 25 frames per second
    N25,
    /// 30 drop-frame
    N29,
    /// 30 frames per second
    N30,
}

impl Default for FrameRate {
    fn default() -> Self {
        FrameRate::N24
    }
}

impl FrameRate {
    fn from_bits(bits: u8) -> LibResult<Self> {
        match bits as i8 {
            -24 => Ok(FrameRate::N24),
            -25 => Ok(FrameRate::N25),
            -29 => Ok(FrameRate::N29),
            -30 => Ok(FrameRate::N30),
            _ => crate::error::MalformedHeader {
                site: site!(),
                description: format!("unrecognized SMPTE frame rate byte {:#04X}", bits),
            }
            .fail(),
        }
    }

    fn to_bits(self) -> u8 {
        let signed: i8 = match self {
            FrameRate::N24 => -24,
            FrameRate::N25 => -25,
            FrameRate::N29 => -29,
            FrameRate::N30 => -30,
        };
        (signed as u8) & 0x7f
    }
}

/// SMPTE-based division: a frame rate plus the resolution (subdivisions) within each frame.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct SmpteRate {
    frame_rate: FrameRate,
    /// Ticks per SMPTE frame, e.g. 4 (MIDI time code resolution), 8, 10, 80, or 100.
    resolution: u8,
}

impl Default for SmpteRate {
    fn default() -> Self {
        // The "millisecond-based tracks" example given by the MIDI file spec.
        SmpteRate {
            frame_rate: FrameRate::N25,
            resolution: 40,
        }
    }
}
