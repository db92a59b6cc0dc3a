use crate::error::{self, LibResult};

/// Used when specifying the denominator of a [`crate::midi::TimeSignatureValue`]. Per the MIDI
/// file spec, "the denominator is a negative power of two: 2 represents a quarter-note, 3
/// represents an eighth-note, etc."
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum DurationName {
    /// Whole Note / Semibreve
    Whole = 0,
    /// Half Note / Minim
    Half = 1,
    /// Quarter Note / Crotchet
    Quarter = 2,
    /// Eighth Note / Quaver
    Eighth = 3,
    /// Sixteenth note / Semiquaver
    Sixteenth = 4,
    /// Thirty-second note
    D32 = 5,
    /// Sixty-fourth note
    D64 = 6,
    /// 128th note
    D128 = 7,
    /// 256th note
    D256 = 8,
    /// 512th note
    D512 = 9,
    /// 1024th note
    D1024 = 10,
}

impl Default for DurationName {
    fn default() -> Self {
        DurationName::Quarter
    }
}

impl DurationName {
    pub(crate) fn from_u8(v: u8) -> LibResult<Self> {
        match v {
            v if DurationName::Whole as u8 == v => Ok(DurationName::Whole),
            v if DurationName::Half as u8 == v => Ok(DurationName::Half),
            v if DurationName::Quarter as u8 == v => Ok(DurationName::Quarter),
            v if DurationName::Eighth as u8 == v => Ok(DurationName::Eighth),
            v if DurationName::Sixteenth as u8 == v => Ok(DurationName::Sixteenth),
            v if DurationName::D32 as u8 == v => Ok(DurationName::D32),
            v if DurationName::D64 as u8 == v => Ok(DurationName::D64),
            v if DurationName::D128 as u8 == v => Ok(DurationName::D128),
            v if DurationName::D256 as u8 == v => Ok(DurationName::D256),
            v if DurationName::D512 as u8 == v => Ok(DurationName::D512),
            v if DurationName::D1024 as u8 == v => Ok(DurationName::D1024),
            _ => error::MalformedHeader {
                site: site!(),
                description: format!("unrecognized time signature denominator {}", v),
            }
            .fail(),
        }
    }
}
