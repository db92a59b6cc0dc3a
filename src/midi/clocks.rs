/// There are 24 MIDI Clocks in every quarter note (12 in an eighth note, 6 in a sixteenth, etc).
/// Used in [`crate::midi::TimeSignatureValue`] to specify the frequency of the metronome click.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Clocks {
    /// 142 MIDI clocks.
    DottedWhole,
    /// 96 MIDI clocks.
    Whole,
    /// 72 MIDI clocks.
    DottedHalf,
    /// 48 MIDI clocks.
    Half,
    /// 32 MIDI clocks.
    DottedQuarter,
    /// 24 MIDI clocks.
    Quarter,
    /// 18 MIDI clocks.
    DottedEighth,
    /// 12 MIDI clocks.
    Eighth,
    /// 9 MIDI clocks.
    DottedSixteenth,
    /// 6 MIDI clocks.
    Sixteenth,
    /// Any number of MIDI clocks, for durations not named above.
    Other(u8),
}

impl Default for Clocks {
    fn default() -> Self {
        Clocks::Quarter
    }
}

impl Clocks {
    pub(crate) fn from_u8(v: u8) -> Clocks {
        match v {
            142 => Clocks::DottedWhole,
            96 => Clocks::Whole,
            72 => Clocks::DottedHalf,
            48 => Clocks::Half,
            32 => Clocks::DottedQuarter,
            24 => Clocks::Quarter,
            18 => Clocks::DottedEighth,
            12 => Clocks::Eighth,
            9 => Clocks::DottedSixteenth,
            6 => Clocks::Sixteenth,
            _ => Clocks::Other(v),
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Clocks::DottedWhole => 142,
            Clocks::Whole => 96,
            Clocks::DottedHalf => 72,
            Clocks::Half => 48,
            Clocks::DottedQuarter => 32,
            Clocks::Quarter => 24,
            Clocks::DottedEighth => 18,
            Clocks::Eighth => 12,
            Clocks::DottedSixteenth => 9,
            Clocks::Sixteenth => 6,
            Clocks::Other(v) => v,
        }
    }

    /// Build a `Clocks` from a raw value, resolving to a named variant when possible.
    pub fn new(clocks: u8) -> Self {
        Self::from_u8(clocks)
    }
}
