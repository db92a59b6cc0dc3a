use crate::byte_iter::ByteIter;
use crate::error::{self, LibResult};
use crate::midi::division::Division;
use crate::scribe::Scribe;
use snafu::ResultExt;
use std::convert::TryFrom;
use std::io::{Read, Write};

const HEADER_CHUNK_LEN: u32 = 6;

/// `<Header Chunk> = <chunk type> <length> <format> <ntrks> <division>`
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Header {
    format: Format,
    division: Division,
}

impl Header {
    /// Create a new `Header`.
    pub fn new(format: Format, division: Division) -> Self {
        Self { format, division }
    }

    /// The file's format, 0, 1, or 2.
    pub fn format(&self) -> Format {
        self.format
    }

    /// How delta-times in this file's tracks should be interpreted.
    pub fn division(&self) -> Division {
        self.division
    }

    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<(Self, u16)> {
        iter.expect_tag("MThd").map_err(|_| {
            error::MalformedHeader {
                site: site!(),
                description: "missing MThd chunk tag".to_string(),
            }
            .build()
        })?;
        let len = iter.read_u32().context(io!())?;
        if len != HEADER_CHUNK_LEN {
            return error::MalformedHeader {
                site: site!(),
                description: format!("header chunk length {} is not {}", len, HEADER_CHUNK_LEN),
            }
            .fail();
        }
        let format = Format::from_u16(iter.read_u16().context(io!())?)?;
        let ntrks = iter.read_u16().context(io!())?;
        let division = Division::from_u16(iter.read_u16().context(io!())?)?;
        Ok((Self { format, division }, ntrks))
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>, ntracks: u16) -> LibResult<()> {
        write!(w, "MThd").context(wr!())?;
        w.write_all(&HEADER_CHUNK_LEN.to_be_bytes()).context(wr!())?;
        w.write_all(&(self.format as u16).to_be_bytes())
            .context(wr!())?;
        w.write_all(&ntracks.to_be_bytes()).context(wr!())?;
        self.division.write(w)?;
        Ok(())
    }
}

/// The overall organization of a MIDI file's tracks.
#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash, Default)]
pub enum Format {
    /// The file contains a single multi-channel track.
    Single = 0,
    /// The file contains one or more simultaneous tracks of a single sequence.
    #[default]
    Multi = 1,
    /// The file contains one or more sequentially independent single-track patterns.
    Sequential = 2,
}

impl Format {
    pub(crate) fn from_u16(value: u16) -> LibResult<Self> {
        match value {
            0 => Ok(Format::Single),
            1 => Ok(Format::Multi),
            2 => Ok(Format::Sequential),
            _ => error::MalformedHeader {
                site: site!(),
                description: format!("unrecognized format indicator {}", value),
            }
            .fail(),
        }
    }
}

impl TryFrom<u16> for Format {
    type Error = crate::Error;

    fn try_from(value: u16) -> crate::Result<Self> {
        Ok(Self::from_u16(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::division::QuarterNoteDivision;
    use crate::scribe::ScribeSettings;
    use std::io::Cursor;

    #[test]
    fn header_round_trip() {
        let header = Header::new(
            Format::Multi,
            Division::QuarterNote(QuarterNoteDivision::new(480)),
        );
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut scribe = Scribe::new(&mut buf, ScribeSettings::default());
            header.write(&mut scribe, 2).unwrap();
        }
        let cursor = Cursor::new(buf);
        let mut iter = ByteIter::new(std::io::Read::bytes(cursor)).unwrap();
        let (parsed, ntrks) = Header::parse(&mut iter).unwrap();
        assert_eq!(header, parsed);
        assert_eq!(2, ntrks);
    }
}
