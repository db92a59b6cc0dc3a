use crate::byte_iter::ByteIter;
use crate::error::LibResult;
use crate::scribe::Scribe;
use crate::vlq::Vlq;
use snafu::ResultExt;
use std::io::{Read, Write};

/// `<sysex event>` is used to specify a MIDI system exclusive message, either as one complete unit
/// or split into timed packets, or as an "escape" to specify arbitrary bytes to be transmitted.
/// Both forms are preserved byte-for-byte: the payload recorded here is exactly the bytes that
/// followed the length in the file, and writing reproduces the same `F0`/`F7` tag, VLQ length, and
/// payload.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct SysexEvent {
    t: SysexEventType,
    data: Vec<u8>,
}

impl SysexEvent {
    /// Create a new SysEx event from its tag and verbatim payload bytes.
    pub fn new(t: SysexEventType, data: Vec<u8>) -> Self {
        Self { t, data }
    }

    /// Which of the two SysEx forms (`F0` or `F7`) this event was tagged with.
    pub fn kind(&self) -> SysexEventType {
        self.t
    }

    /// The verbatim payload bytes, not including the leading tag or the VLQ length.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        let tag = iter.read_or_die().context(io!())?;
        let t = SysexEventType::from_u8(tag)?;
        let len = iter.read_vlq_u32().context(io!())?;
        let data = iter.read_n(len as usize).context(io!())?;
        Ok(Self { t, data })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        write_u8!(w, self.t as u8)?;
        let len = Vlq::new(self.data.len() as u32).to_bytes();
        w.write_all(&len).context(wr!())?;
        w.write_all(&self.data).context(wr!())?;
        Ok(())
    }
}

/// Distinguishes the two forms a SysEx event can be tagged with in a MIDI file.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash, Default)]
pub enum SysexEventType {
    /// `F0 <length> <bytes to be transmitted after F0>`. The length is a VLQ specifying the
    /// number of bytes which follow it, not including the `F0` or the length itself. A complete
    /// message `F0 43 12 00 07 F7` is stored as `F0 05 43 12 00 07 F7`; the trailing `F7` is part
    /// of the payload so the reader knows the full message has been read.
    #[default]
    F0 = 0xf0,

    /// `F7 <length> <all bytes to be transmitted>`. Used either for the continuation packets of a
    /// message begun with `F0`, or as an escape to emit arbitrary bytes the host wants written
    /// verbatim (no leading `F0`/trailing `F7` are implied).
    F7 = 0xf7,
}

impl SysexEventType {
    fn from_u8(value: u8) -> LibResult<Self> {
        match value {
            0xf0 => Ok(SysexEventType::F0),
            0xf7 => Ok(SysexEventType::F7),
            _ => crate::error::MalformedHeader {
                site: site!(),
                description: format!("unrecognized sysex tag {:#04X}", value),
            }
            .fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scribe::{Scribe, ScribeSettings};
    use std::io::Cursor;

    #[test]
    fn sysex_round_trip_f7_len5() {
        let event = SysexEvent::new(SysexEventType::F7, vec![0x01, 0x02, 0x03, 0x04, 0x05]);
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut scribe = Scribe::new(&mut buf, ScribeSettings::default());
            event.write(&mut scribe).unwrap();
        }
        assert_eq!(&[0xf7, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05], buf.as_slice());
        let cursor = Cursor::new(buf);
        let mut iter = ByteIter::new(std::io::Read::bytes(cursor)).unwrap();
        let parsed = SysexEvent::parse(&mut iter).unwrap();
        assert_eq!(event, parsed);
    }

    #[test]
    fn sysex_round_trip_empty_payload() {
        let event = SysexEvent::new(SysexEventType::F0, vec![]);
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut scribe = Scribe::new(&mut buf, ScribeSettings::default());
            event.write(&mut scribe).unwrap();
        }
        assert_eq!(&[0xf0, 0x00], buf.as_slice());
    }
}
