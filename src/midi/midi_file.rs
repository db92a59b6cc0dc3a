use crate::byte_iter::ByteIter;
use crate::error::{Error, LibResult};
use crate::midi::header::Header;
use crate::midi::track::{ensure_end_of_track, Track};
use crate::scribe::{Scribe, ScribeSettings};
use snafu::ResultExt;
use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A parsed Standard MIDI File: format, division, and an ordered list of tracks.
///
/// https://www.midi.org/specifications-old/item/standard-midi-files-smf
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct MidiFile {
    header: Header,
    tracks: Vec<Track>,
}

impl MidiFile {
    /// Build a new file from a header and tracks.
    pub fn new(header: Header, tracks: Vec<Track>) -> Self {
        Self { header, tracks }
    }

    /// The file's header (format and division).
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The number of tracks.
    pub fn tracks_len(&self) -> usize {
        self.tracks.len()
    }

    /// Iterator over the tracks, in file order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// A mutable iterator over the tracks, in file order.
    pub fn tracks_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut()
    }

    /// The track at `index`, if any.
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    fn read_inner<R: Read>(bytes: R) -> LibResult<Self> {
        let mut iter = ByteIter::new(bytes.bytes()).context(io!())?;
        let (header, num_tracks) = Header::parse(&mut iter)?;
        let mut tracks = Vec::with_capacity(num_tracks as usize);
        for i in 0..num_tracks {
            log::trace!("parsing track chunk {} (zero-based) of {}", i, num_tracks);
            tracks.push(Track::parse(&mut iter)?);
        }
        Ok(Self { header, tracks })
    }

    /// Parse a complete MIDI file from any byte source.
    pub fn read<R: Read>(r: R) -> crate::Result<Self> {
        Ok(Self::read_inner(r)?)
    }

    /// Parse a complete MIDI file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| {
            Error::from(crate::error::LibError::IoUnavailable {
                site: site!(),
                path: path.to_path_buf(),
                source,
            })
        })?;
        Self::read(BufReader::new(file))
    }

    fn write_inner<W: Write>(&self, w: W) -> LibResult<()> {
        let mut scribe = Scribe::new(w, ScribeSettings::default());
        let tracks: Vec<Track> = self
            .tracks
            .iter()
            .cloned()
            .map(ensure_end_of_track)
            .collect();
        let ntracks = u16::try_from(tracks.len()).map_err(|_| {
            crate::error::TrackTooLong { site: site!() }.build()
        })?;
        self.header.write(&mut scribe, ntracks)?;
        for track in &tracks {
            track.write(&mut scribe)?;
        }
        Ok(())
    }

    /// Write a complete MIDI file to any byte sink.
    pub fn write<W: Write>(&self, w: W) -> crate::Result<()> {
        Ok(self.write_inner(w)?)
    }

    /// Write a complete MIDI file to disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| {
            Error::from(crate::error::LibError::IoUnavailable {
                site: site!(),
                path: path.to_path_buf(),
                source,
            })
        })?;
        self.write(BufWriter::new(file))
    }
}
