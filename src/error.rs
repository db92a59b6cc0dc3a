use snafu::Snafu;

/// The public Error type for this library.
#[derive(Debug, Snafu)]
pub struct Error(LibError);

/// The public Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// The internal Result type for this library.
pub(crate) type LibResult<T> = std::result::Result<T, LibError>;

/// The internal Error type for this library. Variants correspond to the error kinds a caller can
/// actually receive; `UnknownEvent` and `NoConfidentKey` are logged or returned as data instead of
/// raised, and so have no variant here.
#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
pub(crate) enum LibError {
    #[snafu(display("error while reading bytes: {}", source))]
    Io {
        site: String,
        source: crate::byte_iter::ByteError,
    },

    #[snafu(display("error while writing bytes: {}", source))]
    WriteIo {
        site: String,
        source: std::io::Error,
    },

    #[snafu(display("unable to open '{}': {}", path.display(), source))]
    IoUnavailable {
        site: String,
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("{}: the MIDI file header is invalid: {}", site, description))]
    MalformedHeader { site: String, description: String },

    #[snafu(display("{}: track ended before an EndOfTrack event: {}", site, description))]
    TruncatedTrack { site: String, description: String },

    #[snafu(display("{}: unrecognized channel status nibble {:#03X}", site, nibble))]
    UnknownStatus { site: String, nibble: u8 },

    #[snafu(display("{}: variable-length quantity is invalid: {}", site, source))]
    InvalidVlq {
        site: String,
        source: crate::vlq::VlqError,
    },

    #[snafu(display("{}: index {} is out of range (0..{})", site, index, len))]
    OutOfRange {
        site: String,
        index: usize,
        len: usize,
    },

    #[snafu(display("{}: {}", site, description))]
    EmptyInput { site: String, description: String },

    #[snafu(display("{}: a track chunk is too long to encode its length as u32", site))]
    TrackTooLong { site: String },

    #[snafu(display("{} unknown error", site))]
    Other { site: String },
}

macro_rules! site {
    () => {
        format!("{}:{}", file!(), line!())
    };
}

macro_rules! io {
    () => {
        crate::error::Io { site: site!() }
    };
}

macro_rules! wr {
    () => {
        crate::error::WriteIo { site: site!() }
    };
}

#[test]
fn site_test() {
    let line = line!() + 1;
    let site = site!();
    assert!(site.contains("error.rs"));
    assert!(site.contains(format!("{}", line).as_str()));
}

#[test]
fn malformed_header_message_test() {
    fn foo() -> LibResult<u64> {
        crate::error::MalformedHeader {
            site: site!(),
            description: "missing MThd tag",
        }
        .fail()
    }
    let message = format!("{}", foo().err().unwrap());
    assert!(message.contains("missing MThd tag"));
}
