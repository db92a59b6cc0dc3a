/*!
The `midi` module holds everything specific to the Standard MIDI File container format and the
MIDI channel-voice-message wire format: parsing, writing, and the typed representations of
headers, tracks, events, and their payloads.
!*/

mod clocks;
mod division;
mod duration_name;
mod event;
mod header;
mod message;
mod meta_event;
mod midi_file;
mod numbers;
mod status;
mod sysex;
mod track;

pub use clocks::Clocks;
pub use division::{Division, FrameRate, SmpteRate};
pub use duration_name::DurationName;
pub use event::{Event, TrackEvent};
pub use header::{Format, Header};
pub use message::{
    ChannelPressureValue, ControlChangeValue, Message, NoteMessage, PitchBendValue,
    ProgramChangeValue,
};
pub use meta_event::{
    KeyAccidentals, KeyMode, KeySignatureValue, MetaEvent, MicrosecondsPerQuarter,
    QuartersPerMinute, SmpteOffsetValue, TimeSignatureValue,
};
pub use midi_file::MidiFile;
pub use numbers::{Channel, ControlValue, NoteNumber, Program, Velocity, PortValue, U7};
pub use sysex::{SysexEvent, SysexEventType};
pub use track::Track;

pub(crate) use track::ensure_end_of_track;
