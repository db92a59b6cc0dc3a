/*!
chordcraft parses Standard MIDI Files, reconstructs simultaneously-sounding note groups as chords,
names them, and rewrites selected chords to a target chord or a parametric transformation while
keeping voice movement small. The edited chord sequence is re-serialized as a new Standard MIDI
File.
!*/

#![allow(dead_code)]

#[macro_use]
mod error;
#[macro_use]
mod clamp;
#[macro_use]
mod macros;

mod byte_iter;
mod scribe;
mod text;
mod vlq;

pub mod midi;

pub mod cache;
pub mod chord;
pub mod document;
pub mod dump;
mod emit;
pub mod journal;
pub mod key;
mod note;
pub mod progression;

pub use document::Document;
pub use error::{Error, Result};
pub use note::Note;
pub use text::Text;
