//! Verse text access.
//!
//! A [`VerseSource`] hands out the raw annotated text of a verse. The
//! [`VerseRenderer`] turns that into the text a search scans or a caller
//! displays, keeping or dropping each kind of inline markup according to
//! its [`VerseTextOptions`].

pub mod render;
pub mod source;

pub use self::render::{VerseRenderer, VerseTextOptions};
pub use self::source::{IndexedVerseSource, PlainVerseSource, VerseSource};
