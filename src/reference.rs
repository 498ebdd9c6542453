//! The canonical reference space.
//!
//! Every verse of the corpus has a unique ordinal in canon order. A
//! [`VerseRef`] wraps that ordinal and renders as `"Book Chapter:Verse"`;
//! a [`VerseRange`] is an inclusive span of them. Posting lists and search
//! results are unordered [`VerseSet`]s, sorted with [`sorted`] only when
//! presented.

pub mod canon;
pub mod range;
pub mod verse;

use ahash::AHashSet;

pub use self::canon::{BOOKS, Book, corpus_size};
pub use self::range::{
    RangeItem, VerseRange, VerseRangeIter, add_context, parse_range, parse_verse_range, sorted,
};
pub use self::verse::{VerseRef, resolve_book};

/// An unordered, deduplicated set of verses.
pub type VerseSet = AHashSet<VerseRef>;
