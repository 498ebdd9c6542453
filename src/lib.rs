//! # Versicle
//!
//! Boolean, phrase and regular-expression search over a versified corpus
//! such as the King James Bible.
//!
//! ## Features
//!
//! - Canonical verse references and a forgiving range grammar
//!   (`Gen 1:1-3; John 3`)
//! - An inverted index of words, Strong's numbers and morphology tags
//! - Memory and memory-mapped file storage backends
//! - Eleven search strategies, from plain `AND`/`OR` to sloppy phrases,
//!   wildcards and boolean combinator queries
//! - Search-term highlighting of rendered verse text
// Core modules
mod error;
pub mod index;
pub mod query;
pub mod reference;
pub mod search;
pub mod storage;
pub mod text;

// Re-exports for the public API
pub use error::{Result, VersicleError};
pub use index::{IndexBuilder, IndexStore};
pub use query::{CombinedQuery, Highlight, TermRegexBuilder};
pub use reference::{VerseRange, VerseRef, VerseSet};
pub use search::{SearchConfig, SearchFlags, SearchRequest, Searcher, Strategy};
pub use storage::{Storage, StorageConfig, StorageFactory};
pub use text::{IndexedVerseSource, PlainVerseSource, VerseRenderer, VerseSource, VerseTextOptions};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
