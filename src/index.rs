//! The inverted verse index.
//!
//! Index records map a term to the JSON list of verse references that
//! contain it. A few reserved keys hold corpus-wide metadata:
//!
//! - [`WORDS_KEY`], [`STRONGS_KEY`], [`MORPH_KEY`]: the full vocabularies.
//! - [`LOWER_CASE_KEY`]: lowercase word -> original-case spellings.
//!
//! The raw annotated text of every verse is stored under its canonical
//! reference string.

pub mod builder;
pub mod store;

pub use self::builder::IndexBuilder;
pub use self::store::IndexStore;

/// Key of the list of every indexed word.
pub const WORDS_KEY: &str = "_words_";

/// Key of the list of every indexed Strong's number.
pub const STRONGS_KEY: &str = "_strongs_";

/// Key of the list of every indexed morphology tag.
pub const MORPH_KEY: &str = "_morph_";

/// Key of the lowercase -> original-case spelling map.
pub const LOWER_CASE_KEY: &str = "lower_case";
