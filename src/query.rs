//! Query handling: term classification, the boolean combinator language,
//! regex synthesis for phrase matching and search-term highlighting.

pub mod combined;
pub mod highlight;
pub mod regex;
pub mod term;

pub use self::combined::CombinedQuery;
pub use self::highlight::{Highlight, build_highlight_regex, highlight_search_terms, strip_color};
pub use self::regex::TermRegexBuilder;
pub use self::term::{Term, TermKind, clean_text, fix_strongs_morph};
