//! Verse search.
//!
//! A [`Searcher`] answers a [`SearchRequest`] with the set of matching
//! verses. Every strategy goes through the same [`SearchPipeline`], then
//! either combines posting lists from the [`IndexStore`](crate::index::IndexStore)
//! or scans verse text with a synthesized regular expression.

pub mod config;
pub mod pipeline;
pub mod request;
pub mod searcher;

pub use self::config::SearchConfig;
pub use self::pipeline::SearchPipeline;
pub use self::request::{SearchFlags, SearchRequest, Strategy};
pub use self::searcher::Searcher;
