use std::sync::Arc;

use crate::query::term::{Term, clean_text, contains_morph, contains_strongs, fix_strongs_morph};
use crate::reference::{VerseRef, VerseSet, parse_verse_range};
use crate::search::request::{SearchFlags, Strategy};

/// Normalized input of one search.
///
/// Every strategy goes through this: the terms are joined, the range is
/// resolved, tags are canonicalized and, for strategies that look terms up
/// in the index, the query is reduced to words and tags with words
/// lowercased unless the search is case sensitive.
#[derive(Debug, Clone)]
pub struct SearchPipeline {
    strategy: Strategy,
    raw_terms: Vec<String>,
    text: String,
    terms: Vec<Term>,
    flags: SearchFlags,
    range: Option<Arc<VerseSet>>,
}

impl SearchPipeline {
    pub fn new<S: AsRef<str>>(strategy: Strategy, terms: &[S], flags: &SearchFlags) -> Self {
        let range = flags
            .range
            .as_deref()
            .map(str::trim)
            .filter(|range| !range.is_empty())
            .map(|range| Arc::new(parse_verse_range(range)));
        Self::with_range(strategy, terms, flags, range)
    }

    /// A pipeline over an already resolved range.
    pub fn with_range<S: AsRef<str>>(
        strategy: Strategy,
        terms: &[S],
        flags: &SearchFlags,
        range: Option<Arc<VerseSet>>,
    ) -> Self {
        let raw_terms: Vec<String> = terms
            .iter()
            .map(|term| term.as_ref().trim().to_string())
            .filter(|term| !term.is_empty())
            .collect();

        let mut text = raw_terms.join(" ");
        if strategy.canonicalizes_tags() {
            text = fix_strongs_morph(&text);
        }

        let terms = if strategy.cleans_words() {
            text = clean_text(&text);
            Term::parse_all(&text)
                .into_iter()
                .map(|term| term.fold_case(flags.case_sensitive))
                .collect()
        } else {
            text.split_whitespace().map(Term::new).collect()
        };

        SearchPipeline {
            strategy,
            raw_terms,
            text,
            terms,
            flags: flags.clone(),
            range,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The terms as given, trimmed, without empty ones.
    pub fn raw_terms(&self) -> &[String] {
        &self.raw_terms
    }

    /// The normalized query as one string.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Term texts, for index lookups.
    pub fn term_texts(&self) -> Vec<&str> {
        self.terms.iter().map(Term::text).collect()
    }

    pub fn flags(&self) -> &SearchFlags {
        &self.flags
    }

    pub fn case_sensitive(&self) -> bool {
        self.flags.case_sensitive
    }

    /// Whether Strong's numbers take part, by flag or by query.
    pub fn strongs(&self) -> bool {
        self.flags.strongs || contains_strongs(&self.text)
    }

    /// Whether morphology tags take part, by flag or by query.
    pub fn morph(&self) -> bool {
        self.flags.morph || contains_morph(&self.text)
    }

    pub fn range(&self) -> Option<&Arc<VerseSet>> {
        self.range.as_ref()
    }

    pub fn in_range(&self, verse: VerseRef) -> bool {
        self.range.as_ref().is_none_or(|range| range.contains(&verse))
    }

    pub fn is_empty(&self) -> bool {
        self.raw_terms.is_empty()
    }

    /// Flags and range for a sub-search of `term`, with the tag flags taken
    /// from the term itself.
    pub fn sub_search(&self, strategy: Strategy, term: &str) -> SearchPipeline {
        let flags = SearchFlags {
            strongs: contains_strongs(term),
            morph: contains_morph(term),
            ..self.flags.clone()
        };
        Self::with_range(strategy, &[term], &flags, self.range.clone())
    }

    /// Same flags and range, another query.
    pub fn derive(&self, strategy: Strategy, term: &str) -> SearchPipeline {
        Self::with_range(strategy, &[term], &self.flags, self.range.clone())
    }

    /// Apply the range to a result, for strategies that do not limit their
    /// scan by it.
    pub fn finish(&self, mut found: VerseSet) -> VerseSet {
        if self.strategy.restricts_after() {
            if let Some(range) = &self.range {
                found.retain(|verse| range.contains(verse));
            }
        }
        found
    }
}
