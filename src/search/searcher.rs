use std::sync::Arc;

use log::{debug, info, warn};
use rayon::prelude::*;
use regex::Regex;

use crate::error::Result;
use crate::index::IndexStore;
use crate::query::combined::CombinedQuery;
use crate::query::regex::TermRegexBuilder;
use crate::query::term::{TermKind, clean_text};
use crate::reference::{VerseRange, VerseRef, VerseSet, sorted};
use crate::search::config::SearchConfig;
use crate::search::pipeline::SearchPipeline;
use crate::search::request::{SearchFlags, SearchRequest, Strategy};
use crate::text::{VerseRenderer, VerseSource};

/// Runs searches against an index and the verse text behind it.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use versicle::index::{IndexBuilder, IndexStore};
/// use versicle::reference::VerseRef;
/// use versicle::search::{SearchConfig, SearchRequest, Searcher, Strategy};
/// use versicle::storage::StorageConfig;
/// use versicle::text::IndexedVerseSource;
///
/// let mut builder = IndexBuilder::new();
/// builder.add_verse(VerseRef::parse("John 11:35"), "Jesus <G2424> wept. <G1145>");
/// let storage = builder.build(StorageConfig::default()).unwrap();
///
/// let index = Arc::new(IndexStore::new(Arc::clone(&storage)));
/// let source = Arc::new(IndexedVerseSource::new(storage));
/// let searcher = Searcher::new(index, source, SearchConfig::default());
///
/// let found = searcher
///     .search(&SearchRequest::new(Strategy::Phrase, ["jesus", "wept"]))
///     .unwrap();
/// assert!(found.contains(&VerseRef::parse("John 11:35")));
/// ```
#[derive(Debug, Clone)]
pub struct Searcher {
    index: Arc<IndexStore>,
    source: Arc<dyn VerseSource>,
    config: SearchConfig,
}

impl Searcher {
    pub fn new(index: Arc<IndexStore>, source: Arc<dyn VerseSource>, config: SearchConfig) -> Self {
        Searcher {
            index,
            source,
            config,
        }
    }

    pub fn index(&self) -> &Arc<IndexStore> {
        &self.index
    }

    pub fn source(&self) -> &Arc<dyn VerseSource> {
        &self.source
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run `request`.
    pub fn search(&self, request: &SearchRequest) -> Result<VerseSet> {
        info!(
            "Searching for {:?} using {} search",
            request.terms, request.strategy
        );
        let found = self.run(&SearchPipeline::new(
            request.strategy,
            &request.terms,
            &request.flags,
        ));
        debug!("Found {} verses", found.len());
        Ok(found)
    }

    /// Run the strategy called `strategy`.
    ///
    /// An unknown name is an error and nothing is searched.
    pub fn search_named<S: AsRef<str>>(
        &self,
        strategy: &str,
        terms: &[S],
        flags: &SearchFlags,
    ) -> Result<VerseSet> {
        let strategy: Strategy = strategy.parse()?;
        Ok(self.run(&SearchPipeline::new(strategy, terms, flags)))
    }

    /// Verses with every term, in any order.
    pub fn multiword<S: AsRef<str>>(&self, terms: &[S], flags: &SearchFlags) -> VerseSet {
        self.run(&SearchPipeline::new(Strategy::Multiword, terms, flags))
    }

    /// Verses with any of the terms.
    pub fn anyword<S: AsRef<str>>(&self, terms: &[S], flags: &SearchFlags) -> VerseSet {
        self.run(&SearchPipeline::new(Strategy::Anyword, terms, flags))
    }

    /// Verses with one term or the other but not both.
    pub fn eitheror<S: AsRef<str>>(&self, terms: &[S], flags: &SearchFlags) -> VerseSet {
        self.run(&SearchPipeline::new(Strategy::Eitheror, terms, flags))
    }

    /// Verses with a word matching any of the `*` wildcard terms.
    pub fn partial_word<S: AsRef<str>>(&self, terms: &[S], flags: &SearchFlags) -> VerseSet {
        self.run(&SearchPipeline::new(Strategy::PartialWord, terms, flags))
    }

    /// Verses with the terms as an exact phrase.
    pub fn phrase<S: AsRef<str>>(&self, terms: &[S], flags: &SearchFlags) -> VerseSet {
        self.run(&SearchPipeline::new(Strategy::Phrase, terms, flags))
    }

    /// Verses with the terms in order, other words allowed between them.
    pub fn ordered_multiword<S: AsRef<str>>(&self, terms: &[S], flags: &SearchFlags) -> VerseSet {
        self.run(&SearchPipeline::new(Strategy::OrderedMultiword, terms, flags))
    }

    /// Verses with a phrase that may mix words, Strong's numbers and
    /// morphology tags.
    pub fn mixed_phrase<S: AsRef<str>>(&self, terms: &[S], flags: &SearchFlags) -> VerseSet {
        self.run(&SearchPipeline::new(Strategy::MixedPhrase, terms, flags))
    }

    /// Verses whose text matches the terms as a regular expression.
    pub fn regex<S: AsRef<str>>(&self, terms: &[S], flags: &SearchFlags) -> VerseSet {
        self.run(&SearchPipeline::new(Strategy::Regex, terms, flags))
    }

    /// Verses matching a boolean `AND`/`OR`/`NOT` query.
    pub fn combined<S: AsRef<str>>(&self, terms: &[S], flags: &SearchFlags) -> VerseSet {
        self.run(&SearchPipeline::new(Strategy::Combined, terms, flags))
    }

    /// Like [`combined`](Self::combined), with every group a phrase.
    pub fn combined_phrase<S: AsRef<str>>(&self, terms: &[S], flags: &SearchFlags) -> VerseSet {
        self.run(&SearchPipeline::new(Strategy::CombinedPhrase, terms, flags))
    }

    /// Verses matching operator-prefixed terms.
    ///
    /// `+term` is required, `!term` excluded, `^term` folded in by
    /// symmetric difference and `|term` (or no prefix) an alternative. A
    /// term starting with `&` is a regular expression, one with spaces a
    /// phrase (an ordered multiword search when it starts with `~`) and one
    /// with `*` a partial word search.
    pub fn mixed<S: AsRef<str>>(&self, terms: &[S], flags: &SearchFlags) -> VerseSet {
        self.run(&SearchPipeline::new(Strategy::Mixed, terms, flags))
    }

    fn run(&self, pipeline: &SearchPipeline) -> VerseSet {
        if pipeline.is_empty() {
            return VerseSet::default();
        }

        let case_sensitive = pipeline.case_sensitive();
        let found = match pipeline.strategy() {
            Strategy::Multiword => self.index.intersect(&pipeline.term_texts(), case_sensitive),
            Strategy::Anyword => self.index.union(&pipeline.term_texts(), case_sensitive),
            Strategy::Eitheror => self
                .index
                .symmetric_difference(&pipeline.term_texts(), case_sensitive),
            Strategy::PartialWord => self.index.partial(
                &pipeline.term_texts(),
                case_sensitive,
                self.config.common_limit,
            ),
            Strategy::Phrase | Strategy::MixedPhrase => self.phrase_search(pipeline, false),
            Strategy::OrderedMultiword => self.phrase_search(pipeline, true),
            Strategy::Regex => self.regex_search(pipeline),
            Strategy::Combined => self.combined_search(pipeline, false),
            Strategy::CombinedPhrase => self.combined_search(pipeline, true),
            Strategy::Mixed => self.mixed_search(pipeline),
        };

        pipeline.finish(found)
    }

    fn phrase_search(&self, pipeline: &SearchPipeline, sloppy: bool) -> VerseSet {
        let terms = pipeline.term_texts();
        if terms.is_empty() {
            return VerseSet::default();
        }
        let case_sensitive = pipeline.case_sensitive();

        let mut candidates = if terms.iter().any(|term| term.contains('*')) {
            self.index
                .partial(&terms, case_sensitive, self.config.phrase_common_limit)
        } else {
            self.index.intersect(&terms, case_sensitive)
        };
        if pipeline.range().is_some() {
            candidates.retain(|verse| pipeline.in_range(*verse));
        }

        if terms.len() == 1 || candidates.is_empty() {
            return candidates;
        }

        let regex = self.phrase_regex(pipeline, sloppy);
        self.scan(&sorted(&candidates), pipeline, &regex, false)
    }

    fn phrase_regex(&self, pipeline: &SearchPipeline, sloppy: bool) -> Regex {
        let terms = pipeline.terms();
        let flags = pipeline.flags();
        let builder = TermRegexBuilder::new()
            .with_case_sensitive(pipeline.case_sensitive())
            .with_sloppy(sloppy);

        // A run of tags only, with no other tag of that kind in between.
        let joiner = if pipeline.strategy() != Strategy::Phrase {
            None
        } else if flags.strongs && terms.iter().all(|term| term.kind() == TermKind::Strongs) {
            Some("[^<]*")
        } else if flags.morph && terms.iter().all(|term| term.kind() == TermKind::Morph) {
            Some(r"[^\{]*")
        } else {
            None
        };

        match joiner {
            Some(joiner) => {
                let pattern = terms
                    .iter()
                    .map(|term| regex::escape(term.text()))
                    .collect::<Vec<_>>()
                    .join(joiner);
                builder.with_regex(true).build(&pattern)
            }
            None => builder.build(&pipeline.term_texts().join(" ")),
        }
    }

    fn regex_search(&self, pipeline: &SearchPipeline) -> VerseSet {
        let regex = TermRegexBuilder::new()
            .with_case_sensitive(pipeline.case_sensitive())
            .with_regex(true)
            .build(pipeline.text());

        let candidates = match pipeline.range() {
            Some(range) => sorted(range),
            None => VerseRange::new(VerseRef::first(), VerseRef::last())
                .iter()
                .collect(),
        };
        let try_clean = !pipeline.strongs() && !pipeline.morph();

        self.scan(&candidates, pipeline, &regex, try_clean)
    }

    /// Verses among `candidates` whose rendered text matches `regex`, or,
    /// with `try_clean`, whose text stripped of punctuation does.
    fn scan(
        &self,
        candidates: &[VerseRef],
        pipeline: &SearchPipeline,
        regex: &Regex,
        try_clean: bool,
    ) -> VerseSet {
        let options = self
            .config
            .text
            .with_strongs(pipeline.strongs())
            .with_morph(pipeline.morph())
            .with_added(pipeline.flags().added);
        let renderer = VerseRenderer::new(options);
        let source = self.source.as_ref();

        let matches = |verse: &&VerseRef| {
            renderer.text(source, **verse).is_some_and(|text| {
                regex.is_match(&text) || (try_clean && regex.is_match(&clean_text(&text)))
            })
        };

        let found: Vec<VerseRef> = if candidates.len() >= self.config.parallel_threshold {
            debug!("Scanning {} verses in parallel", candidates.len());
            candidates.par_iter().filter(matches).copied().collect()
        } else {
            candidates.iter().filter(matches).copied().collect()
        };
        found.into_iter().collect()
    }

    fn combined_search(&self, pipeline: &SearchPipeline, phrase: bool) -> VerseSet {
        let query = match CombinedQuery::parse(pipeline.text()) {
            Ok(query) => query,
            Err(e) => {
                warn!("{e}");
                return VerseSet::default();
            }
        };
        debug!(
            "Combined query words {:?}, not {:?}",
            query.word_list, query.not_list
        );

        let mut found = self.fold_groups(&query.word_list, pipeline, phrase);
        let excluded = self.fold_groups(&query.not_list, pipeline, phrase);
        found.retain(|verse| !excluded.contains(verse));
        found
    }

    /// Search each group and fold the results together: a group after a
    /// lone `&`, or starting with one, is intersected in and the rest are
    /// folded in by symmetric difference.
    fn fold_groups(&self, groups: &[String], pipeline: &SearchPipeline, phrase: bool) -> VerseSet {
        let mut result = VerseSet::default();
        let mut and_next = false;

        for group in groups {
            let group = group.trim();
            if group == "&" {
                and_next = true;
                continue;
            }
            let (intersect, group) = match group.strip_prefix('&') {
                Some(rest) => (true, rest.trim()),
                None => (and_next, group),
            };
            and_next = false;

            let strategy = if phrase || group.contains('+') {
                Strategy::Phrase
            } else {
                Strategy::Multiword
            };
            let found = self.run(&pipeline.derive(strategy, &group.replace('+', " ")));

            if intersect {
                result.retain(|verse| found.contains(verse));
            } else {
                symmetric_difference_update(&mut result, found);
            }
        }

        result
    }

    fn mixed_search(&self, pipeline: &SearchPipeline) -> VerseSet {
        let mut found = VerseSet::default();
        let mut and_set: Option<VerseSet> = None;
        let mut or_set = VerseSet::default();
        let mut xor_set = VerseSet::default();
        let mut not_set = VerseSet::default();

        for term in pipeline.raw_terms() {
            let (op, term) = match term.chars().next() {
                Some(op @ ('!' | '+' | '^' | '|')) => (Some(op), &term[1..]),
                _ => (None, term.as_str()),
            };

            let (strategy, term) = if let Some(regex) = term.strip_prefix('&') {
                (Strategy::Regex, regex)
            } else if term.contains(' ') {
                match term.strip_prefix('~') {
                    Some(sloppy) => (Strategy::OrderedMultiword, sloppy),
                    None => (Strategy::MixedPhrase, term),
                }
            } else if term.contains('*') {
                (Strategy::PartialWord, term)
            } else {
                (Strategy::Multiword, term)
            };

            let result = self.run(&pipeline.sub_search(strategy, term));

            match op {
                Some('!') => not_set.extend(result),
                Some('+') => {
                    and_set = Some(match and_set {
                        None => result,
                        Some(mut acc) => {
                            acc.retain(|verse| result.contains(verse));
                            acc
                        }
                    });
                }
                Some('^') => symmetric_difference_update(&mut xor_set, result),
                Some(_) => or_set.extend(result),
                None if self.config.multiword_default && !found.is_empty() => {
                    found.retain(|verse| result.contains(verse));
                }
                None => found.extend(result),
            }
        }

        found.extend(or_set);
        symmetric_difference_update(&mut found, xor_set);

        if let Some(and_set) = and_set.filter(|set| !set.is_empty()) {
            found.retain(|verse| and_set.contains(verse));
            found.extend(and_set);
        }

        found.retain(|verse| !not_set.contains(verse));
        found
    }
}

fn symmetric_difference_update(set: &mut VerseSet, other: VerseSet) {
    for verse in other {
        if !set.remove(&verse) {
            set.insert(verse);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::index::IndexBuilder;
    use crate::storage::StorageConfig;
    use crate::text::IndexedVerseSource;

    fn verse(reference: &str) -> VerseRef {
        VerseRef::parse(reference)
    }

    fn set(references: &[&str]) -> VerseSet {
        references.iter().map(|reference| verse(reference)).collect()
    }

    fn searcher_with(verses: &[(&str, &str)], config: SearchConfig) -> Searcher {
        let mut builder = IndexBuilder::new();
        for (reference, text) in verses {
            builder.add_verse(verse(reference), text);
        }
        let storage = builder.build(StorageConfig::default()).unwrap();
        Searcher::new(
            Arc::new(IndexStore::new(Arc::clone(&storage))),
            Arc::new(IndexedVerseSource::new(storage)),
            config,
        )
    }

    fn searcher() -> Searcher {
        searcher_with(
            &[
                ("Gen 1:1", "In the beginning God created the heaven and the earth."),
                ("Gen 1:2", "And the earth was without form, and void."),
                ("Gen 1:3", "And God said, Let there be light: and there was light."),
                ("John 1:1", "In the beginning was the Word, and the Word was with God."),
            ],
            SearchConfig::default(),
        )
    }

    fn flags() -> SearchFlags {
        SearchFlags::default()
    }

    #[test]
    fn test_multiword_and_anyword() {
        let searcher = searcher();
        assert_eq!(
            searcher.multiword(&["god", "beginning"], &flags()),
            set(&["Gen 1:1", "John 1:1"])
        );
        assert_eq!(
            searcher.anyword(&["light", "void"], &flags()),
            set(&["Gen 1:2", "Gen 1:3"])
        );
    }

    #[test]
    fn test_eitheror() {
        let searcher = searcher();
        assert_eq!(
            searcher.eitheror(&["earth", "god"], &flags()),
            set(&["Gen 1:2", "Gen 1:3", "John 1:1"])
        );
    }

    #[test]
    fn test_phrase() {
        let searcher = searcher();
        assert_eq!(
            searcher.phrase(&["in the beginning god"], &flags()),
            set(&["Gen 1:1"])
        );
        assert_eq!(
            searcher.phrase(&["the", "earth"], &flags()),
            set(&["Gen 1:1", "Gen 1:2"])
        );
        assert!(searcher.phrase(&["earth the"], &flags()).is_empty());
    }

    #[test]
    fn test_ordered_multiword() {
        let searcher = searcher();
        assert_eq!(
            searcher.ordered_multiword(&["beginning", "created"], &flags()),
            set(&["Gen 1:1"])
        );
        assert!(searcher.ordered_multiword(&["created", "beginning"], &flags()).is_empty());
    }

    #[test]
    fn test_regex() {
        let searcher = searcher();
        assert_eq!(
            searcher.regex(&[r"light\W+and there"], &flags()),
            set(&["Gen 1:3"])
        );
        assert!(searcher.regex(&["(unclosed"], &flags()).is_empty());
    }

    #[test]
    fn test_combined() {
        let searcher = searcher();
        assert_eq!(
            searcher.combined(&["beginning AND god NOT word"], &flags()),
            set(&["Gen 1:1"])
        );
    }

    #[test]
    fn test_mixed() {
        let searcher = searcher();
        assert_eq!(
            searcher.mixed(&["+god", "beginning", "!word"], &flags()),
            set(&["Gen 1:1", "Gen 1:3"])
        );
        assert_eq!(
            searcher.mixed(&["in the beginning", "!created"], &flags()),
            set(&["John 1:1"])
        );
    }

    #[test]
    fn test_empty_terms() {
        let searcher = searcher();
        assert!(searcher.multiword::<&str>(&[], &flags()).is_empty());
        assert!(searcher.regex(&["  "], &flags()).is_empty());
        assert!(searcher.index().cached_terms().is_empty());
    }

    #[test]
    fn test_search_named() {
        let searcher = searcher();
        let found = searcher
            .search_named("anyword", &["void"], &flags())
            .unwrap();
        assert_eq!(found, set(&["Gen 1:2"]));
        assert!(searcher.search_named("lucene", &["void"], &flags()).is_err());
    }

    #[test]
    fn test_parallel_scan() {
        let config = SearchConfig::default().with_parallel_threshold(1);
        let searcher = searcher_with(
            &[
                ("Gen 1:1", "In the beginning God created the heaven and the earth."),
                ("John 1:1", "In the beginning was the Word."),
            ],
            config,
        );
        assert_eq!(
            searcher.phrase(&["in the beginning"], &flags()),
            set(&["Gen 1:1", "John 1:1"])
        );
        assert_eq!(searcher.regex(&["word"], &flags()), set(&["John 1:1"]));
    }
}
