//! Turns search terms into the regular expressions used for phrase
//! matching and highlighting.

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Regex, RegexBuilder};

/// Plain word boundary.
pub const WORD_BOUNDARY: &str = r"\b";

/// Word boundary that also accepts color escapes around the word, so text
/// already highlighted by an earlier pass still matches.
pub const COLOR_BOUNDARY: &str = r"(?:(?:\x1b\[[\d;]*m)+|\b)";

const COLOR: &str = r"\x1b\[[\d;]*m";
const NOT_WORDS: &str = r"\b\w+\b";
const NOT_STRONGS: &str = r"<[^>]*>";
const NOT_MORPH: &str = r"\{[^\}]*\}";
const NOT_PUNCT: &str = r#"[\s,\?\!\.;:\\/_\(\)\[\]"'-]"#;

lazy_static! {
    static ref NON_ALNUM_REGEX: Regex = Regex::new(r"[^\w\*<>\{\}\(\)-]").unwrap();
    static ref PIECE_REGEX: Regex = Regex::new(
        r"(?i)(?P<strongs><?\b[GH]\d+\b>?)|(?P<morph>[\(\{][\w-]+[\}\)])|(?P<word>[\w\*-]+)"
    )
    .unwrap();
    static ref NEVER_MATCH: Regex = Regex::new(r"\b\B").unwrap();
}

/// A regex that matches nothing.
pub fn never_match() -> Regex {
    NEVER_MATCH.clone()
}

/// Tallies of each kind of term in a phrase.
#[derive(Debug, Default, Clone, Copy)]
struct PieceCounts {
    words: usize,
    strongs: usize,
    morph: usize,
}

/// Builds a regex matching a word, a phrase, or a raw pattern in verse
/// text.
///
/// Words in a phrase are joined by filler that skips punctuation, color
/// escapes and, depending on the terms, tag spans and whole words:
///
/// * Strong's and morphology spans may be skipped unless the phrase itself
///   names a tag of that kind.
/// * Whole words may be skipped when the phrase has no plain words, when
///   it names tags, or when the builder is sloppy.
///
/// # Example
///
/// ```
/// use versicle::query::TermRegexBuilder;
///
/// let regex = TermRegexBuilder::new().build("in the beginning");
/// assert!(regex.is_match("In the beginning God created"));
/// assert!(!regex.is_match("in a beginning"));
///
/// let sloppy = TermRegexBuilder::new().with_sloppy(true).build("in beginning");
/// assert!(sloppy.is_match("In the beginning God created"));
/// ```
#[derive(Debug, Clone)]
pub struct TermRegexBuilder {
    case_sensitive: bool,
    word_bound: String,
    filler_extra: String,
    sloppy: bool,
    is_regex: bool,
}

impl Default for TermRegexBuilder {
    fn default() -> Self {
        TermRegexBuilder {
            case_sensitive: false,
            word_bound: WORD_BOUNDARY.to_string(),
            filler_extra: String::new(),
            sloppy: false,
            is_regex: false,
        }
    }
}

impl TermRegexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Boundary placed on each side of every word.
    pub fn with_word_bound(mut self, word_bound: impl Into<String>) -> Self {
        self.word_bound = word_bound.into();
        self
    }

    /// Extra alternatives the filler between phrase words may skip.
    pub fn with_filler_extra(mut self, filler_extra: impl Into<String>) -> Self {
        self.filler_extra = filler_extra.into();
        self
    }

    /// Allow other words between the words of a phrase.
    pub fn with_sloppy(mut self, sloppy: bool) -> Self {
        self.sloppy = sloppy;
        self
    }

    /// Use the terms verbatim as a regular expression.
    pub fn with_regex(mut self, is_regex: bool) -> Self {
        self.is_regex = is_regex;
        self
    }

    /// The pattern for `terms`, without case flags.
    pub fn pattern(&self, terms: &str) -> String {
        if self.is_regex {
            return terms.to_string();
        }

        let cleaned = NON_ALNUM_REGEX.replace_all(terms, " ");
        let mut counts = PieceCounts::default();
        let elements: Vec<String> = cleaned
            .split_whitespace()
            .map(|element| self.element_pattern(element, &mut counts))
            .filter(|element| !element.is_empty())
            .collect();

        if elements.len() < 2 {
            return elements.concat();
        }

        elements.join(&self.filler(&counts))
    }

    /// Compile the pattern for `terms`.
    ///
    /// An empty pattern, or one that fails to compile, is replaced by one
    /// that never matches.
    pub fn build(&self, terms: &str) -> Regex {
        let pattern = self.pattern(terms);
        if pattern.is_empty() {
            return never_match();
        }
        debug!("Using regular expression: {pattern}");

        match RegexBuilder::new(&pattern)
            .case_insensitive(!self.case_sensitive)
            .build()
        {
            Ok(regex) => regex,
            Err(e) => {
                warn!("Invalid regular expression {pattern:?}: {e}");
                never_match()
            }
        }
    }

    fn element_pattern(&self, element: &str, counts: &mut PieceCounts) -> String {
        let bound = &self.word_bound;
        let mut pattern = String::new();

        for caps in PIECE_REGEX.captures_iter(element) {
            if let Some(strongs) = caps.name("strongs") {
                counts.strongs += 1;
                let number = strongs.as_str().trim_matches(['<', '>']).to_uppercase();
                pattern.push_str(&format!("<({bound}({number}){bound})>"));
            } else if let Some(morph) = caps.name("morph") {
                counts.morph += 1;
                let tag = regex::escape(&morph.as_str()[1..morph.len() - 1].to_uppercase());
                pattern.push_str(&format!(r"\{{({bound}({tag}){bound})\}}"));
            } else if let Some(word) = caps.name("word") {
                counts.words += 1;
                let word = word.as_str().replace('*', r"\w*");
                pattern.push_str(&format!("({bound}({word}){bound})"));
            }
        }

        pattern
    }

    fn filler(&self, counts: &PieceCounts) -> String {
        let mut filler = format!("(?:{NOT_PUNCT}|{COLOR}{}", self.filler_extra);
        if counts.strongs == 0 || self.sloppy {
            filler.push('|');
            filler.push_str(NOT_STRONGS);
        }
        if counts.morph == 0 || self.sloppy {
            filler.push('|');
            filler.push_str(NOT_MORPH);
        }
        if counts.words == 0 || counts.strongs > 0 || counts.morph > 0 || self.sloppy {
            filler.push('|');
            filler.push_str(NOT_WORDS);
        }
        filler.push_str(")*?");
        filler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word() {
        let regex = TermRegexBuilder::new().build("beginning");
        assert!(regex.is_match("In the Beginning"));
        assert!(!regex.is_match("beginnings"));

        let regex = TermRegexBuilder::new().with_case_sensitive(true).build("beginning");
        assert!(!regex.is_match("In the Beginning"));
    }

    #[test]
    fn test_strict_phrase() {
        let regex = TermRegexBuilder::new().build("in the beginning");
        assert!(regex.is_match("In the beginning God created"));
        assert!(regex.is_match("in, the: beginning"));
        assert!(!regex.is_match("in a nice beginning"));
        assert!(!regex.is_match("in all the nice beginning"));
    }

    #[test]
    fn test_strict_phrase_skips_tags() {
        let regex = TermRegexBuilder::new().build("in the beginning");
        assert!(regex.is_match("In <H871> the beginning <H7225> God"));
    }

    #[test]
    fn test_sloppy_phrase() {
        let regex = TermRegexBuilder::new()
            .with_sloppy(true)
            .build("in the beginning");
        assert!(regex.is_match("in the beginning"));
        assert!(regex.is_match("in all the nice beginning"));
        assert!(!regex.is_match("the beginning in"));
        // Every word is still required, in order.
        assert!(!regex.is_match("in a nice beginning"));
    }

    #[test]
    fn test_strongs_phrase() {
        let regex = TermRegexBuilder::new().build("God h430");
        assert!(regex.is_match("And God <H430> said"));
        assert!(!regex.is_match("And God <H410> said"));

        // Words between the word and the number are skipped once tags
        // are part of the phrase.
        let regex = TermRegexBuilder::new().build("<H7225> <H430>");
        assert!(regex.is_match("beginning <H7225> God <H430> created"));
    }

    #[test]
    fn test_morph_phrase() {
        let regex = TermRegexBuilder::new().build("created {v-qal}");
        assert!(regex.is_match("God created <H1254> {V-QAL} the"));
    }

    #[test]
    fn test_wildcard() {
        let regex = TermRegexBuilder::new().build("begin*");
        assert!(regex.is_match("in the beginning"));
        assert!(!regex.is_match("rebegin"));
    }

    #[test]
    fn test_raw_regex() {
        let regex = TermRegexBuilder::new().with_regex(true).build(r"god\s+said");
        assert!(regex.is_match("And God said"));

        let regex = TermRegexBuilder::new().with_regex(true).build("(unclosed");
        assert!(!regex.is_match("(unclosed"));
        assert!(!regex.is_match(""));
    }

    #[test]
    fn test_empty_terms() {
        let regex = TermRegexBuilder::new().build(" ,; ");
        assert!(!regex.is_match("in the beginning"));
    }

    #[test]
    fn test_never_match() {
        let regex = never_match();
        assert!(!regex.is_match(""));
        assert!(!regex.is_match("anything at all"));
    }

    #[test]
    fn test_color_boundary() {
        let regex = TermRegexBuilder::new()
            .with_word_bound(COLOR_BOUNDARY)
            .build("God");
        assert!(regex.is_match("And \x1b[7mGod\x1b[m said"));
        assert!(regex.is_match("And God said"));
    }
}
