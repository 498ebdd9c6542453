//! Search terms and their normalization.

use std::fmt;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::index::store::normalize_key;

lazy_static! {
    static ref STRONGS_REGEX: Regex = Regex::new(r"(?i)[<]?(\b[GH]\d+\b)[>]?").unwrap();
    // Tags need their braces (or parentheses), otherwise every capitalized
    // or hyphenated word would look like one.
    static ref MORPH_REGEX: Regex = Regex::new(r"(?i)[\(\{](\b[\w-]+\b)[\}\)]").unwrap();
    static ref NON_ALNUM_REGEX: Regex = Regex::new(r"[^\w\*<>\{\}\(\)-]").unwrap();
    static ref SPACES_REGEX: Regex = Regex::new(r"\s+").unwrap();
    static ref STRONGS_TOKEN_REGEX: Regex = Regex::new(r"(?i)^<?[GH]\d+>?$").unwrap();
    static ref MORPH_TOKEN_REGEX: Regex = Regex::new(r"^[\(\{][\w-]+[\}\)]$").unwrap();
}

/// What a search term refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// A plain word, possibly with `*` wildcards.
    Word,
    /// A Strong's number such as `<H430>`.
    Strongs,
    /// A morphology tag such as `{N-NSM}`.
    Morph,
}

impl TermKind {
    /// Classify a single whitespace-free token.
    pub fn classify(token: &str) -> Self {
        if STRONGS_TOKEN_REGEX.is_match(token) {
            TermKind::Strongs
        } else if MORPH_TOKEN_REGEX.is_match(token) {
            TermKind::Morph
        } else {
            TermKind::Word
        }
    }
}

/// A single normalized search term.
///
/// Strong's numbers are held as `<H430>` and morphology tags as `{N-NSM}`,
/// both uppercase. Words keep their spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    text: String,
    kind: TermKind,
}

impl Term {
    pub fn new(token: &str) -> Self {
        let kind = TermKind::classify(token);
        let text = match kind {
            TermKind::Word => token.to_string(),
            TermKind::Strongs => format!("<{}>", normalize_key(token).to_uppercase()),
            TermKind::Morph => format!("{{{}}}", normalize_key(token).to_uppercase()),
        };
        Term { text, kind }
    }

    /// Split `text` on whitespace into terms.
    pub fn parse_all(text: &str) -> Vec<Term> {
        text.split_whitespace().map(Term::new).collect()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> TermKind {
        self.kind
    }

    pub fn is_word(&self) -> bool {
        self.kind == TermKind::Word
    }

    /// The index key for this term.
    pub fn key(&self) -> String {
        normalize_key(&self.text)
    }

    /// Lowercase plain words for a case-insensitive search. Tags are left
    /// alone.
    pub fn fold_case(mut self, case_sensitive: bool) -> Self {
        if !case_sensitive && self.kind == TermKind::Word {
            self.text = self.text.to_lowercase();
        }
        self
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Uppercase every Strong's number and morphology tag in `text`, putting
/// Strong's numbers in `<>` and tags in `{}`.
pub fn fix_strongs_morph(text: &str) -> String {
    let text = STRONGS_REGEX.replace_all(text, |caps: &Captures| {
        format!("<{}>", caps[1].to_uppercase())
    });
    MORPH_REGEX
        .replace_all(&text, |caps: &Captures| format!("{{{}}}", caps[1].to_uppercase()))
        .into_owned()
}

/// Replace everything but word characters, wildcards, tag brackets and
/// hyphens with spaces, collapsing runs of whitespace.
pub fn clean_text(text: &str) -> String {
    let text = NON_ALNUM_REGEX.replace_all(text, " ");
    SPACES_REGEX.replace_all(&text, " ").trim().to_string()
}

/// Whether `text` mentions a Strong's number.
pub fn contains_strongs(text: &str) -> bool {
    STRONGS_REGEX.is_match(text)
}

/// Whether `text` mentions a bracketed morphology tag.
pub fn contains_morph(text: &str) -> bool {
    MORPH_REGEX.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(TermKind::classify("beginning"), TermKind::Word);
        assert_eq!(TermKind::classify("<H430>"), TermKind::Strongs);
        assert_eq!(TermKind::classify("g2316"), TermKind::Strongs);
        assert_eq!(TermKind::classify("{N-NSM}"), TermKind::Morph);
        assert_eq!(TermKind::classify("(v-aai-3s)"), TermKind::Morph);
        assert_eq!(TermKind::classify("Hello"), TermKind::Word);
        assert_eq!(TermKind::classify("lov*"), TermKind::Word);
    }

    #[test]
    fn test_term_canonical_form() {
        let term = Term::new("h430");
        assert_eq!(term.text(), "<H430>");
        assert_eq!(term.key(), "H430");

        let term = Term::new("(n-nsm)");
        assert_eq!(term.text(), "{N-NSM}");
        assert_eq!(term.key(), "N-NSM");

        let term = Term::new("God").fold_case(false);
        assert_eq!(term.text(), "god");
        assert!(term.is_word());

        let term = Term::new("<H430>").fold_case(false);
        assert_eq!(term.text(), "<H430>");
    }

    #[test]
    fn test_parse_all() {
        let terms = Term::parse_all("  God <h430>  {v-qal} ");
        let kinds: Vec<TermKind> = terms.iter().map(Term::kind).collect();
        assert_eq!(kinds, vec![TermKind::Word, TermKind::Strongs, TermKind::Morph]);
    }

    #[test]
    fn test_fix_strongs_morph() {
        assert_eq!(fix_strongs_morph("god h430"), "god <H430>");
        assert_eq!(fix_strongs_morph("<g2316> (n-nsm)"), "<G2316> {N-NSM}");
        assert_eq!(fix_strongs_morph("in the beginning"), "in the beginning");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("Jesus, wept!  "), "Jesus wept");
        assert_eq!(clean_text("lov* <H430> {N-NSM}"), "lov* <H430> {N-NSM}");
        assert_eq!(clean_text("\"in\" the; beginning."), "in the beginning");
    }

    #[test]
    fn test_contains_tags() {
        assert!(contains_strongs("the <H430>"));
        assert!(!contains_strongs("the God"));
        assert!(contains_morph("a {N-NSM}"));
        assert!(!contains_morph("N-NSM"));
    }
}
