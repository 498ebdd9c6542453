//! Highlighting of search terms in rendered verse text.

use lazy_static::lazy_static;
use log::debug;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::query::regex::{COLOR_BOUNDARY, TermRegexBuilder};

const COLOR_FILLER: &str = r"|\x1b\[[\d;]*m|\x1b";

lazy_static! {
    static ref COLOR_REGEX: Regex = Regex::new(r"\x1b\[[\d;]*m").unwrap();
}

/// Text wrapped around each highlighted word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub prefix: String,
    pub suffix: String,
}

impl Highlight {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Highlight {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    fn wrap(&self, text: &str) -> String {
        format!("{}{}{}", self.prefix, text, self.suffix)
    }
}

impl Default for Highlight {
    /// Reverse video.
    fn default() -> Self {
        Highlight::new("\x1b[7m", "\x1b[m")
    }
}

/// One regex per search term for highlighting.
///
/// A term starting with `&` is a raw regular expression. A single token
/// with `*` highlights every word it matches as a prefix pattern. Phrases
/// become phrase patterns, sloppy when `sloppy` is set or the term carries
/// a `~`.
pub fn build_highlight_regex<S: AsRef<str>>(
    terms: &[S],
    case_sensitive: bool,
    sloppy: bool,
) -> Vec<Regex> {
    terms
        .iter()
        .map(|term| term.as_ref().trim())
        .filter(|term| !term.is_empty())
        .map(|term| {
            let raw = term.starts_with('&');
            let wildcard = !raw && term.contains('*') && !term.contains(' ');

            let pattern = if raw {
                term[1..].to_string()
            } else if wildcard {
                let word = term.trim_start_matches(['!', '^', '+', '|']);
                format!("{COLOR_BOUNDARY}({}){COLOR_BOUNDARY}", word.replace('*', r"\w*"))
            } else {
                term.to_string()
            };

            TermRegexBuilder::new()
                .with_case_sensitive(case_sensitive)
                .with_word_bound(COLOR_BOUNDARY)
                .with_filler_extra(COLOR_FILLER)
                .with_sloppy(sloppy || term.contains('~'))
                .with_regex(raw || wildcard)
                .build(&pattern)
        })
        .collect()
}

/// Wrap every word captured by `regexes` in `text` with `highlight`.
///
/// Each regex is applied in turn to the output of the previous one, so a
/// word matched by several terms is wrapped more than once.
pub fn highlight_search_terms(text: &str, regexes: &[Regex], highlight: &Highlight) -> String {
    let mut text = text.trim().to_string();

    for regex in regexes {
        text = regex
            .replace_all(&text, |caps: &Captures| highlight_match(caps, highlight))
            .into_owned();
    }

    text
}

fn highlight_match(caps: &Captures, highlight: &Highlight) -> String {
    let mut matched = caps[0].to_string();

    let mut words: Vec<&str> = caps
        .iter()
        .skip(1)
        .flatten()
        .map(|group| group.as_str())
        .filter(|word| !word.is_empty())
        .collect();
    if words.is_empty() {
        words.push(&caps[0]);
    }

    let mut seen: Vec<&str> = Vec::new();
    for word in words {
        if seen.contains(&word) {
            continue;
        }
        seen.push(word);

        let pattern = format!(
            "({COLOR_BOUNDARY}{}{COLOR_BOUNDARY})",
            regex::escape(word)
        );
        match Regex::new(&pattern) {
            Ok(word_regex) => {
                matched = word_regex
                    .replace_all(&matched, |word_caps: &Captures| highlight.wrap(&word_caps[1]))
                    .into_owned();
            }
            Err(e) => debug!("Skipping highlight of {word:?}: {e}"),
        }
    }

    matched
}

/// Remove color escapes from `text`.
pub fn strip_color(text: &str) -> String {
    COLOR_REGEX.replace_all(text, "").into_owned()
}
