use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VersicleError};

/// How the terms of a search are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Every term, in any order.
    Multiword,
    /// Any of the terms.
    Anyword,
    /// Exactly one of two terms (an odd number of them in general).
    Eitheror,
    /// Any word matching a `*` wildcard.
    PartialWord,
    /// The terms adjacent and in order.
    Phrase,
    /// The terms in order, possibly with other words between them.
    OrderedMultiword,
    /// A phrase of words, Strong's numbers and morphology tags.
    MixedPhrase,
    /// A regular expression over the verse text.
    Regex,
    /// A boolean `AND`/`OR`/`NOT` query over words.
    Combined,
    /// A boolean query over phrases.
    CombinedPhrase,
    /// Operator-prefixed terms (`+`, `!`, `^`, `|`).
    Mixed,
}

impl Strategy {
    pub const ALL: [Strategy; 11] = [
        Strategy::Multiword,
        Strategy::Anyword,
        Strategy::Eitheror,
        Strategy::PartialWord,
        Strategy::Phrase,
        Strategy::OrderedMultiword,
        Strategy::MixedPhrase,
        Strategy::Regex,
        Strategy::Combined,
        Strategy::CombinedPhrase,
        Strategy::Mixed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Multiword => "multiword",
            Strategy::Anyword => "anyword",
            Strategy::Eitheror => "eitheror",
            Strategy::PartialWord => "partial_word",
            Strategy::Phrase => "phrase",
            Strategy::OrderedMultiword => "ordered_multiword",
            Strategy::MixedPhrase => "mixed_phrase",
            Strategy::Regex => "regex",
            Strategy::Combined => "combined",
            Strategy::CombinedPhrase => "combined_phrase",
            Strategy::Mixed => "mixed",
        }
    }

    /// Whether Strong's numbers and morphology tags in the query are put in
    /// canonical form before the search. Strategies that pass terms through
    /// to sub-searches leave that to them.
    pub fn canonicalizes_tags(&self) -> bool {
        !matches!(
            self,
            Strategy::Regex
                | Strategy::PartialWord
                | Strategy::Combined
                | Strategy::CombinedPhrase
                | Strategy::Mixed
        )
    }

    /// Whether the query is reduced to plain words and tags.
    pub fn cleans_words(&self) -> bool {
        matches!(
            self,
            Strategy::Multiword
                | Strategy::Anyword
                | Strategy::Eitheror
                | Strategy::Phrase
                | Strategy::OrderedMultiword
                | Strategy::MixedPhrase
        )
    }

    /// Whether the verse range is applied to the result instead of limiting
    /// the scan.
    pub fn restricts_after(&self) -> bool {
        matches!(
            self,
            Strategy::Multiword | Strategy::Anyword | Strategy::Eitheror | Strategy::PartialWord
        )
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = VersicleError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == name)
            .ok_or_else(|| VersicleError::unknown_strategy(s))
    }
}

/// Options shared by every strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFlags {
    /// Search the Strong's numbers in the text.
    pub strongs: bool,
    /// Search the morphology tags in the text.
    pub morph: bool,
    pub case_sensitive: bool,
    /// Include words added by the translators in scanned text.
    pub added: bool,
    /// Verse range to limit the search to, e.g. `Gen 1-3; John`.
    pub range: Option<String>,
}

impl Default for SearchFlags {
    fn default() -> Self {
        SearchFlags {
            strongs: false,
            morph: false,
            case_sensitive: false,
            added: true,
            range: None,
        }
    }
}

/// A single search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub strategy: Strategy,
    /// Search terms. Most strategies join them with spaces; `mixed` treats
    /// each as one operator-prefixed term.
    pub terms: Vec<String>,
    #[serde(default)]
    pub flags: SearchFlags,
}

impl SearchRequest {
    pub fn new<S: Into<String>>(strategy: Strategy, terms: impl IntoIterator<Item = S>) -> Self {
        SearchRequest {
            strategy,
            terms: terms.into_iter().map(Into::into).collect(),
            flags: SearchFlags::default(),
        }
    }

    /// A request for the strategy called `name`.
    pub fn named<S: Into<String>>(name: &str, terms: impl IntoIterator<Item = S>) -> Result<Self> {
        Ok(Self::new(name.parse()?, terms))
    }

    pub fn with_flags(mut self, flags: SearchFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_strongs(mut self, strongs: bool) -> Self {
        self.flags.strongs = strongs;
        self
    }

    pub fn with_morph(mut self, morph: bool) -> Self {
        self.flags.morph = morph;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.flags.case_sensitive = case_sensitive;
        self
    }

    pub fn with_added(mut self, added: bool) -> Self {
        self.flags.added = added;
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.flags.range = Some(range.into());
        self
    }
}
