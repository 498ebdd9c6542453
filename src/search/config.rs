use serde::{Deserialize, Serialize};

use crate::text::VerseTextOptions;

/// Tunables for a [`Searcher`](crate::search::Searcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Words matched by a `partial_word` search are skipped when they occur
    /// in this many verses or more. The default never skips.
    pub common_limit: usize,

    /// The same cutoff for the wildcard pre-filter of phrase searches.
    pub phrase_common_limit: usize,

    /// In `mixed` searches, make unprefixed terms required once the result
    /// is non-empty, instead of alternatives.
    pub multiword_default: bool,

    /// Candidate count from which verse scans run on the rayon pool.
    pub parallel_threshold: usize,

    /// How verse text is rendered before it is scanned. The Strong's,
    /// morphology and added-word settings are overridden per search.
    pub text: VerseTextOptions,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            common_limit: usize::MAX,
            phrase_common_limit: 5000,
            multiword_default: false,
            parallel_threshold: 512,
            text: VerseTextOptions::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_common_limit(mut self, common_limit: usize) -> Self {
        self.common_limit = common_limit;
        self
    }

    pub fn with_phrase_common_limit(mut self, phrase_common_limit: usize) -> Self {
        self.phrase_common_limit = phrase_common_limit;
        self
    }

    pub fn with_multiword_default(mut self, multiword_default: bool) -> Self {
        self.multiword_default = multiword_default;
        self
    }

    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    pub fn with_text(mut self, text: VerseTextOptions) -> Self {
        self.text = text;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.common_limit, usize::MAX);
        assert_eq!(config.phrase_common_limit, 5000);
        assert!(!config.multiword_default);
    }

    #[test]
    fn test_partial_json() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"common_limit": 1000, "text": {"notes": true}}"#).unwrap();
        assert_eq!(config.common_limit, 1000);
        assert_eq!(config.phrase_common_limit, 5000);
        assert!(config.text.notes);
        assert!(config.text.added);
    }

    #[test]
    fn test_builders() {
        let config = SearchConfig::default()
            .with_common_limit(10)
            .with_multiword_default(true)
            .with_parallel_threshold(1);
        assert_eq!(config.common_limit, 10);
        assert!(config.multiword_default);
        assert_eq!(config.parallel_threshold, 1);
    }
}
