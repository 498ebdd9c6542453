//! Lazily loaded, cached access to an index.

use std::sync::Arc;

use ahash::AHashMap;
use lazy_static::lazy_static;
use log::{debug, warn};
use parking_lot::RwLock;
use rayon::prelude::*;
use regex::{Regex, RegexSet};
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::index::{LOWER_CASE_KEY, MORPH_KEY, STRONGS_KEY, WORDS_KEY};
use crate::reference::{VerseRef, VerseSet};
use crate::storage::{Storage, StorageConfig, StorageFactory};

lazy_static! {
    static ref NON_KEY_REGEX: Regex = Regex::new(r"[<>{}()]").unwrap();
}

/// Strip Strong's/morphology markup from a term so it can be used as a key.
pub fn normalize_key(term: &str) -> String {
    NON_KEY_REGEX.replace_all(term, "").trim().to_string()
}

/// Read access to an index with a per-term posting cache.
///
/// Every posting list is fetched from storage at most once and kept for
/// the lifetime of the store. Missing or unreadable keys behave as empty
/// posting lists.
#[derive(Debug)]
pub struct IndexStore {
    storage: Arc<dyn Storage>,
    postings: RwLock<AHashMap<String, Arc<VerseSet>>>,
    vocabularies: RwLock<AHashMap<&'static str, Arc<Vec<String>>>>,
    lower_case: AHashMap<String, Vec<String>>,
}

impl IndexStore {
    /// Wrap an opened storage. The lowercase variant map is loaded eagerly.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let lower_case = load_value(storage.as_ref(), LOWER_CASE_KEY).unwrap_or_default();
        IndexStore {
            storage,
            postings: RwLock::new(AHashMap::new()),
            vocabularies: RwLock::new(AHashMap::new()),
            lower_case,
        }
    }

    /// Open the storage described by `config` and wrap it.
    pub fn open(config: StorageConfig) -> Result<Self> {
        Ok(Self::new(StorageFactory::create(config)?))
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Posting list for a single term, exactly as spelled (after markup is
    /// stripped).
    pub fn get(&self, term: &str) -> Arc<VerseSet> {
        let key = normalize_key(term);
        if let Some(set) = self.postings.read().get(&key) {
            return Arc::clone(set);
        }

        let set: Arc<VerseSet> = Arc::new(
            load_value::<Vec<VerseRef>>(self.storage.as_ref(), &key)
                .map(|refs| refs.into_iter().collect())
                .unwrap_or_default(),
        );
        Arc::clone(self.postings.write().entry(key).or_insert(set))
    }

    /// Original-case spellings of a lowercase word.
    pub fn lower_case_variants(&self, word: &str) -> &[String] {
        self.lower_case
            .get(word)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Postings for a term, widened to every spelling of it when the search
    /// is case insensitive.
    pub fn expanded(&self, term: &str, case_sensitive: bool) -> VerseSet {
        let mut set = (*self.get(term)).clone();
        if !case_sensitive {
            let lower = normalize_key(term).to_lowercase();
            set.extend(self.get(&lower).iter());
            for variant in self.lower_case_variants(&lower) {
                set.extend(self.get(variant).iter());
            }
        }
        set
    }

    /// Verses containing any of `terms`.
    pub fn union<S: AsRef<str>>(&self, terms: &[S], case_sensitive: bool) -> VerseSet {
        let mut result = VerseSet::default();
        for term in terms {
            result.extend(self.expanded(term.as_ref(), case_sensitive));
        }
        result
    }

    /// Verses containing all of `terms`.
    pub fn intersect<S: AsRef<str>>(&self, terms: &[S], case_sensitive: bool) -> VerseSet {
        let mut result: Option<VerseSet> = None;
        for term in terms {
            let set = self.expanded(term.as_ref(), case_sensitive);
            result = Some(match result {
                None => set,
                Some(mut acc) => {
                    acc.retain(|verse| set.contains(verse));
                    acc
                }
            });
            if result.as_ref().is_some_and(|acc| acc.is_empty()) {
                break;
            }
        }
        result.unwrap_or_default()
    }

    /// Left fold of symmetric difference over the postings of `terms`.
    ///
    /// With two terms this is "one or the other but not both"; with more
    /// it keeps the verses containing an odd number of the terms.
    pub fn symmetric_difference<S: AsRef<str>>(
        &self,
        terms: &[S],
        case_sensitive: bool,
    ) -> VerseSet {
        let mut result = VerseSet::default();
        for term in terms {
            let set = self.expanded(term.as_ref(), case_sensitive);
            for verse in set {
                if !result.remove(&verse) {
                    result.insert(verse);
                }
            }
        }
        result
    }

    /// Verses containing any word matching one of the wildcard `patterns`.
    ///
    /// A `*` matches any run of word characters; every pattern must match
    /// a whole word. Words whose posting list has `common_limit` or more
    /// verses are skipped.
    pub fn partial<S: AsRef<str>>(
        &self,
        patterns: &[S],
        case_sensitive: bool,
        common_limit: usize,
    ) -> VerseSet {
        let regexes: Vec<String> = patterns
            .iter()
            .map(|p| wildcard_regex(p.as_ref(), case_sensitive))
            .collect();
        let matcher = match RegexSet::new(&regexes) {
            Ok(set) => set,
            Err(e) => {
                warn!("Invalid partial word patterns {regexes:?}: {e}");
                return VerseSet::default();
            }
        };

        let vocabulary = self.vocabulary();
        let matches: Vec<&String> = vocabulary
            .par_iter()
            .filter(|word| matcher.is_match(word))
            .collect();
        debug!("Partial patterns {regexes:?} matched {} words", matches.len());

        let mut result = VerseSet::default();
        for word in matches {
            let postings = self.get(word);
            if postings.len() < common_limit {
                result.extend(postings.iter());
            }
        }
        result
    }

    /// Every indexed word, in every spelling.
    pub fn vocabulary(&self) -> Arc<Vec<String>> {
        self.load_vocabulary(WORDS_KEY)
    }

    pub fn strongs_vocabulary(&self) -> Arc<Vec<String>> {
        self.load_vocabulary(STRONGS_KEY)
    }

    pub fn morph_vocabulary(&self) -> Arc<Vec<String>> {
        self.load_vocabulary(MORPH_KEY)
    }

    /// Terms whose postings have been loaded so far.
    pub fn cached_terms(&self) -> Vec<String> {
        self.postings.read().keys().cloned().collect()
    }

    fn load_vocabulary(&self, key: &'static str) -> Arc<Vec<String>> {
        if let Some(words) = self.vocabularies.read().get(key) {
            return Arc::clone(words);
        }
        let words = Arc::new(load_value(self.storage.as_ref(), key).unwrap_or_default());
        Arc::clone(self.vocabularies.write().entry(key).or_insert(words))
    }
}

/// Load and decode a JSON value, logging and discarding any failure.
fn load_value<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    match storage.get(key) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Corrupt index entry for {key:?}: {e}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Failed to read index entry {key:?}: {e}");
            None
        }
    }
}

/// Anchored regex for a wildcard word pattern.
fn wildcard_regex(pattern: &str, case_sensitive: bool) -> String {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\w*");
    let flags = if case_sensitive { "" } else { "(?i)" };
    format!(r"{flags}^\b{body}\b$")
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::storage::Records;
    use crate::storage::memory::MemoryStorage;

    fn record(records: &mut Records, key: &str, value: serde_json::Value) {
        records.insert(key.to_string(), serde_json::to_vec(&value).unwrap());
    }

    fn store() -> IndexStore {
        let mut records = Records::new();
        record(&mut records, "God", serde_json::json!(["Genesis 1:1", "Genesis 1:3"]));
        record(&mut records, "god", serde_json::json!(["Exodus 1:1"]));
        record(&mut records, "light", serde_json::json!(["Genesis 1:3", "Genesis 1:4"]));
        record(&mut records, "Light", serde_json::json!(["John 1:9"]));
        record(&mut records, "lightning", serde_json::json!(["Exodus 19:16"]));
        record(&mut records, "day", serde_json::json!(["Genesis 1:5"]));
        record(&mut records, "H430", serde_json::json!(["Genesis 1:1"]));
        record(&mut records, "broken", serde_json::json!({"not": "a list"}));
        record(
            &mut records,
            "lower_case",
            serde_json::json!({"god": ["God"], "light": ["Light"]}),
        );
        record(
            &mut records,
            "_words_",
            serde_json::json!(["God", "god", "light", "Light", "lightning", "day"]),
        );
        IndexStore::new(Arc::new(MemoryStorage::from_records(records)))
    }

    fn refs(list: &[&str]) -> VerseSet {
        list.iter().map(|r| VerseRef::parse(r)).collect()
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("<H430>"), "H430");
        assert_eq!(normalize_key(" {N-NSM} "), "N-NSM");
        assert_eq!(normalize_key("(word)"), "word");
    }

    #[test]
    fn test_get_and_cache() {
        let store = store();
        assert!(store.cached_terms().is_empty());

        assert_eq!(*store.get("<H430>"), refs(&["Genesis 1:1"]));
        assert!(store.get("missing").is_empty());
        assert!(store.get("broken").is_empty());

        let mut cached = store.cached_terms();
        cached.sort();
        assert_eq!(cached, vec!["H430", "broken", "missing"]);
    }

    #[test]
    fn test_case_expansion() {
        let store = store();
        assert_eq!(
            store.union(&["god"], false),
            refs(&["Genesis 1:1", "Genesis 1:3", "Exodus 1:1"])
        );
        assert_eq!(store.union(&["god"], true), refs(&["Exodus 1:1"]));
        assert_eq!(
            store.union(&["GOD"], false),
            refs(&["Genesis 1:1", "Genesis 1:3", "Exodus 1:1"])
        );
        assert!(store.union(&["GOD"], true).is_empty());
    }

    #[test]
    fn test_union_equals_intersect_for_one_term() {
        let store = store();
        for cs in [true, false] {
            assert_eq!(store.union(&["light"], cs), store.intersect(&["light"], cs));
        }
    }

    #[test]
    fn test_intersect() {
        let store = store();
        assert_eq!(store.intersect(&["God", "light"], true), refs(&["Genesis 1:3"]));
        assert_eq!(
            store.intersect(&["light", "God"], true),
            store.intersect(&["God", "light"], true)
        );
        assert!(store.intersect(&["God", "day"], true).is_empty());
        assert!(store.intersect(&["missing", "God"], true).is_empty());
        assert!(store.intersect::<&str>(&[], true).is_empty());
    }

    #[test]
    fn test_symmetric_difference() {
        let store = store();
        assert_eq!(
            store.symmetric_difference(&["God", "light"], true),
            refs(&["Genesis 1:1", "Genesis 1:4"])
        );
        // Verses in an odd number of the posting lists survive.
        assert_eq!(
            store.symmetric_difference(&["God", "light", "H430"], true),
            refs(&["Genesis 1:4"])
        );
    }

    #[test]
    fn test_partial() {
        let store = store();
        assert_eq!(
            store.partial(&["ligh*"], true, usize::MAX),
            refs(&["Genesis 1:3", "Genesis 1:4", "Exodus 19:16"])
        );
        assert_eq!(
            store.partial(&["ligh*"], false, usize::MAX),
            refs(&["Genesis 1:3", "Genesis 1:4", "John 1:9", "Exodus 19:16"])
        );
        // Without a wildcard the whole word must match.
        assert_eq!(store.partial(&["ligh"], false, usize::MAX), VerseSet::default());
        // Common words are skipped.
        assert_eq!(
            store.partial(&["light*"], true, 2),
            refs(&["Exodus 19:16"])
        );
        // Regex metacharacters are literal.
        assert!(store.partial(&["l.ght"], false, usize::MAX).is_empty());
    }

    #[test]
    fn test_vocabularies() {
        let store = store();
        assert_eq!(store.vocabulary().len(), 6);
        assert!(store.strongs_vocabulary().is_empty());
        assert_eq!(store.lower_case_variants("light"), &["Light".to_string()]);
        assert!(store.lower_case_variants("day").is_empty());
    }
}
