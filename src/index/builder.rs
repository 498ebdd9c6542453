//! Building an index from raw annotated verse text.
//!
//! Raw text carries inline markup: Strong's numbers as `<H1234>`,
//! morphology tags as `{N-NSM}`, added words in `<i>..</i>`, paragraph
//! marks `<p>..</p>` and translator notes `<n>..</n>`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::error::Result;
use crate::index::{LOWER_CASE_KEY, MORPH_KEY, STRONGS_KEY, WORDS_KEY};
use crate::reference::{VerseRef, sorted};
use crate::storage::{Records, Storage, StorageConfig, StorageFactory};

lazy_static! {
    static ref STRONGS_REGEX: Regex = Regex::new(r"(?i)\s<([GH]\d+)>").unwrap();
    static ref MORPH_REGEX: Regex = Regex::new(r"(?i)\s\{([\w-]+)\}").unwrap();
    static ref CLEANUP_REGEX: Regex = Regex::new(r"\s*(<([GH]\d*)>|\{([A-Z\d-]*)\})").unwrap();
    static ref NOTES_REGEX: Regex = Regex::new(r"(?s)\s?<n>\s?(.*?)\s?</n>").unwrap();
    static ref TAGS_REGEX: Regex = Regex::new(r"<[/]?[pin]>").unwrap();
    static ref NON_ALNUM_REGEX: Regex = Regex::new(r"\W").unwrap();
    static ref SPACES_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Accumulates postings for a set of verses and produces index records.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    texts: BTreeMap<VerseRef, String>,
    postings: AHashMap<String, AHashSet<VerseRef>>,
    lower_case: BTreeMap<String, Vec<String>>,
    words: BTreeSet<String>,
    strongs: BTreeSet<String>,
    morph: BTreeSet<String>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one verse of raw annotated text.
    pub fn add_verse(&mut self, verse: VerseRef, raw_text: &str) -> &mut Self {
        self.texts.insert(verse, raw_text.to_string());

        let text = NOTES_REGEX.replace_all(raw_text, "");
        let text = TAGS_REGEX.replace_all(&text, "");

        for caps in STRONGS_REGEX.captures_iter(&text) {
            let number = caps[1].to_string();
            self.strongs.insert(number.clone());
            self.post(number, verse);
        }
        for caps in MORPH_REGEX.captures_iter(&text) {
            let tag = caps[1].to_string();
            self.morph.insert(tag.clone());
            self.post(tag, verse);
        }

        self.index_words(verse, &text);
        self
    }

    /// Number of verses added so far.
    pub fn verse_count(&self) -> usize {
        self.texts.len()
    }

    /// Serialize everything into index records.
    pub fn finish(self) -> Result<Records> {
        let mut records = Records::new();

        for (verse, text) in &self.texts {
            records.insert(verse.to_string(), serde_json::to_vec(text)?);
        }
        for (term, verses) in &self.postings {
            let list = sorted(verses);
            records.insert(term.clone(), serde_json::to_vec(&list)?);
        }
        records.insert(LOWER_CASE_KEY.to_string(), serde_json::to_vec(&self.lower_case)?);
        records.insert(WORDS_KEY.to_string(), serde_json::to_vec(&self.words)?);
        records.insert(STRONGS_KEY.to_string(), serde_json::to_vec(&self.strongs)?);
        records.insert(MORPH_KEY.to_string(), serde_json::to_vec(&self.morph)?);

        debug!(
            "Built index of {} verses, {} words, {} Strong's numbers, {} morphology tags",
            self.texts.len(),
            self.words.len(),
            self.strongs.len(),
            self.morph.len()
        );
        Ok(records)
    }

    /// Write the index to the storage described by `config` and open it.
    pub fn build(self, config: StorageConfig) -> Result<Arc<dyn Storage>> {
        StorageFactory::build(config, self.finish()?)
    }

    fn post(&mut self, term: String, verse: VerseRef) {
        self.postings.entry(term).or_default().insert(verse);
    }

    fn index_words(&mut self, verse: VerseRef, text: &str) {
        // Tags removed together with their leading space, so words split by
        // a tag are joined back together.
        let joined = CLEANUP_REGEX.replace_all(text, "");
        let joined = NON_ALNUM_REGEX.replace_all(&joined, " ");
        let joined = SPACES_REGEX.replace_all(&joined, " ");

        // Tags removed leaving the surrounding words split.
        let split = STRONGS_REGEX.replace_all(text, "");
        let split = MORPH_REGEX.replace_all(&split, "");
        let split: String = split.chars().filter(char::is_ascii).collect();
        let split = NON_ALNUM_REGEX.replace_all(&split, " ");
        let split = SPACES_REGEX.replace_all(&split, " ");

        let words: AHashSet<&str> = split
            .split_whitespace()
            .chain(joined.split_whitespace())
            .collect();

        for word in words {
            self.words.insert(word.to_string());
            self.post(word.to_string(), verse);

            let lower = word.to_lowercase();
            if lower != word {
                let variants = self.lower_case.entry(lower).or_default();
                if !variants.iter().any(|v| v == word) {
                    variants.push(word.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::index::IndexStore;
    use crate::storage::memory::MemoryStorageConfig;

    fn v(reference: &str) -> VerseRef {
        VerseRef::parse(reference)
    }

    fn build() -> IndexStore {
        let mut builder = IndexBuilder::new();
        builder
            .add_verse(
                v("Genesis 1:1"),
                "In the beginning <H7225> God <H430> created <H1254> {V-QAL}",
            )
            .add_verse(
                v("Genesis 1:2"),
                "And the earth <H776> was <H1961> without form, <i>and</i> void <n>note text</n>",
            );
        assert_eq!(builder.verse_count(), 2);

        let storage = builder
            .build(StorageConfig::Memory(MemoryStorageConfig::default()))
            .unwrap();
        IndexStore::new(storage)
    }

    #[test]
    fn test_word_postings() {
        let store = build();
        assert!(store.get("beginning").contains(&v("Genesis 1:1")));
        assert!(store.get("earth").contains(&v("Genesis 1:2")));
        assert_eq!(store.get("the").len(), 2);
        assert!(store.get("God").contains(&v("Genesis 1:1")));
        assert!(store.get("god").is_empty());
        assert!(store.get("note").is_empty());
    }

    #[test]
    fn test_tag_postings() {
        let store = build();
        assert!(store.get("H430").contains(&v("Genesis 1:1")));
        assert!(store.get("<H776>").contains(&v("Genesis 1:2")));
        assert!(store.get("V-QAL").contains(&v("Genesis 1:1")));
        assert!(store.get("H7225").len() == 1);
    }

    #[test]
    fn test_metadata() {
        let store = build();
        assert_eq!(store.lower_case_variants("god"), &["God".to_string()]);
        assert_eq!(store.lower_case_variants("in"), &["In".to_string()]);
        assert!(store.vocabulary().contains(&"beginning".to_string()));
        assert_eq!(store.strongs_vocabulary().len(), 5);
        assert_eq!(*store.morph_vocabulary(), vec!["V-QAL".to_string()]);
    }

    #[test]
    fn test_raw_text_is_stored() {
        let store = build();
        let raw = store.storage().get("Genesis 1:2").unwrap().unwrap();
        let text: String = serde_json::from_slice(&raw).unwrap();
        assert!(text.contains("<n>note text</n>"));
    }
}
