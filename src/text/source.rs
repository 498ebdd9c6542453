use std::fmt::Debug;
use std::sync::Arc;

use ahash::AHashMap;
use log::warn;

use crate::index::IndexStore;
use crate::reference::VerseRef;
use crate::storage::Storage;

/// Supplies the raw annotated text of verses.
pub trait VerseSource: Send + Sync + Debug {
    /// Raw text of `verse`, or `None` if the source does not have it.
    fn raw_text(&self, verse: VerseRef) -> Option<String>;
}

/// Reads verse text stored in the index under each verse's reference.
#[derive(Debug, Clone)]
pub struct IndexedVerseSource {
    storage: Arc<dyn Storage>,
}

impl IndexedVerseSource {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        IndexedVerseSource { storage }
    }

    /// Source backed by the same storage as `store`.
    pub fn from_store(store: &IndexStore) -> Self {
        Self::new(Arc::clone(store.storage()))
    }
}

impl VerseSource for IndexedVerseSource {
    fn raw_text(&self, verse: VerseRef) -> Option<String> {
        let key = verse.to_string();
        match self.storage.get(&key) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("Corrupt text for {key}: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read text for {key}: {e}");
                None
            }
        }
    }
}

/// An in-memory map of verse text, typically already free of markup.
#[derive(Debug, Clone, Default)]
pub struct PlainVerseSource {
    texts: AHashMap<VerseRef, String>,
}

impl PlainVerseSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, verse: VerseRef, text: S) {
        self.texts.insert(verse, text.into());
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(VerseRef, S)> for PlainVerseSource {
    fn from_iter<I: IntoIterator<Item = (VerseRef, S)>>(iter: I) -> Self {
        PlainVerseSource {
            texts: iter
                .into_iter()
                .map(|(verse, text)| (verse, text.into()))
                .collect(),
        }
    }
}

impl VerseSource for PlainVerseSource {
    fn raw_text(&self, verse: VerseRef) -> Option<String> {
        self.texts.get(&verse).cloned()
    }
}
