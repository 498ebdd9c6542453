//! Key-value storage backends for the verse index.
//!
//! An index is a flat map from string keys (terms, reserved metadata keys
//! and verse references) to JSON-encoded values. Storage is read-only once
//! opened; [`StorageFactory::build`] writes a complete record set and
//! returns the opened store.

pub mod file;
pub mod memory;

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use self::file::{FileStorage, FileStorageConfig};
use self::memory::{MemoryStorage, MemoryStorageConfig};

/// A complete, ordered set of index records.
pub type Records = BTreeMap<String, Vec<u8>>;

/// Read-only key-value access to index records.
pub trait Storage: Send + Sync + Debug {
    /// Raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Whether a value is stored under `key`.
    fn contains(&self, key: &str) -> bool;

    /// All stored keys, in no particular order.
    fn keys(&self) -> Vec<String>;

    /// Number of stored records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    Memory(MemoryStorageConfig),
    File(FileStorageConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory(MemoryStorageConfig::default())
    }
}

/// Creates storage instances from a [`StorageConfig`].
pub struct StorageFactory;

impl StorageFactory {
    /// Open the storage described by `config`.
    ///
    /// A memory store starts out empty; a file store must already exist.
    pub fn create(config: StorageConfig) -> Result<Arc<dyn Storage>> {
        match config {
            StorageConfig::Memory(config) => Ok(Arc::new(MemoryStorage::with_config(&config))),
            StorageConfig::File(config) => Ok(Arc::new(FileStorage::open(&config)?)),
        }
    }

    /// Persist `records` to the storage described by `config` and open it.
    pub fn build(config: StorageConfig, records: Records) -> Result<Arc<dyn Storage>> {
        match config {
            StorageConfig::Memory(_) => Ok(Arc::new(MemoryStorage::from_records(records))),
            StorageConfig::File(config) => {
                FileStorage::write(&config, &records)?;
                Ok(Arc::new(FileStorage::open(&config)?))
            }
        }
    }
}
