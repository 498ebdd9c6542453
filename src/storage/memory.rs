//! In-memory storage.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{Records, Storage};

/// Configuration for [`MemoryStorage`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStorageConfig {
    /// Number of records to reserve space for up front.
    #[serde(default)]
    pub initial_capacity: usize,
}

/// A storage backend holding every record in a hash map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: AHashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &MemoryStorageConfig) -> Self {
        MemoryStorage {
            records: AHashMap::with_capacity(config.initial_capacity),
        }
    }

    pub fn from_records(records: Records) -> Self {
        MemoryStorage {
            records: records.into_iter().collect(),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.records.get(key).cloned())
    }

    fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let mut records = Records::new();
        records.insert("light".to_string(), b"[]".to_vec());

        let storage = MemoryStorage::from_records(records);
        assert_eq!(storage.len(), 1);
        assert!(storage.contains("light"));
        assert_eq!(storage.get("light").unwrap(), Some(b"[]".to_vec()));
        assert_eq!(storage.get("dark").unwrap(), None);
    }

    #[test]
    fn test_empty_storage() {
        let storage = MemoryStorage::with_config(&MemoryStorageConfig {
            initial_capacity: 16,
        });
        assert!(storage.is_empty());
        assert!(storage.keys().is_empty());
    }
}
