use std::collections::{BTreeMap, HashMap};

use simd_json::OwnedValue;

use super::{Document, DocumentStore, KeyValueStore};
use crate::error::StoreError;
use crate::hash::document_id;

/// In-process document store with sequential id seeds
#[derive(Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<Document>>,
    next_seed: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with documents in the given order
    pub fn with_documents(collection: &str, docs: Vec<Document>) -> Self {
        let mut store = Self::new();
        store.collections.insert(collection.to_string(), docs);
        store
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }

    fn add(&mut self, collection: &str, fields: OwnedValue) -> Result<String, StoreError> {
        let id = document_id(self.next_seed);
        self.next_seed += 1;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        Ok(id)
    }
}

#[derive(Default)]
pub struct MemoryKv {
    values: BTreeMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
