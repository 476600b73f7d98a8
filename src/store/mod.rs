//! Storage collaborators.
//!
//! `DocumentStore` stands in for the shared document database holding
//! experiences; `KeyValueStore` for the per-device string store that keeps
//! the itinerary. Both have a JSON-file backend for the binary and an
//! in-memory backend for tests.

mod file;
mod memory;

pub use file::{JsonFileKv, JsonFileStore};
pub use memory::{MemoryKv, MemoryStore};

use serde::{Deserialize, Serialize};
use simd_json::OwnedValue;

use crate::error::StoreError;

/// One stored document: store-assigned id plus arbitrary fields
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: OwnedValue,
}

/// Collection-oriented document database
pub trait DocumentStore {
    /// Ordered snapshot of every document in a collection
    fn get(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Append a document and return its generated id
    fn add(&mut self, collection: &str, fields: OwnedValue) -> Result<String, StoreError>;
}

/// Flat string key-value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}
