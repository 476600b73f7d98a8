use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use simd_json::OwnedValue;

use super::{Document, DocumentStore, KeyValueStore};
use crate::error::StoreError;
use crate::hash::{document_id, hash2};

type Collections = BTreeMap<String, Vec<Document>>;

/// Read a JSON file, treating a missing or blank file as the default value
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let mut bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    simd_json::serde::from_slice(&mut bytes).map_err(|e| StoreError::malformed(path, e))
}

/// Write via a sibling temp file so a crash never leaves half a document
fn write_json<T: Serialize>(path: &Path, value: &T, what: &'static str) -> Result<(), StoreError> {
    let bytes = simd_json::serde::to_vec_pretty(value).map_err(|e| StoreError::encode(what, e))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}

/// Document store persisted as one JSON file of `{collection: [documents]}`.
/// The file is re-read on every call so edits made by other processes show
/// up on the next load.
pub struct JsonFileStore {
    path: PathBuf,
    seed: u64,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self {
            path: path.into(),
            seed: hash2(nanos, std::process::id() as u64),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for JsonFileStore {
    fn get(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut collections: Collections = read_json(&self.path)?;
        let docs = collections.remove(collection).unwrap_or_default();
        debug!("Read {} documents from {}/{}", docs.len(), self.path.display(), collection);
        Ok(docs)
    }

    fn add(&mut self, collection: &str, fields: OwnedValue) -> Result<String, StoreError> {
        let mut collections: Collections = read_json(&self.path)?;
        let docs = collections.entry(collection.to_string()).or_default();

        let mut id = document_id(self.seed);
        while docs.iter().any(|d| d.id == id) {
            self.seed = self.seed.wrapping_add(1);
            id = document_id(self.seed);
        }
        self.seed = self.seed.wrapping_add(1);

        docs.push(Document {
            id: id.clone(),
            fields,
        });
        write_json(&self.path, &collections, "document store")?;
        info!("Added document {} to {}", id, collection);
        Ok(id)
    }
}

/// Key-value store persisted as a JSON object of string values
pub struct JsonFileKv {
    path: PathBuf,
}

impl JsonFileKv {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeyValueStore for JsonFileKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut map: BTreeMap<String, String> = read_json(&self.path)?;
        Ok(map.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map: BTreeMap<String, String> = read_json(&self.path)?;
        map.insert(key.to_string(), value.to_string());
        write_json(&self.path, &map, "key-value store")
    }
}
