use log::info;

use crate::error::StoreError;
use crate::model::Experience;
use crate::store::KeyValueStore;

/// Storage key holding the JSON array of saved experiences
pub const ITINERARY_KEY: &str = "ll_itinerary";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Locally saved shortlist, deduplicated by experience id.
/// No capacity bound, no expiry.
pub struct ItineraryStore<K> {
    kv: K,
}

impl<K: KeyValueStore> ItineraryStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn list(&self) -> Result<Vec<Experience>, StoreError> {
        let Some(raw) = self.kv.get(ITINERARY_KEY)? else {
            return Ok(Vec::new());
        };
        let mut bytes = raw.into_bytes();
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        simd_json::serde::from_slice(&mut bytes).map_err(|e| StoreError::malformed(ITINERARY_KEY, e))
    }

    pub fn add(&mut self, experience: &Experience) -> Result<AddOutcome, StoreError> {
        let mut saved = self.list()?;
        if saved.iter().any(|e| e.id == experience.id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        saved.push(experience.clone());
        let encoded =
            simd_json::serde::to_string(&saved).map_err(|e| StoreError::encode("itinerary", e))?;
        self.kv.set(ITINERARY_KEY, &encoded)?;
        info!("Saved {} to itinerary ({} entries)", experience.id, saved.len());
        Ok(AddOutcome::Added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExperienceFields;
    use crate::store::{JsonFileKv, MemoryKv};

    fn exp(id: &str) -> Experience {
        Experience::new(
            id,
            ExperienceFields {
                title: format!("Experience {id}"),
                lat: Some(17.7),
                lng: Some(83.3),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_duplicate_add_is_already_present() {
        let mut store = ItineraryStore::new(MemoryKv::new());
        assert_eq!(store.add(&exp("a")).unwrap(), AddOutcome::Added);
        assert_eq!(store.add(&exp("a")).unwrap(), AddOutcome::AlreadyPresent);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");

        let mut first = ItineraryStore::new(JsonFileKv::open(&path));
        first.add(&exp("a")).unwrap();
        first.add(&exp("b")).unwrap();

        let second = ItineraryStore::new(JsonFileKv::open(&path));
        let saved = second.list().unwrap();
        assert_eq!(saved, vec![exp("a"), exp("b")]);
    }

    #[test]
    fn test_empty_when_unset() {
        let store = ItineraryStore::new(MemoryKv::new());
        assert!(store.list().unwrap().is_empty());
    }
}
