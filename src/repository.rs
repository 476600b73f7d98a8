use log::{info, warn};

use crate::error::StoreError;
use crate::model::{Experience, ExperienceDraft, ExperienceFields};
use crate::store::{Document, DocumentStore};

/// Collection holding experience documents
pub const EXPERIENCES: &str = "experiences";

/// Loads and creates experiences in a document store
pub struct ExperienceRepository<S> {
    store: S,
}

impl<S: DocumentStore> ExperienceRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetch the whole collection in document order
    pub fn load_all(&self) -> Result<Vec<Experience>, StoreError> {
        let docs = self.store.get(EXPERIENCES)?;
        let experiences: Vec<Experience> = docs.into_iter().filter_map(decode).collect();
        info!("Loaded {} experiences", experiences.len());
        Ok(experiences)
    }

    /// Persist a draft and return the stored record with its assigned id
    pub fn create(&mut self, draft: ExperienceDraft) -> Result<Experience, StoreError> {
        let fields = draft.into_fields();
        let value = simd_json::serde::to_owned_value(&fields)
            .map_err(|e| StoreError::encode("experience", e))?;
        let id = self.store.add(EXPERIENCES, value)?;
        info!("Published experience {} ({})", id, fields.title);
        Ok(Experience::new(id, fields))
    }
}

/// A document whose fields are not even an object is skipped, anything
/// else is coerced field by field.
fn decode(doc: Document) -> Option<Experience> {
    match simd_json::serde::from_owned_value::<ExperienceFields>(doc.fields) {
        Ok(fields) => Some(Experience::new(doc.id, fields)),
        Err(e) => {
            warn!("Skipping undecodable experience {}: {}", doc.id, e);
            None
        }
    }
}
