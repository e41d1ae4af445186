//! Persistence contract for page documents
//!
//! The hosted backend is an external system of record. This module defines
//! the narrow interface the editor needs from it and an in-memory adapter
//! that stores documents in their serialized JSON form.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::core::block::BlockError;
use crate::core::store::DocumentSnapshot;

/// Storage for one document per site
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Store the full document for a site, replacing any previous one
    async fn save(&self, site_id: &str, document: &DocumentSnapshot) -> Result<(), PersistenceError>;

    /// Fetch the document for a site
    ///
    /// # Returns
    /// * `Err(PersistenceError::NotFound)` if nothing was saved for the site
    async fn load(&self, site_id: &str) -> Result<DocumentSnapshot, PersistenceError>;

    /// Delete the document for a site
    ///
    /// # Returns
    /// `true` if a document was deleted
    async fn delete(&self, site_id: &str) -> Result<bool, PersistenceError>;

    /// Site IDs that have a saved document
    async fn list(&self) -> Result<Vec<String>, PersistenceError>;
}

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Nothing saved under this site ID
    #[error("No document saved for site: {0}")]
    NotFound(String),

    /// The backend rejected or failed the request
    #[error("Persistence backend error: {0}")]
    Backend(String),

    /// Stored data is not a valid document
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored document violates a block invariant
    #[error("Invalid document: {0}")]
    InvalidDocument(#[from] BlockError),
}

/// In-memory adapter
///
/// Cloning shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersistence {
    documents: Arc<RwLock<BTreeMap<String, String>>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn count(&self) -> usize {
        self.documents.read().len()
    }

    /// Raw JSON stored for a site
    pub fn raw(&self, site_id: &str) -> Option<String> {
        self.documents.read().get(site_id).cloned()
    }

    /// Store raw JSON for a site, bypassing serialization.
    pub fn insert_raw(&self, site_id: impl Into<String>, json: impl Into<String>) {
        self.documents.write().insert(site_id.into(), json.into());
    }
}

#[async_trait]
impl PersistenceService for InMemoryPersistence {
    async fn save(&self, site_id: &str, document: &DocumentSnapshot) -> Result<(), PersistenceError> {
        document.validate()?;
        let json = document.to_json()?;
        debug!(site_id, bytes = json.len(), "document stored");
        self.documents.write().insert(site_id.to_string(), json);
        Ok(())
    }

    async fn load(&self, site_id: &str) -> Result<DocumentSnapshot, PersistenceError> {
        let json = self
            .raw(site_id)
            .ok_or_else(|| PersistenceError::NotFound(site_id.to_string()))?;
        let document = DocumentSnapshot::from_json(&json)?;
        document.validate()?;
        Ok(document)
    }

    async fn delete(&self, site_id: &str) -> Result<bool, PersistenceError> {
        Ok(self.documents.write().remove(site_id).is_some())
    }

    async fn list(&self) -> Result<Vec<String>, PersistenceError> {
        Ok(self.documents.read().keys().cloned().collect())
    }
}
