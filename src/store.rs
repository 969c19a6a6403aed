//! Narrow document-store surface consumed by the policy layer, plus an
//! in-memory implementation backing tests and embedding hosts.
//!
//! Reads are point-in-time snapshots; this layer does not serialize against
//! concurrent writers, and commit atomicity belongs to the host store.

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::access::Filter;
use crate::doc::{relation_id, Data, Document};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("store backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Default)]
pub struct FindResult {
    pub docs: Vec<Document>,
    /// Total matching count, independent of `limit`.
    pub total_docs: usize,
}

/// Read surface the policy layer needs from the host's document store.
pub trait DocumentStore {
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<FindResult, StoreError>;

    fn find_by_id(&self, collection: &str, id: &str) -> Result<Document, StoreError>;
}

/// Filter-aware in-memory store. Iteration order is insertion order.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, generating an id when the payload carries none.
    pub fn insert(&self, collection: &str, mut data: Data) -> Document {
        let id = data
            .remove("id")
            .as_ref()
            .and_then(relation_id)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let doc = Document::new(id, data);
        self.collections.write().entry(collection.to_string()).or_default().push(doc.clone());
        doc
    }

    /// Replace the data of an existing document. Returns the new state.
    pub fn update(&self, collection: &str, id: &str, data: Data) -> Result<Document, StoreError> {
        let mut map = self.collections.write();
        let docs = map.get_mut(collection).ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;
        for doc in docs.iter_mut() {
            if doc.id == id {
                doc.data = data;
                return Ok(doc.clone());
            }
        }
        Err(StoreError::NotFound { collection: collection.to_string(), id: id.to_string() })
    }

    pub fn count(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map(|d| d.len()).unwrap_or(0)
    }
}

impl DocumentStore for MemoryStore {
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<FindResult, StoreError> {
        let map = self.collections.read();
        let matching: Vec<Document> = map
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();
        let total_docs = matching.len();
        let docs = matching.into_iter().take(limit).collect();
        Ok(FindResult { docs, total_docs })
    }

    fn find_by_id(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        let map = self.collections.read();
        map.get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }
}
