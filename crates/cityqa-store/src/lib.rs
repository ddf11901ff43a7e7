//! Document storage and nearest-neighbor search.
//!
//! One facade, two backends chosen once at construction: a persistent
//! LanceDB table or an in-memory linear scan. Both serve the same query
//! contract (ascending cosine distance, at most k rows); the persistent
//! backend additionally pushes metadata-equality filters down as SQL
//! predicates.

pub mod lance;
pub mod memory;
pub mod schema;

use cityqa_core::error::{Error, Result};
use cityqa_core::types::{Document, SearchResult};
use std::path::Path;
use tracing::warn;

use lance::LanceStore;
use memory::MemoryStore;

/// A single-key metadata equality filter.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    pub key: String,
    pub value: String,
}

impl SearchFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// SQL predicate for the persistent backend. Only the materialized
    /// `source`/`category` columns can be filtered there; other keys are
    /// dropped with a warning.
    fn to_predicate(&self) -> Option<String> {
        if self.key == "source" || self.key == "category" {
            Some(format!(
                "{} = '{}'",
                self.key,
                self.value.replace('\'', "''")
            ))
        } else {
            warn!(key = %self.key, "unsupported filter key, ignoring");
            None
        }
    }
}

enum Backend {
    Lance(LanceStore),
    Memory(MemoryStore),
}

/// The document store and its search index in one value. Owns every stored
/// document; the vector index is a projection of the same rows, never a
/// second copy that can diverge.
pub struct DocumentStore {
    backend: Backend,
    collection: String,
}

impl DocumentStore {
    /// Open or create the LanceDB-backed store. An error here is how callers
    /// learn the persistent backend is unavailable; they then construct the
    /// in-memory variant for the rest of the process.
    pub async fn open_persistent(db_dir: &Path, collection: &str) -> Result<Self> {
        let store = LanceStore::open(db_dir, collection)
            .await
            .map_err(storage_error)?;
        Ok(Self {
            backend: Backend::Lance(store),
            collection: collection.to_string(),
        })
    }

    pub fn in_memory(collection: &str) -> Self {
        Self {
            backend: Backend::Memory(MemoryStore::new()),
            collection: collection.to_string(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, Backend::Lance(_))
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Lance(_) => "lancedb",
            Backend::Memory(_) => "memory",
        }
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        match &self.backend {
            Backend::Lance(store) => store.exists(id).await.map_err(storage_error),
            Backend::Memory(store) => Ok(store.exists(id)),
        }
    }

    pub async fn insert(&self, doc: Document) -> Result<()> {
        match &self.backend {
            Backend::Lance(store) => store.insert(&doc).await.map_err(storage_error),
            Backend::Memory(store) => {
                store.insert(doc);
                Ok(())
            }
        }
    }

    /// Ranked nearest neighbors for `vector`: ascending distance, at most
    /// `k` rows. On the in-memory backend the filter is a documented no-op.
    pub async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<SearchResult>> {
        match &self.backend {
            Backend::Lance(store) => store.search(vector, k, filter).await.map_err(storage_error),
            Backend::Memory(store) => Ok(store.search(vector, k, filter)),
        }
    }

    pub async fn all_documents(&self) -> Result<Vec<Document>> {
        match &self.backend {
            Backend::Lance(store) => store.all_documents().await.map_err(storage_error),
            Backend::Memory(store) => Ok(store.all_documents()),
        }
    }

    pub async fn count(&self) -> Result<usize> {
        match &self.backend {
            Backend::Lance(store) => store.count().await.map_err(storage_error),
            Backend::Memory(store) => Ok(store.count()),
        }
    }
}

fn storage_error(e: anyhow::Error) -> Error {
    Error::Storage(format!("{e:#}"))
}
