//! Domain types shared by the embedding, store, and retrieval crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

pub type DocId = String;
pub type Metadata = HashMap<String, Value>;

/// Derive the content-addressed id for a document body.
///
/// Identical content always hashes to the same id, which is what makes
/// re-ingestion of the same text a no-op.
pub fn content_id(content: &str) -> DocId {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// A stored passage of text.
///
/// - `id`: content-addressed (see [`content_id`])
/// - `metadata`: open key set; ingestion appends `added_at` and `char_count`
/// - `embedding`: fixed dimension per deployment (default 384)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub content: String,
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Build a document from caller content and metadata. The ingestion
    /// fields `added_at` and `char_count` are appended here, never supplied
    /// by the caller.
    pub fn new(content: String, mut metadata: Metadata, embedding: Vec<f32>) -> Self {
        let now = Utc::now();
        metadata.insert("added_at".to_string(), Value::from(now.to_rfc3339()));
        metadata.insert("char_count".to_string(), Value::from(content.chars().count()));
        Self {
            id: content_id(&content),
            content,
            metadata,
            embedding,
            created_at: now,
        }
    }
}

/// One ranked retrieval hit.
///
/// `distance` is cosine distance (`1 - cosine_similarity`), in `[0, 2]`;
/// lower is more relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: DocId,
    pub content: String,
    pub metadata: Metadata,
    pub distance: f32,
}

impl SearchResult {
    /// The `source` metadata field, or `"unknown"` when absent.
    pub fn source(&self) -> &str {
        self.metadata
            .get("source")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }
}

/// The structure returned by `ask`: the answer plus the exact ranked
/// sources it was synthesized from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SearchResult>,
    pub timestamp: DateTime<Utc>,
    pub method: String,
}

/// Which optional collaborators were actually available at startup.
/// Detected once and fixed for the process lifetime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capabilities {
    pub model_embedding: bool,
    pub persistent_store: bool,
    pub external_generation: bool,
}

/// Read-only aggregate over the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub total_documents: usize,
    pub collection_name: String,
    pub embedding_model: String,
    pub backend_name: String,
    pub categories: BTreeMap<String, usize>,
}
