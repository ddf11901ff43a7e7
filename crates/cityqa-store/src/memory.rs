//! In-memory fallback store: a linear cosine scan over a guarded Vec.

use cityqa_core::types::{Document, SearchResult};
use parking_lot::RwLock;

use crate::SearchFilter;

#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, id: &str) -> bool {
        self.docs.read().iter().any(|d| d.id == id)
    }

    pub fn insert(&self, doc: Document) {
        self.docs.write().push(doc);
    }

    /// Linear scan over every stored document. The filter parameter is
    /// accepted for interface parity and ignored: this backend does not
    /// implement metadata filtering.
    pub fn search(
        &self,
        vector: &[f32],
        k: usize,
        _filter: Option<&SearchFilter>,
    ) -> Vec<SearchResult> {
        let docs = self.docs.read();
        let mut results: Vec<SearchResult> = docs
            .iter()
            .map(|doc| SearchResult {
                id: doc.id.clone(),
                content: doc.content.clone(),
                metadata: doc.metadata.clone(),
                distance: 1.0 - cosine_similarity(vector, &doc.embedding),
            })
            .collect();
        // Stable sort: equal distances keep insertion order
        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        results
    }

    pub fn all_documents(&self) -> Vec<Document> {
        self.docs.read().clone()
    }

    pub fn count(&self) -> usize {
        self.docs.read().len()
    }
}

/// Cosine similarity, defined as 0 when either vector has zero norm or the
/// lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
