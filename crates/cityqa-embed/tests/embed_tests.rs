use cityqa_core::error::{Error, Result};
use cityqa_core::traits::TextEmbedder;
use cityqa_embed::hashed::HashedEmbedder;
use cityqa_embed::{EmbeddingProvider, DEFAULT_DIMENSION, FALLBACK_MODEL_NAME};

#[test]
fn hashed_embedder_shapes_and_determinism() {
    let embedder = HashedEmbedder::new(DEFAULT_DIMENSION);

    let v1 = embedder.embed("hello world");
    let v2 = embedder.embed("hello world");
    let other = embedder.embed("goodbye world");

    assert_eq!(v1.len(), 384, "embedding dim is 384");
    assert_eq!(v1, v2, "same text embeds identically");
    assert_ne!(v1, other, "different texts embed differently");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
}

#[test]
fn provider_without_model_is_total() {
    let provider = EmbeddingProvider::fallback_only(DEFAULT_DIMENSION);

    assert!(!provider.has_model());
    assert_eq!(provider.dim(), DEFAULT_DIMENSION);
    assert_eq!(provider.model_name(), FALLBACK_MODEL_NAME);

    let v = provider.embed("where is city hall?");
    assert_eq!(v.len(), DEFAULT_DIMENSION);
    // Empty input is still embeddable
    assert_eq!(provider.embed("").len(), DEFAULT_DIMENSION);
}

struct FailingEmbedder;

impl TextEmbedder for FailingEmbedder {
    fn dim(&self) -> usize {
        8
    }
    fn name(&self) -> &str {
        "failing"
    }
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::Embedding("encoder offline".to_string()))
    }
}

#[test]
fn provider_degrades_per_call_when_primary_fails() {
    let provider = EmbeddingProvider::with_primary(Box::new(FailingEmbedder));

    assert!(provider.has_model());
    assert_eq!(provider.dim(), 8, "fallback adopts the primary's dimension");

    let degraded = provider.embed("any text");
    assert_eq!(
        degraded,
        HashedEmbedder::new(8).embed("any text"),
        "failed primary degrades to the hashed vector"
    );
}

struct ConstEmbedder {
    vector: Vec<f32>,
}

impl TextEmbedder for ConstEmbedder {
    fn dim(&self) -> usize {
        self.vector.len()
    }
    fn name(&self) -> &str {
        "const"
    }
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.vector.clone())
    }
}

#[test]
fn provider_prefers_primary_when_it_succeeds() {
    let provider = EmbeddingProvider::with_primary(Box::new(ConstEmbedder {
        vector: vec![1.0, 0.0, 0.0, 0.0],
    }));

    assert_eq!(provider.model_name(), "const");
    assert_eq!(provider.embed("anything"), vec![1.0, 0.0, 0.0, 0.0]);
}

#[test]
fn detect_honors_hash_override() {
    std::env::set_var("APP_USE_HASH_EMBEDDINGS", "1");

    let provider = EmbeddingProvider::detect(None, "all-MiniLM-L6-v2", DEFAULT_DIMENSION);
    assert!(!provider.has_model());
    assert_eq!(provider.embed("blue line schedule").len(), DEFAULT_DIMENSION);
}
