//! Embedding strategies and the startup selection policy.
//!
//! Two strategies exist: a model-backed sentence embedder and a hashed
//! deterministic fallback. One is chosen when the provider is built and the
//! choice holds for the process lifetime. The provider's `embed` is total:
//! per-call model failures degrade to the fallback vector instead of
//! surfacing an error.

pub mod hashed;
pub mod model;

use cityqa_core::traits::TextEmbedder;
use hashed::HashedEmbedder;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_DIMENSION: usize = 384;
pub const FALLBACK_MODEL_NAME: &str = "hashed-fallback";

pub struct EmbeddingProvider {
    primary: Option<Box<dyn TextEmbedder>>,
    fallback: HashedEmbedder,
    model_name: String,
}

impl EmbeddingProvider {
    /// Select a strategy once: the sentence model when it loads, the hashed
    /// fallback otherwise. `APP_USE_HASH_EMBEDDINGS=1` skips the model
    /// entirely, which keeps tests and offline runs fast.
    pub fn detect(model_dir: Option<&Path>, model_name: &str, dimension: usize) -> Self {
        if hash_embeddings_forced() {
            info!("hashed embeddings forced by APP_USE_HASH_EMBEDDINGS");
            return Self::fallback_only(dimension);
        }
        let Some(dir) = model_dir else {
            warn!("no embedding model directory configured, using hashed fallback");
            return Self::fallback_only(dimension);
        };
        match model::SentenceEmbedder::load(dir, model_name) {
            Ok(embedder) => {
                info!(
                    model = model_name,
                    dim = embedder.dim(),
                    "loaded sentence embedding model"
                );
                Self::with_primary(Box::new(embedder))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "embedding model unavailable, hashed fallback for the process lifetime"
                );
                Self::fallback_only(dimension)
            }
        }
    }

    pub fn with_primary(primary: Box<dyn TextEmbedder>) -> Self {
        let dim = primary.dim();
        let model_name = primary.name().to_string();
        Self {
            primary: Some(primary),
            fallback: HashedEmbedder::new(dim),
            model_name,
        }
    }

    pub fn fallback_only(dimension: usize) -> Self {
        Self {
            primary: None,
            fallback: HashedEmbedder::new(dimension),
            model_name: FALLBACK_MODEL_NAME.to_string(),
        }
    }

    pub fn has_model(&self) -> bool {
        self.primary.is_some()
    }

    /// The fallback is always built with the primary's dimension, so this is
    /// the dimension of every vector the provider returns.
    pub fn dim(&self) -> usize {
        self.fallback.dim()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Embed text. Never fails: a primary error degrades to the hashed
    /// vector for that call.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        if let Some(primary) = &self.primary {
            match primary.embed(text) {
                Ok(vector) => return vector,
                Err(e) => warn!(error = %e, "embedding degraded to hashed fallback"),
            }
        }
        self.fallback.embed(text)
    }
}

fn hash_embeddings_forced() -> bool {
    std::env::var("APP_USE_HASH_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
