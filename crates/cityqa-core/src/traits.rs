use crate::error::Result;

/// A fallible embedding strategy. Callers wanting the never-fails guarantee
/// go through the provider in `cityqa-embed`, which wraps one of these and
/// applies the fallback policy.
pub trait TextEmbedder: Send + Sync {
    fn dim(&self) -> usize;
    fn name(&self) -> &str;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Optional external answer generation. Any error from an implementation
/// degrades to the template answer; it is never surfaced to the asker.
pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, question: &str, context: &str) -> Result<String>;
}
