//! Answer synthesis from ranked retrieval results.
//!
//! Pure formatting: no side effects beyond a warning log when a configured
//! generator fails and the template takes over.

use cityqa_core::traits::AnswerGenerator;
use cityqa_core::types::SearchResult;
use std::fmt::Write;
use tracing::warn;

/// Returned whenever there is no retrieved context to answer from.
pub const INSUFFICIENT_INFO: &str =
    "I don't have enough information to answer your question about Revere.";

/// First line of every template answer.
pub const ANSWER_HEADER: &str = "Based on the Revere City knowledge base:";

/// Documents fed to the generator as context and listed in the footer.
const CONTEXT_DOCS: usize = 3;
/// Documents enumerated in the template body.
const LISTED_DOCS: usize = 2;
/// Per-document preview length, in characters.
const PREVIEW_CHARS: usize = 200;

/// Compose an answer for `question` from `ranked` retrieval results.
///
/// Empty context short-circuits to [`INSUFFICIENT_INFO`]; generation is
/// never attempted without retrieved text. When a generator is supplied it
/// gets the top-3 contents as a blank-line-separated context, and any error
/// from it falls through to the template path.
pub fn synthesize(
    question: &str,
    ranked: &[SearchResult],
    generator: Option<&dyn AnswerGenerator>,
) -> String {
    if ranked.is_empty() {
        return INSUFFICIENT_INFO.to_string();
    }

    if let Some(generator) = generator {
        let context = ranked
            .iter()
            .take(CONTEXT_DOCS)
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        match generator.generate(question, &context) {
            Ok(answer) => return answer,
            Err(e) => warn!(error = %e, "generation failed, using template answer"),
        }
    }

    template_answer(ranked)
}

/// Fixed header, top-2 content previews, deduplicated source footer.
fn template_answer(ranked: &[SearchResult]) -> String {
    let mut answer = format!("{ANSWER_HEADER}\n\n");

    for (i, doc) in ranked.iter().take(LISTED_DOCS).enumerate() {
        let preview: String = doc.content.chars().take(PREVIEW_CHARS).collect();
        let _ = writeln!(answer, "{}. {}...\n", i + 1, preview);
    }

    // First-seen order, deduplicated
    let mut sources: Vec<&str> = Vec::new();
    for doc in ranked.iter().take(CONTEXT_DOCS) {
        let source = doc.source();
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    let _ = write!(answer, "Sources: {}", sources.join(", "));

    answer
}
