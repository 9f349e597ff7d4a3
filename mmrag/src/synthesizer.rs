//! Answer synthesis over retrieved context.
//!
//! [`AnswerSynthesizer`] is the seam where a generative model would
//! plug in. The shipped [`TemplateSynthesizer`] is deterministic: a
//! small ordered set of intent heuristics plus a context-embedding
//! template, which makes the RAG path fully testable without a model
//! backend.

use async_trait::async_trait;

use crate::document::{preview, SearchResult};
use crate::error::Result;

/// Produces an answer string from a query and assembled context.
///
/// Implementations can be template-based (deterministic, the default)
/// or call out to a generative model.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Synthesize an answer for `query` given the assembled `context`
    /// string and the underlying retrieval hits.
    async fn synthesize(
        &self,
        query: &str,
        context: &str,
        sources: &[SearchResult],
    ) -> Result<String>;
}

/// Deterministic template-based synthesizer (the reference behavior).
///
/// Resolution order:
/// 1. Empty context: a fixed no-results message naming the query.
/// 2. Intent heuristics over the lowercased query (identity, greeting,
///    capability, mechanism); first match wins.
/// 3. Default: a template embedding a truncated context preview plus
///    the original query.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSynthesizer {
    context_preview_chars: usize,
}

impl TemplateSynthesizer {
    /// Create a synthesizer whose default template embeds at most
    /// `context_preview_chars` characters of context.
    pub fn new(context_preview_chars: usize) -> Self {
        Self { context_preview_chars }
    }
}

impl Default for TemplateSynthesizer {
    fn default() -> Self {
        Self::new(300)
    }
}

/// True when the lowercased query opens with a greeting token.
fn is_greeting(query: &str) -> bool {
    let first = query.split_whitespace().next().unwrap_or("");
    let first = first.trim_end_matches(['!', ',', '.', '?']);
    matches!(first, "hello" | "hi" | "hey")
}

#[async_trait]
impl AnswerSynthesizer for TemplateSynthesizer {
    async fn synthesize(
        &self,
        query: &str,
        context: &str,
        _sources: &[SearchResult],
    ) -> Result<String> {
        if context.trim().is_empty() {
            return Ok(format!(
                "I couldn't find any relevant information for '{query}' in the knowledge base. \
                 Try adding documents first or rephrasing the question."
            ));
        }

        let lowered = query.to_lowercase();

        if lowered.contains("who are you") || lowered.contains("what are you") {
            return Ok("I'm a multimodal retrieval assistant. I answer questions by searching \
                       a knowledge base of text and image documents and composing a response \
                       from the most relevant matches."
                .to_string());
        }
        if is_greeting(&lowered) {
            return Ok("Hello! Ask me about anything stored in the knowledge base and I'll \
                       retrieve the most relevant documents for you."
                .to_string());
        }
        if lowered.contains("what can you do") || lowered.contains("help me") {
            return Ok("I can ingest text and image documents, generate embeddings for them, \
                       search the knowledge base by text or image similarity, and answer \
                       questions from the retrieved context."
                .to_string());
        }
        if lowered.contains("how does this work") || lowered.contains("how do you work") {
            return Ok("Inputs are converted to vector embeddings, fused across modalities, \
                       and matched against stored documents by similarity. The closest \
                       matches become the context for the answer."
                .to_string());
        }

        let context_preview = preview(context, self.context_preview_chars);
        Ok(format!(
            "Based on the retrieved context:\n\n{context_preview}\n\n\
             This is the most relevant stored information for '{query}'."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn synth(query: &str, context: &str) -> String {
        TemplateSynthesizer::default().synthesize(query, context, &[]).await.unwrap()
    }

    #[tokio::test]
    async fn empty_context_names_the_query() {
        let answer = synth("quantum gravity", "   ").await;
        assert!(answer.contains("quantum gravity"));
        assert!(answer.contains("couldn't find"));
    }

    #[tokio::test]
    async fn identity_heuristic_wins_over_default() {
        let answer = synth("So, who are you exactly?", "Source 1 (text): something").await;
        assert!(answer.contains("retrieval assistant"));
    }

    #[tokio::test]
    async fn greeting_matches_leading_token_only() {
        let answer = synth("Hello there", "Source 1 (text): something").await;
        assert!(answer.starts_with("Hello!"));

        // "hi" embedded inside another word is not a greeting
        let answer = synth("higgs boson mass", "Source 1 (text): something").await;
        assert!(answer.contains("Based on the retrieved context"));
    }

    #[tokio::test]
    async fn capability_and_mechanism_heuristics() {
        let answer = synth("what can you do?", "Source 1 (text): x").await;
        assert!(answer.contains("ingest"));

        let answer = synth("how does this work", "Source 1 (text): x").await;
        assert!(answer.contains("vector embeddings"));
    }

    #[tokio::test]
    async fn default_template_truncates_context() {
        let context = "c".repeat(1000);
        let answer = synth("tell me about c", &context).await;
        assert!(answer.contains(&format!("{}...", "c".repeat(300))));
        assert!(!answer.contains(&"c".repeat(301)));
        assert!(answer.contains("tell me about c"));
    }
}
