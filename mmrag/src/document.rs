//! Data types for documents, search results, and RAG answers.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which modalities contributed to a stored or queried embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// Only text contributed.
    Text,
    /// Only an image contributed.
    Image,
    /// Both a text and an image contributed.
    Multimodal,
}

impl MediaType {
    /// The canonical string form used in stored metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Text => "text",
            MediaType::Image => "image",
            MediaType::Multimodal => "multimodal",
        }
    }

    /// Parse the canonical string form. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(MediaType::Text),
            "image" => Some(MediaType::Image),
            "multimodal" => Some(MediaType::Multimodal),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored unit of knowledge.
///
/// Created once via the ingestion path and never mutated afterwards.
/// For image-only documents `content` holds a caption or placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier, generated at insertion time.
    pub id: String,
    /// The original text content.
    pub content: String,
    /// Which modalities contributed to `embedding`.
    pub media_type: MediaType,
    /// The fused, L2-normalized embedding vector.
    pub embedding: Vec<f32>,
    /// Scalar key-value metadata (creation timestamp, content preview,
    /// caller-supplied tags).
    pub metadata: HashMap<String, Value>,
}

/// A ranked hit from the retrieval path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Identifier of the matched document.
    pub id: String,
    /// The matched document's text content.
    pub content: String,
    /// Which modalities contributed to the matched document's embedding.
    pub media_type: MediaType,
    /// Similarity in approximately `[-1, 1]`; `1.0` means identical.
    pub similarity_score: f32,
    /// The matched document's metadata.
    pub metadata: HashMap<String, Value>,
}

/// The response shape of the RAG path: answer text, the retrieved
/// sources it was built from, and wall-clock timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    /// The synthesized answer text.
    pub answer: String,
    /// The retrieval hits the answer was built from, best first.
    pub sources: Vec<SearchResult>,
    /// Wall-clock seconds spent on retrieval plus synthesis.
    pub processing_time: f64,
}

/// Truncate `text` to at most `max_chars` characters, appending `"..."`
/// when anything was cut. Operates on char boundaries.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_text_unchanged() {
        assert_eq!(preview("hello", 100), "hello");
    }

    #[test]
    fn preview_truncates_with_ellipsis() {
        let long = "a".repeat(150);
        let p = preview(&long, 100);
        assert_eq!(p.len(), 103);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let text = "é".repeat(10);
        let p = preview(&text, 5);
        assert_eq!(p, format!("{}...", "é".repeat(5)));
    }

    #[test]
    fn media_type_round_trips_through_str() {
        for mt in [MediaType::Text, MediaType::Image, MediaType::Multimodal] {
            assert_eq!(MediaType::parse(mt.as_str()), Some(mt));
        }
        assert_eq!(MediaType::parse("video"), None);
    }
}
