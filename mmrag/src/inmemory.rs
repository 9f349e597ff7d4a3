//! In-memory vector store using exact L2 distance.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is
//! suitable for development, testing, and small collections; larger
//! deployments should use the `qdrant` feature's persistent backend.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::document::{Document, MediaType};
use crate::error::{MmError, Result};
use crate::vectorstore::{StoredHit, VectorStore};

/// An in-memory vector store with a fixed dimensionality.
///
/// # Example
///
/// ```rust,ignore
/// use mmrag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new(384);
/// store.insert("doc-1", &embedding, "some text", metadata).await?;
/// let hits = store.query(&query_embedding, 5).await?;
/// ```
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dimensions: usize,
    documents: RwLock<HashMap<String, Document>>,
}

impl InMemoryVectorStore {
    /// Create a new empty store accepting vectors of length `dimensions`.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, documents: RwLock::new(HashMap::new()) }
    }

    /// Return a stored document by id, if present.
    pub async fn get(&self, id: &str) -> Option<Document> {
        self.documents.read().await.get(id).cloned()
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(MmError::InvalidInput(format!(
                "vector has {} dimensions, store expects {}",
                vector.len(),
                self.dimensions
            )));
        }
        Ok(())
    }
}

/// Compute the L2 (Euclidean) distance between two vectors of equal length.
fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn insert(
        &self,
        id: &str,
        vector: &[f32],
        content: &str,
        metadata: HashMap<String, Value>,
    ) -> Result<()> {
        self.check_dimensions(vector)?;
        let media_type = metadata
            .get("media_type")
            .and_then(Value::as_str)
            .and_then(MediaType::parse)
            .unwrap_or(MediaType::Text);
        let mut documents = self.documents.write().await;
        documents.insert(
            id.to_string(),
            Document {
                id: id.to_string(),
                content: content.to_string(),
                media_type,
                embedding: vector.to_vec(),
                metadata,
            },
        );
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<StoredHit>> {
        self.check_dimensions(vector)?;
        let documents = self.documents.read().await;

        let mut hits: Vec<StoredHit> = documents
            .values()
            .map(|document| StoredHit {
                id: document.id.clone(),
                content: document.content.clone(),
                metadata: document.metadata.clone(),
                distance: l2_distance(&document.embedding, vector),
            })
            .collect();

        // Stable sort keeps the collected order for equal distances.
        hits.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.read().await.len())
    }
}
