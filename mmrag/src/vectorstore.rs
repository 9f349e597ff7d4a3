//! Vector store trait: persistence and nearest-neighbor query over
//! fused embeddings.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A raw nearest-neighbor hit as returned by a store backend.
///
/// `distance` is the backend's L2 distance; the pipeline converts it to
/// a similarity score. For unit vectors the distance range is `[0, 2]`.
#[derive(Debug, Clone)]
pub struct StoredHit {
    /// Identifier of the stored document.
    pub id: String,
    /// The stored document text.
    pub content: String,
    /// The stored document metadata.
    pub metadata: HashMap<String, Value>,
    /// L2 distance from the query vector (lower is closer).
    pub distance: f32,
}

/// A storage backend holding one logical collection of documents with
/// similarity search by vector.
///
/// Every store declares a fixed dimensionality at construction;
/// [`insert`](VectorStore::insert) and [`query`](VectorStore::query)
/// reject vectors of any other length with
/// [`MmError::InvalidInput`](crate::MmError::InvalidInput) rather than
/// producing meaningless similarity scores.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The dimensionality this store accepts.
    fn dimensions(&self) -> usize;

    /// Insert a document. Re-inserting an existing `id` overwrites the
    /// stored document (upsert); callers must not rely on duplicate-skip.
    ///
    /// Backends may constrain the id format: the Qdrant backend accepts
    /// only UUID strings or unsigned integers as point ids. The pipeline
    /// always generates UUID ids.
    ///
    /// # Errors
    ///
    /// [`MmError::InvalidInput`](crate::MmError::InvalidInput) on
    /// dimension mismatch;
    /// [`MmError::StoreUnavailable`](crate::MmError::StoreUnavailable)
    /// when the backend cannot be reached.
    async fn insert(
        &self,
        id: &str,
        vector: &[f32],
        content: &str,
        metadata: HashMap<String, Value>,
    ) -> Result<()>;

    /// Return up to `k` stored documents nearest to `vector`, ordered
    /// by ascending L2 distance.
    ///
    /// Returns fewer than `k` hits when the store holds fewer documents
    /// and an empty vec (never an error) on an empty store.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<StoredHit>>;

    /// The number of documents currently stored.
    async fn count(&self) -> Result<usize>;
}
