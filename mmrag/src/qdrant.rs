//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`], a persistent [`VectorStore`] over the
//! [qdrant-client](https://docs.rs/qdrant-client) gRPC API. Only
//! available when the `qdrant` feature is enabled.
//!
//! The collection is created with Euclid distance so Qdrant's returned
//! scores are L2 distances, matching the trait's query contract.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;

use crate::error::{MmError, Result};
use crate::vectorstore::{StoredHit, VectorStore};

/// A persistent [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// Wraps one Qdrant collection with a fixed dimensionality. Document
/// content and metadata are stored as point payload.
///
/// # Example
///
/// ```rust,ignore
/// use mmrag::qdrant::QdrantVectorStore;
///
/// let store = QdrantVectorStore::connect("http://localhost:6334", "documents", 384).await?;
/// store.insert(&id, &embedding, "some text", metadata).await?;
/// let hits = store.query(&query_embedding, 5).await?;
/// ```
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimensions: usize,
}

impl QdrantVectorStore {
    /// Connect to a Qdrant instance and ensure `collection` exists with
    /// Euclid distance and the given dimensionality.
    pub async fn connect(url: &str, collection: &str, dimensions: usize) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;

        let collections = client.list_collections().await.map_err(Self::map_err)?;
        let exists = collections.collections.iter().any(|c| c.name == collection);
        if exists {
            debug!(collection, "qdrant collection already exists, skipping creation");
        } else {
            client
                .create_collection(
                    CreateCollectionBuilder::new(collection).vectors_config(
                        VectorParamsBuilder::new(dimensions as u64, Distance::Euclid),
                    ),
                )
                .await
                .map_err(Self::map_err)?;
            debug!(collection, dimensions, "created qdrant collection");
        }

        Ok(Self { client, collection: collection.to_string(), dimensions })
    }

    fn map_err(e: qdrant_client::QdrantError) -> MmError {
        MmError::StoreUnavailable { backend: "qdrant".to_string(), message: e.to_string() }
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(MmError::InvalidInput(format!(
                "vector has {} dimensions, collection '{}' expects {}",
                vector.len(),
                self.collection,
                self.dimensions
            )));
        }
        Ok(())
    }

    /// Convert a Qdrant payload value to a JSON scalar, where possible.
    fn to_json_scalar(value: &QdrantValue) -> Option<serde_json::Value> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(serde_json::Value::String(s.clone())),
            Some(Kind::IntegerValue(n)) => Some(serde_json::Value::from(*n)),
            Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(*d).map(Into::into),
            Some(Kind::BoolValue(b)) => Some(serde_json::Value::Bool(*b)),
            _ => None,
        }
    }

    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn insert(
        &self,
        id: &str,
        vector: &[f32],
        content: &str,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        self.check_dimensions(vector)?;

        let mut payload_map = serde_json::Map::new();
        payload_map.insert("content".to_string(), serde_json::Value::String(content.to_string()));
        payload_map.insert(
            "metadata".to_string(),
            serde_json::Value::Object(metadata.into_iter().collect()),
        );
        let payload =
            Payload::try_from(serde_json::Value::Object(payload_map)).map_err(Self::map_err)?;

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(
                    &self.collection,
                    vec![PointStruct::new(id.to_string(), vector.to_vec(), payload)],
                )
                .wait(true),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, document.id = id, "upserted document to qdrant");
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<StoredHit>> {
        self.check_dimensions(vector)?;

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector.to_vec(), k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let hits = response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .id
                    .as_ref()
                    .and_then(|pid| match &pid.point_id_options {
                        Some(PointIdOptions::Uuid(s)) => Some(s.clone()),
                        Some(PointIdOptions::Num(n)) => Some(n.to_string()),
                        None => None,
                    })
                    .unwrap_or_default();

                let content = scored
                    .payload
                    .get("content")
                    .and_then(Self::extract_string)
                    .unwrap_or_default();

                let metadata: HashMap<String, serde_json::Value> = scored
                    .payload
                    .get("metadata")
                    .and_then(|v| match &v.kind {
                        Some(Kind::StructValue(s)) => Some(
                            s.fields
                                .iter()
                                .filter_map(|(k, v)| {
                                    Self::to_json_scalar(v).map(|value| (k.clone(), value))
                                })
                                .collect(),
                        ),
                        _ => None,
                    })
                    .unwrap_or_default();

                // Euclid collections return the L2 distance as the score.
                StoredHit { id, content, metadata, distance: scored.score }
            })
            .collect();

        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(Self::map_err)?;
        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }
}
