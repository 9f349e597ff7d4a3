//! Property and behavior tests for the in-memory vector store.

use std::collections::HashMap;

use mmrag::error::MmError;
use mmrag::inmemory::InMemoryVectorStore;
use mmrag::vectorstore::VectorStore;
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

/// For any set of stored vectors, querying returns hits ordered by
/// ascending L2 distance, bounded by both `k` and the stored count.
mod prop_query_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn hits_ascending_and_bounded(
            embeddings in proptest::collection::vec(arb_normalized_embedding(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (hits, stored) = rt.block_on(async {
                let store = InMemoryVectorStore::new(DIM);
                for (i, embedding) in embeddings.iter().enumerate() {
                    store
                        .insert(&format!("doc-{i}"), embedding, "text", HashMap::new())
                        .await
                        .unwrap();
                }
                let hits = store.query(&query, k).await.unwrap();
                (hits, embeddings.len())
            });

            prop_assert!(hits.len() <= k);
            prop_assert!(hits.len() <= stored);

            for window in hits.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "hits not in ascending distance order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }

            // Normalized vectors sit within the theoretical [0, 2] range.
            for hit in &hits {
                prop_assert!(hit.distance >= 0.0 && hit.distance <= 2.0 + 1e-4);
            }
        }
    }
}

#[tokio::test]
async fn empty_store_returns_empty_not_error() {
    let store = InMemoryVectorStore::new(4);
    let hits = store.query(&[1.0, 0.0, 0.0, 0.0], 5).await.unwrap();
    assert!(hits.is_empty());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn insert_overwrites_existing_id() {
    let store = InMemoryVectorStore::new(2);
    store.insert("doc-1", &[1.0, 0.0], "first", HashMap::new()).await.unwrap();
    store.insert("doc-1", &[0.0, 1.0], "second", HashMap::new()).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
    let hits = store.query(&[0.0, 1.0], 1).await.unwrap();
    assert_eq!(hits[0].content, "second");
    assert!(hits[0].distance < 1e-6);
}

#[tokio::test]
async fn get_returns_stored_document_with_parsed_media_type() {
    let store = InMemoryVectorStore::new(2);
    let mut metadata = HashMap::new();
    metadata.insert("media_type".to_string(), serde_json::json!("multimodal"));
    store.insert("doc-1", &[1.0, 0.0], "caption", metadata).await.unwrap();

    let document = store.get("doc-1").await.unwrap();
    assert_eq!(document.media_type, mmrag::MediaType::Multimodal);
    assert_eq!(document.embedding, vec![1.0, 0.0]);
    assert!(store.get("missing").await.is_none());
}

#[tokio::test]
async fn insert_rejects_dimension_mismatch() {
    let store = InMemoryVectorStore::new(4);
    let err = store.insert("doc-1", &[1.0, 0.0], "text", HashMap::new()).await.unwrap_err();
    assert!(matches!(err, MmError::InvalidInput(_)));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn query_rejects_dimension_mismatch() {
    let store = InMemoryVectorStore::new(4);
    let err = store.query(&[1.0, 0.0], 5).await.unwrap_err();
    assert!(matches!(err, MmError::InvalidInput(_)));
}

#[tokio::test]
async fn nearest_neighbor_comes_back_first() {
    let store = InMemoryVectorStore::new(3);
    store.insert("near", &[1.0, 0.0, 0.0], "near", HashMap::new()).await.unwrap();
    store.insert("far", &[0.0, 0.0, 1.0], "far", HashMap::new()).await.unwrap();

    let hits = store.query(&[0.99, 0.14, 0.0], 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "near");
    assert_eq!(hits[1].id, "far");
}
