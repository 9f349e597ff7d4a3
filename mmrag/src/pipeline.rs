//! Pipeline orchestrator for the multimodal retrieval service.
//!
//! The [`MultimodalPipeline`] composes the encoders, the embedding
//! fusion, a [`VectorStore`], and an [`AnswerSynthesizer`] into the
//! four request-level operations: embedding generation, document
//! ingestion, hybrid search, and RAG answering.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mmrag::{MultimodalPipeline, PipelineConfig, InMemoryVectorStore};
//!
//! let pipeline = MultimodalPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .text_encoder(Arc::new(my_text_encoder))
//!     .image_encoder(Arc::new(my_image_encoder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new(384)))
//!     .build()?;
//!
//! let id = pipeline.ingest("A red apple on a table", None, HashMap::new()).await?;
//! let results = pipeline.search(Some("apple"), None, 5).await?;
//! let answer = pipeline.answer("what fruit is on the table?", &[], 3).await?;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::document::{preview, MediaType, RagAnswer, SearchResult};
use crate::encoder::{ImageEncoder, TextEncoder};
use crate::error::{MmError, Result};
use crate::fusion::{self, FusedEmbedding};
use crate::synthesizer::{AnswerSynthesizer, TemplateSynthesizer};
use crate::vectorstore::VectorStore;

/// One item of a batch embedding request.
#[derive(Debug, Clone, Default)]
pub struct EmbedItem {
    /// Optional text input.
    pub text: Option<String>,
    /// Optional raw image bytes.
    pub image: Option<Vec<u8>>,
}

/// The multimodal retrieval pipeline.
///
/// All collaborators are injected at construction and shared read-only
/// across concurrent requests; the vector store is the only shared
/// mutable resource and is internally synchronized. Construct one via
/// [`MultimodalPipeline::builder()`].
pub struct MultimodalPipeline {
    config: PipelineConfig,
    text_encoder: Arc<dyn TextEncoder>,
    image_encoder: Arc<dyn ImageEncoder>,
    vector_store: Arc<dyn VectorStore>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
}

impl std::fmt::Debug for MultimodalPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultimodalPipeline").field("config", &self.config).finish_non_exhaustive()
    }
}

impl MultimodalPipeline {
    /// Create a new [`MultimodalPipelineBuilder`].
    pub fn builder() -> MultimodalPipelineBuilder {
        MultimodalPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Run `fut` under the configured per-request deadline, if any.
    async fn with_deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                MmError::Pipeline(format!("request deadline of {limit:?} exceeded"))
            })?,
            None => fut.await,
        }
    }

    /// Generate a fused embedding for text and/or image input.
    ///
    /// An image that fails to decode or encode degrades to "no image
    /// contribution" (logged) when text is also present; when the image
    /// was the only modality the failure is fatal.
    ///
    /// # Errors
    ///
    /// - [`MmError::InvalidInput`] when neither input is provided.
    /// - [`MmError::Encoding`] when the text encoder fails, or when an
    ///   image-only input cannot produce a vector.
    pub async fn embed(
        &self,
        text: Option<&str>,
        image: Option<&[u8]>,
    ) -> Result<FusedEmbedding> {
        if text.is_none() && image.is_none() {
            return Err(MmError::InvalidInput(
                "at least one of text or image must be provided".to_string(),
            ));
        }

        let text_vector = match text {
            Some(t) => {
                let vector =
                    self.with_deadline(self.text_encoder.encode(t)).await.inspect_err(|e| {
                        error!(error = %e, "text encoding failed");
                    })?;
                Some(vector)
            }
            None => None,
        };

        let image_vector = match image {
            Some(bytes) => match self.with_deadline(self.image_encoder.encode(bytes)).await {
                Ok(Some(vector)) => Some(vector),
                Ok(None) => {
                    if text_vector.is_none() {
                        return Err(MmError::Encoding {
                            modality: "image".to_string(),
                            message: "image bytes could not be decoded".to_string(),
                        });
                    }
                    warn!("image could not be decoded, continuing with text only");
                    None
                }
                Err(e) => {
                    if text_vector.is_none() {
                        error!(error = %e, "image encoding failed");
                        return Err(e);
                    }
                    warn!(error = %e, "image encoding failed, continuing with text only");
                    None
                }
            },
            None => None,
        };

        fusion::fuse(text_vector, image_vector)
    }

    /// Generate fused embeddings for a batch of items.
    ///
    /// Per-item failures do not abort the batch; each failed slot
    /// carries its own error. The output always has the input's length.
    pub async fn embed_batch(&self, items: &[EmbedItem]) -> Vec<Result<FusedEmbedding>> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let result = self.embed(item.text.as_deref(), item.image.as_deref()).await;
            if let Err(e) = &result {
                warn!(error = %e, "batch embedding item failed");
            }
            results.push(result);
        }
        results
    }

    /// Ingest a document: embed → generate id → build metadata → store.
    ///
    /// Standard metadata (`media_type`, `created_at`, `content_preview`)
    /// is merged with `tags`; caller tags win on key collision. Returns
    /// the generated document id. All-or-nothing: the first failure
    /// propagates and nothing is stored.
    pub async fn ingest(
        &self,
        content: &str,
        image: Option<&[u8]>,
        tags: HashMap<String, Value>,
    ) -> Result<String> {
        let fused = self.embed(Some(content), image).await?;
        let id = Uuid::new_v4().to_string();

        let mut metadata: HashMap<String, Value> = HashMap::new();
        metadata.insert("media_type".to_string(), json!(fused.media_type.as_str()));
        metadata.insert("created_at".to_string(), json!(Utc::now().to_rfc3339()));
        metadata.insert(
            "content_preview".to_string(),
            json!(preview(content, self.config.content_preview_chars)),
        );
        metadata.extend(tags);

        self.with_deadline(self.vector_store.insert(&id, &fused.vector, content, metadata))
            .await
            .inspect_err(|e| {
                error!(document.id = %id, error = %e, "insert failed during ingestion");
            })?;

        info!(document.id = %id, media_type = %fused.media_type, "ingested document");
        Ok(id)
    }

    /// Hybrid search over the store with text and/or image input.
    ///
    /// Produces a fused query vector, queries the store, and converts
    /// each hit's L2 distance to a similarity score via `1 - d/2`
    /// (valid for unit vectors). The store's ascending-distance order
    /// is preserved, so results come back descending by similarity.
    /// A hit whose metadata omits `media_type` defaults to
    /// [`MediaType::Text`].
    ///
    /// # Errors
    ///
    /// [`MmError::InvalidInput`] when both inputs are absent or
    /// `top_k` is zero; encoder and store failures propagate.
    pub async fn search(
        &self,
        query_text: Option<&str>,
        query_image: Option<&[u8]>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        if top_k == 0 {
            return Err(MmError::InvalidInput("top_k must be greater than zero".to_string()));
        }

        let fused = self.embed(query_text, query_image).await?;

        let hits = self
            .with_deadline(self.vector_store.query(&fused.vector, top_k))
            .await
            .inspect_err(|e| {
                error!(error = %e, "vector store query failed");
            })?;

        let results: Vec<SearchResult> = hits
            .into_iter()
            .map(|hit| {
                let media_type = hit
                    .metadata
                    .get("media_type")
                    .and_then(Value::as_str)
                    .and_then(MediaType::parse)
                    .unwrap_or(MediaType::Text);
                SearchResult {
                    id: hit.id,
                    content: hit.content,
                    media_type,
                    similarity_score: 1.0 - hit.distance / 2.0,
                    metadata: hit.metadata,
                }
            })
            .collect();

        info!(result_count = results.len(), "search completed");
        Ok(results)
    }

    /// Answer a query from retrieved context (the RAG path).
    ///
    /// Searches with `query` as text and the first of `context_images`
    /// (if any) as the query image, assembles a context window from the
    /// top results, and hands both to the configured
    /// [`AnswerSynthesizer`]. `processing_time` is wall-clock seconds
    /// across retrieval and synthesis.
    pub async fn answer(
        &self,
        query: &str,
        context_images: &[Vec<u8>],
        top_k: usize,
    ) -> Result<RagAnswer> {
        let started = Instant::now();

        let query_image = context_images.first().map(Vec::as_slice);
        let sources = self.search(Some(query), query_image, top_k).await?;

        let context = self.build_context(&sources);
        let answer =
            self.synthesizer.synthesize(query, &context, &sources).await.inspect_err(|e| {
                error!(error = %e, "answer synthesis failed");
            })?;

        let processing_time = started.elapsed().as_secs_f64();
        info!(source_count = sources.len(), processing_time, "produced rag answer");

        Ok(RagAnswer { answer, sources, processing_time })
    }

    /// Format the top results as a context window:
    /// `"Source <rank> (<media_type>): <content>"` joined by blank lines.
    fn build_context(&self, results: &[SearchResult]) -> String {
        results
            .iter()
            .take(self.config.max_context_sources)
            .enumerate()
            .map(|(i, result)| {
                format!("Source {} ({}): {}", i + 1, result.media_type, result.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Builder for constructing a [`MultimodalPipeline`].
///
/// `text_encoder`, `image_encoder`, and `vector_store` are required.
/// `config` defaults to [`PipelineConfig::default()`] and `synthesizer`
/// to a [`TemplateSynthesizer`] sized from the config.
#[derive(Default)]
pub struct MultimodalPipelineBuilder {
    config: Option<PipelineConfig>,
    text_encoder: Option<Arc<dyn TextEncoder>>,
    image_encoder: Option<Arc<dyn ImageEncoder>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    synthesizer: Option<Arc<dyn AnswerSynthesizer>>,
}

impl MultimodalPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the text encoder.
    pub fn text_encoder(mut self, encoder: Arc<dyn TextEncoder>) -> Self {
        self.text_encoder = Some(encoder);
        self
    }

    /// Set the image encoder.
    pub fn image_encoder(mut self, encoder: Arc<dyn ImageEncoder>) -> Self {
        self.image_encoder = Some(encoder);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set an alternative answer synthesizer.
    pub fn synthesizer(mut self, synthesizer: Arc<dyn AnswerSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Build the [`MultimodalPipeline`], validating that all required
    /// collaborators are set.
    ///
    /// # Errors
    ///
    /// Returns [`MmError::Config`] if any required field is missing.
    pub fn build(self) -> Result<MultimodalPipeline> {
        let config = self.config.unwrap_or_default();
        let text_encoder = self
            .text_encoder
            .ok_or_else(|| MmError::Config("text_encoder is required".to_string()))?;
        let image_encoder = self
            .image_encoder
            .ok_or_else(|| MmError::Config("image_encoder is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| MmError::Config("vector_store is required".to_string()))?;
        let synthesizer = self
            .synthesizer
            .unwrap_or_else(|| Arc::new(TemplateSynthesizer::new(config.context_preview_chars)));

        Ok(MultimodalPipeline { config, text_encoder, image_encoder, vector_store, synthesizer })
    }
}
