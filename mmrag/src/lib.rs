//! # mmrag
//!
//! A multimodal retrieval-augmented pipeline: text and image inputs are
//! converted to vector embeddings, fused into one comparable
//! representation, persisted in a vector store, and queried by
//! similarity to assemble answer context.
//!
//! The crate is the pipeline core only — HTTP transport, upload
//! handling, and the encoder models themselves live behind trait seams
//! ([`TextEncoder`], [`ImageEncoder`], [`VectorStore`],
//! [`AnswerSynthesizer`]) so every collaborator is injectable.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use mmrag::{InMemoryVectorStore, MultimodalPipeline, PipelineConfig};
//!
//! let pipeline = MultimodalPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .text_encoder(Arc::new(text_encoder))
//!     .image_encoder(Arc::new(image_encoder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new(384)))
//!     .build()?;
//!
//! let id = pipeline.ingest("A red apple on a table", None, HashMap::new()).await?;
//! let results = pipeline.search(Some("apple"), None, 5).await?;
//! let answer = pipeline.answer("what is on the table?", &[], 3).await?;
//! ```
//!
//! ## Features
//!
//! - `remote` — HTTP encoder backends over `reqwest` (OpenAI-style text
//!   embeddings, base64 image embeddings with local RGB canonicalization).
//! - `qdrant` — persistent vector store backend over `qdrant-client`.

pub mod config;
pub mod document;
pub mod encoder;
pub mod error;
pub mod fusion;
pub mod inmemory;
pub mod pipeline;
pub mod synthesizer;
pub mod vectorstore;

#[cfg(feature = "qdrant")]
pub mod qdrant;

#[cfg(feature = "remote")]
pub mod remote;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{Document, MediaType, RagAnswer, SearchResult};
pub use encoder::{ImageEncoder, TextEncoder};
pub use error::{MmError, Result};
pub use fusion::{fuse, l2_normalize, FusedEmbedding};
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{EmbedItem, MultimodalPipeline, MultimodalPipelineBuilder};
pub use synthesizer::{AnswerSynthesizer, TemplateSynthesizer};
pub use vectorstore::{StoredHit, VectorStore};
