//! Error types for the `mmrag` crate.

use thiserror::Error;

/// Errors that can occur in multimodal retrieval operations.
#[derive(Debug, Error)]
pub enum MmError {
    /// The caller supplied invalid input (e.g. neither text nor image,
    /// a zero `top_k`, or a vector of the wrong dimensionality).
    ///
    /// Surfaced to callers as a client error; never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An encoder failed to produce a vector.
    #[error("Encoding error ({modality}): {message}")]
    Encoding {
        /// The modality whose encoder produced the error (`text` or `image`).
        modality: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector persistence backend could not be reached or the
    /// operation failed. Fatal for the request; surfaced as a server error.
    #[error("Vector store unavailable ({backend}): {message}")]
    StoreUnavailable {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in the pipeline orchestration, including per-request
    /// deadline expiry.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for multimodal retrieval operations.
pub type Result<T> = std::result::Result<T, MmError>;
