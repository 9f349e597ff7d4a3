//! Encoder traits for turning raw text and image inputs into vectors.
//!
//! Encoders wrap black-box model backends behind async traits so the
//! pipeline can be tested with deterministic doubles and deployed
//! against remote inference services (see the `remote` feature).

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;

/// Maps a string to a fixed-dimension, L2-normalized vector.
///
/// Implementations must be deterministic for a fixed model version and
/// must fail with [`MmError::Encoding`](crate::MmError::Encoding) when
/// the backend is unavailable or the input text is empty.
///
/// The default [`encode_batch`](TextEncoder::encode_batch) implementation
/// calls [`encode`](TextEncoder::encode) sequentially; backends with
/// native batching should override it.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Encode a single text input into a normalized vector.
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Encode a batch of text inputs.
    ///
    /// Fails on the first input that cannot be encoded (text-path
    /// failures are fatal for the request).
    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.encode(text).await?);
        }
        Ok(vectors)
    }

    /// The dimensionality of vectors produced by this encoder.
    fn dimensions(&self) -> usize;
}

/// Maps raw image bytes to a fixed-dimension, L2-normalized vector.
///
/// Undecodable input is an expected, non-fatal condition: it resolves
/// to `Ok(None)` ("no image contribution") rather than an error, so the
/// caller can degrade to the remaining modality. `Err` is reserved for
/// backend failures (unreachable inference service, protocol errors).
#[async_trait]
pub trait ImageEncoder: Send + Sync {
    /// Encode image bytes into a normalized vector, or `None` when the
    /// bytes cannot be decoded as an image.
    async fn encode(&self, image: &[u8]) -> Result<Option<Vec<f32>>>;

    /// Encode a batch of images independently.
    ///
    /// Per-item failures never abort the batch: a failing item resolves
    /// to a `None` slot and the output always has the input's length.
    async fn encode_batch(&self, images: &[&[u8]]) -> Result<Vec<Option<Vec<f32>>>> {
        let mut vectors = Vec::with_capacity(images.len());
        for image in images {
            match self.encode(image).await {
                Ok(vector) => vectors.push(vector),
                Err(e) => {
                    warn!(error = %e, "image encoding failed within batch, item resolves to none");
                    vectors.push(None);
                }
            }
        }
        Ok(vectors)
    }

    /// The dimensionality of vectors produced by this encoder.
    fn dimensions(&self) -> usize;
}
