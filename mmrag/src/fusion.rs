//! Embedding fusion: combining per-modality vectors into one comparable
//! representation.
//!
//! The strategy is concatenate-then-renormalize: a multimodal item's
//! text and image vectors are joined into one longer vector which is
//! L2-normalized as a whole. Single-modality vectors pass through
//! unchanged. This is cheap and model-agnostic but does not learn
//! cross-modal alignment, so fused vectors are only comparable to
//! vectors of the same fused dimensionality — the stores enforce that.

use serde::{Deserialize, Serialize};

use crate::document::MediaType;
use crate::error::{MmError, Result};

/// A fused embedding together with the modalities that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FusedEmbedding {
    /// The L2-normalized vector.
    pub vector: Vec<f32>,
    /// Which modalities contributed to `vector`.
    pub media_type: MediaType,
}

impl FusedEmbedding {
    /// The length of the fused vector.
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

/// L2-normalize a vector in place. Zero vectors are left unchanged.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vector {
        *value /= norm;
    }
}

/// Combine optional text and image vectors into one comparable vector.
///
/// - Both present: concatenation of text then image, renormalized;
///   [`MediaType::Multimodal`].
/// - Only one present: that vector unchanged; [`MediaType::Text`] or
///   [`MediaType::Image`].
///
/// # Errors
///
/// Returns [`MmError::InvalidInput`] when neither vector is provided.
pub fn fuse(text: Option<Vec<f32>>, image: Option<Vec<f32>>) -> Result<FusedEmbedding> {
    match (text, image) {
        (Some(text), Some(image)) => {
            let mut vector = text;
            vector.extend(image);
            l2_normalize(&mut vector);
            Ok(FusedEmbedding { vector, media_type: MediaType::Multimodal })
        }
        (Some(vector), None) => Ok(FusedEmbedding { vector, media_type: MediaType::Text }),
        (None, Some(vector)) => Ok(FusedEmbedding { vector, media_type: MediaType::Image }),
        (None, None) => Err(MmError::InvalidInput(
            "at least one of text or image must be provided".to_string(),
        )),
    }
}
