//! Property tests for embedding fusion.

use mmrag::error::MmError;
use mmrag::fusion::{fuse, l2_normalize};
use mmrag::MediaType;
use proptest::prelude::*;

/// Generate a non-zero vector of the given dimension.
fn arb_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter("non-zero vector", |v| {
        v.iter().map(|x| x * x).sum::<f32>().sqrt() > 1e-6
    })
}

/// Generate a non-zero L2-normalized vector of the given dimension.
fn arb_normalized_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    arb_vector(dim).prop_map(|mut v| {
        l2_normalize(&mut v);
        v
    })
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Fusing both modalities yields a unit vector whose dimensionality is
/// the sum of the input dimensionalities, tagged multimodal.
mod prop_multimodal_fusion {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn concatenation_is_renormalized(
            text in arb_normalized_vector(8),
            image in arb_normalized_vector(12),
        ) {
            let fused = fuse(Some(text.clone()), Some(image.clone())).unwrap();

            prop_assert_eq!(fused.media_type, MediaType::Multimodal);
            prop_assert_eq!(fused.dimensions(), text.len() + image.len());
            prop_assert!((norm(&fused.vector) - 1.0).abs() < 1e-4);
        }
    }
}

/// Single-modality inputs pass through unchanged.
mod prop_single_modality_passthrough {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn text_only_is_identity(text in arb_normalized_vector(8)) {
            let fused = fuse(Some(text.clone()), None).unwrap();
            prop_assert_eq!(fused.media_type, MediaType::Text);
            prop_assert_eq!(fused.vector, text);
        }

        #[test]
        fn image_only_is_identity(image in arb_normalized_vector(12)) {
            let fused = fuse(None, Some(image.clone())).unwrap();
            prop_assert_eq!(fused.media_type, MediaType::Image);
            prop_assert_eq!(fused.vector, image);
        }
    }
}

#[test]
fn fusing_nothing_is_an_input_error() {
    let err = fuse(None, None).unwrap_err();
    assert!(matches!(err, MmError::InvalidInput(_)));
}

#[test]
fn normalize_leaves_zero_vector_unchanged() {
    let mut v = vec![0.0f32; 4];
    l2_normalize(&mut v);
    assert_eq!(v, vec![0.0f32; 4]);
}
