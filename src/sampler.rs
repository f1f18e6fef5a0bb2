use std::collections::HashSet;

use palette::Srgb;
use rand::Rng;

use crate::error::{QuantizeError, Result};
use crate::features::ImageFeatures;

/// Draw `count` distinct indices from `0..total`, uniformly, in draw order.
///
/// Rejection sampling: an index already chosen is simply redrawn. This slows
/// down as `count` approaches `total`; training samples are expected to be a
/// small fraction of the image.
pub fn sample_indices<R: Rng + ?Sized>(
    total: usize,
    count: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if count > total {
        return Err(QuantizeError::InvalidSampleSize {
            requested: count,
            available: total,
        });
    }
    let mut chosen = HashSet::with_capacity(count);
    let mut indices = Vec::with_capacity(count);
    while indices.len() < count {
        let candidate = rng.random_range(0..total);
        if chosen.insert(candidate) {
            indices.push(candidate);
        }
    }
    Ok(indices)
}

/// Training subset of `count` pixels drawn without index repetition.
pub fn sample<R: Rng + ?Sized>(
    features: &ImageFeatures,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Srgb<f32>>> {
    let pixels = features.pixels();
    let indices = sample_indices(pixels.len(), count, rng)?;
    log::debug!("sampled {} of {} pixels", indices.len(), pixels.len());
    Ok(indices.into_iter().map(|i| pixels[i]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn returns_exact_count_without_duplicates() {
        let mut rng = StdRng::seed_from_u64(11);
        let indices = sample_indices(5_000, 1_000, &mut rng).unwrap();
        assert_eq!(indices.len(), 1_000);
        let unique: HashSet<_> = indices.iter().copied().collect();
        assert_eq!(unique.len(), 1_000);
        assert!(indices.iter().all(|&i| i < 5_000));
    }

    #[test]
    fn whole_population_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut indices = sample_indices(64, 64, &mut rng).unwrap();
        indices.sort_unstable();
        assert_eq!(indices, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn zero_count_is_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(sample_indices(10, 0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn oversized_request_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = sample_indices(4, 5, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            QuantizeError::InvalidSampleSize { requested: 5, available: 4 }
        ));
    }

    #[test]
    fn same_seed_same_sample() {
        let a = sample_indices(1_000, 50, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = sample_indices(1_000, 50, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sample_copies_features_of_chosen_pixels() {
        let raw: Vec<u8> = (0..12u8).flat_map(|i| [i * 20, 0, 0]).collect();
        let features = ImageFeatures::from_rgb8(4, 3, &raw).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let picked = sample(&features, 12, &mut rng).unwrap();
        assert_eq!(picked.len(), 12);
        for p in &picked {
            assert!(features.pixels().contains(p));
        }
    }
}
