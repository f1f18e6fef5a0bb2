use crate::features::ImageFeatures;
use crate::kmeans::{Centroid, nearest_labels};

/// Label every pixel of the image with the id of its nearest centroid.
///
/// Pixels that were part of the training sample are re-evaluated against the
/// final centroids like any other pixel.
pub fn assign(features: &ImageFeatures, centroids: &[Centroid]) -> Vec<usize> {
    nearest_labels(features.pixels(), centroids)
}
