use image::RgbImage;
use palette::Srgb;

use crate::error::{QuantizeError, Result};
use crate::kmeans::Centroid;

/// Back to 8-bit channels, rounding to nearest and clamping to `0..=255`.
pub fn denormalize(color: &Srgb<f32>) -> [u8; 3] {
    let channel = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(color.red), channel(color.green), channel(color.blue)]
}

/// Paint every pixel with the color of its centroid.
///
/// `labels` is in row-major order and must hold exactly `width * height` ids,
/// each naming one of `centroids`.
pub fn reconstruct(
    labels: &[usize],
    centroids: &[Centroid],
    width: u32,
    height: u32,
) -> Result<RgbImage> {
    let expected = width as usize * height as usize;
    if labels.len() != expected {
        return Err(QuantizeError::InputShapeMismatch {
            expected,
            actual: labels.len(),
        });
    }

    let colors: Vec<[u8; 3]> = centroids.iter().map(Centroid::to_rgb8).collect();
    let mut raw = Vec::with_capacity(expected * 3);
    for &label in labels {
        let rgb = colors.get(label).ok_or(QuantizeError::UnknownLabel {
            label,
            clusters: centroids.len(),
        })?;
        raw.extend_from_slice(rgb);
    }

    RgbImage::from_raw(width, height, raw).ok_or(QuantizeError::InputShapeMismatch {
        expected,
        actual: labels.len(),
    })
}
