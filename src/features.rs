use image::{DynamicImage, GenericImageView};
use palette::Srgb;

use crate::error::{QuantizeError, Result};

/// Normalized color of every pixel of an image, in row-major order.
///
/// Index `i` holds pixel `(i % width, i / width)`. Channels are in `[0.0, 1.0]`.
#[derive(Clone, Debug)]
pub struct ImageFeatures {
    width: u32,
    height: u32,
    pixels: Vec<Srgb<f32>>,
}

impl ImageFeatures {
    /// Build from an already-normalized feature list.
    pub fn new(width: u32, height: u32, pixels: Vec<Srgb<f32>>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(QuantizeError::EmptyImage);
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(QuantizeError::InputShapeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    /// Build from packed 8-bit RGB triples (`width * height * 3` bytes).
    pub fn from_rgb8(width: u32, height: u32, raw: &[u8]) -> Result<Self> {
        if raw.len() % 3 != 0 {
            return Err(QuantizeError::InputShapeMismatch {
                expected: width as usize * height as usize,
                actual: raw.len() / 3,
            });
        }
        let pixels = raw
            .chunks_exact(3)
            .map(|chunk| normalize([chunk[0], chunk[1], chunk[2]]))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Alpha is discarded; only the color channels are clustered.
    pub fn from_image(img: &DynamicImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        let rgb8 = img.to_rgb8();
        Self::from_rgb8(width, height, rgb8.as_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Srgb<f32>] {
        &self.pixels
    }
}

/// Map an 8-bit color onto `[0.0, 1.0]` per channel.
pub fn normalize(rgb: [u8; 3]) -> Srgb<f32> {
    let [r, g, b] = rgb.map(|c| c as f32 / 255.0);
    Srgb::new(r, g, b)
}

/// Squared Euclidean distance in normalized RGB space.
#[inline(always)]
pub fn distance_squared(a: &Srgb<f32>, b: &Srgb<f32>) -> f32 {
    let dr = a.red - b.red;
    let dg = a.green - b.green;
    let db = a.blue - b.blue;
    dr * dr + dg * dg + db * db
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn row_major_indexing() {
        let img = ImageBuffer::from_fn(3, 2, |x, y| Rgb([(x * 10) as u8, (y * 100) as u8, 7]));
        let features = ImageFeatures::from_image(&DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(features.len(), 6);
        // index 4 -> (1, 1)
        let f = features.pixels()[4];
        assert!((f.red - 10.0 / 255.0).abs() < 1e-6);
        assert!((f.green - 100.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn channel_extremes_normalize_to_unit_range() {
        let f = normalize([0, 255, 51]);
        assert_eq!(f.red, 0.0);
        assert_eq!(f.green, 1.0);
        assert!((f.blue - 0.2).abs() < 1e-6);
    }

    #[test]
    fn rejects_length_disagreeing_with_shape() {
        let err = ImageFeatures::from_rgb8(2, 2, &[0u8; 9]).unwrap_err();
        assert!(matches!(
            err,
            QuantizeError::InputShapeMismatch { expected: 4, actual: 3 }
        ));
    }

    #[test]
    fn rejects_empty_image() {
        let err = ImageFeatures::new(0, 5, Vec::new()).unwrap_err();
        assert!(matches!(err, QuantizeError::EmptyImage));
    }

    #[test]
    fn distance_is_squared_euclidean() {
        let a = Srgb::new(0.0, 0.0, 0.0);
        let b = Srgb::new(1.0, 1.0, 0.0);
        assert_eq!(distance_squared(&a, &b), 2.0);
        assert_eq!(distance_squared(&b, &b), 0.0);
    }
}
