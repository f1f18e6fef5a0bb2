use wasm_bindgen::prelude::*;
use image::{self, ImageFormat, RgbImage};
use js_sys::{Uint8Array, Array, Object, Reflect};

pub mod assign;
pub mod config;
pub mod error;
pub mod features;
pub mod kmeans;
pub mod reconstruct;
pub mod sampler;

pub use assign::assign;
pub use config::QuantizeConfig;
pub use error::QuantizeError;
pub use features::ImageFeatures;
pub use kmeans::{Centroid, KMeans, Seeding, TrainingReport};
pub use reconstruct::reconstruct;

/// Everything produced by one quantization run.
#[derive(Clone, Debug)]
pub struct Quantized {
    /// Same width and height as the input, one palette color per pixel.
    pub image: RgbImage,
    /// Exactly `K` centroids, ids `0..K`.
    pub centroids: Vec<Centroid>,
    /// Centroid id of every pixel, row-major.
    pub labels: Vec<usize>,
    pub report: TrainingReport,
}

impl Quantized {
    pub fn palette_hex(&self) -> Vec<String> {
        palette_hex(&self.centroids)
    }
}

/// Reduce an image to `config.clusters` colors.
///
/// Steps performed:
/// 1. Draw `config.sample_size` distinct pixels.
/// 2. Train k-means on that sample.
/// 3. Label every pixel of the image with its nearest centroid.
/// 4. Rebuild the image from the labels.
///
/// Sampling and seeding share one RNG, so a fixed `config.seed` makes the
/// whole run reproducible.
pub fn quantize(features: &ImageFeatures, config: &QuantizeConfig) -> error::Result<Quantized> {
    let mut rng = config.rng();
    let (centroids, report) = train(features, config, &mut rng)?;

    let labels = assign(features, &centroids);
    let image = reconstruct(&labels, &centroids, features.width(), features.height())?;

    Ok(Quantized {
        image,
        centroids,
        labels,
        report,
    })
}

fn train(
    features: &ImageFeatures,
    config: &QuantizeConfig,
    rng: &mut rand::rngs::StdRng,
) -> error::Result<(Vec<Centroid>, TrainingReport)> {
    config.validate()?;
    let sample = sampler::sample(features, config.sample_size, rng)?;
    let (centroids, report) = KMeans::from_config(config).train(&sample, rng)?;
    log::info!(
        "trained {} clusters on {} of {} pixels in {} iterations (converged: {}, inertia: {:.4})",
        centroids.len(),
        sample.len(),
        features.len(),
        report.iterations,
        report.converged,
        report.inertia,
    );
    Ok((centroids, report))
}

/// Centroid colors as `RRGGBB` strings, in id order.
pub fn palette_hex(centroids: &[Centroid]) -> Vec<String> {
    centroids.iter().map(Centroid::to_hex).collect()
}

/// Quantize an encoded image in the browser.
///
/// The input may be any format the `image` crate can decode. The result is an
/// object `{ image: Uint8Array, palette: string[] }` holding a PNG and the
/// palette as hex strings. `seed` makes the output reproducible.
#[wasm_bindgen]
pub fn quantize_image(
    input: Vec<u8>,
    n_colors: usize,
    sample_size: usize,
    seed: Option<u64>,
) -> Result<Object, JsValue> {
    let img = image::load_from_memory(&input)
        .map_err(|e| JsValue::from_str(&format!("Unable to decode image: {e}")))?;
    let features =
        ImageFeatures::from_image(&img).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let mut config = QuantizeConfig::default()
        .with_clusters(n_colors)
        .with_sample_size(sample_size);
    config.seed = seed;

    let quantized =
        quantize(&features, &config).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        quantized
            .image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| JsValue::from_str(&format!("PNG encode error: {e}")))?;
    }

    let img_js = Uint8Array::from(buf.as_slice());
    let palette_js = Array::new();
    for hex in quantized.palette_hex() {
        palette_js.push(&JsValue::from_str(&hex));
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("image"), &img_js)?;
    Reflect::set(&result, &JsValue::from_str("palette"), &palette_js)?;

    Ok(result)
}

/// Decode `input`, quantize it, and encode the result as `format`.
///
/// Returns the encoded bytes together with the full run result.
#[cfg(not(target_arch = "wasm32"))]
pub fn quantize_bytes(
    input: &[u8],
    format: ImageFormat,
    config: &QuantizeConfig,
) -> error::Result<(Vec<u8>, Quantized)> {
    let img = image::load_from_memory(input)?;
    let features = ImageFeatures::from_image(&img)?;
    let quantized = quantize(&features, config)?;

    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        quantized.image.write_to(&mut cursor, format)?;
    }

    Ok((buf, quantized))
}

/// Train on `input` and return only the palette; no image is rebuilt.
#[cfg(not(target_arch = "wasm32"))]
pub fn extract_palette_bytes(input: &[u8], config: &QuantizeConfig) -> error::Result<Vec<String>> {
    let img = image::load_from_memory(input)?;
    let features = ImageFeatures::from_image(&img)?;
    let mut rng = config.rng();
    let (centroids, _) = train(&features, config, &mut rng)?;
    Ok(palette_hex(&centroids))
}
