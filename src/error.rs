use thiserror::Error;

/// Errors raised by the quantization pipeline.
///
/// Every variant except [`QuantizeError::Image`] is a precondition failure
/// detected before any clustering work starts.
#[derive(Debug, Error)]
pub enum QuantizeError {
    /// More samples were requested than the image has pixels.
    #[error("Invalid sample size: requested {requested}, only {available} pixels available")]
    InvalidSampleSize { requested: usize, available: usize },

    /// Cluster count is zero or larger than the training sample.
    #[error("Invalid cluster count {clusters}: must be between 1 and the sample size ({samples})")]
    InvalidClusterCount { clusters: usize, samples: usize },

    /// A per-pixel buffer disagrees with the declared width × height.
    #[error("Input shape mismatch: expected {expected} pixels, got {actual}")]
    InputShapeMismatch { expected: usize, actual: usize },

    #[error("Image has zero width or height")]
    EmptyImage,

    /// A label does not name any centroid.
    #[error("Label {label} is out of range for {clusters} clusters")]
    UnknownLabel { label: usize, clusters: usize },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, QuantizeError>;
