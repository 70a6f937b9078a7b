use thiserror::Error;

/// Failures raised by the comparison viewport and the mask surface.
#[derive(Debug, Error)]
pub enum ViewError {
    /// No image is available yet; the operation is disabled.
    #[error("input not ready: no image loaded yet")]
    InputNotReady,
    /// An image reference could not be fetched or decoded.
    #[error("image could not be loaded: {0}")]
    TransientRenderFailure(String),
    #[error("mask encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
