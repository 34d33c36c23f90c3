//! Rendering error types.

use thiserror::Error;

use crate::backend::ImageHandle;
use crate::screenshot::ScreenshotError;

/// Errors that can occur during rendering and capture.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The backend reported a failure.
    #[error("render backend error: {0}")]
    Backend(String),

    /// The backend does not know the image.
    #[error("unknown image {0:?}")]
    UnknownImage(ImageHandle),

    /// An image with a zero dimension was requested.
    #[error("invalid image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },

    /// Writing a captured frame failed.
    #[error("screenshot error: {0}")]
    Screenshot(#[from] ScreenshotError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
