//! Contract between the session shell and the volumetric render backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cloudscope_core::{CameraPose, CloudData};
use glam::Vec4;

use crate::error::RenderResult;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of a GPU image owned by a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHandle(u64);

impl ImageHandle {
    /// Allocates a new, process-unique handle.
    #[must_use]
    pub fn allocate() -> Self {
        Self(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id.
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// RGBA8 pixels read back from an image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl FrameImage {
    /// Creates an image filled with one color.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: rgba.repeat(count),
        }
    }
}

/// The render backend driven by the session.
///
/// The backend renders into the image last passed to
/// [`set_output_image`](RenderBackend::set_output_image). The images
/// themselves belong to the viewport resources; the backend only reads and
/// writes their contents.
pub trait RenderBackend {
    /// Binds the image the next [`render`](RenderBackend::render) writes to.
    fn set_output_image(&mut self, image: ImageHandle);

    /// Recreates all size-dependent resources for a `width` x `height` output.
    fn recreate_swapchain(&mut self, width: u32, height: u32);

    /// Executes the render pass.
    fn render(&mut self);

    /// Returns true if the backend wants another frame (e.g. progressive accumulation).
    fn needs_rerender(&mut self) -> bool;

    /// Notifies the backend that the camera moved.
    fn on_has_moved(&mut self);

    /// Updates the camera the next render uses.
    fn set_camera(&mut self, _pose: CameraPose) {}

    /// Hands a newly loaded dataset to the backend.
    fn set_cloud_data(&mut self, data: Arc<CloudData>);

    /// Switches between linear and sRGB output.
    fn set_use_linear_rgb(&mut self, _use_linear_rgb: bool) {}

    /// Sets the background color.
    fn set_clear_color(&mut self, _color: Vec4) {}

    /// Copies the rendered image into the composited image shown on screen.
    fn composite(&mut self, source: ImageHandle, target: ImageHandle) -> RenderResult<()>;

    /// Reads back the contents of an image.
    fn read_image(&mut self, image: ImageHandle) -> RenderResult<FrameImage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let a = ImageHandle::allocate();
        let b = ImageHandle::allocate();
        assert_ne!(a, b);
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_filled_image() {
        let image = FrameImage::filled(3, 2, [1, 2, 3, 4]);
        assert_eq!(image.pixels.len(), 3 * 2 * 4);
        assert_eq!(&image.pixels[4..8], &[1, 2, 3, 4]);
    }
}
