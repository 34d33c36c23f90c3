//! CPU backend for running a session without a GPU.
//!
//! Renders a maximum-intensity projection of the density grid along the z
//! axis over the clear color. Used by tests and the headless demo.

use std::collections::HashMap;
use std::sync::Arc;

use cloudscope_core::{CameraPose, CloudData};
use glam::{UVec2, Vec4};

use crate::backend::{FrameImage, ImageHandle, RenderBackend};
use crate::error::{RenderError, RenderResult};

/// A [`RenderBackend`] that keeps its images in memory.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    images: HashMap<ImageHandle, FrameImage>,
    output: Option<ImageHandle>,
    output_size: UVec2,
    cloud_data: Option<Arc<CloudData>>,
    camera: CameraPose,
    clear_color: Vec4,
    use_linear_rgb: bool,
    target_samples: u32,
    accumulated_samples: u32,
    render_count: u64,
    swapchain_recreations: u64,
    moves: u64,
}

impl HeadlessBackend {
    /// Creates a backend that converges after a single sample.
    pub fn new() -> Self {
        Self {
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            target_samples: 1,
            ..Self::default()
        }
    }

    /// Sets how many renders are accumulated before the image counts as converged.
    #[must_use]
    pub fn with_target_samples(mut self, samples: u32) -> Self {
        self.target_samples = samples.max(1);
        self
    }

    /// Returns the currently bound output image.
    #[must_use]
    pub fn output_image(&self) -> Option<ImageHandle> {
        self.output
    }

    /// Returns the size passed to the last swapchain recreation.
    #[must_use]
    pub fn output_size(&self) -> UVec2 {
        self.output_size
    }

    /// Returns the dataset handed to the backend.
    #[must_use]
    pub fn cloud_data(&self) -> Option<&Arc<CloudData>> {
        self.cloud_data.as_ref()
    }

    /// Returns the camera of the next render.
    #[must_use]
    pub fn camera(&self) -> CameraPose {
        self.camera
    }

    /// Returns the current clear color.
    #[must_use]
    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    /// Returns whether linear RGB output is enabled.
    #[must_use]
    pub fn use_linear_rgb(&self) -> bool {
        self.use_linear_rgb
    }

    /// Returns how many render passes ran.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Returns how often the swapchain was recreated.
    #[must_use]
    pub fn swapchain_recreations(&self) -> u64 {
        self.swapchain_recreations
    }

    /// Returns how many camera moves were reported.
    #[must_use]
    pub fn moves(&self) -> u64 {
        self.moves
    }

    /// Returns the samples accumulated since the last reset.
    #[must_use]
    pub fn accumulated_samples(&self) -> u32 {
        self.accumulated_samples
    }

    /// Returns the contents of an image.
    #[must_use]
    pub fn image(&self, image: ImageHandle) -> Option<&FrameImage> {
        self.images.get(&image)
    }

    /// Drops an image, as if its GPU memory had been released.
    pub fn forget_image(&mut self, image: ImageHandle) {
        self.images.remove(&image);
    }

    fn reset_accumulation(&mut self) {
        self.accumulated_samples = 0;
    }

    fn shade(&self, width: u32, height: u32) -> FrameImage {
        let background = to_rgba8(self.clear_color);
        let mut frame = FrameImage::filled(width, height, background);
        let Some(data) = self.cloud_data.as_ref() else {
            return frame;
        };

        let max_density = data.max_density();
        if max_density <= 0.0 {
            return frame;
        }

        let grid = data.grid_size();
        let density = data.density();
        let (gx, gy, gz) = (grid.x as usize, grid.y as usize, grid.z as usize);
        for py in 0..height as usize {
            // Image rows go top to bottom, grid y goes bottom to top.
            let y = gy - 1 - py * gy / height as usize;
            for px in 0..width as usize {
                let x = px * gx / width as usize;
                let peak = (0..gz)
                    .map(|z| density[x + gx * (y + gy * z)])
                    .fold(0.0_f32, f32::max);
                let t = (peak / max_density).clamp(0.0, 1.0);
                let color = self.clear_color.lerp(Vec4::ONE, t);
                let offset = (py * width as usize + px) * 4;
                frame.pixels[offset..offset + 4].copy_from_slice(&to_rgba8(color));
            }
        }
        frame
    }
}

// Values are clamped to [0, 255] before the casts
#[allow(clippy::cast_sign_loss)]
fn to_rgba8(color: Vec4) -> [u8; 4] {
    let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
}

impl RenderBackend for HeadlessBackend {
    fn set_output_image(&mut self, image: ImageHandle) {
        self.output = Some(image);
    }

    fn recreate_swapchain(&mut self, width: u32, height: u32) {
        self.output_size = UVec2::new(width, height);
        self.swapchain_recreations += 1;
        self.reset_accumulation();
    }

    fn render(&mut self) {
        let Some(output) = self.output else {
            log::warn!("Render requested without an output image");
            return;
        };
        if self.output_size.x == 0 || self.output_size.y == 0 {
            return;
        }
        let frame = self.shade(self.output_size.x, self.output_size.y);
        self.images.insert(output, frame);
        self.accumulated_samples = (self.accumulated_samples + 1).min(self.target_samples);
        self.render_count += 1;
    }

    fn needs_rerender(&mut self) -> bool {
        self.cloud_data.is_some() && self.accumulated_samples < self.target_samples
    }

    fn on_has_moved(&mut self) {
        self.moves += 1;
        self.reset_accumulation();
    }

    fn set_camera(&mut self, pose: CameraPose) {
        self.camera = pose;
    }

    fn set_cloud_data(&mut self, data: Arc<CloudData>) {
        self.cloud_data = Some(data);
        self.reset_accumulation();
    }

    fn set_use_linear_rgb(&mut self, use_linear_rgb: bool) {
        self.use_linear_rgb = use_linear_rgb;
    }

    fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
        self.reset_accumulation();
    }

    fn composite(&mut self, source: ImageHandle, target: ImageHandle) -> RenderResult<()> {
        let frame = self
            .images
            .get(&source)
            .cloned()
            .ok_or(RenderError::UnknownImage(source))?;
        self.images.insert(target, frame);
        Ok(())
    }

    fn read_image(&mut self, image: ImageHandle) -> RenderResult<FrameImage> {
        self.images
            .get(&image)
            .cloned()
            .ok_or(RenderError::UnknownImage(image))
    }
}
