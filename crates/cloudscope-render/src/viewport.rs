//! Size-dependent output resources of a view.

use glam::UVec2;

use crate::backend::{ImageHandle, RenderBackend};
use crate::error::RenderResult;
use crate::scheduler::RenderScheduler;

/// Result of [`ViewportResources::ensure_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// The size did not change; nothing was touched.
    Unchanged,
    /// Resources were recreated for the new size.
    Recreated,
    /// The new size has a zero dimension; resources were released.
    Collapsed,
}

/// Output images of one view, kept at the size of the area they are shown in.
///
/// The render target is what the backend writes to; the composited image is
/// what gets displayed, captured and recorded.
#[derive(Debug, Clone)]
pub struct ViewportResources {
    label: &'static str,
    size: UVec2,
    render_target: Option<ImageHandle>,
    composited: Option<ImageHandle>,
    generation: u64,
    composite_valid: bool,
}

impl ViewportResources {
    /// Creates empty resources. The first non-zero size request allocates them.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            size: UVec2::ZERO,
            render_target: None,
            composited: None,
            generation: 0,
            composite_valid: false,
        }
    }

    /// Returns the view label used in logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Returns the last observed size.
    #[must_use]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Returns true if both dimensions are non-zero.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.size.x > 0 && self.size.y > 0
    }

    /// Returns the image the backend renders into.
    #[must_use]
    pub fn render_target(&self) -> Option<ImageHandle> {
        self.render_target
    }

    /// Returns the image shown on screen.
    #[must_use]
    pub fn composited_image(&self) -> Option<ImageHandle> {
        self.composited
    }

    /// Returns whether the composited image holds a rendered frame.
    #[must_use]
    pub fn has_composited_frame(&self) -> bool {
        self.composite_valid
    }

    /// Returns how often the resources were recreated.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forgets the current size so the next [`ensure_size`](Self::ensure_size) recreates.
    pub fn invalidate(&mut self) {
        self.size = UVec2::ZERO;
        self.render_target = None;
        self.composited = None;
        self.composite_valid = false;
    }

    /// Matches the resources to `requested`.
    ///
    /// On a size change the images are reallocated, the backend is rebound to
    /// the new render target and its swapchain recreated, and a render is
    /// requested. Zero-sized requests only record the size.
    pub fn ensure_size<B: RenderBackend + ?Sized>(
        &mut self,
        requested: UVec2,
        backend: &mut B,
        scheduler: &mut RenderScheduler,
    ) -> ResizeOutcome {
        if requested == self.size && (self.render_target.is_some() || !self.is_valid()) {
            return ResizeOutcome::Unchanged;
        }

        self.size = requested;
        self.composite_valid = false;
        scheduler.request_render();

        if !self.is_valid() {
            log::debug!(
                "{} viewport collapsed to {}x{}, skipping resource creation",
                self.label,
                requested.x,
                requested.y
            );
            self.render_target = None;
            self.composited = None;
            return ResizeOutcome::Collapsed;
        }

        let render_target = ImageHandle::allocate();
        self.render_target = Some(render_target);
        self.composited = Some(ImageHandle::allocate());
        self.generation += 1;

        backend.set_output_image(render_target);
        backend.recreate_swapchain(requested.x, requested.y);
        log::debug!(
            "Recreated {} viewport resources at {}x{}",
            self.label,
            requested.x,
            requested.y
        );
        ResizeOutcome::Recreated
    }

    /// Copies the freshly rendered target into the composited image.
    pub fn composite<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> RenderResult<()> {
        if let (Some(source), Some(target)) = (self.render_target, self.composited) {
            backend.composite(source, target)?;
            self.composite_valid = true;
        }
        Ok(())
    }
}
