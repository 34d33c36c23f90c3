//! Screenshot and video capture of composited frames.
//!
//! Capturing reads the composited image of the active view. For screenshots
//! the backend's output binding is swapped to that image for the duration of
//! the capture; [`BindingGuard`] puts the original binding back when it goes
//! out of scope, on success and on error alike.

use std::path::{Path, PathBuf};

use crate::backend::{ImageHandle, RenderBackend};
use crate::error::{RenderError, RenderResult};
use crate::screenshot::save_image;
use crate::video::VideoSink;
use crate::viewport::ViewportResources;

/// Temporarily rebinds the backend output to another image.
pub struct BindingGuard<'a, B: RenderBackend + ?Sized> {
    backend: &'a mut B,
    original: ImageHandle,
}

impl<'a, B: RenderBackend + ?Sized> BindingGuard<'a, B> {
    /// Binds `alternate` and remembers `original` for restoration.
    pub fn substitute(backend: &'a mut B, original: ImageHandle, alternate: ImageHandle) -> Self {
        backend.set_output_image(alternate);
        Self { backend, original }
    }

    /// Returns the binding restored on drop.
    #[must_use]
    pub fn original(&self) -> ImageHandle {
        self.original
    }

    /// Gives access to the backend while the substitute is bound.
    pub fn backend(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> Drop for BindingGuard<'_, B> {
    fn drop(&mut self) {
        self.backend.set_output_image(self.original);
    }
}

/// What [`CapturePipeline::process_frame`] did this frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureReport {
    /// File written by a serviced screenshot request.
    pub screenshot: Option<PathBuf>,
    /// A screenshot request was serviced but saving failed.
    pub screenshot_failed: bool,
    /// A frame was pushed to the video sink.
    pub recorded_frame: bool,
    /// Recording stopped because the sink failed.
    pub recording_aborted: bool,
}

/// Routes composited frames to screenshot files and the video sink.
pub struct CapturePipeline {
    directory: PathBuf,
    prefix: String,
    screenshot_requested: bool,
    screenshot_counter: u32,
    recording: Option<Box<dyn VideoSink>>,
    skip_next_recording_frame: bool,
}

impl std::fmt::Debug for CapturePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturePipeline")
            .field("directory", &self.directory)
            .field("prefix", &self.prefix)
            .field("screenshot_requested", &self.screenshot_requested)
            .field("screenshot_counter", &self.screenshot_counter)
            .field("recording", &self.recording.is_some())
            .finish()
    }
}

impl CapturePipeline {
    /// Creates a pipeline writing screenshots as `<directory>/<prefix>_<n>.png`.
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            screenshot_requested: false,
            screenshot_counter: 0,
            recording: None,
            skip_next_recording_frame: false,
        }
    }

    /// Returns the screenshot directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Requests a screenshot of the next rendered frame.
    pub fn request_screenshot(&mut self) {
        self.screenshot_requested = true;
    }

    /// Returns whether a screenshot request is pending.
    #[must_use]
    pub fn screenshot_requested(&self) -> bool {
        self.screenshot_requested
    }

    /// Returns the number of serviced screenshot requests.
    #[must_use]
    pub fn screenshot_counter(&self) -> u32 {
        self.screenshot_counter
    }

    /// Returns the file the next screenshot is written to.
    #[must_use]
    pub fn next_screenshot_path(&self) -> PathBuf {
        self.directory
            .join(format!("{}_{}.png", self.prefix, self.screenshot_counter))
    }

    /// Starts recording into `sink`, replacing any active recording.
    ///
    /// The first frame after the start is dropped.
    pub fn start_recording(&mut self, sink: Box<dyn VideoSink>) {
        if self.recording.is_some() {
            self.stop_recording();
        }
        log::info!("Started recording");
        self.recording = Some(sink);
        self.skip_next_recording_frame = true;
    }

    /// Stops the active recording and finishes its sink.
    ///
    /// Returns the number of frames the sink accepted, or `None` if nothing was recording.
    pub fn stop_recording(&mut self) -> Option<u64> {
        let mut sink = self.recording.take()?;
        if let Err(e) = sink.finish() {
            log::error!("Failed to finish recording: {e}");
        }
        let frames = sink.frames_written();
        log::info!("Stopped recording after {frames} frames");
        Some(frames)
    }

    /// Returns whether a recording is active.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Services pending captures for the frame just rendered into `view`.
    ///
    /// A screenshot request stays pending while the view has no composited frame.
    pub fn process_frame<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        view: &ViewportResources,
    ) -> CaptureReport {
        let mut report = CaptureReport::default();
        let images = match (view.render_target(), view.composited_image()) {
            (Some(target), Some(composited)) if view.has_composited_frame() => {
                (target, composited)
            }
            _ => return report,
        };

        if self.screenshot_requested {
            let path = self.next_screenshot_path();
            match Self::capture_screenshot(backend, images.0, images.1, &path) {
                Ok(()) => {
                    log::info!("Saved screenshot to {}", path.display());
                    report.screenshot = Some(path);
                }
                Err(e) => {
                    log::error!("Failed to save screenshot {}: {e}", path.display());
                    report.screenshot_failed = true;
                }
            }
            self.screenshot_counter += 1;
            self.screenshot_requested = false;
        }

        if let Some(sink) = self.recording.as_mut() {
            if self.skip_next_recording_frame {
                self.skip_next_recording_frame = false;
            } else {
                let pushed = backend
                    .read_image(images.1)
                    .and_then(|frame| sink.push_frame(&frame));
                match pushed {
                    Ok(()) => report.recorded_frame = true,
                    Err(e) => {
                        log::error!("Recording failed: {e}");
                        self.stop_recording();
                        report.recording_aborted = true;
                    }
                }
            }
        }

        report
    }

    fn capture_screenshot<B: RenderBackend + ?Sized>(
        backend: &mut B,
        render_target: ImageHandle,
        composited: ImageHandle,
        path: &Path,
    ) -> RenderResult<()> {
        let mut guard = BindingGuard::substitute(backend, render_target, composited);
        let frame = guard.backend().read_image(composited)?;
        if frame.width == 0 || frame.height == 0 {
            return Err(RenderError::InvalidImageSize {
                width: frame.width,
                height: frame.height,
            });
        }
        save_image(path, &frame)?;
        Ok(())
    }
}
