//! Property-editor settings and capture controls.

use std::path::PathBuf;

use cloudscope_render::{PngSequenceWriter, RenderBackend, VideoSink};
use glam::{UVec2, Vec4};

use super::Session;

impl<B: RenderBackend> Session<B> {
    /// Returns the background color.
    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    /// Changes the background color of the session and the loaded dataset.
    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
        if let Some(dataset) = self.current.as_mut() {
            dataset.clear_color = color;
        }
        self.backend.set_clear_color(color);
        self.scheduler.request_render();
    }

    /// Switches between linear and sRGB output.
    pub fn set_use_linear_rgb(&mut self, use_linear_rgb: bool) {
        self.options.use_linear_rgb = use_linear_rgb;
        self.backend.set_use_linear_rgb(use_linear_rgb);
        self.scheduler.request_render();
    }

    /// Renders every frame instead of only dirty ones.
    pub fn set_continuous_rendering(&mut self, continuous: bool) {
        self.options.continuous_rendering = continuous;
        self.scheduler.set_continuous_render(continuous);
    }

    /// Pins the data view to the fixed viewport size instead of the panel size.
    pub fn set_fixed_size_viewport(&mut self, enabled: bool) {
        self.options.use_fixed_size_viewport = enabled;
        self.scheduler.request_render();
    }

    /// Changes the size used while the fixed-size viewport is enabled.
    pub fn set_fixed_viewport_size(&mut self, size: UVec2) {
        self.options.fixed_viewport_size = size;
        self.scheduler.request_render();
    }

    /// Returns whether the data view is a docked panel.
    pub fn dock_space_mode(&self) -> bool {
        self.options.use_dock_space_mode
    }

    /// Schedules a switch between docked and full-window display.
    ///
    /// The switch takes effect at the start of the next frame.
    pub fn set_dock_space_mode(&mut self, enabled: bool) {
        if enabled == self.options.use_dock_space_mode {
            self.scheduled_dock_mode = None;
        } else {
            self.scheduled_dock_mode = Some(enabled);
        }
    }

    /// Applies a scheduled dock mode change. The output resources are
    /// recreated for the new display area on the same frame.
    pub(super) fn apply_scheduled_dock_mode(&mut self) {
        let Some(enabled) = self.scheduled_dock_mode.take() else {
            return;
        };
        self.options.use_dock_space_mode = enabled;
        self.view.invalidate();
        self.scheduler.request_render();
        log::info!(
            "Switched to {} mode",
            if enabled { "docking" } else { "window" }
        );
    }

    /// Saves the next rendered frame of the data view as a screenshot.
    pub fn request_screenshot(&mut self) {
        self.capture.request_screenshot();
    }

    /// Starts recording the data view into `sink`.
    ///
    /// With camera flight enabled the flight restarts so the video covers
    /// the whole camera path.
    pub fn start_recording(&mut self, sink: Box<dyn VideoSink>) {
        if self.options.use_camera_flight {
            self.flight_time = 0.0;
            self.flight_finished = false;
        }
        self.capture.start_recording(sink);
        self.scheduler.request_render();
    }

    /// Starts recording into a new timestamped PNG sequence directory below
    /// the screenshot directory and returns that directory.
    pub fn start_png_recording(&mut self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let directory = self
            .options
            .screenshot_directory
            .join(format!("recording_{timestamp}"));
        self.start_recording(Box::new(PngSequenceWriter::new(directory.clone())));
        directory
    }

    /// Stops the active recording and returns the number of recorded frames.
    pub fn stop_recording(&mut self) -> Option<u64> {
        self.capture.stop_recording()
    }

    /// Returns whether a recording is active.
    pub fn is_recording(&self) -> bool {
        self.capture.is_recording()
    }
}
