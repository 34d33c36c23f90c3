//! The per-frame pipeline.
//!
//! Every frame runs, in order: scheduled mode changes, camera flight and the
//! queued-load poll; the output size check; the conditional render; capture
//! and recording; display of the composited image.

use cloudscope_render::{CaptureReport, ImageHandle, RenderBackend, ResizeOutcome};
use glam::UVec2;

use super::{LoadOutcome, Session};

/// GUI state of the data view panel for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewInput {
    /// Available content area of the panel.
    pub content_size: UVec2,
    /// The panel has keyboard focus.
    pub focused: bool,
    /// The mouse is over the panel image.
    pub hovered: bool,
}

/// Input of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Size of the top-level window.
    pub window_size: UVec2,
    /// The data view panel, or `None` if it is closed this frame.
    pub view: Option<ViewInput>,
}

impl FrameInput {
    /// Input for a frame in docking mode with an open data view.
    pub fn docked(dt: f32, window_size: UVec2, content_size: UVec2) -> Self {
        Self {
            dt,
            window_size,
            view: Some(ViewInput {
                content_size,
                focused: false,
                hovered: false,
            }),
        }
    }

    /// Input for a frame in window mode.
    pub fn windowed(dt: f32, window_size: UVec2) -> Self {
        Self {
            dt,
            window_size,
            view: None,
        }
    }
}

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Outcome of a queued load serviced this frame.
    pub load: Option<LoadOutcome>,
    /// Outcome of the output size check, `None` if the view was closed.
    pub resize: Option<ResizeOutcome>,
    /// The render pass ran.
    pub rendered: bool,
    /// Screenshot and recording activity.
    pub capture: CaptureReport,
    /// The camera path ended this frame.
    pub flight_finished: bool,
    /// Image to show for this frame.
    pub display_image: Option<ImageHandle>,
    /// Keyboard and mouse input should move the camera.
    pub camera_input: bool,
}

impl<B: RenderBackend> Session<B> {
    /// Runs one frame.
    ///
    /// A recording that follows the camera flight stops after the frame
    /// showing the last pose of the path has been captured.
    pub fn frame(&mut self, input: &FrameInput) -> FrameReport {
        let report = self.run_frame_pipeline(input);
        if report.flight_finished && self.capture.is_recording() {
            self.capture.stop_recording();
        }
        report
    }

    fn run_frame_pipeline(&mut self, input: &FrameInput) -> FrameReport {
        self.frame_index += 1;
        let mut report = FrameReport {
            camera_input: self.camera_input_allowed(input),
            ..FrameReport::default()
        };

        self.apply_scheduled_dock_mode();
        report.flight_finished = self.update_camera_flight(input.dt);
        report.load = self.check_loading_request_finished();

        let Some(requested) = self.requested_view_size(input) else {
            return report;
        };
        report.resize = Some(
            self.view
                .ensure_size(requested, &mut self.backend, &mut self.scheduler),
        );
        if !self.view.is_valid() {
            // Dirty flag stays set until the view has an area again
            return report;
        }

        let backend_stale = self.backend.needs_rerender();
        let has_data = self.current.is_some();
        let backend = &mut self.backend;
        report.rendered = self.scheduler.run_frame(backend_stale, || {
            if has_data {
                backend.render();
            }
        });

        if report.rendered && has_data {
            if let Err(e) = self.view.composite(&mut self.backend) {
                log::error!("Failed to composite {}: {e}", self.view.label());
            }
        }

        report.capture = self.capture.process_frame(&mut self.backend, &self.view);
        report.display_image = self
            .view
            .composited_image()
            .filter(|_| self.view.has_composited_frame());
        report
    }

    /// Size the output resources must have this frame, `None` if nothing is shown.
    fn requested_view_size(&self, input: &FrameInput) -> Option<UVec2> {
        if !self.options.use_dock_space_mode {
            return Some(input.window_size);
        }
        let view = input.view?;
        if self.options.use_fixed_size_viewport {
            Some(self.options.fixed_viewport_size)
        } else {
            Some(view.content_size)
        }
    }

    fn camera_input_allowed(&self, input: &FrameInput) -> bool {
        if self.capture.is_recording() || !self.options.use_dock_space_mode {
            return true;
        }
        input.view.is_some_and(|view| view.focused || view.hovered)
    }
}
