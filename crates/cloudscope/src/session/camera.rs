//! Camera moves, checkpoints and camera flight.

use cloudscope_core::CameraPose;
use cloudscope_render::RenderBackend;

use super::Session;

impl<B: RenderBackend> Session<B> {
    /// Returns the current camera.
    pub fn camera(&self) -> CameraPose {
        self.camera
    }

    /// Moves the camera. Counts as a camera move: the backend restarts
    /// accumulation and the next frame renders.
    pub fn set_camera(&mut self, pose: CameraPose) {
        self.camera = pose;
        self.backend.set_camera(pose);
        self.backend.on_has_moved();
        self.scheduler.request_render();
    }

    /// Stores the current camera under `name` for the loaded dataset.
    ///
    /// Returns false if no dataset was loaded yet.
    pub fn add_checkpoint(&mut self, name: impl Into<String>) -> bool {
        self.checkpoints.insert(name, self.camera)
    }

    /// Removes a checkpoint of the loaded dataset.
    pub fn remove_checkpoint(&mut self, name: &str) -> bool {
        self.checkpoints.remove(name).is_some()
    }

    /// Moves the camera to a stored checkpoint.
    pub fn apply_checkpoint(&mut self, name: &str) -> bool {
        let Some(pose) = self.checkpoints.get(name) else {
            log::warn!("No camera checkpoint named '{name}'");
            return false;
        };
        self.set_camera(pose);
        true
    }

    /// Returns the time along the camera path.
    pub fn flight_time(&self) -> f32 {
        self.flight_time
    }

    /// Advances the camera along the camera path of the loaded dataset.
    ///
    /// Real-time flights advance by `dt`; otherwise, and always while
    /// recording, by one video frame. Returns true on the frame the path
    /// ends.
    pub(super) fn update_camera_flight(&mut self, dt: f32) -> bool {
        if !self.options.use_camera_flight || self.flight_finished {
            return false;
        }
        let Some(path) = self.current.as_ref().map(|dataset| dataset.camera_path()) else {
            return false;
        };
        if path.is_empty() {
            return false;
        }

        let step = if self.options.real_time_camera_flight && !self.capture.is_recording() {
            dt
        } else {
            1.0 / self.options.recording_fps.max(1.0)
        };
        let time = self.flight_time + step.max(0.0);
        let duration = path.duration();
        let pose = path.sample(time);

        self.flight_time = time.min(duration);
        if let Some(pose) = pose {
            self.set_camera(pose);
        }

        if time < duration {
            return false;
        }

        self.flight_finished = true;
        log::info!("Camera flight finished after {duration:.2}s");
        true
    }
}
