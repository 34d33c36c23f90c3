//! The interactive session: dataset state, frame scheduling and capture.

mod camera;
mod frame;
mod loader;
mod menu;
mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cloudscope_core::{
    CameraPath, CameraPose, Catalog, CheckpointRegistry, CloudData, Mat4, SessionOptions,
    Selection, Vec4,
};
use cloudscope_render::{CapturePipeline, RenderBackend, RenderScheduler, ViewportResources};

pub use frame::{FrameInput, FrameReport, ViewInput};
pub use loader::{FileDialogResult, LoadOutcome};
pub use menu::MenuBackend;

/// The dataset currently shown.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    data: Arc<CloudData>,
    descriptor_name: PathBuf,
    camera_path: CameraPath,
    clear_color: Vec4,
    selection_index: usize,
}

impl LoadedDataset {
    /// Returns the shared volume.
    pub fn data(&self) -> &Arc<CloudData> {
        &self.data
    }

    /// Returns the path the dataset was loaded from.
    pub fn descriptor_name(&self) -> &Path {
        &self.descriptor_name
    }

    /// Returns the camera path resolved at load time.
    pub fn camera_path(&self) -> &CameraPath {
        &self.camera_path
    }

    /// Returns the background color the dataset is rendered with.
    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    /// Returns the selector index the dataset was loaded from.
    pub fn selection_index(&self) -> usize {
        self.selection_index
    }
}

/// A load waiting for the next frame's poll.
#[derive(Debug, Clone)]
pub(super) struct LoadRequest {
    pub(super) path: PathBuf,
    pub(super) custom_transform: Option<Mat4>,
    pub(super) selection_index: usize,
}

/// Top-level state of one viewer session.
///
/// The session owns the dataset slot and the viewport resources; the backend
/// is driven through [`RenderBackend`] and only ever sees the shared dataset.
pub struct Session<B: RenderBackend> {
    pub(super) backend: B,
    pub(super) options: SessionOptions,
    pub(super) catalog: Catalog,
    pub(super) selection: Selection,
    pub(super) current: Option<LoadedDataset>,
    pub(super) scheduler: RenderScheduler,
    pub(super) view: ViewportResources,
    pub(super) capture: CapturePipeline,
    pub(super) checkpoints: CheckpointRegistry,
    pub(super) camera: CameraPose,
    pub(super) clear_color: Vec4,
    // Non-blocking loads are serviced by the next frame's poll
    pub(super) pending_load: Option<LoadRequest>,
    // Dock mode changes take effect at the start of the next frame
    pub(super) scheduled_dock_mode: Option<bool>,
    // Camera flight
    pub(super) flight_time: f32,
    pub(super) flight_finished: bool,
    pub(super) frame_index: u64,
}

impl<B: RenderBackend> Session<B> {
    /// Creates a session, reading the catalog manifest below the data directory.
    ///
    /// A missing or unreadable manifest leaves only the manual loaders.
    pub fn new(backend: B, options: SessionOptions) -> Self {
        let catalog = Catalog::load_or_empty(options.catalog_manifest_path());
        Self::with_catalog(backend, options, catalog)
    }

    /// Creates a session around an already built catalog.
    pub fn with_catalog(mut backend: B, options: SessionOptions, catalog: Catalog) -> Self {
        let options = options.normalized();
        let camera = CameraPose::default();
        backend.set_use_linear_rgb(options.use_linear_rgb);
        backend.set_clear_color(options.clear_color);
        backend.set_camera(camera);

        log::info!(
            "Session started with {} catalog datasets",
            catalog.num_leaves()
        );

        Self {
            scheduler: RenderScheduler::new(options.continuous_rendering),
            view: ViewportResources::new("data view"),
            capture: CapturePipeline::new(
                options.screenshot_directory.clone(),
                options.screenshot_prefix.clone(),
            ),
            selection: Selection::new(options.data_directory.clone()),
            clear_color: options.clear_color,
            checkpoints: CheckpointRegistry::new(),
            current: None,
            pending_load: None,
            scheduled_dock_mode: None,
            flight_time: 0.0,
            flight_finished: false,
            frame_index: 0,
            camera,
            catalog,
            options,
            backend,
        }
    }

    /// Returns the render backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the render backend mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Returns the active options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Returns the dataset catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the selector state.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns the selector state mutably, e.g. to edit the free-text path.
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Returns the loaded dataset, if any.
    pub fn current(&self) -> Option<&LoadedDataset> {
        self.current.as_ref()
    }

    /// Returns the render scheduler.
    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    /// Requests a render on the next frame.
    pub fn request_render(&mut self) {
        self.scheduler.request_render();
    }

    /// Returns the output resources of the data view.
    pub fn view(&self) -> &ViewportResources {
        &self.view
    }

    /// Returns the capture pipeline.
    pub fn capture(&self) -> &CapturePipeline {
        &self.capture
    }

    /// Returns the camera checkpoints.
    pub fn checkpoints(&self) -> &CheckpointRegistry {
        &self.checkpoints
    }

    /// Returns the number of frames processed so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns true if a non-blocking load waits for the next frame.
    pub fn has_pending_load(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Consumes the session and returns the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }
}

impl<B: RenderBackend + std::fmt::Debug> std::fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.backend)
            .field("selection", &self.selection)
            .field("current", &self.current.as_ref().map(LoadedDataset::descriptor_name))
            .field("scheduler", &self.scheduler)
            .field("view", &self.view)
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}
