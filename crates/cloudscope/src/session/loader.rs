//! Dataset loading and selection.

use std::f32::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cloudscope_core::{
    is_supported_extension, resolve_camera_path, CloudData, Mat4, Result, Vec3,
    CUSTOM_FILE_INDEX, NUM_MANUAL_LOADERS,
};
use cloudscope_render::RenderBackend;

use super::{LoadRequest, LoadedDataset, Session};

/// Result of a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The dataset was loaded and is now current.
    Loaded,
    /// The request waits for the next frame.
    Queued,
    /// An empty path cleared the current dataset.
    Unloaded,
    /// The request was not attempted (unsupported file or nothing to load).
    Rejected,
    /// Loading failed; the previous dataset is still current.
    Failed,
}

/// A file picked in the open-dataset dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDialogResult {
    /// Directory the dialog was in.
    pub directory: PathBuf,
    /// Selected file name inside `directory`.
    pub file_name: String,
    /// Active extension filter.
    pub filter: String,
}

impl FileDialogResult {
    /// Returns the full path of the selected file.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

impl<B: RenderBackend> Session<B> {
    /// Loads the dataset at `path`.
    ///
    /// The custom transform of the selected catalog entry (if any) and the
    /// quarter-turn model rotation are applied. In blocking mode the dataset
    /// is current when this returns; otherwise the load runs on the next
    /// frame's poll, replacing any request that has not run yet. A blocking
    /// load or an unload discards the queued request. An empty path unloads
    /// the current dataset.
    pub fn load_dataset(&mut self, path: impl AsRef<Path>, blocking: bool) -> LoadOutcome {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            self.drop_pending_load();
            if self.current.take().is_some() {
                log::info!("Unloaded dataset");
            }
            return LoadOutcome::Unloaded;
        }

        if !is_supported_extension(path) {
            log::warn!("The file {} has an unknown extension", path.display());
            return LoadOutcome::Rejected;
        }

        let request = LoadRequest {
            path: path.to_path_buf(),
            custom_transform: self
                .selection
                .catalog_entry(&self.catalog)
                .and_then(|entry| entry.transform()),
            selection_index: self.selection.index(),
        };

        if blocking {
            self.drop_pending_load();
            return self.execute_load(&request);
        }

        if let Some(replaced) = self.pending_load.replace(request) {
            log::debug!("Dropped queued load of {}", replaced.path.display());
        }
        LoadOutcome::Queued
    }

    /// Runs a queued non-blocking load, if there is one.
    ///
    /// Called once per frame during the update step.
    pub fn check_loading_request_finished(&mut self) -> Option<LoadOutcome> {
        let request = self.pending_load.take()?;
        Some(self.execute_load(&request))
    }

    /// Discards a queued load that a newer request supersedes.
    fn drop_pending_load(&mut self) {
        if let Some(dropped) = self.pending_load.take() {
            log::debug!("Dropped queued load of {}", dropped.path.display());
        }
    }

    /// Changes the selector index; catalog entries are loaded right away.
    pub fn select_dataset(&mut self, index: usize) -> Option<LoadOutcome> {
        self.selection.set_index(index);
        if index >= NUM_MANUAL_LOADERS {
            Some(self.load_selected_dataset())
        } else {
            None
        }
    }

    /// Loads whatever the selector points at.
    pub fn load_selected_dataset(&mut self) -> LoadOutcome {
        let Some(path) = self
            .selection
            .filename(&self.catalog)
            .map(Path::to_path_buf)
        else {
            log::warn!(
                "Selector index {} does not refer to a dataset",
                self.selection.index()
            );
            return LoadOutcome::Rejected;
        };
        self.load_dataset(path, true)
    }

    /// Loads the selected dataset again.
    pub fn reload_dataset(&mut self) -> LoadOutcome {
        self.load_selected_dataset()
    }

    /// Returns the directory the open-dataset dialog starts in.
    pub fn file_dialog_directory(&self) -> PathBuf {
        let catalog_directory = self.options.catalog_directory();
        if catalog_directory.exists() {
            catalog_directory
        } else {
            self.options.data_directory.clone()
        }
    }

    /// Loads the file picked in the open-dataset dialog as a custom file.
    pub fn on_file_dialog_result(&mut self, result: &FileDialogResult) -> LoadOutcome {
        self.selection.set_index(CUSTOM_FILE_INDEX);
        self.selection.set_custom_path(result.path());
        self.load_selected_dataset()
    }

    /// Model matrix: the custom transform followed by the quarter-turn rotation.
    #[allow(clippy::cast_precision_loss)]
    fn model_transform(&self, custom_transform: Option<Mat4>) -> Mat4 {
        let mut transform = custom_transform.unwrap_or(Mat4::IDENTITY);
        let turns = self.options.rotate_model_by_90_degree_turns;
        let axis = self.options.model_rotation_axis.normalize_or_zero();
        if turns != 0 && axis != Vec3::ZERO {
            transform *= Mat4::from_axis_angle(axis, turns as f32 * FRAC_PI_2);
        }
        transform
    }

    fn build_dataset(&self, request: &LoadRequest) -> Result<LoadedDataset> {
        let mut data = CloudData::new();
        data.load_from_file(&request.path)?;
        data.set_transform(self.model_transform(request.custom_transform));

        let camera_path = resolve_camera_path(
            &self.options.camera_path_directory,
            &request.path,
            data.bounding_box(),
            self.options.use_performance_measurement_mode,
        );

        Ok(LoadedDataset {
            data: Arc::new(data),
            descriptor_name: request.path.clone(),
            camera_path,
            clear_color: self.clear_color,
            selection_index: request.selection_index,
        })
    }

    fn execute_load(&mut self, request: &LoadRequest) -> LoadOutcome {
        match self.build_dataset(request) {
            Ok(dataset) => {
                self.publish(dataset);
                LoadOutcome::Loaded
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", request.path.display());
                LoadOutcome::Failed
            }
        }
    }

    fn publish(&mut self, dataset: LoadedDataset) {
        self.backend.set_cloud_data(Arc::clone(&dataset.data));
        self.backend.set_use_linear_rgb(self.options.use_linear_rgb);
        self.backend.set_clear_color(dataset.clear_color);
        self.checkpoints
            .on_load_dataset(&dataset.descriptor_name.to_string_lossy());
        self.flight_time = 0.0;
        self.flight_finished = false;
        self.scheduler.request_render();

        log::info!(
            "Loaded {} ({} grid, camera path '{}')",
            dataset.descriptor_name.display(),
            dataset.data.grid_size(),
            dataset.camera_path.name()
        );
        self.current = Some(dataset);
    }
}
