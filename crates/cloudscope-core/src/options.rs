//! Configuration options for a cloudscope session.

use std::path::{Path, PathBuf};

use glam::{UVec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Name of the directory below the data directory that holds the dataset catalog.
pub const CATALOG_DIRECTORY_NAME: &str = "CloudDataSets";

/// File name of the dataset catalog manifest.
pub const CATALOG_MANIFEST_NAME: &str = "datasets.json";

/// Session-wide configuration options.
///
/// Missing keys fall back to [`SessionOptions::default`] when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Root directory for application data.
    pub data_directory: PathBuf,

    /// Directory screenshots are written to.
    pub screenshot_directory: PathBuf,

    /// File name prefix for numbered screenshots.
    pub screenshot_prefix: String,

    /// Directory holding per-dataset `.binpath` camera path caches.
    pub camera_path_directory: PathBuf,

    /// Whether the renderer is shown inside a docked panel.
    pub use_dock_space_mode: bool,

    /// Whether the docked view uses `fixed_viewport_size` instead of the panel size.
    pub use_fixed_size_viewport: bool,

    /// Viewport size used in fixed-size mode.
    pub fixed_viewport_size: UVec2,

    /// Re-render every frame, even if nothing changed.
    pub continuous_rendering: bool,

    /// Performance measurement mode (implies camera flight).
    pub use_performance_measurement_mode: bool,

    /// Whether the camera follows the dataset's camera path.
    pub use_camera_flight: bool,

    /// Advance the camera flight by wall-clock time instead of fixed frame steps.
    pub real_time_camera_flight: bool,

    /// Output resolution used while recording a camera flight.
    pub recording_resolution: UVec2,

    /// Frame rate of recorded videos.
    pub recording_fps: f32,

    /// Whether the backend renders in linear RGB.
    pub use_linear_rgb: bool,

    /// Background clear color (RGBA, 0-1).
    pub clear_color: Vec4,

    /// Axis used for quarter-turn model rotations.
    pub model_rotation_axis: Vec3,

    /// Number of 90 degree turns applied to every loaded dataset.
    pub rotate_model_by_90_degree_turns: i32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("Data"),
            screenshot_directory: PathBuf::from("Screenshots"),
            screenshot_prefix: "screenshot".to_string(),
            camera_path_directory: PathBuf::from("CameraPaths"),
            use_dock_space_mode: true,
            use_fixed_size_viewport: false,
            fixed_viewport_size: UVec2::new(1920, 1080),
            continuous_rendering: false,
            use_performance_measurement_mode: false,
            use_camera_flight: false,
            real_time_camera_flight: true,
            recording_resolution: UVec2::new(1920, 1080),
            recording_fps: 30.0,
            use_linear_rgb: false,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            model_rotation_axis: Vec3::X,
            rotate_model_by_90_degree_turns: 0,
        }
    }
}

impl SessionOptions {
    /// Parses options from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        Ok(options.normalized())
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Applies flag implications between options.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.use_performance_measurement_mode {
            self.use_camera_flight = true;
        }
        self
    }

    /// Directory the catalog manifest and its relative dataset paths live in.
    pub fn catalog_directory(&self) -> PathBuf {
        self.data_directory.join(CATALOG_DIRECTORY_NAME)
    }

    /// Full path of the catalog manifest.
    pub fn catalog_manifest_path(&self) -> PathBuf {
        self.catalog_directory().join(CATALOG_MANIFEST_NAME)
    }
}
