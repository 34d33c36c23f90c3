//! cloudscope: the interactive session shell of a volumetric path-tracing viewer.
//!
//! The shell decides which dataset is loaded, when the scene is rendered, and
//! where rendered frames go (screen, screenshot files, video). The path
//! tracer itself is plugged in through [`RenderBackend`].
//!
//! # Quick Start
//!
//! ```no_run
//! use cloudscope::*;
//!
//! init_logging();
//!
//! let options = SessionOptions::default();
//! let mut session = Session::new(HeadlessBackend::new(), options);
//! session.load_dataset("Data/CloudDataSets/cloud.xyz", true);
//!
//! let window = UVec2::new(1280, 720);
//! let input = FrameInput::docked(1.0 / 60.0, window, UVec2::new(960, 720));
//! let report = session.frame(&input);
//! assert!(report.rendered);
//! ```
//!
//! # Frame pipeline
//!
//! Each call to [`Session::frame`] runs scheduled mode changes, camera
//! flight and the queued-load poll, then matches the output images to the
//! view size, renders if anything made the frame dirty, and finally hands
//! the composited image to the capture pipeline.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

mod session;

// Re-export core types
pub use cloudscope_core::{
    error::{CloudscopeError, Result},
    options::SessionOptions,
    CameraPath, CameraPathSource, CameraPose, Catalog, CatalogEntry, CatalogVisitor,
    CheckpointRegistry, CloudData, ControlPoint, EntryId, ManifestNode, Mat4, Quat, SelectedSource,
    Selection, UVec2, Vec3, Vec4, CAMERA_PATH_TIME_PERFORMANCE_MEASUREMENT,
    CAMERA_PATH_TIME_RECORDING, CUSTOM_FILE_INDEX, NUM_MANUAL_LOADERS,
};

// Re-export render types
pub use cloudscope_render::{
    CapturePipeline, CaptureReport, FrameImage, HeadlessBackend, ImageHandle, PngSequenceWriter,
    RenderBackend, RenderError, RenderResult, RenderScheduler, RenderState, ResizeOutcome,
    VideoSink, ViewportResources,
};

pub use session::{
    FileDialogResult, FrameInput, FrameReport, LoadOutcome, LoadedDataset, MenuBackend, Session,
    ViewInput,
};

/// Initializes logging from the `RUST_LOG` environment variable.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
