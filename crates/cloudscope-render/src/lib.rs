//! Render coordination for cloudscope.
//!
//! This crate sits between the session shell and the volumetric render backend:
//! - [`RenderBackend`] contract implemented by the GPU path tracer
//! - [`RenderScheduler`] deciding whether a frame renders at all
//! - [`ViewportResources`] keeping output images at the size of their view
//! - [`CapturePipeline`] routing composited frames to screenshots and video
//! - [`HeadlessBackend`] for running without a GPU

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
// Pixel index arithmetic converts between u32 sizes and usize offsets
#![allow(clippy::cast_possible_truncation)]

pub mod backend;
pub mod capture;
pub mod error;
pub mod headless;
pub mod scheduler;
pub mod screenshot;
pub mod video;
pub mod viewport;

pub use backend::{FrameImage, ImageHandle, RenderBackend};
pub use capture::{BindingGuard, CapturePipeline, CaptureReport};
pub use error::{RenderError, RenderResult};
pub use headless::HeadlessBackend;
pub use scheduler::{RenderScheduler, RenderState};
pub use screenshot::{save_image, ScreenshotError};
pub use video::{PngSequenceWriter, VideoSink};
pub use viewport::{ResizeOutcome, ViewportResources};
