//! Core types for cloudscope.
//!
//! This crate provides the data side of the session shell:
//! - [`Catalog`] of datasets built from a JSON manifest, with a resumable pre-order walk
//! - [`Selection`] state mapping selector indices to catalog entries or a free-text path
//! - [`CloudData`] dense density volumes
//! - [`CameraPath`] resolution (cached `.binpath` files or generated orbits)
//! - [`CheckpointRegistry`] of named camera poses per dataset
//! - [`SessionOptions`] configuration

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod camera_path;
pub mod catalog;
pub mod checkpoint;
pub mod cloud_data;
pub mod error;
pub mod options;
pub mod selection;

pub use camera_path::{
    camera_path_cache_file, resolve_camera_path, CameraPath, CameraPathSource, CameraPose,
    ControlPoint, CAMERA_PATH_TIME_PERFORMANCE_MEASUREMENT, CAMERA_PATH_TIME_RECORDING,
};
pub use catalog::{Catalog, CatalogEntry, CatalogVisitor, EntryId, EntryKind, LeafInfo, ManifestNode};
pub use checkpoint::CheckpointRegistry;
pub use cloud_data::{is_supported_extension, CloudData, SUPPORTED_EXTENSIONS};
pub use error::{CloudscopeError, Result};
pub use options::SessionOptions;
pub use selection::{SelectedSource, Selection, CUSTOM_FILE_INDEX, NUM_MANUAL_LOADERS};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, UVec2, Vec3, Vec4};
