//! Camera poses and camera paths.
//!
//! A camera path is a list of timed control points. Paths are either read from
//! a per-dataset `.binpath` cache or generated as a circular orbit around the
//! dataset's bounding box.
//!
//! The `.binpath` layout is a `u32` control point count followed by packed
//! [`ControlPoint`] records (native byte order).

use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use crate::error::{CloudscopeError, Result};

/// Duration in seconds of generated paths used for video recording.
pub const CAMERA_PATH_TIME_RECORDING: f32 = 10.0;

/// Duration in seconds of generated paths used in performance measurement mode.
pub const CAMERA_PATH_TIME_PERFORMANCE_MEASUREMENT: f32 = 24.0;

/// File suffix of camera path caches.
pub const CAMERA_PATH_SUFFIX: &str = ".binpath";

const CIRCLE_PATH_SEGMENTS: usize = 64;

/// Position and orientation of the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Camera position in world space.
    pub position: Vec3,
    /// Camera-to-world rotation; the camera looks along its local -Z axis.
    pub orientation: Quat,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 0.0, 1.5), Vec3::ZERO, Vec3::Y)
    }
}

impl CameraPose {
    /// Creates a pose at `position` looking at `target`.
    #[must_use]
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let camera_to_world = Mat4::look_at_rh(position, target, up).inverse();
        Self {
            position,
            orientation: Quat::from_mat4(&camera_to_world).normalize(),
        }
    }

    /// Returns the viewing direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }
}

/// A control point as stored in `.binpath` files.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ControlPoint {
    /// Time stamp in seconds.
    pub time: f32,
    /// Camera position.
    pub position: [f32; 3],
    /// Camera orientation as quaternion (x, y, z, w).
    pub orientation: [f32; 4],
}

impl ControlPoint {
    /// Creates a control point from a pose.
    #[must_use]
    pub fn new(time: f32, pose: CameraPose) -> Self {
        Self {
            time,
            position: pose.position.to_array(),
            orientation: pose.orientation.to_array(),
        }
    }

    /// Returns true if time, position and orientation are all finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.position.iter().all(|v| v.is_finite())
            && self.orientation.iter().all(|v| v.is_finite())
    }

    /// Returns the pose stored in this control point.
    #[must_use]
    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: Vec3::from_array(self.position),
            orientation: Quat::from_array(self.orientation).normalize(),
        }
    }
}

/// Where a resolved camera path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraPathSource {
    /// Read verbatim from a cache file.
    Cached(PathBuf),
    /// Generated circular orbit.
    Generated,
}

/// A timed sequence of camera poses.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraPath {
    name: String,
    control_points: Vec<ControlPoint>,
    performance_measurement: bool,
    source: CameraPathSource,
}

impl Default for CameraPath {
    fn default() -> Self {
        Self {
            name: String::new(),
            control_points: Vec::new(),
            performance_measurement: false,
            source: CameraPathSource::Generated,
        }
    }
}

impl CameraPath {
    /// Creates a path from control points, sorted by time.
    pub fn from_control_points(name: impl Into<String>, mut control_points: Vec<ControlPoint>) -> Self {
        control_points.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            name: name.into(),
            control_points,
            ..Default::default()
        }
    }

    /// Reads a path from a `.binpath` file.
    pub fn from_binary_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let malformed = |reason: String| CloudscopeError::MalformedCameraPath {
            path: path.display().to_string(),
            reason,
        };

        if bytes.len() < 4 {
            return Err(malformed("missing control point count".into()));
        }
        let count: u32 = bytemuck::pod_read_unaligned(&bytes[0..4]);
        let payload = &bytes[4..];
        let expected = count as usize * std::mem::size_of::<ControlPoint>();
        if payload.len() != expected {
            return Err(malformed(format!(
                "{count} control points need {expected} bytes, found {}",
                payload.len()
            )));
        }

        let control_points: Vec<ControlPoint> = bytemuck::pod_collect_to_vec(payload);
        if let Some(index) = control_points.iter().position(|p| !p.is_finite()) {
            return Err(malformed(format!(
                "control point {index} has non-finite values"
            )));
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut camera_path = Self::from_control_points(name, control_points);
        camera_path.source = CameraPathSource::Cached(path.to_path_buf());
        Ok(camera_path)
    }

    /// Writes the path as a `.binpath` file.
    pub fn to_binary_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let count = u32::try_from(self.control_points.len()).map_err(|_| {
            CloudscopeError::MalformedCameraPath {
                path: path.as_ref().display().to_string(),
                reason: "too many control points".into(),
            }
        })?;
        let mut bytes = bytemuck::bytes_of(&count).to_vec();
        bytes.extend_from_slice(bytemuck::cast_slice(&self.control_points));
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Generates a circular orbit around `bounding_box` lasting `duration` seconds.
    ///
    /// The camera circles the box center slightly above it, always looking at
    /// the center. Performance measurement paths start facing the box front.
    pub fn from_circle_path(
        bounding_box: (Vec3, Vec3),
        name: impl Into<String>,
        duration: f32,
        performance_measurement: bool,
    ) -> Self {
        let (min, max) = bounding_box;
        let center = (min + max) * 0.5;
        let extent = max - min;
        let horizontal = extent.x.max(extent.z);
        let radius = if horizontal > 0.0 { horizontal * 1.2 } else { 1.0 };
        let height = center.y + extent.y * 0.2;
        let start_angle = if performance_measurement { 0.0 } else { TAU / 8.0 };

        #[allow(clippy::cast_precision_loss)]
        let control_points = (0..=CIRCLE_PATH_SEGMENTS)
            .map(|i| {
                let t = i as f32 / CIRCLE_PATH_SEGMENTS as f32;
                let angle = start_angle + t * TAU;
                let position = Vec3::new(
                    center.x + radius * angle.sin(),
                    height,
                    center.z + radius * angle.cos(),
                );
                ControlPoint::new(t * duration, CameraPose::look_at(position, center, Vec3::Y))
            })
            .collect();

        Self {
            name: name.into(),
            control_points,
            performance_measurement,
            source: CameraPathSource::Generated,
        }
    }

    /// Returns the path name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the control points, sorted by time.
    #[must_use]
    pub fn control_points(&self) -> &[ControlPoint] {
        &self.control_points
    }

    /// Returns whether this path was generated for performance measurement.
    #[must_use]
    pub fn is_performance_measurement(&self) -> bool {
        self.performance_measurement
    }

    /// Returns where the path came from.
    #[must_use]
    pub fn source(&self) -> &CameraPathSource {
        &self.source
    }

    /// Returns true if the path has no control points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.control_points.is_empty()
    }

    /// Returns the time stamp of the last control point.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.control_points.last().map_or(0.0, |p| p.time)
    }

    /// Returns the interpolated pose at `time`, clamped to the path's time range.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<CameraPose> {
        let first = self.control_points.first()?;
        let last = self.control_points.last()?;
        if time <= first.time {
            return Some(first.pose());
        }
        if time >= last.time {
            return Some(last.pose());
        }

        let next = self.control_points.partition_point(|p| p.time <= time);
        let (Some(a), Some(b)) = (
            next.checked_sub(1).and_then(|i| self.control_points.get(i)),
            self.control_points.get(next),
        ) else {
            return Some(first.pose());
        };
        let span = b.time - a.time;
        let t = if span > 0.0 { (time - a.time) / span } else { 0.0 };

        let (pa, pb) = (a.pose(), b.pose());
        Some(CameraPose {
            position: pa.position.lerp(pb.position, t),
            orientation: pa.orientation.slerp(pb.orientation, t).normalize(),
        })
    }
}

/// Returns the cache file for a dataset: `<dir>/<last path segment>.binpath`.
pub fn camera_path_cache_file(directory: &Path, descriptor_name: &Path) -> PathBuf {
    let segment = descriptor_name
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    directory.join(format!("{segment}{CAMERA_PATH_SUFFIX}"))
}

/// Resolves the camera path of a freshly loaded dataset.
///
/// Uses the cache file when it exists and parses, and generates a circular
/// orbit otherwise.
pub fn resolve_camera_path(
    directory: &Path,
    descriptor_name: &Path,
    bounding_box: (Vec3, Vec3),
    performance_measurement: bool,
) -> CameraPath {
    let cache_file = camera_path_cache_file(directory, descriptor_name);
    if cache_file.exists() {
        match CameraPath::from_binary_file(&cache_file) {
            Ok(path) => {
                log::info!("Loaded camera path from {}", cache_file.display());
                return path;
            }
            Err(e) => {
                log::warn!("Ignoring camera path cache: {e}");
            }
        }
    }

    let duration = if performance_measurement {
        CAMERA_PATH_TIME_PERFORMANCE_MEASUREMENT
    } else {
        CAMERA_PATH_TIME_RECORDING
    };
    CameraPath::from_circle_path(
        bounding_box,
        descriptor_name.to_string_lossy(),
        duration,
        performance_measurement,
    )
}
