//! Volumetric cloud datasets.
//!
//! A [`CloudData`] holds a dense density grid. Grids are read from `.xyz`
//! files with the layout
//!
//! | bytes | content |
//! |---|---|
//! | 12 | grid size, 3 x `u32` |
//! | 24 | voxel size, 3 x `f64` |
//! | rest | densities, `f32`, x fastest |
//!
//! all in little-endian byte order.

use std::path::{Path, PathBuf};

use glam::{Mat4, UVec3, Vec3};

use crate::error::{CloudscopeError, Result};

/// File extensions the dataset loader understands (lowercase, without dot).
pub const SUPPORTED_EXTENSIONS: [&str; 1] = ["xyz"];

const XYZ_HEADER_SIZE: usize = 3 * 4 + 3 * 8;

/// Returns true if `path` has an extension the loader understands.
pub fn is_supported_extension(path: impl AsRef<Path>) -> bool {
    file_extension(path.as_ref()).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// A dense volumetric density grid.
#[derive(Debug, Clone)]
pub struct CloudData {
    file_name: PathBuf,
    grid_size: UVec3,
    voxel_size: Vec3,
    density: Vec<f32>,
    transform: Mat4,
}

impl Default for CloudData {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudData {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self {
            file_name: PathBuf::new(),
            grid_size: UVec3::ZERO,
            voxel_size: Vec3::ONE,
            density: Vec::new(),
            transform: Mat4::IDENTITY,
        }
    }

    /// Creates a dataset from an in-memory grid.
    pub fn from_dense_grid(
        name: impl Into<PathBuf>,
        grid_size: UVec3,
        voxel_size: Vec3,
        density: Vec<f32>,
    ) -> Result<Self> {
        let file_name = name.into();
        validate_grid(&file_name, grid_size, voxel_size, density.len())?;
        Ok(Self {
            file_name,
            grid_size,
            voxel_size,
            density,
            transform: Mat4::IDENTITY,
        })
    }

    /// Loads the dataset from `path`, replacing the current contents.
    ///
    /// On error the dataset is left unchanged.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match file_extension(path).as_deref() {
            Some("xyz") => {
                let bytes = std::fs::read(path)?;
                let loaded = Self::parse_xyz(path, &bytes)?;
                *self = loaded;
                Ok(())
            }
            other => Err(CloudscopeError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    fn parse_xyz(path: &Path, bytes: &[u8]) -> Result<Self> {
        let malformed = |reason: String| CloudscopeError::MalformedDataset {
            path: path.display().to_string(),
            reason,
        };

        if bytes.len() < XYZ_HEADER_SIZE {
            return Err(malformed(format!(
                "file is {} bytes, header needs {XYZ_HEADER_SIZE}",
                bytes.len()
            )));
        }

        let dims: [u32; 3] = bytemuck::pod_read_unaligned(&bytes[0..12]);
        let voxel_bits: [u64; 3] = bytemuck::pod_read_unaligned(&bytes[12..XYZ_HEADER_SIZE]);
        let grid_size = UVec3::from_array(dims.map(u32::from_le));
        #[allow(clippy::cast_possible_truncation)]
        let voxel_size =
            Vec3::from_array(voxel_bits.map(|bits| f64::from_bits(u64::from_le(bits)) as f32));

        let payload = &bytes[XYZ_HEADER_SIZE..];
        if payload.len() % 4 != 0 {
            return Err(malformed("density payload is not a whole number of floats".into()));
        }
        let density: Vec<f32> = bytemuck::pod_collect_to_vec::<u8, u32>(payload)
            .into_iter()
            .map(|bits| f32::from_bits(u32::from_le(bits)))
            .collect();

        validate_grid(path, grid_size, voxel_size, density.len())?;
        Ok(Self {
            file_name: path.to_path_buf(),
            grid_size,
            voxel_size,
            density,
            transform: Mat4::IDENTITY,
        })
    }

    /// Writes the grid in `.xyz` layout.
    pub fn save_to_xyz(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut bytes = Vec::with_capacity(XYZ_HEADER_SIZE + self.density.len() * 4);
        for d in self.grid_size.to_array() {
            bytes.extend_from_slice(&d.to_le_bytes());
        }
        for v in self.voxel_size.to_array() {
            bytes.extend_from_slice(&f64::from(v).to_le_bytes());
        }
        for d in &self.density {
            bytes.extend_from_slice(&d.to_le_bytes());
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Returns the file this dataset was loaded from.
    #[must_use]
    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Returns the number of voxels along each axis.
    #[must_use]
    pub fn grid_size(&self) -> UVec3 {
        self.grid_size
    }

    /// Returns the voxel size along each axis.
    #[must_use]
    pub fn voxel_size(&self) -> Vec3 {
        self.voxel_size
    }

    /// Returns the density values, x fastest.
    #[must_use]
    pub fn density(&self) -> &[f32] {
        &self.density
    }

    /// Returns the largest density value (0 for an empty grid).
    #[must_use]
    pub fn max_density(&self) -> f32 {
        self.density.iter().copied().fold(0.0, f32::max)
    }

    /// Returns the model transform.
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Sets the model transform.
    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    /// Returns the untransformed bounding box.
    ///
    /// The grid is centered at the origin and scaled so that its longest
    /// side has length 1.
    #[must_use]
    pub fn local_bounding_box(&self) -> (Vec3, Vec3) {
        let extent = self.grid_size.as_vec3() * self.voxel_size;
        let max_extent = extent.max_element();
        if max_extent <= 0.0 {
            return (Vec3::ZERO, Vec3::ZERO);
        }
        let half = extent / max_extent * 0.5;
        (-half, half)
    }

    /// Returns the axis-aligned bounding box after applying the model transform.
    #[must_use]
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        let (lo, hi) = self.local_bounding_box();
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            let p = self.transform.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }
}

fn validate_grid(path: &Path, grid_size: UVec3, voxel_size: Vec3, num_values: usize) -> Result<()> {
    let malformed = |reason: String| CloudscopeError::MalformedDataset {
        path: path.display().to_string(),
        reason,
    };

    if grid_size.min_element() == 0 {
        return Err(malformed(format!("empty grid size {grid_size}")));
    }
    if !voxel_size.is_finite() || voxel_size.min_element() <= 0.0 {
        return Err(malformed(format!("invalid voxel size {voxel_size}")));
    }
    let Some(expected) = (grid_size.x as usize)
        .checked_mul(grid_size.y as usize)
        .and_then(|xy| xy.checked_mul(grid_size.z as usize))
    else {
        return Err(malformed(format!("grid size {grid_size} is too large")));
    };
    if expected != num_values {
        return Err(malformed(format!(
            "expected {expected} density values, found {num_values}"
        )));
    }
    Ok(())
}
