#![warn(missing_docs)]

//! Spinning lidar simulation over triangulated surfaces.
//!
//! A virtual sensor sits on the z axis. At each of `level_count` heights it
//! fires `ray_count` horizontal rays evenly spread around the circle and
//! records where each ray first strikes the surface. Rays that miss record
//! the axis point at that height, so every ring has the same length.
//!
//! # Example
//!
//! ```
//! use ringscan::{scan, SurfaceIndex};
//! use ringscan_index::primitives::make_cube;
//!
//! let index = SurfaceIndex::build(make_cube(1.0))?;
//! let cloud = scan(&index, 1, 4, 0.0, 0.0)?;
//!
//! assert_eq!(cloud.len(), 1);
//! assert!((cloud.levels()[0].points()[0].x - 0.5).abs() < 1e-12);
//! # Ok::<(), ringscan::ScanError>(())
//! ```

pub mod cloud;
pub mod error;
pub mod export;
pub mod ring;
pub mod scan;

pub use cloud::{Level, PointCloudModel, ScanStats};
pub use error::{Result, ScanError};
pub use export::{to_json_string, write_json, write_json_file};
pub use ring::{sample_ring, RingSampler};
pub use scan::{level_heights, scan, ScanEngine};

pub use ringscan_index::{Surface, SurfaceIndex};

use serde::{Deserialize, Serialize};

/// Scan parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Number of height levels (rings).
    pub level_count: usize,
    /// Rays per revolution.
    pub ray_count: usize,
    /// Lowest level height. Defaults to the bottom of the surface.
    pub z_min: Option<f64>,
    /// Highest level height. Defaults to the top of the surface.
    pub z_max: Option<f64>,
    /// Spread levels over the rayon thread pool.
    pub parallel: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            level_count: 200,
            ray_count: 100,
            z_min: None,
            z_max: None,
            parallel: true,
        }
    }
}

impl ScanSettings {
    /// Validate the parts of the settings that do not depend on a surface.
    pub fn validate(&self) -> Result<()> {
        if self.level_count == 0 {
            return Err(ScanError::InvalidConfiguration(
                "level_count must be at least 1".into(),
            ));
        }
        if self.ray_count == 0 {
            return Err(ScanError::InvalidConfiguration(
                "ray_count must be at least 1".into(),
            ));
        }
        if let (Some(lo), Some(hi)) = (self.z_min, self.z_max) {
            if lo > hi {
                return Err(ScanError::InvalidConfiguration(format!(
                    "z_min ({lo}) must not exceed z_max ({hi})"
                )));
            }
        }
        Ok(())
    }
}
