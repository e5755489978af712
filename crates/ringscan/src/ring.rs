//! Ray rings - the rays fired by one revolution of the sensor.

use std::f64::consts::TAU;

use ringscan_index::Ray;
use ringscan_math::{Dir3, Point3, Vec3};

use crate::error::{Result, ScanError};

/// Generates the rays of one scan level.
///
/// Ray `i` of `ray_count` starts on the scan axis at `(0, 0, height)` and
/// points along azimuth `2π·i/ray_count` in the horizontal plane. The
/// direction table is computed once, so every level uses bit-identical
/// directions and ring point `j` is comparable across levels.
#[derive(Debug, Clone)]
pub struct RingSampler {
    angles: Vec<f64>,
    directions: Vec<Dir3>,
}

impl RingSampler {
    /// Create a sampler firing `ray_count` rays per revolution.
    pub fn new(ray_count: usize) -> Result<Self> {
        if ray_count == 0 {
            return Err(ScanError::InvalidConfiguration(
                "ray_count must be at least 1".into(),
            ));
        }

        let angles: Vec<f64> = (0..ray_count)
            .map(|i| TAU * i as f64 / ray_count as f64)
            .collect();
        let directions = angles
            .iter()
            .map(|a| {
                let (sin, cos) = a.sin_cos();
                Dir3::new_unchecked(Vec3::new(cos, sin, 0.0))
            })
            .collect();

        Ok(Self { angles, directions })
    }

    /// Number of rays per level.
    pub fn ray_count(&self) -> usize {
        self.angles.len()
    }

    /// Azimuth of each ray in radians, ascending from 0.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// The rays for a level at `height`, in azimuth order.
    pub fn sample(&self, height: f64) -> Vec<Ray> {
        let origin = Point3::new(0.0, 0.0, height);
        self.directions
            .iter()
            .map(|dir| Ray::from_unit(origin, *dir))
            .collect()
    }
}

/// The rays for a single level; see [`RingSampler`].
pub fn sample_ring(height: f64, ray_count: usize) -> Result<Vec<Ray>> {
    Ok(RingSampler::new(ray_count)?.sample(height))
}
