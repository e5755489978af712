//! Scan engine - cast rings of rays at a sequence of heights.

use rayon::prelude::*;
use ringscan_index::SurfaceIndex;
use ringscan_math::Point3;
use tracing::{debug, info, warn};

use crate::cloud::{Level, PointCloudModel};
use crate::error::{Result, ScanError};
use crate::ring::RingSampler;
use crate::ScanSettings;

/// Runs scans against one indexed surface.
///
/// Holds a shared borrow of the index; any number of scans may run against
/// it, from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct ScanEngine<'a> {
    index: &'a SurfaceIndex,
}

impl<'a> ScanEngine<'a> {
    /// Create an engine over an index.
    pub fn new(index: &'a SurfaceIndex) -> Self {
        Self { index }
    }

    /// The index being scanned.
    pub fn index(&self) -> &'a SurfaceIndex {
        self.index
    }

    /// Scan using the settings' height range, falling back to the surface's
    /// z extent for any bound the settings leave unset.
    pub fn scan(&self, settings: &ScanSettings) -> Result<PointCloudModel> {
        let (z_min, z_max) = self.z_range(settings);
        self.scan_range(
            settings.level_count,
            settings.ray_count,
            z_min,
            z_max,
            settings.parallel,
        )
    }

    /// Height range a scan with these settings would cover.
    pub fn z_range(&self, settings: &ScanSettings) -> (f64, f64) {
        let bounds = self.index.surface().bounds();
        let z_min = settings
            .z_min
            .or_else(|| bounds.map(|b| b.min.z))
            .unwrap_or(0.0);
        let z_max = settings
            .z_max
            .or_else(|| bounds.map(|b| b.max.z))
            .unwrap_or(0.0);
        (z_min, z_max)
    }

    /// Scan `level_count` rings of `ray_count` rays between `z_min` and
    /// `z_max` inclusive.
    ///
    /// The configuration is validated before any ray is cast; on error no
    /// partial model is produced. Each ray yields its nearest hit, or the
    /// axis point `(0, 0, height)` when it misses. With `parallel` set,
    /// levels are distributed over the rayon pool; the result is identical
    /// to a sequential run.
    pub fn scan_range(
        &self,
        level_count: usize,
        ray_count: usize,
        z_min: f64,
        z_max: f64,
        parallel: bool,
    ) -> Result<PointCloudModel> {
        validate_range(level_count, z_min, z_max)?;
        let sampler = RingSampler::new(ray_count)?;
        let heights = level_heights(z_min, z_max, level_count);

        info!(
            levels = level_count,
            rays = ray_count,
            z_min,
            z_max,
            parallel,
            "Starting scan"
        );

        let levels: Vec<Level> = if parallel {
            heights
                .par_iter()
                .enumerate()
                .map(|(idx, &z)| self.scan_level(&sampler, z, idx))
                .collect()
        } else {
            heights
                .iter()
                .enumerate()
                .map(|(idx, &z)| self.scan_level(&sampler, z, idx))
                .collect()
        };

        let model = PointCloudModel::new(levels, ray_count);
        let stats = model.stats();
        info!(
            levels = stats.levels,
            hits = stats.hits,
            misses = stats.misses,
            "Scan complete"
        );

        Ok(model)
    }

    /// Cast one ring at height `z`.
    fn scan_level(&self, sampler: &RingSampler, z: f64, index: usize) -> Level {
        let fallback = Point3::new(0.0, 0.0, z);
        let (points, hits): (Vec<Point3>, Vec<bool>) = sampler
            .sample(z)
            .iter()
            .map(|ray| match self.index.query_nearest(ray) {
                Some(hit) => (hit.point, true),
                None => (fallback, false),
            })
            .unzip();

        let level = Level::new(z, points, hits);
        let hit_count = level.hit_count();
        if hit_count == 0 {
            warn!(level = index, z, "No ray hit the surface at this level");
        } else {
            debug!(level = index, z, hits = hit_count, "Scanned level");
        }
        level
    }
}

/// Scan an indexed surface with explicit parameters, in parallel.
///
/// Requires `level_count >= 1`, `ray_count >= 1` and finite
/// `z_min <= z_max`; otherwise fails with
/// [`ScanError::InvalidConfiguration`].
pub fn scan(
    index: &SurfaceIndex,
    level_count: usize,
    ray_count: usize,
    z_min: f64,
    z_max: f64,
) -> Result<PointCloudModel> {
    ScanEngine::new(index).scan_range(level_count, ray_count, z_min, z_max, true)
}

/// Evenly spaced heights over `[z_min, z_max]`.
///
/// One level sits at `z_min`. Otherwise height `i` is
/// `z_min + (z_max − z_min)·i/(n − 1)`, with the first and last heights set
/// to exactly `z_min` and `z_max`. Finite bounds always give finite heights,
/// even when their difference overflows.
pub fn level_heights(z_min: f64, z_max: f64, level_count: usize) -> Vec<f64> {
    match level_count {
        0 => Vec::new(),
        1 => vec![z_min],
        n => {
            let span = z_max - z_min;
            let last = (n - 1) as f64;
            let mut heights: Vec<f64> = (0..n)
                .map(|i| {
                    let t = i as f64 / last;
                    if span.is_finite() {
                        z_min + span * t
                    } else {
                        z_min * (1.0 - t) + z_max * t
                    }
                })
                .collect();
            heights[0] = z_min;
            heights[n - 1] = z_max;
            heights
        }
    }
}

fn validate_range(level_count: usize, z_min: f64, z_max: f64) -> Result<()> {
    if level_count == 0 {
        return Err(ScanError::InvalidConfiguration(
            "level_count must be at least 1".into(),
        ));
    }
    if !z_min.is_finite() || !z_max.is_finite() {
        return Err(ScanError::InvalidConfiguration(format!(
            "height range must be finite, got [{z_min}, {z_max}]"
        )));
    }
    if z_min > z_max {
        return Err(ScanError::InvalidConfiguration(format!(
            "z_min ({z_min}) must not exceed z_max ({z_max})"
        )));
    }
    Ok(())
}
