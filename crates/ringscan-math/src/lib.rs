#![warn(missing_docs)]

//! Math types for the ringscan lidar simulator.
//!
//! Thin aliases over nalgebra for points, vectors and directions, plus the
//! tolerance set used by the ray/triangle intersection code.

use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Tolerances for ray casting against triangulated surfaces.
///
/// `ray_origin` and `aabb_padding` are lengths in model units. `edge` is a
/// barycentric slack and `parallel` a cosine, so both are unitless.
/// `degenerate_area` is relative to the squared extent of the surface, so
/// the same defaults work for a part modelled in metres or in microns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Minimum ray parameter for an accepted hit. Hits closer than this to
    /// the ray origin are discarded.
    pub ray_origin: f64,
    /// Slack on barycentric coordinates so rays through a shared edge or
    /// vertex do not fall between neighbouring triangles.
    pub edge: f64,
    /// Triangles with area at or below this fraction of the surface's
    /// squared extent are degenerate.
    pub degenerate_area: f64,
    /// Rays whose direction is closer than this (as a cosine) to a
    /// triangle's plane are treated as parallel to it.
    pub parallel: f64,
    /// Padding added to every triangle bounding box.
    pub aabb_padding: f64,
}

impl Tolerance {
    /// Default tolerances, suitable for meshes in millimetre or metre units.
    pub const DEFAULT: Self = Self {
        ray_origin: 1e-9,
        edge: 1e-9,
        degenerate_area: 1e-14,
        parallel: 1e-12,
        aabb_padding: 1e-7,
    };

    /// Smallest non-degenerate triangle area for a surface whose largest
    /// bounding-box side is `extent`.
    pub fn min_area(&self, extent: f64) -> f64 {
        self.degenerate_area * extent * extent
    }

    /// Check whether a barycentric coordinate lies in `[0, 1]` with edge slack.
    pub fn in_unit_range(&self, b: f64) -> bool {
        b >= -self.edge && b <= 1.0 + self.edge
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Returns true if every coordinate of the point is finite.
#[inline]
pub fn point_is_finite(p: &Point3) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}
