//! The leveled point cloud produced by a scan.

use ringscan_math::Point3;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// One ring of samples at a fixed height.
///
/// Point `j` was cast at azimuth `2π·j/ray_count`. Rays that missed the
/// surface hold the fallback point `(0, 0, height)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    height: f64,
    points: Vec<Point3>,
    hits: Vec<bool>,
}

impl Level {
    pub(crate) fn new(height: f64, points: Vec<Point3>, hits: Vec<bool>) -> Self {
        debug_assert_eq!(points.len(), hits.len());
        Self {
            height,
            points,
            hits,
        }
    }

    /// Height (z) of the ring origin.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Sampled points in azimuth order.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Number of points, equal to the ray count.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the level holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether ray `j` struck the surface. Out-of-range indices are misses.
    pub fn is_hit(&self, j: usize) -> bool {
        self.hits.get(j).copied().unwrap_or(false)
    }

    /// Number of rays that struck the surface.
    pub fn hit_count(&self) -> usize {
        self.hits.iter().filter(|h| **h).count()
    }

    /// The point substituted for rays that miss at this level.
    pub fn fallback_point(&self) -> Point3 {
        Point3::new(0.0, 0.0, self.height)
    }
}

/// Summary counts for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ScanStats {
    /// Number of levels.
    pub levels: usize,
    /// Total rays cast.
    pub rays_cast: usize,
    /// Rays that struck the surface.
    pub hits: usize,
    /// Rays that fell back to the axis point.
    pub misses: usize,
}

/// Ordered levels of a scan, ascending by height.
///
/// Built once by the scan engine and read-only afterwards. Serializes as a
/// list of levels, each a list of `{"x", "y", "z"}` objects.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloudModel {
    levels: Vec<Level>,
    ray_count: usize,
}

impl PointCloudModel {
    pub(crate) fn new(levels: Vec<Level>, ray_count: usize) -> Self {
        Self { levels, ray_count }
    }

    /// All levels, lowest first.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Level `i`, if it exists.
    pub fn level(&self, i: usize) -> Option<&Level> {
        self.levels.get(i)
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True if there are no levels.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Points per level.
    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    /// Every point, level by level, in azimuth order.
    pub fn iter_points(&self) -> impl Iterator<Item = &Point3> + '_ {
        self.levels.iter().flat_map(|l| l.points.iter())
    }

    /// Hit and miss counts.
    pub fn stats(&self) -> ScanStats {
        let rays_cast = self.levels.iter().map(Level::len).sum();
        let hits = self.levels.iter().map(Level::hit_count).sum();
        ScanStats {
            levels: self.levels.len(),
            rays_cast,
            hits,
            misses: rays_cast - hits,
        }
    }
}

/// `{"x": .., "y": .., "z": ..}` view of a point.
struct XyzPoint<'a>(&'a Point3);

impl Serialize for XyzPoint<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Point", 3)?;
        s.serialize_field("x", &self.0.x)?;
        s.serialize_field("y", &self.0.y)?;
        s.serialize_field("z", &self.0.z)?;
        s.end()
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.points.iter().map(XyzPoint))
    }
}

impl Serialize for PointCloudModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.levels)
    }
}
