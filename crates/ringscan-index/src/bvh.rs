//! Bounding volume hierarchy over a triangle surface.
//!
//! Uses binned Surface Area Heuristic (SAH) construction and front-to-back
//! traversal for nearest-hit queries.

use std::sync::Arc;

use ringscan_math::{Point3, Tolerance};
use tracing::debug;

use crate::aabb::{axis_value, Aabb3};
use crate::error::{IndexError, Result};
use crate::ray::{Hit, Ray};
use crate::triangle::Surface;

/// Maximum number of triangles stored in a leaf.
const MAX_LEAF_SIZE: usize = 4;

/// Number of SAH buckets per axis.
const NUM_BUCKETS: usize = 12;

/// Relative cost of visiting an internal node versus testing a triangle.
const TRAVERSAL_COST: f64 = 0.125;

/// A BVH node - either a leaf containing triangles or an internal node with children.
#[derive(Debug, Clone)]
pub(crate) enum BvhNode {
    /// Leaf node containing triangle indices.
    Leaf {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Indices into the surface's triangle list.
        triangles: Vec<usize>,
    },
    /// Internal node with two children.
    Internal {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Left child node.
        left: Box<BvhNode>,
        /// Right child node.
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    /// Bounding box of this node.
    pub(crate) fn aabb(&self) -> &Aabb3 {
        match self {
            BvhNode::Leaf { aabb, .. } | BvhNode::Internal { aabb, .. } => aabb,
        }
    }
}

/// Read-only spatial index answering nearest-hit ray queries against a surface.
///
/// The index holds the surface behind an [`Arc`] and is never mutated after
/// [`build`](SurfaceIndex::build), so it can be shared across threads and
/// queried concurrently without locking.
#[derive(Debug, Clone)]
pub struct SurfaceIndex {
    root: BvhNode,
    surface: Arc<Surface>,
    tolerance: Tolerance,
    degenerate: usize,
}

/// Per-triangle build record: index, padded bounds, centroid of the bounds.
type BuildItem = (usize, Aabb3, Point3);

impl SurfaceIndex {
    /// Build an index with [`Tolerance::DEFAULT`].
    pub fn build(surface: impl Into<Arc<Surface>>) -> Result<Self> {
        Self::build_with_tolerance(surface, Tolerance::DEFAULT)
    }

    /// Build an index over `surface`.
    ///
    /// Fails with [`IndexError::InvalidGeometry`] if the surface is empty,
    /// has a non-finite coordinate, or consists only of degenerate triangles.
    /// Degenerate triangles are left out of the hierarchy and can never be hit.
    pub fn build_with_tolerance(
        surface: impl Into<Arc<Surface>>,
        tolerance: Tolerance,
    ) -> Result<Self> {
        let surface = surface.into();

        if surface.is_empty() {
            return Err(IndexError::InvalidGeometry("surface has no triangles".into()));
        }

        if let Some(idx) = surface.triangles().iter().position(|t| !t.is_finite()) {
            return Err(IndexError::InvalidGeometry(format!(
                "triangle {idx} has a non-finite coordinate"
            )));
        }

        let extent = surface.bounds().map_or(0.0, |b| b.extent().max());
        let min_area = tolerance.min_area(extent);

        let mut items: Vec<BuildItem> = surface
            .triangles()
            .iter()
            .enumerate()
            .filter(|(_, tri)| !tri.is_degenerate(min_area))
            .map(|(idx, tri)| {
                let mut aabb = tri.aabb();
                aabb.expand(tolerance.aabb_padding);
                (idx, aabb, aabb.center())
            })
            .collect();

        let degenerate = surface.len() - items.len();
        if items.is_empty() {
            return Err(IndexError::InvalidGeometry(format!(
                "all {} triangles are degenerate",
                surface.len()
            )));
        }

        let root = build_node(&mut items);
        let index = Self {
            root,
            surface,
            tolerance,
            degenerate,
        };

        debug!(
            triangles = index.surface.len(),
            degenerate,
            nodes = index.node_count(),
            depth = index.depth(),
            "Built surface index"
        );

        Ok(index)
    }

    /// Nearest hit along the ray, if any.
    ///
    /// Among all accepted candidates the one with the smallest `t` wins. A
    /// candidate only replaces the current best when it is strictly nearer,
    /// so exact ties (coincident or edge-sharing triangles) resolve to the
    /// first candidate in traversal order. Traversal visits the nearer child
    /// box first, left child on equal entry distance, which makes the result
    /// a deterministic function of the surface and the ray.
    pub fn query_nearest(&self, ray: &Ray) -> Option<Hit> {
        let mut closest: Option<Hit> = None;
        let mut closest_t = f64::INFINITY;
        self.trace_node_closest(ray, &self.root, &mut closest, &mut closest_t);
        closest
    }

    /// All hits along the ray, sorted by `t`.
    ///
    /// Uses the same traversal order as [`query_nearest`](Self::query_nearest)
    /// and a stable sort, so the first element equals the nearest hit.
    pub fn query_all(&self, ray: &Ray) -> Vec<Hit> {
        let mut hits = Vec::new();
        self.trace_node(ray, &self.root, &mut hits);
        hits.sort_by(|a, b| a.t.total_cmp(&b.t));
        hits
    }

    /// Trace a ray through a node, collecting every hit.
    fn trace_node(&self, ray: &Ray, node: &BvhNode, hits: &mut Vec<Hit>) {
        match node {
            BvhNode::Leaf { aabb, triangles } => {
                if ray.intersect_aabb(aabb).is_some() {
                    hits.extend(triangles.iter().filter_map(|&idx| self.test_triangle(ray, idx)));
                }
            }
            BvhNode::Internal { aabb, left, right } => {
                if ray.intersect_aabb(aabb).is_some() {
                    for child in ordered_children(ray, left, right).into_iter().flatten() {
                        self.trace_node(ray, child, hits);
                    }
                }
            }
        }
    }

    /// Trace a ray, keeping only the closest hit.
    fn trace_node_closest(
        &self,
        ray: &Ray,
        node: &BvhNode,
        closest: &mut Option<Hit>,
        closest_t: &mut f64,
    ) {
        let Some((t_min, _)) = ray.intersect_aabb(node.aabb()) else {
            return;
        };
        // Early out if the box entry is beyond the current closest
        if t_min >= *closest_t {
            return;
        }

        match node {
            BvhNode::Leaf { triangles, .. } => {
                for &idx in triangles {
                    if let Some(hit) = self.test_triangle(ray, idx) {
                        if hit.t < *closest_t {
                            *closest_t = hit.t;
                            *closest = Some(hit);
                        }
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                for child in ordered_children(ray, left, right).into_iter().flatten() {
                    self.trace_node_closest(ray, child, closest, closest_t);
                }
            }
        }
    }

    /// Test a ray against a single triangle of the surface.
    fn test_triangle(&self, ray: &Ray, idx: usize) -> Option<Hit> {
        let tri = &self.surface.triangles()[idx];
        tri.intersect(ray, &self.tolerance).map(|h| Hit {
            t: h.t,
            point: ray.at(h.t),
            triangle: idx,
            u: h.u,
            v: h.v,
        })
    }

    /// The indexed surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Tolerances used for every query.
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Bounds of all indexed (non-degenerate) triangles, padded.
    pub fn bounds(&self) -> Aabb3 {
        *self.root.aabb()
    }

    /// Number of triangles in the surface, including degenerate ones.
    pub fn triangle_count(&self) -> usize {
        self.surface.len()
    }

    /// Number of triangles excluded as degenerate.
    pub fn degenerate_count(&self) -> usize {
        self.degenerate
    }

    /// Total number of nodes in the hierarchy.
    pub fn node_count(&self) -> usize {
        fn count(node: &BvhNode) -> usize {
            match node {
                BvhNode::Leaf { .. } => 1,
                BvhNode::Internal { left, right, .. } => 1 + count(left) + count(right),
            }
        }
        count(&self.root)
    }

    /// Depth of the hierarchy; a single leaf has depth 1.
    pub fn depth(&self) -> usize {
        fn depth(node: &BvhNode) -> usize {
            match node {
                BvhNode::Leaf { .. } => 1,
                BvhNode::Internal { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        depth(&self.root)
    }
}

/// Children the ray enters, nearer entry first (left on ties).
fn ordered_children<'a>(
    ray: &Ray,
    left: &'a BvhNode,
    right: &'a BvhNode,
) -> [Option<&'a BvhNode>; 2] {
    let left_t = ray.intersect_aabb(left.aabb()).map(|(t, _)| t);
    let right_t = ray.intersect_aabb(right.aabb()).map(|(t, _)| t);

    match (left_t, right_t) {
        (Some(lt), Some(rt)) if rt < lt => [Some(right), Some(left)],
        (Some(_), Some(_)) => [Some(left), Some(right)],
        (Some(_), None) => [Some(left), None],
        (None, Some(_)) => [Some(right), None],
        (None, None) => [None, None],
    }
}

/// Build a BVH node recursively using SAH.
fn build_node(items: &mut [BuildItem]) -> BvhNode {
    let mut bounds = Aabb3::empty();
    for (_, aabb, _) in items.iter() {
        bounds.include_aabb(aabb);
    }

    if items.len() <= MAX_LEAF_SIZE {
        return BvhNode::Leaf {
            aabb: bounds,
            triangles: items.iter().map(|(idx, _, _)| *idx).collect(),
        };
    }

    let mid = match find_best_split(items, &bounds) {
        Some((axis, pos)) => partition_items(items, axis, pos),
        None => 0,
    };

    // Fall back to a median split when SAH cannot separate the items
    let mid = if mid == 0 || mid == items.len() {
        items.sort_by(|a, b| a.0.cmp(&b.0));
        items.len() / 2
    } else {
        mid
    };

    let (left_items, right_items) = items.split_at_mut(mid);

    BvhNode::Internal {
        aabb: bounds,
        left: Box::new(build_node(left_items)),
        right: Box::new(build_node(right_items)),
    }
}

/// Find the best split axis and position using SAH.
///
/// Returns `None` when no axis has a usable centroid spread.
fn find_best_split(items: &[BuildItem], bounds: &Aabb3) -> Option<(usize, f64)> {
    let mut centroid_bounds = Aabb3::empty();
    for (_, _, c) in items {
        centroid_bounds.include_point(c);
    }

    let total_area = bounds.surface_area();
    if total_area <= 0.0 {
        return None;
    }

    let mut best: Option<(f64, usize, f64)> = None;

    for axis in 0..3 {
        let axis_min = axis_value(&centroid_bounds.min, axis);
        let axis_extent = axis_value(&centroid_bounds.max, axis) - axis_min;

        if axis_extent < 1e-12 {
            continue;
        }

        let mut bucket_counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];

        for (_, aabb, centroid) in items {
            let c = axis_value(centroid, axis);
            let b = ((c - axis_min) / axis_extent * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);

            bucket_counts[b] += 1;
            bucket_bounds[b].include_aabb(aabb);
        }

        for split in 1..NUM_BUCKETS {
            let mut left_count = 0;
            let mut left_bounds = Aabb3::empty();
            for i in 0..split {
                left_count += bucket_counts[i];
                left_bounds.include_aabb(&bucket_bounds[i]);
            }

            let mut right_count = 0;
            let mut right_bounds = Aabb3::empty();
            for i in split..NUM_BUCKETS {
                right_count += bucket_counts[i];
                right_bounds.include_aabb(&bucket_bounds[i]);
            }

            if left_count == 0 || right_count == 0 {
                continue;
            }

            let cost = TRAVERSAL_COST
                + left_bounds.surface_area() / total_area * left_count as f64
                + right_bounds.surface_area() / total_area * right_count as f64;

            if best.map_or(true, |(best_cost, _, _)| cost < best_cost) {
                let pos = axis_min + (split as f64 / NUM_BUCKETS as f64) * axis_extent;
                best = Some((cost, axis, pos));
            }
        }
    }

    best.map(|(_, axis, pos)| (axis, pos))
}

/// Partition items by centroid along an axis. Returns the split index.
fn partition_items(items: &mut [BuildItem], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = items.len();

    while left < right {
        if axis_value(&items[left].2, axis) < pos {
            left += 1;
        } else {
            right -= 1;
            items.swap(left, right);
        }
    }

    left
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{make_box, make_cube, make_uv_sphere};
    use crate::triangle::Triangle;
    use ringscan_math::Vec3;

    fn brute_force_nearest(surface: &Surface, ray: &Ray, tol: &Tolerance) -> Option<f64> {
        let min_area = tol.min_area(surface.bounds().unwrap().extent().max());
        surface
            .triangles()
            .iter()
            .filter(|t| !t.is_degenerate(min_area))
            .filter_map(|t| t.intersect(ray, tol))
            .map(|h| h.t)
            .min_by(|a, b| a.total_cmp(b))
    }

    #[test]
    fn test_build_cube() {
        let index = SurfaceIndex::build(make_cube(1.0)).unwrap();
        assert_eq!(index.triangle_count(), 12);
        assert_eq!(index.degenerate_count(), 0);
        assert!(index.node_count() >= 1);
    }

    #[test]
    fn test_build_empty_fails() {
        let err = SurfaceIndex::build(Surface::default()).unwrap_err();
        assert!(matches!(err, IndexError::InvalidGeometry(_)));
    }

    #[test]
    fn test_build_non_finite_fails() {
        let mut triangles = make_cube(1.0).into_triangles();
        triangles[3].vertices[1].y = f64::INFINITY;
        let err = SurfaceIndex::build(Surface::new(triangles)).unwrap_err();
        assert_eq!(
            err,
            IndexError::InvalidGeometry("triangle 3 has a non-finite coordinate".into())
        );
    }

    #[test]
    fn test_build_all_degenerate_fails() {
        let tri = Triangle::new(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        let err = SurfaceIndex::build(Surface::new(vec![tri, tri])).unwrap_err();
        assert!(matches!(err, IndexError::InvalidGeometry(_)));
    }

    #[test]
    fn test_degenerate_triangles_excluded() {
        let mut triangles = make_cube(1.0).into_triangles();
        // A sliver lying across the +x ray path, in front of the cube face.
        triangles.push(Triangle::new(
            Point3::new(0.25, -0.5, 0.0),
            Point3::new(0.25, 0.5, 0.0),
            Point3::new(0.25, 0.0, 0.0),
        ));
        let index = SurfaceIndex::build(Surface::new(triangles)).unwrap();
        assert_eq!(index.degenerate_count(), 1);

        let ray = Ray::new(Point3::origin(), Vec3::x());
        let hit = index.query_nearest(&ray).unwrap();
        assert!((hit.t - 0.5).abs() < 1e-12);
        assert_ne!(hit.triangle, 12);
    }

    #[test]
    fn test_micro_scale_cube_is_indexed() {
        let index = SurfaceIndex::build(make_cube(1e-7)).unwrap();
        assert_eq!(index.degenerate_count(), 0);

        let ray = Ray::new(Point3::origin(), Vec3::x());
        let hit = index.query_nearest(&ray).unwrap();
        assert!((hit.t - 5e-8).abs() < 1e-20);
    }

    #[test]
    fn test_query_cube_from_center() {
        let index = SurfaceIndex::build(make_cube(1.0)).unwrap();
        for dir in [Vec3::x(), Vec3::y(), -Vec3::x(), -Vec3::y(), Vec3::z()] {
            let ray = Ray::new(Point3::origin(), dir);
            let hit = index.query_nearest(&ray).unwrap();
            assert!((hit.t - 0.5).abs() < 1e-12);
            assert!((hit.point - Point3::from(dir * 0.5)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_query_miss() {
        let index = SurfaceIndex::build(make_cube(1.0)).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, 2.0), Vec3::x());
        assert!(index.query_nearest(&ray).is_none());
        assert!(index.query_all(&ray).is_empty());
    }

    #[test]
    fn test_query_all_entry_and_exit() {
        let index = SurfaceIndex::build(make_cube(1.0)).unwrap();
        let ray = Ray::new(Point3::new(-2.0, 0.1, 0.2), Vec3::x());
        let hits = index.query_all(&ray);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].point.x + 0.5).abs() < 1e-12);
        assert!((hits[1].point.x - 0.5).abs() < 1e-12);
        assert_eq!(index.query_nearest(&ray), Some(hits[0]));
    }

    #[test]
    fn test_shared_edge_tie_break() {
        // The +x ray from the center crosses the diagonal shared by the two
        // triangles of the +x face, so both report the same t.
        let index = SurfaceIndex::build(make_cube(1.0)).unwrap();
        let ray = Ray::new(Point3::origin(), Vec3::x());
        let all = index.query_all(&ray);
        assert_eq!(all.len(), 2);
        assert!((all[0].t - all[1].t).abs() < 1e-12);
        assert_eq!(index.query_nearest(&ray), Some(all[0]));
    }

    #[test]
    fn test_coincident_triangles_first_wins() {
        let tri = Triangle::new(
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(1.0, 1.0, -1.0),
            Point3::new(1.0, 0.0, 1.0),
        );
        let index = SurfaceIndex::build(Surface::new(vec![tri, tri])).unwrap();
        let ray = Ray::new(Point3::origin(), Vec3::x());
        assert_eq!(index.query_nearest(&ray).unwrap().triangle, 0);
        let again = index.query_nearest(&ray).unwrap();
        assert_eq!(again.triangle, 0);
    }

    #[test]
    fn test_matches_brute_force() {
        let surface = make_uv_sphere(2.0, 24, 12);
        let index = SurfaceIndex::build(surface.clone()).unwrap();
        let tol = Tolerance::DEFAULT;
        let origins = [
            Point3::origin(),
            Point3::new(0.3, -0.2, 1.1),
            Point3::new(-5.0, 0.4, 0.1),
            Point3::new(0.0, 0.0, 3.0),
        ];
        for origin in origins {
            for k in 0..37 {
                let a = k as f64 * 0.17;
                let dir = Vec3::new(a.cos(), a.sin(), (a * 0.5).sin() * 0.3);
                let ray = Ray::new(origin, dir);
                let bvh = index.query_nearest(&ray).map(|h| h.t);
                let brute = brute_force_nearest(&surface, &ray, &tol);
                match (bvh, brute) {
                    (Some(a), Some(b)) => assert!((a - b).abs() < 1e-12),
                    (None, None) => {}
                    other => panic!("mismatch for {origin:?} {dir:?}: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_large_mesh_depth() {
        let index = SurfaceIndex::build(make_uv_sphere(1.0, 64, 32)).unwrap();
        assert!(index.depth() < 24);
        assert!(index.node_count() > 1);
    }

    #[test]
    fn test_bounds_cover_surface() {
        let surface = make_box(2.0, 1.0, 4.0);
        let index = SurfaceIndex::build(surface).unwrap();
        let b = index.bounds();
        assert!(b.contains_point(&Point3::new(1.0, 0.5, 2.0)));
        assert!(b.contains_point(&Point3::new(-1.0, -0.5, -2.0)));
    }

    #[test]
    fn test_index_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SurfaceIndex>();
    }
}
