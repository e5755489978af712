//! Triangles, triangle soups and the ray/triangle test.

use ringscan_math::{point_is_finite, Point3, Tolerance, Vec3};

use crate::aabb::Aabb3;
use crate::ray::Ray;

/// A triangle given by three vertex positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Vertex positions in winding order.
    pub vertices: [Point3; 3],
}

/// Parametric result of a ray/triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter.
    pub t: f64,
    /// Barycentric weight of `vertices[1]`.
    pub u: f64,
    /// Barycentric weight of `vertices[2]`.
    pub v: f64,
}

impl Triangle {
    /// Create a triangle from three vertices.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Unnormalized normal, `(b - a) × (c - a)`. Its length is twice the area.
    pub fn normal(&self) -> Vec3 {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a))
    }

    /// Triangle area.
    pub fn area(&self) -> f64 {
        0.5 * self.normal().norm()
    }

    /// Centroid (vertex average).
    pub fn centroid(&self) -> Point3 {
        let [a, b, c] = &self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    /// Bounding box of the three vertices.
    pub fn aabb(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for v in &self.vertices {
            aabb.include_point(v);
        }
        aabb
    }

    /// True if all nine coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(point_is_finite)
    }

    /// True if the area is at or below `min_area`.
    ///
    /// See [`Tolerance::min_area`] for the threshold used by the index.
    pub fn is_degenerate(&self, min_area: f64) -> bool {
        self.area() <= min_area
    }

    /// Translate all vertices by `offset`.
    pub fn translated(&self, offset: &Vec3) -> Self {
        let [a, b, c] = self.vertices;
        Self::new(a + *offset, b + *offset, c + *offset)
    }

    /// Möller–Trumbore ray/triangle intersection.
    ///
    /// The test is two-sided. Rays within `tol.parallel` (as a cosine) of the
    /// triangle plane never hit. Barycentric coordinates are accepted with
    /// `tol.edge` slack so shared edges are watertight, and hits with
    /// `t < tol.ray_origin` are rejected.
    pub fn intersect(&self, ray: &Ray, tol: &Tolerance) -> Option<TriangleHit> {
        let [v0, v1, v2] = self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let dir = ray.direction.as_ref();

        let h = dir.cross(&edge2);
        let det = edge1.dot(&h);

        // det = -dir · (edge1 × edge2), so |det| / |n| is the cosine between
        // the ray and the plane normal.
        let n_len = edge1.cross(&edge2).norm();
        if !(det.abs() > tol.parallel * n_len) {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - v0;
        let u = inv_det * s.dot(&h);
        if !tol.in_unit_range(u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = inv_det * dir.dot(&q);
        if v < -tol.edge || u + v > 1.0 + tol.edge {
            return None;
        }

        let t = inv_det * edge2.dot(&q);
        if t >= tol.ray_origin {
            Some(TriangleHit { t, u, v })
        } else {
            None
        }
    }
}

/// An ordered triangle soup describing the scanned object.
///
/// The scan axis is the z axis through the origin, so callers translate the
/// geometry first (see `ringscan-mesh`). Validity (non-empty, finite) is
/// checked when the surface is indexed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    triangles: Vec<Triangle>,
}

impl Surface {
    /// Wrap a list of triangles.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// The triangles, in input order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True if there are no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounding box of all vertices, `None` for an empty surface.
    pub fn bounds(&self) -> Option<Aabb3> {
        if self.triangles.is_empty() {
            return None;
        }
        let mut aabb = Aabb3::empty();
        for tri in &self.triangles {
            aabb.include_aabb(&tri.aabb());
        }
        Some(aabb)
    }

    /// A copy of the surface moved by `offset`.
    pub fn translated(&self, offset: &Vec3) -> Self {
        Self {
            triangles: self.triangles.iter().map(|t| t.translated(offset)).collect(),
        }
    }

    /// Consume the surface, returning its triangles.
    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }
}

impl From<Vec<Triangle>> for Surface {
    fn from(triangles: Vec<Triangle>) -> Self {
        Self::new(triangles)
    }
}

impl FromIterator<Triangle> for Surface {
    fn from_iter<I: IntoIterator<Item = Triangle>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
