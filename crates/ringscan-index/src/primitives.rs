//! Primitive triangulated surfaces centered at the origin.
//!
//! Handy as synthetic scan targets and as known shapes for checking scans.

use std::f64::consts::{PI, TAU};

use ringscan_math::Point3;

use crate::triangle::{Surface, Triangle};

/// An axis-aligned box with the given edge lengths, centered at the origin.
///
/// Twelve triangles, outward winding.
pub fn make_box(sx: f64, sy: f64, sz: f64) -> Surface {
    let (hx, hy, hz) = (sx / 2.0, sy / 2.0, sz / 2.0);
    let vertices = [
        Point3::new(-hx, -hy, -hz),
        Point3::new(hx, -hy, -hz),
        Point3::new(hx, hy, -hz),
        Point3::new(-hx, hy, -hz),
        Point3::new(-hx, -hy, hz),
        Point3::new(hx, -hy, hz),
        Point3::new(hx, hy, hz),
        Point3::new(-hx, hy, hz),
    ];
    let faces = [
        // Bottom
        [0, 2, 1],
        [0, 3, 2],
        // Top
        [4, 5, 6],
        [4, 6, 7],
        // Front (-y)
        [0, 1, 5],
        [0, 5, 4],
        // Back (+y)
        [2, 3, 7],
        [2, 7, 6],
        // Left (-x)
        [0, 4, 7],
        [0, 7, 3],
        // Right (+x)
        [1, 2, 6],
        [1, 6, 5],
    ];
    faces
        .iter()
        .map(|&[a, b, c]| Triangle::new(vertices[a], vertices[b], vertices[c]))
        .collect()
}

/// A cube with edge length `size`, centered at the origin.
pub fn make_cube(size: f64) -> Surface {
    make_box(size, size, size)
}

/// A cylinder around the z axis spanning `z ∈ [-height/2, height/2]`.
///
/// The side is a prism with `segments` flat facets whose vertices lie on the
/// circle of `radius`, the first at angle 0. Caps are triangle fans around
/// the axis and are only added when `capped` is set.
pub fn make_cylinder(radius: f64, height: f64, segments: usize, capped: bool) -> Surface {
    let segments = segments.max(3);
    let hz = height / 2.0;
    let ring = |z: f64| -> Vec<Point3> {
        (0..segments)
            .map(|i| {
                let a = TAU * i as f64 / segments as f64;
                Point3::new(radius * a.cos(), radius * a.sin(), z)
            })
            .collect()
    };
    let bottom = ring(-hz);
    let top = ring(hz);

    let mut triangles = Vec::with_capacity(segments * if capped { 4 } else { 2 });
    for i in 0..segments {
        let j = (i + 1) % segments;
        triangles.push(Triangle::new(bottom[i], bottom[j], top[j]));
        triangles.push(Triangle::new(bottom[i], top[j], top[i]));
    }

    if capped {
        let bottom_center = Point3::new(0.0, 0.0, -hz);
        let top_center = Point3::new(0.0, 0.0, hz);
        for i in 0..segments {
            let j = (i + 1) % segments;
            triangles.push(Triangle::new(bottom_center, bottom[j], bottom[i]));
            triangles.push(Triangle::new(top_center, top[i], top[j]));
        }
    }

    Surface::new(triangles)
}

/// A UV sphere of `radius` centered at the origin.
///
/// `segments` divisions around the z axis and `rings` divisions from pole to
/// pole. Pole caps are triangle fans, so no triangle is degenerate. All
/// vertices lie exactly on the sphere.
pub fn make_uv_sphere(radius: f64, segments: usize, rings: usize) -> Surface {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let vertex = |ring: usize, seg: usize| -> Point3 {
        let theta = PI * ring as f64 / rings as f64;
        let phi = TAU * seg as f64 / segments as f64;
        Point3::new(
            radius * theta.sin() * phi.cos(),
            radius * theta.sin() * phi.sin(),
            radius * theta.cos(),
        )
    };
    let north = Point3::new(0.0, 0.0, radius);
    let south = Point3::new(0.0, 0.0, -radius);

    let mut triangles = Vec::new();
    for s in 0..segments {
        let t = (s + 1) % segments;
        triangles.push(Triangle::new(north, vertex(1, s), vertex(1, t)));
        triangles.push(Triangle::new(south, vertex(rings - 1, t), vertex(rings - 1, s)));
    }
    for r in 1..rings - 1 {
        for s in 0..segments {
            let t = (s + 1) % segments;
            let (a, b) = (vertex(r, s), vertex(r, t));
            let (c, d) = (vertex(r + 1, s), vertex(r + 1, t));
            triangles.push(Triangle::new(a, c, d));
            triangles.push(Triangle::new(a, d, b));
        }
    }

    Surface::new(triangles)
}
