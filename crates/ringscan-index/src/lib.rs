#![warn(missing_docs)]

//! Triangle surface index for the ringscan lidar simulator.
//!
//! This crate answers one question quickly and reproducibly: where does a ray
//! first touch a triangulated surface?
//!
//! # Architecture
//!
//! - [`Surface`] - Ordered triangle soup being scanned
//! - [`Ray`] - Ray with origin and unit direction
//! - [`SurfaceIndex`] - Bounding volume hierarchy answering nearest-hit queries
//! - [`Hit`] - Nearest intersection: point, triangle index, distance
//! - [`primitives`] - Boxes, cylinders and spheres centered at the origin
//!
//! # Example
//!
//! ```
//! use ringscan_index::{primitives::make_cube, Ray, SurfaceIndex};
//! use ringscan_math::{Point3, Vec3};
//!
//! let index = SurfaceIndex::build(make_cube(1.0)).unwrap();
//! let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 0.0, 0.0));
//!
//! let hit = index.query_nearest(&ray).unwrap();
//! assert!((hit.point.x - 0.5).abs() < 1e-12);
//! ```

mod aabb;
mod bvh;
mod error;
pub mod primitives;
mod ray;
mod triangle;

pub use aabb::Aabb3;
pub use bvh::SurfaceIndex;
pub use error::{IndexError, Result};
pub use ray::{Hit, Ray};
pub use triangle::{Surface, Triangle, TriangleHit};
