//! STL loading.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use ringscan_index::{Surface, Triangle};
use ringscan_math::Point3;
use tracing::debug;

use crate::error::{MeshError, Result};

/// Load an ASCII or binary STL file.
pub fn load_stl(path: impl AsRef<Path>) -> Result<Surface> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let surface = read_stl(&mut reader)?;
    debug!(path = %path.display(), triangles = surface.len(), "loaded STL");
    Ok(surface)
}

/// Read an ASCII or binary STL from any seekable reader.
///
/// Coordinates are widened from the file's `f32` to `f64`. Triangles keep
/// their file order.
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> Result<Surface> {
    let mesh = stl_io::read_stl(reader)?;
    let vertices: Vec<Point3> = mesh
        .vertices
        .iter()
        .map(|v| Point3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2])))
        .collect();
    let faces: Vec<[usize; 3]> = mesh.faces.iter().map(|f| f.vertices).collect();
    surface_from_indexed(&vertices, &faces)
}

/// Build a surface from shared vertices and index triples.
///
/// Fails if there are no faces or a face points past the vertex list.
pub fn surface_from_indexed(vertices: &[Point3], faces: &[[usize; 3]]) -> Result<Surface> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mut triangles = Vec::with_capacity(faces.len());
    for (face, indices) in faces.iter().enumerate() {
        let mut corners = [Point3::origin(); 3];
        for (corner, &vertex) in corners.iter_mut().zip(indices) {
            *corner = *vertices.get(vertex).ok_or(MeshError::InvalidFace {
                face,
                vertex,
                count: vertices.len(),
            })?;
        }
        let [a, b, c] = corners;
        triangles.push(Triangle::new(a, b, c));
    }
    Ok(Surface::new(triangles))
}
