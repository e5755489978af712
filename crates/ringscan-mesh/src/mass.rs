//! Mass properties and centering.
//!
//! The scanner sits on the z axis, so a model is usually moved so its center
//! of mass lies on the origin before scanning.

use ringscan_index::Surface;
use ringscan_math::{Point3, Vec3};
use tracing::debug;

use crate::error::{MeshError, Result};

/// Relative size below which the enclosed volume is treated as zero.
const FLAT_VOLUME_RATIO: f64 = 1e-12;

/// Mass properties of a surface, assuming uniform density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    /// Signed enclosed volume. Positive for outward-facing winding.
    pub volume: f64,
    /// Total triangle area.
    pub area: f64,
    /// Center of mass of the enclosed solid, or the area centroid when the
    /// surface encloses no volume.
    pub center_of_mass: Point3,
}

/// Compute volume, area and center of mass.
///
/// Volume uses signed tetrahedra fanned from the bounding box center, which
/// is exact for closed surfaces. Surfaces whose volume is negligible relative
/// to their size fall back to the area-weighted triangle centroid.
pub fn mass_properties(surface: &Surface) -> Result<MassProperties> {
    let bounds = surface.bounds().ok_or(MeshError::EmptyMesh)?;
    let reference = bounds.center();

    let mut volume = 0.0;
    let mut volume_moment = Vec3::zeros();
    let mut area = 0.0;
    let mut area_moment = Vec3::zeros();

    for tri in surface.triangles() {
        let [a, b, c] = tri.vertices.map(|p| p - reference);
        let v = a.dot(&b.cross(&c)) / 6.0;
        volume += v;
        volume_moment += (a + b + c) * (v / 4.0);

        let tri_area = tri.area();
        area += tri_area;
        area_moment += (a + b + c) * (tri_area / 3.0);
    }

    let scale = bounds.extent().max();
    let center_of_mass = if volume.abs() > FLAT_VOLUME_RATIO * scale.powi(3) {
        reference + volume_moment / volume
    } else if area > 0.0 {
        debug!(volume, area, "negligible volume, using area centroid");
        reference + area_moment / area
    } else {
        reference
    };

    Ok(MassProperties {
        volume,
        area,
        center_of_mass,
    })
}

/// Translate a surface so its center of mass sits at the origin.
///
/// Returns the moved surface and the offset that was added to every vertex.
pub fn center_on_mass(surface: Surface) -> Result<(Surface, Vec3)> {
    let props = mass_properties(&surface)?;
    let offset = -props.center_of_mass.coords;
    debug!(
        x = offset.x,
        y = offset.y,
        z = offset.z,
        "centering surface on mass"
    );
    Ok((surface.translated(&offset), offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ringscan_index::primitives::{make_box, make_cube, make_cylinder, make_uv_sphere};
    use ringscan_index::Triangle;

    #[test]
    fn test_cube() {
        let props = mass_properties(&make_cube(2.0)).unwrap();
        assert_relative_eq!(props.volume, 8.0, epsilon = 1e-12);
        assert_relative_eq!(props.area, 24.0, epsilon = 1e-12);
        assert_relative_eq!(props.center_of_mass, Point3::origin(), epsilon = 1e-12);
    }

    #[test]
    fn test_offset_box() {
        let offset = Vec3::new(3.0, -1.0, 2.5);
        let surface = make_box(1.0, 2.0, 3.0).translated(&offset);
        let props = mass_properties(&surface).unwrap();
        assert_relative_eq!(props.volume, 6.0, epsilon = 1e-10);
        assert_relative_eq!(props.center_of_mass, Point3::from(offset), epsilon = 1e-10);
    }

    #[test]
    fn test_sphere_volume_below_analytic() {
        let props = mass_properties(&make_uv_sphere(1.0, 48, 24)).unwrap();
        let analytic = 4.0 / 3.0 * std::f64::consts::PI;
        assert!(props.volume < analytic);
        assert!(props.volume > 0.98 * analytic);
        assert_relative_eq!(props.center_of_mass, Point3::origin(), epsilon = 1e-9);
    }

    #[test]
    fn test_open_tube_centered_on_axis() {
        let surface = make_cylinder(1.0, 2.0, 16, false).translated(&Vec3::new(0.0, 0.0, 5.0));
        let props = mass_properties(&surface).unwrap();
        assert!(props.area > 0.0);
        assert_relative_eq!(props.center_of_mass.z, 5.0, epsilon = 1e-9);
        assert!(props.center_of_mass.x.abs() < 1e-9);
        assert!(props.center_of_mass.y.abs() < 1e-9);
    }

    #[test]
    fn test_flat_triangle() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(3.0, 0.0, 1.0),
            Point3::new(0.0, 3.0, 1.0),
        );
        let props = mass_properties(&Surface::new(vec![tri])).unwrap();
        assert_eq!(props.volume, 0.0);
        assert_relative_eq!(props.area, 4.5, epsilon = 1e-12);
        assert_relative_eq!(
            props.center_of_mass,
            Point3::new(1.0, 1.0, 1.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_empty_surface() {
        assert!(matches!(
            mass_properties(&Surface::new(Vec::new())),
            Err(MeshError::EmptyMesh)
        ));
    }

    #[test]
    fn test_center_on_mass() {
        let surface = make_cube(1.0).translated(&Vec3::new(10.0, 0.0, -4.0));
        let (centered, offset) = center_on_mass(surface).unwrap();
        assert_relative_eq!(offset, Vec3::new(-10.0, 0.0, 4.0), epsilon = 1e-10);
        let props = mass_properties(&centered).unwrap();
        assert_relative_eq!(props.center_of_mass, Point3::origin(), epsilon = 1e-10);
        assert_eq!(centered.len(), 12);
    }
}
