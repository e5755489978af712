#![warn(missing_docs)]

//! Mesh input for ringscan: STL loading and centering on the scan axis.

mod error;
mod load;
mod mass;

pub use error::{MeshError, Result};
pub use load::{load_stl, read_stl, surface_from_indexed};
pub use mass::{center_on_mass, mass_properties, MassProperties};
