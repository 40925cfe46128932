//! Boundary, mesh, and flux types for cartesian transport
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod axis;
mod boundary;
mod cell;
mod error;
mod flux;
mod mesh;

pub mod vtk;

// inline the important geometry types for a nice public API
#[doc(inline)]
pub use axis::{Axis, BoundaryCondition, Side};

#[doc(inline)]
pub use boundary::Boundary;

#[doc(inline)]
pub use cell::CellIndex;

#[doc(inline)]
pub use flux::Flux;

#[doc(inline)]
pub use mesh::Mesh;

#[doc(inline)]
pub use vtk::{flux_to_vtk, write_vtk};

#[doc(inline)]
pub use error::{Error, Result};
