//! Convert flux tallies to VTK formats for plotting
//!
//! Flux results on a [Mesh](crate::Mesh) are written as a rectilinear grid
//! with one cell data array per energy group, readable by ParaView, Visit, and
//! anything else that understands VTK files.
//!
//! ```rust, no_run
//! # use std::sync::Arc;
//! # use critmc_geometry::{Boundary, Mesh};
//! # use critmc_geometry::vtk::{FluxToVtk, VtkFormat, write_vtk};
//! # use critmc_material::Material;
//! # let m = Arc::new(Material::new(vec![1.0], vec![vec![0.5]], vec![0.0], 0.0, vec![0.0]).unwrap());
//! # let mesh = Mesh::new(Boundary::cube(1.0).unwrap(), [0.5; 3], m).unwrap();
//! let vtk = FluxToVtk::builder()
//!     .include_total(true)
//!     .build()
//!     .convert(&mesh);
//!
//! write_vtk(vtk, "./flux", VtkFormat::Xml).unwrap();
//! ```
mod builder;
mod convert;

#[doc(inline)]
pub use builder::FluxToVtkBuilder;

#[doc(inline)]
pub use convert::FluxToVtk;

// crate modules
use crate::error::Result;
use crate::Mesh;

// standard library
use std::path::Path;

// external crates
use log::debug;
use vtkio::model::Vtk;

/// Available VTK output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VtkFormat {
    /// XML rectilinear grid, `.vtr`
    #[default]
    Xml,
    /// Legacy ascii, `.vtk`
    LegacyAscii,
    /// Legacy binary, `.vtk`
    LegacyBinary,
}

impl VtkFormat {
    /// File extension expected by vtkio for the format
    pub fn extension(&self) -> &'static str {
        match self {
            VtkFormat::Xml => "vtr",
            VtkFormat::LegacyAscii | VtkFormat::LegacyBinary => "vtk",
        }
    }
}

/// Convert the flux of a mesh with the default [FluxToVtk] configuration
pub fn flux_to_vtk(mesh: &Mesh) -> Vtk {
    FluxToVtk::default().convert(mesh)
}

/// Write a Vtk to file in one of the available formats
///
/// The file extension is replaced with whatever is appropriate for the format,
/// so `./flux` and `./flux.vtk` both become `./flux.vtr` for
/// [VtkFormat::Xml].
pub fn write_vtk<P: AsRef<Path>>(vtk: Vtk, path: P, format: VtkFormat) -> Result<()> {
    let path = path.as_ref().with_extension(format.extension());
    debug!("Writing {:?} flux to {}", format, path.display());

    match format {
        VtkFormat::Xml | VtkFormat::LegacyBinary => vtk.export(&path)?,
        VtkFormat::LegacyAscii => vtk.export_ascii(&path)?,
    }

    Ok(())
}
