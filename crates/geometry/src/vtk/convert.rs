// standard library
use std::ops::RangeInclusive;

// critmc modules
use critmc_utils::f;

// internal modules
use crate::vtk::FluxToVtkBuilder;
use crate::{Axis, CellIndex, Mesh};

// extrenal crates
use log::warn;
use vtkio::model::{
    Attribute, Attributes, ByteOrder, Coordinates, DataArray, DataSet, ElementType, Extent,
    IOBuffer, RangeExtent, RectilinearGridPiece, Version, Vtk,
};

/// Convert mesh flux tallies to vtk formats for plotting
///
/// The mesh is always a regular cartesian grid, so the output is a rectilinear
/// grid with cell faces taken directly from [Mesh::face()]. Every selected
/// energy group becomes a cell data array named `group_{g}`.
///
/// The fields remain public for direct use, but for convenience and style
/// preference a builder pattern is also implemented and recommended.
///
/// ```rust
/// # use critmc_geometry::vtk::FluxToVtk;
/// // Only the thermal group, plus the total flux
/// let converter = FluxToVtk::builder()
///     .groups(vec![1])
///     .include_total(true)
///     .build();
/// ```
///
/// Byte ordering matters for binary file compatability with plotting software.
/// ParaView does not care, but Visit only likes big endian, so this is the
/// default.
#[derive(Debug, PartialEq)]
pub struct FluxToVtk {
    /// Target energy group(s)
    pub groups: Vec<usize>,
    /// Include the sum over all groups
    pub include_total: bool,
    /// Include a fissile/non-fissile material map
    pub include_materials: bool,
    /// Byte ordering as big or little endian
    pub byte_order: ByteOrder,
}

// Public API
impl FluxToVtk {
    /// Start with the default configuration
    pub fn new() -> FluxToVtk {
        Default::default()
    }

    /// Get an instance of the [FluxToVtkBuilder]
    pub fn builder() -> FluxToVtkBuilder {
        FluxToVtkBuilder::default()
    }

    /// Convert the flux on a [Mesh] to a vtkio::Vtk object
    pub fn convert(&self, mesh: &Mesh) -> Vtk {
        Vtk {
            version: Version::Auto,
            title: f!("Flux tally ({} groups)", mesh.groups()),
            byte_order: self.byte_order,
            file_path: None,
            data: DataSet::inline(RectilinearGridPiece {
                extent: Self::extent(mesh),
                coords: Self::coordinates(mesh),
                data: self.collect_attributes(mesh),
            }),
        }
    }
}

impl Default for FluxToVtk {
    fn default() -> Self {
        FluxToVtkBuilder::default().build()
    }
}

impl FluxToVtk {
    /// Collect groups, and if none are given fallback to using all groups
    fn collect_group_idx(&self, mesh: &Mesh) -> Vec<usize> {
        if self.groups.is_empty() {
            return (0..mesh.groups()).collect();
        }

        let mut indicies = self
            .groups
            .iter()
            .copied()
            .filter(|g| g < &mesh.groups())
            .collect::<Vec<usize>>();

        if !indicies.is_empty() {
            indicies.sort();
            indicies.dedup();
            indicies
        } else {
            warn!("Warning: No valid group index provided, defaulting to all");
            (0..mesh.groups()).collect()
        }
    }

    /// Defines number of cells in each extent for the rectilinear grid
    fn extent(mesh: &Mesh) -> Extent {
        let [nx, ny, nz] = mesh.dims();
        let range_ext: RangeExtent = [
            RangeInclusive::new(0, nx as i32),
            RangeInclusive::new(0, ny as i32),
            RangeInclusive::new(0, nz as i32),
        ];
        Extent::Ranges(range_ext)
    }

    /// Defines coordinates for rectilinear grid from the cell faces
    fn coordinates(mesh: &Mesh) -> Coordinates {
        let faces = |axis: Axis| -> Vec<f64> {
            (0..=mesh.dims()[axis.index()])
                .map(|i| mesh.face(axis, i))
                .collect()
        };

        Coordinates {
            x: IOBuffer::F64(faces(Axis::X)),
            y: IOBuffer::F64(faces(Axis::Y)),
            z: IOBuffer::F64(faces(Axis::Z)),
        }
    }

    /// Collect cell results into the x-fastest VTK ordering
    fn collect_attributes(&self, mesh: &Mesh) -> Attributes {
        let mut attributes: Attributes = Attributes::new();
        let flux = mesh.flux();

        for g in self.collect_group_idx(mesh) {
            attributes.cell.push(Self::scalar_array(
                f!("group_{g}"),
                flux.group_in_vtk_order(g),
            ));
        }

        if self.include_total {
            let mut total = vec![0.0; flux.cells_per_group()];
            for g in 0..flux.groups() {
                total
                    .iter_mut()
                    .zip(flux.group_in_vtk_order(g))
                    .for_each(|(t, v)| *t += v);
            }
            attributes
                .cell
                .push(Self::scalar_array("total".to_string(), total));
        }

        if self.include_materials {
            let [nx, ny, nz] = mesh.dims();
            let mut fissile = Vec::with_capacity(mesh.n_cells());
            for k in 0..nz {
                for j in 0..ny {
                    for i in 0..nx {
                        let value = match mesh.material_of(CellIndex::new(i, j, k)) {
                            Ok(m) if m.is_fissile() => 1.0,
                            _ => 0.0,
                        };
                        fissile.push(value);
                    }
                }
            }
            attributes
                .cell
                .push(Self::scalar_array("fissile".to_string(), fissile));
        }

        attributes
    }

    fn scalar_array(name: String, values: Vec<f64>) -> Attribute {
        Attribute::DataArray(DataArray {
            name,
            elem: ElementType::Scalars {
                num_comp: 1,
                lookup_table: None,
            },
            data: IOBuffer::F64(values),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Boundary;
    use critmc_material::Material;
    use std::sync::Arc;

    fn mesh() -> Mesh {
        let m = Arc::new(
            Material::new(
                vec![1.0, 1.0],
                vec![vec![0.5, 0.5], vec![0.0, 1.0]],
                vec![0.0, 0.0],
                0.0,
                vec![0.0, 0.0],
            )
            .unwrap(),
        );
        let mut mesh = Mesh::new(Boundary::cube(1.0).unwrap(), [1.0, 1.0, 2.0], m).unwrap();
        mesh.add_flux(CellIndex::new(1, 0, 0), 0, 2.0);
        mesh.add_flux(CellIndex::new(1, 0, 0), 1, 3.0);
        mesh
    }

    #[test]
    fn invalid_groups_fall_back_to_all() {
        let converter = FluxToVtk::builder().groups(vec![5, 7]).build();
        assert_eq!(converter.collect_group_idx(&mesh()), vec![0, 1]);

        let converter = FluxToVtk::builder().groups(vec![1, 1, 9]).build();
        assert_eq!(converter.collect_group_idx(&mesh()), vec![1]);
    }

    #[test]
    fn rectilinear_grid_from_faces() {
        let coords = FluxToVtk::coordinates(&mesh());
        assert_eq!(coords.x, IOBuffer::F64(vec![-1.0, 0.0, 1.0]));
        assert_eq!(coords.z, IOBuffer::F64(vec![-1.0, 1.0]));

        let attributes = FluxToVtk::builder()
            .include_total(true)
            .include_materials(true)
            .build()
            .collect_attributes(&mesh());

        // two groups, total, fissile map
        assert_eq!(attributes.cell.len(), 4);
        let Attribute::DataArray(total) = &attributes.cell[2] else {
            panic!("expected a data array");
        };
        assert_eq!(total.name, "total");
        assert_eq!(total.data, IOBuffer::F64(vec![0.0, 5.0, 0.0, 0.0]));
    }
}
