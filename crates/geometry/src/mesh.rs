// standard library
use std::sync::Arc;

// crate modules
use crate::axis::{Axis, Side};
use crate::boundary::Boundary;
use crate::cell::CellIndex;
use crate::error::{Error, Result};
use crate::flux::Flux;

// critmc modules
use critmc_material::Material;
use critmc_utils::{f, ValueExt};

// external crates
use itertools::iproduct;
use log::debug;
use nalgebra::Vector3;

/// Relative tolerance on the pitch dividing an axis into whole cells
const PITCH_TOLERANCE: f64 = 1e-9;

/// Regular cartesian mesh over a [Boundary]
///
/// The box is split into `nx * ny * nz` cells of fixed pitch along each axis.
/// Every cell holds a shared reference to a [Material], and the mesh owns a
/// path-length [Flux] tally with one value per group per cell.
///
/// ```rust
/// # use std::sync::Arc;
/// # use critmc_geometry::{Boundary, CellIndex, Mesh};
/// # use critmc_material::Material;
/// # use nalgebra::Vector3;
/// let water = Arc::new(Material::new(vec![1.0], vec![vec![0.9]], vec![0.0], 0.0, vec![0.0]).unwrap());
/// let boundary = Boundary::cube(1.0).unwrap();
///
/// // 3x3x3 cells over [-1, 1] on every axis
/// let mesh = Mesh::new(boundary, [2.0 / 3.0; 3], water).unwrap();
///
/// assert_eq!(mesh.dims(), [3, 3, 3]);
/// assert_eq!(mesh.n_cells(), 27);
///
/// let origin = Vector3::zeros();
/// let up = Vector3::new(0.0, 0.0, 1.0);
/// assert_eq!(mesh.cell_of(&origin, &up).unwrap(), CellIndex::new(1, 1, 1));
/// ```
///
/// # Cell faces
///
/// The coordinate of face `i` along an axis is always calculated the same way,
/// as `min + i * pitch`, except the last face which is exactly the boundary
/// coordinate. See [face()](Mesh::face). Anything that snaps a position onto a
/// face should use this value so that comparisons with cell bounds are exact.
#[derive(Debug, Clone)]
pub struct Mesh {
    boundary: Boundary,
    pitch: [f64; 3],
    dims: [usize; 3],
    materials: Vec<Arc<Material>>,
    flux: Flux,
}

impl Mesh {
    /// Build a mesh with every cell set to a default material
    ///
    /// The number of cells along each axis is the box width divided by the
    /// pitch, which must come out as a whole number. The flux tally has as many
    /// groups as the default material.
    pub fn new(boundary: Boundary, pitch: [f64; 3], default: Arc<Material>) -> Result<Self> {
        let mut dims = [0; 3];

        for axis in Axis::ALL {
            let p = pitch[axis.index()];
            if !p.is_finite() || p <= 0.0 {
                return Err(Error::InvalidPitch {
                    axis: axis.to_string(),
                    pitch: p,
                });
            }

            let width = boundary.width(axis);
            let n = (width / p).round();
            if n < 1.0 || (n * p - width).abs() > PITCH_TOLERANCE * width {
                return Err(Error::PitchMismatch {
                    axis: axis.to_string(),
                    pitch: p,
                    width,
                });
            }
            dims[axis.index()] = n as usize;
        }

        let n_cells = dims[0] * dims[1] * dims[2];
        debug!("Mesh dimensions {:?}, {} cells", dims, n_cells);

        Ok(Self {
            flux: Flux::new(default.groups(), dims),
            materials: vec![default; n_cells],
            boundary,
            pitch,
            dims,
        })
    }

    /// The box covered by the mesh
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Number of cells along each axis
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of cells
    pub fn n_cells(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Cell pitch along an axis
    pub fn pitch(&self, axis: Axis) -> f64 {
        self.pitch[axis.index()]
    }

    /// Number of energy groups in the flux tally
    pub fn groups(&self) -> usize {
        self.flux.groups()
    }

    /// Coordinate of cell face `i` along an axis
    ///
    /// Face `i` is the lower face of cell `i` and the upper face of cell
    /// `i-1`, so valid values run from 0 to `n` inclusive.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use critmc_geometry::{Axis, Boundary, Mesh};
    /// # use critmc_material::Material;
    /// # let m = Arc::new(Material::new(vec![1.0], vec![vec![0.0]], vec![0.0], 0.0, vec![0.0]).unwrap());
    /// let mesh = Mesh::new(Boundary::cube(2.0).unwrap(), [1.0, 2.0, 4.0], m).unwrap();
    /// assert_eq!(mesh.face(Axis::X, 1), -1.0);
    /// assert_eq!(mesh.face(Axis::Y, 2), 2.0);
    /// assert_eq!(mesh.face(Axis::Z, 0), -2.0);
    /// ```
    #[inline]
    pub fn face(&self, axis: Axis, i: usize) -> f64 {
        let a = axis.index();
        if i >= self.dims[a] {
            self.boundary.coordinate(axis, Side::Max)
        } else {
            self.boundary.coordinate(axis, Side::Min) + i as f64 * self.pitch[a]
        }
    }

    /// Find the cell containing a position
    ///
    /// A position exactly on a face between two cells belongs to the cell the
    /// direction points into, so a particle on the lower face of cell `i`
    /// moving in the negative direction is in cell `i-1`. A zero direction
    /// component keeps the upper of the two cells. Points on the domain faces
    /// always belong to the outermost cell.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use critmc_geometry::{Boundary, CellIndex, Mesh};
    /// # use critmc_material::Material;
    /// # use nalgebra::Vector3;
    /// # let m = Arc::new(Material::new(vec![1.0], vec![vec![0.0]], vec![0.0], 0.0, vec![0.0]).unwrap());
    /// let mesh = Mesh::new(Boundary::cube(1.0).unwrap(), [1.0; 3], m).unwrap();
    ///
    /// // On the x=0 face between cells 0 and 1
    /// let p = Vector3::new(0.0, 0.5, 0.5);
    /// let left = Vector3::new(-1.0, 0.0, 0.0);
    /// let right = Vector3::new(1.0, 0.0, 0.0);
    ///
    /// assert_eq!(mesh.cell_of(&p, &left).unwrap(), CellIndex::new(0, 1, 1));
    /// assert_eq!(mesh.cell_of(&p, &right).unwrap(), CellIndex::new(1, 1, 1));
    /// ```
    ///
    /// A position outside of the mesh is an error, not clamped.
    pub fn cell_of(&self, position: &Vector3<f64>, direction: &Vector3<f64>) -> Result<CellIndex> {
        if !self.boundary.contains(position) {
            return Err(Error::PositionOutOfBounds {
                x: position[0],
                y: position[1],
                z: position[2],
            });
        }

        let mut cell = CellIndex::default();
        for axis in Axis::ALL {
            let a = axis.index();
            cell[axis] = self.axis_index(axis, position[a], direction[a]);
        }
        Ok(cell)
    }

    /// Physical extent of the cell found by [cell_of()](Mesh::cell_of)
    pub fn cell_bounds(
        &self,
        position: &Vector3<f64>,
        direction: &Vector3<f64>,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let cell = self.cell_of(position, direction)?;
        self.bounds_of(cell)
    }

    /// Lower and upper corners of a cell
    pub fn bounds_of(&self, cell: CellIndex) -> Result<(Vector3<f64>, Vector3<f64>)> {
        self.check_cell(cell)?;
        let lower = Vector3::new(
            self.face(Axis::X, cell.i()),
            self.face(Axis::Y, cell.j()),
            self.face(Axis::Z, cell.k()),
        );
        let upper = Vector3::new(
            self.face(Axis::X, cell.i() + 1),
            self.face(Axis::Y, cell.j() + 1),
            self.face(Axis::Z, cell.k() + 1),
        );
        Ok((lower, upper))
    }

    /// Midpoint of a cell
    pub fn cell_center(&self, cell: CellIndex) -> Result<Vector3<f64>> {
        let (lower, upper) = self.bounds_of(cell)?;
        Ok((lower + upper) * 0.5)
    }

    /// Material assigned to a cell
    pub fn material_of(&self, cell: CellIndex) -> Result<&Arc<Material>> {
        self.check_cell(cell)?;
        Ok(&self.materials[self.material_index(cell)])
    }

    /// Material at a position, see [cell_of()](Mesh::cell_of)
    pub fn material_at(
        &self,
        position: &Vector3<f64>,
        direction: &Vector3<f64>,
    ) -> Result<&Arc<Material>> {
        let cell = self.cell_of(position, direction)?;
        Ok(&self.materials[self.material_index(cell)])
    }

    /// Assign a material to every cell inside a region of the mesh
    ///
    /// The region is the box between the `min` and `max` corners, which must
    /// both be inside the mesh. Both ends of the region are nudged inward by a
    /// tenth of the cell pitch before looking up cells, so a region edge
    /// sitting on a cell face never pulls in the neighbouring row of cells.
    ///
    /// Returns the number of cells filled.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use critmc_geometry::{Boundary, CellIndex, Mesh};
    /// # use critmc_material::Material;
    /// # use nalgebra::Vector3;
    /// # let water = Arc::new(Material::new(vec![1.0], vec![vec![0.9]], vec![0.0], 0.0, vec![0.0]).unwrap());
    /// # let fuel = Arc::new(Material::new(vec![2.0], vec![vec![1.0]], vec![0.5], 2.4, vec![1.0]).unwrap());
    /// let mut mesh = Mesh::new(Boundary::cube(2.0).unwrap(), [4.0 / 3.0; 3], water).unwrap();
    ///
    /// // Central column of fuel
    /// let filled = mesh.fill_material(
    ///     fuel.clone(),
    ///     Vector3::new(-2.0 / 3.0, -2.0 / 3.0, -2.0),
    ///     Vector3::new(2.0 / 3.0, 2.0 / 3.0, 2.0),
    /// ).unwrap();
    ///
    /// assert_eq!(filled, 3);
    /// assert!(mesh.material_of(CellIndex::new(1, 1, 0)).unwrap().is_fissile());
    /// assert!(!mesh.material_of(CellIndex::new(0, 1, 0)).unwrap().is_fissile());
    /// ```
    pub fn fill_material(
        &mut self,
        material: Arc<Material>,
        min: Vector3<f64>,
        max: Vector3<f64>,
    ) -> Result<usize> {
        if material.groups() != self.groups() {
            return Err(Error::GroupMismatch {
                expected: self.groups(),
                found: material.groups(),
            });
        }

        for corner in [&min, &max] {
            if !self.boundary.contains(corner) {
                return Err(Error::PositionOutOfBounds {
                    x: corner[0],
                    y: corner[1],
                    z: corner[2],
                });
            }
        }

        let mut ranges = [(0, 0); 3];
        for axis in Axis::ALL {
            let a = axis.index();
            let nudge = self.pitch[a] / 10.0;
            let lower = min[a] + nudge;
            let upper = max[a] - nudge;

            // region thinner than a fifth of a cell
            if lower > upper {
                return Ok(0);
            }

            ranges[a] = (
                self.axis_index(axis, self.clamp_axis(axis, lower), 0.0),
                self.axis_index(axis, self.clamp_axis(axis, upper), 0.0),
            );
        }

        let [(i0, i1), (j0, j1), (k0, k1)] = ranges;
        let mut filled = 0;
        for (i, j, k) in iproduct!(i0..=i1, j0..=j1, k0..=k1) {
            let idx = self.material_index(CellIndex::new(i, j, k));
            self.materials[idx] = Arc::clone(&material);
            filled += 1;
        }

        debug!(
            "Filled {} cells with \"{}\" ({:?} to {:?})",
            filled,
            material.name(),
            CellIndex::new(i0, j0, k0),
            CellIndex::new(i1, j1, k1)
        );
        Ok(filled)
    }

    /// Add a path length to the flux tally
    #[inline]
    pub fn add_flux(&mut self, cell: CellIndex, group: usize, length: f64) {
        self.flux.add(cell, group, length);
    }

    /// Add a separately accumulated flux array into the mesh tally
    pub fn merge_flux(&mut self, flux: &Flux) -> Result<()> {
        self.flux.merge(flux)
    }

    /// Reset the flux tally to zero
    pub fn clear_flux(&mut self) {
        self.flux.clear();
    }

    /// The `[group][x][y][z]` flux tally
    pub fn flux(&self) -> &Flux {
        &self.flux
    }

    /// Iterate over every cell index, `k` varying fastest
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> {
        let [nx, ny, nz] = self.dims;
        iproduct!(0..nx, 0..ny, 0..nz).map(|(i, j, k)| CellIndex::new(i, j, k))
    }

    /// Clamp a coordinate onto the box along an axis
    pub fn clamp_axis(&self, axis: Axis, x: f64) -> f64 {
        x.clamp(
            self.boundary.coordinate(axis, Side::Min),
            self.boundary.coordinate(axis, Side::Max),
        )
    }
}

// Private helpers
impl Mesh {
    /// Cell index along one axis for a coordinate known to be inside the box
    fn axis_index(&self, axis: Axis, x: f64, u: f64) -> usize {
        let a = axis.index();
        let n = self.dims[a];
        let min = self.boundary.coordinate(axis, Side::Min);

        // first guess may be off by one either way from rounding
        let guess = ((x - min) / self.pitch[a]).floor();
        let mut i = if guess <= 0.0 {
            0
        } else {
            (guess as usize).min(n - 1)
        };

        while i > 0 && x < self.face(axis, i) {
            i -= 1;
        }
        while i < n - 1 && x >= self.face(axis, i + 1) {
            i += 1;
        }

        // on the lower face of cell i and moving down into cell i-1
        if i > 0 && x == self.face(axis, i) && u < 0.0 {
            i -= 1;
        }

        i
    }

    #[inline]
    fn material_index(&self, cell: CellIndex) -> usize {
        (cell.i() * self.dims[1] + cell.j()) * self.dims[2] + cell.k()
    }

    fn check_cell(&self, cell: CellIndex) -> Result<()> {
        if cell.i() >= self.dims[0] || cell.j() >= self.dims[1] || cell.k() >= self.dims[2] {
            return Err(Error::CellOutOfBounds {
                cell: cell.to_string(),
                dims: self.dims,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let head = f!(
            " > Mesh [{} cells, {} groups]",
            self.n_cells(),
            self.groups()
        );

        let mut s = f!("{}\n{}\n{}\n", "-".repeat(40), head, "-".repeat(40));

        for axis in Axis::ALL {
            s += &f!(
                "{}mesh : {:>10} - {:>10} cm ({} cells of {})\n",
                axis,
                self.boundary.coordinate(axis, Side::Min).sci(2, 2),
                self.boundary.coordinate(axis, Side::Max).sci(2, 2),
                self.dims[axis.index()],
                self.pitch[axis.index()].sci(2, 2),
            );
        }

        let mut names: Vec<&str> = self.materials.iter().map(|m| m.name()).collect();
        names.sort_unstable();
        names.dedup();
        s += &f!("volume    : {} cm3\n", self.boundary.volume().sci(5, 2));
        s += &f!("materials : {:?}\n", names);
        s += &f!("flux total: {}\n", self.flux.total().sci(5, 2));

        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn void() -> Arc<Material> {
        Arc::new(
            Material::new(vec![0.0], vec![vec![0.0]], vec![0.0], 0.0, vec![0.0])
                .unwrap()
                .with_name("void"),
        )
    }

    #[fixture]
    fn mesh() -> Mesh {
        Mesh::new(Boundary::cube(1.0).unwrap(), [2.0 / 3.0; 3], void()).unwrap()
    }

    #[rstest]
    fn faces_end_on_the_boundary(mesh: Mesh) {
        for axis in Axis::ALL {
            assert_eq!(mesh.face(axis, 0), -1.0);
            assert_eq!(mesh.face(axis, 3), 1.0);
            assert!(mesh.face(axis, 1) < mesh.face(axis, 2));
        }
    }

    #[rstest]
    #[case(0.0, 1)]
    #[case(-1.0, 0)]
    #[case(1.0, 2)]
    #[case(-0.999, 0)]
    #[case(0.999, 2)]
    fn axis_index_lookup(mesh: Mesh, #[case] x: f64, #[case] expected: usize) {
        assert_eq!(mesh.axis_index(Axis::X, x, 1.0), expected);
        assert_eq!(mesh.axis_index(Axis::X, x, -1.0), expected);
    }

    #[rstest]
    fn on_a_face_goes_with_the_direction(mesh: Mesh) {
        let x = mesh.face(Axis::X, 2);
        assert_eq!(mesh.axis_index(Axis::X, x, 0.5), 2);
        assert_eq!(mesh.axis_index(Axis::X, x, 0.0), 2);
        assert_eq!(mesh.axis_index(Axis::X, x, -0.5), 1);

        // domain faces never step outside
        assert_eq!(mesh.axis_index(Axis::X, -1.0, -1.0), 0);
        assert_eq!(mesh.axis_index(Axis::X, 1.0, 1.0), 2);
    }

    #[rstest]
    fn out_of_bounds_is_an_error(mesh: Mesh) {
        let p = Vector3::new(0.0, 1.5, 0.0);
        assert!(matches!(
            mesh.cell_of(&p, &Vector3::x()),
            Err(Error::PositionOutOfBounds { .. })
        ));
        assert!(matches!(
            mesh.material_of(CellIndex::new(3, 0, 0)),
            Err(Error::CellOutOfBounds { .. })
        ));
    }

    #[rstest]
    #[case([0.0, 1.0, 1.0])]
    #[case([-1.0, 1.0, 1.0])]
    #[case([f64::NAN, 1.0, 1.0])]
    fn invalid_pitch(#[case] pitch: [f64; 3]) {
        let result = Mesh::new(Boundary::cube(1.0).unwrap(), pitch, void());
        assert!(matches!(result, Err(Error::InvalidPitch { .. })));
    }

    #[rstest]
    #[case([0.3, 1.0, 1.0])]
    #[case([1.0, 5.0, 1.0])]
    fn pitch_must_divide_width(#[case] pitch: [f64; 3]) {
        let result = Mesh::new(Boundary::cube(1.0).unwrap(), pitch, void());
        assert!(matches!(result, Err(Error::PitchMismatch { .. })));
    }

    #[rstest]
    fn group_mismatch(mut mesh: Mesh) {
        let two_group = Arc::new(
            Material::new(
                vec![1.0, 1.0],
                vec![vec![0.5, 0.0], vec![0.0, 0.5]],
                vec![0.0, 0.0],
                0.0,
                vec![0.0, 0.0],
            )
            .unwrap(),
        );
        let result = mesh.fill_material(two_group, Vector3::repeat(-1.0), Vector3::repeat(1.0));
        assert!(matches!(
            result,
            Err(Error::GroupMismatch {
                expected: 1,
                found: 2
            })
        ));
    }

    #[rstest]
    fn thin_region_fills_nothing(mut mesh: Mesh) {
        let filled = mesh
            .fill_material(void(), Vector3::repeat(0.0), Vector3::new(0.05, 1.0, 1.0))
            .unwrap();
        assert_eq!(filled, 0);
    }

    #[rstest]
    fn display_summary(mesh: Mesh) {
        let text = mesh.to_string();
        assert!(text.contains("27 cells"));
        assert!(text.contains(&8.0.sci(5, 2)));
        assert!(text.contains("[\"void\"]"));
    }
}
