// crate modules
use crate::cell::CellIndex;
use crate::error::{Error, Result};

/// Path-length flux tally over `[group][x][y][z]`
///
/// Stored as a single flat array in the order
///
/// ```rust, ignore, no_run
/// for g in groups
///     for i in x cells
///         for j in y cells
///             for k in z cells
///                 // ...some value
/// ```
///
/// so that a single group of cells is one contiguous slice.
///
/// Every value is a sum of distances travelled by particles of a given group
/// inside a given cell, and is therefore never negative.
///
/// ```rust
/// # use critmc_geometry::{CellIndex, Flux};
/// let mut flux = Flux::new(2, [3, 3, 1]);
/// flux.add(CellIndex::new(1, 2, 0), 1, 0.5);
/// flux.add(CellIndex::new(1, 2, 0), 1, 0.25);
///
/// assert_eq!(flux.get(CellIndex::new(1, 2, 0), 1), 0.75);
/// assert_eq!(flux.group_total(0), 0.0);
/// assert_eq!(flux.total(), 0.75);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Flux {
    groups: usize,
    dims: [usize; 3],
    values: Vec<f64>,
}

impl Flux {
    /// Zero flux for `groups` energy groups over `dims` cells
    pub fn new(groups: usize, dims: [usize; 3]) -> Self {
        Self {
            groups,
            dims,
            values: vec![0.0; groups * dims[0] * dims[1] * dims[2]],
        }
    }

    /// Zero flux of the same shape
    pub fn zeroed_like(other: &Flux) -> Self {
        Self::new(other.groups, other.dims)
    }

    /// Number of energy groups
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Number of cells along each axis
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Shape as `[groups, nx, ny, nz]`
    pub fn shape(&self) -> [usize; 4] {
        [self.groups, self.dims[0], self.dims[1], self.dims[2]]
    }

    /// Number of cells in one energy group
    pub fn cells_per_group(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Flat index of a cell and group
    #[inline]
    pub fn index(&self, cell: CellIndex, group: usize) -> usize {
        let [nx, ny, nz] = self.dims;
        let mut idx = group * nx * ny * nz;
        idx += cell.i() * ny * nz;
        idx += cell.j() * nz;
        idx += cell.k();
        idx
    }

    /// Add a path length to a cell for a given group
    ///
    /// This is called for every cell a particle passes through so does no
    /// checks beyond the slice bounds check.
    ///
    /// # Panics
    ///
    /// Panics if the flat index is outside of the array.
    #[inline]
    pub fn add(&mut self, cell: CellIndex, group: usize, length: f64) {
        let idx = self.index(cell, group);
        self.values[idx] += length;
    }

    /// Value for a cell and group
    pub fn get(&self, cell: CellIndex, group: usize) -> f64 {
        self.values[self.index(cell, group)]
    }

    /// Checked value for a cell and group
    pub fn try_get(&self, cell: CellIndex, group: usize) -> Option<f64> {
        let [nx, ny, nz] = self.dims;
        if group >= self.groups || cell.i() >= nx || cell.j() >= ny || cell.k() >= nz {
            return None;
        }
        Some(self.get(cell, group))
    }

    /// Reset every value to zero
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Add another flux array of the same shape into this one
    pub fn merge(&mut self, other: &Flux) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::FluxShapeMismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }

        self.values
            .iter_mut()
            .zip(other.values.iter())
            .for_each(|(a, b)| *a += b);
        Ok(())
    }

    /// Sum over every group and cell
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Sum over every cell of a group
    pub fn group_total(&self, group: usize) -> f64 {
        self.group(group).iter().sum()
    }

    /// Contiguous slice of all cell values for a group, `[x][y][z]` ordered
    pub fn group(&self, group: usize) -> &[f64] {
        let n = self.cells_per_group();
        &self.values[group * n..(group + 1) * n]
    }

    /// The raw flat array
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Values for a group in VTK cell order, i.e. `x` varying fastest
    pub fn group_in_vtk_order(&self, group: usize) -> Vec<f64> {
        let [nx, ny, nz] = self.dims;
        let mut values = Vec::with_capacity(self.cells_per_group());
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    values.push(self.get(CellIndex::new(i, j, k), group));
                }
            }
        }
        values
    }

    /// A single x/y plane at z index `k`, as `[x][y]`
    ///
    /// This is the slice consumed by heat map style plots.
    ///
    /// ```rust
    /// # use critmc_geometry::{CellIndex, Flux};
    /// let mut flux = Flux::new(1, [2, 3, 4]);
    /// flux.add(CellIndex::new(1, 2, 3), 0, 1.0);
    ///
    /// let plane = flux.slice_z(0, 3);
    /// assert_eq!(plane.len(), 2);
    /// assert_eq!(plane[0].len(), 3);
    /// assert_eq!(plane[1][2], 1.0);
    /// ```
    pub fn slice_z(&self, group: usize, k: usize) -> Vec<Vec<f64>> {
        let [nx, ny, _] = self.dims;
        (0..nx)
            .map(|i| {
                (0..ny)
                    .map(|j| self.get(CellIndex::new(i, j, k), group))
                    .collect()
            })
            .collect()
    }

    /// Nested `[group][x][y][z]` copy of the flux
    pub fn to_nested(&self) -> Vec<Vec<Vec<Vec<f64>>>> {
        let [nx, ny, nz] = self.dims;
        (0..self.groups)
            .map(|g| {
                (0..nx)
                    .map(|i| {
                        (0..ny)
                            .map(|j| {
                                (0..nz)
                                    .map(|k| self.get(CellIndex::new(i, j, k), g))
                                    .collect()
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_index_order() {
        let flux = Flux::new(2, [2, 3, 4]);
        assert_eq!(flux.index(CellIndex::new(0, 0, 1), 0), 1);
        assert_eq!(flux.index(CellIndex::new(0, 1, 0), 0), 4);
        assert_eq!(flux.index(CellIndex::new(1, 0, 0), 0), 12);
        assert_eq!(flux.index(CellIndex::new(0, 0, 0), 1), 24);
        assert_eq!(flux.as_slice().len(), 48);
    }

    #[test]
    fn merge_requires_same_shape() {
        let mut a = Flux::new(1, [2, 2, 2]);
        let mut b = Flux::zeroed_like(&a);
        b.add(CellIndex::new(1, 1, 1), 0, 2.0);

        a.merge(&b).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.get(CellIndex::new(1, 1, 1), 0), 4.0);

        let c = Flux::new(2, [2, 2, 2]);
        assert!(matches!(a.merge(&c), Err(Error::FluxShapeMismatch { .. })));
    }

    #[test]
    fn vtk_order_has_x_fastest() {
        let mut flux = Flux::new(1, [2, 2, 1]);
        flux.add(CellIndex::new(1, 0, 0), 0, 1.0);
        flux.add(CellIndex::new(0, 1, 0), 0, 2.0);
        assert_eq!(flux.group_in_vtk_order(0), vec![0.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn nested_matches_flat() {
        let mut flux = Flux::new(2, [1, 2, 3]);
        flux.add(CellIndex::new(0, 1, 2), 1, 3.0);
        let nested = flux.to_nested();
        assert_eq!(nested[1][0][1][2], 3.0);
        assert_eq!(flux.try_get(CellIndex::new(0, 2, 0), 0), None);

        flux.clear();
        assert_eq!(flux.total(), 0.0);
    }
}
