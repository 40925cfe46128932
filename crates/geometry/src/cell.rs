use crate::axis::Axis;

/// Index of a mesh cell as `(i, j, k)` along `(x, y, z)`
///
/// ```rust
/// # use critmc_geometry::{Axis, CellIndex};
/// let cell = CellIndex::new(2, 0, 5);
/// assert_eq!(cell[Axis::X], 2);
/// assert_eq!(cell[Axis::Z], 5);
/// assert_eq!(cell.to_string(), "(2, 0, 5)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellIndex(pub [usize; 3]);

impl CellIndex {
    pub fn new(i: usize, j: usize, k: usize) -> Self {
        Self([i, j, k])
    }

    pub fn i(&self) -> usize {
        self.0[0]
    }

    pub fn j(&self) -> usize {
        self.0[1]
    }

    pub fn k(&self) -> usize {
        self.0[2]
    }
}

impl std::ops::Index<Axis> for CellIndex {
    type Output = usize;

    fn index(&self, axis: Axis) -> &Self::Output {
        &self.0[axis.index()]
    }
}

impl std::ops::IndexMut<Axis> for CellIndex {
    fn index_mut(&mut self, axis: Axis) -> &mut Self::Output {
        &mut self.0[axis.index()]
    }
}

impl std::fmt::Display for CellIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}
