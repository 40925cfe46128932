//! Axis, side, and boundary condition tags

/// Cartesian axis
///
/// Used to index anything with a per-axis value, such as the pitch of a mesh
/// or a component of a position vector.
///
/// ```rust
/// # use critmc_geometry::Axis;
/// assert_eq!(Axis::Y.index(), 1);
/// assert_eq!(Axis::ALL.len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index into `[x, y, z]` style arrays and vectors
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        write!(f, "{}", s)
    }
}

/// Lower or upper face of a box along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Min,
    Max,
}

impl Side {
    /// Both sides in index order
    pub const ALL: [Side; 2] = [Side::Min, Side::Max];

    /// Index into `[min, max]` style arrays
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Min => 0,
            Side::Max => 1,
        }
    }

    /// The side a particle would cross moving with direction component `u`
    ///
    /// Returns `None` for a zero component since neither face can be reached.
    ///
    /// ```rust
    /// # use critmc_geometry::Side;
    /// assert_eq!(Side::towards(0.3), Some(Side::Max));
    /// assert_eq!(Side::towards(-1.0), Some(Side::Min));
    /// assert_eq!(Side::towards(0.0), None);
    /// ```
    pub fn towards(u: f64) -> Option<Side> {
        if u > 0.0 {
            Some(Side::Max)
        } else if u < 0.0 {
            Some(Side::Min)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Side::Min => "min",
            Side::Max => "max",
        };
        write!(f, "{}", s)
    }
}

/// Condition applied to a particle crossing a face of the domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryCondition {
    /// Particle escapes and is counted as leakage
    #[default]
    Vacuum,
    /// Particle is mirrored back into the domain
    Reflective,
}

impl std::fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            BoundaryCondition::Vacuum => "vacuum",
            BoundaryCondition::Reflective => "reflective",
        };
        write!(f, "{}", s)
    }
}
