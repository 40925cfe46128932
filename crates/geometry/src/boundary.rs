// crate modules
use crate::axis::{Axis, BoundaryCondition, Side};
use crate::error::{Error, Result};

// critmc modules
use critmc_utils::{f, ValueExt};

// external crates
use nalgebra::Vector3;

/// Axis-aligned box with a condition on each face
///
/// Coordinates and conditions are stored as fixed `[axis][side]` arrays so
/// that every lookup is a plain index with [Axis::index()] and
/// [Side::index()].
///
/// All faces are [BoundaryCondition::Vacuum] unless changed.
///
/// ```rust
/// # use critmc_geometry::{Axis, Boundary, BoundaryCondition, Side};
/// let boundary = Boundary::new(-1.0, 1.0, -2.0, 2.0, 0.0, 10.0)
///     .unwrap()
///     .with_condition(Axis::Z, Side::Min, BoundaryCondition::Reflective);
///
/// assert_eq!(boundary.coordinate(Axis::Y, Side::Max), 2.0);
/// assert_eq!(
///     boundary.surface_condition(Axis::Z, Side::Min),
///     BoundaryCondition::Reflective
/// );
/// assert_eq!(
///     boundary.surface_condition(Axis::Z, Side::Max),
///     BoundaryCondition::Vacuum
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    coordinates: [[f64; 2]; 3],
    conditions: [[BoundaryCondition; 2]; 3],
}

impl Boundary {
    /// Create a box from its six face coordinates
    ///
    /// Fails for any axis where `min >= max` or a coordinate is not finite.
    pub fn new(
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        z_min: f64,
        z_max: f64,
    ) -> Result<Self> {
        let coordinates = [[x_min, x_max], [y_min, y_max], [z_min, z_max]];

        for axis in Axis::ALL {
            let [min, max] = coordinates[axis.index()];
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(Error::DegenerateBoundary {
                    axis: axis.to_string(),
                    min,
                    max,
                });
            }
        }

        Ok(Self {
            coordinates,
            conditions: [[BoundaryCondition::Vacuum; 2]; 3],
        })
    }

    /// Create a cube centred on the origin
    ///
    /// ```rust
    /// # use critmc_geometry::{Axis, Boundary, Side};
    /// let cube = Boundary::cube(1.0).unwrap();
    /// assert_eq!(cube.coordinate(Axis::X, Side::Min), -1.0);
    /// assert_eq!(cube.coordinate(Axis::Z, Side::Max), 1.0);
    /// ```
    pub fn cube(half_width: f64) -> Result<Self> {
        Self::new(
            -half_width,
            half_width,
            -half_width,
            half_width,
            -half_width,
            half_width,
        )
    }

    /// Set the condition of a single face
    pub fn with_condition(mut self, axis: Axis, side: Side, condition: BoundaryCondition) -> Self {
        self.conditions[axis.index()][side.index()] = condition;
        self
    }

    /// Set the same condition on every face
    pub fn with_all_conditions(mut self, condition: BoundaryCondition) -> Self {
        self.conditions = [[condition; 2]; 3];
        self
    }

    /// Coordinate of a face
    #[inline]
    pub fn coordinate(&self, axis: Axis, side: Side) -> f64 {
        self.coordinates[axis.index()][side.index()]
    }

    /// Condition applied on crossing a face
    #[inline]
    pub fn surface_condition(&self, axis: Axis, side: Side) -> BoundaryCondition {
        self.conditions[axis.index()][side.index()]
    }

    /// Width of the box along an axis
    pub fn width(&self, axis: Axis) -> f64 {
        self.coordinate(axis, Side::Max) - self.coordinate(axis, Side::Min)
    }

    /// Lower corner of the box
    pub fn min_corner(&self) -> Vector3<f64> {
        Vector3::new(
            self.coordinates[0][0],
            self.coordinates[1][0],
            self.coordinates[2][0],
        )
    }

    /// Upper corner of the box
    pub fn max_corner(&self) -> Vector3<f64> {
        Vector3::new(
            self.coordinates[0][1],
            self.coordinates[1][1],
            self.coordinates[2][1],
        )
    }

    /// Volume enclosed by the box
    pub fn volume(&self) -> f64 {
        Axis::ALL.iter().map(|a| self.width(*a)).product()
    }

    /// Check if a position is inside the box, faces included
    pub fn contains(&self, position: &Vector3<f64>) -> bool {
        Axis::ALL.iter().all(|a| {
            let x = position[a.index()];
            x >= self.coordinate(*a, Side::Min) && x <= self.coordinate(*a, Side::Max)
        })
    }

    /// True if at least one face lets particles escape
    pub fn has_vacuum(&self) -> bool {
        self.conditions
            .iter()
            .flatten()
            .any(|c| *c == BoundaryCondition::Vacuum)
    }

    /// Same box dimensions, ignoring conditions
    pub fn same_extent(&self, other: &Boundary) -> bool {
        self.coordinates == other.coordinates
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = String::new();
        for axis in Axis::ALL {
            let faces = Side::ALL
                .iter()
                .map(|side| {
                    f!(
                        "{:>12} {:<10}",
                        self.coordinate(axis, *side).sci(4, 2),
                        f!("[{}]", self.surface_condition(axis, *side))
                    )
                })
                .collect::<Vec<String>>()
                .join(" - ");
            s += &f!("{} : {}\n", axis, faces);
        }
        write!(f, "{}", s)
    }
}
