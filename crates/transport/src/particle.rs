// critmc modules
use critmc_geometry::CellIndex;

// external crates
use nalgebra::Vector3;

/// State of a single neutron history
///
/// The cell index is a cache of [Mesh::cell_of()](critmc_geometry::Mesh::cell_of)
/// for the current position and direction, refreshed by the transport kernel
/// after every face crossing or change of direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Neutron {
    /// Current position
    pub position: Vector3<f64>,
    /// Unit direction of travel
    pub direction: Vector3<f64>,
    /// Energy group index
    pub group: usize,
    /// Cell containing the current position
    pub cell: CellIndex,
    /// Where the history started
    pub birth: Vector3<f64>,
    /// Number of collisions so far
    pub collisions: usize,
    /// Current fate, [Fate::Alive] until the history ends
    pub fate: Fate,
}

impl Neutron {
    /// New live neutron born at `position`
    pub fn new(position: Vector3<f64>, direction: Vector3<f64>, group: usize) -> Self {
        Self {
            position,
            direction,
            group,
            cell: CellIndex::default(),
            birth: position,
            collisions: 0,
            fate: Fate::Alive,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.fate == Fate::Alive
    }

    /// Straight line distance from the birth position
    ///
    /// ```rust
    /// # use critmc_transport::Neutron;
    /// # use nalgebra::Vector3;
    /// let mut neutron = Neutron::new(Vector3::zeros(), Vector3::x(), 0);
    /// neutron.position = Vector3::new(3.0, 4.0, 0.0);
    /// assert_eq!(neutron.crow_distance(), 5.0);
    /// ```
    pub fn crow_distance(&self) -> f64 {
        (self.position - self.birth).norm()
    }
}

/// How a history ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Fate {
    /// Still being tracked
    #[default]
    Alive,
    /// Absorbed in a collision, with or without fission
    Absorbed,
    /// Escaped through a vacuum boundary
    Leaked,
    /// Abandoned after the geometry could not be resolved
    Lost,
    /// Stopped at the collision limit
    Truncated,
}

impl Fate {
    /// True for any fate that ends the history
    pub fn is_terminal(&self) -> bool {
        *self != Fate::Alive
    }
}

impl std::fmt::Display for Fate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Fate::Alive => "alive",
            Fate::Absorbed => "absorbed",
            Fate::Leaked => "leaked",
            Fate::Lost => "lost",
            Fate::Truncated => "truncated",
        };
        write!(f, "{}", s)
    }
}
