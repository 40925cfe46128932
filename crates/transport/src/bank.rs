// external crates
use nalgebra::Vector3;

/// Ordered collection of fission site positions
///
/// A batch reads its source from one bank and writes new sites to another. The
/// driver hands the filled bank on to the next batch by value, so the source
/// of a batch is never written while it is being sampled.
///
/// ```rust
/// # use critmc_transport::FissionBank;
/// # use nalgebra::Vector3;
/// let mut first = FissionBank::new();
/// first.push(Vector3::new(0.0, 0.0, 1.0));
///
/// let mut second = FissionBank::new();
/// second.push(Vector3::new(0.0, 0.0, 2.0));
///
/// first.append(second);
/// assert_eq!(first.len(), 2);
/// assert_eq!(first.get(1), Some(&Vector3::new(0.0, 0.0, 2.0)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FissionBank {
    sites: Vec<Vector3<f64>>,
}

impl FissionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank with room for `capacity` sites before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sites: Vec::with_capacity(capacity),
        }
    }

    /// Record a fission site
    pub fn push(&mut self, site: Vector3<f64>) {
        self.sites.push(site);
    }

    /// Move every site of another bank onto the end of this one
    pub fn append(&mut self, mut other: FissionBank) {
        self.sites.append(&mut other.sites);
    }

    pub fn get(&self, idx: usize) -> Option<&Vector3<f64>> {
        self.sites.get(idx)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn clear(&mut self) {
        self.sites.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vector3<f64>> {
        self.sites.iter()
    }

    /// All sites in the order they were recorded
    pub fn sites(&self) -> &[Vector3<f64>] {
        &self.sites
    }
}

impl From<Vec<Vector3<f64>>> for FissionBank {
    fn from(sites: Vec<Vector3<f64>>) -> Self {
        Self { sites }
    }
}
