// crate modules
use crate::bank::FissionBank;
use crate::particle::Fate;

// critmc modules
use critmc_geometry::Flux;

/// Running sum of history scores
///
/// Keeps the sum of squares alongside the sum so that the spread of the
/// scores can be estimated. Each history should contribute at most one score
/// to a tally, e.g. a fission tally scores the number of neutrons emitted
/// once rather than adding 1.0 for each of them.
///
/// ```rust
/// # use critmc_transport::Tally;
/// let mut tally = Tally::default();
/// for score in [1.0, 0.0, 1.0, 0.0] {
///     tally.add(score);
/// }
///
/// assert_eq!(tally.sum(), 2.0);
/// assert_eq!(tally.mean(4), 0.5);
/// assert_eq!(tally.variance(4), 1.0 / 3.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    sum: f64,
    sum_squares: f64,
}

impl Tally {
    /// Add a score
    #[inline]
    pub fn add(&mut self, score: f64) {
        self.sum += score;
        self.sum_squares += score * score;
    }

    /// Reset to zero
    pub fn clear(&mut self) {
        self.sum = 0.0;
        self.sum_squares = 0.0;
    }

    /// Combine with a tally accumulated elsewhere
    pub fn merge(&mut self, other: &Tally) {
        self.sum += other.sum;
        self.sum_squares += other.sum_squares;
    }

    /// Total of all scores
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Total of all squared scores
    pub fn sum_squares(&self) -> f64 {
        self.sum_squares
    }

    /// Mean score over `n` histories
    pub fn mean(&self, n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        self.sum / n as f64
    }

    /// Unbiased sample variance of the score over `n` histories
    pub fn variance(&self, n: usize) -> f64 {
        if n < 2 {
            return 0.0;
        }
        let n = n as f64;
        let mean = self.sum / n;
        ((self.sum_squares / n - mean * mean) * n / (n - 1.0)).max(0.0)
    }

    /// Standard deviation of the mean over `n` histories
    ///
    /// ```rust
    /// # use critmc_transport::Tally;
    /// let mut tally = Tally::default();
    /// (0..100).for_each(|i| tally.add((i % 2) as f64));
    ///
    /// // sqrt(variance / n)
    /// let expected = (tally.variance(100) / 100.0).sqrt();
    /// assert_eq!(tally.standard_deviation(100), expected);
    /// ```
    pub fn standard_deviation(&self, n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        (self.variance(n) / n as f64).sqrt()
    }
}

/// The set of scalar tallies kept for every batch
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tallies {
    /// Histories started
    pub histories: Tally,
    /// Escapes through vacuum faces
    pub leakage: Tally,
    /// Absorption events
    pub absorption: Tally,
    /// Neutrons emitted by fission
    pub fission: Tally,
    /// Histories lost to unresolved geometry
    pub lost: Tally,
    /// Histories stopped at the collision limit
    pub truncated: Tally,
    /// Birth to death straight line distances
    pub crow: Tally,
}

impl Tallies {
    /// Reset every tally
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Combine with tallies accumulated elsewhere
    pub fn merge(&mut self, other: &Tallies) {
        self.histories.merge(&other.histories);
        self.leakage.merge(&other.leakage);
        self.absorption.merge(&other.absorption);
        self.fission.merge(&other.fission);
        self.lost.merge(&other.lost);
        self.truncated.merge(&other.truncated);
        self.crow.merge(&other.crow);
    }

    /// Record the end of a history
    ///
    /// Leakage, lost and truncated fates are scored here. Absorptions and
    /// fission are scored by the collision itself.
    pub fn score_fate(&mut self, fate: Fate, crow_distance: f64) {
        match fate {
            Fate::Leaked => self.leakage.add(1.0),
            Fate::Lost => self.lost.add(1.0),
            Fate::Truncated => self.truncated.add(1.0),
            Fate::Absorbed | Fate::Alive => (),
        }
        self.crow.add(crow_distance);
        self.histories.add(1.0);
    }

    /// Number of histories scored, as an integer
    pub fn n_histories(&self) -> usize {
        self.histories.sum().round() as usize
    }

    /// Multiplication factor as fissions over losses
    ///
    /// `None` if nothing was absorbed or leaked.
    pub fn k_estimate(&self) -> Option<f64> {
        let losses = self.absorption.sum() + self.leakage.sum();
        if losses > 0.0 {
            Some(self.fission.sum() / losses)
        } else {
            None
        }
    }

    /// Sum of the standard deviations of leakage, absorption and fission
    pub fn summed_standard_deviation(&self) -> f64 {
        let n = self.n_histories();
        self.leakage.standard_deviation(n)
            + self.absorption.standard_deviation(n)
            + self.fission.standard_deviation(n)
    }

    /// Mean crow-fly distance over all scored histories
    pub fn mean_crow_distance(&self) -> f64 {
        self.crow.mean(self.n_histories())
    }
}

/// Everything a worker accumulates while running histories
///
/// Each worker fills its own accumulator, and accumulators are merged in
/// history order at the end of a batch. Nothing shared is written while
/// histories are in flight.
#[derive(Debug, Clone)]
pub struct BatchAccumulator {
    /// Path-length flux
    pub flux: Flux,
    /// Scalar tallies
    pub tallies: Tallies,
    /// New fission sites
    pub bank: FissionBank,
}

impl BatchAccumulator {
    /// Empty accumulator with a flux array shaped like `template`
    pub fn new(template: &Flux) -> Self {
        Self {
            flux: Flux::zeroed_like(template),
            tallies: Tallies::default(),
            bank: FissionBank::new(),
        }
    }

    /// Merge a later accumulator into this one
    ///
    /// Flux arrays always share a shape here since both come from
    /// [BatchAccumulator::new()] with the same template.
    pub fn merge(&mut self, other: BatchAccumulator) {
        if self.flux.merge(&other.flux).is_err() {
            unreachable!("accumulators are built from the same flux template");
        }
        self.tallies.merge(&other.tallies);
        self.bank.append(other.bank);
    }
}
