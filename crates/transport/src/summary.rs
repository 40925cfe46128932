// crate modules
use crate::tally::Tallies;

// critmc modules
use critmc_utils::{f, ValueExt};

// external crates
use serde::{Deserialize, Serialize};

/// Results for a single batch of histories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Batch index, starting from 0
    pub batch: usize,
    /// Counted towards the k statistics
    pub active: bool,
    /// Multiplication factor estimate, fissions over losses
    pub k: f64,
    /// Summed standard deviation of the leakage, absorption and fission tallies
    pub std_dev: f64,
    /// Histories run
    pub histories: usize,
    /// Neutrons escaped through vacuum faces
    pub leakage: f64,
    /// Neutrons absorbed
    pub absorption: f64,
    /// Neutrons emitted by fission
    pub fission: f64,
    /// Histories lost to unresolved geometry
    pub lost: usize,
    /// Histories stopped at the collision limit
    pub truncated: usize,
    /// Sites banked as the source of the next batch
    pub fission_sites: usize,
}

impl BatchResult {
    /// Collect the results of a batch from its tallies
    ///
    /// A batch where nothing was absorbed or leaked has no meaningful k, which
    /// is reported as 0.0.
    pub fn from_tallies(batch: usize, active: bool, tallies: &Tallies, fission_sites: usize) -> Self {
        Self {
            batch,
            active,
            k: tallies.k_estimate().unwrap_or(0.0),
            std_dev: tallies.summed_standard_deviation(),
            histories: tallies.n_histories(),
            leakage: tallies.leakage.sum(),
            absorption: tallies.absorption.sum(),
            fission: tallies.fission.sum(),
            lost: tallies.lost.sum().round() as usize,
            truncated: tallies.truncated.sum().round() as usize,
            fission_sites,
        }
    }
}

/// Results of a complete power iteration run
///
/// ```rust
/// # use critmc_transport::{BatchResult, RunSummary};
/// # let batch = |i: usize, k: f64| BatchResult {
/// #     batch: i, active: i > 0, k, std_dev: 0.0, histories: 10,
/// #     leakage: 0.0, absorption: 0.0, fission: 0.0, lost: 0,
/// #     truncated: 0, fission_sites: 0,
/// # };
/// let summary = RunSummary {
///     batches: vec![batch(0, 0.5), batch(1, 1.0), batch(2, 1.2)],
///     mean_crow_distance: 1.0,
/// };
///
/// // the first batch is inactive
/// assert_eq!(summary.k_estimates(), vec![0.5, 1.0, 1.2]);
/// assert!((summary.mean_k() - 1.1).abs() < 1e-12);
/// assert!((summary.k_standard_error() - 0.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Results for every batch in order
    pub batches: Vec<BatchResult>,
    /// Mean crow-fly distance over every history of the run
    pub mean_crow_distance: f64,
}

impl RunSummary {
    /// The k estimate of every batch, active or not
    pub fn k_estimates(&self) -> Vec<f64> {
        self.batches.iter().map(|b| b.k).collect()
    }

    /// k estimates of the active batches only
    pub fn active_k_estimates(&self) -> Vec<f64> {
        self.batches
            .iter()
            .filter(|b| b.active)
            .map(|b| b.k)
            .collect()
    }

    /// Mean k over the active batches
    pub fn mean_k(&self) -> f64 {
        let k = self.active_k_estimates();
        if k.is_empty() {
            return 0.0;
        }
        k.iter().sum::<f64>() / k.len() as f64
    }

    /// Standard error of the mean k over the active batches
    ///
    /// Zero with fewer than two active batches.
    pub fn k_standard_error(&self) -> f64 {
        let k = self.active_k_estimates();
        let m = k.len();
        if m < 2 {
            return 0.0;
        }
        let mean = self.mean_k();
        let squares: f64 = k.iter().map(|v| (v - mean) * (v - mean)).sum();
        (squares / (m * (m - 1)) as f64).sqrt()
    }

    /// Total histories lost over the run
    pub fn lost(&self) -> usize {
        self.batches.iter().map(|b| b.lost).sum()
    }

    /// Total histories truncated over the run
    pub fn truncated(&self) -> usize {
        self.batches.iter().map(|b| b.truncated).sum()
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = f!(
            "{:>6} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
            "batch",
            "active",
            "k",
            "std dev",
            "leakage",
            "absorption",
            "fission"
        );

        for b in &self.batches {
            s += &f!(
                "{:>6} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
                b.batch,
                b.active,
                b.k.sci(5, 2),
                b.std_dev.sci(5, 2),
                b.leakage,
                b.absorption,
                b.fission
            );
        }

        s += &f!(
            "mean k = {} +/- {}\n",
            self.mean_k().sci(5, 2),
            self.k_standard_error().sci(5, 2)
        );
        s += &f!(
            "mean crow fly distance = {}\n",
            self.mean_crow_distance.sci(5, 2)
        );
        s += &f!("lost = {}, truncated = {}", self.lost(), self.truncated());

        write!(f, "{}", s)
    }
}
