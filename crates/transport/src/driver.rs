//! Power iteration over batches of neutron histories

// crate modules
use crate::bank::FissionBank;
use crate::error::{Error, Result};
use crate::kernel::{source_neutron, transport_neutron, HistoryContext};
use crate::particle::Fate;
use crate::sampler;
use crate::settings::Settings;
use crate::summary::{BatchResult, RunSummary};
use crate::tally::{BatchAccumulator, Tallies};

// critmc modules
use critmc_geometry::{Boundary, Flux, Mesh};
use critmc_utils::{f, ValueExt};

// external crates
use kdam::{Bar, BarBuilder, BarExt};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Stride between the seeds of consecutive histories
const SEED_STRIDE: u64 = 152_917;

/// Run a full power iteration
///
/// The first batch is sourced uniformly over the whole mesh. Every later batch
/// is sourced from the fission sites banked by the batch before it.
///
/// The mesh flux is cleared at the start of every batch, so on return it
/// holds the flux of the final batch only.
///
/// ```rust, no_run
/// # use std::sync::Arc;
/// # use critmc_geometry::{Boundary, Mesh};
/// # use critmc_material::Material;
/// # use critmc_transport::{run, Settings};
/// # let fuel = Arc::new(Material::new(vec![2.0], vec![vec![1.0]], vec![0.5], 2.4, vec![1.0]).unwrap());
/// let boundary = Boundary::cube(10.0).unwrap();
/// let mut mesh = Mesh::new(boundary.clone(), [2.0; 3], fuel).unwrap();
///
/// let settings = Settings::new().histories(10_000).batches(5);
/// let summary = run(&settings, &boundary, &mut mesh).unwrap();
///
/// for k in summary.k_estimates() {
///     println!("{k}");
/// }
/// println!("{}", mesh.flux().total());
/// ```
pub fn run(settings: &Settings, boundary: &Boundary, mesh: &mut Mesh) -> Result<RunSummary> {
    let mut simulation = Simulation::new(settings.clone(), boundary, mesh)?;
    let mut progress = init_progress_bar(settings)?;
    if !settings.disable_progress {
        progress.refresh()?;
    }

    while !simulation.is_complete() {
        let result = simulation.run_batch()?;
        progress.set_postfix(f!("k={:.5}", result.k));
        progress.update(1)?;
    }

    if !settings.disable_progress {
        eprintln!();
    }
    let summary = simulation.finish();
    info!(
        "Mean k = {} +/- {} over {} active batches",
        summary.mean_k().sci(5, 2),
        summary.k_standard_error().sci(5, 2),
        settings.active()
    );
    info!(
        "Mean crow fly distance = {}",
        summary.mean_crow_distance.sci(5, 2)
    );
    if summary.lost() > 0 {
        warn!("{} histories lost over the run", summary.lost());
    }

    Ok(summary)
}

/// Initialise the progress bar, if wanted
fn init_progress_bar(settings: &Settings) -> Result<Bar> {
    BarBuilder::default()
        .total(settings.batches)
        .desc("batches")
        .unit(" batch")
        .disable(settings.disable_progress)
        .build()
        .map_err(Error::ProgressBar)
}

/// Step-by-step power iteration
///
/// [run()] is a loop over [run_batch()](Simulation::run_batch), but stepping
/// through batches by hand allows results to be inspected along the way.
///
/// ```rust, no_run
/// # use std::sync::Arc;
/// # use critmc_geometry::{Boundary, Mesh};
/// # use critmc_material::Material;
/// # use critmc_transport::{Settings, Simulation};
/// # let fuel = Arc::new(Material::new(vec![2.0], vec![vec![1.0]], vec![0.5], 2.4, vec![1.0]).unwrap());
/// let boundary = Boundary::cube(10.0).unwrap();
/// let mut mesh = Mesh::new(boundary.clone(), [2.0; 3], fuel).unwrap();
///
/// let settings = Settings::new().histories(1000).batches(3);
/// let mut simulation = Simulation::new(settings, &boundary, &mut mesh).unwrap();
///
/// while !simulation.is_complete() {
///     let result = simulation.run_batch().unwrap();
///     println!("batch {}: {} sites banked", result.batch, result.fission_sites);
/// }
/// ```
#[derive(Debug)]
pub struct Simulation<'a> {
    settings: Settings,
    boundary: &'a Boundary,
    mesh: &'a mut Mesh,
    pool: Option<ThreadPool>,
    source: FissionBank,
    results: Vec<BatchResult>,
    run_tallies: Tallies,
}

impl<'a> Simulation<'a> {
    /// Validate the settings and geometry, ready to run the first batch
    pub fn new(settings: Settings, boundary: &'a Boundary, mesh: &'a mut Mesh) -> Result<Self> {
        settings.validate()?;

        if !boundary.same_extent(mesh.boundary()) {
            return Err(Error::BoundaryMismatch);
        }

        let pool = match settings.threads {
            Some(n) => Some(ThreadPoolBuilder::new().num_threads(n).build()?),
            None => None,
        };

        debug!("Running with {:?}", settings);

        Ok(Self {
            results: Vec::with_capacity(settings.batches),
            settings,
            boundary,
            mesh,
            pool,
            source: FissionBank::new(),
            run_tallies: Tallies::default(),
        })
    }

    /// Index of the next batch to run
    pub fn batch(&self) -> usize {
        self.results.len()
    }

    /// True once every batch has been run
    pub fn is_complete(&self) -> bool {
        self.results.len() >= self.settings.batches
    }

    /// Fission sites sourcing the next batch
    pub fn source(&self) -> &FissionBank {
        &self.source
    }

    /// Results of every batch run so far
    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    /// Flux of the most recent batch
    pub fn flux(&self) -> &Flux {
        self.mesh.flux()
    }

    /// Transport one batch of histories
    ///
    /// Fails if the previous batch banked no fission sites, since there is
    /// nothing left to source the batch from.
    pub fn run_batch(&mut self) -> Result<BatchResult> {
        let batch = self.batch();
        if self.is_complete() {
            return Err(Error::SimulationComplete {
                batches: self.settings.batches,
            });
        }
        if batch > 0 && self.source.is_empty() {
            return Err(Error::EmptyFissionBank { batch });
        }

        let acc = match &self.pool {
            Some(pool) => pool.install(|| self.transport_histories(batch)),
            None => self.transport_histories(batch),
        };

        // only point the shared mesh flux is written
        self.mesh.clear_flux();
        self.mesh.merge_flux(&acc.flux)?;

        let active = batch >= self.settings.inactive;
        let result = BatchResult::from_tallies(batch, active, &acc.tallies, acc.bank.len());
        if acc.tallies.k_estimate().is_none() {
            warn!("No absorption or leakage in batch {batch}, reporting k = 0");
        }

        info!(
            "batch {}: k = {} (std dev {})",
            batch,
            result.k.sci(5, 2),
            result.std_dev.sci(5, 2)
        );
        debug!(
            "batch {}: leakage={} absorption={} fission={} sites={}",
            batch, result.leakage, result.absorption, result.fission, result.fission_sites
        );
        if result.lost > 0 {
            warn!("batch {}: {} histories lost", batch, result.lost);
        }
        if result.truncated > 0 {
            warn!(
                "batch {}: {} histories truncated at {:?} collisions",
                batch, result.truncated, self.settings.max_collisions
            );
        }

        // the new bank becomes the source, the old one is dropped
        self.source = acc.bank;
        self.run_tallies.merge(&acc.tallies);
        self.results.push(result.clone());

        Ok(result)
    }

    /// Summarise every batch run so far
    pub fn finish(self) -> RunSummary {
        RunSummary {
            batches: self.results,
            mean_crow_distance: self.run_tallies.mean_crow_distance(),
        }
    }

    /// Run every history of a batch in parallel
    ///
    /// Workers fold histories into their own accumulators, which are reduced
    /// in history order so the fission bank keeps the same order for any
    /// number of threads.
    fn transport_histories(&self, batch: usize) -> BatchAccumulator {
        let template = Flux::zeroed_like(self.mesh.flux());
        let ctx = HistoryContext::new(&*self.mesh, self.boundary)
            .max_collisions(self.settings.max_collisions);

        (0..self.settings.histories)
            .into_par_iter()
            .fold(
                || BatchAccumulator::new(&template),
                |mut acc, history| {
                    let mut rng = self.history_rng(batch, history);
                    self.run_history(batch, &ctx, &mut rng, &mut acc);
                    acc
                },
            )
            .reduce(
                || BatchAccumulator::new(&template),
                |mut a, b| {
                    a.merge(b);
                    a
                },
            )
    }

    /// Sample a source neutron and transport it
    fn run_history(
        &self,
        batch: usize,
        ctx: &HistoryContext,
        rng: &mut Pcg64,
        acc: &mut BatchAccumulator,
    ) {
        let position = if batch == 0 {
            sampler::uniform_position(rng, self.boundary)
        } else {
            match sampler::fission_site(rng, &self.source) {
                Some(site) => site,
                // checked non-empty before the batch started
                None => unreachable!("fission bank emptied during a batch"),
            }
        };

        match source_neutron(rng, &*self.mesh, position) {
            Ok(mut neutron) => {
                transport_neutron(&mut neutron, ctx, rng, acc);
            }
            Err(e) => {
                warn!("Lost source neutron: {e}");
                acc.tallies.score_fate(Fate::Lost, 0.0);
            }
        }
    }

    /// Independent random stream for a history
    fn history_rng(&self, batch: usize, history: usize) -> Pcg64 {
        let index = (batch as u64)
            .wrapping_mul(self.settings.histories as u64)
            .wrapping_add(history as u64);
        Pcg64::seed_from_u64(
            self.settings
                .seed
                .wrapping_add(index.wrapping_mul(SEED_STRIDE)),
        )
    }
}
