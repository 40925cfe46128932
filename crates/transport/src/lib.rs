//! Monte Carlo neutron transport and power iteration
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod bank;
mod driver;
mod error;
mod kernel;
mod particle;
mod settings;
mod summary;
mod tally;
mod writer;

pub mod sampler;

// inline the important transport types for a nice public API
#[doc(inline)]
pub use settings::Settings;

#[doc(inline)]
pub use driver::{run, Simulation};

#[doc(inline)]
pub use summary::{BatchResult, RunSummary};

#[doc(inline)]
pub use particle::{Fate, Neutron};

#[doc(inline)]
pub use bank::FissionBank;

#[doc(inline)]
pub use tally::{BatchAccumulator, Tallies, Tally};

#[doc(inline)]
pub use kernel::{source_neutron, transport_neutron, HistoryContext};

#[doc(inline)]
pub use writer::{write_flux_ascii, write_summary_json};

#[doc(inline)]
pub use error::{Error, Result};
