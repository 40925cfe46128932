//! Result and Error types for critmc-transport

/// Type alias for Result<T, transport::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `critmc-transport` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed to (de)serialise data")]
    FailedSerde(#[from] serde_json::Error),

    #[error("geometry error")]
    GeometryError(#[from] critmc_geometry::Error),

    #[error("material error")]
    MaterialError(#[from] critmc_material::Error),

    #[error("failed to build thread pool")]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("boundary does not match the extent of the mesh")]
    BoundaryMismatch,

    #[error("fission bank is empty, no source for batch {batch}")]
    EmptyFissionBank { batch: usize },

    #[error("all {batches} batches have already been run")]
    SimulationComplete { batches: usize },

    #[error("failed to initialise progress bar: {0}")]
    ProgressBar(String),
}
