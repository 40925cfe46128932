//! Result and Error types for critmc-material

/// Type alias for Result<T, material::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `critmc-material` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed to (de)serialise material data")]
    FailedSerde(#[from] serde_json::Error),

    #[error("invalid cross section data")]
    InvalidData(#[from] critmc_utils::Error),

    #[error("a material needs at least one energy group")]
    NoGroups,

    #[error("inconsistent length of {field} (expected {expected:?}, found {found:?})")]
    UnexpectedLength {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("{field}[{group}] must be finite and non-negative (found {value})")]
    InvalidValue {
        field: String,
        group: usize,
        value: f64,
    },

    #[error("negative absorption in group {group} (sigma_t={sigma_t}, sum of sigma_s={sigma_s})")]
    NegativeAbsorption {
        group: usize,
        sigma_t: f64,
        sigma_s: f64,
    },

    #[error("fission exceeds absorption in group {group} (sigma_f={sigma_f}, sigma_a={sigma_a})")]
    FissionExceedsAbsorption {
        group: usize,
        sigma_f: f64,
        sigma_a: f64,
    },

    #[error("fission spectrum must sum to 1 for a fissile material (found {sum})")]
    InvalidChi { sum: f64 },

    #[error("average fission yield must be finite and non-negative (found {0})")]
    InvalidNu(f64),
}
