// crate modules
use crate::error::{Error, Result};

// critmc modules
use critmc_utils::f;

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// external crates
use serde::{Deserialize, Serialize};

/// Run parameters for the power iteration
///
/// Every field has a default, so a JSON settings file only needs to list what
/// changes.
///
/// ```rust
/// # use critmc_transport::Settings;
/// let settings: Settings = serde_json::from_str(
///     r#"{ "histories": 5000, "batches": 20, "inactive": 5 }"#
/// ).unwrap();
///
/// assert_eq!(settings.seed, 1);
/// assert_eq!(settings.threads, None);
/// assert!(settings.validate().is_ok());
/// ```
///
/// The same can be built with chained setters.
///
/// ```rust
/// # use critmc_transport::Settings;
/// let settings = Settings::new()
///     .histories(5000)
///     .batches(20)
///     .inactive(5)
///     .seed(42)
///     .threads(4)
///     .disable_progress(true);
///
/// assert_eq!(settings.threads, Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Histories per batch
    pub histories: usize,
    /// Total number of batches
    pub batches: usize,
    /// Leading batches left out of the k statistics
    pub inactive: usize,
    /// Seed for every random stream in the run
    pub seed: u64,
    /// Worker threads, `None` for the rayon default
    pub threads: Option<usize>,
    /// Collisions allowed per history before it is cut short
    pub max_collisions: Option<usize>,
    /// Do not print the progress bar
    pub disable_progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            histories: 1000,
            batches: 10,
            inactive: 0,
            seed: 1,
            threads: None,
            max_collisions: None,
            disable_progress: false,
        }
    }
}

impl Settings {
    /// Start from the default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from a JSON file and validate them
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let settings: Settings = serde_json::from_reader(reader)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings describe a run that can actually happen
    pub fn validate(&self) -> Result<()> {
        if self.histories == 0 {
            return Err(Error::InvalidSettings(
                "at least one history per batch is needed".to_string(),
            ));
        }

        if self.batches == 0 {
            return Err(Error::InvalidSettings(
                "at least one batch is needed".to_string(),
            ));
        }

        if self.inactive >= self.batches {
            return Err(Error::InvalidSettings(f!(
                "{} inactive batches leaves none of the {} batches active",
                self.inactive, self.batches
            )));
        }

        if self.threads == Some(0) {
            return Err(Error::InvalidSettings(
                "thread count must be at least 1".to_string(),
            ));
        }

        if self.max_collisions == Some(0) {
            return Err(Error::InvalidSettings(
                "collision limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of batches counted towards the k statistics
    pub fn active(&self) -> usize {
        self.batches.saturating_sub(self.inactive)
    }

    pub fn histories(mut self, histories: usize) -> Self {
        self.histories = histories;
        self
    }

    pub fn batches(mut self, batches: usize) -> Self {
        self.batches = batches;
        self
    }

    pub fn inactive(mut self, inactive: usize) -> Self {
        self.inactive = inactive;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Safety valve for problems where a history may never end
    ///
    /// A fully reflective box with no absorption is the obvious example.
    pub fn max_collisions(mut self, max_collisions: usize) -> Self {
        self.max_collisions = Some(max_collisions);
        self
    }

    pub fn disable_progress(mut self, disable: bool) -> Self {
        self.disable_progress = disable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Settings::new().histories(0))]
    #[case(Settings::new().batches(0))]
    #[case(Settings::new().batches(3).inactive(3))]
    #[case(Settings::new().threads(0))]
    #[case(Settings::new().max_collisions(0))]
    fn invalid(#[case] settings: Settings) {
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.active(), 10);
    }

    #[test]
    fn json_round_trip_through_file() {
        let path = std::env::temp_dir().join("critmc_settings.json");
        let settings = Settings::new().histories(20).batches(4).max_collisions(100);
        std::fs::write(&path, serde_json::to_string(&settings).unwrap()).unwrap();

        assert_eq!(Settings::from_json_file(&path).unwrap(), settings);
        std::fs::remove_file(&path).ok();
    }
}
