//! Module for material cross section data and validation

// crate modules
use crate::error::{Error, Result};

// critmc modules
use critmc_utils::{f, SliceExt, ValueExt};

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// external crates
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Relative tolerance on a negative absorption cross section before failing
const ABSORPTION_TOLERANCE: f64 = 1e-12;

/// Tolerance on the fission spectrum summing to unity
const CHI_TOLERANCE: f64 = 1e-6;

/// Validated multigroup macroscopic cross sections for a single material
///
/// All cross sections are indexed by energy group, where group 0 is the
/// highest energy. The scattering matrix is indexed `[from][to]`.
///
/// The absorption cross section is never given directly. It is derived on
/// construction as
///
/// ```text
/// sigma_a[g] = sigma_t[g] - sum(sigma_s[g][..])
/// ```
///
/// and the material is rejected if this would be negative for any group. The
/// same is true for a fission cross section larger than the absorption cross
/// section, since the probability of fission given an absorption is
/// `sigma_f / sigma_a`.
///
/// A [Material] is immutable once constructed, and is shared read-only by
/// every mesh cell it is assigned to.
///
/// ```rust
/// # use critmc_material::Material;
/// // One group fuel, half of all collisions are scatters
/// let fuel = Material::new(
///     vec![2.0],          // sigma_t
///     vec![vec![1.0]],    // sigma_s
///     vec![0.5],          // sigma_f
///     2.4,                // nu
///     vec![1.0],          // chi
/// ).unwrap();
///
/// assert_eq!(fuel.sigma_a(0), 1.0);
/// assert_eq!(fuel.scatter_probability(0), 0.5);
/// assert_eq!(fuel.fission_probability(0), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    sigma_t: Vec<f64>,
    sigma_s: Vec<Vec<f64>>,
    sigma_f: Vec<f64>,
    nu: f64,
    chi: Vec<f64>,
    sigma_a: Vec<f64>,
    sigma_s_total: Vec<f64>,
}

impl Material {
    /// Build a new material from raw cross sections
    ///
    /// The number of groups is taken from `sigma_t`, and every other group
    /// structured field must match it. See [Material] for the validation
    /// applied.
    pub fn new(
        sigma_t: Vec<f64>,
        sigma_s: Vec<Vec<f64>>,
        sigma_f: Vec<f64>,
        nu: f64,
        chi: Vec<f64>,
    ) -> Result<Self> {
        let groups = sigma_t.len();
        if groups == 0 {
            return Err(Error::NoGroups);
        }

        Self::check_length("sigma_s", groups, sigma_s.len())?;
        Self::check_length("sigma_f", groups, sigma_f.len())?;
        Self::check_length("chi", groups, chi.len())?;
        for row in &sigma_s {
            Self::check_length("sigma_s row", groups, row.len())?;
        }

        Self::check_values("sigma_t", &sigma_t)?;
        Self::check_values("sigma_f", &sigma_f)?;
        Self::check_values("chi", &chi)?;
        for row in &sigma_s {
            Self::check_values("sigma_s", row)?;
        }

        if !nu.is_finite() || nu < 0.0 {
            return Err(Error::InvalidNu(nu));
        }

        // derived quantities
        let sigma_s_total = sigma_s
            .iter()
            .map(|row| row.try_sum())
            .collect::<std::result::Result<Vec<f64>, _>>()?;

        let mut sigma_a = Vec::with_capacity(groups);
        for g in 0..groups {
            let absorption = sigma_t[g] - sigma_s_total[g];
            if absorption < -ABSORPTION_TOLERANCE * sigma_t[g] {
                return Err(Error::NegativeAbsorption {
                    group: g,
                    sigma_t: sigma_t[g],
                    sigma_s: sigma_s_total[g],
                });
            }
            if absorption < 0.0 {
                warn!("Clamped sigma_a = {absorption:e} to zero in group {g}");
            }
            sigma_a.push(absorption.max(0.0));
        }

        for g in 0..groups {
            if sigma_f[g] > sigma_a[g] {
                return Err(Error::FissionExceedsAbsorption {
                    group: g,
                    sigma_f: sigma_f[g],
                    sigma_a: sigma_a[g],
                });
            }
        }

        // only fissile materials need a proper emission spectrum
        let chi_sum = chi.try_sum()?;
        let fissile = sigma_f.iter().any(|s| *s > 0.0);
        if (fissile || chi_sum > 0.0) && (chi_sum - 1.0).abs() > CHI_TOLERANCE {
            return Err(Error::InvalidChi { sum: chi_sum });
        }

        Ok(Self {
            name: String::new(),
            sigma_t,
            sigma_s,
            sigma_f,
            nu,
            chi,
            sigma_a,
            sigma_s_total,
        })
    }

    /// Attach a name for reporting, e.g. "fuel" or "water"
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Read a [MaterialData] record from a JSON file and validate it
    ///
    /// ```rust, no_run
    /// # use critmc_material::Material;
    /// let water = Material::from_json_file("./data/water.json").unwrap();
    /// ```
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let data: MaterialData = serde_json::from_reader(reader)?;
        debug!(
            "Read material \"{}\" with {} groups",
            data.name,
            data.sigma_t.len()
        );
        Self::try_from(data)
    }

    /// Name given to the material, may be empty
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of energy groups
    pub fn groups(&self) -> usize {
        self.sigma_t.len()
    }

    /// Total cross section for group `g`
    #[inline]
    pub fn sigma_t(&self, g: usize) -> f64 {
        self.sigma_t[g]
    }

    /// Row of the scattering matrix for scatters out of group `g`
    #[inline]
    pub fn sigma_s(&self, g: usize) -> &[f64] {
        &self.sigma_s[g]
    }

    /// Sum of all scattering out of group `g`
    #[inline]
    pub fn sigma_s_total(&self, g: usize) -> f64 {
        self.sigma_s_total[g]
    }

    /// Fission cross section for group `g`
    #[inline]
    pub fn sigma_f(&self, g: usize) -> f64 {
        self.sigma_f[g]
    }

    /// Derived absorption cross section for group `g`
    #[inline]
    pub fn sigma_a(&self, g: usize) -> f64 {
        self.sigma_a[g]
    }

    /// Average number of neutrons released per fission
    #[inline]
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Fission emission spectrum over all groups
    #[inline]
    pub fn chi(&self) -> &[f64] {
        &self.chi
    }

    /// True if any group has a non-zero fission cross section
    pub fn is_fissile(&self) -> bool {
        self.sigma_f.iter().any(|s| *s > 0.0)
    }

    /// Probability that a collision in group `g` is a scatter
    ///
    /// Zero for a void group where `sigma_t` is zero, though no collision can
    /// be sampled there in the first place.
    pub fn scatter_probability(&self, g: usize) -> f64 {
        if self.sigma_t[g] > 0.0 {
            self.sigma_s_total[g] / self.sigma_t[g]
        } else {
            0.0
        }
    }

    /// Probability that an absorption in group `g` causes a fission
    pub fn fission_probability(&self, g: usize) -> f64 {
        if self.sigma_a[g] > 0.0 {
            self.sigma_f[g] / self.sigma_a[g]
        } else {
            0.0
        }
    }

    /// Infinite medium multiplication factor for a one group material
    ///
    /// Handy reference value for checking reflective test problems, given by
    /// `nu * sigma_f / sigma_a`. Returns `None` for multigroup data or for a
    /// material without absorption.
    pub fn k_infinity(&self) -> Option<f64> {
        if self.groups() == 1 && self.sigma_a[0] > 0.0 {
            Some(self.nu * self.sigma_f[0] / self.sigma_a[0])
        } else {
            None
        }
    }

    fn check_length(field: &str, expected: usize, found: usize) -> Result<()> {
        if expected != found {
            return Err(Error::UnexpectedLength {
                field: field.to_string(),
                expected,
                found,
            });
        }
        Ok(())
    }

    fn check_values(field: &str, values: &[f64]) -> Result<()> {
        match values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            Some((group, value)) => Err(Error::InvalidValue {
                field: field.to_string(),
                group,
                value: *value,
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = if self.name.is_empty() {
            "unnamed"
        } else {
            self.name.as_str()
        };

        let mut s = f!("Material \"{name}\" ({} groups, nu={})\n", self.groups(), self.nu);
        s += &f!(
            "{:>5}{:>13}{:>13}{:>13}{:>13}{:>13}\n",
            "group",
            "sigma_t",
            "sigma_s",
            "sigma_a",
            "sigma_f",
            "chi"
        );
        for g in 0..self.groups() {
            s += &f!(
                "{:>5}{:>13}{:>13}{:>13}{:>13}{:>13}\n",
                g,
                self.sigma_t[g].sci(5, 2),
                self.sigma_s_total[g].sci(5, 2),
                self.sigma_a[g].sci(5, 2),
                self.sigma_f[g].sci(5, 2),
                self.chi[g].sci(5, 2)
            );
        }
        write!(f, "{}", s)
    }
}

/// Raw material record as found in input files
///
/// This is the serialisable form of a [Material] with no derived values and
/// no validation applied. Convert with [Material::try_from()] to check the
/// data.
///
/// ```rust
/// # use critmc_material::{Material, MaterialData};
/// let json = r#"{
///     "name": "water",
///     "sigma_t": [0.2222, 1.6667],
///     "sigma_s": [[0.1972, 0.025], [0.0, 1.5667]],
///     "sigma_f": [0.0, 0.0],
///     "nu": 0.0,
///     "chi": [0.0, 0.0]
/// }"#;
///
/// let data: MaterialData = serde_json::from_str(json).unwrap();
/// let water = Material::try_from(data).unwrap();
/// assert_eq!(water.name(), "water");
/// assert!(!water.is_fissile());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    /// Optional name for reporting
    #[serde(default)]
    pub name: String,
    /// Total cross section per group
    pub sigma_t: Vec<f64>,
    /// Scattering matrix, `[from][to]`
    pub sigma_s: Vec<Vec<f64>>,
    /// Fission cross section per group
    #[serde(default)]
    pub sigma_f: Vec<f64>,
    /// Average fission neutron yield
    #[serde(default)]
    pub nu: f64,
    /// Fission emission spectrum
    #[serde(default)]
    pub chi: Vec<f64>,
}

impl TryFrom<MaterialData> for Material {
    type Error = Error;

    /// Validate a raw record, see [Material] for the checks applied
    ///
    /// Missing `sigma_f` and `chi` entries are filled with zeros to describe a
    /// non-fissile material in the fewest lines of input.
    fn try_from(data: MaterialData) -> Result<Self> {
        let groups = data.sigma_t.len();
        let sigma_f = if data.sigma_f.is_empty() {
            vec![0.0; groups]
        } else {
            data.sigma_f
        };
        let chi = if data.chi.is_empty() {
            vec![0.0; groups]
        } else {
            data.chi
        };

        Ok(Material::new(data.sigma_t, data.sigma_s, sigma_f, data.nu, chi)?.with_name(data.name))
    }
}

impl From<&Material> for MaterialData {
    fn from(material: &Material) -> Self {
        Self {
            name: material.name.clone(),
            sigma_t: material.sigma_t.clone(),
            sigma_s: material.sigma_s.clone(),
            sigma_f: material.sigma_f.clone(),
            nu: material.nu,
            chi: material.chi.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn two_group_fuel() -> Material {
        Material::new(
            vec![2.0 / 9.0, 5.0 / 6.0],
            vec![vec![71.0 / 360.0, 0.02], vec![0.0, 11.0 / 15.0]],
            vec![1.0 / 480.0, 1.0 / 16.0],
            2.4,
            vec![1.0, 0.0],
        )
        .unwrap()
        .with_name("fuel")
    }

    #[rstest]
    fn absorption_closes_the_balance(two_group_fuel: Material) {
        for g in 0..two_group_fuel.groups() {
            let balance = two_group_fuel.sigma_s_total(g) + two_group_fuel.sigma_a(g);
            assert!((balance - two_group_fuel.sigma_t(g)).abs() < 1e-15);
            assert!(two_group_fuel.sigma_a(g) >= 0.0);
        }
    }

    #[rstest]
    fn probabilities(two_group_fuel: Material) {
        let p = two_group_fuel.scatter_probability(1);
        assert!((p - (11.0 / 15.0) / (5.0 / 6.0)).abs() < 1e-12);
        let p = two_group_fuel.fission_probability(1);
        assert!((p - (1.0 / 16.0) / (5.0 / 6.0 - 11.0 / 15.0)).abs() < 1e-12);
        assert!(two_group_fuel.is_fissile());
        assert_eq!(two_group_fuel.k_infinity(), None);
    }

    #[test]
    fn negative_absorption_is_rejected() {
        let result = Material::new(vec![1.0], vec![vec![1.5]], vec![0.0], 0.0, vec![0.0]);
        assert!(matches!(
            result,
            Err(Error::NegativeAbsorption { group: 0, .. })
        ));
    }

    #[test]
    fn rounding_in_scatter_sum_is_tolerated() {
        // 0.1 + 0.2 is not exactly 0.3 in floating point
        let m = Material::new(vec![0.3], vec![vec![0.1 + 0.2]], vec![0.0], 0.0, vec![0.0]).unwrap();
        assert_eq!(m.sigma_a(0), 0.0);
    }

    #[test]
    fn fission_larger_than_absorption_is_rejected() {
        let result = Material::new(vec![2.0], vec![vec![1.0]], vec![1.5], 2.4, vec![1.0]);
        assert!(matches!(
            result,
            Err(Error::FissionExceedsAbsorption { group: 0, .. })
        ));
    }

    #[rstest]
    #[case(vec![0.5, 0.4])]
    #[case(vec![1.0, 0.5])]
    fn fissile_chi_must_be_normalised(#[case] chi: Vec<f64>) {
        let result = Material::new(
            vec![1.0, 1.0],
            vec![vec![0.5, 0.0], vec![0.0, 0.5]],
            vec![0.1, 0.1],
            2.4,
            chi,
        );
        assert!(matches!(result, Err(Error::InvalidChi { .. })));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let result = Material::new(vec![1.0, 1.0], vec![vec![0.5]], vec![0.0, 0.0], 0.0, vec![0.0, 0.0]);
        assert!(matches!(result, Err(Error::UnexpectedLength { .. })));

        let result = Material::new(vec![], vec![], vec![], 0.0, vec![]);
        assert!(matches!(result, Err(Error::NoGroups)));
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(-1.0)]
    #[case(f64::INFINITY)]
    fn undefined_values_are_rejected(#[case] value: f64) {
        let result = Material::new(vec![value], vec![vec![0.0]], vec![0.0], 0.0, vec![0.0]);
        assert!(matches!(result, Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn one_group_k_infinity() {
        let m = Material::new(vec![5.0 / 6.0], vec![vec![11.0 / 15.0]], vec![1.0 / 16.0], 2.4, vec![1.0]).unwrap();
        let k = m.k_infinity().unwrap();
        assert!((k - 2.4 * (1.0 / 16.0) / (5.0 / 6.0 - 11.0 / 15.0)).abs() < 1e-12);
    }

    #[rstest]
    fn data_record_conversion(two_group_fuel: Material) {
        let data = MaterialData::from(&two_group_fuel);
        let json = serde_json::to_string(&data).unwrap();
        let back = Material::try_from(serde_json::from_str::<MaterialData>(&json).unwrap()).unwrap();
        assert_eq!(back, two_group_fuel);
    }

    #[test]
    fn missing_fission_data_defaults_to_zero() {
        let data: MaterialData =
            serde_json::from_str(r#"{"sigma_t": [1.0], "sigma_s": [[0.9]]}"#).unwrap();
        let m = Material::try_from(data).unwrap();
        assert!(!m.is_fissile());
        assert_eq!(m.chi(), &[0.0]);
        assert_eq!(m.fission_probability(0), 0.0);
    }
}
