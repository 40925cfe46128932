//! Samples from the physical distributions used in transport
//!
//! Every function takes an explicit random stream and consumes a fixed number
//! of uniform variates, no matter the outcome:
//!
//! | Function                                  | Draws |
//! | ----------------------------------------- | ----- |
//! | [isotropic_direction()]                   | 2     |
//! | [uniform_position()]                      | 3     |
//! | everything else                           | 1     |
//!
//! This keeps the sequence of draws for a history fixed by its random seed
//! alone, which is what makes runs reproducible.
//!
//! ```rust
//! # use critmc_transport::sampler;
//! # use rand::SeedableRng;
//! # use rand_pcg::Pcg64;
//! let mut rng = Pcg64::seed_from_u64(1);
//!
//! let direction = sampler::isotropic_direction(&mut rng);
//! assert!((direction.norm() - 1.0).abs() < 1e-12);
//!
//! // Exactly one neutron for nu = 1
//! assert_eq!(sampler::fission_multiplicity(&mut rng, 1.0), 1);
//! ```

// crate modules
use crate::bank::FissionBank;

// critmc modules
use critmc_geometry::{Axis, Boundary, Side};
use critmc_material::Material;
use critmc_utils::SliceExt;

// standard library
use std::f64::consts::PI;

// external crates
use nalgebra::Vector3;
use rand::Rng;

/// Uniform variate on `[0, 1)`
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Azimuthal angle, uniform on `[0, 2π)`
pub fn azimuthal_angle<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    2.0 * PI * uniform(rng)
}

/// Cosine of the polar angle, uniform on `[-1, 1)`
///
/// Sampling the cosine rather than the angle itself is what makes the
/// direction isotropic.
pub fn polar_cosine<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    2.0 * uniform(rng) - 1.0
}

/// Polar angle sampled uniformly on `[0, π)`
///
/// **Not isotropic**: directions bunch up at the poles. Never used in
/// transport, only kept to compare against [polar_cosine()].
pub fn uniform_polar_angle<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    PI * uniform(rng)
}

/// Isotropic unit direction from a polar cosine and azimuthal angle
pub fn isotropic_direction<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f64> {
    let mu = polar_cosine(rng);
    let phi = azimuthal_angle(rng);
    let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();
    Vector3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), mu)
}

/// Distance to the next collision in mean free paths
///
/// Uses `1 - U` so the logarithm is always finite.
pub fn optical_depth<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    -(1.0 - uniform(rng)).ln()
}

/// Free flight distance for a total cross section
///
/// Infinite for a void, though a variate is drawn regardless.
///
/// ```rust
/// # use critmc_transport::sampler;
/// # use rand::SeedableRng;
/// # use rand_pcg::Pcg64;
/// let mut rng = Pcg64::seed_from_u64(7);
/// assert!(sampler::free_flight_distance(&mut rng, 2.0) >= 0.0);
/// assert_eq!(sampler::free_flight_distance(&mut rng, 0.0), f64::INFINITY);
/// ```
pub fn free_flight_distance<R: Rng + ?Sized>(rng: &mut R, sigma_t: f64) -> f64 {
    let tau = optical_depth(rng);
    if sigma_t > 0.0 {
        tau / sigma_t
    } else {
        f64::INFINITY
    }
}

/// True if a collision in group `g` is a scatter, otherwise an absorption
pub fn is_scatter<R: Rng + ?Sized>(rng: &mut R, material: &Material, g: usize) -> bool {
    uniform(rng) < material.scatter_probability(g)
}

/// True if an absorption in group `g` causes fission, otherwise a capture
pub fn is_fission<R: Rng + ?Sized>(rng: &mut R, material: &Material, g: usize) -> bool {
    uniform(rng) < material.fission_probability(g)
}

/// Number of neutrons released by a fission
///
/// Either `floor(nu)` or one more, with the probability of the extra neutron
/// equal to the fractional part of `nu`. The expected value is exactly `nu`.
pub fn fission_multiplicity<R: Rng + ?Sized>(rng: &mut R, nu: f64) -> usize {
    let base = nu.floor();
    let extra = usize::from(uniform(rng) < nu - base);
    base as usize + extra
}

/// Energy group of a fission neutron, drawn from the spectrum `chi`
///
/// A spectrum that sums to zero (non-fissile material) always gives group 0.
pub fn fission_group<R: Rng + ?Sized>(rng: &mut R, chi: &[f64]) -> usize {
    chi.find_bin_cumulative(uniform(rng)).unwrap_or(0)
}

/// Energy group after a scatter out of group `g`
///
/// Drawn from the scattering matrix row, normalised by its own sum. A row with
/// no scattering leaves the group unchanged.
pub fn scatter_group<R: Rng + ?Sized>(rng: &mut R, material: &Material, g: usize) -> usize {
    material
        .sigma_s(g)
        .find_bin_cumulative(uniform(rng))
        .unwrap_or(g)
}

/// Uniform pick of a fission site, with replacement
///
/// Returns `None` for an empty bank.
pub fn fission_site<R: Rng + ?Sized>(rng: &mut R, bank: &FissionBank) -> Option<Vector3<f64>> {
    let u = uniform(rng);
    if bank.is_empty() {
        return None;
    }
    let idx = ((u * bank.len() as f64) as usize).min(bank.len() - 1);
    bank.get(idx).copied()
}

/// Uniform position inside a box
pub fn uniform_position<R: Rng + ?Sized>(rng: &mut R, boundary: &Boundary) -> Vector3<f64> {
    let mut position = Vector3::zeros();
    for axis in Axis::ALL {
        let min = boundary.coordinate(axis, Side::Min);
        position[axis.index()] = min + uniform(rng) * boundary.width(axis);
    }
    position
}
