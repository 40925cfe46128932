use crate::error::{Error, Result};

/// Extends functionality for slices of float arrays
pub trait SliceExt<T> {
    /// Sum of a slice of finite values
    ///
    /// Cross section rows are summed all over the place, and a single `NaN`
    /// in the input data would silently poison every derived quantity.
    ///
    /// ```rust
    /// # use critmc_utils::SliceExt;
    /// # use critmc_utils::Error;
    /// assert_eq!([0.25, 0.5, 0.25].try_sum(), Ok(1.0));
    /// assert_eq!([0.25, f64::NAN].try_sum(), Err(Error::SliceContainsUndefinedValues));
    /// ```
    fn try_sum(&self) -> Result<T>;

    /// Find the bin of a discrete distribution holding a cumulative fraction
    ///
    /// The slice is treated as a set of non-negative (not necessarily
    /// normalised) weights. For a fraction `xi` in `[0, 1)`, this returns the
    /// first index `i` where `xi * total < weights[0] + ... + weights[i]`.
    ///
    /// Bins with zero weight can never be selected, so a fission spectrum of
    /// `[1.0, 0.0]` always returns the first bin.
    ///
    /// ```rust
    /// # use critmc_utils::SliceExt;
    /// # use critmc_utils::Error;
    /// let weights = [0.2, 0.0, 0.6, 0.2];
    ///
    /// assert_eq!(weights.find_bin_cumulative(0.0), Ok(0));
    /// assert_eq!(weights.find_bin_cumulative(0.2), Ok(2));
    /// assert_eq!(weights.find_bin_cumulative(0.79), Ok(2));
    /// assert_eq!(weights.find_bin_cumulative(0.8), Ok(3));
    ///
    /// // Nothing can be drawn from an empty distribution
    /// assert_eq!([0.0, 0.0].find_bin_cumulative(0.5), Err(Error::ZeroSumDistribution));
    /// ```
    fn find_bin_cumulative(&self, xi: T) -> Result<usize>;
}

impl SliceExt<f64> for [f64] {
    fn try_sum(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(Error::SliceContainsNoValues);
        }

        let total: f64 = self.iter().sum();
        if total.is_finite() {
            Ok(total)
        } else {
            Err(Error::SliceContainsUndefinedValues)
        }
    }

    fn find_bin_cumulative(&self, xi: f64) -> Result<usize> {
        if !(0.0..1.0).contains(&xi) {
            return Err(Error::ValueOutsideOfBounds {
                value: xi,
                lower_bound: 0.0,
                upper_bound: 1.0,
            });
        }

        if self.iter().any(|w| *w < 0.0) {
            return Err(Error::SliceContainsNegativeValues);
        }

        let total = self.try_sum()?;
        if total <= 0.0 {
            return Err(Error::ZeroSumDistribution);
        }

        let target = xi * total;
        let mut cumulative = 0.0;
        for (idx, weight) in self.iter().enumerate() {
            cumulative += weight;
            if target < cumulative {
                return Ok(idx);
            }
        }

        // rounding in the running sum can leave target just above the final
        // cumulative value, which belongs to the last non-empty bin
        self.iter()
            .rposition(|w| *w > 0.0)
            .ok_or(Error::ZeroSumDistribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[1.0], 0.0, 0)]
    #[case(&[1.0], 0.999, 0)]
    #[case(&[0.0, 1.0], 0.0, 1)]
    #[case(&[3.0, 1.0], 0.74, 0)]
    #[case(&[3.0, 1.0], 0.75, 1)]
    #[case(&[0.5, 0.5, 0.0], 0.9999999, 1)]
    fn cumulative_bins(#[case] weights: &[f64], #[case] xi: f64, #[case] expected: usize) {
        assert_eq!(weights.find_bin_cumulative(xi), Ok(expected));
    }

    #[test]
    fn cumulative_rejects_bad_input() {
        assert_eq!(
            [1.0, -0.5].find_bin_cumulative(0.1),
            Err(Error::SliceContainsNegativeValues)
        );
        assert!([1.0].find_bin_cumulative(1.0).is_err());
        assert!([1.0].find_bin_cumulative(-0.1).is_err());
        assert_eq!(
            Vec::<f64>::new().find_bin_cumulative(0.1),
            Err(Error::SliceContainsNoValues)
        );
    }

    #[test]
    fn sum_of_empty_slice() {
        assert_eq!(Vec::<f64>::new().try_sum(), Err(Error::SliceContainsNoValues));
    }
}
