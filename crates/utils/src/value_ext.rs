use crate::f;

/// Extends primitives with more specific formatting options
pub trait ValueExt {
    /// Scientific formatting with a signed, zero-padded exponent
    ///
    /// The standard `{:e}` output drops the exponent sign and padding, which
    /// makes columns of tallies and cross sections awkward to read. This fixes
    /// the mantissa precision and pads the exponent to `exp_pad` digits.
    ///
    /// ```rust
    /// # use critmc_utils::ValueExt;
    /// assert_eq!((-1.0_f64).sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!((2.0_f64 / 9.0).sci(3, 2), "2.222e-01".to_string());
    /// assert_eq!(10000.0_f64.sci(2, 3), "1.00e+004".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: std::fmt::LowerExp> ValueExt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let mut mantissa = f!("{:.precision$e}", &self, precision = precision);

        // LowerExp output always contains the 'e' marker
        let Some(split) = mantissa.find('e') else {
            return mantissa;
        };
        let exponent = mantissa.split_off(split);

        let (sign, digits) = match exponent.strip_prefix("e-") {
            Some(digits) => ('-', digits),
            None => ('+', &exponent[1..]),
        };

        mantissa.push_str(&f!("e{}{:0>pad$}", sign, digits, pad = exp_pad));
        mantissa
    }
}
