use crate::f;

/// Extends numeric primitives with consistent scientific formatting
pub trait ValueExt {
    /// Scientific notation with a signed, zero-padded exponent
    ///
    /// Rust's `{:e}` drops the exponent sign and padding, which makes columns
    /// of table limits ragged. Anything implementing `LowerExp` works.
    ///
    /// ```rust
    /// # use galtools_utils::ValueExt;
    /// assert_eq!((-1.0_f64).sci(5, 2), "-1.00000e+00");
    /// assert_eq!(0.0188_f64.sci(3, 2), "1.880e-02");
    /// assert_eq!(3.08567758e22_f64.sci(2, 3), "3.09e+022");
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: std::fmt::LowerExp> ValueExt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let raw = f!("{:.precision$e}", &self, precision = precision);
        let Some((mantissa, exponent)) = raw.split_once('e') else {
            return raw;
        };
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        f!("{mantissa}e{sign}{digits:0>exp_pad$}")
    }
}
