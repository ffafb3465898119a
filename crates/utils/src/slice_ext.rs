use crate::error::{Error, Result};

/// Extends functionality for slices of float arrays
pub trait SliceExt {
    /// Find the minimum value in float arrays
    ///
    /// Only provides the minimum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use galtools_utils::SliceExt;
    /// # use galtools_utils::Error;
    /// assert_eq!([1.1, 0.5, 2.2].try_min(), Ok(0.5));
    ///
    /// assert_eq!([1.1, f64::NAN].try_min(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!(Vec::<f64>::new().try_min(), Err(Error::SliceContainsNoValues));
    /// ```
    fn try_min(&self) -> Result<f64>;

    /// Find the maximum value in float arrays
    ///
    /// ```rust
    /// # use galtools_utils::SliceExt;
    /// assert_eq!([1.1, 0.5, 2.2].try_max(), Ok(2.2));
    /// assert!([1.1, f64::INFINITY].try_max().is_err());
    /// ```
    fn try_max(&self) -> Result<f64>;

    /// Minimum over the finite entries only, ignoring NaN and infinities
    ///
    /// Tables padded with NaN are common, so this is the `nanmin` analogue.
    ///
    /// ```rust
    /// # use galtools_utils::SliceExt;
    /// assert_eq!([f64::NAN, 3.0, 1.0].finite_min(), Some(1.0));
    /// assert_eq!([f64::NAN].finite_min(), None);
    /// ```
    fn finite_min(&self) -> Option<f64>;

    /// Maximum over the finite entries only, ignoring NaN and infinities
    fn finite_max(&self) -> Option<f64>;

    /// Find index bin containing 'value', where bins are low < value <= high
    ///
    /// A value on a bin edge returns the bin below. Values equal to the lowest
    /// bound are considered part of the first bin.
    ///
    /// ```rust
    /// # use galtools_utils::SliceExt;
    /// let edges = vec![0.0, 0.1, 1.0, 20.0];
    /// assert_eq!(edges.find_bin_inclusive(0.0), Ok(0));
    /// assert_eq!(edges.find_bin_inclusive(1.0), Ok(1));
    /// assert_eq!(edges.find_bin_inclusive(20.0), Ok(2));
    /// assert!(edges.find_bin_inclusive(21.0).is_err());
    /// ```
    fn find_bin_inclusive(&self, value: f64) -> Result<usize>;

    /// Find index bin containing 'value', where bins are low <= value < high
    ///
    /// A value on a bin edge returns the bin above. Values equal to the highest
    /// bound are considered part of the last bin.
    ///
    /// ```rust
    /// # use galtools_utils::SliceExt;
    /// let edges = vec![0.0, 0.1, 1.0, 20.0];
    /// assert_eq!(edges.find_bin_exclusive(0.1), Ok(1));
    /// assert_eq!(edges.find_bin_exclusive(20.0), Ok(2));
    /// assert!(edges.find_bin_exclusive(-1.0).is_err());
    /// ```
    fn find_bin_exclusive(&self, value: f64) -> Result<usize>;

    /// Index of the entry closest to `value`
    ///
    /// Ties go to the first entry, as with `numpy.argmin`. NaN entries never
    /// win.
    ///
    /// ```rust
    /// # use galtools_utils::SliceExt;
    /// let redshifts = [0.0, 0.5, 1.0, 2.0];
    /// assert_eq!(redshifts.nearest_index(0.7), Some(1));
    /// assert_eq!(redshifts.nearest_index(10.0), Some(3));
    /// assert_eq!(Vec::<f64>::new().nearest_index(1.0), None);
    /// ```
    fn nearest_index(&self, value: f64) -> Option<usize>;

    /// True when every entry is strictly greater than the previous one
    fn is_ascending(&self) -> bool;
}

impl SliceExt for [f64] {
    fn try_min(&self) -> Result<f64> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        };
        self.iter()
            .min_by(|a, b| a.total_cmp(b))
            .copied()
            .ok_or(Error::SliceContainsNoValues)
    }

    fn try_max(&self) -> Result<f64> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        };
        self.iter()
            .max_by(|a, b| a.total_cmp(b))
            .copied()
            .ok_or(Error::SliceContainsNoValues)
    }

    fn finite_min(&self) -> Option<f64> {
        self.iter()
            .filter(|v| v.is_finite())
            .min_by(|a, b| a.total_cmp(b))
            .copied()
    }

    fn finite_max(&self) -> Option<f64> {
        self.iter()
            .filter(|v| v.is_finite())
            .max_by(|a, b| a.total_cmp(b))
            .copied()
    }

    fn find_bin_inclusive(&self, value: f64) -> Result<usize> {
        edges(self, value)?;

        // first upper edge that is >= value, the lowest edge falls in bin 0
        Ok(self[1..].partition_point(|high| *high < value))
    }

    fn find_bin_exclusive(&self, value: f64) -> Result<usize> {
        edges(self, value)?;

        // special case for being on the upper edge
        if value == self[self.len() - 1] {
            return Ok(self.len() - 2);
        }

        // first upper edge strictly above the value
        Ok(self[1..].partition_point(|high| *high <= value))
    }

    fn nearest_index(&self, value: f64) -> Option<usize> {
        self.iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .min_by(|(_, a), (_, b)| (*a - value).abs().total_cmp(&(*b - value).abs()))
            .map(|(i, _)| i)
    }

    fn is_ascending(&self) -> bool {
        self.windows(2).all(|w| w[0] < w[1])
    }
}

/// Validates a value against a set of bin edges, returning the outer bounds
fn edges(slice: &[f64], value: f64) -> Result<(f64, f64)> {
    let n = slice.len();
    if n < 2 {
        return Err(Error::BelowMinimumSliceLength {
            length: n,
            minimum_required: 2,
        });
    }

    let (lower_bound, upper_bound) = (slice[0], slice[n - 1]);
    if value < lower_bound || value > upper_bound || value.is_nan() {
        return Err(out_of_bounds(value, lower_bound, upper_bound));
    }
    Ok((lower_bound, upper_bound))
}

fn out_of_bounds(value: f64, lower_bound: f64, upper_bound: f64) -> Error {
    Error::ValueOutsideOfBounds {
        value,
        lower_bound,
        upper_bound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_bins_prefer_lower_bin_on_edges() {
        let edges = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(edges.find_bin_inclusive(1.0), Ok(0));
        assert_eq!(edges.find_bin_inclusive(1.5), Ok(1));
        assert_eq!(edges.find_bin_inclusive(3.0), Ok(2));
    }

    #[test]
    fn exclusive_bins_prefer_upper_bin_on_edges() {
        let edges = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(edges.find_bin_exclusive(0.0), Ok(0));
        assert_eq!(edges.find_bin_exclusive(1.0), Ok(1));
        assert_eq!(edges.find_bin_exclusive(2.999), Ok(2));
    }

    #[test]
    fn short_slices_are_rejected() {
        assert_eq!(
            [1.0].find_bin_inclusive(1.0),
            Err(Error::BelowMinimumSliceLength {
                length: 1,
                minimum_required: 2
            })
        );
    }

    #[test]
    fn nearest_index_skips_nan() {
        assert_eq!([f64::NAN, 4.0, 1.0].nearest_index(0.0), Some(2));
    }

    #[test]
    fn ascending() {
        assert!([0.1, 0.2, 0.3].is_ascending());
        assert!(![0.1, 0.1, 0.3].is_ascending());
    }
}
