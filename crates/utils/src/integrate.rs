//! Romberg quadrature and evenly spaced ranges

// crate modules
use crate::error::{Error, Result};

// external crates
use log::warn;

/// Absolute and relative tolerance of the adaptive Romberg scheme
const TOLERANCE: f64 = 1.48e-8;

/// Maximum order of extrapolation before giving up on convergence
const MAX_DIVISIONS: usize = 10;

/// Adaptive Romberg integration of `f` over `[a, b]`
///
/// The trapezium rule is refined by successive halving and the estimates
/// are Richardson extrapolated until two consecutive diagonal terms agree
/// to within tolerance. If convergence is not reached the best estimate is
/// returned with a warning.
///
/// ```rust
/// # use galtools_utils::romberg;
/// let area = romberg(|x| x * x, 0.0, 3.0);
/// assert!((area - 9.0).abs() < 1e-10);
/// ```
pub fn romberg<F: Fn(f64) -> f64>(f: F, a: f64, b: f64) -> f64 {
    if a == b {
        return 0.0;
    }

    let mut h = b - a;
    let mut previous = vec![0.5 * h * (f(a) + f(b))];
    let mut intervals = 1_usize;

    for _ in 1..=MAX_DIVISIONS {
        // midpoints of the current intervals refine the trapezium estimate
        let midpoints = (0..intervals)
            .map(|k| f(a + (k as f64 + 0.5) * h))
            .sum::<f64>();
        let mut row = Vec::with_capacity(previous.len() + 1);
        row.push(0.5 * (previous[0] + h * midpoints));

        let mut factor = 1.0;
        for (j, last) in previous.iter().enumerate() {
            factor *= 4.0;
            let improved = row[j] + (row[j] - last) / (factor - 1.0);
            row.push(improved);
        }

        let (old, new) = (previous[previous.len() - 1], row[row.len() - 1]);
        if (new - old).abs() <= TOLERANCE.max(TOLERANCE * new.abs()) {
            return new;
        }

        previous = row;
        intervals *= 2;
        h *= 0.5;
    }

    warn!("Romberg integration over [{a}, {b}] did not converge");
    previous[previous.len() - 1]
}

/// Romberg integration of equally spaced samples
///
/// There must be `2^k + 1` samples spaced by `dx`, as for
/// `scipy.integrate.romb`.
///
/// ```rust
/// # use galtools_utils::{romb, linspace};
/// let x = linspace(0.0, 1.0, 17);
/// let y = x.iter().map(|x| 4.0 * x.powi(3)).collect::<Vec<f64>>();
/// assert!((romb(&y, x[1] - x[0]).unwrap() - 1.0).abs() < 1e-12);
///
/// assert!(romb(&[1.0, 2.0, 3.0, 4.0], 1.0).is_err());
/// ```
pub fn romb(samples: &[f64], dx: f64) -> Result<f64> {
    let n = samples.len();
    let intervals = n.saturating_sub(1);
    if n < 2 || !intervals.is_power_of_two() {
        return Err(Error::InvalidSampleCount { found: n });
    }

    let levels = intervals.trailing_zeros() as usize;
    let mut h = intervals as f64 * dx;
    let mut table = vec![0.5 * h * (samples[0] + samples[n - 1])];
    let mut stride = intervals;

    for _ in 0..levels {
        let half = stride / 2;
        let midpoints = (half..intervals)
            .step_by(stride)
            .map(|i| samples[i])
            .sum::<f64>();
        h *= 0.5;

        let mut row = Vec::with_capacity(table.len() + 1);
        row.push(0.5 * table[0] + h * midpoints);
        let mut factor = 1.0;
        for (j, last) in table.iter().enumerate() {
            factor *= 4.0;
            row.push(row[j] + (row[j] - last) / (factor - 1.0));
        }

        table = row;
        stride = half;
    }

    Ok(table[table.len() - 1])
}

/// `n` evenly spaced values over `[start, stop]`, inclusive
///
/// ```rust
/// # use galtools_utils::linspace;
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
/// ```
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values = (0..n).map(|i| start + i as f64 * step).collect::<Vec<_>>();
            values[n - 1] = stop;
            values
        }
    }
}

/// Values from `start` towards `stop` (exclusive) in increments of `step`
///
/// The number of values is `ceil((stop - start) / step)` as with
/// `numpy.arange`.
///
/// ```rust
/// # use galtools_utils::arange;
/// assert_eq!(arange(0.0, 1.0, 0.25).unwrap(), vec![0.0, 0.25, 0.5, 0.75]);
/// assert!(arange(0.0, 1.0, 0.0).is_err());
/// ```
pub fn arange(start: f64, stop: f64, step: f64) -> Result<Vec<f64>> {
    if step == 0.0 || !step.is_finite() {
        return Err(Error::InvalidStep { step });
    }
    let n = ((stop - start) / step).ceil().max(0.0) as usize;
    Ok((0..n).map(|i| start + i as f64 * step).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn romberg_smooth_functions() {
        assert_relative_eq!(
            romberg(f64::sin, 0.0, std::f64::consts::PI),
            2.0,
            epsilon = 1e-8
        );
        assert_relative_eq!(romberg(|x| 1.0 / x, 1.0, 10.0), 10f64.ln(), epsilon = 1e-7);
        assert_eq!(romberg(|x| x, 4.0, 4.0), 0.0);
    }

    #[test]
    fn romberg_reversed_limits() {
        assert_relative_eq!(romberg(|x| x, 1.0, 0.0), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn romb_matches_exact_polynomial() {
        let x = linspace(1.0, 3.0, 257);
        let y = x.iter().map(|x| x * x).collect::<Vec<_>>();
        assert_relative_eq!(romb(&y, x[1] - x[0]).unwrap(), 26.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn romb_two_points_is_trapezium() {
        assert_relative_eq!(romb(&[1.0, 3.0], 2.0).unwrap(), 4.0);
    }

    #[test]
    fn arange_counts() {
        assert_eq!(arange(0.0, 20.0, 0.25).unwrap().len(), 80);
        assert!(arange(1.0, 0.0, 0.5).unwrap().is_empty());
    }
}
