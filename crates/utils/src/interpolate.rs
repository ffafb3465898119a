//! Linear interpolation in one and many dimensions
//!
//! [Interp1d] covers the tabulated curves (dust screens, filter
//! transmissions, distance tables) while [RegularGrid] covers the
//! multi-dimensional lookup tables (CLOUDY line grids, attenuation
//! compendia).
//!
//! Both share the [Bounds] policy for values that fall outside of the
//! tabulated range.

// crate modules
use crate::error::{Error, Result};
use crate::slice_ext::SliceExt;

// external crates
use ndarray::{ArrayD, ArrayView2, IxDyn};

/// What to do with values outside of the tabulated range
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Bounds {
    /// Out of range values are an error
    #[default]
    Error,
    /// Extend the end intervals linearly
    Extrapolate,
    /// Use the value at the nearest end point
    Clamp,
    /// Return a fixed value
    Fill(f64),
}

/// One dimensional piecewise linear interpolant
///
/// Knots must be strictly ascending.
///
/// ```rust
/// # use galtools_utils::{Bounds, Interp1d};
/// let curve = Interp1d::new(vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 40.0], Bounds::Extrapolate).unwrap();
/// assert_eq!(curve.eval(0.5).unwrap(), 5.0);
/// assert_eq!(curve.eval(3.0).unwrap(), 70.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Interp1d {
    x: Vec<f64>,
    y: Vec<f64>,
    bounds: Bounds,
}

impl Interp1d {
    /// Build a new interpolant, checking the knots are usable
    pub fn new(x: Vec<f64>, y: Vec<f64>, bounds: Bounds) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::LengthMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(Error::BelowMinimumSliceLength {
                length: x.len(),
                minimum_required: 2,
            });
        }
        if !x.is_ascending() {
            return Err(Error::SliceNotAscending);
        }
        Ok(Self { x, y, bounds })
    }

    /// Build from knots in any order, sorting them by `x` first
    pub fn from_unsorted(x: Vec<f64>, y: Vec<f64>, bounds: Bounds) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::LengthMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }
        let mut pairs = x.into_iter().zip(y).collect::<Vec<_>>();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (x, y) = pairs.into_iter().unzip();
        Self::new(x, y, bounds)
    }

    /// Tabulated knots
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Tabulated values
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Out of bounds policy
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Interpolate a single value
    ///
    /// NaN inputs propagate as NaN.
    pub fn eval(&self, value: f64) -> Result<f64> {
        let n = self.x.len();
        let (lo, hi) = (self.x[0], self.x[n - 1]);

        if value < lo || value > hi {
            match self.bounds {
                Bounds::Error => {
                    return Err(Error::ValueOutsideOfBounds {
                        value,
                        lower_bound: lo,
                        upper_bound: hi,
                    })
                }
                Bounds::Fill(fill) => return Ok(fill),
                Bounds::Clamp if value < lo => return Ok(self.y[0]),
                Bounds::Clamp => return Ok(self.y[n - 1]),
                Bounds::Extrapolate => (),
            }
        }

        let i = self
            .x
            .partition_point(|k| *k <= value)
            .saturating_sub(1)
            .min(n - 2);
        let t = (value - self.x[i]) / (self.x[i + 1] - self.x[i]);
        Ok(self.y[i] + t * (self.y[i + 1] - self.y[i]))
    }

    /// Interpolate every value of a slice
    pub fn eval_many(&self, values: &[f64]) -> Result<Vec<f64>> {
        values.iter().map(|v| self.eval(*v)).collect()
    }
}

/// numpy-style interpolation, clamped to the end values
///
/// `xp` must be ascending. Panics are avoided by returning NaN for tables
/// that are too short to interpolate.
///
/// ```rust
/// # use galtools_utils::interp;
/// assert_eq!(interp(1.5, &[1.0, 2.0], &[10.0, 20.0]), 15.0);
/// assert_eq!(interp(5.0, &[1.0, 2.0], &[10.0, 20.0]), 20.0);
/// ```
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    match Interp1d::new(xp.to_vec(), fp.to_vec(), Bounds::Clamp) {
        Ok(curve) => curve.eval(x).unwrap_or(f64::NAN),
        Err(_) => f64::NAN,
    }
}

/// Multilinear interpolation on a rectilinear grid
///
/// The equivalent of `scipy.interpolate.interpn` with the linear method.
/// Axes of length one are allowed and contribute a single plane.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularGrid {
    axes: Vec<Vec<f64>>,
    values: ArrayD<f64>,
    bounds: Bounds,
}

impl RegularGrid {
    /// Build a new grid, where `values` has one dimension per axis
    pub fn new(axes: Vec<Vec<f64>>, values: ArrayD<f64>, bounds: Bounds) -> Result<Self> {
        let expected = axes.iter().map(Vec::len).collect::<Vec<_>>();
        if expected != values.shape() {
            return Err(Error::ShapeMismatch {
                expected,
                found: values.shape().to_vec(),
            });
        }
        for axis in &axes {
            if axis.is_empty() {
                return Err(Error::SliceContainsNoValues);
            }
            if !axis.is_ascending() {
                return Err(Error::SliceNotAscending);
            }
        }
        Ok(Self {
            axes,
            values,
            bounds,
        })
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    /// Grid axes
    pub fn axes(&self) -> &[Vec<f64>] {
        &self.axes
    }

    /// Swap the out of bounds policy
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Interpolate at a single point
    pub fn interpolate(&self, point: &[f64]) -> Result<f64> {
        if point.len() != self.ndim() {
            return Err(Error::LengthMismatch {
                expected: self.ndim(),
                found: point.len(),
            });
        }

        // lower corner and fractional offset along every axis
        let mut cell = Vec::with_capacity(self.ndim());
        for (axis, &value) in self.axes.iter().zip(point) {
            match self.locate(axis, value)? {
                Some(location) => cell.push(location),
                None => return Ok(self.fill_value()),
            }
        }

        // accumulate the 2^d corners of the cell
        let mut total = 0.0;
        let mut index = vec![0; self.ndim()];
        for corner in 0..(1_usize << self.ndim()) {
            let mut weight = 1.0;
            for (d, &(i, t)) in cell.iter().enumerate() {
                let upper = corner >> d & 1 == 1;
                if upper && self.axes[d].len() == 1 {
                    weight = 0.0;
                    break;
                }
                index[d] = if upper { i + 1 } else { i };
                weight *= if upper { t } else { 1.0 - t };
            }
            if weight != 0.0 {
                total += weight * self.values[IxDyn(&index)];
            }
        }
        Ok(total)
    }

    /// Interpolate at many points, one point per row
    pub fn interpolate_points(&self, points: ArrayView2<f64>) -> Result<Vec<f64>> {
        points
            .rows()
            .into_iter()
            .map(|row| self.interpolate(&row.to_vec()))
            .collect()
    }

    /// Cell index and offset along one axis, `None` to request the fill value
    fn locate(&self, axis: &[f64], value: f64) -> Result<Option<(usize, f64)>> {
        let n = axis.len();
        if n == 1 {
            return Ok(Some((0, 0.0)));
        }

        let (lo, hi) = (axis[0], axis[n - 1]);
        let outside = value < lo || value > hi;
        if outside {
            match self.bounds {
                Bounds::Error => {
                    return Err(Error::ValueOutsideOfBounds {
                        value,
                        lower_bound: lo,
                        upper_bound: hi,
                    })
                }
                Bounds::Fill(_) => return Ok(None),
                _ => (),
            }
        }

        let i = axis
            .partition_point(|k| *k <= value)
            .saturating_sub(1)
            .min(n - 2);
        let mut t = (value - axis[i]) / (axis[i + 1] - axis[i]);
        if self.bounds == Bounds::Clamp {
            t = t.clamp(0.0, 1.0);
        }
        Ok(Some((i, t)))
    }

    fn fill_value(&self) -> f64 {
        match self.bounds {
            Bounds::Fill(v) => v,
            _ => f64::NAN,
        }
    }
}
