//! Result and Error types for the utils module

/// Type alias for `Result<T, utils::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, PartialEq)]
/// The error type for `galtools_utils`
pub enum Error {
    /// An empty slice of floats for SliceExt
    SliceContainsNoValues,

    /// The slice of float values contains things like NAN or INFINITY
    SliceContainsUndefinedValues,

    /// Knots of an interpolant must be strictly increasing
    SliceNotAscending,

    /// Value that is searched for outside of the min/max of the array
    ValueOutsideOfBounds {
        value: f64,
        lower_bound: f64,
        upper_bound: f64,
    },

    /// For when a slice has fewer than the minimum required values
    BelowMinimumSliceLength {
        length: usize,
        minimum_required: usize,
    },

    /// Paired arrays that should have matching lengths
    LengthMismatch { expected: usize, found: usize },

    /// Grid values do not have the shape implied by the axes
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Romberg sampling needs 2^k + 1 equally spaced points
    InvalidSampleCount { found: usize },

    /// Step sizes for ranges must be non-zero and finite
    InvalidStep { step: f64 },
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::SliceContainsNoValues => write!(f, "slice contains no values"),
            Self::SliceContainsUndefinedValues => write!(f, "slice contains NaN or infinite values"),
            Self::SliceNotAscending => write!(f, "knots are not strictly increasing"),
            Self::ValueOutsideOfBounds {
                value,
                lower_bound,
                upper_bound,
            } => write!(f, "{value} is outside of [{lower_bound}, {upper_bound}]"),
            Self::BelowMinimumSliceLength {
                length,
                minimum_required,
            } => write!(f, "{length} values given, at least {minimum_required} required"),
            Self::LengthMismatch { expected, found } => {
                write!(f, "expected {expected} values, found {found}")
            }
            Self::ShapeMismatch { expected, found } => {
                write!(f, "grid has shape {found:?}, axes imply {expected:?}")
            }
            Self::InvalidSampleCount { found } => {
                write!(f, "{found} samples given, Romberg needs 2^k + 1")
            }
            Self::InvalidStep { step } => write!(f, "step of {step} is not usable"),
        }
    }
}

impl std::error::Error for Error {}
