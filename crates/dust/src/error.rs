//! Result and Error types for the dust module

// galtools crates
use galtools_utils::ValueExt;

/// Type alias for `Result<T, dust::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `galtools-dust`
pub enum Error {
    /// Invalid tables or lookups outside of them
    #[error("numerical failure: {0}")]
    Numerical(#[from] galtools_utils::Error),

    /// Missing tables or attributes
    #[error(transparent)]
    Data(#[from] galtools_data::Error),

    /// Screen law names that are available
    #[error("screen law \"{0}\" not recognised, available are Calzetti, Allen, Prevot, Fitzpatrick, Seaton")]
    UnknownScreenLaw(String),

    /// Galaxy values outside of the range covered by a table
    #[error(
        "galaxies with {quantity} {} present, must be within [{}, {}]",
        .value.sci(3, 2),
        .lower.sci(3, 2),
        .upper.sci(3, 2)
    )]
    OutOfRange {
        quantity: &'static str,
        value: f64,
        lower: f64,
        upper: f64,
    },

    /// Wrong number of interpolant columns for a component
    #[error("{component} attenuation needs {expected} interpolants, found {found}")]
    InterpolantCount {
        component: &'static str,
        expected: usize,
        found: usize,
    },

    /// Interpolant columns of different lengths
    #[error("interpolant columns must have {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}
