//! Result and Error types for the cloudy module

/// Type alias for `Result<T, cloudy::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `galtools-cloudy`
pub enum Error {
    /// Invalid tables or lookups outside of them
    #[error("numerical failure: {0}")]
    Numerical(#[from] galtools_utils::Error),

    /// Missing tables or attributes
    #[error(transparent)]
    Data(#[from] galtools_data::Error),

    /// Line absent from the table
    #[error("emission line \"{0}\" not found in the CLOUDY table")]
    LineNotFound(String),

    /// Galaxy columns of different lengths
    #[error("interpolant columns must have {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}
