//! Result and Error types for the filters module

/// Type alias for `Result<T, filters::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `galtools-filters`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    Io(#[from] std::io::Error),

    /// Failure to (de)serialise a JSON document
    #[error("failed serde JSON operation")]
    Json(#[from] serde_json::Error),

    /// Invalid wavelength grids or out of range lookups
    #[error("numerical failure: {0}")]
    Numerical(#[from] galtools_utils::Error),

    /// Search paths and settings
    #[error(transparent)]
    Data(#[from] galtools_data::Error),

    /// Transmission that is zero everywhere
    #[error("filter \"{0}\" has no transmission")]
    EmptyTransmission(String),

    /// Name does not describe a top hat
    #[error("unable to parse top hat \"{0}\", expected adaptiveResolutionTopHat_<center>_<width> or fixedResolutionTopHat_<center>_<resolution>")]
    InvalidTopHat(String),

    /// Loading files requires a datasets repository
    #[error("no datasets repository configured to load filter \"{0}\"")]
    NoConfig(String),
}
