//! Result and Error types for the galaxies module

/// Type alias for `Result<T, galaxies::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `galtools-galaxies`
pub enum Error {
    /// Name is recognised by a property but its qualifiers are malformed
    #[error("invalid property name \"{name}\": {reason}")]
    InvalidName { name: String, reason: String },

    /// No property claims the name and it is not a raw dataset
    #[error("\"{0}\" is neither an output dataset nor a known property")]
    UnknownProperty(String),

    /// More than one property claims the name
    #[error("\"{name}\" is claimed by more than one property: {kinds:?}")]
    AmbiguousName { name: String, kinds: Vec<String> },

    /// Data needed to compute a property is unavailable
    #[error("unable to compute \"{property}\", missing \"{dependency}\"")]
    MissingDependency { property: String, dependency: String },

    /// Galaxy data outside the range a calculation supports
    #[error("{quantity} out of range: {reason}")]
    OutOfRange { quantity: String, reason: String },

    /// Filter has no luminosities in the output
    #[error("filter \"{filter}\" is not available at z={redshift}")]
    FilterNotAvailable { filter: String, redshift: f64 },

    /// Filter has no Vega offset and no Vega spectrum is attached
    #[error("no Vega offset available for filter \"{0}\"")]
    NoVegaOffset(String),

    /// Tables need a datasets repository when they are not injected
    #[error("no datasets repository configured to load the {0}")]
    NoConfig(String),

    /// Property registered twice
    #[error("a property is already registered for {0}")]
    DuplicateRegistration(String),

    /// Output holds no `Outputs/Output<N>` groups
    #[error("no outputs found in the Galacticus file")]
    NoOutputs,

    /// Datasets of one calculation have different lengths
    #[error("dataset \"{name}\" has {found} galaxies, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Wavelength outside a stellar population grid
    #[error("wavelength {wavelength} outside of the population grid [{min}, {max}]")]
    WavelengthOutOfRange { wavelength: f64, min: f64, max: f64 },

    /// Errors from reading datasets and attributes
    #[error(transparent)]
    Data(#[from] galtools_data::Error),

    /// Numerical failures, such as interpolation
    #[error(transparent)]
    Numerical(#[from] galtools_utils::Error),

    /// Errors from the cosmology calculator
    #[error(transparent)]
    Cosmology(#[from] galtools_cosmology::Error),

    /// Errors from filter handling
    #[error(transparent)]
    Filters(#[from] galtools_filters::Error),

    /// Errors from the dust laws and tables
    #[error(transparent)]
    Dust(#[from] galtools_dust::Error),

    /// Errors from the CLOUDY emission line table
    #[error(transparent)]
    Cloudy(#[from] galtools_cloudy::Error),
}
