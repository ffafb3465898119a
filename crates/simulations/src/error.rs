//! Result and Error types for the simulations module

/// Type alias for `Result<T, simulations::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `galtools-simulations`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    Io(#[from] std::io::Error),

    /// Failure to (de)serialise a JSON document
    #[error("failed serde JSON operation")]
    Json(#[from] serde_json::Error),

    /// Search paths and settings
    #[error(transparent)]
    Data(#[from] galtools_data::Error),

    /// No specification with this name in the datasets repository
    #[error("unable to locate simulation \"{name}\", available are: {}", available.join(", "))]
    SimulationNotFound {
        name: String,
        available: Vec<String>,
    },

    /// Snapshot tables must have at least one entry
    #[error("simulation \"{0}\" has no snapshots")]
    NoSnapshots(String),
}
