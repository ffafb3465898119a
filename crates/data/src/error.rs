//! Result and Error types for the data module

/// Type alias for `Result<T, data::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `galtools-data`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    Io(#[from] std::io::Error),

    /// Failure to (de)serialise a JSON document
    #[error("failed serde JSON operation")]
    Json(#[from] serde_json::Error),

    /// Failure to serialize/deserialize a byte stream
    #[error("failed binary (de)serialization")]
    FailedBinaryOp(#[from] Box<bincode::ErrorKind>),

    /// Invalid wildcard pattern for a file search
    #[error("invalid search pattern \"{0}\"")]
    Pattern(#[from] glob::PatternError),

    /// Required environment variable is not set
    #[error("environment variable {0} is not set")]
    MissingEnvironment(String),

    /// Datasets repository or one of its sub-directories is missing
    #[error("datasets path \"{0}\" does not exist")]
    MissingDirectory(String),

    /// No files in the datasets repository match a pattern
    #[error("no files found matching \"{pattern}\" in {path}")]
    FileNotFound { pattern: String, path: String },

    /// Array is not present in the store
    #[error("dataset \"{0}\" not found")]
    DatasetNotFound(String),

    /// Group is not present in the store
    #[error("group \"{0}\" not found")]
    GroupNotFound(String),

    /// Attribute is not present on a group or dataset
    #[error("attribute \"{name}\" not found on \"{path}\"")]
    AttributeNotFound { name: String, path: String },

    /// Attribute exists but holds the wrong kind of value
    #[error("attribute \"{name}\" is not {expected}")]
    AttributeType { name: String, expected: String },

    /// Array data has an unexpected number of dimensions
    #[error("dataset \"{name}\" has {found} dimensions, expected {expected}")]
    Dimensions {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Invalid value in the settings
    #[error("invalid setting {section}/{key}: {reason}")]
    InvalidSetting {
        section: String,
        key: String,
        reason: String,
    },
}
