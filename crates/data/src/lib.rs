//! Datasets, array stores and configuration
//!
//! Everything that reads or writes data goes through this crate:
//!
//! - [Dataset] is the value returned by every property calculation
//! - [DataStore] is the interface to hierarchical output and table files
//! - [Config] finds files in the Galacticus datasets repository
//! - [Settings] holds the tunable parameters of the calculations
//!
//! ```rust
//! # use galtools_data::{DataStore, MemoryStore};
//! # use ndarray::arr1;
//! let mut store = MemoryStore::new();
//! store.write_array("Outputs/Output1/nodeData/diskMassStellar", arr1(&[1.0e10]).into_dyn()).unwrap();
//!
//! assert_eq!(store.list("Outputs"), vec!["Output1"]);
//! ```

// Modules
mod config;
mod dataset;
mod error;
mod settings;
mod store;

// Flatten
pub use config::{
    search_directory, Config, DATA_PATH_VARIABLE, DYNAMIC_PATH_VARIABLE, EXEC_PATH_VARIABLE,
};
pub use dataset::{float_attribute, Attribute, Attributes, Dataset};
pub use error::{Error, Result};
pub use settings::{
    CharlotFallSettings, CloudySettings, DensityMethod, DustCompendiumSettings,
    DustOpticalDepthSettings, EmissionLineSettings, FilterSettings, HydrogenGasDensitySettings,
    InclinationSettings, MagnitudeSettings, ScreenSettings, Settings, VelocityDispersionSettings,
    ZeroCorrection, SETTINGS_VARIABLE,
};
pub use store::{join, normalise, DataStore, MemoryStore};
