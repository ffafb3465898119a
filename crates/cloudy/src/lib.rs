//! CLOUDY emission line tables
//!
//! The [CloudyTable] holds luminosities of HII region emission lines as a
//! function of five properties of the ionising source and gas, see
//! [INTERPOLANTS]. Lookups are linear in the log10 of every property, and
//! take log10 values.
//!
//! ```rust
//! # use galtools_cloudy::{CloudyTable, INTERPOLANTS};
//! # use galtools_data::{Attribute, Attributes, CloudySettings, MemoryStore};
//! # use ndarray::{arr1, ArrayD, IxDyn};
//! let mut store = MemoryStore::new();
//! for name in INTERPOLANTS {
//!     store = store.with_array(name, arr1(&[1.0, 100.0]).into_dyn());
//! }
//! let store = store
//!     .with_array("lines/oxygenIII5008", ArrayD::from_elem(IxDyn(&[2; 5]), 1.0e40))
//!     .with_attributes(
//!         "lines/oxygenIII5008",
//!         Attributes::from([("wavelength".to_string(), Attribute::Float(5008.24))]),
//!     );
//!
//! let table = CloudyTable::from_store(Box::new(store), None, &CloudySettings::default()).unwrap();
//! let luminosity = table.interpolate("oxygenIII5008", [1.0; 5]).unwrap();
//!
//! assert_eq!(luminosity, 1.0e40);
//! ```

// Modules
mod error;
mod table;

// Flatten
pub use error::{Error, Result};
pub use table::{CloudyTable, EmissionLine, INTERPOLANTS};
