//! Raw and derived galaxy properties from Galacticus outputs
//!
//! A [GalacticusOutput] wraps the datasets of one model run. [Galaxies]
//! reads properties from it by name, computing any name the output does
//! not hold from those it does: totals over components, metallicities,
//! emission lines, magnitudes, dust attenuation and spectral energy
//! distributions.
//!
//! ```rust
//! # use galtools_data::{Attribute, Attributes, MemoryStore, Settings};
//! # use galtools_galaxies::{GalacticusOutput, Galaxies, Kind, PropertyName};
//! # use ndarray::arr1;
//! let store = MemoryStore::new()
//!     .with_array("Outputs/Output1/nodeData/diskMassGas", arr1(&[1.0e9, 0.0]).into_dyn())
//!     .with_array("Outputs/Output1/nodeData/diskAbundancesGasMetals", arr1(&[2.0e7, 0.0]).into_dyn())
//!     .with_attributes(
//!         "Outputs/Output1",
//!         Attributes::from([("outputExpansionFactor".to_string(), Attribute::Float(0.5))]),
//!     );
//! let galaxies = Galaxies::new(GalacticusOutput::new(Box::new(store)).unwrap(), Settings::default());
//!
//! // names are parsed into the property that computes them
//! let name = PropertyName::parse("diskGasMetallicity").unwrap();
//! assert_eq!(name.kind(), Kind::PhaseMetallicity);
//!
//! // the output nearest the requested redshift is used
//! let metallicity = galaxies.retrieve("diskGasMetallicity", 0.9).unwrap();
//! assert_eq!(metallicity.len(), 2);
//! ```

// Modules
mod error;
mod galaxies;
mod name;
mod output;
mod properties;
mod registry;
mod stellar;

// Flatten
pub use error::{Error, Result};
pub use galaxies::Galaxies;
pub use name::{
    CharlotFallDepth, Component, DustModel, DustParameter, Frame, Kind, Line, Luminosity,
    Magnitude, MagnitudeSystem, Modifier, Modifiers, Number, Phase, PropertyName, Region, Sed,
    Source, Species, Width,
};
pub use output::{GalacticusOutput, Output};
pub use properties::random_inclinations;
pub use registry::{Property, Registry, RegistryBuilder};
pub use stellar::StellarPopulation;
