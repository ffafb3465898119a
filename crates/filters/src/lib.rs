//! Filter transmission curves and photometric systems
//!
//! A [Filter] is a tabulated transmission curve with its effective
//! wavelength and, optionally, the offset between AB and Vega magnitudes.
//! Filters are usually obtained by name through a [FilterLibrary], which
//! reads them from the datasets repository or builds [TopHat] filters
//! from names like `adaptiveResolutionTopHat_5000_100`.
//!
//! ```rust
//! # use galtools_filters::FilterLibrary;
//! let library = FilterLibrary::new();
//! let top_hat = library.load("fixedResolutionTopHat_6563_1000").unwrap();
//!
//! let (lo, hi) = top_hat.wavelength_range().unwrap();
//! assert!(lo < 6563.0 && hi > 6563.0);
//! ```
//!
//! Vega offsets need the A0V spectrum, see [Vega].

// Modules
mod error;
mod filter;
mod library;
mod tophat;
mod vega;

// Flatten
pub use error::{Error, Result};
pub use filter::{effective_wavelength, Filter};
pub use library::FilterLibrary;
pub use tophat::{top_hat_transmission, TopHat, TOP_HAT_BUFFER, TOP_HAT_SIZE};
pub use vega::{Fluxes, Vega};
