//! Cosmological distances, times and volumes
//!
//! A [Cosmology] is built from a set of [CosmologyParameters], either
//! directly, from one of the published WMAP sets, or from the parameters
//! recorded in a Galacticus output.
//!
//! ```rust
//! # use galtools_cosmology::Cosmology;
//! let wmap7 = Cosmology::wmap(7).unwrap();
//!
//! // distances are tabulated on first use
//! let dl = wmap7.luminosity_distance(0.5);
//! let dm = wmap7.comoving_transverse_distance(0.5);
//! assert!((dl - 1.5 * dm).abs() < 1e-9);
//! ```
//!
//! Values produced with one Hubble parameter may be converted to another
//! with [adjust_hubble].

// Modules
mod cosmology;
mod error;
mod hubble;

// Flatten
pub use cosmology::{Cosmology, CosmologyParameters};
pub use error::{Error, Result};
pub use hubble::{
    adjust_hubble, mpc_to_cm, redshift_to_wavelength, wavelength_to_redshift, Quantity,
};
