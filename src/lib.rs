//! `galtools` is a modular toolkit for post-processing the galaxy outputs
//! of the Galacticus semi-analytic model
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use galtools_data as data;

#[doc(inline)]
pub use galtools_utils as utils;

#[cfg(feature = "cloudy")]
#[cfg_attr(docsrs, doc(cfg(feature = "cloudy")))]
#[doc(inline)]
pub use galtools_cloudy as cloudy;

#[cfg(feature = "cosmology")]
#[cfg_attr(docsrs, doc(cfg(feature = "cosmology")))]
#[doc(inline)]
pub use galtools_cosmology as cosmology;

#[cfg(feature = "dust")]
#[cfg_attr(docsrs, doc(cfg(feature = "dust")))]
#[doc(inline)]
pub use galtools_dust as dust;

#[cfg(feature = "filters")]
#[cfg_attr(docsrs, doc(cfg(feature = "filters")))]
#[doc(inline)]
pub use galtools_filters as filters;

#[cfg(feature = "galaxies")]
#[cfg_attr(docsrs, doc(cfg(feature = "galaxies")))]
#[doc(inline)]
pub use galtools_galaxies as galaxies;

#[cfg(feature = "simulations")]
#[cfg_attr(docsrs, doc(cfg(feature = "simulations")))]
#[doc(inline)]
pub use galtools_simulations as simulations;
