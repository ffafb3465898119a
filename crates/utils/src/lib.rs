//! Common numerical utilities shared by the galtools crates
//!
//! These are left public for convenience.
//!
//! Nearly every derived galaxy property ends up interpolating a table or
//! integrating a curve, so the building blocks live here:
//!
//! - [Interp1d] and [RegularGrid] for linear interpolation
//! - [romberg] and [romb] for quadrature
//! - [constants] for the physical constants used throughout
//!
//! ```rust
//! # use galtools_utils::{Bounds, Interp1d, constants::SPEED_OF_LIGHT};
//! let curve = Interp1d::new(vec![0.0, 1.0], vec![0.0, SPEED_OF_LIGHT], Bounds::Error).unwrap();
//! assert_eq!(curve.eval(0.5).unwrap(), 0.5 * SPEED_OF_LIGHT);
//! ```

// Alias for the format! macro
pub use std::format as f;

// Modules
pub mod constants;
mod error;
mod integrate;
mod interpolate;
mod slice_ext;
mod value_ext;

// Flatten
pub use error::{Error, Result};
pub use integrate::{arange, linspace, romb, romberg};
pub use interpolate::{interp, Bounds, Interp1d, RegularGrid};
pub use slice_ext::SliceExt;
pub use value_ext::ValueExt;
