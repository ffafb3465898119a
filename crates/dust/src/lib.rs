//! Dust attenuation of galaxy light
//!
//! Two families of model are provided:
//!
//! - [ScreenLaw] foreground screens, parameterised by `A_V` and `R_V`
//! - the [CompendiumTable] of radiative transfer attenuations for disks and
//!   spheroids
//!
//! ```rust
//! # use galtools_dust::ScreenLaw;
//! let law: ScreenLaw = "Calzetti".parse().unwrap();
//! let screen = law.curve(4.05).unwrap();
//!
//! // one magnitude of extinction in V
//! let transmitted = screen.attenuation(0.55, 1.0);
//! assert!((transmitted - 10f64.powf(-0.4)).abs() < 0.01);
//! ```

// Modules
mod compendium;
mod error;
mod screens;

// Flatten
pub use compendium::{CompendiumTable, Component};
pub use error::{Error, Result};
pub use screens::{ScreenCurve, ScreenLaw};
