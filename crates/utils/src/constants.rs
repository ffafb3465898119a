//! Physical constants and unit prefixes in SI
//!
//! Values match those used by Galacticus itself so that derived properties
//! agree with the model outputs to the last digit.

pub use std::f64::consts::PI;

/// Speed of light (m/s)
pub const SPEED_OF_LIGHT: f64 = 2.99792458e8;
/// Planck's constant (J s)
pub const PLANCKS_CONSTANT: f64 = 6.626068e-34;
/// Newtonian gravitational constant (m^3 kg^-1 s^-2)
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67408e-11;
/// Boltzmann's constant (J/K)
pub const BOLTZMANNS_CONSTANT: f64 = 1.3806503e-23;

/// Megaparsec (m)
pub const MEGA_PARSEC: f64 = 3.08567758e22;
/// Parsec (m)
pub const PARSEC: f64 = 3.08567758e16;
/// Angstrom (m)
pub const ANGSTROM: f64 = 1.0e-10;
/// Micron (m)
pub const MICRON: f64 = 1.0e-6;

/// Atomic mass unit (kg)
pub const MASS_ATOMIC: f64 = 1.66053892e-27;
/// Atomic mass of hydrogen (amu)
pub const ATOMIC_MASS_HYDROGEN: f64 = 1.00794;
/// Primordial hydrogen mass fraction
pub const MASS_FRACTION_HYDROGEN: f64 = 0.707;
/// Solar mass (kg)
pub const MASS_SOLAR: f64 = 1.9891e30;
/// Solar metallicity
pub const METALLICITY_SOLAR: f64 = 0.0188;
/// Solar luminosity (W)
pub const LUMINOSITY_SOLAR: f64 = 3.839e26;
/// AB magnitude zero point luminosity (W/Hz)
pub const LUMINOSITY_AB: f64 = 4.4659201576470211e13;

/// Erg (J)
pub const ERG: f64 = 1.0e-7;
/// Jansky (W/m^2/Hz, in cgs erg/s/cm^2/Hz)
pub const JANSKY: f64 = 1.0e-23;

/// Gigayear (s), Julian
pub const GIGA_YEAR: f64 = 3.1556926e16;
/// A 365 day year (s)
pub const YEAR: f64 = 3.1536e7;

pub const MICRO: f64 = 1.0e-6;
pub const MILLI: f64 = 1.0e-3;
pub const CENTI: f64 = 1.0e-2;
pub const KILO: f64 = 1.0e3;
pub const MEGA: f64 = 1.0e6;
pub const GIGA: f64 = 1.0e9;
