//! Tunable parameters for the derived property calculations
//!
//! Every field has a default matching the behaviour of the Galacticus
//! python tools. A JSON file pointed to by `GALACTICUS_PYTHON_CONFIG` may
//! override any subset of them, for example:
//!
//! ```json
//! {
//!     "dustCharlotFall": { "wavelengthExponent": 1.0 },
//!     "cloudy": { "boundsError": true }
//! }
//! ```

// crate modules
use crate::error::{Error, Result};

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Environment variable naming an optional settings file
pub const SETTINGS_VARIABLE: &str = "GALACTICUS_PYTHON_CONFIG";

/// All configurable settings, grouped by topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub cloudy: CloudySettings,
    pub dust_compendium: DustCompendiumSettings,
    pub dust_optical_depth: DustOpticalDepthSettings,
    pub dust_charlot_fall: CharlotFallSettings,
    pub hydrogen_gas_density: HydrogenGasDensitySettings,
    pub emission_line: EmissionLineSettings,
    pub velocity_dispersion: VelocityDispersionSettings,
    pub screens: ScreenSettings,
    pub magnitude: MagnitudeSettings,
    pub metals: ZeroCorrection,
    pub spectral_energy_distribution: ZeroCorrection,
    pub inclination: InclinationSettings,
    pub filters: FilterSettings,
}

impl Settings {
    /// Read settings from a JSON file, missing entries take defaults
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let settings: Settings = serde_json::from_reader(reader)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings from the file named by `GALACTICUS_PYTHON_CONFIG`, if set
    pub fn from_env() -> Result<Self> {
        match std::env::var(SETTINGS_VARIABLE) {
            Ok(path) => {
                debug!("Reading settings from {path}");
                Self::read_file(path)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    /// Check values that cannot be expressed in the types
    pub fn validate(&self) -> Result<()> {
        if self.dust_charlot_fall.wavelength_zero_point <= 0.0 {
            return Err(Error::InvalidSetting {
                section: "dustCharlotFall".into(),
                key: "wavelengthZeroPoint".into(),
                reason: "must be positive".into(),
            });
        }
        if self.emission_line.mass_hii_region <= 0.0 {
            return Err(Error::InvalidSetting {
                section: "emissionLine".into(),
                key: "massHIIRegion".into(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}

/// Emission line table lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloudySettings {
    /// Name pattern of the table file in the datasets repository
    pub file_name: String,
    /// Error for points outside of the table
    pub bounds_error: bool,
    /// Value for points outside of the table, `None` extrapolates
    pub fill_value: Option<f64>,
}

impl Default for CloudySettings {
    fn default() -> Self {
        Self {
            file_name: "emissionLines.*".into(),
            bounds_error: false,
            fill_value: None,
        }
    }
}

/// Tabulated radiative transfer attenuations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DustCompendiumSettings {
    pub attenuations_file: String,
    pub extrapolate_optical_depth: bool,
    pub dust_to_metals_ratio: f64,
}

impl Default for DustCompendiumSettings {
    fn default() -> Self {
        Self {
            attenuations_file: "compendiumAttenuations.*".into(),
            extrapolate_optical_depth: true,
            dust_to_metals_ratio: 0.44,
        }
    }
}

/// Central optical depths of discs and spheroids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DustOpticalDepthSettings {
    pub dust_to_metals_ratio: f64,
    #[serde(rename = "localISMMetallicity")]
    pub local_ism_metallicity: f64,
}

impl Default for DustOpticalDepthSettings {
    fn default() -> Self {
        Self {
            dust_to_metals_ratio: 0.44,
            local_ism_metallicity: 0.02,
        }
    }
}

/// Two component birth cloud and ISM attenuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharlotFallSettings {
    pub optical_depth_clouds_factor: f64,
    #[serde(rename = "opticalDepthISMFactor")]
    pub optical_depth_ism_factor: f64,
    pub wavelength_exponent: f64,
    /// Angstroms
    pub wavelength_zero_point: f64,
}

impl Default for CharlotFallSettings {
    fn default() -> Self {
        Self {
            optical_depth_clouds_factor: 1.0,
            optical_depth_ism_factor: 1.0,
            wavelength_exponent: 0.7,
            wavelength_zero_point: 5500.0,
        }
    }
}

/// How to average a surface density profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DensityMethod {
    /// Central surface density, `M / 2 pi r^2`
    #[default]
    Central,
    /// Mass weighted surface density, `M / 8 pi r^2`
    MassWeighted,
}

impl DensityMethod {
    /// Divisor applied to `M / pi r^2`
    pub fn divisor(&self) -> f64 {
        match self {
            Self::Central => 2.0,
            Self::MassWeighted => 8.0,
        }
    }
}

/// Hydrogen densities of giant molecular clouds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HydrogenGasDensitySettings {
    pub density_method: DensityMethod,
    /// Solar masses
    #[serde(rename = "massGMC")]
    pub mass_gmc: f64,
    /// Solar masses per Mpc^2
    pub surface_density_critical: f64,
}

impl Default for HydrogenGasDensitySettings {
    fn default() -> Self {
        Self {
            density_method: DensityMethod::Central,
            mass_gmc: 3.7e7,
            surface_density_critical: 8.5e13,
        }
    }
}

/// HII region properties for line luminosities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmissionLineSettings {
    /// Solar masses
    #[serde(rename = "massHIIRegion")]
    pub mass_hii_region: f64,
    /// Gyr
    #[serde(rename = "lifetimeHIIRegion")]
    pub lifetime_hii_region: f64,
}

impl Default for EmissionLineSettings {
    fn default() -> Self {
        Self {
            mass_hii_region: 7.5e3,
            lifetime_hii_region: 1.0e-3,
        }
    }
}

/// Line widths from galaxy kinematics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VelocityDispersionSettings {
    /// km/s, used for galaxies with no baryons
    pub min_velocity_dispersion: f64,
    /// Ratio of disk height to radius used for the projected velocity
    pub scale_velocity_ratio: f64,
}

impl Default for VelocityDispersionSettings {
    fn default() -> Self {
        Self {
            min_velocity_dispersion: 20.0,
            scale_velocity_ratio: 0.1,
        }
    }
}

/// Total to selective extinction ratio per screen law
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreenSettings {
    pub calzetti: f64,
    pub allen: f64,
    pub prevot: f64,
    pub fitzpatrick: f64,
    pub seaton: f64,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            calzetti: 4.05,
            allen: 3.1,
            prevot: 3.1,
            fitzpatrick: 2.72,
            seaton: 3.1,
        }
    }
}

/// Small offset added before taking logarithms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZeroCorrection {
    pub zero_correction: f64,
}

impl Default for ZeroCorrection {
    fn default() -> Self {
        Self {
            zero_correction: 1.0e-50,
        }
    }
}

/// Magnitudes from luminosities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MagnitudeSettings {
    pub zero_correction: f64,
}

impl Default for MagnitudeSettings {
    fn default() -> Self {
        Self {
            zero_correction: 1.0e-40,
        }
    }
}

/// Random disk inclinations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InclinationSettings {
    pub degrees: bool,
    /// Fixed seed for reproducible inclinations
    pub seed: Option<u64>,
}

impl Default for InclinationSettings {
    fn default() -> Self {
        Self {
            degrees: true,
            seed: None,
        }
    }
}

/// Reference spectra and bands for magnitude systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSettings {
    pub vega_spectrum_file: String,
    #[serde(rename = "vBandFilterFile")]
    pub v_band_filter_file: String,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            vega_spectrum_file: "A0V_Castelli.json".into(),
            v_band_filter_file: "Buser_V.json".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_fill_defaults() {
        let json = r#"{
            "dustCharlotFall": { "wavelengthExponent": 1.0 },
            "hydrogenGasDensity": { "densityMethod": "massWeighted" },
            "screens": { "calzetti": 4.5 }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.dust_charlot_fall.wavelength_exponent, 1.0);
        assert_eq!(settings.dust_charlot_fall.wavelength_zero_point, 5500.0);
        assert_eq!(
            settings.hydrogen_gas_density.density_method,
            DensityMethod::MassWeighted
        );
        assert_eq!(settings.screens.calzetti, 4.5);
        assert_eq!(settings.screens.fitzpatrick, 2.72);
        assert_eq!(settings.cloudy, CloudySettings::default());
    }

    #[test]
    fn legacy_key_spellings() {
        let json = r#"{ "dustOpticalDepth": { "localISMMetallicity": 0.03 } }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.dust_optical_depth.local_ism_metallicity, 0.03);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut settings = Settings::default();
        settings.dust_charlot_fall.wavelength_zero_point = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn density_divisors() {
        assert_eq!(DensityMethod::Central.divisor(), 2.0);
        assert_eq!(DensityMethod::MassWeighted.divisor(), 8.0);
    }
}
