//! Conversion between the AB and Vega magnitude systems

// crate modules
use crate::error::Result;
use crate::filter::Filter;

// galtools crates
use galtools_data::Config;
use galtools_utils::{linspace, romb, Bounds, Interp1d};

// external crates
use log::debug;
use serde::Deserialize;

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;

/// Romberg order, integrals use `2^k + 1` samples
const ROMBERG_ORDER: u32 = 8;

/// Fluxes of a reference spectrum through a filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fluxes {
    /// Integral of `T(λ) / λ^2`, a flat AB spectrum
    pub ab: f64,
    /// Integral of `T(λ) F(λ)` for the Vega spectrum
    pub vega: f64,
}

/// The Vega (A0V) reference spectrum and V band
///
/// Offsets are normalised so that Vega has the same magnitude in both
/// systems in the V band.
///
/// ```rust
/// # use galtools_filters::{Filter, Vega};
/// let v_band = Filter::new("V", vec![5000.0, 5500.0, 6000.0], vec![0.5, 1.0, 0.5]).unwrap();
/// let vega = Vega::new(vec![1000.0, 10000.0], vec![1.0, 1.0], v_band.clone()).unwrap();
///
/// assert!(vega.ab_vega_offset(&v_band).unwrap().abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct Vega {
    spectrum: Interp1d,
    v_band: Filter,
    v_fluxes: OnceLock<Fluxes>,
}

/// On-disk layout of a spectrum
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpectrumFile {
    wavelength: Vec<f64>,
    flux: Vec<f64>,
}

impl Vega {
    /// Reference spectrum sampled at `wavelength` Angstroms
    pub fn new(wavelength: Vec<f64>, flux: Vec<f64>, v_band: Filter) -> Result<Self> {
        Ok(Self {
            spectrum: Interp1d::new(wavelength, flux, Bounds::Error)?,
            v_band,
            v_fluxes: OnceLock::new(),
        })
    }

    /// Read the spectrum and V band from JSON documents
    pub fn read_files<P: AsRef<Path>>(spectrum: P, v_band: P) -> Result<Self> {
        debug!("Reading Vega spectrum from {}", spectrum.as_ref().display());
        let reader = BufReader::new(File::open(spectrum.as_ref())?);
        let file: SpectrumFile = serde_json::from_reader(reader)?;
        Self::new(file.wavelength, file.flux, Filter::read_file(v_band)?)
    }

    /// Locate the files named in the filter settings
    pub fn from_config(config: &Config) -> Result<Self> {
        let spectrum = config.locate(&config.settings.filters.vega_spectrum_file)?;
        let v_band = config.locate(&config.settings.filters.v_band_filter_file)?;
        Self::read_files(spectrum, v_band)
    }

    /// Band used for normalisation
    pub fn v_band(&self) -> &Filter {
        &self.v_band
    }

    /// Fluxes through an arbitrary transmission curve
    ///
    /// The curve is resampled on `2^8 + 1` points spanning its tabulated
    /// range, which must be covered by the spectrum.
    pub fn fluxes(&self, filter: &Filter) -> Result<Fluxes> {
        let wavelength = filter.wavelength();
        let (lo, hi) = (wavelength[0], wavelength[wavelength.len() - 1]);

        let samples = linspace(lo, hi, 2_usize.pow(ROMBERG_ORDER) + 1);
        let dx = samples[1] - samples[0];

        let transmission = samples
            .iter()
            .map(|w| filter.transmission_at(*w))
            .collect::<Vec<_>>();
        let flux = self.spectrum.eval_many(&samples)?;

        let filtered = transmission
            .iter()
            .zip(&flux)
            .map(|(t, f)| t * f)
            .collect::<Vec<_>>();
        let filtered_ab = transmission
            .iter()
            .zip(&samples)
            .map(|(t, w)| t / w.powi(2))
            .collect::<Vec<_>>();

        Ok(Fluxes {
            ab: romb(&filtered_ab, dx)?,
            vega: romb(&filtered, dx)?,
        })
    }

    /// Magnitude offset to convert AB magnitudes to Vega magnitudes
    ///
    /// `2.5 log10(F_vega V_ab / (V_vega F_ab))`
    pub fn ab_vega_offset(&self, filter: &Filter) -> Result<f64> {
        let v = self.v_fluxes()?;
        let band = self.fluxes(filter)?;
        Ok(2.5 * (band.vega * v.ab / v.vega / band.ab).log10())
    }

    /// Fluxes through the V band, computed once
    fn v_fluxes(&self) -> Result<Fluxes> {
        if let Some(fluxes) = self.v_fluxes.get() {
            return Ok(*fluxes);
        }
        let fluxes = self.fluxes(&self.v_band)?;
        Ok(*self.v_fluxes.get_or_init(|| fluxes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tophat::TopHat;
    use approx::assert_relative_eq;

    fn v_band() -> Filter {
        TopHat::Adaptive { center: 5500.0, width: 800.0 }
            .filter("V")
            .unwrap()
    }

    #[test]
    fn ab_spectrum_has_no_offset() {
        // a Vega spectrum proportional to 1/λ^2 is flat in f_ν, tabulated
        // every Angstrom so linear interpolation of the curve stays exact
        // to well below the tolerance
        let wavelength = linspace(1000.0, 20000.0, 19001);
        let flux = wavelength.iter().map(|w| 3.0 / w.powi(2)).collect();
        let vega = Vega::new(wavelength, flux, v_band()).unwrap();

        let blue = TopHat::Adaptive { center: 3000.0, width: 500.0 }
            .filter("blue")
            .unwrap();
        assert_relative_eq!(vega.ab_vega_offset(&blue).unwrap(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn redder_spectrum_is_fainter_in_blue() {
        // flat in f_λ, so relatively more flux at long wavelengths in f_ν
        let wavelength = linspace(1000.0, 20000.0, 2000);
        let flux = vec![1.0; 2000];
        let vega = Vega::new(wavelength, flux, v_band()).unwrap();

        let blue = TopHat::Adaptive { center: 3000.0, width: 500.0 }
            .filter("blue")
            .unwrap();
        let red = TopHat::Adaptive { center: 9000.0, width: 500.0 }
            .filter("red")
            .unwrap();
        assert!(vega.ab_vega_offset(&blue).unwrap() < 0.0);
        assert!(vega.ab_vega_offset(&red).unwrap() > 0.0);
    }

    #[test]
    fn spectrum_must_cover_filter() {
        let vega = Vega::new(vec![5000.0, 6000.0], vec![1.0, 1.0], v_band()).unwrap();
        let blue = TopHat::Adaptive { center: 3000.0, width: 500.0 }
            .filter("blue")
            .unwrap();
        assert!(vega.ab_vega_offset(&blue).is_err());
    }
}
