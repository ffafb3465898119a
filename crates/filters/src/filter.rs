//! Filter transmission curves

// crate modules
use crate::error::{Error, Result};

// galtools crates
use galtools_utils::constants::{ANGSTROM, LUMINOSITY_AB, SPEED_OF_LIGHT};
use galtools_utils::{linspace, romb, Bounds, Interp1d};

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

// standard library
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// A filter transmission curve
///
/// Wavelengths are in Angstroms and must be strictly ascending. Outside of
/// the tabulated range the transmission is zero.
///
/// ```rust
/// # use galtools_filters::Filter;
/// let filter = Filter::new("box", vec![1000.0, 2000.0, 3000.0], vec![0.0, 1.0, 1.0]).unwrap();
///
/// assert_eq!(filter.effective_wavelength, 2500.0);
/// assert_eq!(filter.transmission_at(1500.0), 0.5);
/// assert_eq!(filter.transmission_at(4000.0), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FilterFile", into = "FilterFile")]
pub struct Filter {
    /// Unique name of the filter
    pub name: String,
    curve: Interp1d,
    /// Transmission weighted mean wavelength
    pub effective_wavelength: f64,
    /// AB - Vega magnitude offset
    pub vega_offset: Option<f64>,
    /// Free text description
    pub description: Option<String>,
    /// Where the curve came from
    pub origin: Option<String>,
    /// Reference for the curve
    pub url: Option<String>,
}

impl Filter {
    /// A new filter, with the effective wavelength computed from the curve
    pub fn new(name: &str, wavelength: Vec<f64>, transmission: Vec<f64>) -> Result<Self> {
        let curve = Interp1d::new(wavelength, transmission, Bounds::Fill(0.0))?;
        let effective_wavelength = effective_wavelength(curve.x(), curve.y())
            .ok_or_else(|| Error::EmptyTransmission(name.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            curve,
            effective_wavelength,
            vega_offset: None,
            description: None,
            origin: None,
            url: None,
        })
    }

    /// Read a filter from a JSON document
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Reading filter from {}", path.as_ref().display());
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write the filter to `<directory>/<name>.json`
    pub fn write_file<P: AsRef<Path>>(&self, directory: P) -> Result<PathBuf> {
        std::fs::create_dir_all(directory.as_ref())?;
        let path = directory.as_ref().join(format!("{}.json", self.name));
        debug!("Writing filter to {}", path.display());
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(path)
    }

    /// Tabulated wavelengths
    pub fn wavelength(&self) -> &[f64] {
        self.curve.x()
    }

    /// Tabulated transmission
    pub fn transmission(&self) -> &[f64] {
        self.curve.y()
    }

    /// Linear interpolation of the transmission, zero outside the curve
    pub fn transmission_at(&self, wavelength: f64) -> f64 {
        self.curve.eval(wavelength).unwrap_or(0.0)
    }

    /// Smallest and largest wavelengths with non-zero transmission
    pub fn wavelength_range(&self) -> Option<(f64, f64)> {
        let mut passing = self
            .wavelength()
            .iter()
            .zip(self.transmission())
            .filter(|(_, t)| **t > 0.0)
            .map(|(w, _)| *w);

        let first = passing.next()?;
        let last = passing.last().unwrap_or(first);
        Some((first, last))
    }

    /// Power in Watts of a flat AB source seen through the filter
    ///
    /// `L_AB ∫ T(ν) dν`, integrated with Romberg's method on `2^k + 1`
    /// samples spanning the tabulated curve.
    ///
    /// ```rust
    /// # use galtools_filters::Filter;
    /// let filter = Filter::new("box", vec![1000.0, 2000.0], vec![1.0, 1.0]).unwrap();
    /// let narrow = Filter::new("narrow", vec![1000.0, 1500.0], vec![1.0, 1.0]).unwrap();
    ///
    /// assert!(filter.luminosity_ab(10).unwrap() > narrow.luminosity_ab(10).unwrap());
    /// ```
    pub fn luminosity_ab(&self, k: u32) -> Result<f64> {
        let wavelength = self.wavelength();
        let (lo, hi) = (wavelength[0], wavelength[wavelength.len() - 1]);
        let samples = linspace(lo, hi, 2_usize.pow(k) + 1);
        let dx = samples[1] - samples[0];

        // dν = c dλ / λ^2 with c in Angstroms per second
        let c = SPEED_OF_LIGHT / ANGSTROM;
        let integrand = samples
            .iter()
            .map(|w| self.transmission_at(*w) * c / w.powi(2))
            .collect::<Vec<_>>();
        Ok(LUMINOSITY_AB * romb(&integrand, dx)?)
    }

    /// Recompute the effective wavelength from the curve
    pub fn reset_effective_wavelength(&mut self) -> Result<()> {
        self.effective_wavelength = effective_wavelength(self.wavelength(), self.transmission())
            .ok_or_else(|| Error::EmptyTransmission(self.name.clone()))?;
        Ok(())
    }

    pub fn with_vega_offset(mut self, offset: f64) -> Self {
        self.vega_offset = Some(offset);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }
}

/// Transmission weighted mean, `None` if the transmission sums to zero
///
/// ```rust
/// # use galtools_filters::effective_wavelength;
/// assert_eq!(effective_wavelength(&[1.0, 3.0], &[1.0, 1.0]), Some(2.0));
/// assert_eq!(effective_wavelength(&[1.0, 3.0], &[0.0, 0.0]), None);
/// ```
pub fn effective_wavelength(wavelength: &[f64], transmission: &[f64]) -> Option<f64> {
    let total: f64 = transmission.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return None;
    }
    let weighted: f64 = wavelength.iter().zip(transmission).map(|(w, t)| w * t).sum();
    Some(weighted / total)
}

/// On-disk layout of a filter, where derived values are optional
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterFile {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    wavelength: Vec<f64>,
    transmission: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    effective_wavelength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vega_offset: Option<f64>,
}

impl TryFrom<FilterFile> for Filter {
    type Error = Error;

    fn try_from(file: FilterFile) -> Result<Self> {
        let mut filter = Filter::new(&file.name, file.wavelength, file.transmission)?;
        if let Some(effective) = file.effective_wavelength {
            filter.effective_wavelength = effective;
        }
        filter.vega_offset = file.vega_offset;
        filter.description = file.description;
        filter.origin = file.origin;
        filter.url = file.url;
        Ok(filter)
    }
}

impl From<Filter> for FilterFile {
    fn from(filter: Filter) -> Self {
        Self {
            wavelength: filter.wavelength().to_vec(),
            transmission: filter.transmission().to_vec(),
            name: filter.name,
            description: filter.description,
            origin: filter.origin,
            url: filter.url,
            effective_wavelength: Some(filter.effective_wavelength),
            vega_offset: filter.vega_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_lengths() {
        let result = Filter::new("bad", vec![1.0, 2.0, 3.0], vec![1.0, 1.0]);
        assert!(matches!(result, Err(Error::Numerical(_))));
    }

    #[test]
    fn zero_transmission() {
        let result = Filter::new("dark", vec![1.0, 2.0], vec![0.0, 0.0]);
        assert!(matches!(result, Err(Error::EmptyTransmission(_))));
    }

    #[test]
    fn passing_range() {
        let filter = Filter::new(
            "r",
            vec![5000.0, 5500.0, 6000.0, 6500.0, 7000.0],
            vec![0.0, 0.2, 0.9, 0.3, 0.0],
        )
        .unwrap();
        assert_eq!(filter.wavelength_range(), Some((5500.0, 6500.0)));
    }

    #[test]
    fn stored_effective_wavelength_is_kept() {
        let json = r#"{
            "name": "U",
            "wavelength": [3000.0, 3500.0, 4000.0],
            "transmission": [0.5, 1.0, 0.5],
            "effectiveWavelength": 3600.0
        }"#;
        let filter: Filter = serde_json::from_str(json).unwrap();
        assert_eq!(filter.effective_wavelength, 3600.0);
        assert_eq!(filter.vega_offset, None);

        let json = r#"{ "name": "U", "wavelength": [3000.0, 4000.0], "transmission": [1.0, 1.0] }"#;
        let filter: Filter = serde_json::from_str(json).unwrap();
        assert_eq!(filter.effective_wavelength, 3500.0);
    }
}
