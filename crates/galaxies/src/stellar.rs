//! Simple stellar population spectra

// crate modules
use crate::error::{Error, Result};

// galtools crates
use galtools_data::{Attributes, Config, DataStore, MemoryStore};

// external crates
use log::debug;
use ndarray::ArrayD;

/// Spectra of a simple stellar population model
///
/// Spectra are tabulated against wavelength (Angstroms), age and
/// metallicity, in the order the model file stores them.
#[derive(Debug, Clone)]
pub struct StellarPopulation {
    /// Model file the population was read from, if any
    pub file: Option<String>,
    /// Descriptive attributes such as the model reference and IMF
    pub information: Attributes,
    pub wavelengths: Vec<f64>,
    pub metallicities: Vec<f64>,
    pub ages: Vec<f64>,
    pub spectra: ArrayD<f64>,
}

impl StellarPopulation {
    /// Population from its grids, wavelengths must be increasing
    pub fn new(
        wavelengths: Vec<f64>,
        metallicities: Vec<f64>,
        ages: Vec<f64>,
        spectra: ArrayD<f64>,
    ) -> Self {
        Self {
            file: None,
            information: Attributes::new(),
            wavelengths,
            metallicities,
            ages,
            spectra,
        }
    }

    /// Read the grids from the root of an array store
    pub fn from_store(store: &dyn DataStore) -> Result<Self> {
        let axis = |name: &str| -> Result<Vec<f64>> {
            Ok(store.read_array(name)?.iter().copied().collect())
        };
        let mut population = Self::new(
            axis("wavelengths")?,
            axis("metallicities")?,
            axis("ages")?,
            store.read_array("spectra")?,
        );
        if store.group_exists("information") {
            population.information = store.read_attributes("information")?;
        }
        Ok(population)
    }

    /// Locate a model under `stellarPopulations/` in the datasets repository
    pub fn from_config(config: &Config, file: &str) -> Result<Self> {
        let path = config.locate(&format!("stellarPopulations/{file}"))?;
        debug!("Reading stellar population from {}", path.display());
        let store = MemoryStore::read_file(path)?;
        let mut population = Self::from_store(&store)?;
        population.file = Some(file.to_string());
        Ok(population)
    }

    /// Spacing of the wavelength grid around `wavelength`
    ///
    /// The next tabulated wavelength above minus the closest one at or
    /// below. Wavelengths outside the grid, including the last node, are
    /// an error.
    ///
    /// ```rust
    /// # use galtools_galaxies::StellarPopulation;
    /// # use ndarray::ArrayD;
    /// let population = StellarPopulation::new(
    ///     vec![1000.0, 1010.0, 1030.0, 1060.0],
    ///     vec![0.02],
    ///     vec![1.0],
    ///     ArrayD::zeros(vec![4, 1, 1]),
    /// );
    /// assert_eq!(population.wavelength_resolution(1000.0).unwrap(), 10.0);
    /// assert_eq!(population.wavelength_resolution(1015.0).unwrap(), 20.0);
    /// assert!(population.wavelength_resolution(1100.0).is_err());
    /// ```
    pub fn wavelength_resolution(&self, wavelength: f64) -> Result<f64> {
        let out_of_range = || Error::WavelengthOutOfRange {
            wavelength,
            min: self.wavelengths.first().copied().unwrap_or(f64::NAN),
            max: self.wavelengths.last().copied().unwrap_or(f64::NAN),
        };

        let upper = self
            .wavelengths
            .iter()
            .copied()
            .filter(|w| *w > wavelength)
            .reduce(f64::min)
            .ok_or_else(out_of_range)?;
        let lower = self
            .wavelengths
            .iter()
            .copied()
            .filter(|w| *w <= wavelength)
            .reduce(f64::max)
            .ok_or_else(out_of_range)?;

        Ok(upper - lower)
    }
}
