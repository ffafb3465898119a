//! Cached access to filters by name

// crate modules
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::tophat::TopHat;
use crate::vega::Vega;

// galtools crates
use galtools_data::Config;

// external crates
use log::{debug, trace};

// standard library
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Filters held in memory, keyed by name
///
/// Filters are loaded at most once. Top hat names are generated on demand
/// and every other name is read from `filters/<name>.json` in the datasets
/// repository. When a [Vega] spectrum is attached, filters without a Vega
/// offset have one computed as they are loaded.
///
/// ```rust
/// # use galtools_filters::FilterLibrary;
/// let library = FilterLibrary::new();
/// let filter = library.load("adaptiveResolutionTopHat_5000_100").unwrap();
///
/// assert!(library.contains("adaptiveResolutionTopHat_5000_100"));
/// assert!((filter.effective_wavelength - 5000.0).abs() < 1e-6);
/// ```
#[derive(Debug, Default)]
pub struct FilterLibrary {
    config: Option<Config>,
    vega: Option<Vega>,
    cache: Mutex<HashMap<String, Arc<Filter>>>,
}

impl FilterLibrary {
    /// An empty library that can only generate top hats
    pub fn new() -> Self {
        Self::default()
    }

    /// Read filter files from a datasets repository
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Compute Vega offsets with this reference spectrum
    pub fn with_vega(mut self, vega: Vega) -> Self {
        self.vega = Some(vega);
        self
    }

    /// Datasets repository, if attached
    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    /// Reference spectrum, if attached
    pub fn vega(&self) -> Option<&Vega> {
        self.vega.as_ref()
    }

    /// Get a filter by name, loading it if needed
    pub fn load(&self, name: &str) -> Result<Arc<Filter>> {
        if let Some(filter) = self.cache().get(name) {
            trace!("Filter {name} found in memory");
            return Ok(Arc::clone(filter));
        }

        let filter = if TopHat::is_top_hat(name) {
            self.generate(name)?
        } else {
            self.read(name)?
        };
        Ok(self.insert(filter))
    }

    /// Add a filter to the cache, replacing any of the same name
    pub fn insert(&self, filter: Filter) -> Arc<Filter> {
        let filter = Arc::new(filter);
        self.cache()
            .insert(filter.name.clone(), Arc::clone(&filter));
        filter
    }

    /// Build a filter from a transmission curve and add it to the cache
    ///
    /// The effective wavelength is computed unless given, and the Vega
    /// offset is set when a spectrum is attached.
    pub fn create(
        &self,
        name: &str,
        wavelength: Vec<f64>,
        transmission: Vec<f64>,
        effective_wavelength: Option<f64>,
    ) -> Result<Arc<Filter>> {
        let mut filter = Filter::new(name, wavelength, transmission)?;
        if let Some(effective) = effective_wavelength {
            filter.effective_wavelength = effective;
        }
        let filter = self.with_offset(filter)?;
        Ok(self.insert(filter))
    }

    /// Save a filter to `filters/` in the dynamic tree
    pub fn write(&self, filter: &Filter) -> Result<PathBuf> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| Error::NoConfig(filter.name.clone()))?;
        filter.write_file(config.dynamic_path().join("filters"))
    }

    /// True if the filter is already in memory
    pub fn contains(&self, name: &str) -> bool {
        self.cache().contains_key(name)
    }

    /// Number of filters in memory
    pub fn len(&self) -> usize {
        self.cache().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every filter held in memory
    pub fn clear(&self) {
        debug!("Clearing filters from memory");
        self.cache().clear();
    }

    fn generate(&self, name: &str) -> Result<Filter> {
        debug!("Generating top hat filter {name}");
        let filter = self.with_offset(TopHat::parse(name)?.filter(name)?)?;
        if self.config.is_some() {
            self.write(&filter)?;
        }
        Ok(filter)
    }

    fn read(&self, name: &str) -> Result<Filter> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| Error::NoConfig(name.to_string()))?;
        let path = config.locate(&format!("{name}.json"))?;
        self.with_offset(Filter::read_file(path)?)
    }

    fn with_offset(&self, mut filter: Filter) -> Result<Filter> {
        if let (None, Some(vega)) = (filter.vega_offset, &self.vega) {
            filter.vega_offset = Some(vega.ab_vega_offset(&filter)?);
        }
        Ok(filter)
    }

    // a poisoned lock only means another thread panicked mid-insert
    fn cache(&self) -> MutexGuard<'_, HashMap<String, Arc<Filter>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_filters_are_shared() {
        let library = FilterLibrary::new();
        let a = library.load("fixedResolutionTopHat_6563_1000").unwrap();
        let b = library.load("fixedResolutionTopHat_6563_1000").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(library.len(), 1);

        library.clear();
        assert!(library.is_empty());
    }

    #[test]
    fn files_need_a_repository() {
        let library = FilterLibrary::new();
        assert!(matches!(library.load("SDSS_r"), Err(Error::NoConfig(_))));
    }

    #[test]
    fn created_filters_are_cached() {
        let library = FilterLibrary::new();
        let filter = library
            .create("custom", vec![1.0, 2.0, 3.0], vec![1.0, 1.0, 1.0], Some(2.5))
            .unwrap();
        assert_eq!(filter.effective_wavelength, 2.5);
        assert!(library.contains("custom"));
        assert_eq!(filter.vega_offset, None);
    }
}
