//! Galaxy property accessor

// crate modules
use crate::error::{Error, Result};
use crate::name::PropertyName;
use crate::output::GalacticusOutput;
use crate::properties::random_inclinations;
use crate::registry::Registry;

// galtools crates
use galtools_cloudy::CloudyTable;
use galtools_cosmology::Cosmology;
use galtools_data::{Config, Dataset, Settings};
use galtools_dust::CompendiumTable;
use galtools_filters::{Filter, FilterLibrary, Vega};

// external crates
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

// standard library
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Raw and derived galaxy properties of one output
///
/// Names held by the output are read directly. Anything else is parsed as
/// a [PropertyName] and computed by the calculator registered for its kind.
/// Tables are loaded from the datasets repository the first time they are
/// needed, unless instances are injected up front.
///
/// ```rust
/// # use galtools_data::{Attribute, Attributes, MemoryStore, Settings};
/// # use galtools_galaxies::{GalacticusOutput, Galaxies};
/// # use ndarray::arr1;
/// let store = MemoryStore::new()
///     .with_array("Outputs/Output1/nodeData/diskMassStellar", arr1(&[3.0, 0.0]).into_dyn())
///     .with_array("Outputs/Output1/nodeData/spheroidMassStellar", arr1(&[1.0, 0.0]).into_dyn())
///     .with_attributes(
///         "Outputs/Output1",
///         Attributes::from([("outputExpansionFactor".to_string(), Attribute::Float(1.0))]),
///     );
/// let output = GalacticusOutput::new(Box::new(store)).unwrap();
/// let galaxies = Galaxies::new(output, Settings::default());
///
/// let data = galaxies.get(0.0, &["totalMassStellar", "bulgeToTotalMassStellar"]).unwrap();
/// assert_eq!(data["totalMassStellar"].to_vec().unwrap(), vec![4.0, 0.0]);
/// assert_eq!(data["bulgeToTotalMassStellar"].to_vec().unwrap()[0], 0.25);
/// assert!(data["bulgeToTotalMassStellar"].to_vec().unwrap()[1].is_nan());
/// ```
#[derive(Debug)]
pub struct Galaxies {
    output: GalacticusOutput,
    settings: Settings,
    config: Option<Config>,
    registry: Registry,
    filters: FilterLibrary,
    cosmology: OnceLock<Cosmology>,
    cloudy: OnceLock<CloudyTable>,
    compendium: OnceLock<CompendiumTable>,
    rng: Mutex<StdRng>,
    /// Random inclinations drawn for each output, so that every property
    /// sees the same orientation of a galaxy
    inclinations: Mutex<BTreeMap<String, Arc<Vec<f64>>>>,
}

impl Galaxies {
    /// Accessor with the standard registry and no datasets repository
    pub fn new(output: GalacticusOutput, settings: Settings) -> Self {
        let rng = match settings.inclination.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            output,
            settings,
            config: None,
            registry: Registry::standard(),
            filters: FilterLibrary::new(),
            cosmology: OnceLock::new(),
            cloudy: OnceLock::new(),
            compendium: OnceLock::new(),
            rng: Mutex::new(rng),
            inclinations: Mutex::new(BTreeMap::new()),
        }
    }

    /// Load tables and filters from a datasets repository
    ///
    /// The repository takes the settings of the accessor. Vega offsets are
    /// available when the Vega spectrum can be found.
    pub fn with_config(mut self, config: Config) -> Self {
        let config = config.with_settings(self.settings.clone());
        let mut filters = FilterLibrary::new().with_config(config.clone());
        match Vega::from_config(&config) {
            Ok(vega) => filters = filters.with_vega(vega),
            Err(e) => debug!("Vega offsets unavailable: {e}"),
        }
        self.filters = filters;
        self.config = Some(config);
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_filters(mut self, filters: FilterLibrary) -> Self {
        self.filters = filters;
        self
    }

    /// Use `cosmology` in place of the one stored with the output
    pub fn with_cosmology(mut self, cosmology: Cosmology) -> Self {
        self.cosmology = OnceLock::from(cosmology);
        self
    }

    pub fn with_cloudy(mut self, table: CloudyTable) -> Self {
        self.cloudy = OnceLock::from(table);
        self
    }

    pub fn with_compendium(mut self, table: CompendiumTable) -> Self {
        self.compendium = OnceLock::from(table);
        self
    }

    /// Reseed the generator used for random inclinations
    ///
    /// Inclinations already drawn are forgotten.
    pub fn with_seed(self, seed: u64) -> Self {
        *self.lock_rng() = StdRng::seed_from_u64(seed);
        self.lock_inclinations().clear();
        self
    }

    pub fn output(&self) -> &GalacticusOutput {
        &self.output
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn filters(&self) -> &FilterLibrary {
        &self.filters
    }

    /// Filter by name from the library
    pub fn filter(&self, name: &str) -> Result<Arc<Filter>> {
        Ok(self.filters.load(name)?)
    }

    /// Number of galaxies at redshift `z`
    pub fn count(&self, z: f64) -> Result<usize> {
        self.output.count_galaxies_at_redshift(z)
    }

    /// Several properties at once, computed in parallel
    pub fn get(&self, z: f64, names: &[&str]) -> Result<BTreeMap<String, Dataset>> {
        names
            .par_iter()
            .map(|name| Ok((name.to_string(), self.retrieve(name, z)?)))
            .collect()
    }

    /// One property, raw if the output holds it, derived otherwise
    pub fn retrieve(&self, name: &str, z: f64) -> Result<Dataset> {
        if self.output.dataset_exists(name, z)? {
            trace!("Reading {name} from the output");
            return self.output.get_dataset(name, z);
        }

        let parsed = PropertyName::parse(name).map_err(|e| {
            if let Error::UnknownProperty(_) = e {
                warn!("{name} is not in the output and matches no property");
            }
            e
        })?;
        let property = self.registry.get(parsed.kind()).ok_or_else(|| {
            warn!("No calculator registered for {} ({name})", parsed.kind());
            Error::UnknownProperty(name.to_string())
        })?;

        trace!("Computing {name} as {}", parsed.kind());
        let mut dataset = property.get(self, &parsed, z)?;
        dataset.name = name.to_string();
        Ok(dataset)
    }

    /// A dependency of `property`, missing data reported as such
    pub(crate) fn require(&self, property: &PropertyName, dependency: &str, z: f64) -> Result<Dataset> {
        self.retrieve(dependency, z).map_err(|e| match e {
            Error::UnknownProperty(_) | Error::Data(galtools_data::Error::DatasetNotFound(_)) => {
                Error::MissingDependency {
                    property: property.to_string(),
                    dependency: dependency.to_string(),
                }
            }
            e => e,
        })
    }

    /// Cosmology of the output, unless one was injected
    pub fn cosmology(&self) -> Result<&Cosmology> {
        match self.cosmology.get() {
            Some(cosmology) => Ok(cosmology),
            None => self.output.cosmology(),
        }
    }

    /// CLOUDY table, loading every line on first use
    pub fn cloudy(&self) -> Result<&CloudyTable> {
        if let Some(table) = self.cloudy.get() {
            return Ok(table);
        }
        let config = self.config("CLOUDY table")?;
        let table = CloudyTable::from_config(config, None)?;
        Ok(self.cloudy.get_or_init(|| table))
    }

    /// Dust compendium, loaded on first use
    pub fn compendium(&self) -> Result<&CompendiumTable> {
        if let Some(table) = self.compendium.get() {
            return Ok(table);
        }
        let config = self.config("dust compendium")?;
        let table = CompendiumTable::from_config(config)?;
        Ok(self.compendium.get_or_init(|| table))
    }

    /// Inclination of every galaxy in the output nearest `z`
    ///
    /// Drawn on first use, in degrees or radians as the settings ask.
    pub(crate) fn inclinations(&self, z: f64) -> Result<Arc<Vec<f64>>> {
        let key = self.output.output_name(z)?.to_string();
        let mut drawn = self.lock_inclinations();
        if let Some(inclinations) = drawn.get(&key) {
            return Ok(Arc::clone(inclinations));
        }
        let n = self.count(z)?;
        let degrees = self.settings.inclination.degrees;
        debug!("Drawing {n} inclinations for {key}");
        let inclinations = Arc::new(random_inclinations(n, degrees, &mut *self.lock_rng()));
        drawn.insert(key, Arc::clone(&inclinations));
        Ok(inclinations)
    }

    /// Run `f` with the shared random number generator
    pub(crate) fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        f(&mut self.lock_rng())
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        // a poisoned generator is still a usable generator
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_inclinations(&self) -> MutexGuard<'_, BTreeMap<String, Arc<Vec<f64>>>> {
        self.inclinations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn config(&self, table: &str) -> Result<&Config> {
        self.config
            .as_ref()
            .ok_or_else(|| Error::NoConfig(table.to_string()))
    }
}
