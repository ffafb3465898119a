//! Access to the datasets of a Galacticus output

// crate modules
use crate::error::{Error, Result};

// galtools crates
use galtools_cosmology::Cosmology;
use galtools_data::{
    float_attribute, join, Attribute, Attributes, DataStore, Dataset, MemoryStore,
};

// external crates
use itertools::Itertools;
use log::{debug, trace};
use ndarray::Array1;

// standard library
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// One `Outputs/Output<N>` group
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    /// Index `N` of the group
    pub index: usize,
    /// Group name, `Output<N>`
    pub name: String,
    pub expansion_factor: f64,
    pub redshift: f64,
}

impl Output {
    /// Path of the galaxy properties
    fn node_data(&self) -> String {
        format!("Outputs/{}/nodeData", self.name)
    }

    /// Path of the output group
    fn group(&self) -> String {
        format!("Outputs/{}", self.name)
    }
}

/// A Galacticus output file
///
/// Wraps any [DataStore] holding the Galacticus layout:
///
/// - `Parameters` with the model parameters as attributes of the group and
///   its sub-groups
/// - `Version` with the code version attributes
/// - `Outputs/Output<N>/nodeData/<property>` with one array per property
/// - `globalHistory` with volume averaged quantities
///
/// Snapshots are selected by redshift, always picking the output nearest
/// to the request.
///
/// ```rust
/// # use galtools_data::{Attribute, Attributes, MemoryStore};
/// # use galtools_galaxies::GalacticusOutput;
/// # use ndarray::arr1;
/// let store = MemoryStore::new()
///     .with_array("Outputs/Output1/nodeData/diskMassStellar", arr1(&[1.0e10]).into_dyn())
///     .with_attributes(
///         "Outputs/Output1",
///         Attributes::from([("outputExpansionFactor".to_string(), Attribute::Float(0.5))]),
///     );
/// let output = GalacticusOutput::new(Box::new(store)).unwrap();
///
/// assert_eq!(output.nearest_redshift(0.9).unwrap(), 1.0);
/// assert_eq!(output.count_galaxies_at_redshift(1.0).unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct GalacticusOutput {
    store: Box<dyn DataStore>,
    parameters: Attributes,
    version: Attributes,
    outputs: Vec<Output>,
    cosmology: OnceLock<Cosmology>,
}

impl GalacticusOutput {
    /// Read the parameters and list the outputs of a store
    pub fn new(store: Box<dyn DataStore>) -> Result<Self> {
        let parameters = read_parameters(store.as_ref())?;
        let version = match store.group_exists("Version") {
            true => store.read_attributes("Version")?,
            false => Attributes::new(),
        };

        let mut outputs = Vec::new();
        for name in store.list("Outputs") {
            let Some(index) = name.strip_prefix("Output").and_then(|i| i.parse().ok()) else {
                continue;
            };
            let path = join("Outputs", &name);
            let a = float_attribute(&store.read_attributes(&path)?, "outputExpansionFactor", &path)?;
            outputs.push(Output {
                index,
                name,
                expansion_factor: a,
                redshift: 1.0 / a - 1.0,
            });
        }
        outputs.sort_by_key(|o| o.index);
        debug!("Found {} outputs", outputs.len());

        Ok(Self {
            store,
            parameters,
            version,
            outputs,
            cosmology: OnceLock::new(),
        })
    }

    /// Open a [MemoryStore] file
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(Box::new(MemoryStore::read_file(path)?))
    }

    /// Underlying store
    pub fn store(&self) -> &dyn DataStore {
        self.store.as_ref()
    }

    /// Model parameters, keyed `<group>/<name>` for sub-groups
    pub fn parameters(&self) -> &Attributes {
        &self.parameters
    }

    pub fn version(&self) -> &Attributes {
        &self.version
    }

    /// Outputs ordered by index
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Output nearest in redshift
    pub fn nearest_output(&self, z: f64) -> Result<&Output> {
        self.outputs
            .iter()
            .min_by(|a, b| (a.redshift - z).abs().total_cmp(&(b.redshift - z).abs()))
            .ok_or(Error::NoOutputs)
    }

    /// Redshift of the output nearest to `z`
    pub fn nearest_redshift(&self, z: f64) -> Result<f64> {
        Ok(self.nearest_output(z)?.redshift)
    }

    /// Name of the output nearest to `z`, e.g. `Output3`
    pub fn output_name(&self, z: f64) -> Result<&str> {
        Ok(&self.nearest_output(z)?.name)
    }

    /// Redshift of an output given as `Output<N>` or `<N>`
    pub fn output_redshift(&self, name: &str) -> Option<f64> {
        let index = name.strip_prefix("Output").unwrap_or(name).parse::<usize>().ok()?;
        self.outputs
            .iter()
            .find(|o| o.index == index)
            .map(|o| o.redshift)
    }

    /// Names of every dataset at redshift `z`
    pub fn available_datasets(&self, z: f64) -> Result<Vec<String>> {
        Ok(self.store.list(&self.nearest_output(z)?.node_data()))
    }

    /// True if the output nearest to `z` holds the dataset
    pub fn dataset_exists(&self, name: &str, z: f64) -> Result<bool> {
        let path = join(&self.nearest_output(z)?.node_data(), name);
        Ok(self.store.array_exists(&path))
    }

    /// Read a dataset and its attributes
    pub fn get_dataset(&self, name: &str, z: f64) -> Result<Dataset> {
        let path = join(&self.nearest_output(z)?.node_data(), name);
        trace!("Reading {path}");
        let data = self.store.read_array(&path)?;
        let attrs = self.store.read_attributes(&path).unwrap_or_default();
        Ok(Dataset::new(name, data).with_attrs(attrs).with_path(path))
    }

    /// Number of galaxies in the output nearest to `z`
    ///
    /// Every dataset of an output has the same length, so the first is
    /// used. Outputs without datasets hold no galaxies.
    pub fn count_galaxies_at_redshift(&self, z: f64) -> Result<usize> {
        self.count_in(self.nearest_output(z)?)
    }

    /// Galaxies at one redshift, or summed over every output
    pub fn count_galaxies(&self, z: Option<f64>) -> Result<usize> {
        match z {
            Some(z) => self.count_galaxies_at_redshift(z),
            None => self.outputs.iter().map(|o| self.count_in(o)).sum(),
        }
    }

    fn count_in(&self, output: &Output) -> Result<usize> {
        let node_data = output.node_data();
        match self.store.list(&node_data).first() {
            Some(name) => {
                let shape = self.store.read_array(&join(&node_data, name))?;
                Ok(shape.shape().first().copied().unwrap_or(0))
            }
            None => Ok(0),
        }
    }

    /// Weight of every galaxy, from the weights of their merger trees
    ///
    /// Each tree weight is repeated once per galaxy in that tree.
    pub fn merger_tree_weight(&self, z: f64) -> Result<Dataset> {
        let group = self.nearest_output(z)?.group();
        let weight = self.store.read_array(&join(&group, "mergerTreeWeight"))?;
        let count = self.store.read_array(&join(&group, "mergerTreeCount"))?;

        let values = weight
            .iter()
            .zip(count.iter())
            .flat_map(|(w, n)| std::iter::repeat(*w).take(*n as usize))
            .collect::<Vec<_>>();
        Ok(Dataset::from_vec("mergerTreeWeight", values))
    }

    /// Redshift of every galaxy
    ///
    /// Lightcone outputs carry `lightconeRedshift`. Otherwise every galaxy
    /// takes the redshift of the snapshot.
    pub fn redshift_dataset(&self, z: f64) -> Result<Dataset> {
        if self.dataset_exists("lightconeRedshift", z)? {
            let mut dataset = self.get_dataset("lightconeRedshift", z)?;
            dataset.name = "redshift".into();
            return Ok(dataset);
        }
        let mut dataset = self.snapshot_redshift(z)?;
        dataset.name = "redshift".into();
        Ok(dataset)
    }

    /// Snapshot redshift repeated for every galaxy
    pub fn snapshot_redshift(&self, z: f64) -> Result<Dataset> {
        let n = self.count_galaxies_at_redshift(z)?;
        let redshift = self.nearest_redshift(z)?;
        Ok(Dataset::new("snapshotRedshift", Array1::from_elem(n, redshift).into_dyn()))
    }

    /// Redshift label used in dataset names, e.g. `z1.000`
    ///
    /// Taken from the first dataset name carrying one, otherwise formatted
    /// from the snapshot redshift.
    pub fn redshift_string(&self, z: f64) -> Result<String> {
        let found = self
            .available_datasets(z)?
            .into_iter()
            .find_map(|name| name.split(':').find(|s| is_redshift_label(s)).map(str::to_string));
        match found {
            Some(label) => Ok(label),
            None => Ok(format!("z{:.3}", self.nearest_redshift(z)?)),
        }
    }

    /// Filters with stellar luminosities at redshift `z`
    ///
    /// Filters are read from names of the form
    /// `<component>LuminositiesStellar:<filter>:<frame>:z<N>`, optionally
    /// restricted to the `rest` or `observed` frame.
    pub fn available_filters(&self, z: f64, frame: Option<&str>) -> Result<Vec<String>> {
        Ok(self
            .available_datasets(z)?
            .iter()
            .filter_map(|name| {
                let mut segments = name.split(':');
                let head = segments.next()?;
                let filter = segments.next()?;
                let found_frame = segments.next()?;
                let is_luminosity = ["disk", "spheroid"]
                    .iter()
                    .any(|c| head == format!("{c}LuminositiesStellar"));
                let frame_matches = frame.map_or(true, |f| f == found_frame);
                (is_luminosity && frame_matches && !is_redshift_label(filter))
                    .then(|| filter.to_string())
            })
            .unique()
            .sorted()
            .collect())
    }

    /// Cosmology of the model, built once from the parameters
    pub fn cosmology(&self) -> Result<&Cosmology> {
        if let Some(cosmology) = self.cosmology.get() {
            return Ok(cosmology);
        }
        let cosmology = Cosmology::from_attributes(&self.parameters)?;
        Ok(self.cosmology.get_or_init(|| cosmology))
    }

    /// Volume averaged quantities against time
    ///
    /// Columns of the `globalHistory` group, all of them or only those
    /// requested. `historyRedshift` is derived from `historyExpansion`
    /// when available. With `units_in_si`, columns are multiplied by their
    /// `unitsInSI` attribute.
    ///
    /// Returns `None` when the output has no global history.
    pub fn global_history(
        &self,
        required: Option<&[&str]>,
        units_in_si: bool,
    ) -> Result<Option<BTreeMap<String, Vec<f64>>>> {
        const GROUP: &str = "globalHistory";
        if !self.store.group_exists(GROUP) {
            return Ok(None);
        }

        let names = match required {
            Some(names) => names
                .iter()
                .filter(|n| **n != "historyRedshift")
                .map(|n| n.to_string())
                .collect(),
            None => self.store.list(GROUP),
        };

        let mut history = BTreeMap::new();
        for name in names {
            let path = join(GROUP, &name);
            let mut values = self.store.read_array(&path)?.iter().copied().collect::<Vec<_>>();
            if units_in_si {
                let attrs = self.store.read_attributes(&path).unwrap_or_default();
                if let Some(units) = attrs.get("unitsInSI").and_then(Attribute::as_f64) {
                    values.iter_mut().for_each(|v| *v *= units);
                }
            }
            history.insert(name, values);
        }

        let wants_redshift = required.map_or(true, |r| r.contains(&"historyRedshift"));
        let expansion = join(GROUP, "historyExpansion");
        if wants_redshift && self.store.array_exists(&expansion) {
            let redshift = self
                .store
                .read_array(&expansion)?
                .iter()
                .map(|a| 1.0 / a - 1.0)
                .collect();
            history.insert("historyRedshift".to_string(), redshift);
        }
        Ok(Some(history))
    }
}

/// Flatten `Parameters` and the attributes of its sub-groups
fn read_parameters(store: &dyn DataStore) -> Result<Attributes> {
    let mut parameters = Attributes::new();
    if !store.group_exists("Parameters") {
        return Ok(parameters);
    }
    parameters.extend(store.read_attributes("Parameters")?);
    for group in store.list("Parameters") {
        let path = join("Parameters", &group);
        if store.array_exists(&path) {
            continue;
        }
        for (key, value) in store.read_attributes(&path)? {
            parameters.insert(format!("{group}/{key}"), value);
        }
    }
    Ok(parameters)
}

/// True for segments like `z1.000`
pub(crate) fn is_redshift_label(segment: &str) -> bool {
    segment
        .strip_prefix('z')
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .map_or(false, |rest| rest.parse::<f64>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    fn attrs(pairs: &[(&str, f64)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Attribute::Float(*v)))
            .collect()
    }

    fn output() -> GalacticusOutput {
        let store = MemoryStore::new()
            .with_attributes("Outputs/Output2", attrs(&[("outputExpansionFactor", 1.0)]))
            .with_attributes("Outputs/Output1", attrs(&[("outputExpansionFactor", 0.25)]))
            .with_array(
                "Outputs/Output1/nodeData/diskLuminositiesStellar:SDSS_r:rest:z3.000",
                arr1(&[1.0, 2.0]).into_dyn(),
            )
            .with_array(
                "Outputs/Output1/nodeData/spheroidLuminositiesStellar:SDSS_g:observed:z3.000:dustAtlas",
                arr1(&[1.0, 2.0]).into_dyn(),
            )
            .with_array("Outputs/Output1/mergerTreeWeight", arr1(&[0.5, 2.0]).into_dyn())
            .with_array("Outputs/Output1/mergerTreeCount", arr1(&[1.0, 1.0]).into_dyn())
            .with_array("Outputs/Output2/nodeData/diskMassStellar", arr1(&[1.0, 2.0, 3.0]).into_dyn())
            .with_attributes("Parameters", attrs(&[("verbosityLevel", 1.0)]))
            .with_attributes("Parameters/cosmologyParameters", attrs(&[("OmegaMatter", 0.3)]))
            .with_array("globalHistory/historyExpansion", arr1(&[0.5, 1.0]).into_dyn())
            .with_array("globalHistory/historyStellarDensity", arr1(&[1.0, 2.0]).into_dyn())
            .with_attributes(
                "globalHistory/historyStellarDensity",
                attrs(&[("unitsInSI", 10.0)]),
            );
        GalacticusOutput::new(Box::new(store)).unwrap()
    }

    #[test]
    fn outputs_are_ordered_by_index() {
        let output = output();
        let names = output.outputs().iter().map(|o| o.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Output1", "Output2"]);
        assert_eq!(output.output_redshift("Output1"), Some(3.0));
        assert_eq!(output.output_redshift("2"), Some(0.0));
        assert_eq!(output.output_redshift("Output9"), None);
    }

    #[test]
    fn nearest_output_wins() {
        let output = output();
        assert_eq!(output.output_name(1.0).unwrap(), "Output2");
        assert_eq!(output.output_name(2.0).unwrap(), "Output1");
        assert_eq!(output.count_galaxies_at_redshift(0.1).unwrap(), 3);
        assert_eq!(output.count_galaxies(None).unwrap(), 5);
    }

    #[test]
    fn parameters_are_flattened() {
        let output = output();
        let parameters = output.parameters();
        assert!(parameters.contains_key("verbosityLevel"));
        assert!(parameters.contains_key("cosmologyParameters/OmegaMatter"));
    }

    #[test]
    fn redshift_labels() {
        let output = output();
        assert_eq!(output.redshift_string(3.0).unwrap(), "z3.000");
        assert_eq!(output.redshift_string(0.0).unwrap(), "z0.000");
        assert!(is_redshift_label("z0.1"));
        assert!(!is_redshift_label("zband"));
    }

    #[test]
    fn filters_from_dataset_names() {
        let output = output();
        assert_eq!(output.available_filters(3.0, None).unwrap(), vec!["SDSS_g", "SDSS_r"]);
        assert_eq!(output.available_filters(3.0, Some("rest")).unwrap(), vec!["SDSS_r"]);
    }

    #[test]
    fn snapshot_redshifts_fill_every_galaxy() {
        let output = output();
        let redshift = output.redshift_dataset(3.0).unwrap();
        assert_eq!(redshift.name, "redshift");
        assert_eq!(redshift.to_vec().unwrap(), vec![3.0, 3.0]);
    }

    #[test]
    fn weights_repeat_per_tree() {
        let output = output();
        let weight = output.merger_tree_weight(3.0).unwrap();
        assert_eq!(weight.to_vec().unwrap(), vec![0.5, 2.0]);
    }

    #[test]
    fn history_columns() {
        let output = output();
        let history = output.global_history(None, true).unwrap().unwrap();
        assert_eq!(history["historyStellarDensity"], vec![10.0, 20.0]);
        assert_eq!(history["historyRedshift"], vec![1.0, 0.0]);

        let history = output
            .global_history(Some(&["historyStellarDensity"]), false)
            .unwrap()
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history["historyStellarDensity"], vec![1.0, 2.0]);
    }
}
