//! Array stores standing in for the hierarchical output files
//!
//! Galacticus writes HDF5, but nothing downstream needs more than a handful
//! of operations: read and write a named array, read and write the
//! attributes of a group, and list the children of a group. [DataStore]
//! captures exactly that, so the property calculators can run against any
//! backing format.
//!
//! Paths use `/` separators and are normalised, so `"/Outputs/Output1/"` and
//! `"Outputs/Output1"` refer to the same group.

// crate modules
use crate::dataset::Attributes;
use crate::error::{Error, Result};

// external crates
use log::trace;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

// standard library
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Minimal interface to a hierarchical array store
pub trait DataStore: std::fmt::Debug + Send + Sync {
    /// Read an array by path
    fn read_array(&self, path: &str) -> Result<ArrayD<f64>>;

    /// Write an array, replacing any existing array at the same path
    fn write_array(&mut self, path: &str, array: ArrayD<f64>) -> Result<()>;

    /// Read every attribute of a group or array
    fn read_attributes(&self, path: &str) -> Result<Attributes>;

    /// Merge attributes into a group or array
    fn write_attributes(&mut self, path: &str, attributes: Attributes) -> Result<()>;

    /// True if an array exists at the path
    fn array_exists(&self, path: &str) -> bool;

    /// True if anything exists at or below the path
    fn group_exists(&self, path: &str) -> bool;

    /// Names of the immediate children of a group, sorted
    fn list(&self, group: &str) -> Vec<String>;
}

/// Normalise a store path by trimming separators
pub fn normalise(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Join a group and a child name
///
/// ```rust
/// # use galtools_data::join;
/// assert_eq!(join("Outputs/Output1", "nodeData"), "Outputs/Output1/nodeData");
/// assert_eq!(join("/", "Parameters"), "Parameters");
/// ```
pub fn join(group: &str, name: &str) -> String {
    let group = normalise(group);
    let name = normalise(name);
    match group.is_empty() {
        true => name,
        false => format!("{group}/{name}"),
    }
}

/// Hierarchical store held entirely in memory
///
/// Persisted as a binary blob with `bincode`, or as JSON when the file
/// extension is `.json`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    arrays: BTreeMap<String, ArrayD<f64>>,
    attributes: BTreeMap<String, Attributes>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from file, format chosen by extension
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        trace!("Reading store from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        match is_json(path) {
            true => Ok(serde_json::from_reader(reader)?),
            false => Ok(bincode::deserialize_from(reader)?),
        }
    }

    /// Write the store to file, format chosen by extension
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        trace!("Writing store to {}", path.display());
        let writer = BufWriter::new(File::create(path)?);
        match is_json(path) {
            true => serde_json::to_writer(writer, self)?,
            false => bincode::serialize_into(writer, self)?,
        }
        Ok(())
    }

    /// Builder style insertion of an array
    pub fn with_array(mut self, path: &str, array: ArrayD<f64>) -> Self {
        self.arrays.insert(normalise(path), array);
        self
    }

    /// Builder style insertion of attributes
    pub fn with_attributes(mut self, path: &str, attributes: Attributes) -> Self {
        self.attributes
            .entry(normalise(path))
            .or_default()
            .extend(attributes);
        self
    }

    /// Total number of arrays
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// True if there are no arrays
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    fn keys(&self) -> impl Iterator<Item = &String> {
        self.arrays.keys().chain(self.attributes.keys())
    }
}

impl DataStore for MemoryStore {
    fn read_array(&self, path: &str) -> Result<ArrayD<f64>> {
        self.arrays
            .get(&normalise(path))
            .cloned()
            .ok_or_else(|| Error::DatasetNotFound(path.to_string()))
    }

    fn write_array(&mut self, path: &str, array: ArrayD<f64>) -> Result<()> {
        self.arrays.insert(normalise(path), array);
        Ok(())
    }

    fn read_attributes(&self, path: &str) -> Result<Attributes> {
        let key = normalise(path);
        match self.attributes.get(&key) {
            Some(attributes) => Ok(attributes.clone()),
            None if self.group_exists(&key) => Ok(Attributes::new()),
            None => Err(Error::GroupNotFound(path.to_string())),
        }
    }

    fn write_attributes(&mut self, path: &str, attributes: Attributes) -> Result<()> {
        self.attributes
            .entry(normalise(path))
            .or_default()
            .extend(attributes);
        Ok(())
    }

    fn array_exists(&self, path: &str) -> bool {
        self.arrays.contains_key(&normalise(path))
    }

    fn group_exists(&self, path: &str) -> bool {
        let key = normalise(path);
        if key.is_empty() {
            return true;
        }
        let prefix = format!("{key}/");
        self.keys().any(|k| *k == key || k.starts_with(&prefix))
    }

    fn list(&self, group: &str) -> Vec<String> {
        let key = normalise(group);
        let prefix = match key.is_empty() {
            true => String::new(),
            false => format!("{key}/"),
        };

        self.keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty())
            .filter_map(|rest| rest.split('/').next())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Attribute;
    use ndarray::arr1;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_array(
                "Outputs/Output1/nodeData/diskMassStellar",
                arr1(&[1.0, 2.0]).into_dyn(),
            )
            .with_array(
                "/Outputs/Output2/nodeData/diskMassStellar/",
                arr1(&[3.0]).into_dyn(),
            )
            .with_attributes(
                "Outputs/Output1",
                Attributes::from([("outputExpansionFactor".into(), Attribute::Float(0.5))]),
            )
    }

    #[test]
    fn listing_groups() {
        let store = store();
        assert_eq!(store.list("/"), vec!["Outputs"]);
        assert_eq!(store.list("Outputs"), vec!["Output1", "Output2"]);
        assert_eq!(store.list("Outputs/Output1/nodeData"), vec!["diskMassStellar"]);
        assert!(store.list("Missing").is_empty());
    }

    #[test]
    fn paths_are_normalised() {
        let store = store();
        assert!(store.array_exists("/Outputs/Output2/nodeData/diskMassStellar"));
        assert!(store.group_exists("Outputs/Output2/"));
        assert!(!store.group_exists("Outputs/Output3"));
    }

    #[test]
    fn attributes_of_groups() {
        let store = store();
        let attrs = store.read_attributes("Outputs/Output1").unwrap();
        assert_eq!(attrs["outputExpansionFactor"], Attribute::Float(0.5));

        // existing groups without attributes are empty rather than errors
        assert!(store.read_attributes("Outputs/Output2").unwrap().is_empty());
        assert!(store.read_attributes("Outputs/Output9").is_err());
    }

    #[test]
    fn attributes_merge() {
        let mut store = store();
        store
            .write_attributes(
                "Outputs/Output1",
                Attributes::from([("label".into(), Attribute::from("first"))]),
            )
            .unwrap();
        assert_eq!(store.read_attributes("Outputs/Output1").unwrap().len(), 2);
    }
}
