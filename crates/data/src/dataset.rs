// crate modules
use crate::error::{Error, Result};

// external crates
use ndarray::{Array1, ArrayD, Ix1};
use serde::{Deserialize, Serialize};

// standard library
use std::collections::BTreeMap;

/// Attribute dictionary attached to groups and datasets
pub type Attributes = BTreeMap<String, Attribute>;

/// A single attribute value
///
/// Mirrors the handful of types Galacticus writes as HDF5 attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attribute {
    /// Floating point scalar, e.g. `unitsInSI`
    Float(f64),
    /// Integer scalar
    Integer(i64),
    /// Text, e.g. a model label
    Text(String),
    /// Array of floats
    Array(Vec<f64>),
}

impl Attribute {
    /// Numeric value of a scalar attribute
    ///
    /// Integers are widened and text is parsed, since parameter files often
    /// store numbers as strings.
    ///
    /// ```rust
    /// # use galtools_data::Attribute;
    /// assert_eq!(Attribute::Integer(3).as_f64(), Some(3.0));
    /// assert_eq!(Attribute::Text("0.25".into()).as_f64(), Some(0.25));
    /// assert_eq!(Attribute::Array(vec![1.0]).as_f64(), None);
    /// ```
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Array(_) => None,
        }
    }

    /// Text value, only for text attributes
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Attribute {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<f64>> for Attribute {
    fn from(value: Vec<f64>) -> Self {
        Self::Array(value)
    }
}

/// Look up a numeric attribute by name, with a helpful error
pub fn float_attribute(attributes: &Attributes, name: &str, path: &str) -> Result<f64> {
    let attribute = attributes
        .get(name)
        .ok_or_else(|| Error::AttributeNotFound {
            name: name.to_string(),
            path: path.to_string(),
        })?;
    attribute.as_f64().ok_or_else(|| Error::AttributeType {
        name: name.to_string(),
        expected: "numeric".to_string(),
    })
}

/// A named array of galaxy data
///
/// The first axis always runs over galaxies. Some properties, such as
/// spectral energy distributions, carry a second axis.
///
/// Datasets are built fresh by every property calculation and are not
/// mutated afterwards.
///
/// ```rust
/// # use galtools_data::Dataset;
/// let mass = Dataset::from_vec("diskMassStellar", vec![1.0e10, 2.0e9])
///     .with_attr("unitsInSI", 1.9891e30);
///
/// assert_eq!(mass.len(), 2);
/// assert_eq!(mass.attr("unitsInSI").and_then(|a| a.as_f64()), Some(1.9891e30));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Full property name
    pub name: String,
    /// Data with shape `[n]` or `[n, n_extra]`
    pub data: ArrayD<f64>,
    /// Attributes such as `unitsInSI`
    pub attrs: Attributes,
    /// Location in the output file, for raw datasets
    pub path: Option<String>,
}

impl Dataset {
    /// New dataset without attributes
    pub fn new(name: impl Into<String>, data: ArrayD<f64>) -> Self {
        Self {
            name: name.into(),
            data,
            attrs: Attributes::new(),
            path: None,
        }
    }

    /// New one dimensional dataset
    pub fn from_vec(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, Array1::from_vec(values).into_dyn())
    }

    /// Add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Attribute>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Replace the full attribute set
    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    /// Record where the data came from
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Number of galaxies
    pub fn len(&self) -> usize {
        self.data.shape().first().copied().unwrap_or(0)
    }

    /// True when there are no galaxies
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attribute by name
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.get(name)
    }

    /// View of one dimensional data
    ///
    /// Returns an error for multi-dimensional datasets such as SEDs.
    pub fn values(&self) -> Result<ndarray::ArrayView1<f64>> {
        self.data
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|_| Error::Dimensions {
                name: self.name.clone(),
                expected: 1,
                found: self.data.ndim(),
            })
    }

    /// Owned copy of one dimensional data
    pub fn to_vec(&self) -> Result<Vec<f64>> {
        Ok(self.values()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn multi_dimensional_values_are_rejected() {
        let sed = Dataset::new("totalSpectralEnergyDistribution", Array2::zeros((3, 4)).into_dyn());
        assert_eq!(sed.len(), 3);
        assert!(matches!(
            sed.values(),
            Err(Error::Dimensions { expected: 1, found: 2, .. })
        ));
    }

    #[test]
    fn missing_attributes() {
        let attrs = Attributes::from([("label".to_string(), Attribute::from("text"))]);
        assert!(matches!(
            float_attribute(&attrs, "HubbleConstant", "Parameters"),
            Err(Error::AttributeNotFound { .. })
        ));
        assert!(matches!(
            float_attribute(&attrs, "label", "Parameters"),
            Err(Error::AttributeType { .. })
        ));
    }

    #[test]
    fn builders() {
        let d = Dataset::from_vec("redshift", vec![0.1])
            .with_path("Outputs/Output1/nodeData/redshift")
            .with_attr("unitsInSI", 1.0);
        assert_eq!(d.path.as_deref(), Some("Outputs/Output1/nodeData/redshift"));
        assert_eq!(d.to_vec().unwrap(), vec![0.1]);
    }
}
