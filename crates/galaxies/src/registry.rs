//! Dispatch from property kinds to their calculators

// crate modules
use crate::error::{Error, Result};
use crate::galaxies::Galaxies;
use crate::name::{Kind, PropertyName};
use crate::properties;

// galtools crates
use galtools_data::Dataset;

// standard library
use std::collections::BTreeMap;

/// A calculator for one kind of derived property
///
/// Calculators pull whatever they depend on through the [Galaxies]
/// accessor, so dependencies may themselves be raw or derived.
pub trait Property: std::fmt::Debug + Send + Sync {
    /// Kind of name handled by the calculator
    fn kind(&self) -> Kind;

    /// Compute the property for every galaxy at redshift `z`
    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset>;
}

/// Immutable map from property kinds to calculators
///
/// ```rust
/// # use galtools_galaxies::{Kind, Registry};
/// let registry = Registry::standard();
/// assert!(registry.get(Kind::Magnitude).is_some());
/// ```
#[derive(Debug)]
pub struct Registry {
    properties: BTreeMap<Kind, Box<dyn Property>>,
}

impl Registry {
    /// Start an empty registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry with every built in calculator
    pub fn standard() -> Self {
        Self {
            properties: properties::standard()
                .into_iter()
                .map(|property| (property.kind(), property))
                .collect(),
        }
    }

    /// Calculator for a kind, if registered
    pub fn get(&self, kind: Kind) -> Option<&dyn Property> {
        self.properties.get(&kind).map(|p| p.as_ref())
    }

    /// Registered kinds, in order
    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.properties.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Collects calculators before freezing them into a [Registry]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    properties: BTreeMap<Kind, Box<dyn Property>>,
}

impl RegistryBuilder {
    /// Add a calculator, a kind may only be registered once
    pub fn register(mut self, property: Box<dyn Property>) -> Result<Self> {
        let kind = property.kind();
        if self.properties.contains_key(&kind) {
            return Err(Error::DuplicateRegistration(kind.to_string()));
        }
        self.properties.insert(kind, property);
        Ok(self)
    }

    /// Add every built in calculator
    pub fn register_standard(mut self) -> Result<Self> {
        for property in properties::standard() {
            self = self.register(property)?;
        }
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            properties: self.properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::PARSERS;

    #[test]
    fn every_kind_has_a_calculator() {
        let registry = Registry::standard();
        assert_eq!(registry.len(), PARSERS.len());
        for (kind, _) in PARSERS {
            assert!(registry.get(kind).is_some(), "{kind} is not registered");
        }
    }

    #[test]
    fn duplicates_are_rejected() {
        let builder = Registry::builder().register_standard().unwrap();
        let duplicate = properties::standard().remove(0);
        assert!(matches!(
            builder.register(duplicate),
            Err(Error::DuplicateRegistration(_))
        ));
    }

    #[test]
    fn partial_registries() {
        let registry = Registry::builder()
            .register(properties::standard().remove(0))
            .unwrap()
            .build();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.kinds().count(), 1);
    }
}
