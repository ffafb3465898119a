// crate modules
use super::{check_lengths, mismatch};
use crate::error::{Error, Result};
use crate::galaxies::Galaxies;
use crate::name::{Kind, PropertyName};
use crate::registry::Property;

// galtools crates
use galtools_data::Dataset;

/// `<property>:host`, the property of the isolated node hosting each galaxy
///
/// Galacticus writes satellites immediately before their host, so every
/// galaxy takes the value of the next isolated node at or after it.
#[derive(Debug)]
pub struct HostNode;

impl Property for HostNode {
    fn kind(&self) -> Kind {
        Kind::HostNode
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::HostNode { property } = name else {
            return Err(mismatch(self.kind(), name));
        };
        let values = galaxies.require(name, property, z)?;
        let isolated = galaxies.require(name, "nodeIsIsolated", z)?;
        check_lengths(&[&values, &isolated])?;

        let hosted = host_values(&values.to_vec()?, &isolated.to_vec()?)?;
        Ok(Dataset::from_vec(name.to_string(), hosted).with_attrs(values.attrs))
    }
}

/// Scan from the end, carrying the value of the last isolated node seen
fn host_values(values: &[f64], isolated: &[f64]) -> Result<Vec<f64>> {
    let mut host = None;
    let mut hosted = vec![0.0; values.len()];
    for i in (0..values.len()).rev() {
        if isolated[i] != 0.0 {
            host = Some(values[i]);
        }
        hosted[i] = host.ok_or_else(|| Error::OutOfRange {
            quantity: "nodeIsIsolated".into(),
            reason: format!("galaxy {i} has no isolated host after it"),
        })?;
    }
    Ok(hosted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satellites_take_their_host() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let isolated = [0.0, 0.0, 1.0, 0.0, 1.0];
        let hosted = host_values(&values, &isolated).unwrap();
        assert_eq!(hosted, vec![3.0, 3.0, 3.0, 5.0, 5.0]);
    }

    #[test]
    fn trailing_satellites_are_an_error() {
        let values = [1.0, 2.0];
        let isolated = [1.0, 0.0];
        assert!(matches!(
            host_values(&values, &isolated),
            Err(Error::OutOfRange { .. })
        ));
    }
}
