// crate modules
use super::{check_lengths, mismatch, sum_components, UNITS_IN_SI};
use crate::error::Result;
use crate::galaxies::Galaxies;
use crate::name::{Kind, PropertyName};
use crate::registry::Property;

// galtools crates
use galtools_data::Dataset;

/// `total<Quantity>` as the sum of the disk and spheroid quantities
#[derive(Debug)]
pub struct Totals;

impl Property for Totals {
    fn kind(&self) -> Kind {
        Kind::Totals
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::Totals { quantity } = name else {
            return Err(mismatch(self.kind(), name));
        };
        let disk = galaxies.require(name, &format!("disk{quantity}"), z)?;
        let spheroid = galaxies.require(name, &format!("spheroid{quantity}"), z)?;
        sum_components(name, disk, spheroid)
    }
}

/// `bulgeToTotal<Quantity>`, NaN where both components are zero
#[derive(Debug)]
pub struct BulgeToTotal;

impl Property for BulgeToTotal {
    fn kind(&self) -> Kind {
        Kind::BulgeToTotal
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::BulgeToTotal { quantity } = name else {
            return Err(mismatch(self.kind(), name));
        };
        let disk = galaxies.require(name, &format!("disk{quantity}"), z)?;
        let spheroid = galaxies.require(name, &format!("spheroid{quantity}"), z)?;
        check_lengths(&[&disk, &spheroid])?;

        let total = &disk.data + &spheroid.data;
        let ratio = &spheroid.data / &total;
        Ok(Dataset::new(name.to_string(), ratio).with_attr(UNITS_IN_SI, 1.0))
    }
}
