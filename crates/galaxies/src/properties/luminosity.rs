// crate modules
use super::dust::{attenuate, Light};
use super::{mismatch, sum_components};
use crate::error::{Error, Result};
use crate::galaxies::Galaxies;
use crate::name::{Component, Kind, Luminosity, PropertyName};
use crate::registry::Property;

// galtools crates
use galtools_data::Dataset;

/// Stellar luminosities the output does not hold directly
///
/// Galacticus writes unattenuated disk and spheroid luminosities. Totals
/// are summed from the components, and dust attenuated luminosities are
/// computed from the unattenuated ones. An unattenuated component
/// luminosity that is not in the output was never computed.
#[derive(Debug)]
pub struct StellarLuminosity;

impl Property for StellarLuminosity {
    fn kind(&self) -> Kind {
        Kind::StellarLuminosity
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::StellarLuminosity(luminosity) = name else {
            return Err(mismatch(self.kind(), name));
        };

        if luminosity.component == Component::Total {
            let component = |component| Luminosity {
                component,
                ..luminosity.clone()
            };
            let disk = galaxies.require(name, &component(Component::Disk).to_string(), z)?;
            let spheroid = galaxies.require(name, &component(Component::Spheroid).to_string(), z)?;
            return sum_components(name, disk, spheroid);
        }

        match luminosity.modifiers.dust() {
            Some(dust) => attenuate(galaxies, name, Light::Stellar(luminosity), dust, z),
            None => Err(Error::FilterNotAvailable {
                filter: luminosity.filter.clone(),
                redshift: z,
            }),
        }
    }
}
