// crate modules
use super::{mismatch, UNITS_IN_SI};
use crate::error::{Error, Result};
use crate::galaxies::Galaxies;
use crate::name::{Frame, Kind, Luminosity, Modifier, PropertyName};
use crate::registry::Property;

// galtools crates
use galtools_data::Dataset;
use galtools_utils::constants::{LUMINOSITY_AB, PLANCKS_CONSTANT};

/// Ionizing photon rate of a component, in units of 1e50 photons/s
///
/// Galacticus integrates the stellar continuum through flat filters below
/// the Lyman, HeII and OII ionisation edges. The AB normalised luminosity
/// becomes a photon rate through the logarithmic width of the filter.
#[derive(Debug)]
pub struct IonizingContinuum;

impl Property for IonizingContinuum {
    fn kind(&self) -> Kind {
        Kind::IonizingContinuum
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::IonizingContinuum {
            component,
            species,
            redshift,
            modifiers,
        } = name
        else {
            return Err(mismatch(self.kind(), name));
        };

        let luminosity = Luminosity {
            component: *component,
            filter: species.filter().to_string(),
            frame: Frame::Rest,
            redshift: redshift.clone(),
            modifiers: modifiers.filtered(|m| *m == Modifier::Recent),
        };
        let luminosity = galaxies.require(name, &luminosity.to_string(), z)?;

        let filter = galaxies.filter(species.filter())?;
        let (min, max) = filter.wavelength_range().ok_or_else(|| Error::OutOfRange {
            quantity: "filter transmission".into(),
            reason: format!("{} never transmits", filter.name),
        })?;

        let factor = LUMINOSITY_AB / PLANCKS_CONSTANT / 1.0e50 * (max / min).ln();
        let data = luminosity.data.mapv(|l| l * factor);
        Ok(Dataset::new(name.to_string(), data).with_attr(UNITS_IN_SI, 1.0e50))
    }
}
