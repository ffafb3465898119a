// crate modules
use super::{check_lengths, mismatch, UNITS_IN_SI};
use crate::error::{Error, Result};
use crate::galaxies::Galaxies;
use crate::name::{Kind, MagnitudeSystem, PropertyName};
use crate::registry::Property;

// galtools crates
use galtools_data::Dataset;

// external crates
use itertools::izip;

/// AB or Vega magnitudes from stellar luminosities
///
/// Absolute magnitudes come straight from the luminosity. Apparent
/// magnitudes add the band corrected distance modulus at the redshift of
/// each galaxy. Only filters that Galacticus computed luminosities for can
/// be used, whatever the dust and recent modifiers.
#[derive(Debug)]
pub struct Magnitude;

impl Property for Magnitude {
    fn kind(&self) -> Kind {
        Kind::Magnitude
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::Magnitude(magnitude) = name else {
            return Err(mismatch(self.kind(), name));
        };

        let frame = magnitude.frame.to_string();
        let available = galaxies.output().available_filters(z, Some(&frame))?;
        if !available.contains(&magnitude.filter) {
            return Err(Error::FilterNotAvailable {
                filter: magnitude.filter.clone(),
                redshift: galaxies.output().nearest_redshift(z)?,
            });
        }

        let offset = match magnitude.modifiers.vega() {
            true => galaxies
                .filter(&magnitude.filter)?
                .vega_offset
                .ok_or_else(|| Error::NoVegaOffset(magnitude.filter.clone()))?,
            false => 0.0,
        };

        let luminosity = magnitude.luminosity().to_string();
        let luminosity = galaxies.require(name, &luminosity, z)?;
        let correction = galaxies.settings().magnitude.zero_correction;
        let mut values = luminosity
            .values()?
            .iter()
            .map(|l| absolute(*l, correction) + offset)
            .collect::<Vec<_>>();

        if magnitude.system == MagnitudeSystem::Apparent {
            let redshift = galaxies.require(name, "redshift", z)?;
            check_lengths(&[&luminosity, &redshift])?;
            let cosmology = galaxies.cosmology()?;
            for (m, z) in izip!(&mut values, redshift.values()?) {
                *m += cosmology.band_corrected_distance_modulus(*z);
            }
        }

        let system = match magnitude.modifiers.vega() {
            true => "vega",
            false => "AB",
        };
        Ok(Dataset::from_vec(name.to_string(), values)
            .with_attr(UNITS_IN_SI, 1.0)
            .with_attr("system", system))
    }
}

/// −2.5 log10 of a luminosity in AB units, kept finite for dark galaxies
fn absolute(luminosity: f64, correction: f64) -> f64 {
    -2.5 * (luminosity + correction).log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn magnitudes_of_ab_luminosities() {
        assert_relative_eq!(absolute(1.0, 0.0), 0.0);
        assert_relative_eq!(absolute(100.0, 0.0), -5.0);
        assert_relative_eq!(absolute(0.0, 1.0e-40), 100.0, epsilon = 1e-10);
    }
}
