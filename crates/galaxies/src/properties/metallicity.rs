// crate modules
use super::{check_lengths, mismatch, UNITS_IN_SI};
use crate::error::Result;
use crate::galaxies::Galaxies;
use crate::name::{Component, Kind, PropertyName};
use crate::registry::Property;

// galtools crates
use galtools_data::Dataset;
use galtools_utils::constants::{MASS_SOLAR, METALLICITY_SOLAR, PARSEC, PI};

// external crates
use itertools::izip;

/// Gas metallicity as log10(Z/Z☉)
///
/// Galaxies without gas or without metals are NaN. The total component
/// uses the summed gas and metal masses.
#[derive(Debug)]
pub struct Metallicity;

impl Property for Metallicity {
    fn kind(&self) -> Kind {
        Kind::Metallicity
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::Metallicity { component } = name else {
            return Err(mismatch(self.kind(), name));
        };
        let metals = galaxies.require(name, &format!("{component}AbundancesGasMetals"), z)?;
        let mass = galaxies.require(name, &format!("{component}MassGas"), z)?;
        check_lengths(&[&metals, &mass])?;

        let values = izip!(metals.values()?, mass.values()?)
            .map(|(metals, mass)| match *metals == 0.0 || *mass == 0.0 {
                true => f64::NAN,
                false => (metals / mass).log10() - METALLICITY_SOLAR.log10(),
            })
            .collect();
        Ok(Dataset::from_vec(name.to_string(), values))
    }
}

/// Gas or stellar metallicity in solar units
#[derive(Debug)]
pub struct PhaseMetallicity;

impl Property for PhaseMetallicity {
    fn kind(&self) -> Kind {
        Kind::PhaseMetallicity
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::PhaseMetallicity { component, phase } = name else {
            return Err(mismatch(self.kind(), name));
        };
        let phase = phase.name();
        let mass = galaxies.require(name, &format!("{component}Mass{phase}"), z)?;
        let metals = galaxies.require(name, &format!("{component}Abundances{phase}Metals"), z)?;
        check_lengths(&[&mass, &metals])?;

        let correction = galaxies.settings().metals.zero_correction;
        let values = izip!(metals.values()?, mass.values()?)
            .map(|(metals, mass)| {
                let fraction = match *mass > 0.0 {
                    true => metals.max(0.0) / mass,
                    false => 0.0,
                };
                fraction / METALLICITY_SOLAR + correction
            })
            .collect();
        Ok(Dataset::from_vec(name.to_string(), values).with_attr(UNITS_IN_SI, 1.0))
    }
}

/// Surface density of metals in the gas, in M☉/pc²
#[derive(Debug)]
pub struct MetalsGasDensity;

impl Property for MetalsGasDensity {
    fn kind(&self) -> Kind {
        Kind::MetalsGasDensity
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::MetalsGasDensity { component } = name else {
            return Err(mismatch(self.kind(), name));
        };
        let (metals, radius) = metals_and_radius(galaxies, name, *component, z)?;

        let settings = galaxies.settings();
        let divisor = settings.hydrogen_gas_density.density_method.divisor();
        let correction = settings.metals.zero_correction;
        let values = izip!(metals.values()?, radius.values()?)
            .map(|(metals, radius)| {
                // Mpc to pc
                let area = PI * (radius * 1.0e6).powi(2);
                let density = match *radius > 0.0 {
                    true => metals / area,
                    false => 0.0,
                };
                density / divisor + correction
            })
            .collect();
        Ok(Dataset::from_vec(name.to_string(), values)
            .with_attr(UNITS_IN_SI, MASS_SOLAR / PARSEC.powi(2)))
    }
}

/// Gas metal mass and scale radius of a component
pub(super) fn metals_and_radius(
    galaxies: &Galaxies,
    name: &PropertyName,
    component: Component,
    z: f64,
) -> Result<(Dataset, Dataset)> {
    let metals = galaxies.require(name, &format!("{component}AbundancesGasMetals"), z)?;
    let radius = galaxies.require(name, &format!("{component}Radius"), z)?;
    check_lengths(&[&metals, &radius])?;
    Ok((metals, radius))
}
