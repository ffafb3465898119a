// crate modules
use super::{check_lengths, mismatch, UNITS_IN_SI};
use crate::error::Result;
use crate::galaxies::Galaxies;
use crate::name::{Kind, PropertyName};
use crate::registry::Property;

// galtools crates
use galtools_data::{Dataset, HydrogenGasDensitySettings};
use galtools_utils::constants::{
    ATOMIC_MASS_HYDROGEN, CENTI, MASS_ATOMIC, MASS_FRACTION_HYDROGEN, MASS_SOLAR, MEGA, PARSEC, PI,
};

// external crates
use itertools::izip;

/// Number density of hydrogen in the molecular clouds of a component
///
/// Gas is assumed to sit in clouds of fixed mass whose surface density is
/// at least the critical value. The result is in cm⁻³.
#[derive(Debug)]
pub struct HydrogenGasDensity;

impl Property for HydrogenGasDensity {
    fn kind(&self) -> Kind {
        Kind::HydrogenGasDensity
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::HydrogenGasDensity { component } = name else {
            return Err(mismatch(self.kind(), name));
        };
        let mass = galaxies.require(name, &format!("{component}MassGas"), z)?;
        let radius = galaxies.require(name, &format!("{component}Radius"), z)?;
        check_lengths(&[&mass, &radius])?;

        let settings = &galaxies.settings().hydrogen_gas_density;
        let values = izip!(mass.values()?, radius.values()?)
            .map(|(mass, radius)| number_density(*mass, *radius, settings))
            .collect();

        Ok(Dataset::from_vec(name.to_string(), values)
            .with_attr(UNITS_IN_SI, CENTI.powi(-3))
            .with_attr("massGiantMolecularClouds", settings.mass_gmc)
            .with_attr("criticalSurfaceDensityClouds", settings.surface_density_critical))
    }
}

fn number_density(mass: f64, radius: f64, settings: &HydrogenGasDensitySettings) -> f64 {
    let surface_density_gas = match radius > 0.0 {
        true => mass / (PI * radius.powi(2)) / settings.density_method.divisor(),
        false => 0.0,
    };
    let critical = settings.surface_density_critical;
    let mass_clouds = settings.mass_gmc * critical / surface_density_gas;
    let surface_density_clouds = surface_density_gas.max(critical);

    // M☉/Mpc³ to hydrogen atoms per cm³
    let conversion = (CENTI / (MEGA * PARSEC)).powi(3) * MASS_FRACTION_HYDROGEN * MASS_SOLAR
        / (MASS_ATOMIC * ATOMIC_MASS_HYDROGEN);
    0.75 * PI.sqrt() / mass_clouds.sqrt() * surface_density_clouds.powf(1.5) * conversion
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_components_have_no_hydrogen() {
        let settings = HydrogenGasDensitySettings::default();
        assert_eq!(number_density(1.0e9, 0.0, &settings), 0.0);
        assert_eq!(number_density(0.0, 0.01, &settings), 0.0);
    }

    #[test]
    fn dense_clouds_scale_with_surface_density() {
        let settings = HydrogenGasDensitySettings::default();
        // above the critical density n ∝ Σ^2
        let radius = 1.0e-4;
        let low = number_density(1.0e12, radius, &settings);
        let high = number_density(2.0e12, radius, &settings);
        assert_relative_eq!(high / low, 4.0, max_relative = 1e-10);
    }
}
