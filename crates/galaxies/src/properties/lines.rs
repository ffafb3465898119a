//! Emission lines from HII regions, their fluxes and widths

// crate modules
use super::dust::{attenuate, Light};
use super::geometry::inclination_radians;
use super::{check_lengths, mismatch, sum_components, units_in_si, UNITS_IN_SI};
use crate::error::Result;
use crate::galaxies::Galaxies;
use crate::name::{Component, Frame, Kind, Line, Modifier, PropertyName, Species, Width};
use crate::registry::Property;

// galtools crates
use galtools_data::{Dataset, VelocityDispersionSettings};
use galtools_utils::constants::{
    ANGSTROM, ATOMIC_MASS_HYDROGEN, CENTI, ERG, KILO, LUMINOSITY_AB, LUMINOSITY_SOLAR,
    MASS_ATOMIC, MASS_FRACTION_HYDROGEN, MASS_SOLAR, MEGA, MEGA_PARSEC, PARSEC, PI,
    SPEED_OF_LIGHT,
};

// external crates
use itertools::izip;
use log::debug;

/// Luminosity of an emission line in L☉
///
/// Each component is treated as a population of identical HII regions,
/// their number set by the star formation rate. Line luminosities per
/// region come from the CLOUDY table.
///
/// Through a filter the luminosity is instead in AB units, the line
/// weighted by the transmission at its (redshifted) wavelength.
#[derive(Debug)]
pub struct LineLuminosity;

impl Property for LineLuminosity {
    fn kind(&self) -> Kind {
        Kind::LineLuminosity
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::LineLuminosity(line) = name else {
            return Err(mismatch(self.kind(), name));
        };

        if line.component == Component::Total {
            let component = |component| {
                PropertyName::LineLuminosity(Line {
                    component,
                    ..line.clone()
                })
                .to_string()
            };
            let disk = galaxies.require(name, &component(Component::Disk), z)?;
            let spheroid = galaxies.require(name, &component(Component::Spheroid), z)?;
            return sum_components(name, disk, spheroid);
        }
        if let Some(dust) = line.modifiers.dust() {
            return attenuate(galaxies, name, Light::Line(line), dust, z);
        }

        let luminosity = hii_region_luminosity(galaxies, name, line, z)?;
        let emission = &galaxies.settings().emission_line;
        let Some(filter) = &line.filter else {
            return Ok(Dataset::from_vec(name.to_string(), luminosity)
                .with_attr(UNITS_IN_SI, LUMINOSITY_SOLAR)
                .with_attr("massHIIRegion", emission.mass_hii_region)
                .with_attr("lifetimeHIIRegion", emission.lifetime_hii_region));
        };

        let multiplier = filter_multiplier(galaxies, name, line, filter, luminosity.len(), z)?;
        let values = izip!(luminosity, multiplier).map(|(l, m)| l * m).collect();
        Ok(Dataset::from_vec(name.to_string(), values)
            .with_attr(UNITS_IN_SI, LUMINOSITY_AB)
            .with_attr("filter", filter.as_str())
            .with_attr("massHIIRegion", emission.mass_hii_region)
            .with_attr("lifetimeHIIRegion", emission.lifetime_hii_region))
    }
}

/// Line luminosity of a disk or spheroid, before dust and filters
///
/// Galaxies with no star formation or no gas fall outside every CLOUDY
/// interpolant and emit nothing.
fn hii_region_luminosity(
    galaxies: &Galaxies,
    name: &PropertyName,
    line: &Line,
    z: f64,
) -> Result<Vec<f64>> {
    let component = line.component;
    let metallicity = galaxies.require(name, &format!("{component}Metallicity"), z)?;
    let mass = galaxies.require(name, &format!("{component}MassGas"), z)?;
    let radius = galaxies.require(name, &format!("{component}Radius"), z)?;
    let rate = galaxies.require(name, &format!("{component}StarFormationRate"), z)?;

    let continuum = |species| {
        let continuum = PropertyName::IonizingContinuum {
            component,
            species,
            redshift: line.redshift.clone(),
            modifiers: line.modifiers.filtered(|m| *m == Modifier::Recent),
        };
        galaxies.require(name, &continuum.to_string(), z)
    };
    let lyman = continuum(Species::Lyman)?;
    let helium = continuum(Species::Helium)?;
    let oxygen = continuum(Species::Oxygen)?;
    let n = check_lengths(&[&metallicity, &mass, &radius, &rate, &lyman, &helium, &oxygen])?;

    let emission = &galaxies.settings().emission_line;
    let regions = rate
        .values()?
        .iter()
        .map(|rate| rate * emission.lifetime_hii_region / emission.mass_hii_region)
        .collect::<Vec<_>>();

    let density = izip!(mass.values()?, radius.values()?)
        .map(|(mass, radius)| log_density(*mass, *radius))
        .collect::<Vec<_>>();
    let hydrogen = izip!(lyman.values()?, &regions)
        .map(|(q, regions)| q.log10() + 50.0 - regions.log10())
        .collect::<Vec<_>>();
    let ratio = |other: &Dataset| -> Result<Vec<f64>> {
        Ok(izip!(other.values()?, lyman.values()?)
            .map(|(q, lyman)| (q / lyman).log10())
            .collect())
    };
    let helium = ratio(&helium)?;
    let oxygen = ratio(&oxygen)?;
    let metallicity = metallicity.to_vec()?;

    let columns = [&metallicity, &density, &hydrogen, &helium, &oxygen];
    let emitting = (0..n)
        .filter(|i| columns.iter().all(|c| c[*i].is_finite()))
        .collect::<Vec<_>>();
    debug!("{} of {n} galaxies emit {}", emitting.len(), line.line);

    let selected = columns.map(|c| emitting.iter().map(|i| c[*i]).collect::<Vec<_>>());
    let interpolated = galaxies
        .cloudy()?
        .interpolate_many(&line.line, selected.each_ref().map(Vec::as_slice))?;

    let mut luminosity = vec![0.0; n];
    for (i, l) in izip!(emitting, interpolated) {
        luminosity[i] = l * regions[i] * ERG / LUMINOSITY_SOLAR;
    }
    Ok(luminosity)
}

/// log10 of the mean hydrogen number density in cm⁻³
fn log_density(mass: f64, radius: f64) -> f64 {
    if mass <= 0.0 || radius <= 0.0 {
        return f64::NAN;
    }
    let volume = (radius * MEGA * PARSEC / CENTI).powi(3);
    let hydrogen = mass * MASS_SOLAR * MASS_FRACTION_HYDROGEN;
    (hydrogen / volume / (4.0 * PI * MASS_ATOMIC * ATOMIC_MASS_HYDROGEN)).log10()
}

/// Line luminosity in L☉ to AB units of a filter
fn filter_multiplier(
    galaxies: &Galaxies,
    name: &PropertyName,
    line: &Line,
    filter: &str,
    n: usize,
    z: f64,
) -> Result<Vec<f64>> {
    let filter = galaxies.filter(filter)?;
    let wavelength = galaxies.cloudy()?.wavelength(&line.line)?;
    let normalisation = LUMINOSITY_SOLAR / filter.luminosity_ab(10)?;

    match line.frame {
        Frame::Rest => Ok(vec![filter.transmission_at(wavelength) * normalisation; n]),
        Frame::Observed => {
            let redshift = galaxies.require(name, "redshift", z)?;
            Ok(redshift
                .values()?
                .iter()
                .map(|z| filter.transmission_at(wavelength * (1.0 + z)) * normalisation / (1.0 + z))
                .collect())
        }
    }
}

/// Line flux at the observer, luminosity over 4π d_L²
#[derive(Debug)]
pub struct LineFlux;

impl Property for LineFlux {
    fn kind(&self) -> Kind {
        Kind::LineFlux
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::LineFlux(line) = name else {
            return Err(mismatch(self.kind(), name));
        };
        let luminosity = PropertyName::LineLuminosity(line.clone());
        let luminosity = galaxies.require(name, &luminosity.to_string(), z)?;
        let redshift = galaxies.require(name, "redshift", z)?;
        check_lengths(&[&luminosity, &redshift])?;

        let cosmology = galaxies.cosmology()?;
        let values = izip!(luminosity.values()?, redshift.values()?)
            .map(|(l, z)| l / (4.0 * PI * cosmology.luminosity_distance(*z).powi(2)))
            .collect();
        let mut attrs = luminosity.attrs.clone();
        attrs.insert(UNITS_IN_SI.into(), (units_in_si(&luminosity) / MEGA_PARSEC.powi(2)).into());
        Ok(Dataset::from_vec(name.to_string(), values).with_attrs(attrs))
    }
}

/// Full width at half maximum of a line, in Angstroms
#[derive(Debug)]
pub struct LineWidth;

impl Property for LineWidth {
    fn kind(&self) -> Kind {
        Kind::LineWidth
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::LineWidth { line, width, .. } = name else {
            return Err(mismatch(self.kind(), name));
        };
        let rest = galaxies.cloudy()?.wavelength(line)?;
        let velocity = match width {
            Width::Fixed(width) => vec![width.value(); galaxies.count(z)?],
            Width::Dispersion => velocity_dispersion(galaxies, name, z)?,
        };

        let speed_of_light = SPEED_OF_LIGHT / KILO;
        let values = velocity.iter().map(|v| rest * v / speed_of_light).collect();
        Ok(Dataset::from_vec(name.to_string(), values).with_attr(UNITS_IN_SI, ANGSTROM))
    }
}

/// Approximate line of sight velocity dispersion in km/s
fn velocity_dispersion(galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Vec<f64>> {
    let disk_stars = galaxies.require(name, "diskMassStellar", z)?;
    let disk_gas = galaxies.require(name, "diskMassGas", z)?;
    let spheroid_stars = galaxies.require(name, "spheroidMassStellar", z)?;
    let spheroid_gas = galaxies.require(name, "spheroidMassGas", z)?;
    let disk_velocity = galaxies.require(name, "diskVelocity", z)?;
    let spheroid_velocity = galaxies.require(name, "spheroidVelocity", z)?;
    let inclination = inclination_radians(galaxies, name, z)?;
    check_lengths(&[
        &disk_stars,
        &disk_gas,
        &spheroid_stars,
        &spheroid_gas,
        &disk_velocity,
        &spheroid_velocity,
        &inclination,
    ])?;

    let settings = &galaxies.settings().velocity_dispersion;
    Ok(izip!(
        izip!(disk_stars.values()?, disk_gas.values()?),
        izip!(spheroid_stars.values()?, spheroid_gas.values()?),
        disk_velocity.values()?,
        spheroid_velocity.values()?,
        inclination.values()?
    )
    .map(|((ds, dg), (ss, sg), vd, vs, i)| {
        let disk = ds + dg;
        let spheroid = ss + sg;
        dispersion(disk, spheroid, *vd, *vs, *i, settings)
    })
    .collect())
}

/// Disk dominated galaxies are seen through their rotation, spheroids
/// through their own velocity dispersion
fn dispersion(
    disk_mass: f64,
    spheroid_mass: f64,
    disk_velocity: f64,
    spheroid_velocity: f64,
    inclination: f64,
    settings: &VelocityDispersionSettings,
) -> f64 {
    let total = disk_mass + spheroid_mass;
    if total == 0.0 {
        return settings.min_velocity_dispersion;
    }
    match spheroid_mass / total < 0.5 {
        true => {
            let projection = inclination.sin().powi(2)
                + (settings.scale_velocity_ratio * inclination.cos()).powi(2);
            disk_velocity * projection.sqrt()
        }
        false => spheroid_velocity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_galaxies_have_the_minimum_dispersion() {
        let settings = VelocityDispersionSettings::default();
        let v = dispersion(0.0, 0.0, 200.0, 100.0, 0.3, &settings);
        assert_eq!(v, settings.min_velocity_dispersion);
    }

    #[test]
    fn disks_are_projected() {
        let settings = VelocityDispersionSettings::default();
        let edge_on = dispersion(9.0, 1.0, 200.0, 100.0, PI / 2.0, &settings);
        let face_on = dispersion(9.0, 1.0, 200.0, 100.0, 0.0, &settings);
        assert_relative_eq!(edge_on, 200.0, epsilon = 1e-10);
        assert_relative_eq!(face_on, 200.0 * settings.scale_velocity_ratio, epsilon = 1e-10);
    }

    #[test]
    fn bulges_use_their_own_velocity() {
        let settings = VelocityDispersionSettings::default();
        assert_eq!(dispersion(1.0, 1.0, 200.0, 100.0, 0.7, &settings), 100.0);
    }

    #[test]
    fn density_needs_gas_and_size() {
        assert!(log_density(0.0, 1.0e-3).is_nan());
        assert!(log_density(1.0e9, 0.0).is_nan());
        // eight times the volume, an eighth of the density
        let small = log_density(1.0e9, 1.0e-3);
        let large = log_density(1.0e9, 2.0e-3);
        assert_relative_eq!(small - large, 8f64.log10(), epsilon = 1e-10);
    }
}
