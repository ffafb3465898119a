//! Dust optical depths, attenuation of stellar and line light, and the
//! dust parameters inferred from it

// crate modules
use super::geometry::inclination_degrees;
use super::metallicity::metals_and_radius;
use super::{check_lengths, mismatch, UNITS_IN_SI};
use crate::error::{Error, Result};
use crate::galaxies::Galaxies;
use crate::name::{
    Component, DustModel, DustParameter, Frame, Kind, Line, Luminosity, Modifier, Modifiers,
    Number, PropertyName, Region, Source,
};
use crate::registry::Property;

// galtools crates
use galtools_data::Dataset;
use galtools_utils::constants::{
    CENTI, MASS_ATOMIC, MASS_FRACTION_HYDROGEN, MASS_SOLAR, MEGA_PARSEC, METALLICITY_SOLAR, MILLI,
    PI,
};

// external crates
use itertools::izip;
use log::trace;
use ndarray::Array1;

/// Central optical depth of a disk or spheroid
///
/// The face-on metal column through the centre, converted to dust with the
/// dust-to-metals ratio of the model and multiplied by its opacity.
#[derive(Debug)]
pub struct DustOpticalDepth;

impl Property for DustOpticalDepth {
    fn kind(&self) -> Kind {
        Kind::DustOpticalDepth
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::DustOpticalDepth { component, model } = name else {
            return Err(mismatch(self.kind(), name));
        };
        let settings = galaxies.settings();
        let (dust_to_metals, opacity) = match model {
            DustModel::Compendium => (
                settings.dust_compendium.dust_to_metals_ratio,
                galaxies.compendium()?.opacity,
            ),
            DustModel::Atlas => (settings.dust_optical_depth.dust_to_metals_ratio, atlas_opacity()),
            _ => return Err(mismatch(self.kind(), name)),
        };
        let (metals, radius) = metals_and_radius(galaxies, name, *component, z)?;

        // M☉/Mpc² to g/cm²
        let conversion = dust_to_metals * (MASS_SOLAR / MILLI) * (CENTI / MEGA_PARSEC).powi(2);
        let values = izip!(metals.values()?, radius.values()?)
            .map(|(metals, radius)| match *radius <= 0.0 || *metals < 0.0 {
                true => f64::NAN,
                false => metals / (2.0 * PI * radius.powi(2)) * conversion * opacity,
            })
            .collect();
        Ok(Dataset::from_vec(name.to_string(), values).with_attr(UNITS_IN_SI, 1.0))
    }
}

/// Opacity of the dust in Galacticus' own attenuation model, cm² per gram
/// of metals
fn atlas_opacity() -> f64 {
    let magnitudes_to_depth = 2.5 * std::f64::consts::LOG10_E;
    let extinction_per_column = 3.1 / magnitudes_to_depth / 5.8e21;
    extinction_per_column * (MASS_FRACTION_HYDROGEN / (MASS_ATOMIC / MILLI)) / 0.02
}

/// Birth cloud or ISM optical depth of the Charlot & Fall model
#[derive(Debug)]
pub struct CharlotFallOpticalDepth;

impl Property for CharlotFallOpticalDepth {
    fn kind(&self) -> Kind {
        Kind::CharlotFallOpticalDepth
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::CharlotFallOpticalDepth(depth) = name else {
            return Err(mismatch(self.kind(), name));
        };
        let wavelength = match &depth.source {
            Source::Stellar { filter } => galaxies.filter(filter)?.effective_wavelength,
            Source::Line { line, .. } => galaxies.cloudy()?.wavelength(line)?,
        };
        let (clouds, ism) = charlot_fall_depths(galaxies, name, depth.component, wavelength, z)?;
        let values = match depth.region {
            Region::Clouds => clouds,
            Region::Ism => ism,
        };
        Ok(Dataset::from_vec(name.to_string(), values).with_attr(UNITS_IN_SI, 1.0))
    }
}

/// `A_V` and `R_V` from attenuated and unattenuated V and B luminosities
#[derive(Debug)]
pub struct DustParameters;

impl Property for DustParameters {
    fn kind(&self) -> Kind {
        Kind::DustParameter
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::DustParameter {
            component,
            redshift,
            dust,
            parameter,
        } = name
        else {
            return Err(mismatch(self.kind(), name));
        };
        let band = |filter: &str, attenuated: bool| {
            let modifiers = match attenuated {
                true => Modifiers::new(vec![Modifier::Dust(dust.clone())]),
                false => Modifiers::default(),
            };
            Luminosity {
                component: *component,
                filter: filter.to_string(),
                frame: Frame::Rest,
                redshift: redshift.clone(),
                modifiers,
            }
            .to_string()
        };

        let av = band_attenuation(galaxies, name, &band("V", true), &band("V", false), z)?;
        let values = match parameter {
            DustParameter::Av => av,
            DustParameter::Rv => {
                let ab = band_attenuation(galaxies, name, &band("B", true), &band("B", false), z)?;
                if ab.len() != av.len() {
                    return Err(Error::LengthMismatch {
                        name: band("B", false),
                        expected: av.len(),
                        found: ab.len(),
                    });
                }
                izip!(av, ab)
                    .map(|(av, ab)| {
                        let excess = ab - av;
                        match excess != 0.0 {
                            true => av / excess,
                            false => 0.0,
                        }
                    })
                    .collect()
            }
        };
        Ok(Dataset::from_vec(name.to_string(), values).with_attr(UNITS_IN_SI, 1.0))
    }
}

/// Attenuation in magnitudes, zero where there is no unattenuated light
fn band_attenuation(
    galaxies: &Galaxies,
    name: &PropertyName,
    attenuated: &str,
    unattenuated: &str,
    z: f64,
) -> Result<Vec<f64>> {
    let attenuated = galaxies.require(name, attenuated, z)?;
    let unattenuated = galaxies.require(name, unattenuated, z)?;
    check_lengths(&[&attenuated, &unattenuated])?;
    Ok(izip!(attenuated.values()?, unattenuated.values()?)
        .map(|(attenuated, unattenuated)| match *unattenuated > 0.0 {
            true => -2.5 * (attenuated / unattenuated).log10(),
            false => 0.0,
        })
        .collect())
}

/// Light that dust models attenuate
#[derive(Debug, Clone, Copy)]
pub(super) enum Light<'a> {
    Stellar(&'a Luminosity),
    Line(&'a Line),
}

impl Light<'_> {
    fn component(&self) -> Component {
        match self {
            Self::Stellar(luminosity) => luminosity.component,
            Self::Line(line) => line.component,
        }
    }

    fn redshift(&self) -> &Number {
        match self {
            Self::Stellar(luminosity) => &luminosity.redshift,
            Self::Line(line) => &line.redshift,
        }
    }

    /// Name of the same light before attenuation
    fn unattenuated(&self, modifiers: impl Fn(&Modifiers) -> Modifiers) -> String {
        match self {
            Self::Stellar(luminosity) => Luminosity {
                modifiers: modifiers(&luminosity.modifiers),
                ..(*luminosity).clone()
            }
            .to_string(),
            Self::Line(line) => PropertyName::LineLuminosity(Line {
                modifiers: modifiers(&line.modifiers),
                ..(*line).clone()
            })
            .to_string(),
        }
    }

    fn recent(&self) -> bool {
        match self {
            Self::Stellar(luminosity) => luminosity.modifiers.recent(),
            Self::Line(line) => line.modifiers.recent(),
        }
    }

    /// Rest frame wavelength the dust sees, in Angstroms
    ///
    /// Observed frame filters are shifted back to the rest frame of the
    /// redshift label.
    fn wavelength(&self, galaxies: &Galaxies) -> Result<f64> {
        match self {
            Self::Stellar(luminosity) => {
                let effective = galaxies.filter(&luminosity.filter)?.effective_wavelength;
                Ok(match luminosity.frame {
                    Frame::Rest => effective,
                    Frame::Observed => effective / (1.0 + luminosity.redshift.value()),
                })
            }
            Self::Line(line) => Ok(galaxies.cloudy()?.wavelength(&line.line)?),
        }
    }
}

/// Apply a dust model to stellar or line light
///
/// Models that Galacticus computes itself are only ever read from the
/// output, so asking to derive them means the output lacks them.
pub(super) fn attenuate(
    galaxies: &Galaxies,
    name: &PropertyName,
    light: Light<'_>,
    dust: &DustModel,
    z: f64,
) -> Result<Dataset> {
    let component = light.component();
    if component == Component::Total {
        return Err(mismatch(name.kind(), name));
    }
    trace!("Attenuating {} with {dust}", light.unattenuated(Modifiers::without_dust));

    let (data, attrs) = match dust {
        DustModel::Atlas => {
            return Err(Error::MissingDependency {
                property: name.to_string(),
                dependency: name.to_string(),
            })
        }
        DustModel::Compendium => {
            let unattenuated = galaxies.require(name, &light.unattenuated(Modifiers::without_dust), z)?;
            let wavelength = light.wavelength(galaxies)? * 1.0e-4;
            let attenuation = compendium_attenuation(galaxies, name, component, wavelength, z)?;
            (scale(&unattenuated, &attenuation)?, unattenuated.attrs)
        }
        DustModel::Screen { law, av } => {
            let unattenuated = galaxies.require(name, &light.unattenuated(Modifiers::without_dust), z)?;
            let n = unattenuated.len();
            let av = match av {
                Some(av) => vec![av.value(); n],
                None => {
                    let compendium = PropertyName::DustParameter {
                        component,
                        redshift: light.redshift().clone(),
                        dust: DustModel::Compendium,
                        parameter: DustParameter::Av,
                    };
                    galaxies.require(name, &compendium.to_string(), z)?.to_vec()?
                }
            };
            let rv = law.rv(&galaxies.settings().screens);
            let curve = law.curve(rv)?;
            let wavelength = light.wavelength(galaxies)? * 1.0e-4;
            let attenuation = av
                .iter()
                .map(|av| curve.attenuation(wavelength, *av))
                .collect::<Vec<_>>();
            let mut attrs = unattenuated.attrs.clone();
            attrs.insert("Rv".into(), rv.into());
            (scale(&unattenuated, &attenuation)?, attrs)
        }
        DustModel::CharlotFall => {
            let wavelength = light.wavelength(galaxies)?;
            let (clouds, ism) = charlot_fall_depths(galaxies, name, component, wavelength, z)?;
            charlot_fall(galaxies, name, light, &clouds, &ism, z)?
        }
    };
    Ok(Dataset::new(name.to_string(), data).with_attrs(attrs))
}

/// Multiply a dataset galaxy by galaxy
fn scale(dataset: &Dataset, factors: &[f64]) -> Result<ndarray::ArrayD<f64>> {
    if dataset.len() != factors.len() {
        return Err(Error::LengthMismatch {
            name: dataset.name.clone(),
            expected: factors.len(),
            found: dataset.len(),
        });
    }
    let factors = Array1::from_vec(factors.to_vec());
    Ok((&dataset.values()? * &factors).into_dyn())
}

/// Light escaping the birth clouds and then the diffuse ISM
///
/// Only young stars sit in birth clouds, so the old stellar light is
/// attenuated by the ISM alone. Line emission comes from the clouds.
fn charlot_fall(
    galaxies: &Galaxies,
    name: &PropertyName,
    light: Light<'_>,
    clouds: &[f64],
    ism: &[f64],
    z: f64,
) -> Result<(ndarray::ArrayD<f64>, galtools_data::Attributes)> {
    let both = izip!(clouds, ism)
        .map(|(clouds, ism)| (-clouds).exp() * (-ism).exp())
        .collect::<Vec<_>>();

    match light {
        Light::Line(_) => {
            let luminosity = galaxies.require(name, &light.unattenuated(Modifiers::without_dust), z)?;
            Ok((scale(&luminosity, &both)?, luminosity.attrs))
        }
        Light::Stellar(_) if light.recent() => {
            let recent = galaxies.require(name, &light.unattenuated(Modifiers::without_dust), z)?;
            Ok((scale(&recent, &both)?, recent.attrs))
        }
        Light::Stellar(_) => {
            let all = galaxies.require(name, &light.unattenuated(Modifiers::without_dust), z)?;
            let recent = galaxies.require(
                name,
                &light.unattenuated(|m| m.without_dust().with_recent()),
                z,
            )?;
            check_lengths(&[&all, &recent])?;
            if clouds.len() != all.len() {
                return Err(Error::LengthMismatch {
                    name: all.name.clone(),
                    expected: clouds.len(),
                    found: all.len(),
                });
            }
            let values = izip!(all.values()?, recent.values()?, clouds, ism)
                .map(|(all, recent, clouds, ism)| {
                    ((all - recent) + recent * (-clouds).exp()) * (-ism).exp()
                })
                .collect::<Vec<_>>();
            Ok((Array1::from_vec(values).into_dyn(), all.attrs))
        }
    }
}

/// Birth cloud and ISM optical depths at a rest wavelength in Angstroms
pub(super) fn charlot_fall_depths(
    galaxies: &Galaxies,
    name: &PropertyName,
    component: Component,
    wavelength: f64,
    z: f64,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let settings = galaxies.settings();
    let model = &settings.dust_charlot_fall;
    let scaling = (wavelength / model.wavelength_zero_point).powf(-model.wavelength_exponent);

    let central = galaxies.require(name, &format!("{component}DustOpticalDepthCentral:dustAtlas"), z)?;
    let metallicity = galaxies.require(name, &format!("{component}GasMetallicity"), z)?;
    check_lengths(&[&central, &metallicity])?;

    let local = settings.dust_optical_depth.local_ism_metallicity;
    let clouds = metallicity
        .values()?
        .iter()
        .map(|z| model.optical_depth_clouds_factor * z * METALLICITY_SOLAR / local * scaling)
        .collect();
    let ism = central
        .values()?
        .iter()
        .map(|tau| model.optical_depth_ism_factor * tau * scaling)
        .collect();
    Ok((clouds, ism))
}

/// Attenuation from the compendium at a wavelength in microns
///
/// Galaxies with no optical depth, and spheroids without a size, are left
/// unattenuated.
fn compendium_attenuation(
    galaxies: &Galaxies,
    name: &PropertyName,
    component: Component,
    wavelength: f64,
    z: f64,
) -> Result<Vec<f64>> {
    let Some(table_component) = component.dust() else {
        return Err(mismatch(name.kind(), name));
    };
    let depth = galaxies.require(name, "diskDustOpticalDepthCentral:dustCompendium", z)?;
    let inclination = inclination_degrees(galaxies, name, z)?;
    let disk_radius = galaxies.require(name, "diskRadius", z)?;
    let n = check_lengths(&[&depth, &inclination, &disk_radius])?;

    let wavelengths = vec![wavelength; n];
    let depth = depth.to_vec()?;
    let inclination = inclination.to_vec()?;
    let mut mask = izip!(&depth, disk_radius.values()?)
        .map(|(tau, radius)| !tau.is_nan() && *radius > 0.0)
        .collect::<Vec<_>>();

    let scale = match component {
        Component::Spheroid => {
            let spheroid_radius = galaxies.require(name, "spheroidRadius", z)?;
            check_lengths(&[&disk_radius, &spheroid_radius])?;
            let scale = izip!(spheroid_radius.values()?, disk_radius.values()?)
                .map(|(spheroid, disk)| spheroid / disk)
                .collect::<Vec<_>>();
            for (m, r) in mask.iter_mut().zip(spheroid_radius.values()?) {
                *m &= *r > 0.0;
            }
            Some(scale)
        }
        _ => None,
    };
    let mut columns = vec![wavelengths.as_slice(), inclination.as_slice(), depth.as_slice()];
    if let Some(scale) = &scale {
        columns.push(scale.as_slice());
    }

    let table = galaxies.compendium()?;
    table.check_ranges(table_component, &columns, Some(mask.as_slice()))?;
    Ok(table.interpolate(table_component, &columns, Some(mask.as_slice()))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn atlas_opacity_is_per_gram_of_metals() {
        // A_V/N_H of 3.1/5.8e21 mag cm², as optical depth per gram of metals
        let per_hydrogen = 3.1 / (2.5 * std::f64::consts::LOG10_E) / 5.8e21;
        let hydrogen_per_gram = MASS_FRACTION_HYDROGEN / (MASS_ATOMIC / MILLI);
        assert_relative_eq!(atlas_opacity(), per_hydrogen * hydrogen_per_gram / 0.02);
        assert!(atlas_opacity() > 1.0e4 && atlas_opacity() < 1.0e5);
    }

    #[test]
    fn scaling_checks_lengths() {
        let dataset = Dataset::from_vec("L", vec![2.0, 4.0]);
        assert_eq!(scale(&dataset, &[0.5, 0.25]).unwrap().into_raw_vec(), vec![1.0, 1.0]);
        assert!(matches!(scale(&dataset, &[1.0]), Err(Error::LengthMismatch { .. })));
    }
}
