//! Spectral energy distributions from top hat luminosities and emission
//! lines

// crate modules
use super::{check_lengths, mismatch, UNITS_IN_SI};
use crate::error::{Error, Result};
use crate::galaxies::Galaxies;
use crate::name::{Frame, Kind, Line, Luminosity, Modifier, Modifiers, PropertyName, Sed, Width};
use crate::registry::Property;

// galtools crates
use galtools_data::Dataset;
use galtools_filters::TopHat;
use galtools_utils::constants::{
    ANGSTROM, CENTI, ERG, JANSKY, LUMINOSITY_AB, LUMINOSITY_SOLAR, MEGA_PARSEC, MICRO, PI,
    PLANCKS_CONSTANT, SPEED_OF_LIGHT,
};
use galtools_utils::{arange, Bounds, Interp1d};

// external crates
use itertools::Itertools;
use log::debug;
use ndarray::{Array2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Spectral energy distribution in µJy on a regular wavelength grid
///
/// Galacticus writes stellar luminosities through narrow adjacent top
/// hats. The continuum is interpolated between their centres, optionally
/// with photon noise, and emission lines are added as Gaussians. The
/// result is one row per galaxy, with the grid in the `wavelength`
/// attribute.
#[derive(Debug)]
pub struct SpectralEnergyDistribution;

impl Property for SpectralEnergyDistribution {
    fn kind(&self) -> Kind {
        Kind::Sed
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        let PropertyName::Sed(sed) = name else {
            return Err(mismatch(self.kind(), name));
        };
        let [lo, hi, resolution] = sed.range.clone().map(|n| n.value());
        if !(lo < hi && resolution > 0.0) {
            return Err(Error::InvalidName {
                name: name.to_string(),
                reason: format!("wavelength range {lo} to {hi} in steps of {resolution}"),
            });
        }
        let wavelengths = arange(lo, hi + resolution, resolution)?;

        let mut sed_values = continuum(galaxies, name, sed, &wavelengths, z)?;
        if let Some(snr) = sed.modifiers.snr() {
            galaxies.with_rng(|rng| add_noise(&mut sed_values, &wavelengths, snr.value(), rng));
        }

        let redshift = galaxies.require(name, "redshift", z)?;
        if redshift.len() != sed_values.nrows() {
            return Err(Error::LengthMismatch {
                name: redshift.name.clone(),
                expected: sed_values.nrows(),
                found: redshift.len(),
            });
        }
        let redshift = redshift.to_vec()?;

        if !sed.modifiers.no_lines() {
            add_lines(galaxies, name, sed, &wavelengths, &redshift, &mut sed_values, z)?;
        }

        let correction = galaxies.settings().spectral_energy_distribution.zero_correction;
        let cosmology = galaxies.cosmology()?;
        for (mut row, z) in sed_values.axis_iter_mut(Axis(0)).zip(&redshift) {
            // comoving distance in cm
            let distance = cosmology.comoving_distance(*z) * MEGA_PARSEC / CENTI;
            let area = 4.0 * PI * distance.powi(2);
            row.mapv_inplace(|l| (l + correction) * LUMINOSITY_AB / ERG / area / JANSKY / MICRO);
        }

        Ok(Dataset::new(name.to_string(), sed_values.into_dyn())
            .with_attr(UNITS_IN_SI, JANSKY * MICRO * ERG / CENTI.powi(2))
            .with_attr("wavelength", wavelengths))
    }
}

/// Modifiers that carry over from the distribution to its ingredients
fn ingredient_modifiers(modifiers: &Modifiers) -> Modifiers {
    modifiers.filtered(|m| matches!(m, Modifier::Recent | Modifier::Dust(_)))
}

/// Top hats of the output covering `[lo, hi]`, sorted by centre
///
/// The top hat just beyond each end of the range is kept so that the
/// whole range can be interpolated.
fn select_top_hats(names: &[String], lo: f64, hi: f64) -> Result<Vec<(String, f64)>> {
    let top_hats = names
        .iter()
        .filter(|name| name.starts_with("adaptiveResolutionTopHat"))
        .map(|name| Ok((name.clone(), TopHat::parse(name)?.center())))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .sorted_by(|a, b| a.1.total_cmp(&b.1))
        .collect::<Vec<_>>();

    let (Some(first), Some(last)) = (top_hats.first(), top_hats.last()) else {
        return Err(Error::OutOfRange {
            quantity: "spectral energy distribution".into(),
            reason: "no adaptive resolution top hat luminosities in the output".into(),
        });
    };
    if lo < first.1 || hi > last.1 {
        return Err(Error::OutOfRange {
            quantity: "spectral energy distribution".into(),
            reason: format!(
                "{lo} to {hi} Angstroms is outside the top hats, {} to {}",
                first.1, last.1
            ),
        });
    }

    let inside = top_hats
        .iter()
        .positions(|(_, center)| *center >= lo && *center <= hi)
        .collect::<Vec<_>>();
    let last = top_hats.len() - 1;
    let (start, end) = match (inside.first(), inside.last()) {
        (Some(start), Some(end)) => (start.saturating_sub(1), (end + 1).min(last)),
        // the range falls between two neighbouring top hats
        _ => {
            let above = top_hats.iter().position(|(_, c)| *c > hi).unwrap_or(last);
            (above.saturating_sub(1), above)
        }
    };
    Ok(top_hats[start..=end].to_vec())
}

/// Stellar continuum on the wavelength grid, in AB units per galaxy
fn continuum(
    galaxies: &Galaxies,
    name: &PropertyName,
    sed: &Sed,
    wavelengths: &[f64],
    z: f64,
) -> Result<Array2<f64>> {
    let frame = sed.frame.to_string();
    let available = galaxies.output().available_filters(z, Some(&frame))?;
    let [lo, hi, _] = sed.range.clone().map(|n| n.value());
    let top_hats = select_top_hats(&available, lo, hi)?;
    debug!("{} top hats span {lo} to {hi} Angstroms", top_hats.len());

    let mut luminosities = Vec::with_capacity(top_hats.len());
    for (filter, _) in &top_hats {
        let luminosity = Luminosity {
            component: sed.component,
            filter: filter.clone(),
            frame: sed.frame,
            redshift: sed.redshift.clone(),
            modifiers: ingredient_modifiers(&sed.modifiers),
        };
        luminosities.push(galaxies.require(name, &luminosity.to_string(), z)?);
    }
    let n = check_lengths(&luminosities.iter().collect::<Vec<_>>())?;
    let centers = top_hats.iter().map(|(_, c)| *c).collect::<Vec<_>>();

    let columns = luminosities
        .iter()
        .map(|l| l.to_vec())
        .collect::<galtools_data::Result<Vec<_>>>()?;
    let mut values = Array2::zeros((n, wavelengths.len()));
    for (i, mut row) in values.axis_iter_mut(Axis(0)).enumerate() {
        let galaxy = columns.iter().map(|c| c[i]).collect::<Vec<_>>();
        let curve = Interp1d::new(centers.clone(), galaxy, Bounds::Clamp)?;
        for (value, interpolated) in row.iter_mut().zip(curve.eval_many(wavelengths)?) {
            *value = interpolated;
        }
    }
    Ok(values)
}

/// Photon counting noise at a signal to noise ratio
///
/// Bins without light are left untouched.
fn add_noise(continuum: &mut Array2<f64>, wavelengths: &[f64], snr: f64, rng: &mut impl Rng) {
    let energies = wavelengths
        .iter()
        .map(|w| SPEED_OF_LIGHT * PLANCKS_CONSTANT / (w * ANGSTROM))
        .collect::<Vec<_>>();
    for mut row in continuum.axis_iter_mut(Axis(0)) {
        for (value, energy) in row.iter_mut().zip(&energies) {
            let counts = *value * LUMINOSITY_AB / energy;
            if !counts.is_finite() || counts <= 0.0 {
                continue;
            }
            if let Ok(normal) = Normal::new(counts, counts / snr) {
                *value = normal.sample(rng) * energy / LUMINOSITY_AB;
            }
        }
    }
}

/// Gaussian emission lines, in the AB units of the continuum
fn add_lines(
    galaxies: &Galaxies,
    name: &PropertyName,
    sed: &Sed,
    wavelengths: &[f64],
    redshift: &[f64],
    values: &mut Array2<f64>,
    z: f64,
) -> Result<()> {
    let cloudy = galaxies.cloudy()?;
    let width = match sed.modifiers.fixed_width() {
        Some(width) => Width::Fixed(width.clone()),
        None => Width::Dispersion,
    };
    let recent = sed.modifiers.filtered(|m| *m == Modifier::Recent);

    for (line_name, line) in cloudy.lines() {
        let luminosity = PropertyName::LineLuminosity(Line {
            component: sed.component,
            line: line_name.clone(),
            frame: sed.frame,
            filter: None,
            redshift: sed.redshift.clone(),
            modifiers: ingredient_modifiers(&sed.modifiers),
        });
        let fwhm = PropertyName::LineWidth {
            line: line_name.clone(),
            width: width.clone(),
            redshift: sed.redshift.clone(),
            modifiers: recent.clone(),
        };
        let luminosity = galaxies.require(name, &luminosity.to_string(), z)?;
        let fwhm = galaxies.require(name, &fwhm.to_string(), z)?;
        check_lengths(&[&luminosity, &fwhm])?;
        if luminosity.len() != values.nrows() {
            return Err(Error::LengthMismatch {
                name: luminosity.name.clone(),
                expected: values.nrows(),
                found: luminosity.len(),
            });
        }

        let rows = values.axis_iter_mut(Axis(0));
        for (mut row, l, fwhm, z) in itertools::izip!(rows, luminosity.values()?, fwhm.values()?, redshift) {
            let stretch = match sed.frame {
                Frame::Rest => 1.0,
                Frame::Observed => 1.0 + z,
            };
            let profile = Gaussian::from_fwhm(line.wavelength * stretch, fwhm * stretch);
            for (value, wavelength) in row.iter_mut().zip(wavelengths) {
                *value += line_density(*l, profile.density(*wavelength), *wavelength);
            }
        }
    }
    Ok(())
}

/// Line luminosity in L☉ spread per Angstrom, to AB units per Hz
fn line_density(luminosity: f64, density: f64, wavelength: f64) -> f64 {
    let frequency = SPEED_OF_LIGHT / (wavelength * ANGSTROM);
    luminosity * density * wavelength / frequency * LUMINOSITY_SOLAR / LUMINOSITY_AB
}

/// Normalised Gaussian line profile
#[derive(Debug, Clone, Copy)]
struct Gaussian {
    center: f64,
    sigma: f64,
}

impl Gaussian {
    fn from_fwhm(center: f64, fwhm: f64) -> Self {
        let sigma = fwhm / (2.0 * (2.0 * std::f64::consts::LN_2).sqrt());
        Self { center, sigma }
    }

    fn density(&self, x: f64) -> f64 {
        if self.sigma <= 0.0 || !self.sigma.is_finite() {
            return 0.0;
        }
        let u = (x - self.center) / self.sigma;
        (-0.5 * u * u).exp() / (self.sigma * (2.0 * PI).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn top_hats(centers: &[f64]) -> Vec<String> {
        centers
            .iter()
            .map(|c| format!("adaptiveResolutionTopHat_{c:.1}_100.0"))
            .chain(["SDSS_r".to_string()])
            .collect()
    }

    #[test]
    fn one_extra_top_hat_at_each_edge() {
        let names = top_hats(&[4000.0, 3000.0, 5000.0, 6000.0, 7000.0]);
        let selected = select_top_hats(&names, 4500.0, 5500.0).unwrap();
        let centers = selected.iter().map(|(_, c)| *c).collect::<Vec<_>>();
        assert_eq!(centers, vec![4000.0, 5000.0, 6000.0]);
    }

    #[test]
    fn edges_are_not_extended_past_the_ends() {
        let names = top_hats(&[3000.0, 4000.0, 5000.0]);
        let selected = select_top_hats(&names, 3000.0, 4000.0).unwrap();
        let centers = selected.iter().map(|(_, c)| *c).collect::<Vec<_>>();
        assert_eq!(centers, vec![3000.0, 4000.0, 5000.0]);
    }

    #[test]
    fn range_between_neighbours() {
        let names = top_hats(&[3000.0, 4000.0, 5000.0]);
        let selected = select_top_hats(&names, 3200.0, 3800.0).unwrap();
        let centers = selected.iter().map(|(_, c)| *c).collect::<Vec<_>>();
        assert_eq!(centers, vec![3000.0, 4000.0]);
    }

    #[test]
    fn range_outside_top_hats() {
        let names = top_hats(&[3000.0, 4000.0]);
        assert!(matches!(
            select_top_hats(&names, 2000.0, 3500.0),
            Err(Error::OutOfRange { .. })
        ));
        assert!(select_top_hats(&["SDSS_r".to_string()], 1.0, 2.0).is_err());
    }

    #[test]
    fn gaussian_is_normalised() {
        let profile = Gaussian::from_fwhm(6563.0, 10.0);
        let total = arange(6400.0, 6700.0, 0.1)
            .unwrap()
            .iter()
            .map(|x| profile.density(*x) * 0.1)
            .sum::<f64>();
        assert_relative_eq!(total, 1.0, epsilon = 1e-6);
        assert_relative_eq!(
            profile.density(6568.0),
            profile.density(6563.0) / 2.0,
            max_relative = 1e-10
        );
    }

    #[test]
    fn noise_leaves_dark_bins() {
        let mut continuum = Array2::from_shape_vec((1, 3), vec![0.0, 1.0e-20, f64::NAN]).unwrap();
        add_noise(&mut continuum, &[1000.0, 2000.0, 3000.0], 10.0, &mut StdRng::seed_from_u64(3));
        assert_eq!(continuum[[0, 0]], 0.0);
        assert_ne!(continuum[[0, 1]], 1.0e-20);
        assert!(continuum[[0, 2]].is_nan());
    }
}
