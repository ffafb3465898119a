//! Orientation, redshifts and sky positions of galaxies

// crate modules
use super::{check_lengths, mismatch, UNITS_IN_SI};
use crate::error::{Error, Result};
use crate::galaxies::Galaxies;
use crate::name::{Kind, PropertyName};
use crate::registry::Property;

// galtools crates
use galtools_data::Dataset;
use galtools_utils::constants::{KILO, PI, SPEED_OF_LIGHT};

// external crates
use itertools::izip;
use rand::Rng;

/// Random inclinations of `n` galaxies, isotropic on the sky
///
/// The cosine of the inclination is uniform, so angles lie in [0, π/2].
///
/// ```rust
/// # use galtools_galaxies::random_inclinations;
/// # use rand::{rngs::StdRng, SeedableRng};
/// let mut rng = StdRng::seed_from_u64(42);
/// let angles = random_inclinations(100, true, &mut rng);
/// assert!(angles.iter().all(|i| (0.0..=90.0).contains(i)));
/// ```
pub fn random_inclinations(n: usize, degrees: bool, rng: &mut impl Rng) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let angle = rng.gen::<f64>().acos();
            match degrees {
                true => angle.to_degrees(),
                false => angle,
            }
        })
        .collect()
}

/// Random inclination of the galaxy disk
#[derive(Debug)]
pub struct Inclination;

impl Property for Inclination {
    fn kind(&self) -> Kind {
        Kind::Inclination
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        if *name != PropertyName::Inclination {
            return Err(mismatch(self.kind(), name));
        }
        let inclinations = galaxies.inclinations(z)?;
        let units = match galaxies.settings().inclination.degrees {
            true => "degrees",
            false => "radians",
        };
        Ok(Dataset::from_vec(name.to_string(), inclinations.to_vec()).with_attr("units", units))
    }
}

/// Inclinations in degrees, whatever units the accessor draws them in
pub(super) fn inclination_degrees(galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
    let mut inclination = galaxies.require(name, "inclination", z)?;
    if !galaxies.settings().inclination.degrees {
        inclination.data.mapv_inplace(f64::to_degrees);
    }
    Ok(inclination)
}

/// Inclinations in radians, whatever units the accessor draws them in
pub(super) fn inclination_radians(galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
    let mut inclination = galaxies.require(name, "inclination", z)?;
    if galaxies.settings().inclination.degrees {
        inclination.data.mapv_inplace(f64::to_radians);
    }
    Ok(inclination)
}

/// Redshift of every galaxy, from the lightcone when there is one
#[derive(Debug)]
pub struct Redshift;

impl Property for Redshift {
    fn kind(&self) -> Kind {
        Kind::Redshift
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        if *name != PropertyName::Redshift {
            return Err(mismatch(self.kind(), name));
        }
        Ok(galaxies.output().redshift_dataset(z)?.with_attr(UNITS_IN_SI, 1.0))
    }
}

#[derive(Debug)]
pub struct SnapshotRedshift;

impl Property for SnapshotRedshift {
    fn kind(&self) -> Kind {
        Kind::SnapshotRedshift
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        if *name != PropertyName::SnapshotRedshift {
            return Err(mismatch(self.kind(), name));
        }
        Ok(galaxies.output().snapshot_redshift(z)?.with_attr(UNITS_IN_SI, 1.0))
    }
}

/// Cosmological redshift shifted by the peculiar velocity along the line
/// of sight
#[derive(Debug)]
pub struct ObservedRedshift;

impl Property for ObservedRedshift {
    fn kind(&self) -> Kind {
        Kind::ObservedRedshift
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        if *name != PropertyName::ObservedRedshift {
            return Err(mismatch(self.kind(), name));
        }
        let cosmological = galaxies.require(name, "lightconeRedshift", z)?;
        let [x, y, zz] = lightcone(galaxies, name, "Position", z)?;
        let [vx, vy, vz] = lightcone(galaxies, name, "Velocity", z)?;
        check_lengths(&[&cosmological, &x, &y, &zz, &vx, &vy, &vz])?;

        let speed_of_light = SPEED_OF_LIGHT / KILO;
        let values = izip!(
            cosmological.values()?,
            izip!(x.values()?, y.values()?, zz.values()?),
            izip!(vx.values()?, vy.values()?, vz.values()?)
        )
        .map(|(redshift, (x, y, z), (vx, vy, vz))| {
            let radius = (x * x + y * y + z * z).sqrt();
            let radial = (vx * x + vy * y + vz * z) / radius;
            (1.0 + redshift) * (1.0 + radial / speed_of_light) - 1.0
        })
        .collect();
        Ok(Dataset::from_vec(name.to_string(), values).with_attr(UNITS_IN_SI, 1.0))
    }
}

/// `lightcone<Quantity>X`, `Y` and `Z`
fn lightcone(galaxies: &Galaxies, name: &PropertyName, quantity: &str, z: f64) -> Result<[Dataset; 3]> {
    let axis = |axis: &str| galaxies.require(name, &format!("lightcone{quantity}{axis}"), z);
    Ok([axis("X")?, axis("Y")?, axis("Z")?])
}

/// Lightcone outputs only, everything else has no sky position
fn require_lightcone(galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<()> {
    match galaxies.output().dataset_exists("lightconeRedshift", z)? {
        true => Ok(()),
        false => Err(Error::MissingDependency {
            property: name.to_string(),
            dependency: "lightconeRedshift".into(),
        }),
    }
}

/// Right ascension in degrees, within [0, 360)
#[derive(Debug)]
pub struct RightAscension;

impl Property for RightAscension {
    fn kind(&self) -> Kind {
        Kind::RightAscension
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        if *name != PropertyName::RightAscension {
            return Err(mismatch(self.kind(), name));
        }
        require_lightcone(galaxies, name, z)?;
        let [x, y, _] = lightcone(galaxies, name, "Position", z)?;
        check_lengths(&[&x, &y])?;

        let values = izip!(x.values()?, y.values()?)
            .map(|(x, y)| right_ascension(*x, *y))
            .collect();
        Ok(Dataset::from_vec(name.to_string(), values).with_attr("units", "degrees"))
    }
}

/// Declination in degrees, within [-90, 90]
#[derive(Debug)]
pub struct Declination;

impl Property for Declination {
    fn kind(&self) -> Kind {
        Kind::Declination
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        if *name != PropertyName::Declination {
            return Err(mismatch(self.kind(), name));
        }
        require_lightcone(galaxies, name, z)?;
        let [x, y, zz] = lightcone(galaxies, name, "Position", z)?;
        check_lengths(&[&x, &y, &zz])?;

        let values = izip!(x.values()?, y.values()?, zz.values()?)
            .map(|(x, y, z)| declination(*x, *y, *z))
            .collect();
        Ok(Dataset::from_vec(name.to_string(), values).with_attr("units", "degrees"))
    }
}

fn right_ascension(x: f64, y: f64) -> f64 {
    let angle = y.atan2(x);
    match angle < 0.0 {
        true => (2.0 * PI + angle).to_degrees(),
        false => angle.to_degrees(),
    }
}

fn declination(x: f64, y: f64, z: f64) -> f64 {
    (z / (x * x + y * y + z * z).sqrt()).asin().to_degrees()
}

#[derive(Debug)]
pub struct MergerTreeWeight;

impl Property for MergerTreeWeight {
    fn kind(&self) -> Kind {
        Kind::MergerTreeWeight
    }

    fn get(&self, galaxies: &Galaxies, name: &PropertyName, z: f64) -> Result<Dataset> {
        if *name != PropertyName::MergerTreeWeight {
            return Err(mismatch(self.kind(), name));
        }
        galaxies.output().merger_tree_weight(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn inclinations_are_isotropic() {
        let mut rng = StdRng::seed_from_u64(1);
        let angles = random_inclinations(20_000, false, &mut rng);
        assert!(angles.iter().all(|i| (0.0..=PI / 2.0).contains(i)));

        // cos(i) is uniform so its mean is a half
        let mean = angles.iter().map(|i| i.cos()).sum::<f64>() / angles.len() as f64;
        assert_relative_eq!(mean, 0.5, epsilon = 0.01);
    }

    #[test]
    fn seeded_inclinations_repeat() {
        let first = random_inclinations(5, true, &mut StdRng::seed_from_u64(7));
        let second = random_inclinations(5, true, &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn sky_positions() {
        assert_relative_eq!(right_ascension(1.0, 0.0), 0.0);
        assert_relative_eq!(right_ascension(0.0, 1.0), 90.0);
        assert_relative_eq!(right_ascension(0.0, -1.0), 270.0);
        assert_relative_eq!(declination(1.0, 0.0, 1.0), 45.0, epsilon = 1e-12);
        assert_relative_eq!(declination(0.0, 0.0, -2.0), -90.0);
    }
}
