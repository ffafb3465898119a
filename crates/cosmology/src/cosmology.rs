// crate modules
use crate::error::{Error, Result};

// galtools crates
use galtools_data::{float_attribute, Attributes};
use galtools_utils::constants::{
    GIGA, GRAVITATIONAL_CONSTANT, KILO, MASS_SOLAR, MEGA, PARSEC, PI, SPEED_OF_LIGHT, YEAR,
};
use galtools_utils::{arange, interp, romberg};

// external crates
use log::trace;
use serde::{Deserialize, Serialize};

// standard library
use std::sync::OnceLock;

/// One megaparsec in metres
const MPC: f64 = MEGA * PARSEC;
/// One gigayear in seconds, 365 day years
const GYR: f64 = GIGA * YEAR;
/// Arcseconds per radian divided by 1000, for kpc/arcsec
const ARCSEC_PER_RADIAN_KILO: f64 = 206.26480;

/// Cosmological parameters
///
/// Defaults are the Millennium simulation values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CosmologyParameters {
    /// Matter density
    pub omega0: f64,
    /// Dark energy density
    pub lambda0: f64,
    /// Baryon density
    pub omegab: f64,
    /// Hubble parameter in units of 100 km/s/Mpc
    pub h0: f64,
    /// Power spectrum normalisation
    pub sigma8: f64,
    /// Primordial spectral index
    pub ns: f64,
    /// Include a radiation density
    pub radiation: bool,
    /// Maximum redshift of the distance table
    pub zmax: f64,
    /// Number of redshift steps in the distance table
    pub nz: usize,
    /// Work in h-independent units, i.e. H0 = 100
    pub h_independent: bool,
}

impl Default for CosmologyParameters {
    fn default() -> Self {
        Self {
            omega0: 0.25,
            lambda0: 0.75,
            omegab: 0.045,
            h0: 0.73,
            sigma8: 0.9,
            ns: 1.0,
            radiation: false,
            zmax: 20.0,
            nz: 10000,
            h_independent: true,
        }
    }
}

impl CosmologyParameters {
    /// Parameters of a Galacticus model
    ///
    /// Keys are the flattened paths below the `Parameters` group, for
    /// example `cosmologyParameters/OmegaMatter`. Models report physical
    /// units so the result is not h-independent.
    pub fn from_attributes(parameters: &Attributes) -> Result<Self> {
        let get = |key: &str| float_attribute(parameters, key, "Parameters");
        Ok(Self {
            omega0: get("cosmologyParameters/OmegaMatter")?,
            lambda0: get("cosmologyParameters/OmegaDarkEnergy")?,
            omegab: get("cosmologyParameters/OmegaBaryon")?,
            h0: get("cosmologyParameters/HubbleConstant")? / 100.0,
            sigma8: get("cosmologicalMassVariance/sigma_8")?,
            ns: get("powerSpectrumPrimordial/index")?,
            h_independent: false,
            ..Default::default()
        })
    }

    /// Published WMAP parameter sets
    pub fn wmap(year: u32) -> Result<Self> {
        let (omega0, lambda0, omegab, h0, sigma8, ns) = match year {
            1 => (0.25, 0.75, 0.045, 0.73, 0.9, 1.0),
            7 => (0.272, 0.728, 0.045, 0.702, 0.807, 0.961),
            _ => return Err(Error::UnknownWmapYear(year)),
        };
        Ok(Self {
            omega0,
            lambda0,
            omegab,
            h0,
            sigma8,
            ns,
            ..Default::default()
        })
    }
}

/// Distance, time and volume calculator for a cosmology
///
/// Distances are in Mpc (or Mpc/h when h-independent), times in Gyr.
///
/// Comoving distances come from a table accumulated with Romberg
/// integration on a regular redshift grid, built on first use and
/// interpolated thereafter. Requests beyond the table are clamped.
///
/// ```rust
/// # use galtools_cosmology::Cosmology;
/// let cosmology = Cosmology::default();
/// let z = 1.0;
///
/// let lookback = cosmology.lookback_time(z).unwrap();
/// let age = cosmology.age_of_universe(0.0).unwrap() - cosmology.age_of_universe(z).unwrap();
/// assert!((lookback - age).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct Cosmology {
    params: CosmologyParameters,
    omegar: f64,
    omegak: f64,
    hubble_constant: f64,
    table: OnceLock<DistanceTable>,
}

/// Comoving distance tabulated against redshift
#[derive(Debug)]
struct DistanceTable {
    redshift: Vec<f64>,
    distance: Vec<f64>,
}

impl Default for Cosmology {
    fn default() -> Self {
        Self::new(CosmologyParameters::default())
    }
}

impl Clone for Cosmology {
    fn clone(&self) -> Self {
        Self::new(self.params.clone())
    }
}

impl Cosmology {
    /// Calculator for a set of parameters
    pub fn new(params: CosmologyParameters) -> Self {
        let omegar = match params.radiation {
            true => 4.165e-5 / params.h0.powi(2),
            false => 0.0,
        };
        let omegak = 1.0 - (params.omega0 + params.lambda0 + omegar);
        let hubble_constant = match params.h_independent {
            true => 100.0,
            false => 100.0 * params.h0,
        };
        Self {
            params,
            omegar,
            omegak,
            hubble_constant,
            table: OnceLock::new(),
        }
    }

    /// Calculator for one of the published WMAP parameter sets
    pub fn wmap(year: u32) -> Result<Self> {
        Ok(Self::new(CosmologyParameters::wmap(year)?))
    }

    /// Calculator for the parameters of a Galacticus model
    pub fn from_attributes(parameters: &Attributes) -> Result<Self> {
        Ok(Self::new(CosmologyParameters::from_attributes(parameters)?))
    }

    /// Input parameters
    pub fn parameters(&self) -> &CosmologyParameters {
        &self.params
    }

    /// Radiation density
    pub fn omega_r(&self) -> f64 {
        self.omegar
    }

    /// Curvature density
    pub fn omega_k(&self) -> f64 {
        self.omegak
    }

    /// Hubble constant in km/s/Mpc
    pub fn hubble_constant(&self) -> f64 {
        self.hubble_constant
    }

    /// Hubble constant in 1/s
    fn hubble_constant_si(&self) -> f64 {
        self.hubble_constant * KILO / MPC
    }

    /// Hubble time in Gyr
    pub fn hubble_time(&self) -> f64 {
        (MPC / (self.hubble_constant * KILO)) / GYR
    }

    /// Hubble distance in Mpc
    pub fn hubble_distance(&self) -> f64 {
        SPEED_OF_LIGHT / KILO / self.hubble_constant
    }

    /// Hubble volume in Mpc^3
    pub fn hubble_volume(&self) -> f64 {
        self.hubble_distance().powi(3)
    }

    /// Critical density today in solar masses per Mpc^3, with h = 1
    pub fn critical_density(&self) -> f64 {
        let density = 3.0 * 100.0_f64.powi(2) / 8.0 / PI / GRAVITATIONAL_CONSTANT;
        density * (KILO / MPC).powi(2) / (MASS_SOLAR / MPC.powi(3))
    }

    fn density_sum(&self, z: f64) -> f64 {
        let a = 1.0 / (1.0 + z);
        self.omegak * a.powi(-2)
            + self.params.lambda0
            + self.params.omega0 * a.powi(-3)
            + self.omegar * a.powi(-4)
    }

    /// Dimensionless Hubble parameter E(z)
    pub fn e(&self, z: f64) -> f64 {
        self.density_sum(z).sqrt()
    }

    /// Hubble parameter H(z) in km/s/Mpc
    pub fn hubble(&self, z: f64) -> f64 {
        self.hubble_constant * self.e(z)
    }

    /// Comoving distance integrand, c/H(z) in Mpc
    pub fn f(&self, z: f64) -> f64 {
        (SPEED_OF_LIGHT / self.hubble_constant_si()) / self.density_sum(z).sqrt() / MPC
    }

    fn table(&self) -> &DistanceTable {
        self.table.get_or_init(|| {
            let dz = self.params.zmax / self.params.nz as f64;
            let redshift = arange(0.0, self.params.zmax, dz).unwrap_or_default();
            trace!("Building comoving distance table with {} steps", redshift.len());

            let mut distance = Vec::with_capacity(redshift.len());
            let mut total = 0.0;
            distance.push(total);
            for w in redshift.windows(2) {
                total += romberg(|z| self.f(z), w[0], w[1]);
                distance.push(total);
            }
            distance.truncate(redshift.len());
            DistanceTable { redshift, distance }
        })
    }

    /// Line of sight comoving distance to redshift `z`
    pub fn comoving_distance(&self, z: f64) -> f64 {
        let table = self.table();
        interp(z, &table.redshift, &table.distance)
    }

    /// Redshift at a line of sight comoving distance
    pub fn redshift_at_distance(&self, r: f64) -> f64 {
        let table = self.table();
        interp(r, &table.distance, &table.redshift)
    }

    /// Age of the universe at redshift `z`, in Gyr
    ///
    /// Closed forms exist for universes without dark energy (open, closed
    /// or Einstein-de Sitter) and for flat universes with dark energy.
    pub fn age_of_universe(&self, z: f64) -> Result<f64> {
        let a = 1.0 / (1.0 + z);
        let (omega0, lambda0) = (self.params.omega0, self.params.lambda0);
        let t_h = self.hubble_time();

        if lambda0.abs() < 1.0e-9 {
            if omega0 == 1.0 {
                return Ok(t_h * (2.0 / 3.0) * a.powf(1.5));
            }
            let argument = (omega0 * z - omega0 + 2.0) / (omega0 * (1.0 + z));
            let age = if omega0 < 1.0 {
                let factor1 = t_h * omega0 / 2.0 / (1.0 - omega0).powf(1.5);
                let factor2 = 2.0 * ((1.0 - omega0) * (omega0 * z + 1.0)).sqrt() / omega0 / (1.0 + z);
                factor1 * (factor2 - argument.acosh())
            } else {
                let factor1 = t_h * omega0 / 2.0 / (omega0 - 1.0).powf(1.5);
                let factor2 = -2.0 * ((omega0 - 1.0) * (omega0 * z + 1.0)).sqrt() / omega0 / (1.0 + z);
                factor1 * (factor2 + argument.acos())
            };
            return Ok(age);
        }

        if (lambda0 + omega0 - 1.0).abs() < 1.0e-9 {
            let factor1 = t_h * (2.0 / 3.0) / lambda0.sqrt();
            let factor2 = (lambda0 * a.powi(3)).sqrt() + (lambda0 * a.powi(3) + omega0).sqrt();
            return Ok(factor1 * (factor2 / omega0.sqrt()).ln());
        }

        Err(Error::UnsupportedCosmology { omega0, lambda0 })
    }

    /// Time elapsed between redshift `z` and today, in Gyr
    pub fn lookback_time(&self, z: f64) -> Result<f64> {
        Ok(self.age_of_universe(0.0)? - self.age_of_universe(z)?)
    }

    /// Transverse comoving distance
    pub fn comoving_transverse_distance(&self, z: f64) -> f64 {
        let dc = self.comoving_distance(z);
        let dh = self.hubble_distance();
        let root = self.omegak.abs().sqrt();
        if self.omegak > 0.0 {
            dh * (root * dc / dh).sinh() / root
        } else if self.omegak < 0.0 {
            dh * (root * dc / dh).sin() / root
        } else {
            dc
        }
    }

    /// Angular diameter distance
    pub fn angular_diameter_distance(&self, z: f64) -> f64 {
        self.comoving_transverse_distance(z) / (1.0 + z)
    }

    /// Angular scale in kpc/arcsec (or Mpc/arcsec /1000)
    pub fn angular_scale(&self, z: f64) -> f64 {
        self.angular_diameter_distance(z) / ARCSEC_PER_RADIAN_KILO
    }

    /// Angular diameter distance between two redshifts, `z1 < z2`
    pub fn angular_distance_separation(&self, z1: f64, z2: f64) -> Result<f64> {
        if self.omegak < 0.0 {
            return Err(Error::NegativeCurvature(self.omegak));
        }
        let dh = self.hubble_distance();
        let dm1 = self.comoving_transverse_distance(z1);
        let dm2 = self.comoving_transverse_distance(z2);
        let separation = dm2 * (1.0 + self.omegak * (dm1 / dh).powi(2)).sqrt()
            - dm1 * (1.0 + self.omegak * (dm2 / dh).powi(2)).sqrt();
        Ok(separation / (1.0 + z2))
    }

    /// Luminosity distance
    pub fn luminosity_distance(&self, z: f64) -> f64 {
        self.comoving_transverse_distance(z) * (1.0 + z)
    }

    /// Comoving volume of the universe within redshift `z`, in Mpc^3
    pub fn comoving_volume(&self, z: f64) -> f64 {
        let dm = self.comoving_transverse_distance(z);
        if self.omegak == 0.0 {
            return 4.0 * PI * dm.powi(3) / 3.0;
        }

        let ratio = dm / self.hubble_distance();
        let root = self.omegak.abs().sqrt();
        let factor1 = 4.0 * PI * self.hubble_volume() / 2.0 / self.omegak;
        let factor2 = ratio * (1.0 + self.omegak * ratio.powi(2)).sqrt();
        let factor3 = match self.omegak > 0.0 {
            true => -(root * ratio).asinh() / root,
            false => -(root * ratio).asin() / root,
        };
        factor1 * (factor2 + factor3)
    }

    /// Comoving volume element per unit redshift, over the full sky
    pub fn dvdz(&self, z: f64) -> f64 {
        let da = self.angular_diameter_distance(z);
        4.0 * PI * self.hubble_distance() * da.powi(2) * (1.0 + z).powi(2) / self.e(z)
    }

    /// Distance modulus including the `2.5 log10(1+z)` band correction
    pub fn band_corrected_distance_modulus(&self, z: f64) -> f64 {
        // 10 pc in Mpc
        let reference = 10.0 / MEGA;
        5.0 * (self.luminosity_distance(z) / reference).log10() - 2.5 * (1.0 + z).log10()
    }

    /// Cartesian comoving position from sky coordinates in degrees
    pub fn realspace(&self, ra: f64, dec: f64, z: f64) -> [f64; 3] {
        let (ra, dec) = (ra.to_radians(), dec.to_radians());
        let r = self.comoving_distance(z);
        [
            r * dec.cos() * ra.cos(),
            r * dec.cos() * ra.sin(),
            r * dec.sin(),
        ]
    }

    /// Particle mass of an N-body simulation in solar masses
    pub fn particle_mass(&self, box_size: f64, particles_per_side: f64) -> f64 {
        let number_density = (particles_per_side / box_size).powi(3);
        self.critical_density() * self.params.omega0 / number_density
    }

    /// Box size of an N-body simulation in Mpc
    pub fn box_size(&self, particle_mass: f64, particles_per_side: f64) -> f64 {
        let volume = particle_mass * particles_per_side.powi(3)
            / (self.critical_density() * self.params.omega0);
        volume.cbrt()
    }

    /// Particles per side of an N-body simulation
    pub fn particles_per_side(&self, box_size: f64, particle_mass: f64) -> f64 {
        (self.critical_density() * self.params.omega0 * box_size.powi(3) / particle_mass).cbrt()
    }
}

impl std::fmt::Display for Cosmology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = &self.params;
        writeln!(f, "{}", "-".repeat(30))?;
        writeln!(f, "COSMOLOGY:")?;
        writeln!(f, "   Omega_M = {:5.3}", p.omega0)?;
        writeln!(f, "   Omega_b = {:5.3}", p.omegab)?;
        writeln!(f, "   Omega_V = {:5.3}", p.lambda0)?;
        writeln!(f, "   h       = {:5.3}", p.h0)?;
        writeln!(f, "   sigma_8 = {:5.3}", p.sigma8)?;
        writeln!(f, "   n_s     = {:5.3}", p.ns)?;
        writeln!(f, "   Omega_R = {:5.3e}", self.omegar)?;
        writeln!(f, "   Omega_k = {:5.3}", self.omegak)?;
        write!(f, "{}", "-".repeat(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use galtools_data::Attribute;

    fn coarse(params: CosmologyParameters) -> Cosmology {
        Cosmology::new(CosmologyParameters {
            zmax: 10.0,
            nz: 1000,
            ..params
        })
    }

    #[test]
    fn flatness() {
        let cosmology = Cosmology::default();
        assert_relative_eq!(cosmology.omega_k(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(cosmology.e(0.0), 1.0, epsilon = 1e-12);
        assert_eq!(cosmology.hubble_constant(), 100.0);
    }

    #[test]
    fn radiation_density_scales_with_h() {
        let cosmology = Cosmology::new(CosmologyParameters {
            radiation: true,
            h0: 0.5,
            ..Default::default()
        });
        assert_relative_eq!(cosmology.omega_r(), 4.165e-5 / 0.25);
        assert!(cosmology.omega_k() < 0.0);
    }

    #[test]
    fn einstein_de_sitter_age() {
        let cosmology = coarse(CosmologyParameters {
            omega0: 1.0,
            lambda0: 0.0,
            ..Default::default()
        });
        let t_h = cosmology.hubble_time();
        assert_relative_eq!(cosmology.age_of_universe(0.0).unwrap(), 2.0 / 3.0 * t_h);
        assert_relative_eq!(
            cosmology.age_of_universe(3.0).unwrap(),
            2.0 / 3.0 * t_h * 0.125,
            epsilon = 1e-12
        );
    }

    #[test]
    fn open_and_closed_ages_approach_einstein_de_sitter() {
        let eds = coarse(CosmologyParameters {
            omega0: 1.0,
            lambda0: 0.0,
            ..Default::default()
        })
        .age_of_universe(0.0)
        .unwrap();

        for omega0 in [0.999, 1.001] {
            let cosmology = coarse(CosmologyParameters {
                omega0,
                lambda0: 0.0,
                ..Default::default()
            });
            assert_relative_eq!(cosmology.age_of_universe(0.0).unwrap(), eds, max_relative = 1e-3);
        }
    }

    #[test]
    fn unsupported_regime() {
        let cosmology = coarse(CosmologyParameters {
            omega0: 0.3,
            lambda0: 0.5,
            ..Default::default()
        });
        assert!(matches!(
            cosmology.age_of_universe(1.0),
            Err(Error::UnsupportedCosmology { .. })
        ));
    }

    #[test]
    fn distances_are_clamped_beyond_table() {
        let cosmology = coarse(CosmologyParameters::default());
        assert_eq!(cosmology.comoving_distance(0.0), 0.0);
        assert_eq!(cosmology.comoving_distance(50.0), cosmology.comoving_distance(20.0));
    }

    #[test]
    fn distance_inverts() {
        let cosmology = coarse(CosmologyParameters::default());
        let r = cosmology.comoving_distance(1.234);
        assert_relative_eq!(cosmology.redshift_at_distance(r), 1.234, epsilon = 1e-6);
    }

    #[test]
    fn distance_relations() {
        let cosmology = coarse(CosmologyParameters::default());
        let z = 2.0;
        let dm = cosmology.comoving_transverse_distance(z);
        assert_relative_eq!(cosmology.angular_diameter_distance(z), dm / 3.0);
        assert_relative_eq!(cosmology.luminosity_distance(z), dm * 3.0);
        assert_relative_eq!(cosmology.comoving_volume(z), 4.0 * PI * dm.powi(3) / 3.0);
    }

    #[test]
    fn separation_from_today_is_angular_diameter_distance() {
        let cosmology = coarse(CosmologyParameters::default());
        assert_relative_eq!(
            cosmology.angular_distance_separation(0.0, 1.5).unwrap(),
            cosmology.angular_diameter_distance(1.5),
            max_relative = 1e-12
        );

        let closed = coarse(CosmologyParameters {
            omega0: 0.5,
            lambda0: 0.7,
            ..Default::default()
        });
        assert!(closed.angular_distance_separation(0.0, 1.0).is_err());
    }

    #[test]
    fn particle_mass_round_trip() {
        let cosmology = Cosmology::default();
        let mass = cosmology.particle_mass(500.0, 2160.0);
        assert_relative_eq!(cosmology.box_size(mass, 2160.0), 500.0, max_relative = 1e-10);
        assert_relative_eq!(cosmology.particles_per_side(500.0, mass), 2160.0, max_relative = 1e-10);
    }

    #[test]
    fn model_parameters() {
        let parameters = Attributes::from([
            ("cosmologyParameters/OmegaMatter".to_string(), Attribute::Float(0.3)),
            ("cosmologyParameters/OmegaDarkEnergy".to_string(), Attribute::Float(0.7)),
            ("cosmologyParameters/OmegaBaryon".to_string(), Attribute::Float(0.05)),
            ("cosmologyParameters/HubbleConstant".to_string(), Attribute::Text("70.0".into())),
            ("cosmologicalMassVariance/sigma_8".to_string(), Attribute::Float(0.8)),
            ("powerSpectrumPrimordial/index".to_string(), Attribute::Float(0.96)),
        ]);
        let cosmology = Cosmology::from_attributes(&parameters).unwrap();
        assert_relative_eq!(cosmology.parameters().h0, 0.7);
        assert_relative_eq!(cosmology.hubble_constant(), 70.0, max_relative = 1e-12);
        assert!(!cosmology.parameters().h_independent);
    }

    #[test]
    fn wmap_years() {
        assert_eq!(CosmologyParameters::wmap(7).unwrap().h0, 0.702);
        assert_eq!(CosmologyParameters::wmap(1).unwrap(), CosmologyParameters::default());
        assert!(matches!(Cosmology::wmap(3), Err(Error::UnknownWmapYear(3))));
    }
}
