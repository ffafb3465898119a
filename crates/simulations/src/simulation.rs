//! Simulation specifications and snapshot tables

// crate modules
use crate::error::{Error, Result};
use crate::simulation_box::SimulationBox;

// galtools crates
use galtools_cosmology::{Cosmology, CosmologyParameters};
use galtools_data::Config;
use galtools_utils::{Bounds, Interp1d};

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Snapshot returned for redshifts outside of the table
pub const MISSING_SNAPSHOT: i64 = -999;

/// Cosmological parameters of a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationCosmology {
    #[serde(rename = "OmegaM")]
    pub omega_matter: f64,
    #[serde(rename = "OmegaL")]
    pub omega_lambda: f64,
    #[serde(rename = "OmegaB")]
    pub omega_baryon: f64,
    /// km/s/Mpc
    #[serde(rename = "H0")]
    pub hubble_constant: f64,
    pub sigma8: f64,
    pub ns: f64,
    #[serde(rename = "temperatureCMB", default = "default_temperature_cmb")]
    pub temperature_cmb: f64,
}

fn default_temperature_cmb() -> f64 {
    2.726
}

/// A value with units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: f64,
    #[serde(default)]
    pub units: Option<String>,
}

/// Particle content of a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particles {
    /// Count as written in the specification, e.g. `2160^3`
    pub number: String,
    pub mass: Measure,
}

/// A snapshot number and its redshift
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub number: i64,
    pub z: f64,
}

/// On-disk layout of a simulation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulationFile {
    name: String,
    cosmology: SimulationCosmology,
    box_size: Measure,
    particles: Particles,
    snapshots: Vec<Snapshot>,
}

/// Specification of an N-body simulation
///
/// ```rust
/// # use galtools_simulations::Simulation;
/// let json = r#"{
///     "name": "toy",
///     "cosmology": { "OmegaM": 0.3, "OmegaL": 0.7, "OmegaB": 0.05, "H0": 70.0, "sigma8": 0.8, "ns": 0.96 },
///     "boxSize": { "value": 100.0, "units": "Mpc/h" },
///     "particles": { "number": "512^3", "mass": { "value": 1.0e9, "units": "Msol/h" } },
///     "snapshots": [ { "number": 0, "z": 2.0 }, { "number": 1, "z": 1.0 }, { "number": 2, "z": 0.0 } ]
/// }"#;
/// let simulation = Simulation::from_json(json).unwrap();
///
/// assert_eq!(simulation.redshift(1, true), 1.0);
/// assert_eq!(simulation.snapshot(0.4, true), 2);
/// assert_eq!(simulation.snapshot(3.0, true), -999);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub name: String,
    pub cosmology: SimulationCosmology,
    pub simulation_box: SimulationBox,
    pub particles: Particles,
    /// Ordered by snapshot number
    snapshots: Vec<Snapshot>,
}

impl Simulation {
    /// Parse a specification from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Self::try_from(serde_json::from_str::<SimulationFile>(json)?)
    }

    /// Read a specification from a JSON file
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Reading simulation from {}", path.as_ref().display());
        let reader = BufReader::new(File::open(path.as_ref())?);
        Self::try_from(serde_json::from_reader::<_, SimulationFile>(reader)?)
    }

    /// Find `simulations/<name>.json` in the datasets repository
    ///
    /// Names are matched in lower case.
    pub fn locate(name: &str, config: &Config) -> Result<Self> {
        let file = format!("{}.json", name.to_lowercase());
        match config.search_static(&file)? {
            Some(path) => Self::read_file(path),
            None => Err(Error::SimulationNotFound {
                name: name.to_string(),
                available: available_simulations(config),
            }),
        }
    }

    /// Snapshot table ordered by number
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Hubble parameter in units of 100 km/s/Mpc
    pub fn h0(&self) -> f64 {
        self.cosmology.hubble_constant / 100.0
    }

    /// Redshift of a snapshot number
    ///
    /// Snapshot numbers that are not tabulated take the redshift of the
    /// next tabulated number. Outside of the table the result is NaN when
    /// `exclude_out_of_bounds` is set, otherwise the nearest end of the
    /// table is used.
    pub fn redshift(&self, snapshot: i64, exclude_out_of_bounds: bool) -> f64 {
        let n = self.snapshots.len();
        let (first, last) = (self.snapshots[0].number, self.snapshots[n - 1].number);

        if exclude_out_of_bounds && (snapshot < first || snapshot > last) {
            return f64::NAN;
        }
        let index = self
            .snapshots
            .partition_point(|s| s.number < snapshot)
            .min(n - 1);
        self.snapshots[index].z
    }

    /// Nearest snapshot to a redshift
    ///
    /// The snapshot number is interpolated linearly in redshift and rounded.
    /// Outside of the table the result is [MISSING_SNAPSHOT] when
    /// `exclude_out_of_bounds` is set. Otherwise redshifts below the table
    /// map to the last snapshot and those above it to the first.
    pub fn snapshot(&self, z: f64, exclude_out_of_bounds: bool) -> i64 {
        let n = self.snapshots.len();
        let (first, last) = (self.snapshots[0], self.snapshots[n - 1]);
        let (z_min, z_max) = self
            .snapshots
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.z), hi.max(s.z))
            });

        if z < z_min || z > z_max || z.is_nan() {
            return match exclude_out_of_bounds {
                true => MISSING_SNAPSHOT,
                false if z < z_min => last.number,
                false => first.number,
            };
        }

        let (redshifts, numbers) = self
            .snapshots
            .iter()
            .map(|s| (s.z, s.number as f64))
            .unzip();
        match Interp1d::from_unsorted(redshifts, numbers, Bounds::Clamp) {
            Ok(curve) => curve
                .eval(z)
                .map(|number| number.round_ties_even() as i64)
                .unwrap_or(first.number),
            // a single snapshot, and z must be its redshift
            Err(_) => first.number,
        }
    }

    /// Cosmology of the simulation
    pub fn cosmology(&self) -> Cosmology {
        Cosmology::new(CosmologyParameters {
            omega0: self.cosmology.omega_matter,
            lambda0: self.cosmology.omega_lambda,
            omegab: self.cosmology.omega_baryon,
            h0: self.h0(),
            sigma8: self.cosmology.sigma8,
            ns: self.cosmology.ns,
            ..Default::default()
        })
    }
}

impl TryFrom<SimulationFile> for Simulation {
    type Error = Error;

    fn try_from(file: SimulationFile) -> Result<Self> {
        if file.snapshots.is_empty() {
            return Err(Error::NoSnapshots(file.name));
        }
        let mut snapshots = file.snapshots;
        snapshots.sort_by_key(|s| s.number);

        Ok(Self {
            name: file.name,
            cosmology: file.cosmology,
            simulation_box: SimulationBox {
                size: [file.box_size.value; 3],
                units: file.box_size.units,
                periodic: true,
            },
            particles: file.particles,
            snapshots,
        })
    }
}

impl std::fmt::Display for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let units = |u: &Option<String>| u.clone().unwrap_or_default();
        let z_min = self
            .snapshots
            .iter()
            .map(|s| s.z)
            .fold(f64::INFINITY, f64::min);

        writeln!(f, "{}", "-".repeat(65))?;
        writeln!(f, " SPECIFICATIONS: {}", self.name)?;
        writeln!(
            f,
            "            BOX SIZE        = {:?} {}",
            self.simulation_box.size,
            units(&self.simulation_box.units)
        )?;
        writeln!(f, "            NUM. PARTICLES  = {}", self.particles.number)?;
        writeln!(
            f,
            "            PARTICLE MASS   = {} {}",
            self.particles.mass.value,
            units(&self.particles.mass.units)
        )?;
        writeln!(f, "            MIN. REDSHIFT   = {z_min}")?;
        writeln!(f, "       Cosmology:")?;
        writeln!(f, "            OMEGA_MATTER    = {}", self.cosmology.omega_matter)?;
        writeln!(f, "            OMEGA_VACUUM    = {}", self.cosmology.omega_lambda)?;
        writeln!(f, "            HUBBLE PARAM.   = {}", self.h0())?;
        writeln!(f, "            OMEGA_BARYON    = {}", self.cosmology.omega_baryon)?;
        writeln!(f, "            SIGMA_8         = {}", self.cosmology.sigma8)?;
        writeln!(f, "            POWER SPEC.IND. = {}", self.cosmology.ns)?;
        write!(f, "{}", "-".repeat(65))
    }
}

/// Names of the specifications in `static/simulations`
fn available_simulations(config: &Config) -> Vec<String> {
    let directory = config.static_path().join("simulations");
    let mut names = std::fs::read_dir(directory)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|e| e == "json"))
                .filter_map(|path| Some(path.file_stem()?.to_string_lossy().into_owned()))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation() -> Simulation {
        let json = r#"{
            "name": "toy",
            "cosmology": { "OmegaM": 0.3, "OmegaL": 0.7, "OmegaB": 0.05, "H0": 70.0, "sigma8": 0.8, "ns": 0.96 },
            "boxSize": { "value": 100.0, "units": "Mpc/h" },
            "particles": { "number": "512^3", "mass": { "value": 1.0e9 } },
            "snapshots": [
                { "number": 20, "z": 0.0 },
                { "number": 10, "z": 1.0 },
                { "number": 15, "z": 0.5 }
            ]
        }"#;
        Simulation::from_json(json).unwrap()
    }

    #[test]
    fn snapshots_are_ordered() {
        let numbers = simulation()
            .snapshots()
            .iter()
            .map(|s| s.number)
            .collect::<Vec<_>>();
        assert_eq!(numbers, vec![10, 15, 20]);
        assert_eq!(simulation().cosmology.temperature_cmb, 2.726);
    }

    #[test]
    fn redshift_lookup() {
        let simulation = simulation();
        assert_eq!(simulation.redshift(15, true), 0.5);
        // untabulated numbers take the next tabulated entry
        assert_eq!(simulation.redshift(12, true), 0.5);
        assert!(simulation.redshift(25, true).is_nan());
        assert!(simulation.redshift(5, true).is_nan());
        assert_eq!(simulation.redshift(25, false), 0.0);
        assert_eq!(simulation.redshift(5, false), 1.0);
    }

    #[test]
    fn snapshot_lookup() {
        let simulation = simulation();
        assert_eq!(simulation.snapshot(0.5, true), 15);
        assert_eq!(simulation.snapshot(0.7, true), 13);
        assert_eq!(simulation.snapshot(-0.1, true), MISSING_SNAPSHOT);
        assert_eq!(simulation.snapshot(-0.1, false), 20);
        assert_eq!(simulation.snapshot(1.5, false), 10);
    }

    #[test]
    fn empty_snapshot_table() {
        let json = r#"{
            "name": "empty",
            "cosmology": { "OmegaM": 0.3, "OmegaL": 0.7, "OmegaB": 0.05, "H0": 70.0, "sigma8": 0.8, "ns": 0.96 },
            "boxSize": { "value": 100.0 },
            "particles": { "number": "1", "mass": { "value": 1.0 } },
            "snapshots": []
        }"#;
        assert!(matches!(Simulation::from_json(json), Err(Error::NoSnapshots(_))));
    }
}
