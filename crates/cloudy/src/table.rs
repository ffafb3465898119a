//! Emission line luminosities of HII regions

// crate modules
use crate::error::{Error, Result};

// galtools crates
use galtools_data::{float_attribute, join, CloudySettings, Config, DataStore, MemoryStore};
use galtools_utils::{Bounds, RegularGrid, SliceExt};

// external crates
use log::{debug, warn};

// standard library
use std::collections::BTreeMap;
use std::fmt::Write;

/// Names of the interpolant axes, in table order
pub const INTERPOLANTS: [&str; 5] = [
    "metallicity",
    "densityHydrogen",
    "ionizingFluxHydrogen",
    "ionizingFluxHeliumToHydrogen",
    "ionizingFluxOxygenToHydrogen",
];

/// One tabulated emission line
#[derive(Debug, Clone)]
pub struct EmissionLine {
    pub name: String,
    /// Rest wavelength in Angstroms
    pub wavelength: f64,
    luminosity: RegularGrid,
}

/// The CLOUDY emission line table
///
/// Interpolation is linear in the log10 of every interpolant, and galaxy
/// properties are passed in already as log10 values. The
/// out of range policy is taken from [CloudySettings]:
///
/// - `boundsError` makes out of range galaxies an error
/// - otherwise `fillValue` is used, or the table is extrapolated when no
///   fill value is given
#[derive(Debug)]
pub struct CloudyTable {
    store: Box<dyn DataStore>,
    /// log10 of each interpolant axis
    axes: Vec<Vec<f64>>,
    bounds: Bounds,
    lines: BTreeMap<String, EmissionLine>,
}

impl CloudyTable {
    /// Build from a store, loading the requested lines or every line
    pub fn from_store(
        store: Box<dyn DataStore>,
        line_names: Option<&[&str]>,
        settings: &CloudySettings,
    ) -> Result<Self> {
        let axes = INTERPOLANTS
            .iter()
            .map(|name| {
                let values = store.read_array(name)?;
                Ok(values.iter().map(|v| v.log10()).collect())
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let bounds = match (settings.bounds_error, settings.fill_value) {
            (true, _) => Bounds::Error,
            (false, Some(fill)) => Bounds::Fill(fill),
            (false, None) => Bounds::Extrapolate,
        };

        let mut table = Self {
            store,
            axes,
            bounds,
            lines: BTreeMap::new(),
        };

        let names = match line_names {
            Some(names) => names.iter().map(|n| n.to_string()).collect(),
            None => table.list_available_lines(),
        };
        for name in names {
            table.load_emission_line(&name)?;
        }
        Ok(table)
    }

    /// Locate and read the table named in the cloudy settings
    pub fn from_config(config: &Config, line_names: Option<&[&str]>) -> Result<Self> {
        let path = config.locate(&config.settings.cloudy.file_name)?;
        debug!("Reading CLOUDY table from {}", path.display());
        let store = MemoryStore::read_file(path)?;
        Self::from_store(Box::new(store), line_names, &config.settings.cloudy)
    }

    /// Every line in the table, loaded or not
    pub fn list_available_lines(&self) -> Vec<String> {
        self.store.list("lines")
    }

    /// Lines held in memory
    pub fn lines(&self) -> &BTreeMap<String, EmissionLine> {
        &self.lines
    }

    /// Load a line from the store
    ///
    /// Lines missing from the table are skipped with a warning, and the
    /// return value says whether the line is now available.
    pub fn load_emission_line(&mut self, name: &str) -> Result<bool> {
        if self.lines.contains_key(name) {
            return Ok(true);
        }
        let path = join("lines", name);
        if !self.store.array_exists(&path) {
            warn!("Emission line {name} not found in CLOUDY table");
            return Ok(false);
        }

        let wavelength = float_attribute(&self.store.read_attributes(&path)?, "wavelength", &path)?;
        let luminosity = RegularGrid::new(self.axes.clone(), self.store.read_array(&path)?, self.bounds)?;
        self.lines.insert(
            name.to_string(),
            EmissionLine {
                name: name.to_string(),
                wavelength,
                luminosity,
            },
        );
        Ok(true)
    }

    /// Rest wavelength of a line in Angstroms
    pub fn wavelength(&self, line: &str) -> Result<f64> {
        Ok(self.line(line)?.wavelength)
    }

    /// Luminosity of a line for one galaxy
    ///
    /// `point` holds the log10 of the interpolants in the order of
    /// [INTERPOLANTS].
    pub fn interpolate(&self, line: &str, point: [f64; 5]) -> Result<f64> {
        Ok(self.line(line)?.luminosity.interpolate(&point)?)
    }

    /// Luminosity of a line for many galaxies, one column per interpolant
    pub fn interpolate_many(&self, line: &str, columns: [&[f64]; 5]) -> Result<Vec<f64>> {
        let n = columns[0].len();
        if let Some(found) = columns.iter().map(|c| c.len()).find(|len| *len != n) {
            return Err(Error::LengthMismatch { expected: n, found });
        }

        let line = self.line(line)?;
        (0..n)
            .map(|i| {
                let point = columns.map(|c| c[i]);
                Ok(line.luminosity.interpolate(&point)?)
            })
            .collect()
    }

    /// Ranges of the table axes, with those of galaxy data when given
    ///
    /// Galaxy data are log10 values in the order of [INTERPOLANTS].
    pub fn report_limits(&self, data: Option<[&[f64]; 5]>) -> String {
        let mut report = format!("{}\nCLOUDY Interpolation Report:\n", "-".repeat(40));
        for (i, (name, axis)) in INTERPOLANTS.iter().zip(&self.axes).enumerate() {
            let (lo, hi) = (axis.try_min().unwrap_or(f64::NAN), axis.try_max().unwrap_or(f64::NAN));
            let _ = writeln!(report, "({}) {name}", i + 1);
            let _ = writeln!(report, "  CLOUDY Range (min,max) = {lo}, {hi}");

            if let Some(columns) = data {
                let mut values = columns[i].iter().copied().filter(|v| !v.is_nan()).collect::<Vec<_>>();
                values.sort_by(f64::total_cmp);
                if let (Some(min), Some(max)) = (values.first(), values.last()) {
                    let median = median(&values);
                    let _ = writeln!(report, "  Galaxy Data (min,max,median) = {min}, {max}, {median}");
                }
            }
        }
        report.push_str(&"-".repeat(40));
        report
    }

    fn line(&self, name: &str) -> Result<&EmissionLine> {
        self.lines
            .get(name)
            .ok_or_else(|| Error::LineNotFound(name.to_string()))
    }
}

/// Median of sorted, non-empty values
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n % 2 {
        0 => 0.5 * (sorted[n / 2 - 1] + sorted[n / 2]),
        _ => sorted[n / 2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use galtools_data::{Attribute, Attributes};
    use ndarray::{Array, Array1, IxDyn};

    /// Two nodes per axis at 1 and 10, so log10 axes are [0, 1]
    ///
    /// The luminosity is the sum of the log10 interpolants plus an offset.
    fn store(offset: f64) -> MemoryStore {
        let mut store = MemoryStore::new();
        for name in INTERPOLANTS {
            store = store.with_array(name, Array1::from_vec(vec![1.0, 10.0]).into_dyn());
        }
        let luminosity = Array::from_shape_fn(IxDyn(&[2; 5]), |index| {
            (0..5).map(|d| index[d] as f64).sum::<f64>() + offset
        });
        store
            .with_array("lines/balmerAlpha6565", luminosity)
            .with_attributes(
                "lines/balmerAlpha6565",
                Attributes::from([("wavelength".to_string(), Attribute::Float(6564.61))]),
            )
    }

    #[test]
    fn linear_in_log_interpolants() {
        let table =
            CloudyTable::from_store(Box::new(store(1.0)), None, &CloudySettings::default()).unwrap();
        let value = table
            .interpolate("balmerAlpha6565", [0.5, 0.0, 1.0, 0.0, 0.0])
            .unwrap();
        assert_relative_eq!(value, 2.5, max_relative = 1e-12);
        assert_eq!(table.wavelength("balmerAlpha6565").unwrap(), 6564.61);
    }

    #[test]
    fn missing_lines_are_skipped() {
        let mut table = CloudyTable::from_store(
            Box::new(store(0.0)),
            Some(&["oxygenIII5008"]),
            &CloudySettings::default(),
        )
        .unwrap();
        assert!(table.lines().is_empty());
        assert!(matches!(
            table.wavelength("oxygenIII5008"),
            Err(Error::LineNotFound(_))
        ));

        assert!(table.load_emission_line("balmerAlpha6565").unwrap());
        assert_eq!(table.list_available_lines(), vec!["balmerAlpha6565"]);
    }

    #[test]
    fn out_of_range_policies() {
        let point = [2.0, 0.0, 0.0, 0.0, 0.0];

        let settings = CloudySettings::default();
        let table = CloudyTable::from_store(Box::new(store(0.0)), None, &settings).unwrap();
        assert_relative_eq!(table.interpolate("balmerAlpha6565", point).unwrap(), 2.0);

        let settings = CloudySettings {
            fill_value: Some(-1.0),
            ..CloudySettings::default()
        };
        let table = CloudyTable::from_store(Box::new(store(0.0)), None, &settings).unwrap();
        assert_eq!(table.interpolate("balmerAlpha6565", point).unwrap(), -1.0);

        let settings = CloudySettings {
            bounds_error: true,
            ..CloudySettings::default()
        };
        let table = CloudyTable::from_store(Box::new(store(0.0)), None, &settings).unwrap();
        assert!(table.interpolate("balmerAlpha6565", point).is_err());
    }

    #[test]
    fn limits_report() {
        let table =
            CloudyTable::from_store(Box::new(store(0.0)), None, &CloudySettings::default()).unwrap();
        let report = table.report_limits(Some([&[0.0, 1.0, 2.0], &[0.0], &[0.0], &[0.0], &[0.0]]));
        assert!(report.contains("(1) metallicity"));
        assert!(report.contains("Galaxy Data (min,max,median) = 0, 2, 1"));
    }
}
