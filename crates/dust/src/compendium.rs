//! Tabulated radiative transfer attenuations
//!
//! The compendium tabulates the attenuation of disks against wavelength,
//! inclination and central optical depth, and of spheroids with an extra
//! axis for the ratio of spheroid to disk scale radius. Optical depths
//! beyond the table are handled with log-linear extrapolation coefficients,
//! `ln(attenuation) = c0 + c1 ln(τ)`.

// crate modules
use crate::error::{Error, Result};

// galtools crates
use galtools_data::{float_attribute, Config, DataStore, MemoryStore};
use galtools_utils::{Bounds, RegularGrid};

// external crates
use log::{debug, warn};
use ndarray::{ArrayD, Axis};

/// Galaxy component an attenuation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Disk,
    Spheroid,
}

impl Component {
    /// Number of interpolant columns, `λ, i, τ` plus the scale for spheroids
    pub fn interpolant_count(&self) -> usize {
        match self {
            Self::Disk => 3,
            Self::Spheroid => 4,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Disk => "disk",
            Self::Spheroid => "spheroid",
        }
    }
}

/// Interpolants for one component
#[derive(Debug, Clone)]
struct Tables {
    attenuation: RegularGrid,
    /// Constant and slope of the log-linear extrapolation
    extrapolation: [RegularGrid; 2],
}

/// The dust compendium attenuation table
#[derive(Debug, Clone)]
pub struct CompendiumTable {
    /// Wavelengths in microns
    pub wavelength: Vec<f64>,
    /// Inclinations in degrees
    pub inclination: Vec<f64>,
    pub optical_depth: Vec<f64>,
    pub spheroid_scale_radial: Vec<f64>,
    /// Dust opacity used to build the table
    pub opacity: f64,
    /// Extrapolate beyond the largest tabulated optical depth
    pub extrapolate_optical_depth: bool,
    disk: Tables,
    spheroid: Tables,
}

impl CompendiumTable {
    /// Read the table from an array store
    ///
    /// Arrays are read from the root of the store along with the `opacity`
    /// attribute.
    pub fn from_store(store: &dyn DataStore, extrapolate_optical_depth: bool) -> Result<Self> {
        let axis = |name: &str| -> Result<Vec<f64>> {
            Ok(store.read_array(name)?.iter().copied().collect())
        };
        let wavelength = axis("wavelength")?;
        let inclination = axis("inclination")?;
        let optical_depth = axis("opticalDepth")?;
        let spheroid_scale_radial = axis("spheroidScaleRadial")?;
        let opacity = float_attribute(&store.read_attributes("/")?, "opacity", "/")?;

        let disk_axes = vec![wavelength.clone(), inclination.clone(), optical_depth.clone()];
        let disk = Tables::new(
            disk_axes,
            store.read_array("attenuationDisk")?,
            store.read_array("extrapolationCoefficientsDisk")?,
        )?;

        let spheroid_axes = vec![
            wavelength.clone(),
            inclination.clone(),
            optical_depth.clone(),
            spheroid_scale_radial.clone(),
        ];
        let spheroid = Tables::new(
            spheroid_axes,
            store.read_array("attenuationSpheroid")?,
            store.read_array("extrapolationCoefficientsSpheroid")?,
        )?;

        Ok(Self {
            wavelength,
            inclination,
            optical_depth,
            spheroid_scale_radial,
            opacity,
            extrapolate_optical_depth,
            disk,
            spheroid,
        })
    }

    /// Locate and read the table named in the compendium settings
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = &config.settings.dust_compendium;
        let path = config.locate(&settings.attenuations_file)?;
        debug!("Reading dust compendium from {}", path.display());
        let store = MemoryStore::read_file(path)?;
        Self::from_store(&store, settings.extrapolate_optical_depth)
    }

    /// Largest tabulated optical depth
    pub fn max_optical_depth(&self) -> f64 {
        self.optical_depth.last().copied().unwrap_or(f64::NAN)
    }

    /// True where the attenuation is interpolated from the table
    pub fn optical_depth_mask(&self, optical_depth: &[f64]) -> Vec<bool> {
        let max = self.max_optical_depth();
        optical_depth
            .iter()
            .map(|tau| !tau.is_nan() && (!self.extrapolate_optical_depth || *tau <= max))
            .collect()
    }

    /// True where the attenuation is extrapolated beyond the table
    pub fn extrapolation_mask(&self, optical_depth: &[f64]) -> Vec<bool> {
        let max = self.max_optical_depth();
        optical_depth
            .iter()
            .map(|tau| self.extrapolate_optical_depth && !tau.is_nan() && *tau > max)
            .collect()
    }

    /// Check galaxy values lie within the table, ignoring masked entries
    ///
    /// Columns are ordered as for [CompendiumTable::interpolate].
    pub fn check_ranges(
        &self,
        component: Component,
        columns: &[&[f64]],
        mask: Option<&[bool]>,
    ) -> Result<()> {
        let n = self.validate(component, columns, mask)?;
        let selected = |column: &[f64]| -> Vec<f64> {
            (0..n)
                .filter(|i| mask.map_or(true, |m| m[*i]))
                .map(|i| column[i])
                .collect()
        };

        check_within("wavelength", &selected(columns[0]), &self.wavelength)?;

        let inclination = selected(columns[1]);
        check_within("inclination", &inclination, &[0.0, 90.0])?;
        check_within("inclination", &inclination, &self.inclination)?;

        let optical_depth = selected(columns[2]);
        let lower = self.optical_depth[0];
        let upper = match self.extrapolate_optical_depth {
            true => f64::INFINITY,
            false => self.max_optical_depth(),
        };
        check_within("optical depth", &optical_depth, &[lower, upper])?;

        if component == Component::Spheroid {
            check_within(
                "spheroid radial scale",
                &selected(columns[3]),
                &self.spheroid_scale_radial,
            )?;
        }
        Ok(())
    }

    /// Attenuation for every galaxy
    ///
    /// `columns` holds wavelength (microns), inclination (degrees), optical
    /// depth and, for spheroids, the ratio of spheroid to disk scale radius.
    /// Entries outside `mask`, or with a NaN optical depth, are left at one.
    /// Attenuations above one are clipped.
    pub fn interpolate(
        &self,
        component: Component,
        columns: &[&[f64]],
        mask: Option<&[bool]>,
    ) -> Result<Vec<f64>> {
        let n = self.validate(component, columns, mask)?;
        let tables = match component {
            Component::Disk => &self.disk,
            Component::Spheroid => &self.spheroid,
        };

        let optical_depth = columns[2];
        let interpolated = self.optical_depth_mask(optical_depth);
        let extrapolated = self.extrapolation_mask(optical_depth);
        let selected = |i: usize| mask.map_or(true, |m| m[i]);

        let mut attenuation = vec![1.0; n];
        let mut point = vec![0.0; columns.len()];
        let mut clipped = 0;

        for i in 0..n {
            if !selected(i) {
                continue;
            }
            for (p, column) in point.iter_mut().zip(columns) {
                *p = column[i];
            }

            if interpolated[i] {
                attenuation[i] = tables.attenuation.interpolate(&point)?;
            } else if extrapolated[i] {
                // the optical depth is not an axis of the coefficient tables
                let mut reduced = point.clone();
                reduced.remove(2);
                let c0 = tables.extrapolation[0].interpolate(&reduced)?;
                let c1 = tables.extrapolation[1].interpolate(&reduced)?;
                attenuation[i] = (c0 + c1 * optical_depth[i].ln()).exp();
            }

            if attenuation[i] > 1.0 {
                attenuation[i] = 1.0;
                clipped += 1;
            }
        }

        if clipped > 0 {
            warn!("{clipped} {} attenuations greater than 1 clipped", component.name());
        }
        Ok(attenuation)
    }

    /// Number of galaxies, after checking the columns are consistent
    fn validate(
        &self,
        component: Component,
        columns: &[&[f64]],
        mask: Option<&[bool]>,
    ) -> Result<usize> {
        if columns.len() != component.interpolant_count() {
            return Err(Error::InterpolantCount {
                component: component.name(),
                expected: component.interpolant_count(),
                found: columns.len(),
            });
        }

        let n = columns[0].len();
        let lengths = columns.iter().map(|c| c.len()).chain(mask.map(|m| m.len()));
        for found in lengths {
            if found != n {
                return Err(Error::LengthMismatch { expected: n, found });
            }
        }
        Ok(n)
    }
}

impl Tables {
    /// `extrapolation` carries the two coefficients on its leading axis
    fn new(
        axes: Vec<Vec<f64>>,
        attenuation: ArrayD<f64>,
        extrapolation: ArrayD<f64>,
    ) -> Result<Self> {
        let mut reduced = axes.clone();
        reduced.remove(2);

        let coefficient = |k: usize| -> Result<RegularGrid> {
            let values = extrapolation.index_axis(Axis(0), k).to_owned();
            Ok(RegularGrid::new(reduced.clone(), values, Bounds::Error)?)
        };

        Ok(Self {
            attenuation: RegularGrid::new(axes, attenuation, Bounds::Error)?,
            extrapolation: [coefficient(0)?, coefficient(1)?],
        })
    }
}

/// Every value must lie within the first and last entries of `range`
fn check_within(quantity: &'static str, values: &[f64], range: &[f64]) -> Result<()> {
    let (lower, upper) = (range[0], range[range.len() - 1]);
    let out_of_range = values
        .iter()
        .filter(|v| !v.is_nan())
        .find(|v| **v < lower || **v > upper);

    match out_of_range {
        Some(value) => Err(Error::OutOfRange {
            quantity,
            value: *value,
            lower,
            upper,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use galtools_data::{Attribute, Attributes};
    use ndarray::{Array, Array3, Array4};

    /// Attenuation `exp(-τ/2)` independent of wavelength and inclination
    fn table(extrapolate: bool) -> CompendiumTable {
        let wavelength = vec![0.1, 1.0];
        let inclination = vec![0.0, 90.0];
        let optical_depth = vec![0.1_f64, 1.0, 10.0];
        let scale = vec![0.5, 2.0];

        let disk = Array3::from_shape_fn((2, 2, 3), |(_, _, t)| (-optical_depth[t] / 2.0).exp());
        let spheroid =
            Array4::from_shape_fn((2, 2, 3, 2), |(_, _, t, _)| (-optical_depth[t] / 2.0).exp());
        let disk_coefficients = Array::from_shape_fn((2, 2, 2), |(k, _, _)| [-1.0, -0.5][k]);
        let spheroid_coefficients =
            Array::from_shape_fn((2, 2, 2, 2), |(k, _, _, _)| [-1.0, -0.5][k]);

        let store = MemoryStore::new()
            .with_array("wavelength", Array::from_vec(wavelength.clone()).into_dyn())
            .with_array("inclination", Array::from_vec(inclination.clone()).into_dyn())
            .with_array("opticalDepth", Array::from_vec(optical_depth.clone()).into_dyn())
            .with_array("spheroidScaleRadial", Array::from_vec(scale).into_dyn())
            .with_array("attenuationDisk", disk.into_dyn())
            .with_array("attenuationSpheroid", spheroid.into_dyn())
            .with_array("extrapolationCoefficientsDisk", disk_coefficients.into_dyn())
            .with_array("extrapolationCoefficientsSpheroid", spheroid_coefficients.into_dyn())
            .with_attributes(
                "/",
                Attributes::from([("opacity".to_string(), Attribute::Float(4.0e4))]),
            );
        CompendiumTable::from_store(&store, extrapolate).unwrap()
    }

    #[test]
    fn masks() {
        let table = table(true);
        let tau = [0.5, 20.0, f64::NAN];
        assert_eq!(table.optical_depth_mask(&tau), vec![true, false, false]);
        assert_eq!(table.extrapolation_mask(&tau), vec![false, true, false]);

        let table = CompendiumTable {
            extrapolate_optical_depth: false,
            ..table
        };
        assert_eq!(table.optical_depth_mask(&tau), vec![true, true, false]);
        assert_eq!(table.extrapolation_mask(&tau), vec![false, false, false]);
    }

    #[test]
    fn interpolated_disk() {
        let table = table(true);
        let attenuation = table
            .interpolate(Component::Disk, &[&[0.5], &[45.0], &[1.0]], None)
            .unwrap();
        assert_relative_eq!(attenuation[0], (-0.5f64).exp(), max_relative = 1e-12);
    }

    #[test]
    fn masked_entries_stay_at_one() {
        let table = table(true);
        let attenuation = table
            .interpolate(
                Component::Disk,
                &[&[0.5, 0.5], &[45.0, 45.0], &[1.0, f64::NAN]],
                Some(&[false, true]),
            )
            .unwrap();
        assert_eq!(attenuation, vec![1.0, 1.0]);
    }

    #[test]
    fn interpolant_counts() {
        let table = table(true);
        let result = table.interpolate(Component::Spheroid, &[&[0.5], &[45.0], &[1.0]], None);
        assert!(matches!(
            result,
            Err(Error::InterpolantCount { expected: 4, found: 3, .. })
        ));
    }

    #[test]
    fn range_checks() {
        let table = table(false);
        let check = |i: f64, tau: f64| {
            table.check_ranges(Component::Disk, &[&[0.5], &[i], &[tau]], None)
        };
        assert!(check(45.0, 1.0).is_ok());
        assert!(matches!(check(95.0, 1.0), Err(Error::OutOfRange { .. })));
        assert!(matches!(check(45.0, 0.01), Err(Error::OutOfRange { .. })));
        assert!(matches!(check(45.0, 11.0), Err(Error::OutOfRange { .. })));

        // large optical depths are allowed when extrapolating
        let table = CompendiumTable {
            extrapolate_optical_depth: true,
            ..table
        };
        assert!(table
            .check_ranges(Component::Disk, &[&[0.5], &[45.0], &[11.0]], None)
            .is_ok());

        // masked galaxies are not checked
        assert!(table
            .check_ranges(Component::Disk, &[&[5.0], &[45.0], &[1.0]], Some(&[false]))
            .is_ok());
    }
}
