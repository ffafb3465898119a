//! Calculators for every kind of derived property
//!
//! Each calculator is a unit struct implementing [Property] for one
//! [Kind]. Dependencies are always pulled through the accessor so that they
//! may themselves be raw or derived.

// Modules
mod continuum;
mod dust;
mod geometry;
mod host;
mod hydrogen;
mod lines;
mod luminosity;
mod magnitudes;
mod metallicity;
mod sed;
mod totals;

// Flatten
pub use geometry::random_inclinations;

// crate modules
use crate::error::{Error, Result};
use crate::name::{Kind, PropertyName};
use crate::registry::Property;

// galtools crates
use galtools_data::Dataset;

/// Attribute holding the SI value of one unit of a dataset
pub(crate) const UNITS_IN_SI: &str = "unitsInSI";

/// One instance of every built in calculator
pub fn standard() -> Vec<Box<dyn Property>> {
    vec![
        Box::new(totals::Totals),
        Box::new(totals::BulgeToTotal),
        Box::new(metallicity::Metallicity),
        Box::new(metallicity::PhaseMetallicity),
        Box::new(hydrogen::HydrogenGasDensity),
        Box::new(metallicity::MetalsGasDensity),
        Box::new(host::HostNode),
        Box::new(continuum::IonizingContinuum),
        Box::new(luminosity::StellarLuminosity),
        Box::new(lines::LineLuminosity),
        Box::new(lines::LineFlux),
        Box::new(lines::LineWidth),
        Box::new(magnitudes::Magnitude),
        Box::new(sed::SpectralEnergyDistribution),
        Box::new(dust::DustOpticalDepth),
        Box::new(dust::CharlotFallOpticalDepth),
        Box::new(dust::DustParameters),
        Box::new(geometry::Inclination),
        Box::new(geometry::Redshift),
        Box::new(geometry::SnapshotRedshift),
        Box::new(geometry::ObservedRedshift),
        Box::new(geometry::RightAscension),
        Box::new(geometry::Declination),
        Box::new(geometry::MergerTreeWeight),
    ]
}

/// A calculator was handed a name of another kind
pub(crate) fn mismatch(kind: Kind, name: &PropertyName) -> Error {
    Error::InvalidName {
        name: name.to_string(),
        reason: format!("not a {kind} property, parsed as {}", name.kind()),
    }
}

/// Number of galaxies shared by every dataset
///
/// Shapes must agree exactly so that element-wise arithmetic is defined.
pub(crate) fn check_lengths(datasets: &[&Dataset]) -> Result<usize> {
    let Some(first) = datasets.first() else {
        return Ok(0);
    };
    for dataset in &datasets[1..] {
        if dataset.data.shape() != first.data.shape() {
            return Err(Error::LengthMismatch {
                name: dataset.name.clone(),
                expected: first.len(),
                found: dataset.len(),
            });
        }
    }
    Ok(first.len())
}

/// `unitsInSI` of a dataset, one if absent
pub(crate) fn units_in_si(dataset: &Dataset) -> f64 {
    dataset
        .attr(UNITS_IN_SI)
        .and_then(|a| a.as_f64())
        .unwrap_or(1.0)
}

/// Sum of disk and spheroid datasets, attributes from the disk
pub(crate) fn sum_components(name: &PropertyName, disk: Dataset, spheroid: Dataset) -> Result<Dataset> {
    check_lengths(&[&disk, &spheroid])?;
    let data = &disk.data + &spheroid.data;
    Ok(Dataset::new(name.to_string(), data).with_attrs(disk.attrs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_must_agree() {
        let a = Dataset::from_vec("a", vec![1.0, 2.0]);
        let b = Dataset::from_vec("b", vec![1.0, 2.0, 3.0]);
        assert_eq!(check_lengths(&[&a, &a]).unwrap(), 2);
        assert!(matches!(
            check_lengths(&[&a, &b]),
            Err(Error::LengthMismatch { expected: 2, found: 3, .. })
        ));
        assert_eq!(check_lengths(&[]).unwrap(), 0);
    }

    #[test]
    fn components_sum() {
        let name = PropertyName::parse("totalMassStellar").unwrap();
        let disk = Dataset::from_vec("diskMassStellar", vec![1.0, 2.0]).with_attr(UNITS_IN_SI, 2.0);
        let spheroid = Dataset::from_vec("spheroidMassStellar", vec![3.0, 0.0]);
        let total = sum_components(&name, disk, spheroid).unwrap();
        assert_eq!(total.to_vec().unwrap(), vec![4.0, 2.0]);
        assert_eq!(units_in_si(&total), 2.0);
    }

    #[test]
    fn one_calculator_per_kind() {
        let mut kinds = standard().iter().map(|p| p.kind()).collect::<Vec<_>>();
        let count = kinds.len();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), count);
    }
}
