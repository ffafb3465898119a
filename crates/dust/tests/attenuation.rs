//! Integration tests for screen laws and the compendium table

use galtools_data::{Attribute, Attributes, DataStore, MemoryStore, ScreenSettings};
use galtools_dust::{CompendiumTable, Component, Error, ScreenLaw};

use approx::assert_relative_eq;
use ndarray::{Array, Array1};
use rstest::{fixture, rstest};

/// Disk table with a linear dependence on wavelength and a flat spheroid
#[fixture]
fn store() -> MemoryStore {
    let wavelength = vec![0.1, 0.5, 1.0, 5.0];
    let inclination = vec![0.0, 30.0, 60.0, 90.0];
    let optical_depth = vec![0.01, 0.1, 1.0, 10.0, 100.0];
    let scale = vec![0.1, 1.0, 10.0];

    let disk = Array::from_shape_fn((4, 4, 5), |(w, _, t)| {
        0.9 - 0.1 * w as f64 - 0.001 * optical_depth[t]
    });
    let spheroid = Array::from_shape_fn((4, 4, 5, 3), |(_, _, _, _)| 0.5);
    let disk_coefficients = Array::from_shape_fn((2, 4, 4), |(k, w, _)| match k {
        0 => -0.1 * w as f64,
        _ => -0.25,
    });
    let spheroid_coefficients = Array::from_shape_fn((2, 4, 4, 3), |(k, _, _, _)| match k {
        0 => 0.2,
        _ => 0.0,
    });

    let axis = |values: Vec<f64>| Array1::from_vec(values).into_dyn();
    MemoryStore::new()
        .with_array("wavelength", axis(wavelength))
        .with_array("inclination", axis(inclination))
        .with_array("opticalDepth", axis(optical_depth))
        .with_array("spheroidScaleRadial", axis(scale))
        .with_array("attenuationDisk", disk.into_dyn())
        .with_array("attenuationSpheroid", spheroid.into_dyn())
        .with_array("extrapolationCoefficientsDisk", disk_coefficients.into_dyn())
        .with_array("extrapolationCoefficientsSpheroid", spheroid_coefficients.into_dyn())
        .with_attributes(
            "/",
            Attributes::from([("opacity".to_string(), Attribute::Float(1.0e4))]),
        )
}

#[fixture]
fn table(store: MemoryStore) -> CompendiumTable {
    let _ = stderrlog::new().verbosity(1).init();
    CompendiumTable::from_store(&store, true).unwrap()
}

#[rstest]
fn beyond_the_table_is_extrapolated(table: CompendiumTable) {
    let tau_max = table.max_optical_depth();
    let tau = [2.0 * tau_max];
    assert_eq!(table.extrapolation_mask(&tau), vec![true]);
    assert_eq!(table.optical_depth_mask(&tau), vec![false]);

    // on the second wavelength node, c0 = -0.1 and c1 = -0.25
    let attenuation = table
        .interpolate(Component::Disk, &[&[0.5], &[30.0], &tau], None)
        .unwrap();
    let expected = (-0.1 - 0.25 * (2.0 * tau_max).ln()).exp();
    assert_relative_eq!(attenuation[0], expected, max_relative = 1e-12);
    assert!(attenuation[0] <= 1.0);
}

#[rstest]
fn extrapolated_spheroids_are_clipped(table: CompendiumTable) {
    // exp(0.2) > 1
    let attenuation = table
        .interpolate(
            Component::Spheroid,
            &[&[0.5, 0.5], &[30.0, 30.0], &[500.0, 1.0], &[1.0, 1.0]],
            None,
        )
        .unwrap();
    assert_eq!(attenuation, vec![1.0, 0.5]);
}

#[rstest]
#[case(0.1, 0.9)] // case 1
#[case(0.75, 0.75)] // case 2
#[case(5.0, 0.6)] // case 3
fn interpolated_disks(table: CompendiumTable, #[case] wavelength: f64, #[case] expected: f64) {
    // an optical depth of zero is below the table
    let error = table
        .interpolate(Component::Disk, &[&[wavelength], &[45.0], &[0.0]], None)
        .unwrap_err();
    assert!(matches!(error, Error::Numerical(_)));

    let attenuation = table
        .interpolate(Component::Disk, &[&[wavelength], &[45.0], &[10.0]], None)
        .unwrap();
    assert_relative_eq!(attenuation[0], expected - 0.01, max_relative = 1e-9);
}

#[rstest]
fn spheroid_scales_are_checked(table: CompendiumTable) {
    let result = table.check_ranges(
        Component::Spheroid,
        &[&[0.5], &[30.0], &[1.0], &[20.0]],
        None,
    );
    assert!(result.is_err());
}

#[rstest]
fn table_round_trips_through_a_file(store: MemoryStore) {
    let path = std::env::temp_dir().join(format!("galtools-compendium-{}.bin", std::process::id()));
    store.write_file(&path).unwrap();
    let loaded = MemoryStore::read_file(&path).unwrap();
    assert!(loaded.array_exists("attenuationSpheroid"));
    assert_relative_eq!(CompendiumTable::from_store(&loaded, false).unwrap().opacity, 1.0e4);
}

#[rstest]
#[case(ScreenLaw::Calzetti)] // case 1
#[case(ScreenLaw::Allen)] // case 2
#[case(ScreenLaw::Prevot)] // case 3
#[case(ScreenLaw::Fitzpatrick)] // case 4
#[case(ScreenLaw::Seaton)] // case 5
fn screens_match_selective_extinction(#[case] law: ScreenLaw) {
    let rv = law.rv(&ScreenSettings::default());
    let (wavelength, k) = law.nodes(rv).unwrap();
    let curve = law.curve(rv).unwrap();

    for (w, k) in wavelength.iter().zip(&k) {
        assert_relative_eq!(
            curve.curve(*w),
            (k + rv) / rv,
            epsilon = 1e-12,
            max_relative = 1e-9
        );
    }
    assert_eq!(law.to_string().parse::<ScreenLaw>().unwrap(), law);
}
