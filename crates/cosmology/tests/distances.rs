//! Integration tests for cosmological times and distances

use approx::assert_relative_eq;
use galtools_cosmology::{Cosmology, CosmologyParameters};
use rstest::{fixture, rstest};

#[fixture]
fn wmap7() -> Cosmology {
    Cosmology::wmap(7).unwrap()
}

#[fixture]
fn open() -> Cosmology {
    Cosmology::new(CosmologyParameters {
        omega0: 0.3,
        lambda0: 0.0,
        zmax: 10.0,
        nz: 2000,
        ..Default::default()
    })
}

#[rstest]
#[case(0.0)] // case 1
#[case(0.1)] // case 2
#[case(1.0)] // case 3
#[case(3.7)] // case 4
#[case(12.0)] // case 5
fn lookback_is_difference_of_ages(wmap7: Cosmology, #[case] z: f64) {
    let lookback = wmap7.lookback_time(z).unwrap();
    let ages = wmap7.age_of_universe(0.0).unwrap() - wmap7.age_of_universe(z).unwrap();
    assert_relative_eq!(lookback, ages, epsilon = 1e-12);
}

#[rstest]
#[case(0.5)] // case 1
#[case(2.0)] // case 2
fn open_universe_lookback(open: Cosmology, #[case] z: f64) {
    let lookback = open.lookback_time(z).unwrap();
    assert!(lookback > 0.0);
    assert!(lookback < open.age_of_universe(0.0).unwrap());
}

#[rstest]
fn flat_age_today(wmap7: Cosmology) {
    // WMAP7 universe is roughly 13.7 Gyr old with physical h
    let physical = Cosmology::new(CosmologyParameters {
        h_independent: false,
        ..wmap7.parameters().clone()
    });
    let age = physical.age_of_universe(0.0).unwrap();
    assert!(age > 13.5 && age < 14.0, "age was {age}");
}

#[rstest]
fn low_redshift_hubble_law(wmap7: Cosmology) {
    // D ~ cz/H0 for small z
    let z = 1.0e-3;
    assert_relative_eq!(
        wmap7.comoving_distance(z),
        wmap7.hubble_distance() * z,
        max_relative = 1e-3
    );
}

#[rstest]
fn open_geometry_transverse_distance_exceeds_radial(open: Cosmology) {
    assert!(open.omega_k() > 0.0);
    assert!(open.comoving_transverse_distance(2.0) > open.comoving_distance(2.0));
    assert!(open.comoving_volume(2.0) > 0.0);
}

#[rstest]
fn volume_element_integrates_to_volume(wmap7: Cosmology) {
    let volume = galtools_utils::romberg(|z| wmap7.dvdz(z), 0.0, 0.5);
    assert_relative_eq!(volume, wmap7.comoving_volume(0.5), max_relative = 1e-4);
}

#[rstest]
fn realspace_radius_is_comoving_distance(wmap7: Cosmology) {
    let [x, y, z] = wmap7.realspace(123.0, -45.0, 0.8);
    assert_relative_eq!(
        (x * x + y * y + z * z).sqrt(),
        wmap7.comoving_distance(0.8),
        max_relative = 1e-12
    );
}
