//! Integration tests for emission line lookups

use galtools_cloudy::{CloudyTable, Error, INTERPOLANTS};
use galtools_data::{Attribute, Attributes, CloudySettings, Config, MemoryStore};

use approx::assert_relative_eq;
use ndarray::{Array, Array1, IxDyn};
use rstest::{fixture, rstest};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static REPOSITORIES: AtomicUsize = AtomicUsize::new(0);

/// Table where log10 L(Hα) = 40 + log10 Z + log10 Q_H
///
/// Nodes sit on decades so that the log10 axes are integers. The [OIII]
/// line is flat.
#[fixture]
fn store() -> MemoryStore {
    let nodes: [Vec<f64>; 5] = [
        vec![1.0e-4_f64, 1.0e-3, 1.0e-2],
        vec![1.0, 10.0, 100.0, 1000.0],
        vec![1.0e48, 1.0e49, 1.0e50, 1.0e51],
        vec![0.01, 0.1],
        vec![0.001, 0.01, 0.1],
    ];
    let shape = nodes.iter().map(Vec::len).collect::<Vec<_>>();

    let mut store = MemoryStore::new();
    for (name, values) in INTERPOLANTS.iter().zip(&nodes) {
        store = store.with_array(name, Array1::from_vec(values.clone()).into_dyn());
    }

    let alpha = Array::from_shape_fn(IxDyn(&shape), |index| {
        40.0 + nodes[0][index[0]].log10() + nodes[2][index[2]].log10()
    });
    let oxygen = Array::from_elem(IxDyn(&shape), 38.0);
    let wavelength = |w: f64| Attributes::from([("wavelength".to_string(), Attribute::Float(w))]);

    store
        .with_array("lines/balmerAlpha6565", alpha)
        .with_attributes("lines/balmerAlpha6565", wavelength(6564.61))
        .with_array("lines/oxygenIII5008", oxygen)
        .with_attributes("lines/oxygenIII5008", wavelength(5008.24))
}

#[fixture]
fn repository(store: MemoryStore) -> PathBuf {
    let id = REPOSITORIES.fetch_add(1, Ordering::SeqCst);
    let root = std::env::temp_dir().join(format!("galtools-cloudy-{}-{id}", std::process::id()));
    let directory = root.join("static/hiiRegions");
    std::fs::create_dir_all(&directory).unwrap();
    store.write_file(directory.join("emissionLines.json")).unwrap();
    root
}

#[rstest]
#[case([-3.0, 1.0, 49.0, -2.0, -2.0], 86.0)] // case 1
#[case([-2.5, 1.7, 50.0, -1.3, -2.3], 87.5)] // case 2
#[case([-2.0, 3.0, 51.0, -1.0, -1.0], 89.0)] // case 3
fn balmer_alpha(store: MemoryStore, #[case] point: [f64; 5], #[case] expected: f64) {
    let table = CloudyTable::from_store(Box::new(store), None, &CloudySettings::default()).unwrap();
    let value = table.interpolate("balmerAlpha6565", point).unwrap();
    assert_relative_eq!(value, expected, max_relative = 1e-12);
}

#[rstest]
fn columns_of_galaxies(store: MemoryStore) {
    let table = CloudyTable::from_store(
        Box::new(store),
        Some(&["oxygenIII5008", "balmerAlpha6565"]),
        &CloudySettings::default(),
    )
    .unwrap();

    let metallicity = [-4.0, -2.0];
    let density = [1.0, 1.0];
    let flux = [48.0, 50.0];
    let helium = [-1.5, -1.5];
    let oxygen = [-2.0, -2.0];

    let alpha = table
        .interpolate_many("balmerAlpha6565", [&metallicity, &density, &flux, &helium, &oxygen])
        .unwrap();
    assert_relative_eq!(alpha[0], 84.0, max_relative = 1e-12);
    assert_relative_eq!(alpha[1], 88.0, max_relative = 1e-12);

    let flat = table
        .interpolate_many("oxygenIII5008", [&metallicity, &density, &flux, &helium, &oxygen])
        .unwrap();
    assert_eq!(flat, vec![38.0, 38.0]);

    let mismatch = table.interpolate_many("oxygenIII5008", [&metallicity, &density, &flux, &helium, &[-2.0]]);
    assert!(matches!(mismatch, Err(Error::LengthMismatch { expected: 2, found: 1 })));
}

#[rstest]
fn table_from_repository(repository: PathBuf) {
    let mut config = Config::new(&repository).unwrap();
    config.settings.cloudy.bounds_error = true;

    let table = CloudyTable::from_config(&config, Some(&["balmerAlpha6565"])).unwrap();
    assert_eq!(table.lines().len(), 1);
    assert_eq!(
        table.list_available_lines(),
        vec!["balmerAlpha6565", "oxygenIII5008"]
    );
    assert_relative_eq!(table.wavelength("balmerAlpha6565").unwrap(), 6564.61);

    // bounds errors are taken from the settings
    let outside = table.interpolate("balmerAlpha6565", [0.0, 1.0, 49.0, -2.0, -2.0]);
    assert!(matches!(outside, Err(Error::Numerical(_))));
}
