//! Integration tests for persisted array stores

use galtools_data::{Attribute, Attributes, DataStore, MemoryStore};
use ndarray::{arr1, arr2};
use rstest::{fixture, rstest};

#[fixture]
fn output() -> MemoryStore {
    MemoryStore::new()
        .with_array(
            "Outputs/Output1/nodeData/diskMassStellar",
            arr1(&[1.0e10, 0.0, 3.5e8]).into_dyn(),
        )
        .with_array(
            "Outputs/Output1/nodeData/totalSpectralEnergyDistribution",
            arr2(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).into_dyn(),
        )
        .with_attributes(
            "Parameters/cosmologyParameters",
            Attributes::from([
                ("HubbleConstant".to_string(), Attribute::Float(70.2)),
                ("label".to_string(), Attribute::from("WMAP7")),
            ]),
        )
}

#[rstest]
#[case("store.json")] // case 1
#[case("store.bin")] // case 2
#[case("store.JSON")] // case 3
fn persisted_store_is_identical(output: MemoryStore, #[case] name: &str) {
    let dir = std::env::temp_dir().join(format!("galtools-persist-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);

    output.write_file(&path).unwrap();
    let loaded = MemoryStore::read_file(&path).unwrap();

    assert_eq!(loaded, output);
    assert_eq!(
        loaded.list("Outputs/Output1/nodeData"),
        vec!["diskMassStellar", "totalSpectralEnergyDistribution"]
    );
}

#[rstest]
fn missing_files_are_io_errors() {
    let result = MemoryStore::read_file("/definitely/not/here.bin");
    assert!(matches!(result, Err(galtools_data::Error::Io(_))));
}

#[rstest]
fn parameters_are_readable(output: MemoryStore) {
    let attrs = output.read_attributes("Parameters/cosmologyParameters").unwrap();
    assert_eq!(attrs["HubbleConstant"].as_f64(), Some(70.2));
    assert_eq!(output.list("Parameters"), vec!["cosmologyParameters"]);
}
