//! Integration tests for loading filters from a datasets repository

use galtools_data::Config;
use galtools_filters::{Error, Filter, FilterLibrary, Vega};

use approx::assert_relative_eq;
use rstest::{fixture, rstest};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static REPOSITORIES: AtomicUsize = AtomicUsize::new(0);

/// Repository with a flat-f_ν Vega spectrum, a V band and one broad band
#[fixture]
fn repository() -> PathBuf {
    let id = REPOSITORIES.fetch_add(1, Ordering::SeqCst);
    let root = std::env::temp_dir().join(format!("galtools-filters-{}-{id}", std::process::id()));
    let filters = root.join("static/filters");
    std::fs::create_dir_all(&filters).unwrap();

    let wavelength = (0..=1000).map(|i| 1000.0 + 20.0 * i as f64).collect::<Vec<_>>();
    let flux = wavelength.iter().map(|w| 1.0 / (w * w)).collect::<Vec<_>>();
    let spectrum = serde_json::json!({ "wavelength": wavelength, "flux": flux });
    std::fs::write(root.join("static/A0V_Castelli.json"), spectrum.to_string()).unwrap();

    let v_band = Filter::new(
        "Buser_V",
        vec![4800.0, 5000.0, 6000.0, 6200.0],
        vec![0.0, 1.0, 1.0, 0.0],
    )
    .unwrap();
    v_band.write_file(&filters).unwrap();

    let broad = Filter::new("broad", vec![3000.0, 3500.0, 4000.0], vec![0.2, 1.0, 0.2])
        .unwrap()
        .with_description("a test band");
    broad.write_file(&filters).unwrap();

    root
}

#[fixture]
fn library(repository: PathBuf) -> FilterLibrary {
    let _ = stderrlog::new().verbosity(1).init();
    let config = Config::new(&repository).unwrap();
    let vega = Vega::from_config(&config).unwrap();
    FilterLibrary::new().with_config(config).with_vega(vega)
}

#[rstest]
fn file_filters_gain_vega_offsets(library: FilterLibrary) {
    let broad = library.load("broad").unwrap();
    assert_eq!(broad.description.as_deref(), Some("a test band"));
    assert_relative_eq!(broad.effective_wavelength, 3500.0, max_relative = 1e-12);

    // the reference spectrum is flat in f_ν so both systems agree
    assert_relative_eq!(broad.vega_offset.unwrap(), 0.0, epsilon = 1e-6);
}

#[rstest]
#[case("adaptiveResolutionTopHat_3000_200")] // case 1
#[case("fixedResolutionTopHat_6563_500")] // case 2
fn top_hats_are_written_to_dynamic(library: FilterLibrary, #[case] name: &str) {
    let filter = library.load(name).unwrap();
    assert!(filter.vega_offset.is_some());

    let dynamic = library.config().unwrap().dynamic_path();
    let path = dynamic.join("filters").join(format!("{name}.json"));
    let saved = Filter::read_file(path).unwrap();
    assert_eq!(saved.name, name);
    assert_eq!(saved.vega_offset, filter.vega_offset);
}

#[rstest]
fn missing_filter(library: FilterLibrary) {
    assert!(matches!(library.load("SDSS_z"), Err(Error::Data(_))));
}
