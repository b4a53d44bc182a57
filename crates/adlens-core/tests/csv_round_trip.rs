use std::fs;
use std::path::PathBuf;

use adlens_core::{
    DatasetKind, Value, filter_by, load_dataset, read_dataset, to_csv_string, write_csv,
};

fn fixture(kind: DatasetKind) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../data/fixtures")
        .join(kind.default_file_name())
}

#[test]
fn every_fixture_round_trips_through_csv() {
    for kind in DatasetKind::ALL {
        let dataset = load_dataset(kind, &fixture(kind))
            .unwrap_or_else(|err| panic!("load {kind}: {err}"));
        let text = to_csv_string(&dataset).expect("export csv");
        let reloaded = read_dataset(kind.as_str(), &kind.contract(), text.as_bytes())
            .expect("reload exported csv");
        assert_eq!(dataset, reloaded, "{kind} should round-trip");
    }
}

#[test]
fn non_finite_cells_load_as_zero() {
    let dataset = load_dataset(
        DatasetKind::AdPerformance,
        &fixture(DatasetKind::AdPerformance),
    )
    .expect("load ad performance");
    let unity = filter_by(&dataset, "channel", &Value::from("Unity")).expect("filter");
    let revenue_idx = dataset
        .column_index("revenue_2024_01_01")
        .expect("revenue column");
    assert_eq!(unity.records()[0].get(revenue_idx), &Value::Float(0.0));
}

#[test]
fn filtered_subsets_reassemble_the_dataset() {
    let dataset =
        load_dataset(DatasetKind::Installs, &fixture(DatasetKind::Installs)).expect("load");
    let mut reassembled = Vec::new();
    for country in dataset.distinct_values("countryName").expect("countries") {
        let subset = filter_by(&dataset, "countryName", &country).expect("filter");
        reassembled.extend(subset.records().iter().cloned());
    }

    let mut original = dataset.records().to_vec();
    let key = |record: &adlens_core::Record| {
        record
            .values()
            .iter()
            .map(Value::to_csv)
            .collect::<Vec<_>>()
            .join(",")
    };
    original.sort_by_key(key);
    reassembled.sort_by_key(key);
    assert_eq!(original, reassembled);
}

#[test]
fn export_writes_to_file() {
    let dataset =
        load_dataset(DatasetKind::Revenue, &fixture(DatasetKind::Revenue)).expect("load");
    let germany = filter_by(&dataset, "countryName", &Value::from("Germany")).expect("filter");

    let mut dir = std::env::temp_dir();
    dir.push(format!("adlens_core_export_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("Germany_revenue.csv");

    let file = fs::File::create(&path).expect("create export file");
    let bytes = write_csv(&germany, file).expect("write csv");
    let contents = fs::read_to_string(&path).expect("read export");

    assert_eq!(bytes, contents.len() as u64);
    assert_eq!(contents.lines().count(), 4);
    assert!(contents.lines().skip(1).all(|line| line.contains(",Germany,")));
}
