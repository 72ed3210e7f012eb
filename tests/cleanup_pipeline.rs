//! Cleanup Pipeline Integration Tests
//!
//! Runs raw API-shaped CSV samples through the same steps the download
//! commands use: date conversion, protocol cleanup, flagging and QA
//! filtering. No network access is needed.
//!
//! Run with: cargo test --test cleanup_pipeline

use go_utils::download::convert_dates_to_datetime;
use go_utils::lc;
use go_utils::mhm;
use go_utils::table::Table;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn load_raw(name: &str) -> Table {
    let path = format!("{}/tests/sample_data/{}", env!("CARGO_MANIFEST_DIR"), name);
    let mut table = Table::read_csv(&path).expect("sample data should load");
    convert_dates_to_datetime(&mut table);
    table
}

fn flagged_mhm() -> Table {
    let mut table = mhm::apply_cleanup(&load_raw("mhm.csv")).expect("mhm cleanup");
    mhm::add_flags(&mut table).expect("mhm flags");
    table
}

fn flagged_lc() -> Table {
    let mut table = lc::apply_cleanup(&load_raw("lc.csv")).expect("lc cleanup");
    lc::add_flags(&mut table).expect("lc flags");
    table
}

fn ints(table: &Table, column: &str) -> Vec<i64> {
    table
        .values(column)
        .unwrap_or_else(|_| panic!("missing column {}", column))
        .iter()
        .map(|v| v.as_i64().expect("integer cell"))
        .collect()
}

fn floats(table: &Table, column: &str) -> Vec<f64> {
    table
        .values(column)
        .unwrap_or_else(|_| panic!("missing column {}", column))
        .iter()
        .map(|v| v.as_f64().expect("numeric cell"))
        .collect()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{:?} != {:?}", actual, expected);
    }
}

// ---------------------------------------------------------------------------
// Mosquito Habitat Mapper
// ---------------------------------------------------------------------------

#[test]
fn test_mhm_cleanup_renames_and_converts() {
    let table = mhm::apply_cleanup(&load_raw("mhm.csv")).unwrap();

    // Same value in every row
    assert!(!table.has_column("protocol"));
    assert!(!table.has_column("mhm_protocol"));

    for column in ["mhm_Latitude", "mhm_Longitude", "mhm_MGRSLatitude", "mhm_MGRSLongitude", "mhm_siteId"] {
        assert!(table.has_column(column), "missing {}", column);
    }
    assert_close(&floats(&table, "mhm_Latitude")[..1], &[-1.28346]);

    assert_eq!(ints(&table, "mhm_LarvaeCount"), vec![10, 101, 25, 101, -9999]);
    assert_eq!(ints(&table, "mhm_LarvaeCountMagnitude"), vec![0, 1, 0, 4, 0]);
    assert_eq!(ints(&table, "mhm_LarvaeCountIsRangeFlag"), vec![0, 1, 1, 0, 0]);
}

#[test]
fn test_mhm_flags() {
    let table = flagged_mhm();

    assert_eq!(ints(&table, "mhm_HasGenus"), vec![1, 1, 0, 1, 0]);
    assert_eq!(ints(&table, "mhm_IsGenusOfInterest"), vec![1, 1, 0, 1, 0]);
    assert_eq!(ints(&table, "mhm_IsWaterSourceContainer"), vec![1, 0, 1, 0, 0]);
    assert_eq!(ints(&table, "mhm_HasWaterSource"), vec![1, 1, 1, 1, 0]);

    assert_eq!(ints(&table, "mhm_PhotoCount"), vec![2, 2, 1, 0, 0]);
    assert_eq!(ints(&table, "mhm_RejectedCount"), vec![0, 1, 0, 0, 0]);
    assert_eq!(ints(&table, "mhm_PendingCount"), vec![0, 0, 0, 0, 1]);
    assert_eq!(ints(&table, "mhm_PhotoBitDecimal"), vec![6, 3, 4, 0, 0]);

    assert_close(&floats(&table, "mhm_SubCompletenessScore"), &[0.75, 0.75, 0.25, 0.25, 0.0]);
    for score in floats(&table, "mhm_CumulativeCompletenessScore") {
        assert!(score > 0.0 && score <= 1.0);
    }
}

#[test]
fn test_mhm_qa_filter() {
    let table = flagged_mhm();
    let sites = |options: mhm::QaOptions| ints(&mhm::qa_filter(&table, &options).unwrap(), "mhm_siteId");

    assert_eq!(sites(mhm::QaOptions::default()).len(), 5);
    assert_eq!(sites(mhm::QaOptions { has_genus: true, ..Default::default() }), vec![123, 456, 1011]);
    assert_eq!(sites(mhm::QaOptions { is_container: true, ..Default::default() }), vec![123, 789]);
    assert_eq!(sites(mhm::QaOptions { has_photos: true, ..Default::default() }), vec![123, 456, 789]);
    assert_eq!(
        sites(mhm::QaOptions { min_larvae_count: Some(25), ..Default::default() }),
        vec![456, 789, 1011]
    );
    assert_eq!(
        sites(mhm::QaOptions {
            has_genus: true,
            has_photos: true,
            is_container: true,
            ..Default::default()
        }),
        vec![123]
    );
}

#[test]
fn test_mhm_diagnostics_report() {
    let report = mhm::diagnostics(&flagged_mhm()).unwrap();
    assert_eq!(report.entries, 5);

    let photos = report.section("Entries with Photos vs No Photos").unwrap();
    assert_eq!(photos.value("Valid Photos"), Some("3"));
    assert_eq!(photos.value("No Photos"), Some("2"));

    let larvae = report.section("Larvae Count Distribution").unwrap();
    assert_eq!(larvae.value("101"), Some("2"));

    let sources = report.section("Water Source Frequency").unwrap();
    assert_eq!(sources.value("pond"), Some("1"));
    assert_eq!(sources.value("tire"), Some("1"));
    assert!(report.to_string().contains("MOSQUITO HABITAT MAPPER DIAGNOSTICS (5 entries)"));
}

// ---------------------------------------------------------------------------
// Landcover
// ---------------------------------------------------------------------------

#[test]
fn test_lc_cleanup_unpacks_classifications() {
    let table = lc::apply_cleanup(&load_raw("lc.csv")).unwrap();

    assert_eq!(ints(&table, "lc_North_TreesCloselySpacedDeciduousBroadLeaved"), vec![60, 0, 0]);
    assert_eq!(ints(&table, "lc_North_UrbanRoadsAndParking"), vec![40, 0, 0]);
    assert_eq!(ints(&table, "lc_North_HerbaceousGrasslandShortGrass"), vec![0, 100, 0]);
    assert_eq!(ints(&table, "lc_East_UrbanRoadsAndParking"), vec![70, 70, 0]);
    assert_eq!(ints(&table, "lc_West_HerbaceousGrasslandShortGrass"), vec![100, 0, 0]);

    let names = table.column_names();
    let pid = names.iter().position(|n| n == "lc_pid").expect("lc_pid kept");
    assert_eq!(names[pid + 1], "lc_DownwardPhotoUrl");
}

#[test]
fn test_lc_flags() {
    let table = flagged_lc();

    assert_eq!(ints(&table, "lc_PhotoBitDecimal"), vec![63, 40, 0]);
    assert_eq!(ints(&table, "lc_PhotoCount"), vec![6, 2, 0]);
    assert_eq!(ints(&table, "lc_RejectedCount"), vec![0, 1, 0]);
    assert_eq!(ints(&table, "lc_PendingCount"), vec![0, 0, 1]);
    assert_eq!(ints(&table, "lc_EmptyCount"), vec![0, 3, 5]);
    assert_eq!(ints(&table, "lc_ClassificationBitDecimal"), vec![15, 10, 0]);
    assert_eq!(ints(&table, "lc_ClassificationCount"), vec![4, 2, 0]);
    assert_close(&floats(&table, "lc_SubCompletenessScore"), &[1.0, 0.4, 0.0]);
}

#[test]
fn test_lc_qa_filter() {
    let table = flagged_lc();
    let sites = |options: lc::QaOptions| ints(&lc::qa_filter(&table, &options).unwrap(), "lc_siteId");

    assert_eq!(sites(lc::QaOptions::default()), vec![201, 202, 203]);
    assert_eq!(sites(lc::QaOptions { has_photo: true, ..Default::default() }), vec![201, 202]);
    assert_eq!(sites(lc::QaOptions { has_classification: true, ..Default::default() }), vec![201, 202]);
    assert_eq!(sites(lc::QaOptions { has_all_photos: true, ..Default::default() }), vec![201]);
    assert_eq!(
        sites(lc::QaOptions { has_all_classifications: true, ..Default::default() }),
        vec![201]
    );
}

#[test]
fn test_lc_diagnostics_report() {
    let report = lc::diagnostics(&flagged_lc()).unwrap();
    let summary = report.section("Photo Summary").unwrap();
    assert_eq!(summary.value("lc_PhotoCount"), Some("8"));
    assert_eq!(summary.value("lc_RejectedCount"), Some("1"));
    assert_eq!(summary.value("lc_EmptyCount"), Some("8"));

    let directions = report.section("Classification Direction Frequency").unwrap();
    assert_eq!(directions.value("North"), Some("2"));
    assert_eq!(directions.value("South"), Some("1"));
}

// ---------------------------------------------------------------------------
// CSV Round Trip
// ---------------------------------------------------------------------------

#[test]
fn test_flagged_data_survives_csv_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let mhm_path = dir.path().join("mhm_clean.csv");
    flagged_mhm().write_csv(&mhm_path).unwrap();
    let reloaded = Table::read_csv(&mhm_path).unwrap();
    let with_photos = mhm::qa_filter(
        &reloaded,
        &mhm::QaOptions { has_photos: true, ..Default::default() },
    )
    .unwrap();
    assert_eq!(with_photos.len(), 3);

    let lc_path = dir.path().join("lc_clean.csv");
    flagged_lc().write_csv(&lc_path).unwrap();
    let reloaded = Table::read_csv(&lc_path).unwrap();
    let complete = lc::qa_filter(
        &reloaded,
        &lc::QaOptions { has_all_photos: true, has_all_classifications: true, ..Default::default() },
    )
    .unwrap();
    assert_eq!(ints(&complete, "lc_siteId"), vec![201]);
}
