//! Loader semantics over constructed worksheet rows, the CSV path, and the
//! bundled sample workbook.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use calamine::Data;

use findash::data::dataset::{Dataset, DEFAULT_DATA_PATH};
use findash::data::loader::{load_records, records_from_rows, LoadError};

fn s(value: &str) -> Data {
    Data::String(value.to_string())
}

fn rows_to_records(rows: &[Vec<Data>]) -> Result<Vec<findash::data::record::Record>, LoadError> {
    records_from_rows(rows.iter().map(|row| row.as_slice()), "test")
}

fn unique_temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("findash-{name}-{stamp}.{ext}"))
}

#[test]
fn parses_rows_with_numeric_year_headers() {
    let rows = vec![
        vec![s("Company name"), s("Field"), Data::Float(2020.0), Data::Float(2021.0)],
        vec![s("Acme"), s("SALES"), Data::Float(100.0), Data::Int(150)],
    ];
    let records = rows_to_records(&rows).expect("rows should load");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].company, "Acme");
    assert_eq!(records[0].field, "SALES");
    assert_eq!(records[0].values.get(&2020), Some(&100.0));
    assert_eq!(records[0].values.get(&2021), Some(&150.0));
}

#[test]
fn string_year_headers_keep_their_four_digit_prefix() {
    let rows = vec![
        vec![s("Company name"), s("Field"), s("2020.0"), s("2021")],
        vec![s("Acme"), s("SALES"), Data::Float(1.0), Data::Float(2.0)],
    ];
    let records = rows_to_records(&rows).expect("rows should load");

    let years: Vec<u16> = records[0].values.keys().copied().collect();
    assert_eq!(years, [2020, 2021]);
}

#[test]
fn non_year_columns_are_ignored() {
    let rows = vec![
        vec![s("Company name"), s("Field"), s("Sector"), s("2020")],
        vec![s("Acme"), s("SALES"), s("Industrials"), Data::Float(100.0)],
    ];
    let records = rows_to_records(&rows).expect("rows should load");

    assert_eq!(records[0].values.len(), 1);
    assert_eq!(records[0].values.get(&2020), Some(&100.0));
}

#[test]
fn empty_cells_are_absent_but_unparseable_cells_become_zero() {
    let rows = vec![
        vec![s("Company name"), s("Field"), s("2019"), s("2020"), s("2021")],
        vec![s("Acme"), s("SALES"), Data::Empty, s("n/a"), s("12.5")],
    ];
    let records = rows_to_records(&rows).expect("rows should load");

    let values = &records[0].values;
    assert!(!values.contains_key(&2019));
    assert_eq!(values.get(&2020), Some(&0.0));
    assert_eq!(values.get(&2021), Some(&12.5));
}

#[test]
fn rows_missing_company_or_field_are_skipped() {
    let rows = vec![
        vec![s("Company name"), s("Field"), s("2020")],
        vec![s(""), s("SALES"), Data::Float(1.0)],
        vec![s("Acme"), s(""), Data::Float(2.0)],
        vec![Data::Empty, Data::Empty, Data::Empty],
        vec![s("Acme"), s("SALES"), Data::Float(3.0)],
    ];
    let records = rows_to_records(&rows).expect("rows should load");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].values.get(&2020), Some(&3.0));
}

#[test]
fn missing_required_columns_is_fatal() {
    let rows = vec![
        vec![s("Company"), s("Metric"), s("2020")],
        vec![s("Acme"), s("SALES"), Data::Float(1.0)],
    ];
    let err = rows_to_records(&rows).expect_err("required columns are absent");
    assert!(matches!(err, LoadError::MissingColumns { .. }));
}

#[test]
fn missing_file_is_fatal() {
    let result = load_records("data/no-such-file.xlsx");
    assert!(result.is_err());
}

#[test]
fn csv_path_loads_with_identical_column_semantics() {
    let path = unique_temp_path("dataset", "csv");
    fs::write(
        &path,
        "Company name,Field,2020.0,2021,Notes\n\
         Acme,SALES,100,150,good year\n\
         Acme,EBITDA,20,,\n\
         ,SALES,1,2,orphan row\n",
    )
    .expect("fixture should be written");

    let records = load_records(&path).expect("csv should load");
    let _ = fs::remove_file(&path);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].values.get(&2020), Some(&100.0));
    assert_eq!(records[0].values.get(&2021), Some(&150.0));
    assert_eq!(records[1].values.get(&2020), Some(&20.0));
    assert!(!records[1].values.contains_key(&2021));
}

#[test]
fn bundled_sample_workbook_loads() {
    let path = Path::new(DEFAULT_DATA_PATH);
    if !path.exists() {
        eprintln!("Skipping: {} not found", path.display());
        return;
    }

    let dataset = Dataset::load(path).expect("sample workbook should load");
    assert!(!dataset.records().is_empty(), "sample should have records");
    assert!(!dataset.companies().is_empty(), "sample should have companies");
    assert!(
        dataset.metrics().iter().any(|metric| metric == "SALES"),
        "sample should include a SALES metric"
    );
}
