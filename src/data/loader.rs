//! Dataset ingestion: first worksheet of an .xls/.xlsx workbook, or a .csv
//! file with the same columns. Rows missing "Company name" or "Field" are
//! logged and skipped; a missing file or missing required columns is fatal.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::data::record::{
    parse_year_label, value_from_str, Record, COMPANY_COLUMN, FIELD_COLUMN,
};

#[derive(Debug)]
pub enum LoadError {
    Workbook(calamine::Error),
    Csv(csv::Error),
    NoWorksheet,
    MissingColumns { path: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook(err) => write!(f, "unable to read workbook: {err}"),
            Self::Csv(err) => write!(f, "unable to read csv: {err}"),
            Self::NoWorksheet => write!(f, "workbook has no worksheets"),
            Self::MissingColumns { path } => write!(
                f,
                "'{path}' is missing required columns '{COMPANY_COLUMN}' and/or '{FIELD_COLUMN}'"
            ),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<calamine::Error> for LoadError {
    fn from(err: calamine::Error) -> Self {
        Self::Workbook(err)
    }
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Load records from the source table. A .csv extension selects the CSV
/// reader; anything else is opened as a spreadsheet workbook (first sheet).
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>, LoadError> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        records_from_csv(path)
    } else {
        records_from_workbook(path)
    }
}

fn records_from_workbook(path: &Path) -> Result<Vec<Record>, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet_name)?;
    records_from_rows(range.rows(), &path.display().to_string())
}

/// Build records from raw worksheet rows; the first row is the header.
/// Split out from the workbook open so row semantics are testable on
/// constructed cells.
pub fn records_from_rows<'r>(
    rows: impl Iterator<Item = &'r [Data]>,
    source: &str,
) -> Result<Vec<Record>, LoadError> {
    let mut rows = rows;
    let header = rows.next().ok_or(LoadError::MissingColumns {
        path: source.to_string(),
    })?;

    let labels: Vec<String> = header.iter().map(header_label).collect();
    let columns = ColumnMap::from_labels(&labels).ok_or(LoadError::MissingColumns {
        path: source.to_string(),
    })?;

    let mut records = Vec::new();
    for (index, row) in rows.enumerate() {
        let company = cell_text(row.get(columns.company));
        let field = cell_text(row.get(columns.field));
        if company.is_empty() || field.is_empty() {
            if !row_is_blank(row) {
                eprintln!(
                    "skipping row {} of '{}': missing '{}' or '{}'",
                    index + 2,
                    source,
                    COMPANY_COLUMN,
                    FIELD_COLUMN
                );
            }
            continue;
        }

        let mut values = BTreeMap::new();
        for (column, year) in &columns.years {
            if let Some(value) = row.get(*column).and_then(cell_value) {
                values.insert(*year, value);
            }
        }
        records.push(Record {
            company,
            field,
            values,
        });
    }
    Ok(records)
}

fn records_from_csv(path: &Path) -> Result<Vec<Record>, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let labels: Vec<String> = reader
        .headers()?
        .iter()
        .map(|label| label.trim().to_string())
        .collect();
    let columns = ColumnMap::from_labels(&labels).ok_or(LoadError::MissingColumns {
        path: path.display().to_string(),
    })?;

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = result?;
        let company = row.get(columns.company).unwrap_or("").trim().to_string();
        let field = row.get(columns.field).unwrap_or("").trim().to_string();
        if company.is_empty() || field.is_empty() {
            eprintln!(
                "skipping row {} of '{}': missing '{}' or '{}'",
                index + 2,
                path.display(),
                COMPANY_COLUMN,
                FIELD_COLUMN
            );
            continue;
        }

        let mut values = BTreeMap::new();
        for (column, year) in &columns.years {
            if let Some(value) = row.get(*column).and_then(value_from_str) {
                values.insert(*year, value);
            }
        }
        records.push(Record {
            company,
            field,
            values,
        });
    }
    Ok(records)
}

/// Column layout resolved from the header row: required columns by exact
/// label, plus every year-labeled column.
struct ColumnMap {
    company: usize,
    field: usize,
    years: Vec<(usize, u16)>,
}

impl ColumnMap {
    fn from_labels(labels: &[String]) -> Option<ColumnMap> {
        let company = labels.iter().position(|l| l == COMPANY_COLUMN)?;
        let field = labels.iter().position(|l| l == FIELD_COLUMN)?;
        let years = labels
            .iter()
            .enumerate()
            .filter_map(|(column, label)| parse_year_label(label).map(|year| (column, year)))
            .collect();
        Some(ColumnMap {
            company,
            field,
            years,
        })
    }
}

fn header_label(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => format!("{f}"),
        Data::Int(i) => i.to_string(),
        _ => String::new(),
    }
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::String(s)) => s.trim().to_string(),
        Some(Data::Float(f)) => format!("{f}"),
        Some(Data::Int(i)) => i.to_string(),
        _ => String::new(),
    }
}

/// Numeric value of a data cell. Empty cells are absent; present cells that
/// cannot be coerced become 0.
fn cell_value(cell: &Data) -> Option<f64> {
    match cell {
        Data::Empty => None,
        Data::String(s) => value_from_str(s),
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        _ => Some(0.0),
    }
}

fn row_is_blank(row: &[Data]) -> bool {
    row.iter().all(|cell| match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    })
}
