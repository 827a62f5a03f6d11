//! Startup-loaded dataset for the server. Load once at startup, pass via Arc
//! to handlers so requests never touch the filesystem.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::data::loader::{load_records, LoadError};
use crate::data::record::Record;

pub const DEFAULT_DATA_PATH: &str = "data/financials.xlsx";

/// Read-only collection of records loaded once at process start, plus the
/// distinct company and metric lists cached in first-occurrence order.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<Record>,
    companies: Vec<String>,
    metrics: Vec<String>,
    source_path: String,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Load the source table from disk. Any failure here is a fatal startup
    /// error; the server must not begin serving on a partial load.
    pub fn load(path: impl AsRef<Path>) -> Result<Arc<Dataset>, LoadError> {
        let path = path.as_ref();
        let records = load_records(path)?;
        let mut dataset = Dataset::from_records(records);
        dataset.source_path = path.display().to_string();
        Ok(Arc::new(dataset))
    }

    /// Build a dataset from already-parsed records (tests and benches).
    pub fn from_records(records: Vec<Record>) -> Dataset {
        let companies = distinct_non_empty(records.iter().map(|r| r.company.as_str()));
        let metrics = distinct_non_empty(records.iter().map(|r| r.field.as_str()));
        Dataset {
            records,
            companies,
            metrics,
            source_path: String::new(),
            loaded_at: Utc::now(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct non-empty company names, ordered by first occurrence.
    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    /// Distinct non-empty metric (field) names, ordered by first occurrence.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Smallest and largest year any record reported, if any.
    pub fn year_span(&self) -> Option<(u16, u16)> {
        let mut span: Option<(u16, u16)> = None;
        for record in &self.records {
            for year in record.values.keys() {
                span = Some(match span {
                    None => (*year, *year),
                    Some((min, max)) => (min.min(*year), max.max(*year)),
                });
            }
        }
        span
    }
}

fn distinct_non_empty<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = Vec::new();
    for name in names {
        if name.is_empty() {
            continue;
        }
        if !seen.iter().any(|existing: &String| existing == name) {
            seen.push(name.to_string());
        }
    }
    seen
}
