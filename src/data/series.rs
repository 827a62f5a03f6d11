//! The pivot: row-oriented metric records become year-indexed multi-metric
//! entries, sorted ascending by year. Computed fresh per request, never
//! cached.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::record::Record;

/// One year of the pivoted series. Serializes flat:
/// `{"year":"2020","SALES":100.0,"EBITDA":20.0}`. A metric key is present
/// only when the source row reported a value for that year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearEntry {
    pub year: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// Pivot the records matching `company` and `metrics` into a year-ordered
/// series. An empty result is a valid outcome ("no data"), distinct from a
/// bad request, which is rejected before this point.
///
/// Duplicate company+metric rows do not occur in sane source data; when they
/// do, the later row wins per year.
pub fn pivot_series(records: &[Record], company: &str, metrics: &[String]) -> Vec<YearEntry> {
    let mut by_year: BTreeMap<u16, BTreeMap<String, f64>> = BTreeMap::new();

    for record in records {
        if record.company != company || !metrics.iter().any(|m| *m == record.field) {
            continue;
        }
        for (year, value) in &record.values {
            by_year
                .entry(*year)
                .or_default()
                .insert(record.field.clone(), *value);
        }
    }

    by_year
        .into_iter()
        .map(|(year, values)| YearEntry {
            year: year.to_string(),
            values,
        })
        .collect()
}
