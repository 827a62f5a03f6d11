//! Record: one source row (company + metric + sparse year values).
//! Year-column labels and cell values are normalized here; the loader feeds
//! both the workbook and CSV paths through these helpers.

use std::collections::BTreeMap;

/// Header label of the company column in the source table.
pub const COMPANY_COLUMN: &str = "Company name";
/// Header label of the metric-name column in the source table.
pub const FIELD_COLUMN: &str = "Field";

/// One source row: a single company+metric and its values across years.
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub company: String,
    pub field: String,
    /// Sparse year -> value mapping. Only years the row reported are present.
    pub values: BTreeMap<u16, f64>,
}

impl Record {
    pub fn new(company: impl Into<String>, field: impl Into<String>) -> Self {
        Record {
            company: company.into(),
            field: field.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_values(
        company: impl Into<String>,
        field: impl Into<String>,
        values: impl IntoIterator<Item = (u16, f64)>,
    ) -> Self {
        Record {
            company: company.into(),
            field: field.into(),
            values: values.into_iter().collect(),
        }
    }
}

/// Parse a year-column label: a four-digit year, optionally with a trailing
/// ".0" artifact from numeric header coercion ("2020.0" -> 2020).
/// Anything else is not a year column.
pub fn parse_year_label(label: &str) -> Option<u16> {
    let trimmed = label.trim();
    let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Coerce a raw cell string to a value. Empty cells are absent (None);
/// anything present that fails numeric parsing becomes 0 (documented
/// data-quality degradation, not an error).
pub fn value_from_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.parse().unwrap_or(0.0))
}
