//! Dataset diagnostics for the `validate` subcommand: structural problems are
//! errors, data-quality oddities the loader tolerates are warnings.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::data::loader::load_records;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }
}

/// Load the source table and report on its contents. Load failures (missing
/// file, missing required columns) come back as the outer Err.
pub fn validate_dataset(path: impl AsRef<Path>) -> Result<ValidationReport, String> {
    let path = path.as_ref();
    let records =
        load_records(path).map_err(|err| format!("unable to load '{}': {err}", path.display()))?;

    let mut report = ValidationReport::default();
    if records.is_empty() {
        report.push(
            ValidationSeverity::Error,
            path.display().to_string(),
            "no usable records (every row was missing company or field)",
        );
        return Ok(report);
    }

    let mut seen_pairs = HashSet::new();
    for (index, record) in records.iter().enumerate() {
        let context = format!("record[{index}] '{}'/'{}'", record.company, record.field);
        if !seen_pairs.insert((record.company.clone(), record.field.clone())) {
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                "duplicate company+metric row; the later row wins per year",
            );
        }
        if record.values.is_empty() {
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                "row has no year values",
            );
        }
        for (year, value) in &record.values {
            if *value == 0.0 {
                report.push(
                    ValidationSeverity::Info,
                    format!("{context} year {year}"),
                    "zero value (possibly a failed numeric coercion)",
                );
            }
        }
    }

    Ok(report)
}
