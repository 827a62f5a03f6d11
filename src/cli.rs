//! Subcommand dispatch for the findash binary.

use serde_json::json;

use crate::data::dataset::{Dataset, DEFAULT_DATA_PATH};
use crate::data::validate::validate_dataset;
use crate::server::{self, ServerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Inspect,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("inspect") => Some(Command::Inspect),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Inspect) => handle_inspect(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: findash <serve|inspect|validate>");
            2
        }
    }
}

fn handle_serve() -> i32 {
    let config = ServerConfig::from_env();
    match server::run_server(&config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_inspect(args: &[String]) -> i32 {
    let path = args
        .get(2)
        .map(String::as_str)
        .unwrap_or(DEFAULT_DATA_PATH);

    let dataset = match Dataset::load(path) {
        Ok(dataset) => dataset,
        Err(err) => {
            eprintln!("inspect failed: {err}");
            return 1;
        }
    };

    let span = dataset.year_span();
    let summary = json!({
        "source_path": dataset.source_path(),
        "record_count": dataset.records().len(),
        "companies": dataset.companies(),
        "metrics": dataset.metrics(),
        "year_min": span.map(|(min, _)| min),
        "year_max": span.map(|(_, max)| max),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize dataset summary: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let path = args
        .get(2)
        .map(String::as_str)
        .unwrap_or(DEFAULT_DATA_PATH);

    let report = match validate_dataset(path) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    for diag in &report.diagnostics {
        eprintln!("- [{}] {}: {}", diag.severity, diag.context, diag.message);
    }
    if report.has_errors() {
        eprintln!(
            "validation failed: {} issue(s)",
            report.diagnostics.len()
        );
        1
    } else {
        println!("validation passed: {path}");
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, Command};

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_commands_parse() {
        assert_eq!(parse_command(&args(&["findash", "serve"])), Some(Command::Serve));
        assert_eq!(
            parse_command(&args(&["findash", "inspect"])),
            Some(Command::Inspect)
        );
        assert_eq!(
            parse_command(&args(&["findash", "validate"])),
            Some(Command::Validate)
        );
    }

    #[test]
    fn unknown_or_missing_command_is_none() {
        assert_eq!(parse_command(&args(&["findash"])), None);
        assert_eq!(parse_command(&args(&["findash", "optimize"])), None);
    }
}
