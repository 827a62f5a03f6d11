//! Dashboard selection state: one company at most, a toggled set of metrics,
//! and the last applied series. The embedded page at `/` implements this same
//! flow in browser JS against the HTTP API; this module is the reference for
//! when a fetch is issued, when the series clears, and how racing responses
//! are applied.

pub mod chart;

use crate::data::series::YearEntry;

/// Chart color cycle, one entry per selected metric. Shorter than the
/// possible metric set; colors repeat cyclically.
pub const METRIC_PALETTE: [&str; 3] = ["#4f46e5", "#22c55e", "#f97316"];

pub fn metric_color(index: usize) -> &'static str {
    METRIC_PALETTE[index % METRIC_PALETTE.len()]
}

/// A fetch the driver should issue: the current company and metric selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub company: String,
    pub metrics: Vec<String>,
}

/// Client-held state. Transition methods return the `SeriesRequest` to issue
/// when the new selection warrants one; otherwise the series has already been
/// cleared and no request is due.
#[derive(Debug, Default)]
pub struct DashboardState {
    selected_company: Option<String>,
    selected_metrics: Vec<String>,
    series: Vec<YearEntry>,
    in_flight: usize,
}

impl DashboardState {
    pub fn new() -> DashboardState {
        DashboardState::default()
    }

    pub fn selected_company(&self) -> Option<&str> {
        self.selected_company.as_deref()
    }

    pub fn selected_metrics(&self) -> &[String] {
        &self.selected_metrics
    }

    pub fn series(&self) -> &[YearEntry] {
        &self.series
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Replace the selected company. Keeps the metric selection.
    pub fn select_company(&mut self, company: impl Into<String>) -> Option<SeriesRequest> {
        self.selected_company = Some(company.into());
        self.selection_changed()
    }

    pub fn clear_company(&mut self) -> Option<SeriesRequest> {
        self.selected_company = None;
        self.selection_changed()
    }

    /// Symmetric-difference update: selecting a metric adds it, re-selecting
    /// removes it.
    pub fn toggle_metric(&mut self, metric: &str) -> Option<SeriesRequest> {
        if let Some(position) = self.selected_metrics.iter().position(|m| m == metric) {
            self.selected_metrics.remove(position);
        } else {
            self.selected_metrics.push(metric.to_string());
        }
        self.selection_changed()
    }

    /// The fetch due for the current selection: company set and at least one
    /// metric selected, otherwise None.
    pub fn pending_request(&self) -> Option<SeriesRequest> {
        let company = self.selected_company.as_ref()?;
        if self.selected_metrics.is_empty() {
            return None;
        }
        Some(SeriesRequest {
            company: company.clone(),
            metrics: self.selected_metrics.clone(),
        })
    }

    /// Driver bookkeeping: a request returned by a transition has been issued.
    pub fn fetch_started(&mut self) {
        self.in_flight += 1;
    }

    /// Apply a fetch outcome. Last response wins: responses are applied in
    /// arrival order, so a stale slower response may overwrite a newer one
    /// (known race; selection changes faster than round-trips tolerate it).
    /// Failures clear the series and are logged, not surfaced destructively.
    pub fn apply_response(&mut self, result: Result<Vec<YearEntry>, String>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(series) => self.series = series,
            Err(err) => {
                self.series.clear();
                eprintln!("series fetch failed: {err}");
            }
        }
    }

    fn selection_changed(&mut self) -> Option<SeriesRequest> {
        match self.pending_request() {
            Some(request) => Some(request),
            None => {
                self.series.clear();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{metric_color, DashboardState, METRIC_PALETTE};
    use crate::data::series::YearEntry;
    use std::collections::BTreeMap;

    fn entry(year: &str, values: &[(&str, f64)]) -> YearEntry {
        YearEntry {
            year: year.to_string(),
            values: values
                .iter()
                .map(|(metric, value)| (metric.to_string(), *value))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn toggling_a_metric_twice_restores_the_original_set() {
        let mut state = DashboardState::new();
        state.select_company("Acme");
        state.toggle_metric("SALES");
        let before: Vec<String> = state.selected_metrics().to_vec();
        state.toggle_metric("EBITDA");
        state.toggle_metric("EBITDA");
        assert_eq!(state.selected_metrics(), before.as_slice());
    }

    #[test]
    fn selecting_a_company_keeps_the_metric_selection() {
        let mut state = DashboardState::new();
        state.toggle_metric("SALES");
        state.select_company("Acme");
        state.select_company("Globex");
        assert_eq!(state.selected_company(), Some("Globex"));
        assert_eq!(state.selected_metrics(), ["SALES"]);
    }

    #[test]
    fn no_request_until_company_and_metric_are_both_set() {
        let mut state = DashboardState::new();
        assert!(state.select_company("Acme").is_none());
        let request = state.toggle_metric("SALES").expect("selection is complete");
        assert_eq!(request.company, "Acme");
        assert_eq!(request.metrics, ["SALES"]);
    }

    #[test]
    fn emptying_the_selection_clears_the_series_without_a_request() {
        let mut state = DashboardState::new();
        state.select_company("Acme");
        state.toggle_metric("SALES");
        state.fetch_started();
        state.apply_response(Ok(vec![entry("2020", &[("SALES", 100.0)])]));
        assert!(!state.series().is_empty());

        assert!(state.toggle_metric("SALES").is_none());
        assert!(state.series().is_empty());
    }

    #[test]
    fn last_response_wins_across_racing_fetches() {
        let mut state = DashboardState::new();
        state.select_company("Acme");
        state.toggle_metric("SALES");
        state.fetch_started();
        state.fetch_started();

        state.apply_response(Ok(vec![entry("2021", &[("SALES", 150.0)])]));
        state.apply_response(Ok(vec![entry("2020", &[("SALES", 100.0)])]));

        assert!(!state.is_loading());
        assert_eq!(state.series()[0].year, "2020");
    }

    #[test]
    fn failed_fetch_clears_the_series() {
        let mut state = DashboardState::new();
        state.select_company("Acme");
        state.toggle_metric("SALES");
        state.fetch_started();
        state.apply_response(Ok(vec![entry("2020", &[("SALES", 100.0)])]));

        state.fetch_started();
        assert!(state.is_loading());
        state.apply_response(Err("connection reset".to_string()));
        assert!(state.series().is_empty());
        assert!(!state.is_loading());
    }

    #[test]
    fn palette_repeats_cyclically() {
        assert_eq!(metric_color(0), METRIC_PALETTE[0]);
        assert_eq!(metric_color(METRIC_PALETTE.len()), METRIC_PALETTE[0]);
        assert_eq!(metric_color(METRIC_PALETTE.len() + 1), METRIC_PALETTE[1]);
    }
}
