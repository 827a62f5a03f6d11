//! Chart series assembly: one area series per selected metric, colored from
//! the cyclic palette. Years a metric has no value for are simply absent from
//! its points, never zero-filled.

use crate::dashboard::{metric_color, DashboardState};

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub metric: String,
    pub color: &'static str,
    pub points: Vec<(String, f64)>,
}

pub fn chart_series(state: &DashboardState) -> Vec<ChartSeries> {
    state
        .selected_metrics()
        .iter()
        .enumerate()
        .map(|(index, metric)| ChartSeries {
            metric: metric.clone(),
            color: metric_color(index),
            points: state
                .series()
                .iter()
                .filter_map(|entry| {
                    entry
                        .values
                        .get(metric)
                        .map(|value| (entry.year.clone(), *value))
                })
                .collect(),
        })
        .collect()
}
