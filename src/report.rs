//! Console report: summary table and run-over-run regression check.

use crate::model::Summary;
use colored::Colorize;
use std::fmt::Write as _;

/// Mean increase (percent) above which a system is flagged.
pub const REGRESSION_THRESHOLD_PCT: f64 = 5.0;

/// Mean change of one system against the previous run.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub system: String,
    pub previous_mean: f64,
    pub current_mean: f64,
    pub change: f64,
    pub percent: f64,
    pub regression: bool,
}

impl Comparison {
    pub fn new(system: impl Into<String>, previous_mean: f64, current_mean: f64) -> Self {
        let change = current_mean - previous_mean;
        let percent = if previous_mean == 0.0 {
            0.0
        } else {
            100.0 * change / previous_mean
        };

        Self {
            system: system.into(),
            previous_mean,
            current_mean,
            change,
            percent,
            regression: change > 0.0 && percent > REGRESSION_THRESHOLD_PCT,
        }
    }

    /// One report line; the marker is the only colored part.
    pub fn line(&self) -> String {
        let marker = if self.regression {
            " <-- REGRESSION".red().bold().to_string()
        } else {
            String::new()
        };
        format!(
            "{:35}: {:8.2} -> {:8.2}  (Δ={:7.2} µs, {:6.2}%) {}",
            self.system, self.previous_mean, self.current_mean, self.change, self.percent, marker
        )
    }
}

/// Compare every system present in both runs, in `current` order.
///
/// Systems new in `current` are not reported.
pub fn compare(current: &Summary, previous: &Summary) -> Vec<Comparison> {
    current
        .records()
        .iter()
        .filter_map(|cur| {
            previous
                .get(&cur.system)
                .map(|prev| Comparison::new(&cur.system, prev.mean, cur.mean))
        })
        .collect()
}

/// Render the regression section for a run with or without a baseline.
pub fn render_regressions(current: &Summary, previous: Option<&Summary>) -> String {
    let Some(previous) = previous else {
        return "No previous run for regression check.\n".to_string();
    };

    let mut out = String::from("\nRegression Check vs. previous run:\n");
    for c in compare(current, previous) {
        let _ = writeln!(out, "{}", c.line());
    }
    out
}

/// Render the summary as an aligned text table, one row per system.
pub fn render_summary_table(summary: &Summary) -> String {
    let width = summary
        .records()
        .iter()
        .map(|r| r.system.len())
        .max()
        .unwrap_or(0)
        .max("system".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$} {:>12} {:>12} {:>12} {:>12} {:>7}",
        "system",
        "mean",
        "std",
        "min",
        "max",
        "count",
        width = width
    );
    if summary.is_empty() {
        let _ = writeln!(out, "(no samples)");
        return out;
    }
    for r in summary.records() {
        let std = if r.std_dev.is_nan() {
            "NaN".to_string()
        } else {
            format!("{:.3}", r.std_dev)
        };
        let _ = writeln!(
            out,
            "{:<width$} {:>12.3} {:>12} {:>12.3} {:>12.3} {:>7}",
            r.system,
            r.mean,
            std,
            r.min,
            r.max,
            r.count,
            width = width
        );
    }
    out
}
