//! Diagnostic figures for the slowest systems.
//!
//! Figures are plain data built from the run's samples; a `FigureSink`
//! decides what rendering means (SVG files, or nothing at all when headless).

pub mod svg;

pub use svg::SvgSink;

use crate::Result;
use crate::model::{SampleSet, Summary};
use tracing::debug;

/// Number of systems (by mean, descending) that get figures.
pub const TOP_SYSTEMS: usize = 4;
pub const HISTOGRAM_BINS: usize = 30;
/// The histogram figure is a fixed 2x2 grid.
pub const GRID: (usize, usize) = (2, 2);

pub const TIME_LABEL: &str = "Time (µs)";
pub const COUNT_LABEL: &str = "Count";
pub const TICK_LABEL: &str = "Tick";

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPanel {
    pub system: String,
    pub title: String,
    pub bins: Vec<Bin>,
}

impl HistogramPanel {
    pub fn x_range(&self) -> (f64, f64) {
        match (self.bins.first(), self.bins.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (0.0, 1.0),
        }
    }

    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Up to `GRID.0 * GRID.1` histogram panels, filled row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramFigure {
    pub panels: Vec<HistogramPanel>,
    pub x_label: String,
    pub y_label: String,
}

/// Durations of one system in log order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFigure {
    pub system: String,
    pub title: String,
    pub values: Vec<f64>,
    pub x_label: String,
    pub y_label: String,
}

/// Everything drawn for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figures {
    pub histograms: Option<HistogramFigure>,
    pub series: Vec<SeriesFigure>,
}

/// Destination for rendered figures.
pub trait FigureSink {
    fn histograms(&mut self, figure: &HistogramFigure) -> Result<()>;
    fn series(&mut self, figure: &SeriesFigure) -> Result<()>;
}

/// Discards all figures.
#[derive(Debug, Default)]
pub struct NullSink;

impl FigureSink for NullSink {
    fn histograms(&mut self, figure: &HistogramFigure) -> Result<()> {
        let systems: Vec<&str> = figure.panels.iter().map(|p| p.system.as_str()).collect();
        debug!(?systems, "histogram figure skipped");
        Ok(())
    }

    fn series(&mut self, figure: &SeriesFigure) -> Result<()> {
        debug!(system = %figure.system, "series figure skipped");
        Ok(())
    }
}

/// Equal-width bins over `[min, max]`, the last bin closed on the right.
///
/// A zero-width range is widened to `[v - 0.5, v + 0.5]`.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: lo + width * i as f64,
            end: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for &v in values {
        // Settle on the stored edges so a value on a boundary opens the upper bin.
        let mut idx = (((v - lo) / width) as usize).min(bins - 1);
        if idx > 0 && v < out[idx].start {
            idx -= 1;
        } else if idx + 1 < bins && v >= out[idx + 1].start {
            idx += 1;
        }
        out[idx].count += 1;
    }
    out
}

/// Build the histogram grid and per-system series for the top systems.
pub fn build_figures(summary: &Summary, samples: &SampleSet) -> Figures {
    let top = summary.top(TOP_SYSTEMS.min(GRID.0 * GRID.1));
    if top.is_empty() {
        return Figures::default();
    }

    let panels = top
        .iter()
        .map(|r| HistogramPanel {
            system: r.system.clone(),
            title: format!("{} execution time (µs)", r.system),
            bins: histogram_bins(samples.series(&r.system), HISTOGRAM_BINS),
        })
        .collect();

    let series = top
        .iter()
        .map(|r| SeriesFigure {
            system: r.system.clone(),
            title: format!("{} execution time per tick", r.system),
            values: samples.series(&r.system).to_vec(),
            x_label: TICK_LABEL.to_string(),
            y_label: TIME_LABEL.to_string(),
        })
        .collect();

    Figures {
        histograms: Some(HistogramFigure {
            panels,
            x_label: TIME_LABEL.to_string(),
            y_label: COUNT_LABEL.to_string(),
        }),
        series,
    }
}

/// Histogram grid first, then one series figure per system.
pub fn render_figures(sink: &mut dyn FigureSink, figures: &Figures) -> Result<()> {
    if let Some(h) = &figures.histograms {
        sink.histograms(h)?;
    }
    for s in &figures.series {
        sink.series(s)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Sample;
    use pretty_assertions::assert_eq;

    fn samples(rows: &[(&str, f64)]) -> SampleSet {
        let mut set = SampleSet::default();
        for (system, d) in rows {
            set.push(Sample {
                system: system.to_string(),
                duration_us: *d,
            });
        }
        set
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl FigureSink for Recorder {
        fn histograms(&mut self, figure: &HistogramFigure) -> Result<()> {
            self.calls.push(format!("hist:{}", figure.panels.len()));
            Ok(())
        }

        fn series(&mut self, figure: &SeriesFigure) -> Result<()> {
            self.calls.push(format!("series:{}", figure.system));
            Ok(())
        }
    }

    #[test]
    fn bins_cover_range_and_count_everything() {
        let values: Vec<f64> = (0..=300).map(|v| v as f64).collect();
        let bins = histogram_bins(&values, HISTOGRAM_BINS);

        assert_eq!(bins.len(), 30);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[29].end, 300.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<u64>(), 301);
        // the max lands in the closed last bin
        assert_eq!(bins[29].count, 11);
    }

    #[test]
    fn boundary_values_follow_stored_edges() {
        let values = [0.0, 0.3, 0.6, 0.7, 0.9, 1.0];
        let bins = histogram_bins(&values, 10);

        for v in values {
            let owners: Vec<usize> = bins
                .iter()
                .enumerate()
                .filter(|(i, b)| v >= b.start && (v < b.end || *i == bins.len() - 1))
                .map(|(i, _)| i)
                .collect();
            assert_eq!(owners.len(), 1, "value {} owned by {:?}", v, owners);
        }
        for (i, b) in bins.iter().enumerate() {
            let expected = values
                .iter()
                .filter(|&&v| v >= b.start && (v < b.end || i == bins.len() - 1))
                .count() as u64;
            assert_eq!(b.count, expected, "bin {} [{}, {})", i, b.start, b.end);
        }
    }

    #[test]
    fn constant_values_widen_range() {
        let bins = histogram_bins(&[7.0, 7.0, 7.0], 30);
        assert_eq!(bins[0].start, 6.5);
        assert_eq!(bins[29].end, 7.5);
        assert_eq!(bins[15].count, 3);
    }

    #[test]
    fn no_figures_without_systems() {
        let set = SampleSet::default();
        let figures = build_figures(&set.summarize(), &set);
        assert_eq!(figures, Figures::default());

        let mut rec = Recorder::default();
        render_figures(&mut rec, &figures).unwrap();
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn selects_top_four_by_mean() {
        let set = samples(&[
            ("A", 1.0),
            ("B", 2.0),
            ("C", 3.0),
            ("D", 4.0),
            ("E", 5.0),
            ("E", 7.0),
        ]);
        let figures = build_figures(&set.summarize(), &set);

        let hist = figures.histograms.as_ref().unwrap();
        let names: Vec<&str> = hist.panels.iter().map(|p| p.system.as_str()).collect();
        assert_eq!(names, vec!["E", "D", "C", "B"]);
        assert_eq!(hist.panels[0].title, "E execution time (µs)");
        assert_eq!(hist.x_label, "Time (µs)");
        assert_eq!(hist.y_label, "Count");

        assert_eq!(figures.series.len(), 4);
        assert_eq!(figures.series[0].values, vec![5.0, 7.0]);
        assert_eq!(figures.series[0].x_label, "Tick");
    }

    #[test]
    fn fewer_systems_fewer_panels() {
        let set = samples(&[("Physics", 0.5), ("Physics", 1500.0), ("Ai", 3.0)]);
        let figures = build_figures(&set.summarize(), &set);

        let mut rec = Recorder::default();
        render_figures(&mut rec, &figures).unwrap();
        assert_eq!(rec.calls, vec!["hist:2", "series:Physics", "series:Ai"]);
    }

    #[test]
    fn panel_ranges() {
        let set = samples(&[("Physics", 0.5), ("Physics", 1500.0)]);
        let figures = build_figures(&set.summarize(), &set);
        let panel = &figures.histograms.unwrap().panels[0];

        assert_eq!(panel.x_range(), (0.5, 1500.0));
        assert_eq!(panel.max_count(), 1);
    }
}
