use crate::Result;
use crate::render::{FigureSink, GRID, HistogramFigure, SeriesFigure};
use anyhow::{Context, anyhow};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const HISTOGRAM_SIZE: (u32, u32) = (1400, 1000);
const SERIES_SIZE: (u32, u32) = (1000, 300);
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Writes each figure as an SVG file under one directory.
///
/// histograms.svg          the 2x2 histogram grid
/// <system>_series.svg     one per plotted system
#[derive(Debug, Clone)]
pub struct SvgSink {
    dir: PathBuf,
}

impl SvgSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn prepare(&self, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create plot directory {}", self.dir.display()))?;
        Ok(self.dir.join(name))
    }
}

fn plot_err<E: std::fmt::Display>(path: &Path) -> impl FnOnce(E) -> anyhow::Error + '_ {
    move |e| anyhow!("render {}: {}", path.display(), e)
}

/// Pad a flat range so the axis has something to span.
fn padded(lo: f64, hi: f64) -> (f64, f64) {
    if lo < hi {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

impl FigureSink for SvgSink {
    fn histograms(&mut self, figure: &HistogramFigure) -> Result<()> {
        let path = self.prepare("histograms.svg")?;
        {
            let root = SVGBackend::new(&path, HISTOGRAM_SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(plot_err(&path))?;

            // Cells past the last panel are left undrawn.
            let cells = root.split_evenly(GRID);
            for (area, panel) in cells.iter().zip(&figure.panels) {
                let (lo, hi) = padded(panel.x_range().0, panel.x_range().1);
                let y_max = panel.max_count() + 1;

                let mut chart = ChartBuilder::on(area)
                    .caption(&panel.title, ("sans-serif", 22))
                    .margin(12)
                    .x_label_area_size(40)
                    .y_label_area_size(50)
                    .build_cartesian_2d(lo..hi, 0u64..y_max)
                    .map_err(plot_err(&path))?;

                chart
                    .configure_mesh()
                    .x_desc(&figure.x_label)
                    .y_desc(&figure.y_label)
                    .draw()
                    .map_err(plot_err(&path))?;

                chart
                    .draw_series(panel.bins.iter().map(|b| {
                        let style = BAR_COLOR.mix(0.7).filled();
                        Rectangle::new([(b.start, 0), (b.end, b.count)], style)
                    }))
                    .map_err(plot_err(&path))?;
            }

            root.present().map_err(plot_err(&path))?;
        }
        info!(path = %path.display(), "figure written");
        Ok(())
    }

    fn series(&mut self, figure: &SeriesFigure) -> Result<()> {
        let path = self.prepare(&format!("{}_series.svg", figure.system))?;
        {
            let root = SVGBackend::new(&path, SERIES_SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(plot_err(&path))?;

            let last = figure.values.len().saturating_sub(1).max(1) as f64;
            let y_lo = figure.values.iter().copied().fold(f64::INFINITY, f64::min);
            let y_hi = figure.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let (y_lo, y_hi) = if figure.values.is_empty() {
                (0.0, 1.0)
            } else {
                padded(y_lo, y_hi)
            };

            let mut chart = ChartBuilder::on(&root)
                .caption(&figure.title, ("sans-serif", 20))
                .margin(10)
                .x_label_area_size(35)
                .y_label_area_size(60)
                .build_cartesian_2d(0f64..last, y_lo..y_hi)
                .map_err(plot_err(&path))?;

            chart
                .configure_mesh()
                .x_desc(&figure.x_label)
                .y_desc(&figure.y_label)
                .draw()
                .map_err(plot_err(&path))?;

            chart
                .draw_series(LineSeries::new(
                    figure.values.iter().enumerate().map(|(i, v)| (i as f64, *v)),
                    &BAR_COLOR,
                ))
                .map_err(plot_err(&path))?;

            root.present().map_err(plot_err(&path))?;
        }
        info!(path = %path.display(), "figure written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Sample;
    use crate::model::SampleSet;
    use crate::render::{build_figures, render_figures};
    use pretty_assertions::assert_eq;

    const PANEL_TITLE: &str = "execution time (µs)";

    /// Render the figures for `rows` into `dir` and list the files, sorted.
    fn render_into(dir: &Path, rows: &[(&str, f64)]) -> Vec<String> {
        let mut set = SampleSet::default();
        for (system, d) in rows {
            set.push(Sample {
                system: system.to_string(),
                duration_us: *d,
            });
        }
        let figures = build_figures(&set.summarize(), &set);

        let mut sink = SvgSink::new(dir);
        render_figures(&mut sink, &figures).unwrap();

        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn writes_grid_and_one_series_per_system() {
        let dir = tempfile::tempdir().unwrap();
        let plots = dir.path().join("plots");
        let rows = [("Physics", 0.5), ("Physics", 1500.0), ("Ai", 3.0), ("Ai", 4.0)];

        let names = render_into(&plots, &rows);
        assert_eq!(names, vec!["Ai_series.svg", "Physics_series.svg", "histograms.svg"]);

        let svg = fs::read_to_string(plots.join("histograms.svg")).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Physics execution time (µs)"));
        assert!(svg.contains("Ai execution time (µs)"));
        // two systems, two panels; the other grid cells stay empty
        assert_eq!(svg.matches(PANEL_TITLE).count(), 2);
    }

    #[test]
    fn only_top_four_systems_are_plotted() {
        let dir = tempfile::tempdir().unwrap();
        let rows = [
            ("Ai", 1.0),
            ("Food", 2.0),
            ("Physics", 3.0),
            ("Render", 4.0),
            ("Spawn", 5.0),
        ];

        let names = render_into(dir.path(), &rows);
        assert_eq!(
            names,
            vec![
                "Food_series.svg",
                "Physics_series.svg",
                "Render_series.svg",
                "Spawn_series.svg",
                "histograms.svg",
            ]
        );

        let svg = fs::read_to_string(dir.path().join("histograms.svg")).unwrap();
        assert_eq!(svg.matches(PANEL_TITLE).count(), 4);
        assert!(!svg.contains("Ai execution time"));
    }

    #[test]
    fn single_sample_series_renders() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = SvgSink::new(dir.path());
        sink.series(&SeriesFigure {
            system: "Solo".to_string(),
            title: "Solo execution time per tick".to_string(),
            values: vec![42.0],
            x_label: "Tick".to_string(),
            y_label: "Time (µs)".to_string(),
        })
        .unwrap();

        assert!(dir.path().join("Solo_series.svg").exists());
    }
}
