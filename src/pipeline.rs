//! One profiling run: parse, summarize, record, compare, plot.

use crate::Result;
use crate::history::{HistoryStore, RunId};
use crate::log::open_log;
use crate::model::{SampleSet, Summary};
use crate::render::{self, FigureSink};
use crate::report::{self, Comparison};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a run produced, for callers that want more than the console text.
#[derive(Debug)]
pub struct RunOutcome {
    pub run: RunId,
    pub summary: Summary,
    pub summary_path: PathBuf,
    /// `None` when there was no earlier run to compare against.
    pub comparisons: Option<Vec<Comparison>>,
    pub figures: usize,
}

/// Execute the full pipeline, writing the console report to `out`.
///
/// A missing log aborts before anything is printed or stored.
pub fn run(
    log_path: &Path,
    run: RunId,
    history: &mut dyn HistoryStore,
    sink: &mut dyn FigureSink,
    out: &mut dyn Write,
) -> Result<RunOutcome> {
    // 1) Parse + group.
    let samples = SampleSet::collect(open_log(log_path)?)?;
    info!(log = %log_path.display(), samples = samples.total_samples(), "log parsed");

    // 2) Aggregate.
    let summary = samples.summarize();
    info!(systems = summary.len(), "samples aggregated");
    write!(out, "{}", report::render_summary_table(&summary))?;

    // 3) Record + compare against the previous run.
    let summary_path = history.append(&run, &summary)?;
    writeln!(out, "Saved summary to {}", summary_path.display())?;

    let previous = history.load_previous(&run)?;
    write!(out, "{}", report::render_regressions(&summary, previous.as_ref()))?;
    let comparisons = previous.as_ref().map(|p| report::compare(&summary, p));
    if let Some(cs) = &comparisons {
        let flagged = cs.iter().filter(|c| c.regression).count();
        info!(compared = cs.len(), regressions = flagged, "regression check done");
    }

    // 4) Plot.
    let figures = render::build_figures(&summary, &samples);
    render::render_figures(sink, &figures)?;
    let figure_count = figures.series.len() + usize::from(figures.histograms.is_some());

    Ok(RunOutcome {
        run,
        summary,
        summary_path,
        comparisons,
        figures: figure_count,
    })
}
