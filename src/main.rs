use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

mod history;
mod log;
mod model;
mod pipeline;
mod render;
mod report;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser, Debug)]
#[command(name = "ecs-profile-report")]
#[command(
    about = "Summarize ECS system timings, track them across runs, and plot the slowest systems",
    long_about = None
)]
struct Cli {
    /// Profile log to read (`System <name> took <n>ns|µs|ms` lines).
    #[arg(long, default_value = "ecs_profile.log")]
    log: PathBuf,

    /// Where per-run summaries and plots are kept.
    #[arg(long, default_value = "profiling/results")]
    results_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = PlotMode::Svg)]
    plots: PlotMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PlotMode {
    /// Write SVG figures under <results-dir>/plots/<run id>/.
    Svg,
    /// Skip plotting.
    #[value(name = "none")]
    Off,
}

fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout carries the report. RUST_LOG sets the level.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(?cli, "starting");

    let run = history::RunId::now();
    let mut store = history::CsvHistory::new(&cli.results_dir);

    let mut sink: Box<dyn render::FigureSink> = match cli.plots {
        PlotMode::Svg => Box::new(render::SvgSink::new(
            store.dir().join("plots").join(run.as_str()),
        )),
        PlotMode::Off => Box::new(render::NullSink),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = pipeline::run(&cli.log, run, &mut store, sink.as_mut(), &mut out)?;

    let regressions = outcome
        .comparisons
        .as_ref()
        .map(|cs| cs.iter().filter(|c| c.regression).count());
    info!(
        run = %outcome.run,
        summary = %outcome.summary_path.display(),
        systems = outcome.summary.len(),
        figures = outcome.figures,
        ?regressions,
        "done"
    );
    Ok(())
}
