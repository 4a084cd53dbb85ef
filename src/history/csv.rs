use crate::Result;
use crate::history::{HistoryStore, RunId};
use crate::model::{AggregateRecord, Summary};
use anyhow::{Context, bail};
use csv::{ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_PREFIX: &str = "profile_summary_";
const FILE_SUFFIX: &str = ".csv";
const HEADER: [&str; 6] = ["system", "mean", "std", "min", "max", "count"];

/// History kept as one `profile_summary_<run id>.csv` per run in a directory.
///
/// Columns (header included):
/// system,mean,std,min,max,count
///
/// An undefined std (single-sample system) is an empty cell.
#[derive(Debug, Clone)]
pub struct CsvHistory {
    dir: PathBuf,
}

impl CsvHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, run: &RunId) -> PathBuf {
        self.dir.join(format!("{}{}{}", FILE_PREFIX, run.as_str(), FILE_SUFFIX))
    }

    /// All stored runs, oldest first.
    pub fn runs(&self) -> Result<Vec<RunId>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("list results directory {}", self.dir.display()));
            }
        };

        let mut runs = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("list results directory {}", self.dir.display()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(run) = name
                .strip_prefix(FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
                .and_then(RunId::parse)
            {
                runs.push(run);
            }
        }
        runs.sort();
        Ok(runs)
    }

    /// Read one stored summary back, keeping its row order.
    pub fn load(&self, run: &RunId) -> Result<Summary> {
        let path = self.path_for(run);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(&path)
            .with_context(|| format!("read summary file {}", path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("read summary header {}", path.display()))?;
        if headers.iter().ne(HEADER) {
            bail!("unexpected header in {}: {:?}", path.display(), headers);
        }

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.with_context(|| format!("read summary file {}", path.display()))?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let record = parse_row(&row)
                .with_context(|| format!("summary parse error at {}:{}", path.display(), line))?;
            records.push(record);
        }

        Ok(Summary::from_ordered(records))
    }
}

impl HistoryStore for CsvHistory {
    fn append(&mut self, run: &RunId, summary: &Summary) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create results directory {}", self.dir.display()))?;

        let path = self.path_for(run);
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_path(&path)
            .with_context(|| format!("create summary file {}", path.display()))?;

        writer.write_record(HEADER)?;
        for r in summary.records() {
            writer.write_record([
                r.system.clone(),
                fmt_float(r.mean),
                fmt_float(r.std_dev),
                fmt_float(r.min),
                fmt_float(r.max),
                r.count.to_string(),
            ])?;
        }
        writer.flush().with_context(|| format!("write summary file {}", path.display()))?;

        debug!(path = %path.display(), rows = summary.len(), "summary written");
        Ok(path)
    }

    fn load_previous(&self, current: &RunId) -> Result<Option<Summary>> {
        let runs = self.runs()?;
        debug!(stored = runs.len(), "history listed");

        match runs.iter().rev().find(|r| *r != current) {
            Some(prev) => {
                debug!(run = %prev, "baseline selected");
                self.load(prev).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Shortest round-trip form; NaN becomes an empty cell.
fn fmt_float(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        format!("{:?}", v)
    }
}

fn parse_float(cell: &str) -> Result<f64> {
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    Ok(cell.parse()?)
}

fn parse_row(row: &StringRecord) -> Result<AggregateRecord> {
    let field = |i: usize| row.get(i).unwrap_or("");
    Ok(AggregateRecord {
        system: field(0).to_string(),
        mean: parse_float(field(1))?,
        std_dev: parse_float(field(2))?,
        min: parse_float(field(3))?,
        max: parse_float(field(4))?,
        count: field(5).parse()?,
    })
}
