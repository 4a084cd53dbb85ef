use crate::log::sample::{LineOutcome, Sample, TimeUnit};
use anyhow::Context;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Matches the scheduler's profile lines, e.g.
///
/// [PROFILE] System agent_action_decision_system took 1.234567ms
///
/// Only the first occurrence on a line is used.
const PROFILE_LINE_RE: &str = r"System (\w+) took ([\d.]+)(ns|µs|ms)";

/// Compiled profile-line pattern.
#[derive(Debug, Clone)]
pub struct LineMatcher {
    re: Regex,
}

impl LineMatcher {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            re: Regex::new(PROFILE_LINE_RE)?,
        })
    }

    /// Extract a normalized sample from one line.
    ///
    /// Anything that does not look like a profile line, including a
    /// malformed number such as `1.2.3`, is `Skipped`.
    pub fn parse_line(&self, line: &str) -> LineOutcome {
        let Some(caps) = self.re.captures(line) else {
            return LineOutcome::Skipped;
        };

        let (Some(system), Some(value), Some(tag)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            return LineOutcome::Skipped;
        };
        let Ok(value) = value.as_str().parse::<f64>() else {
            return LineOutcome::Skipped;
        };
        let Some(unit) = TimeUnit::from_tag(tag.as_str()) else {
            return LineOutcome::Skipped;
        };

        LineOutcome::Sample(Sample {
            system: system.as_str().to_string(),
            duration_us: unit.to_micros(value),
        })
    }
}

/// Lazy sample stream over a profile log.
///
/// Non-matching lines are dropped; read errors are yielded with the file and
/// line number attached.
pub struct SampleReader<R> {
    lines: Lines<R>,
    matcher: LineMatcher,
    path: PathBuf,
    lineno: usize,
}

impl<R: BufRead> SampleReader<R> {
    pub fn new(reader: R, path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Ok(Self {
            lines: reader.lines(),
            matcher: LineMatcher::new()?,
            path: path.into(),
            lineno: 0,
        })
    }
}

impl<R: BufRead> Iterator for SampleReader<R> {
    type Item = anyhow::Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.lineno += 1;

            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    return Some(Err(e).with_context(|| {
                        format!("read log file {}:{}", self.path.display(), self.lineno)
                    }));
                }
            };

            if let LineOutcome::Sample(sample) = self.matcher.parse_line(&line) {
                return Some(Ok(sample));
            }
        }
    }
}

/// Open a profile log for lazy parsing.
///
/// The file is opened up front so a missing log fails before anything is
/// written.
pub fn open_log(path: &Path) -> anyhow::Result<SampleReader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("open log file {}", path.display()))?;
    SampleReader::new(BufReader::new(file), path)
}
