//! Aggregation model: group samples per system and summarize them.

use crate::Result;
use crate::log::Sample;
use std::collections::BTreeMap;

/// Per-system statistics for one run. All times are in microseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecord {
    pub system: String,
    pub mean: f64,
    /// Sample standard deviation; NaN for a single sample.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub count: u64,
}

impl AggregateRecord {
    /// Summarize a non-empty slice of durations.
    pub fn from_durations(system: impl Into<String>, durations: &[f64]) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }

        let n = durations.len() as f64;
        let mean = durations.iter().sum::<f64>() / n;
        let std_dev = if durations.len() < 2 {
            f64::NAN
        } else {
            let ss: f64 = durations.iter().map(|d| (d - mean) * (d - mean)).sum();
            (ss / (n - 1.0)).sqrt()
        };
        let min = durations.iter().copied().fold(f64::INFINITY, f64::min);
        let max = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            system: system.into(),
            mean,
            std_dev,
            min,
            max,
            count: durations.len() as u64,
        })
    }
}

/// One run's records, ordered by mean descending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    records: Vec<AggregateRecord>,
}

impl Summary {
    /// Build a summary, sorting by mean descending.
    ///
    /// The sort is stable: equal means keep their input order.
    pub fn new(mut records: Vec<AggregateRecord>) -> Self {
        records.sort_by(|a, b| b.mean.total_cmp(&a.mean));
        Self { records }
    }

    /// Wrap records that are already in report order (e.g. loaded from disk).
    pub fn from_ordered(records: Vec<AggregateRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AggregateRecord] {
        &self.records
    }

    pub fn get(&self, system: &str) -> Option<&AggregateRecord> {
        self.records.iter().find(|r| r.system == system)
    }

    /// The `n` systems with the highest mean (fewer if the run has fewer).
    pub fn top(&self, n: usize) -> &[AggregateRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Raw samples grouped by system name; each group keeps log order.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    by_system: BTreeMap<String, Vec<f64>>,
}

impl SampleSet {
    /// Drain a sample stream, stopping at the first read error.
    pub fn collect<I>(samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Sample>>,
    {
        let mut set = Self::default();
        for sample in samples {
            set.push(sample?);
        }
        Ok(set)
    }

    pub fn push(&mut self, sample: Sample) {
        self.by_system
            .entry(sample.system)
            .or_default()
            .push(sample.duration_us);
    }

    /// Durations for `system` in the order they were logged.
    pub fn series(&self, system: &str) -> &[f64] {
        self.by_system.get(system).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_samples(&self) -> usize {
        self.by_system.values().map(Vec::len).sum()
    }

    pub fn summarize(&self) -> Summary {
        // BTreeMap iteration gives name order, which becomes the tie-break.
        let records = self
            .by_system
            .iter()
            .filter_map(|(system, durations)| AggregateRecord::from_durations(system, durations))
            .collect();
        Summary::new(records)
    }
}
