//! Run history: persisted summaries of earlier runs.
//!
//! Callers only see `append` and `load_previous`; how runs are named and
//! stored is up to the store.

pub mod csv;

pub use csv::CsvHistory;

use crate::Result;
use crate::model::Summary;
use chrono::{DateTime, TimeZone};
use std::fmt;
use std::path::PathBuf;

/// Second-resolution run identifier, `YYYYMMDD_HHMMSS`.
///
/// The fixed width makes lexicographic order chronological.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(String);

impl RunId {
    pub const FORMAT: &'static str = "%Y%m%d_%H%M%S";

    pub fn from_time<Tz>(at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self(at.format(Self::FORMAT).to_string())
    }

    pub fn now() -> Self {
        Self::from_time(&chrono::Local::now())
    }

    /// Accept an id only if it has the `YYYYMMDD_HHMMSS` shape.
    pub fn parse(s: &str) -> Option<Self> {
        chrono::NaiveDateTime::parse_from_str(s, Self::FORMAT)
            .ok()
            .filter(|_| s.len() == 15)
            .map(|_| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only store of per-run summaries.
pub trait HistoryStore {
    /// Persist `summary` as the record for `run`; returns where it went.
    fn append(&mut self, run: &RunId, summary: &Summary) -> Result<PathBuf>;

    /// The most recent stored summary other than `current`'s, if any.
    fn load_previous(&self, current: &RunId) -> Result<Option<Summary>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn run_id_is_fixed_width_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 2)
            .unwrap()
            .and_utc();
        let id = RunId::from_time(&at);
        assert_eq!(id.as_str(), "20240307_090502");
        assert_eq!(RunId::parse("20240307_090502"), Some(id));
    }

    #[test]
    fn run_ids_order_chronologically() {
        let earlier = RunId::parse("20231231_235959").unwrap();
        let later = RunId::parse("20240101_000000").unwrap();
        assert!(earlier < later);
        assert_eq!(RunId::from_time(&Utc::now()).as_str().len(), 15);
    }

    #[test]
    fn run_id_rejects_other_shapes() {
        assert_eq!(RunId::parse("latest"), None);
        assert_eq!(RunId::parse("20240307"), None);
        assert_eq!(RunId::parse("20241307_090502"), None);
    }
}
