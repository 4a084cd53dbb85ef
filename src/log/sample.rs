/// Unit tag attached to a duration in the profile log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Nanos,
    Micros,
    Millis,
}

impl TimeUnit {
    /// Map the tag as printed by `Duration`'s `Debug` impl.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ns" => Some(Self::Nanos),
            "µs" => Some(Self::Micros),
            "ms" => Some(Self::Millis),
            _ => None,
        }
    }

    /// Normalize a value in this unit to microseconds.
    pub fn to_micros(self, value: f64) -> f64 {
        match self {
            Self::Nanos => value / 1000.0,
            Self::Micros => value,
            Self::Millis => value * 1000.0,
        }
    }
}

/// One `System <name> took <duration>` observation, normalized to µs.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub system: String,
    pub duration_us: f64,
}

/// Result of looking at a single log line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Sample(Sample),
    Skipped,
}
