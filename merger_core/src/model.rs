use crate::error::{MergerError, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A benchmarked target system, e.g. a service mesh variant or the bare-metal baseline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mesh(String);

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mesh {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Identifier of one completed benchmark run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Run(String);

impl Run {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Run {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A latency quantile as reported by the source, compared by exact value.
#[derive(Debug, Clone, Copy)]
pub struct Percentile(f64);

impl Percentile {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(MergerError::InvalidSample(format!(
                "percentile must be finite, got {}",
                value
            )));
        }
        // folds -0.0 into 0.0 so both hash alike
        Ok(Self(value + 0.0))
    }

    pub fn parse(label: &str) -> Result<Self> {
        let value = label.trim().parse::<f64>().map_err(|e| {
            MergerError::InvalidSample(format!("percentile '{}': {}", label, e))
        })?;
        Self::new(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Label rendering: whole numbers keep one decimal (`50.0`), others use the
    /// shortest round-trip form (`99.9`).
    pub fn label(self) -> String {
        if self.0.fract() == 0.0 && self.0.abs() < 1e16 {
            format!("{:.1}", self.0)
        } else {
            format!("{}", self.0)
        }
    }
}

impl PartialEq for Percentile {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Percentile {}

impl Hash for Percentile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Percentile granularity; each resolution is sourced from its own metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Coarse,
    Detailed,
}

impl Resolution {
    pub const ALL: [Resolution; 2] = [Resolution::Coarse, Resolution::Detailed];

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Coarse => "coarse",
            Resolution::Detailed => "detailed",
        }
    }

    pub fn is_detailed(self) -> bool {
        matches!(self, Resolution::Detailed)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested throughput of a run. `raw` is kept verbatim for labeling.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedRate {
    pub raw: String,
    pub rps: f64,
}

impl RequestedRate {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let rps = raw.trim().parse::<f64>().map_err(|e| {
            MergerError::InvalidSample(format!("requested rate '{}': {}", raw, e))
        })?;
        Ok(Self { raw, rps })
    }
}

impl fmt::Display for RequestedRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Completed runs of a mesh, in discovery order.
pub type RunSet = IndexSet<Run>;

/// Latency (ms) per percentile for a single run.
pub type Histogram = IndexMap<Percentile, f64>;

/// Latency (ms) per run for a single percentile, ascending by latency once aggregated.
pub type LatencySeries = IndexMap<Run, f64>;

/// All runs' latencies, per percentile.
pub type AggregatedSeries = IndexMap<Percentile, LatencySeries>;
