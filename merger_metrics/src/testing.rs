use merger_core::{async_trait, query, MergerError, Mesh, MetricSource, Resolution, Result, Run, Sample};
use crate::sink::{encode_text, SummarySink};
use prometheus::proto::MetricFamily;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory source answering from canned query results; unknown queries return nothing.
#[derive(Default)]
pub struct StaticSource {
    responses: HashMap<String, Vec<Sample>>,
    failing: HashSet<String>,
    log: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, expr: impl Into<String>, samples: Vec<Sample>) -> Self {
        self.responses.entry(expr.into()).or_default().extend(samples);
        self
    }

    pub fn failing(mut self, expr: impl Into<String>) -> Self {
        self.failing.insert(expr.into());
        self
    }

    pub fn runs(self, mesh: &str, runs: &[&str]) -> Self {
        let samples = runs
            .iter()
            .map(|run| Sample::new(&[("run", *run), ("status", "done"), ("exported_job", mesh)], "1"))
            .collect();
        self.with(query::completed_runs(&Mesh::from(mesh)), samples)
    }

    pub fn rate(self, mesh: &str, run: &str, rps: &str) -> Self {
        self.with(
            query::requested_rps(&Mesh::from(mesh), &Run::from(run)),
            vec![Sample::new(&[("run", run), ("exported_job", mesh)], rps)],
        )
    }

    pub fn histogram(self, run: &str, resolution: Resolution, points: &[(&str, &str)]) -> Self {
        let samples = points
            .iter()
            .map(|(p, latency)| Sample::new(&[("run", run), ("p", *p)], *latency))
            .collect();
        self.with(query::latency_histogram(&Run::from(run), resolution), samples)
    }

    pub fn queries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, expr: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|q| *q == expr).count()
    }
}

#[async_trait]
impl MetricSource for StaticSource {
    async fn query(&self, expr: &str) -> Result<Vec<Sample>> {
        self.log.lock().unwrap().push(expr.to_string());
        if self.failing.contains(expr) {
            return Err(MergerError::SourceUnavailable(format!("refused: {}", expr)));
        }
        Ok(self.responses.get(expr).cloned().unwrap_or_default())
    }
}

/// Sink remembering every push as (job, exposition text).
#[derive(Default)]
pub struct RecordingSink {
    pushes: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pushes(&self) -> Vec<(String, String)> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummarySink for RecordingSink {
    async fn push(&self, job: &str, families: &[MetricFamily]) -> Result<()> {
        let text = encode_text(families)?;
        self.pushes.lock().unwrap().push((job.to_string(), text));
        Ok(())
    }
}
