use crate::rate::RateLookup;
use merger_core::{query, AggregatedSeries, Mesh, Resolution, Result};
use prometheus::{GaugeVec, Opts, Registry};
use std::collections::HashSet;
use tracing::debug;

pub const PERCENTILE_LABEL: &str = "p";
pub const SOURCE_RUN_LABEL: &str = "source_run";
pub const REQUESTED_RPS_LABEL: &str = "requested_rps";

/// Summary series of one mesh at one resolution, ready to be pushed.
pub struct PublishedSummary {
    pub resolution: Resolution,
    /// Registry owning the summary gauge; never shared with another publish
    pub registry: Registry,
    pub gauge: GaugeVec,
    /// Distinct percentiles published
    pub percentiles: usize,
    /// Distinct runs published
    pub runs: usize,
    /// Total (percentile, run) observations recorded
    pub observations: usize,
}

pub struct SummaryPublisher;

impl SummaryPublisher {
    /// Records one gauge sample per (percentile, run) of `series`, labeled with the
    /// run's requested rate. Fails on the first run without a resolvable rate.
    pub async fn publish(
        mesh: &Mesh,
        resolution: Resolution,
        series: &AggregatedSeries,
        rates: &mut RateLookup,
    ) -> Result<PublishedSummary> {
        let registry = Registry::new();
        let gauge = GaugeVec::new(
            Opts::new(
                query::summary_metric(resolution),
                format!("{} latency summary", mesh),
            ),
            &[PERCENTILE_LABEL, SOURCE_RUN_LABEL, REQUESTED_RPS_LABEL],
        )?;
        registry.register(Box::new(gauge.clone()))?;

        let mut runs = HashSet::new();
        let mut observations = 0;

        for (percentile, latencies) in series {
            let p = percentile.label();
            for (run, latency) in latencies {
                let rate = rates.requested_rate(mesh, run).await?;
                gauge
                    .with_label_values(&[p.as_str(), run.as_str(), rate.raw.as_str()])
                    .set(*latency);
                runs.insert(run);
                observations += 1;
            }
        }

        debug!(
            "Published {} observations for mesh '{}' ({})",
            observations, mesh, resolution
        );

        Ok(PublishedSummary {
            resolution,
            registry,
            gauge,
            percentiles: series.len(),
            runs: runs.len(),
            observations,
        })
    }
}
