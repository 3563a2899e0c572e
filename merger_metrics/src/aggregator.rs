use crate::{collector::HistogramCollector, discovery::RunDiscovery};
use merger_core::{AggregatedSeries, DynSource, Histogram, Mesh, Resolution, Result, Run};
use tracing::debug;

/// Merges the histograms of all completed runs of a mesh, per percentile.
pub struct HistogramAggregator {
    discovery: RunDiscovery,
    collector: HistogramCollector,
}

impl HistogramAggregator {
    pub fn new(source: DynSource) -> Self {
        Self {
            discovery: RunDiscovery::new(source.clone()),
            collector: HistogramCollector::new(source),
        }
    }

    pub async fn aggregate(&self, mesh: &Mesh, resolution: Resolution) -> Result<AggregatedSeries> {
        let runs = self.discovery.completed_runs(mesh).await?;

        let mut histograms = Vec::with_capacity(runs.len());
        for run in runs {
            let histogram = self.collector.histogram(&run, resolution).await?;
            histograms.push((run, histogram));
        }

        let series = Self::fold(histograms);
        debug!(
            "Aggregated {} percentiles for mesh '{}' ({})",
            series.len(),
            mesh,
            resolution
        );
        Ok(series)
    }

    /// Partitions the observations by percentile, then orders each percentile's
    /// runs by ascending latency. Runs with equal latency keep their input order.
    pub fn fold<I>(histograms: I) -> AggregatedSeries
    where
        I: IntoIterator<Item = (Run, Histogram)>,
    {
        let mut series = AggregatedSeries::new();

        for (run, histogram) in histograms {
            for (percentile, latency) in histogram {
                series
                    .entry(percentile)
                    .or_default()
                    .insert(run.clone(), latency);
            }
        }

        for latencies in series.values_mut() {
            latencies.sort_by(|_, a, _, b| a.total_cmp(b));
        }

        series
    }
}

/// Total number of (run, latency) entries across all percentiles.
pub fn observation_count(series: &AggregatedSeries) -> usize {
    series.values().map(|latencies| latencies.len()).sum()
}
